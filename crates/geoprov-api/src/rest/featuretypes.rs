// Feature type endpoints

use tracing::info;

use crate::error::Error;
use crate::rest::client::{GeoServerClient, require};
use crate::rest::models::FeatureTypeEnvelope;

impl GeoServerClient {
    /// Publish a layer from an existing store.
    ///
    /// `POST /rest/workspaces/{workspace}/datastores/{store}/featuretypes`
    ///
    /// There is no existence check: publishing a name twice comes back as
    /// an `Error::Rejected` from GeoServer.
    pub async fn create_feature_type(
        &self,
        workspace: &str,
        store: &str,
        layer: &str,
    ) -> Result<(), Error> {
        require("workspace", workspace)?;
        require("store", store)?;
        require("layer", layer)?;
        let url = self.rest_url(&["workspaces", workspace, "datastores", store, "featuretypes"])?;
        self.post_json(url, &FeatureTypeEnvelope::layer(layer))
            .await?;
        info!(workspace, store, layer, "published feature type");
        Ok(())
    }
}
