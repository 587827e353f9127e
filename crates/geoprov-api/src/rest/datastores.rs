// Data store endpoints
//
// Only shapefile-backed stores are created. The connection URL is built from
// the server-side data directory, so nothing here checks that the path is
// reachable from GeoServer.

use tracing::{debug, info};

use crate::error::Error;
use crate::rest::client::{GeoServerClient, require};
use crate::rest::models::{DataStoreEnvelope, Ensured};

impl GeoServerClient {
    /// Check whether a data store exists in a workspace.
    ///
    /// `GET /rest/workspaces/{workspace}/datastores/{store}.json`
    pub async fn datastore_exists(&self, workspace: &str, store: &str) -> Result<bool, Error> {
        require("workspace", workspace)?;
        require("store", store)?;
        let url = self.rest_url(&[
            "workspaces",
            workspace,
            "datastores",
            &format!("{store}.json"),
        ])?;
        self.exists(url).await
    }

    /// Create a shapefile data store unless it already exists.
    ///
    /// `POST /rest/workspaces/{workspace}/datastores.json`
    pub async fn ensure_datastore(
        &self,
        workspace: &str,
        store: &str,
        shapefile_path: &str,
    ) -> Result<Ensured, Error> {
        require("shapefile_path", shapefile_path)?;
        if self.datastore_exists(workspace, store).await? {
            debug!(workspace, store, "data store already exists");
            return Ok(Ensured::AlreadyExists);
        }

        let body = DataStoreEnvelope::shapefile(self.data_dir(), workspace, store, shapefile_path);
        let url = self.rest_url(&["workspaces", workspace, "datastores.json"])?;
        self.post_json(url, &body).await?;
        info!(
            workspace,
            store,
            url = %body.data_store.connection_parameters.url,
            "created shapefile data store"
        );
        Ok(Ensured::Created)
    }
}
