// Shapefile upload endpoint
//
// `PUT /rest/workspaces/{ws}/datastores/{store}/file.shp?update=overwrite`
// replaces the store's contents, so several `.shp` files in one directory
// overwrite each other in name order.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Error;
use crate::rest::client::{GeoServerClient, require};
use crate::shapefile;

impl GeoServerClient {
    /// Upload every `.shp` file in `dir` (non-recursive) to a store.
    ///
    /// Stops at the first failed upload. Returns the uploaded paths in the
    /// order they were sent.
    pub async fn upload_shapefiles(
        &self,
        workspace: &str,
        store: &str,
        dir: &Path,
    ) -> Result<Vec<PathBuf>, Error> {
        require("workspace", workspace)?;
        require("store", store)?;

        let files = shapefile::main_files_in(dir).await?;
        if files.is_empty() {
            debug!(dir = %dir.display(), "no shapefiles to upload");
            return Ok(files);
        }

        let mut url = self.rest_url(&[
            "workspaces",
            workspace,
            "datastores",
            store,
            "file.shp",
        ])?;
        url.query_pairs_mut().append_pair("update", "overwrite");

        for path in &files {
            let bytes = self.put_file(url.clone(), path).await?;
            info!(workspace, store, file = %path.display(), bytes, "uploaded shapefile");
        }
        Ok(files)
    }
}
