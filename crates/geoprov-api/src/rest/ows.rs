// WFS shapefile export
//
// `GET /ows?service=WFS&version=1.0.0&request=GetFeature&typeName={ws}:{layer}&outputFormat=shape-zip`
// streams a zipped shapefile. The body is written to `{destination}/{store}.zip`
// chunk by chunk and then unpacked next to it.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Error;
use crate::rest::client::{GeoServerClient, ensure_success, require};
use crate::shapefile;

/// WFS output format that yields a zipped shapefile.
pub const SHAPE_ZIP_FORMAT: &str = "shape-zip";

/// Result of a successful layer export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapefileDownload {
    /// The archive as written to disk.
    pub archive_path: PathBuf,
    /// Size of the archive in bytes.
    pub archive_size: usize,
    /// Every file extracted from the archive.
    pub files: Vec<PathBuf>,
}

impl GeoServerClient {
    /// Build the WFS `GetFeature` URL for a layer.
    pub fn get_feature_url(&self, workspace: &str, layer: &str) -> Result<Url, Error> {
        let mut url = self.ows_url()?;
        url.query_pairs_mut()
            .append_pair("service", "WFS")
            .append_pair("version", "1.0.0")
            .append_pair("request", "GetFeature")
            .append_pair("typeName", &format!("{workspace}:{layer}"))
            .append_pair("outputFormat", SHAPE_ZIP_FORMAT);
        Ok(url)
    }

    /// Export a published layer as a shapefile archive and unpack it.
    ///
    /// A non-success status is returned as `Error::Rejected` before anything
    /// touches `destination`. If the body stream fails midway, the partial
    /// archive is removed.
    pub async fn download_layer(
        &self,
        workspace: &str,
        store: &str,
        layer: &str,
        destination: &Path,
    ) -> Result<ShapefileDownload, Error> {
        require("workspace", workspace)?;
        require("store", store)?;
        require("layer", layer)?;

        let url = self.get_feature_url(workspace, layer)?;
        debug!("GET {}", url);
        let resp = self.send(self.http().get(url.clone())).await?;
        let resp = ensure_success(resp, &url).await?;

        tokio::fs::create_dir_all(destination)
            .await
            .map_err(Error::io(destination))?;
        let archive_path = destination.join(format!("{store}.zip"));

        let archive_size = match self.stream_to_file(resp, &archive_path).await {
            Ok(size) => size,
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&archive_path).await {
                    warn!(
                        path = %archive_path.display(),
                        error = %cleanup,
                        "failed to remove partial archive"
                    );
                }
                return Err(err);
            }
        };
        info!(path = %archive_path.display(), bytes = archive_size, "shapefile archive saved");

        let files = shapefile::extract_archive(&archive_path, destination).await?;
        info!(
            destination = %destination.display(),
            files = files.len(),
            "shapefile archive extracted"
        );

        Ok(ShapefileDownload {
            archive_path,
            archive_size,
            files,
        })
    }

    async fn stream_to_file(
        &self,
        mut resp: reqwest::Response,
        path: &Path,
    ) -> Result<usize, Error> {
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(Error::io(path))?;
        let mut written = 0;

        while let Some(chunk) = self
            .cancellable(resp.chunk())
            .await?
            .map_err(|e| self.transport_error(e))?
        {
            file.write_all(&chunk).await.map_err(Error::io(path))?;
            written += chunk.len();
        }

        file.flush().await.map_err(Error::io(path))?;
        Ok(written)
    }
}
