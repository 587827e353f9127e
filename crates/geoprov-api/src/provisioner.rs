//! The provisioning contract: six operations against a map server.
//!
//! [`Provisioner`] is the seam callers program against; [`GeoServerClient`]
//! is the implementation that talks HTTP. `execute` is provided on the trait
//! itself because it only composes the other five.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::{Display, EnumString};
use tracing::info;

use crate::error::Error;
use crate::rest::GeoServerClient;
use crate::rest::models::Ensured;
use crate::rest::ows::ShapefileDownload;

/// Suffix appended to the shapefile path to form the retrieval destination.
pub const RETRIEVAL_SUFFIX: &str = "tmp";

/// Which pipeline [`Provisioner::execute`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMode {
    /// Ensure workspace, ensure store, upload shapefiles, publish the layer.
    Provision,
    /// Export the layer into `{shapefile_path}tmp`.
    #[default]
    Retrieve,
}

/// What the provisioning pipeline did at each step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub workspace: Ensured,
    pub datastore: Ensured,
    pub uploaded: Vec<PathBuf>,
    pub layer: String,
}

/// Outcome of [`Provisioner::execute`], tagged by mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecuteOutcome {
    Provisioned(ProvisionReport),
    Retrieved(ShapefileDownload),
}

/// Destination directory used by the retrieval pipeline.
///
/// Plain string concatenation: `parcels/` becomes `parcels/tmp`, `parcels`
/// becomes `parcelstmp`.
pub fn retrieval_destination(shapefile_path: &str) -> PathBuf {
    PathBuf::from(format!("{shapefile_path}{RETRIEVAL_SUFFIX}"))
}

/// Provisioning and retrieval operations against a map server.
pub trait Provisioner: Sync {
    /// Create a workspace unless one with this name already exists.
    fn create_workspace(
        &self,
        workspace: &str,
    ) -> impl Future<Output = Result<Ensured, Error>> + Send;

    /// Create a shapefile data store unless it already exists.
    fn create_datastore(
        &self,
        workspace: &str,
        store: &str,
        shapefile_path: &str,
    ) -> impl Future<Output = Result<Ensured, Error>> + Send;

    /// Upload every `.shp` file in a local directory, overwriting the store.
    fn update_shapefile(
        &self,
        workspace: &str,
        store: &str,
        shapefile_dir: &Path,
    ) -> impl Future<Output = Result<Vec<PathBuf>, Error>> + Send;

    /// Download a layer as a zipped shapefile and extract it.
    fn get_shapefile(
        &self,
        workspace: &str,
        store: &str,
        layer: &str,
        destination: &Path,
    ) -> impl Future<Output = Result<ShapefileDownload, Error>> + Send;

    /// Publish a feature type from an existing store.
    fn publish_layer(
        &self,
        workspace: &str,
        store: &str,
        layer: &str,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Run the provisioning pipeline or the retrieval step.
    ///
    /// `Provision` stops at the first failing step.
    fn execute(
        &self,
        workspace: &str,
        store: &str,
        shapefile_path: &str,
        layer: &str,
        mode: ExecuteMode,
    ) -> impl Future<Output = Result<ExecuteOutcome, Error>> + Send {
        async move {
            match mode {
                ExecuteMode::Provision => {
                    let workspace_state = self.create_workspace(workspace).await?;
                    let datastore_state = self
                        .create_datastore(workspace, store, shapefile_path)
                        .await?;
                    let uploaded = self
                        .update_shapefile(workspace, store, Path::new(shapefile_path))
                        .await?;
                    self.publish_layer(workspace, store, layer).await?;
                    info!(workspace, store, layer, "provisioning complete");
                    Ok(ExecuteOutcome::Provisioned(ProvisionReport {
                        workspace: workspace_state,
                        datastore: datastore_state,
                        uploaded,
                        layer: layer.to_owned(),
                    }))
                }
                ExecuteMode::Retrieve => {
                    let destination = retrieval_destination(shapefile_path);
                    let download = self
                        .get_shapefile(workspace, store, layer, &destination)
                        .await?;
                    Ok(ExecuteOutcome::Retrieved(download))
                }
            }
        }
    }
}

impl Provisioner for GeoServerClient {
    fn create_workspace(
        &self,
        workspace: &str,
    ) -> impl Future<Output = Result<Ensured, Error>> + Send {
        self.ensure_workspace(workspace)
    }

    fn create_datastore(
        &self,
        workspace: &str,
        store: &str,
        shapefile_path: &str,
    ) -> impl Future<Output = Result<Ensured, Error>> + Send {
        self.ensure_datastore(workspace, store, shapefile_path)
    }

    fn update_shapefile(
        &self,
        workspace: &str,
        store: &str,
        shapefile_dir: &Path,
    ) -> impl Future<Output = Result<Vec<PathBuf>, Error>> + Send {
        self.upload_shapefiles(workspace, store, shapefile_dir)
    }

    fn get_shapefile(
        &self,
        workspace: &str,
        store: &str,
        layer: &str,
        destination: &Path,
    ) -> impl Future<Output = Result<ShapefileDownload, Error>> + Send {
        self.download_layer(workspace, store, layer, destination)
    }

    fn publish_layer(
        &self,
        workspace: &str,
        store: &str,
        layer: &str,
    ) -> impl Future<Output = Result<(), Error>> + Send {
        self.create_feature_type(workspace, store, layer)
    }
}
