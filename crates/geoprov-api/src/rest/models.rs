// Request payloads for the GeoServer REST API.
//
// GeoServer wraps every resource in a single-key envelope named after the
// resource type (`{"workspace": {...}}`, `{"dataStore": {...}}`, ...).

use serde::Serialize;

/// Spatial reference assigned to every published feature type.
pub const DEFAULT_SRS: &str = "EPSG:4326";

/// Store type GeoServer uses for directory/file shapefile stores.
pub const SHAPEFILE_STORE_TYPE: &str = "Shapefile";

/// Whether an ensure-style call created the resource or found it already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ensured {
    Created,
    AlreadyExists,
}

impl Ensured {
    pub fn was_created(self) -> bool {
        matches!(self, Self::Created)
    }
}

// ── Workspace ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WorkspaceEnvelope {
    pub workspace: NewWorkspace,
}

#[derive(Debug, Serialize)]
pub struct NewWorkspace {
    pub name: String,
}

impl WorkspaceEnvelope {
    pub fn named(name: &str) -> Self {
        Self {
            workspace: NewWorkspace {
                name: name.to_owned(),
            },
        }
    }
}

// ── Data store ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DataStoreEnvelope {
    #[serde(rename = "dataStore")]
    pub data_store: NewDataStore,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDataStore {
    pub name: String,
    #[serde(rename = "type")]
    pub store_type: String,
    pub enabled: bool,
    pub connection_parameters: ConnectionParameters,
}

#[derive(Debug, Serialize)]
pub struct ConnectionParameters {
    pub url: String,
    #[serde(rename = "create spatial index")]
    pub create_spatial_index: bool,
}

impl DataStoreEnvelope {
    /// A shapefile store pointing at `file:{data_dir}/workspaces/{workspace}/{shapefile_path}`.
    ///
    /// The path is concatenated verbatim; GeoServer resolves it relative to
    /// its own data directory.
    pub fn shapefile(data_dir: &str, workspace: &str, store: &str, shapefile_path: &str) -> Self {
        Self {
            data_store: NewDataStore {
                name: store.to_owned(),
                store_type: SHAPEFILE_STORE_TYPE.to_owned(),
                enabled: true,
                connection_parameters: ConnectionParameters {
                    url: shapefile_store_url(data_dir, workspace, shapefile_path),
                    create_spatial_index: true,
                },
            },
        }
    }
}

pub fn shapefile_store_url(data_dir: &str, workspace: &str, shapefile_path: &str) -> String {
    format!("file:{data_dir}/workspaces/{workspace}/{shapefile_path}")
}

// ── Feature type ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FeatureTypeEnvelope {
    #[serde(rename = "featureType")]
    pub feature_type: NewFeatureType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeatureType {
    pub name: String,
    pub native_name: String,
    pub title: String,
    pub srs: String,
    pub enabled: bool,
}

impl FeatureTypeEnvelope {
    /// An enabled layer in EPSG:4326 whose name, native name and title all match.
    pub fn layer(name: &str) -> Self {
        Self {
            feature_type: NewFeatureType {
                name: name.to_owned(),
                native_name: name.to_owned(),
                title: name.to_owned(),
                srs: DEFAULT_SRS.to_owned(),
                enabled: true,
            },
        }
    }
}
