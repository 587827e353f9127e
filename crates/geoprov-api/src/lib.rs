// geoprov-api: Async Rust client for provisioning shapefile layers on GeoServer

pub mod auth;
pub mod error;
pub mod provisioner;
pub mod rest;
pub mod shapefile;
pub mod transport;

pub use auth::Credentials;
pub use error::{Error, ErrorKind};
pub use provisioner::{
    ExecuteMode, ExecuteOutcome, ProvisionReport, Provisioner, RETRIEVAL_SUFFIX,
    retrieval_destination,
};
pub use rest::GeoServerClient;
pub use rest::client::DEFAULT_DATA_DIR;
pub use rest::models::{DEFAULT_SRS, Ensured, shapefile_store_url};
pub use rest::ows::ShapefileDownload;
pub use transport::{TlsMode, TransportConfig};

pub use tokio_util::sync::CancellationToken;
