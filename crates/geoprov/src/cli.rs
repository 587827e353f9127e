//! Clap derive structures for the `geoprov` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use geoprov_api::ExecuteMode;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// geoprov -- provision shapefile layers on GeoServer
#[derive(Debug, Parser)]
#[command(
    name = "geoprov",
    version,
    about = "Provision and export shapefile layers on a GeoServer instance",
    long_about = "Creates workspaces and shapefile data stores, uploads shapefiles,\n\
        publishes feature layers through the GeoServer REST API, and exports\n\
        published layers back out as zipped shapefiles over WFS.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "GEOPROV_PROFILE", global = true)]
    pub profile: Option<String>,

    /// GeoServer URL, e.g. http://localhost:8080/geoserver (overrides profile)
    #[arg(long, env = "GEOPROV_URL", global = true)]
    pub url: Option<String>,

    /// Admin username (overrides profile and GEOPROV_USERNAME)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// Admin password (overrides password_env, GEOPROV_PASSWORD, and the keyring)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GEOPROV_OUTPUT",
        default_value = "text",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "GEOPROV_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (covers streaming downloads)
    #[arg(long, env = "GEOPROV_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Connect timeout in seconds
    #[arg(long, env = "GEOPROV_CONNECT_TIMEOUT", global = true)]
    pub connect_timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary (default)
    Text,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage workspaces
    #[command(alias = "ws")]
    Workspace(WorkspaceArgs),

    /// Manage shapefile data stores
    #[command(alias = "ds")]
    Datastore(DatastoreArgs),

    /// Upload or export shapefiles
    #[command(alias = "shp")]
    Shapefile(ShapefileArgs),

    /// Publish feature layers
    Layer(LayerArgs),

    /// Run the provisioning pipeline or the retrieval step
    Execute(ExecuteArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WORKSPACE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WorkspaceArgs {
    #[command(subcommand)]
    pub command: WorkspaceCommand,
}

#[derive(Debug, Subcommand)]
pub enum WorkspaceCommand {
    /// Create a workspace unless it already exists
    Create {
        /// Workspace name
        workspace: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DATASTORE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DatastoreArgs {
    #[command(subcommand)]
    pub command: DatastoreCommand,
}

#[derive(Debug, Subcommand)]
pub enum DatastoreCommand {
    /// Create a shapefile data store unless it already exists
    Create {
        /// Workspace name
        workspace: String,

        /// Data store name
        store: String,

        /// Shapefile path relative to the workspace directory on the server
        shapefile_path: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SHAPEFILE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ShapefileArgs {
    #[command(subcommand)]
    pub command: ShapefileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShapefileCommand {
    /// Upload every .shp file in a directory, overwriting the store
    Upload {
        /// Workspace name
        workspace: String,

        /// Data store name
        store: String,

        /// Local directory containing .shp files
        dir: PathBuf,
    },

    /// Export a published layer as a zipped shapefile and extract it
    Fetch {
        /// Workspace name
        workspace: String,

        /// Data store name (names the downloaded archive)
        store: String,

        /// Layer name
        layer: String,

        /// Destination directory (created if missing)
        destination: PathBuf,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LAYER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LayerArgs {
    #[command(subcommand)]
    pub command: LayerCommand,
}

#[derive(Debug, Subcommand)]
pub enum LayerCommand {
    /// Publish a feature type (EPSG:4326, enabled)
    Publish {
        /// Workspace name
        workspace: String,

        /// Data store name
        store: String,

        /// Layer name
        layer: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EXECUTE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ExecuteArgs {
    /// Workspace name
    pub workspace: String,

    /// Data store name
    pub store: String,

    /// Shapefile path (local directory for provision; base of `<path>tmp` for retrieve)
    pub shapefile_path: String,

    /// Layer name
    pub layer: String,

    /// Which pipeline to run
    #[arg(long, short = 'm', default_value = "retrieve")]
    pub mode: ModeArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Ensure workspace and store, upload shapefiles, publish the layer
    Provision,
    /// Export the layer into `<shapefile_path>tmp`
    Retrieve,
}

impl From<ModeArg> for ExecuteMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Provision => Self::Provision,
            ModeArg::Retrieve => Self::Retrieve,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the configuration file contents (passwords masked)
    Show,

    /// Add or update a profile in the config file
    ///
    /// The username comes from the global --username flag. Passwords are
    /// never written by this command; point the profile at a variable with
    /// --password-env or store the secret in the keyring.
    SetProfile {
        /// Profile name
        name: String,

        /// GeoServer application root, e.g. http://localhost:8080/geoserver
        url: String,

        /// Environment variable that holds the password
        #[arg(long)]
        password_env: Option<String>,

        /// Server-side data directory prefix for shapefile stores
        #[arg(long)]
        data_dir: Option<String>,

        /// Make this the default profile
        #[arg(long)]
        default: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
