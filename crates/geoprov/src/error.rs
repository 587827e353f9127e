//! CLI error types with miette diagnostics.
//!
//! Maps library and config errors into user-facing errors with actionable
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use geoprov_api::Error as ApiError;
use geoprov_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CONFIG: i32 = 9;
    pub const IO: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to GeoServer at {url}")]
    #[diagnostic(
        code(geoprov::connection_failed),
        help(
            "Check that GeoServer is running and reachable.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(geoprov::tls_error),
        help(
            "Use --insecure (-k) to accept a self-signed certificate,\n\
             or set ca_cert in your profile."
        )
    )]
    TlsError { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(geoprov::timeout),
        help("Increase the limit with --timeout, or check server load.")
    )]
    Timeout { seconds: u64 },

    #[error("Request cancelled")]
    #[diagnostic(code(geoprov::cancelled))]
    Cancelled,

    // ── Remote ───────────────────────────────────────────────────────

    #[error("GeoServer refused the credentials (HTTP {status})")]
    #[diagnostic(
        code(geoprov::auth_failed),
        help(
            "Verify the admin username and password.\n\
             Set them with --username/--password or in your profile."
        )
    )]
    AuthFailed { status: u16 },

    #[error("Not found on GeoServer: {url}")]
    #[diagnostic(
        code(geoprov::not_found),
        help("Check the workspace, store, and layer names.")
    )]
    NotFound { url: String },

    #[error("GeoServer rejected the request (HTTP {status}): {message}")]
    #[diagnostic(code(geoprov::rejected), help("Request: {url}"))]
    Rejected {
        status: u16,
        url: String,
        message: String,
    },

    // ── Validation / configuration ───────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(geoprov::validation))]
    Validation { field: String, reason: String },

    #[error("Missing {fields} for profile '{profile}'")]
    #[diagnostic(
        code(geoprov::missing_config),
        help(
            "Provide them with --url/--username/--password, a profile in the\n\
             config file, or URL_GEOSERVER / USERNAME_GEOSERVER / PASSWORD_GEOSERVER."
        )
    )]
    MissingConfig { profile: String, fields: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(geoprov::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(geoprov::config))]
    Config { message: String },

    // ── Local I/O ────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(geoprov::io))]
    LocalIo {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::MissingConfig { .. } | Self::ProfileNotFound { .. } | Self::Config { .. } => {
                exit_code::CONFIG
            }
            Self::LocalIo { .. } => exit_code::IO,
            Self::Cancelled | Self::Rejected { .. } => exit_code::GENERAL,
        }
    }
}

// ── ApiError → CliError mapping ──────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::MissingValue { field } => CliError::Validation {
                field: field.into(),
                reason: "must not be empty".into(),
            },

            ApiError::EmptyIdentifier { field } => CliError::Validation {
                field: field.into(),
                reason: "must not be empty".into(),
            },

            ApiError::InvalidUrl(e) => CliError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },

            ApiError::CannotBeABase { url } => CliError::Validation {
                field: "url".into(),
                reason: format!("cannot be used as a server base: {url}"),
            },

            ApiError::Tls(message) => CliError::TlsError { message },

            ApiError::Transport(e) => CliError::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                source: Box::new(e),
            },

            ApiError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            ApiError::Cancelled => CliError::Cancelled,

            ApiError::Rejected { status: status @ (401 | 403), .. } => {
                CliError::AuthFailed { status }
            }

            ApiError::Rejected { status: 404, url, .. } => CliError::NotFound { url },

            ApiError::Rejected {
                status,
                url,
                message,
            } => CliError::Rejected {
                status,
                url,
                message,
            },

            err @ (ApiError::Io { .. } | ApiError::Archive { .. }) => CliError::LocalIo {
                message: err.to_string(),
                source: Box::new(err),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { profile, fields } => CliError::MissingConfig {
                profile,
                fields: fields.join(", "),
            },
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
