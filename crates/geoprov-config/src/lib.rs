//! Shared configuration for the geoprov CLI and library consumers.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), the
//! classic `URL_GEOSERVER` / `USERNAME_GEOSERVER` / `PASSWORD_GEOSERVER`
//! variables, and translation to a ready-to-connect [`ServerSettings`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use geoprov_api::{Credentials, DEFAULT_DATA_DIR, GeoServerClient, TlsMode, TransportConfig};

/// Keyring service name; entries are stored as `<profile>/password`.
pub const KEYRING_SERVICE: &str = "geoprov";

pub const DEFAULT_PROFILE: &str = "default";

/// Classic variables: server root, username, password.
pub const CLASSIC_URL_VAR: &str = "URL_GEOSERVER";
pub const CLASSIC_USERNAME_VAR: &str = "USERNAME_GEOSERVER";
pub const CLASSIC_PASSWORD_VAR: &str = "PASSWORD_GEOSERVER";

/// Context path appended to `URL_GEOSERVER` to reach the web application.
pub const CLASSIC_CONTEXT_PATH: &str = "geoserver";

const USERNAME_VAR: &str = "GEOPROV_USERNAME";
const PASSWORD_VAR: &str = "GEOPROV_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("missing {} for profile '{profile}'", fields.join(", "))]
    Missing {
        profile: String,
        fields: Vec<&'static str>,
    },

    #[error("profile '{name}' not found (available: {available})")]
    ProfileNotFound { name: String, available: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    #[serde(default)]
    pub insecure: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            insecure: false,
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_connect_timeout() -> u64 {
    10
}

/// A named GeoServer profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// GeoServer web application root (e.g., "http://localhost:8080/geoserver").
    pub url: String,

    pub username: Option<String>,

    /// Password in plaintext. Prefer the keyring or `password_env`.
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Server-side data directory prefix for shapefile stores.
    pub data_dir: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "geoprov", "geoprov").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("geoprov");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, layered under `GEOPROV_`-prefixed variables.
///
/// Nested keys use a double underscore: `GEOPROV_PROFILES__PROD__URL`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GEOPROV_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Sources ─────────────────────────────────────────────────────────

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Where credential resolution reads variables and stored secrets from.
pub struct Sources {
    env: EnvLookup,
    keyring: bool,
}

impl Sources {
    /// The process environment plus the system keyring.
    pub fn system() -> Self {
        Self {
            env: Box::new(|key| std::env::var(key).ok()),
            keyring: true,
        }
    }

    /// A fixed set of variables and no keyring.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            env: Box::new(move |key| vars.get(key).cloned()),
            keyring: false,
        }
    }

    /// Look up a variable; empty values count as unset.
    fn var(&self, key: &str) -> Option<String> {
        (self.env)(key).filter(|v| !v.is_empty())
    }

    fn keyring_password(&self, profile_name: &str) -> Option<String> {
        if !self.keyring {
            return None;
        }
        let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")).ok()?;
        entry.get_password().ok()
    }
}

// ── Resolution ──────────────────────────────────────────────────────

/// Values supplied directly by the caller (CLI flags); they win over
/// everything else.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub profile: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub timeout: Option<u64>,
    pub connect_timeout: Option<u64>,
    pub insecure: bool,
}

/// Everything needed to build a [`GeoServerClient`].
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub profile: String,
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub transport: TransportConfig,
    pub data_dir: String,
}

impl ServerSettings {
    /// Build a client from these settings.
    pub fn connect(&self) -> Result<GeoServerClient, geoprov_api::Error> {
        let credentials = Credentials::new(self.username.clone(), self.password.clone())?;
        Ok(
            GeoServerClient::new(self.url.clone(), credentials, &self.transport)?
                .with_data_dir(self.data_dir.clone()),
        )
    }
}

/// Partially resolved settings, before overrides and validation.
#[derive(Default)]
struct Draft {
    url: Option<String>,
    username: Option<String>,
    password: Option<SecretString>,
    ca_cert: Option<PathBuf>,
    insecure: Option<bool>,
    timeout: Option<u64>,
    data_dir: Option<String>,
}

impl Draft {
    fn from_profile(profile: &Profile, profile_name: &str, sources: &Sources) -> Self {
        Self {
            url: Some(profile.url.clone()).filter(|u| !u.is_empty()),
            username: profile
                .username
                .clone()
                .or_else(|| sources.var(USERNAME_VAR)),
            password: resolve_password(profile, profile_name, sources),
            ca_cert: profile.ca_cert.clone(),
            insecure: profile.insecure,
            timeout: profile.timeout,
            data_dir: profile.data_dir.clone(),
        }
    }

    fn from_environment(sources: &Sources) -> Self {
        Self {
            url: sources
                .var(CLASSIC_URL_VAR)
                .map(|root| classic_base_url(&root)),
            username: sources
                .var(CLASSIC_USERNAME_VAR)
                .or_else(|| sources.var(USERNAME_VAR)),
            password: sources
                .var(CLASSIC_PASSWORD_VAR)
                .or_else(|| sources.var(PASSWORD_VAR))
                .map(SecretString::from),
            ..Self::default()
        }
    }

    fn apply(mut self, overrides: &Overrides) -> Self {
        if let Some(ref url) = overrides.url {
            self.url = Some(url.clone());
        }
        if let Some(ref username) = overrides.username {
            self.username = Some(username.clone());
        }
        if let Some(ref password) = overrides.password {
            self.password = Some(password.clone());
        }
        if let Some(timeout) = overrides.timeout {
            self.timeout = Some(timeout);
        }
        if overrides.insecure {
            self.insecure = Some(true);
        }
        self
    }

    fn finish(
        self,
        profile: String,
        defaults: &Defaults,
        overrides: &Overrides,
    ) -> Result<ServerSettings, ConfigError> {
        let mut missing = Vec::new();
        if self.url.is_none() {
            missing.push("url");
        }
        if self.username.is_none() {
            missing.push("username");
        }
        if self.password.is_none() {
            missing.push("password");
        }
        let (Some(url), Some(username), Some(password)) = (self.url, self.username, self.password)
        else {
            return Err(ConfigError::Missing {
                profile,
                fields: missing,
            });
        };

        let url: Url = url.parse().map_err(|e| ConfigError::Validation {
            field: "url".into(),
            reason: format!("{e}: {url}"),
        })?;

        let tls = if self.insecure.unwrap_or(defaults.insecure) {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ca_path) = self.ca_cert {
            TlsMode::CustomCa(ca_path)
        } else {
            TlsMode::System
        };

        let transport = TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout.unwrap_or(defaults.timeout)),
            connect_timeout: Duration::from_secs(
                overrides
                    .connect_timeout
                    .unwrap_or(defaults.connect_timeout),
            ),
        };

        Ok(ServerSettings {
            profile,
            url,
            username,
            password,
            transport,
            data_dir: self.data_dir.unwrap_or_else(|| DEFAULT_DATA_DIR.into()),
        })
    }
}

/// Resolve a profile's password (no CLI flag step).
///
/// Order: the profile's `password_env` variable, `GEOPROV_PASSWORD`, the
/// system keyring, then the plaintext value in the config file.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
    sources: &Sources,
) -> Option<SecretString> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Some(val) = sources.var(env_name) {
            debug!(profile = profile_name, "password from {env_name}");
            return Some(SecretString::from(val));
        }
    }

    // 2. Shared env var
    if let Some(val) = sources.var(PASSWORD_VAR) {
        debug!(profile = profile_name, "password from {PASSWORD_VAR}");
        return Some(SecretString::from(val));
    }

    // 3. System keyring
    if let Some(secret) = sources.keyring_password(profile_name) {
        debug!(profile = profile_name, "password from keyring");
        return Some(SecretString::from(secret));
    }

    // 4. Plaintext in config
    profile.password.clone().map(SecretString::from)
}

/// Turn a classic `URL_GEOSERVER` server root into the application root.
///
/// `http://host:8080/` and `http://host:8080` both become
/// `http://host:8080/geoserver`.
pub fn classic_base_url(root: &str) -> String {
    let root = root.trim_end_matches('/');
    format!("{root}/{CLASSIC_CONTEXT_PATH}")
}

/// Resolve connection settings from config, flags, and the environment.
///
/// The active profile is the `--profile` override, else `default_profile`,
/// else `"default"`. A profile named explicitly must exist; otherwise a
/// missing profile falls back to the classic environment variables.
pub fn resolve(
    config: &Config,
    overrides: &Overrides,
    sources: &Sources,
) -> Result<ServerSettings, ConfigError> {
    let profile_name = overrides
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| DEFAULT_PROFILE.into());

    let draft = match config.profiles.get(&profile_name) {
        Some(profile) => Draft::from_profile(profile, &profile_name, sources),
        None if overrides.profile.is_some() => {
            let mut names: Vec<_> = config.profiles.keys().cloned().collect();
            names.sort();
            return Err(ConfigError::ProfileNotFound {
                name: profile_name,
                available: if names.is_empty() {
                    "none".into()
                } else {
                    names.join(", ")
                },
            });
        }
        None => {
            debug!("no profile '{profile_name}', using environment");
            Draft::from_environment(sources)
        }
    };

    draft
        .apply(overrides)
        .finish(profile_name, &config.defaults, overrides)
}
