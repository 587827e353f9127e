//! Config subcommand handlers.

use std::fmt::Write;

use serde_json::Value;

use geoprov_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = config::config_path();
            let data = serde_json::json!({ "path": path });
            let out = output::render(global.output, &data, |_| path.display().to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let data = redacted_value(&cfg)?;
            let out = output::render(global.output, &data, |_| format_config_redacted(&cfg));
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetProfile {
            name,
            url,
            password_env,
            data_dir,
            default,
        } => {
            url::Url::parse(&url).map_err(|e| CliError::Validation {
                field: "url".into(),
                reason: format!("{e}: {url}"),
            })?;

            let path = config::config_path();
            let mut cfg = config::load_config_from(&path)?;
            let profile = cfg.profiles.entry(name.clone()).or_default();
            profile.url = url;
            if global.username.is_some() {
                profile.username.clone_from(&global.username);
            }
            if password_env.is_some() {
                profile.password_env = password_env;
            }
            if data_dir.is_some() {
                profile.data_dir = data_dir;
            }
            if default {
                cfg.default_profile = Some(name.clone());
            }
            config::save_config(&cfg)?;

            let data = serde_json::json!({ "profile": name, "path": path });
            let out = output::render(global.output, &data, |_| {
                output::done(&format!("saved profile '{name}' to {}", path.display()))
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

/// Format config for display, masking stored passwords.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "connect_timeout = {}", cfg.defaults.connect_timeout);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "url = \"{}\"", p.url);
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"{MASK}\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref dir) = p.data_dir {
            let _ = writeln!(out, "data_dir = \"{dir}\"");
        }
    }

    out.trim_end().to_owned()
}

/// The config as JSON with every profile password replaced by a mask.
fn redacted_value(cfg: &Config) -> Result<Value, CliError> {
    let mut value = serde_json::to_value(cfg).map_err(|e| CliError::Config {
        message: e.to_string(),
    })?;
    if let Some(profiles) = value.get_mut("profiles").and_then(Value::as_object_mut) {
        for profile in profiles.values_mut() {
            if let Some(password) = profile.get_mut("password") {
                if !password.is_null() {
                    *password = Value::String(MASK.into());
                }
            }
        }
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use geoprov_config::Profile;

    use super::*;

    fn config_with_secret() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "prod".into(),
            Profile {
                url: "https://maps.example.com/geoserver".into(),
                username: Some("admin".into()),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn text_masks_password() {
        let text = format_config_redacted(&config_with_secret());
        assert!(text.contains("[profiles.prod]"));
        assert!(text.contains("password = \"****\""));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn json_masks_password() {
        let value = redacted_value(&config_with_secret()).unwrap();
        assert_eq!(value["profiles"]["prod"]["password"], MASK);
        assert_eq!(value["profiles"]["prod"]["username"], "admin");
    }
}
