use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// HTTP Basic credentials for the GeoServer administration API.
///
/// Fixed for the lifetime of the client that owns them. The password stays
/// wrapped in [`SecretString`] so it never shows up in `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Build credentials, rejecting an empty username or password.
    pub fn new(username: impl Into<String>, password: SecretString) -> Result<Self, Error> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(Error::MissingValue { field: "username" });
        }
        if password.expose_secret().is_empty() {
            return Err(Error::MissingValue { field: "password" });
        }
        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Attach Basic auth to an outgoing request.
    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.username, Some(self.password.expose_secret()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_username_is_missing() {
        let err = Credentials::new("  ", SecretString::from("geoserver")).unwrap_err();
        assert!(matches!(err, Error::MissingValue { field: "username" }));
    }

    #[test]
    fn empty_password_is_missing() {
        let err = Credentials::new("admin", SecretString::from("")).unwrap_err();
        assert!(matches!(err, Error::MissingValue { field: "password" }));
    }

    #[test]
    fn debug_output_hides_password() {
        let creds = Credentials::new("admin", SecretString::from("geoserver")).unwrap();
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("geoserver"));
    }
}
