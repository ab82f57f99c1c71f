//! MLflow tracking endpoint registration.
//!
//! MLflow clients pick up their server and basic-auth credentials from the
//! environment, so registering an endpoint amounts to publishing three
//! variables to whoever launches the client.

use serde::Serialize;
use std::fmt;

pub const URI_VAR: &str = "MLFLOW_TRACKING_URI";
pub const USERNAME_VAR: &str = "MLFLOW_TRACKING_USERNAME";
pub const PASSWORD_VAR: &str = "MLFLOW_TRACKING_PASSWORD";

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct TrackingRegistration {
    pub uri: String,
    pub username: String,
    #[serde(skip_serializing)]
    password: String,
}

impl TrackingRegistration {
    pub fn new(
        uri: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Credentials first, then the URI.
    pub fn env_vars(&self) -> [(&'static str, &str); 3] {
        [
            (USERNAME_VAR, self.username.as_str()),
            (PASSWORD_VAR, self.password.as_str()),
            (URI_VAR, self.uri.as_str()),
        ]
    }

    /// POSIX `export` lines suitable for `eval "$(mlops tracking ...)"`.
    pub fn shell_exports(&self) -> String {
        self.env_vars()
            .iter()
            .map(|(k, v)| format!("export {k}={}\n", shell_quote(v)))
            .collect()
    }
}

impl fmt::Debug for TrackingRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingRegistration")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Receives a tracking endpoint once identity is in place.
pub trait TrackingClient {
    fn register(&mut self, registration: &TrackingRegistration) -> crate::Result<()>;
}

/// Publishes the endpoint through this process's environment, where an
/// in-process or child MLflow client reads it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvTrackingClient;

impl TrackingClient for EnvTrackingClient {
    fn register(&mut self, registration: &TrackingRegistration) -> crate::Result<()> {
        for (key, value) in registration.env_vars() {
            std::env::set_var(key, value);
        }
        tracing::info!(uri = %registration.uri, "tracking endpoint registered");
        Ok(())
    }
}
