use crate::error::{MlopsError, Result};
use std::fmt;

/// Identity used for every authenticated call: git identity, clone/push
/// URLs, DVC remote keys and tracking credentials.
///
/// The token is never rendered by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user_name: String,
    email: String,
    token: String,
}

impl Credentials {
    pub fn new(
        user_name: impl Into<String>,
        email: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let creds = Self {
            user_name: user_name.into(),
            email: email.into(),
            token: token.into(),
        };
        creds.validate()?;
        Ok(creds)
    }

    fn validate(&self) -> Result<()> {
        if self.user_name.trim().is_empty() {
            return Err(MlopsError::InvalidCredentials("user name is empty".into()));
        }
        // The user name lands in the userinfo part of clone URLs.
        if self
            .user_name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ':' | '@' | '/'))
        {
            return Err(MlopsError::InvalidCredentials(format!(
                "user name '{}' contains characters not allowed in a URL",
                self.user_name
            )));
        }
        if self.email.trim().is_empty() {
            return Err(MlopsError::InvalidCredentials("email is empty".into()));
        }
        if self.token.trim().is_empty() {
            return Err(MlopsError::InvalidCredentials("token is empty".into()));
        }
        Ok(())
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("token", &"***")
            .finish()
    }
}
