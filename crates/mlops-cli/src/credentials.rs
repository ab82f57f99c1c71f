use anyhow::Context;
use clap::Args;
use mlops_core::credentials::Credentials;

/// Account used for git identity, clone/push auth, DVC keys and MLflow.
#[derive(Args, Debug)]
pub struct CredentialArgs {
    /// DagsHub user name
    #[arg(long, env = "DAGSHUB_USER_NAME")]
    pub user: Option<String>,

    /// Email for the git identity
    #[arg(long, env = "DAGSHUB_EMAIL")]
    pub email: Option<String>,

    /// DagsHub access token
    #[arg(long, env = "DAGSHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl CredentialArgs {
    pub fn resolve(self) -> anyhow::Result<Credentials> {
        let user = required(self.user, "--user", "DAGSHUB_USER_NAME")?;
        let email = required(self.email, "--email", "DAGSHUB_EMAIL")?;
        let token = required(self.token, "--token", "DAGSHUB_TOKEN")?;
        Credentials::new(user, email, token).context("invalid credentials")
    }
}

fn required(value: Option<String>, flag: &str, env: &str) -> anyhow::Result<String> {
    value.ok_or_else(|| anyhow::anyhow!("missing {flag} (or set {env})"))
}
