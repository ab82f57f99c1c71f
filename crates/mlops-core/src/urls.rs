//! URL builders for the hosted Git/DVC/MLflow endpoints.
//!
//! All endpoints live under `https://<host>/<user>/<repo>` with a suffix
//! selecting the service: `.git`, `.s3` or `.mlflow`.

use crate::credentials::Credentials;

/// Clone/push URL with basic-auth userinfo embedded.
pub fn authenticated_repo_url(host: &str, creds: &Credentials, repo: &str) -> String {
    format!(
        "https://{user}:{token}@{host}/{user}/{repo}.git",
        user = creds.user_name(),
        token = creds.token(),
    )
}

/// S3-compatible endpoint for the DVC remote.
pub fn storage_endpoint_url(host: &str, user: &str, repo: &str) -> String {
    format!("https://{host}/{user}/{repo}.s3")
}

pub fn tracking_uri(host: &str, user: &str, repo: &str) -> String {
    format!("https://{host}/{user}/{repo}.mlflow")
}
