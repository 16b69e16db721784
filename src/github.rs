//! GitHub App authentication.

use anyhow::Result;
use jsonwebtoken::EncodingKey;
use octocrab::models::AppId;
use octocrab::Octocrab;
use secrecy::SecretString;

/// Builds an app-authenticated client from the App ID and its RSA key.
pub(crate) fn app_client(app_id: u64, rsa_pem: &[u8]) -> Result<Octocrab> {
    let key = EncodingKey::from_rsa_pem(rsa_pem)?;
    Ok(Octocrab::builder().app(AppId(app_id), key).build()?)
}

/// Exchanges the app identity for a short-lived installation token scoped to
/// `owner/repo`, returning an installation client along with the raw token.
/// The token only ever leaves this process embedded in the indexer's clone
/// URL; it must not be logged.
pub(crate) async fn installation_token(
    app: &Octocrab,
    owner: &str,
    repo: &str,
) -> Result<(Octocrab, SecretString), octocrab::Error> {
    let installation = app.apps().get_repository_installation(owner, repo).await?;
    app.installation_and_token(installation.id).await
}
