use serde::Deserialize;

/// Pull request actions that trigger an indexing run.
pub(crate) const PULL_REQUEST_ACTIONS: [&str; 3] = ["opened", "closed", "reopened"];

/// A stripped down version of GitHub's pull request webhook payload.
///
/// Every field is optional at the parse layer; the listener decides whether
/// a delivery is actionable. Unknown payload fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WebhookEvent {
    /// The repository this event corresponds to
    pub(crate) repository: Option<Repository>,
    /// The action this event represents, e.g. "opened"
    pub(crate) action: Option<String>,
    /// The pull request this event corresponds to
    pub(crate) pull_request: Option<PullRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Repository {
    pub(crate) owner: Owner,
    pub(crate) name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Owner {
    pub(crate) login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PullRequest {
    pub(crate) number: u64,
}
