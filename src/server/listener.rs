use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};
use tower_http::trace::TraceLayer;

use super::signature;
use crate::event::{WebhookEvent, PULL_REQUEST_ACTIONS};
use crate::index::{IndexJob, IndexerSettings};
use crate::queue::{SubmitError, TaskQueue};

#[derive(Clone)]
struct AppState {
    tasks: TaskQueue<IndexJob>,
    secret: SecretString,
    github_client: Arc<Octocrab>,
    settings: Arc<IndexerSettings>,
}

async fn handle(
    State(mut state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, (StatusCode, String)> {
    let header = headers
        .get("X-Hub-Signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| (StatusCode::FORBIDDEN, "missing signature header".to_owned()))?;
    signature::validate(header, &body, state.secret.expose_secret().as_bytes()).map_err(
        |error| {
            tracing::warn!("rejected delivery: {error}");
            (StatusCode::FORBIDDEN, error.to_string())
        },
    )?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|error| (StatusCode::FORBIDDEN, format!("invalid request body: {error}")))?;

    let supported = event
        .action
        .as_deref()
        .is_some_and(|action| PULL_REQUEST_ACTIONS.contains(&action));
    let (true, Some(pull_request)) = (supported, event.pull_request) else {
        return Err((StatusCode::FORBIDDEN, "request not supported".to_owned()));
    };
    let Some(repository) = event.repository else {
        return Err((
            StatusCode::FORBIDDEN,
            "invalid request: repository needed".to_owned(),
        ));
    };

    let job = IndexJob::new(
        repository.owner.login,
        repository.name,
        pull_request.number,
        Arc::clone(&state.github_client),
        Arc::clone(&state.settings),
    );
    state.tasks.submit(job).await.map_err(|error| {
        let status = match error {
            SubmitError::Full => StatusCode::SERVICE_UNAVAILABLE,
            SubmitError::Closed => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, format!("failed to enqueue indexing job: {error}"))
    })?;
    Ok("ok")
}

pub(crate) fn listen(
    tasks: TaskQueue<IndexJob>,
    secret: SecretString,
    github_client: Arc<Octocrab>,
    settings: Arc<IndexerSettings>,
) -> Router {
    let state = AppState {
        tasks,
        secret,
        github_client,
        settings,
    };

    Router::new()
        .route("/", post(handle))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
