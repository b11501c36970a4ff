use super::{
    decision::{evaluate, GateDecision, GateRequest},
    paths::{should_gate, LocalizedPath, Locales},
};
use crate::cookies::RequestCookies;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, info};

/// Gate configuration shared by every request.
#[derive(Clone, Debug, Default)]
pub struct GateConfig {
    pub locales: Locales,
}

/// Axum middleware: allow the request or answer with a `307` to the
/// canonical destination. Install with `middleware::from_fn_with_state`.
pub async fn gate(State(config): State<Arc<GateConfig>>, request: Request, next: Next) -> Response {
    let raw_path = request.uri().path();
    if !should_gate(raw_path) {
        return next.run(request).await;
    }

    let path = LocalizedPath::parse(raw_path, &config.locales);
    let cookies = RequestCookies::from_headers(request.headers());
    let session = cookies.resolved_session();

    let decision = evaluate(&GateRequest {
        path: &path,
        token: session.access_token.as_deref(),
        session: &session,
    });

    match decision {
        GateDecision::Allow => {
            debug!(path = path.original(), "gate allowed request");
            next.run(request).await
        }
        GateDecision::Redirect(redirect) => {
            let location = redirect.location(&path);
            info!(
                path = path.original(),
                location = location.as_str(),
                "gate redirected request"
            );
            Redirect::temporary(&location).into_response()
        }
    }
}
