use super::{Action, CredentialState, Gate, RequestContext};
use crate::token::unix_now;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// axum middleware running [`Gate::evaluate`] in front of every matched path.
///
/// Install with `axum::middleware::from_fn_with_state(gate, gate::gate)`.
pub async fn gate(State(gate): State<Arc<Gate>>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if !gate.matcher().matches(path) {
        return next.run(request).await;
    }

    let context = RequestContext::from_request(&request);
    let evaluation = gate.evaluate(&context, unix_now());

    if let Some(CredentialState::Invalid(failure)) = &evaluation.credential {
        warn!(
            path = %context.path,
            reason = failure.as_str(),
            "Rejected credential"
        );
    }

    debug!(
        path = %context.path,
        category = evaluation.category.as_str(),
        decision = evaluation.decision.as_str(),
        "Gate decision"
    );

    match gate.executor().execute(&evaluation.decision) {
        Action::Forward => next.run(request).await,
        Action::Respond(response) => response,
    }
}
