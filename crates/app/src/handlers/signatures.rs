//! Signature persistence endpoints

use std::convert::Infallible;

use signboard_ipc::{CREATED_MESSAGE, CreatedResponse, INTERNAL_ERROR, ListQuery, SubmitSignatureRequest};
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use super::{error_reply, json_body, json_reply, with_state};
use crate::error::SubmitError;
use crate::state::AppState;

/// GET /signatures and POST /signatures
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path("signatures")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<ListQuery>())
        .and(with_state(state.clone()))
        .and_then(list_signatures);

    let create = warp::path("signatures")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body::<SubmitSignatureRequest>())
        .and(with_state(state))
        .and_then(create_signature);

    list.or(create)
}

async fn list_signatures(query: ListQuery, state: AppState) -> Result<Response, Infallible> {
    match state.store.list(query.limit(), query.offset()).await {
        Ok(signatures) => Ok(json_reply(&signatures, StatusCode::OK)),
        Err(e) => {
            error!("Error fetching signatures: {}", e);
            Ok(error_reply(INTERNAL_ERROR, StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn create_signature(request: SubmitSignatureRequest, state: AppState) -> Result<Response, Infallible> {
    match state.record(request).await {
        Ok(signature) => Ok(json_reply(
            &CreatedResponse {
                message: CREATED_MESSAGE.to_string(),
                id: signature.id,
            },
            StatusCode::CREATED,
        )),
        Err(e) => Ok(submit_error_reply(&e)),
    }
}

/// Error response for a failed submission, logged by severity
pub(super) fn submit_error_reply(e: &SubmitError) -> Response {
    let status = e.status();
    if status.is_server_error() {
        error!("Error saving signature: {}", e);
    } else {
        warn!("Signature rejected: {}", e);
    }
    error_reply(e.public_message(), status)
}
