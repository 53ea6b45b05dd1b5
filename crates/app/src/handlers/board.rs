//! Board endpoints: layout, placement, flips and the grid reference

use std::convert::Infallible;

use board::BoardError;
use signboard_ipc::{
    CREATED_MESSAGE, ClickRequest, FlipResponse, INTERNAL_ERROR, ReloadResponse, SignRequest, SignedResponse,
};
use tracing::{error, info};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use super::signatures::submit_error_reply;
use super::{error_reply, json_body, json_reply, png_reply, with_state};
use crate::state::AppState;

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let info = warp::path("board")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(board_info);

    let sign = warp::path!("board" / "signatures")
        .and(warp::post())
        .and(json_body::<SignRequest>())
        .and(with_state(state.clone()))
        .and_then(sign);

    let click = warp::path!("board" / "click")
        .and(warp::post())
        .and(json_body::<ClickRequest>())
        .and(with_state(state.clone()))
        .and_then(click);

    let flip = warp::path!("board" / "flip" / String)
        .and(warp::post())
        .and(with_state(state.clone()))
        .and_then(flip);

    let reload = warp::path!("board" / "reload")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and_then(reload);

    let reference = warp::path!("board" / "reference")
        .and(warp::get())
        .and(with_state(state))
        .and_then(reference);

    info.or(sign).or(click).or(flip).or(reload).or(reference)
}

/// GET /board - dimensions and usage for fitting the viewer
async fn board_info(state: AppState) -> Result<Response, Infallible> {
    let info = state.board.read().await.info();
    Ok(json_reply(&info, StatusCode::OK))
}

/// POST /board/signatures - the board chooses the cell
async fn sign(request: SignRequest, state: AppState) -> Result<Response, Infallible> {
    match state.sign(request).await {
        Ok(signature) => Ok(json_reply(
            &SignedResponse {
                message: CREATED_MESSAGE.to_string(),
                id: signature.id,
                grid_position: signature.grid_position,
            },
            StatusCode::CREATED,
        )),
        Err(e) => Ok(submit_error_reply(&e)),
    }
}

/// POST /board/click - toggle the signature under a board pixel, if any
async fn click(request: ClickRequest, state: AppState) -> Result<Response, Infallible> {
    let toggled = state.board.write().await.toggle_at(request.x, request.y);
    let response = match toggled {
        Some((id, flipped)) => FlipResponse { id: Some(id), flipped },
        None => FlipResponse {
            id: None,
            flipped: false,
        },
    };
    Ok(json_reply(&response, StatusCode::OK))
}

/// POST /board/flip/{id}
async fn flip(id: String, state: AppState) -> Result<Response, Infallible> {
    match state.board.write().await.toggle_flip(&id) {
        Ok(flipped) => Ok(json_reply(&FlipResponse { id: Some(id), flipped }, StatusCode::OK)),
        Err(e @ BoardError::UnknownSignature(_)) => Ok(error_reply(e.to_string(), StatusCode::NOT_FOUND)),
        Err(e) => {
            error!("Flip failed: {}", e);
            Ok(error_reply(INTERNAL_ERROR, StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

/// POST /board/reload - rebuild the board from the store
async fn reload(state: AppState) -> Result<Response, Infallible> {
    match state.reload().await {
        Ok(count) => {
            info!("Board reloaded with {} signatures", count);
            Ok(json_reply(&ReloadResponse { count }, StatusCode::OK))
        }
        Err(e) => {
            error!("Error reloading board: {}", e);
            Ok(error_reply(INTERNAL_ERROR, StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

/// GET /board/reference - grid with a label in every cell
async fn reference(state: AppState) -> Result<Response, Infallible> {
    let board = state.board.clone();
    let rendered = tokio::task::spawn_blocking(move || board.blocking_read().reference_png()).await;
    match rendered {
        Ok(Ok(png)) => Ok(png_reply(png)),
        Ok(Err(e)) => {
            error!("Error rendering grid reference: {}", e);
            Ok(error_reply(INTERNAL_ERROR, StatusCode::INTERNAL_SERVER_ERROR))
        }
        Err(e) => {
            error!("Grid reference task failed: {}", e);
            Ok(error_reply(INTERNAL_ERROR, StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}
