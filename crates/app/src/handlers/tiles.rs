//! Tile endpoint for the pan/zoom viewer

use std::convert::Infallible;

use board::{BoardError, TileRequest};
use signboard_ipc::INTERNAL_ERROR;
use tracing::error;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use super::{error_reply, png_reply, with_state};
use crate::state::AppState;

/// GET /tiles/{level}/{x}/{y} - one PNG tile of the zoom pyramid
pub fn route(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("tiles" / u32 / u32 / u32)
        .and(warp::get())
        .and(with_state(state))
        .and_then(tile)
}

async fn tile(level: u32, x: u32, y: u32, state: AppState) -> Result<Response, Infallible> {
    let request = TileRequest::new(level, x, y);
    let board = state.board.clone();
    let rendered = tokio::task::spawn_blocking(move || board.blocking_read().tile_png(request)).await;
    match rendered {
        Ok(Ok(png)) => Ok(png_reply(png)),
        Ok(Err(e @ BoardError::TileOutOfBounds(_))) => Ok(error_reply(e.to_string(), StatusCode::NOT_FOUND)),
        Ok(Err(e)) => {
            error!("Error serving tile {}/{}/{}: {}", level, x, y, e);
            Ok(error_reply(INTERNAL_ERROR, StatusCode::INTERNAL_SERVER_ERROR))
        }
        Err(e) => {
            error!("Tile task failed: {}", e);
            Ok(error_reply(INTERNAL_ERROR, StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}
