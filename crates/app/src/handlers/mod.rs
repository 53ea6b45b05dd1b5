//! HTTP route handlers
//!
//! Organized by functional area:
//! - `signatures`: the persistence surface (`/signatures`)
//! - `board`: placement, flips, reload and the grid reference (`/board`)
//! - `tiles`: tile images for the viewer (`/tiles/{level}/{x}/{y}`)
//! - `health`: liveness check

pub mod board;
pub mod health;
pub mod signatures;
pub mod tiles;

use std::convert::Infallible;

use serde::Serialize;
use serde::de::DeserializeOwned;
use signboard_ipc::ErrorResponse;
use tracing::{debug, error};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::state::AppState;

/// Largest request body accepted; drawings arrive as base64 PNGs
const MAX_BODY_BYTES: u64 = 2 * 1024 * 1024;

/// Compose all routes into a single filter
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    signatures::routes(state.clone())
        .or(board::routes(state.clone()))
        .or(tiles::route(state))
        .or(health::route())
        .recover(handle_rejection)
}

/// Hand a clone of the state to each request
fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Size-limited JSON body
fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn error_reply(message: impl Into<String>, status: StatusCode) -> Response {
    json_reply(&ErrorResponse::new(message), status)
}

fn png_reply(bytes: impl AsRef<[u8]>) -> Response {
    warp::reply::with_header(bytes.as_ref().to_vec(), "content-type", "image/png").into_response()
}

/// Turn unmatched routes and malformed requests into JSON errors
async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length required".to_string())
    } else if rejection.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected a JSON body".to_string())
    } else if rejection.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query string".to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", rejection);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };
    debug!("Request rejected with {}: {}", status, message);
    Ok(error_reply(message, status))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use ::board::Board;
    use serde_json::{Value, json};
    use signboard_config::{BoardConfig, GridConfig, PlacementStrategy, TileConfig};
    use signboard_ipc::{
        CREATED_MESSAGE, INTERNAL_ERROR, MISSING_FIELDS_ERROR, NO_SPACE_ERROR, NewSignature, Signature,
    };

    use super::*;
    use crate::store::{MemoryStore, SignatureStore, StoreError};

    struct FailingStore;

    #[async_trait]
    impl SignatureStore for FailingStore {
        async fn create(&self, _signature: NewSignature) -> Result<Signature, StoreError> {
            Err(StoreError::Io(std::io::Error::other("store offline")))
        }

        async fn list(&self, _limit: usize, _offset: usize) -> Result<Vec<Signature>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("store offline")))
        }

        async fn insert(&self, _signature: Signature) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("store offline")))
        }

        async fn count(&self) -> Result<usize, StoreError> {
            Err(StoreError::Io(std::io::Error::other("store offline")))
        }
    }

    fn board(cols: u32, rows: u32) -> Board {
        let config = BoardConfig {
            grid: GridConfig {
                cols,
                rows,
                ..GridConfig::default()
            },
            tiles: TileConfig { tile_size: 256 },
            placement: PlacementStrategy::CenterSeeking,
            ..BoardConfig::default()
        };
        Board::new(&config).unwrap()
    }

    fn state_with(store: Arc<dyn SignatureStore>, cols: u32, rows: u32) -> AppState {
        AppState::new(board(cols, rows), store, 100)
    }

    fn state(cols: u32, rows: u32) -> AppState {
        state_with(Arc::new(MemoryStore::new()), cols, rows)
    }

    fn body(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    fn submission() -> Value {
        json!({
            "data": "data:image/png;base64,AAAA",
            "color": "red",
            "gridPosition": {"col": 1, "row": 2},
            "location": "Lisbon"
        })
    }

    #[tokio::test]
    async fn test_post_missing_color_is_rejected() {
        let state = state(3, 3);
        let api = routes(state.clone());
        let response = warp::test::request()
            .method("POST")
            .path("/signatures")
            .json(&json!({"data": "data:image/png;base64,AAAA", "gridPosition": {"col": 0, "row": 0}}))
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(&response), json!({"error": MISSING_FIELDS_ERROR}));
        assert_eq!(state.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_post_and_list_signatures() {
        let state = state(3, 3);
        let api = routes(state.clone());
        let response = warp::test::request()
            .method("POST")
            .path("/signatures")
            .json(&submission())
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body(&response);
        assert_eq!(created["message"], CREATED_MESSAGE);
        let id = created["id"].as_str().unwrap().to_string();

        let response = warp::test::request().path("/signatures?limit=abc&offset=-3").reply(&api).await;
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body(&response);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], id.as_str());
        assert_eq!(listed[0]["gridPosition"], json!({"col": 1, "row": 2}));
        assert_eq!(listed[0]["location"], "Lisbon");

        // Accepted records are drawn on the live board too
        assert!(state.board.read().await.get(&id).is_some());
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let api = routes(state_with(Arc::new(FailingStore), 3, 3));

        let response = warp::test::request()
            .method("POST")
            .path("/signatures")
            .json(&submission())
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(&response), json!({"error": INTERNAL_ERROR}));

        let response = warp::test::request().path("/signatures").reply(&api).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_board_sign_until_full() {
        let state = state(1, 1);
        let api = routes(state.clone());
        let request = json!({"data": "data:image/png;base64,AAAA", "color": "green"});

        let response = warp::test::request()
            .method("POST")
            .path("/board/signatures")
            .json(&request)
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body(&response)["gridPosition"], json!({"col": 0, "row": 0}));

        let response = warp::test::request()
            .method("POST")
            .path("/board/signatures")
            .json(&request)
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body(&response), json!({"error": NO_SPACE_ERROR}));
        assert_eq!(state.store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_board_sign_store_failure_commits_nothing() {
        let state = state_with(Arc::new(FailingStore), 3, 3);
        let api = routes(state.clone());
        let response = warp::test::request()
            .method("POST")
            .path("/board/signatures")
            .json(&json!({"data": "data:image/png;base64,AAAA", "color": "green"}))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(state.board.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_board_info_and_tiles() {
        let api = routes(state(3, 3));
        let response = warp::test::request().path("/board").reply(&api).await;
        assert_eq!(response.status(), StatusCode::OK);
        let info = body(&response);
        assert_eq!(info["width"], 234);
        assert_eq!(info["height"], 159);
        assert_eq!(info["tileSize"], 256);
        let max_level = info["maxLevel"].as_u64().unwrap();

        let response = warp::test::request()
            .path(&format!("/tiles/{}/0/0", max_level))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/png");
        assert_eq!(&response.body()[1..4], b"PNG");

        let response = warp::test::request()
            .path(&format!("/tiles/{}/5/0", max_level))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_click_and_flip() {
        let state = state(3, 3);
        let api = routes(state.clone());
        warp::test::request()
            .method("POST")
            .path("/board/signatures")
            .json(&json!({"data": "data:image/png;base64,AAAA", "color": "pink"}))
            .reply(&api)
            .await;
        let id = state.board.read().await.signatures().next().unwrap().id.clone();

        // Center of cell (1,1)
        let response = warp::test::request()
            .method("POST")
            .path("/board/click")
            .json(&json!({"x": 117.0, "y": 79.5}))
            .reply(&api)
            .await;
        assert_eq!(body(&response), json!({"id": id, "flipped": true}));

        let response = warp::test::request()
            .method("POST")
            .path("/board/click")
            .json(&json!({"x": 1.0, "y": 1.0}))
            .reply(&api)
            .await;
        assert_eq!(body(&response), json!({"id": null, "flipped": false}));

        let response = warp::test::request()
            .method("POST")
            .path(&format!("/board/flip/{}", id))
            .reply(&api)
            .await;
        assert_eq!(body(&response), json!({"id": id, "flipped": false}));

        let response = warp::test::request()
            .method("POST")
            .path("/board/flip/nope")
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reload_and_reference() {
        let state = state(4, 4);
        let api = routes(state.clone());
        crate::seed::seed_if_empty(state.store.as_ref()).await.unwrap();

        let response = warp::test::request().method("POST").path("/board/reload").reply(&api).await;
        assert_eq!(body(&response), json!({"count": 7}));
        assert_eq!(state.board.read().await.len(), 7);

        let response = warp::test::request().path("/board/reference").reply(&api).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/png");
    }

    #[tokio::test]
    async fn test_unknown_route_and_bad_body() {
        let api = routes(state(3, 3));
        let response = warp::test::request().path("/nope").reply(&api).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = warp::test::request()
            .method("POST")
            .path("/signatures")
            .header("content-type", "application/json")
            .body("{not json")
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = warp::test::request().path("/health").reply(&api).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
