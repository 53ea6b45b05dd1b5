//! Shared application state and the submission session

use std::sync::Arc;

use board::{Board, validate_draft, validate_submission};
use signboard_config::SignatureStyle;
use signboard_ipc::{SignRequest, Signature, SubmitSignatureRequest};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::error::SubmitError;
use crate::store::{SignatureStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub board: Arc<RwLock<Board>>,
    pub store: Arc<dyn SignatureStore>,
    pub style: SignatureStyle,
    /// Page size used when reading the whole store
    pub page_size: usize,
}

impl AppState {
    pub fn new(board: Board, store: Arc<dyn SignatureStore>, page_size: usize) -> Self {
        Self {
            style: *board.style(),
            board: Arc::new(RwLock::new(board)),
            store,
            page_size: page_size.max(1),
        }
    }

    /// Let the board pick a cell, store the signature, then draw it
    ///
    /// The board write lock is held from placement through commit, so two
    /// submissions in this process never receive the same cell. A store
    /// failure leaves the board untouched.
    pub async fn sign(&self, request: SignRequest) -> Result<Signature, SubmitError> {
        let draft = validate_draft(&request, &self.style)?;

        let mut board = self.board.write().await;
        let new = board.prepare(draft)?;
        let signature = self.store.create(new).await?;
        if let Err(e) = board.commit(signature.clone()) {
            error!("Stored signature {} could not be placed: {}", signature.id, e);
            return Err(e.into());
        }

        info!("Signature {} placed at {}", signature.id, signature.grid_position);
        Ok(signature)
    }

    /// Store a signature whose cell was chosen by the client
    ///
    /// The cell is not checked against the board before storing. The record
    /// is drawn only if its cell is still free.
    pub async fn record(&self, request: SubmitSignatureRequest) -> Result<Signature, SubmitError> {
        let new = validate_submission(&request, &self.style)?;

        let mut board = self.board.write().await;
        let signature = self.store.create(new).await?;
        if board.is_available(signature.grid_position) {
            if let Err(e) = board.commit(signature.clone()) {
                warn!("Signature {} stored but not drawn: {}", signature.id, e);
            }
        } else {
            warn!(
                "Signature {} stored for cell {} which is unavailable; not drawn",
                signature.id, signature.grid_position
            );
        }
        Ok(signature)
    }

    /// Every stored signature, newest first
    pub async fn list_all(&self) -> Result<Vec<Signature>, StoreError> {
        let mut all = Vec::new();
        loop {
            let page = self.store.list(self.page_size, all.len()).await?;
            let done = page.len() < self.page_size;
            all.extend(page);
            if done {
                return Ok(all);
            }
        }
    }

    /// Rebuild the board from the store; returns how many signatures were placed
    pub async fn reload(&self) -> Result<usize, StoreError> {
        let mut signatures = self.list_all().await?;
        // Oldest first so the earliest claim on a cell wins
        signatures.reverse();
        Ok(self.board.write().await.reload(signatures))
    }
}
