//! The board state object
//!
//! One [`Board`] owns everything the placement and tile paths share: the
//! grid, the placed signatures, the flipped set and the tile cache. The
//! caller decides how it is shared between threads; tile reads only need
//! `&self`.

use image::RgbaImage;
use parking_lot::Mutex;
use signboard_config::{BoardConfig, SignatureStyle};
use signboard_ipc::{BoardInfo, GridPosition, GridUsage, NewSignature, Signature};
use tracing::{debug, info, warn};

use crate::error::{BoardError, RenderError};
use crate::flip::FlippedState;
use crate::grid::{GridCoordinates, PixelPoint};
use crate::payload::{self, PayloadError};
use crate::placement::PlacementPolicy;
use crate::render::{BoardRenderer, PlacedSignature, SignatureIndex, TileRequest, encode_png};
use crate::tiles::{TileCache, TilePng};
use crate::validation::SignatureDraft;

pub struct Board {
    grid: GridCoordinates,
    policy: PlacementPolicy,
    style: SignatureStyle,
    renderer: BoardRenderer,
    signatures: SignatureIndex,
    flipped: FlippedState,
    cache: Mutex<TileCache>,
    /// Served when a tile fails to render and no older image exists
    blank_tile: TilePng,
}

impl Board {
    pub fn new(config: &BoardConfig) -> Result<Self, BoardError> {
        let grid = GridCoordinates::from_config(&config.grid)?;
        let renderer = BoardRenderer::new(grid, config.tiles.tile_size);
        let tile_size = config.tiles.tile_size;
        let blank_tile: TilePng = encode_png(&RgbaImage::new(tile_size, tile_size))?.into();

        debug!(
            "Board {}x{} cells ({}x{} px), {} placement, max level {}",
            grid.cols(),
            grid.rows(),
            grid.board_width(),
            grid.board_height(),
            config.placement,
            renderer.pyramid().max_level()
        );

        Ok(Self {
            grid,
            policy: config.placement.into(),
            style: config.signature,
            renderer,
            signatures: SignatureIndex::new(),
            flipped: FlippedState::new(),
            cache: Mutex::new(TileCache::new()),
            blank_tile,
        })
    }

    #[inline]
    pub fn grid(&self) -> &GridCoordinates {
        &self.grid
    }

    #[inline]
    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    #[inline]
    pub fn style(&self) -> &SignatureStyle {
        &self.style
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Placed signatures in insertion order
    pub fn signatures(&self) -> impl Iterator<Item = &Signature> {
        self.signatures.entries().iter().map(|placed| &placed.signature)
    }

    pub fn get(&self, id: &str) -> Option<&Signature> {
        self.signatures.get(id).map(|placed| &placed.signature)
    }

    /// Replace the board contents, oldest first
    ///
    /// Records whose cell is invalid or already taken are skipped, so the
    /// earliest claim on a cell wins. Resets the flipped set and the tile
    /// cache. Returns the number of signatures placed.
    pub fn reload<I>(&mut self, signatures: I) -> usize
    where
        I: IntoIterator<Item = Signature>,
    {
        self.signatures.clear();
        self.flipped.clear();
        self.cache.lock().clear();

        let mut skipped = 0;
        for signature in signatures {
            let id = signature.id.clone();
            let placed = self.prepare_placed(signature);
            if let Err(e) = self.signatures.insert(&self.grid, placed) {
                warn!("Skipping signature {} on reload: {}", id, e);
                skipped += 1;
            }
        }

        info!(
            "Board loaded {} signatures ({} skipped)",
            self.signatures.len(),
            skipped
        );
        self.signatures.len()
    }

    /// Cell the placement policy would give the next signature
    pub fn place_next(&self) -> Result<GridPosition, BoardError> {
        Ok(self.policy.assign(&self.grid, &self.signatures)?)
    }

    /// Give a validated draft its cell; nothing is committed
    pub fn prepare(&self, draft: SignatureDraft) -> Result<NewSignature, BoardError> {
        let position = self.place_next()?;
        Ok(draft.place(position))
    }

    /// True when `position` is on the grid and free
    pub fn is_available(&self, position: GridPosition) -> bool {
        self.grid.can_place_signature(position, &self.signatures)
    }

    /// Add a stored signature to the board and invalidate the tiles it covers
    pub fn commit(&mut self, signature: Signature) -> Result<(), BoardError> {
        let placed = self.prepare_placed(signature);
        let bounds = placed.bounds;
        let position = placed.position();
        self.signatures.insert(&self.grid, placed)?;

        let mut cache = self.cache.lock();
        let invalidated = cache.invalidate(self.renderer.tiles_covering(&bounds));
        debug!(
            "Committed cell {}, {} of {} cached tiles invalidated",
            position,
            invalidated,
            invalidated + cache.len()
        );
        Ok(())
    }

    /// Flip a signature between face and back; returns true when it now shows its back
    pub fn toggle_flip(&mut self, id: &str) -> Result<bool, BoardError> {
        let bounds = self
            .signatures
            .get(id)
            .map(|placed| placed.bounds)
            .ok_or_else(|| BoardError::UnknownSignature(id.to_string()))?;

        let flipped = self.flipped.toggle(id);
        self.cache.lock().invalidate(self.renderer.tiles_covering(&bounds));
        debug!("Signature {} flipped={}", id, flipped);
        Ok(flipped)
    }

    /// Toggle whichever signature's box contains the board pixel (x, y)
    pub fn toggle_at(&mut self, x: f64, y: f64) -> Option<(String, bool)> {
        let id = self.signatures.hit(PixelPoint::new(x, y))?.id().to_string();
        let flipped = self.toggle_flip(&id).ok()?;
        Some((id, flipped))
    }

    #[inline]
    pub fn is_flipped(&self, id: &str) -> bool {
        self.flipped.is_flipped(id)
    }

    /// Encoded tile, from the cache when possible
    ///
    /// Only requests outside the pyramid fail. A tile that cannot be
    /// rendered degrades to its last cached image, else a blank tile.
    pub fn tile_png(&self, request: TileRequest) -> Result<TilePng, BoardError> {
        self.serve_tile(request, |request| {
            let image = self.renderer.render_tile(&self.signatures, &self.flipped, request)?;
            Ok(encode_png(&image)?)
        })
    }

    fn serve_tile<F>(&self, request: TileRequest, render: F) -> Result<TilePng, BoardError>
    where
        F: FnOnce(TileRequest) -> Result<Vec<u8>, BoardError>,
    {
        if let Some(png) = self.cache.lock().get(request) {
            return Ok(png);
        }

        match render(request) {
            Ok(png) => {
                let png: TilePng = png.into();
                self.cache.lock().insert(request, png.clone());
                Ok(png)
            }
            Err(BoardError::TileOutOfBounds(request)) => Err(BoardError::TileOutOfBounds(request)),
            Err(e) => {
                warn!(
                    "Tile {}/{}/{} failed to render: {}",
                    request.level, request.x, request.y, e
                );
                Ok(self
                    .cache
                    .lock()
                    .stale(request)
                    .unwrap_or_else(|| self.blank_tile.clone()))
            }
        }
    }

    /// PNG of the whole grid with a `col,row` label in each cell
    pub fn reference_png(&self) -> Result<Vec<u8>, RenderError> {
        encode_png(&self.renderer.render_reference()?)
    }

    pub fn usage(&self) -> GridUsage {
        self.grid.count_grid_usage(&self.signatures)
    }

    /// Everything the viewer needs to fit the board and request tiles
    pub fn info(&self) -> BoardInfo {
        BoardInfo {
            width: self.grid.board_width(),
            height: self.grid.board_height(),
            tile_size: self.renderer.tile_size(),
            tile_overlap: 0,
            max_level: self.renderer.pyramid().max_level(),
            cols: self.grid.cols(),
            rows: self.grid.rows(),
            cell_width: self.grid.cell_width(),
            cell_height: self.grid.cell_height(),
            usage: self.usage(),
        }
    }

    /// Decode the drawing once, at the size it is drawn
    fn prepare_placed(&self, signature: Signature) -> PlacedSignature {
        let strokes = match payload::decode_drawing_scaled(&signature.data, signature.width, signature.height) {
            Ok(strokes) => Some(strokes),
            Err(PayloadError::Empty) => None,
            Err(e) => {
                warn!("Signature {} drawing not decodable, drawing fill only: {}", signature.id, e);
                None
            }
        };
        PlacedSignature::new(&self.grid, signature, strokes)
    }
}
