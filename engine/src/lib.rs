#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-by-frame replay orchestration.
//!
//! The engine owns the playback clock, the canvas compositor, and the set
//! of tile logs selected at startup. Each [`ReplayEngine::tick`] advances
//! the clock one step, drains every tile up to the new timestamp, applies
//! the drained events to the canvas, and fades the activity overlay. All
//! work is synchronous; the presentation layer decides when ticks happen.

use place_replay_canvas::CanvasCompositor;
use place_replay_core::{FrameStats, SimTime, TileIndex};
use place_replay_system_playback::PlaybackClock;
use place_replay_system_tile_log::{ParseError, TileLog};

/// Static region-of-interest policy applied once when tiles are loaded.
///
/// Tiles whose grid position falls outside the configured bounds never
/// enter the playback set; the filter is not re-evaluated per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileFilter {
    max_tile_x: Option<u32>,
    max_tile_y: Option<u32>,
}

impl TileFilter {
    /// Accepts every tile.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_tile_x: None,
            max_tile_y: None,
        }
    }

    /// Accepts tiles with `tile_x < max_x` and `tile_y < max_y`.
    #[must_use]
    pub const fn below(max_x: u32, max_y: u32) -> Self {
        Self {
            max_tile_x: Some(max_x),
            max_tile_y: Some(max_y),
        }
    }

    /// Whether the tile at the provided grid position is of interest.
    #[must_use]
    pub fn contains(&self, tile: TileIndex) -> bool {
        let below_x = self.max_tile_x.map_or(true, |bound| tile.x() < bound);
        let below_y = self.max_tile_y.map_or(true, |bound| tile.y() < bound);
        below_x && below_y
    }
}

/// Tile excluded from playback because its file could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedTile {
    /// Identifier of the offending file, as named by the storage layer.
    pub file: String,
    /// Parse failure that excluded the tile.
    pub error: ParseError,
}

/// Parses raw tile buffers into logs, applying the region filter.
///
/// A buffer that fails to parse excludes that tile only: it is reported in
/// the second return value and playback proceeds without it. Parsed tiles
/// outside the filter are discarded silently.
#[must_use]
pub fn load_tile_logs<I>(buffers: I, filter: &TileFilter) -> (Vec<TileLog>, Vec<SkippedTile>)
where
    I: IntoIterator<Item = (String, Vec<u8>)>,
{
    let mut logs = Vec::new();
    let mut skipped = Vec::new();

    for (file, bytes) in buffers {
        match TileLog::load(&bytes) {
            Ok(log) => {
                if filter.contains(log.tile()) {
                    logs.push(log);
                }
            }
            Err(error) => skipped.push(SkippedTile { file, error }),
        }
    }

    (logs, skipped)
}

/// Owns the clock, the canvas, and the tile set, and drives playback.
#[derive(Debug)]
pub struct ReplayEngine {
    clock: PlaybackClock,
    compositor: CanvasCompositor,
    tiles: Vec<TileLog>,
    total_applied: u64,
}

impl ReplayEngine {
    /// Creates an engine over an already-filtered tile set.
    #[must_use]
    pub fn new(clock: PlaybackClock, compositor: CanvasCompositor, tiles: Vec<TileLog>) -> Self {
        Self {
            clock,
            compositor,
            tiles,
            total_applied: 0,
        }
    }

    /// Canvas state accumulated so far.
    #[must_use]
    pub fn compositor(&self) -> &CanvasCompositor {
        &self.compositor
    }

    /// Current simulation timestamp.
    #[must_use]
    pub fn current_time(&self) -> SimTime {
        self.clock.current()
    }

    /// Number of tiles participating in playback.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Advances playback by one frame.
    ///
    /// Clock first, then a full drain of every tile up to the new
    /// timestamp, then one overlay decay step. Returns the per-frame and
    /// cumulative applied-event counts.
    pub fn tick(&mut self) -> FrameStats {
        let Self {
            clock,
            compositor,
            tiles,
            total_applied,
        } = self;

        let next = clock.advance();
        let mut applied: u64 = 0;
        for tile in tiles.iter_mut() {
            let origin = tile.origin();
            for event in tile.drain_until(next) {
                compositor.apply(&event, origin);
                applied += 1;
            }
        }
        compositor.decay_overlay();

        *total_applied += applied;
        FrameStats {
            applied,
            total_applied: *total_applied,
        }
    }

    /// Jumps playback to an arbitrary timestamp.
    ///
    /// Re-seeks the clock and every tile cursor. The canvas is not
    /// rebuilt: pixels painted before the jump remain until events after
    /// the target overwrite them. Seek to zero first for a clean replay.
    pub fn seek_to(&mut self, target: SimTime) {
        self.clock.seek(target);
        for tile in &mut self.tiles {
            tile.seek(target);
        }
    }
}
