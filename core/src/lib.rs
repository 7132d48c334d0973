#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Place Replay engine.
//!
//! This crate defines the vocabulary that connects the tile event logs, the
//! canvas compositor, the playback clock, and the adapters: pixel-update
//! events and their packed wire encoding, simulation timestamps, tile
//! coordinates, the color palette, and per-frame statistics. It carries no
//! behavior beyond decoding and small coordinate arithmetic; all mutation
//! lives in the crates that own state.

use serde::{Deserialize, Serialize};

/// Number of entries in a replay palette, fixed by the 6-bit color field.
pub const PALETTE_SIZE: usize = 64;

/// Opaque RGB color with byte channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Pure black.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Pure white, the initial canvas fill.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Full-intensity red, the overlay activity marker.
    pub const RED: Rgb = Rgb::new(255, 0, 0);

    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Simulation timestamp expressed in milliseconds since the dataset start
/// instant (2022-04-01T00:00:00Z for the r/place 2022 dataset).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SimTime(u32);

impl SimTime {
    /// Creates a timestamp from a raw millisecond offset.
    #[must_use]
    pub const fn from_millis(millis: u32) -> Self {
        Self(millis)
    }

    /// Millisecond offset since the dataset start instant.
    #[must_use]
    pub const fn as_millis(&self) -> u32 {
        self.0
    }

    /// Returns this timestamp advanced by `millis`, saturating at the
    /// representable maximum rather than wrapping.
    #[must_use]
    pub const fn saturating_add_millis(self, millis: u32) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

/// Position of a tile within the tile grid, measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex {
    x: u32,
    y: u32,
}

impl TileIndex {
    /// Creates a new tile grid position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based horizontal tile index.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based vertical tile index.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Global canvas coordinate of a tile's upper-left pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileOrigin {
    x: u32,
    y: u32,
}

impl TileOrigin {
    /// Creates a new tile origin from global pixel coordinates.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Derives the origin of a tile from its grid position and dimensions.
    #[must_use]
    pub const fn of_tile(tile: TileIndex, tile_width: u32, tile_height: u32) -> Self {
        Self {
            x: tile.x() * tile_width,
            y: tile.y() * tile_height,
        }
    }

    /// Global x coordinate of the tile's upper-left pixel.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Global y coordinate of the tile's upper-left pixel.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Packed 16-bit pixel-update field as stored in tile files.
///
/// Bit layout: bits 0-4 hold the tile-local x coordinate, bits 5-9 the
/// tile-local y coordinate, bits 10-15 the palette color index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackedPixel(u16);

impl PackedPixel {
    const COORD_MASK: u16 = 0b1_1111;
    const COLOR_MASK: u16 = 0b11_1111;

    /// Wraps a raw packed field read from a tile file.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Packs tile-local coordinates and a color index into the wire layout.
    ///
    /// Inputs are masked to their field widths (5, 5, and 6 bits).
    #[must_use]
    pub const fn pack(local_x: u8, local_y: u8, color_index: u8) -> Self {
        let x = local_x as u16 & Self::COORD_MASK;
        let y = local_y as u16 & Self::COORD_MASK;
        let c = color_index as u16 & Self::COLOR_MASK;
        Self(x | (y << 5) | (c << 10))
    }

    /// Raw 16-bit representation, suitable for re-serialization.
    #[must_use]
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Tile-local x coordinate (0-31).
    #[must_use]
    pub const fn local_x(&self) -> u8 {
        (self.0 & Self::COORD_MASK) as u8
    }

    /// Tile-local y coordinate (0-31).
    #[must_use]
    pub const fn local_y(&self) -> u8 {
        ((self.0 >> 5) & Self::COORD_MASK) as u8
    }

    /// Palette color index (0-63).
    #[must_use]
    pub const fn color_index(&self) -> u8 {
        ((self.0 >> 10) & Self::COLOR_MASK) as u8
    }
}

/// A single decoded pixel-update event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelEvent {
    /// Tile-local x coordinate (0-31).
    pub local_x: u8,
    /// Tile-local y coordinate (0-31).
    pub local_y: u8,
    /// Palette color index (0-63).
    pub color_index: u8,
    /// Identifier of the user that placed the pixel. Carried through for
    /// consumers interested in attribution; rendering never reads it.
    pub user_id: u32,
    /// Instant at which the pixel was placed.
    pub timestamp: SimTime,
}

impl PixelEvent {
    /// Decodes an event from its three wire columns.
    #[must_use]
    pub const fn from_columns(packed: PackedPixel, user_id: u32, timestamp: SimTime) -> Self {
        Self {
            local_x: packed.local_x(),
            local_y: packed.local_y(),
            color_index: packed.color_index(),
            user_id,
            timestamp,
        }
    }
}

/// Statistics reported by the replay engine after each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Number of events applied during the tick.
    pub applied: u64,
    /// Cumulative number of events applied since playback started.
    pub total_applied: u64,
}

/// Fixed table of 64 colors indexed by the 6-bit color field.
///
/// The default table is the r/place 2022 palette. Indices 0 and 6 both map
/// to black; the source dataset shipped with that duplicate slot and replay
/// preserves it verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
}

const DEFAULT_COLORS: [Rgb; 33] = [
    Rgb::new(0, 0, 0),
    Rgb::new(0, 204, 192),
    Rgb::new(148, 179, 255),
    Rgb::new(106, 92, 255),
    Rgb::new(0, 158, 170),
    Rgb::new(228, 171, 255),
    Rgb::new(0, 0, 0),
    Rgb::new(0, 117, 111),
    Rgb::new(0, 163, 104),
    Rgb::new(0, 204, 120),
    Rgb::new(36, 80, 164),
    Rgb::new(54, 144, 234),
    Rgb::new(73, 58, 193),
    Rgb::new(81, 82, 82),
    Rgb::new(81, 233, 244),
    Rgb::new(109, 0, 26),
    Rgb::new(109, 72, 47),
    Rgb::new(126, 237, 86),
    Rgb::new(129, 30, 159),
    Rgb::new(137, 141, 144),
    Rgb::new(156, 105, 38),
    Rgb::new(180, 74, 192),
    Rgb::new(190, 0, 57),
    Rgb::new(212, 215, 217),
    Rgb::new(222, 16, 127),
    Rgb::new(255, 56, 129),
    Rgb::new(255, 69, 0),
    Rgb::new(255, 153, 170),
    Rgb::new(255, 168, 0),
    Rgb::new(255, 180, 112),
    Rgb::new(255, 214, 53),
    Rgb::new(255, 248, 184),
    Rgb::new(255, 255, 255),
];

impl Palette {
    /// Creates a palette from a full 64-entry table.
    #[must_use]
    pub const fn from_colors(colors: [Rgb; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    /// Creates a palette from up to 64 leading entries, padding the
    /// remainder with black.
    ///
    /// Returns `None` when more than [`PALETTE_SIZE`] rows are provided.
    #[must_use]
    pub fn from_rows(rows: &[Rgb]) -> Option<Self> {
        if rows.len() > PALETTE_SIZE {
            return None;
        }

        let mut colors = [Rgb::BLACK; PALETTE_SIZE];
        colors[..rows.len()].copy_from_slice(rows);
        Some(Self { colors })
    }

    /// Color stored at the provided index.
    ///
    /// Indices are masked to the 6-bit field width, so every decodable
    /// color index resolves to an entry.
    #[must_use]
    pub const fn color(&self, index: u8) -> Rgb {
        self.colors[(index & 0b11_1111) as usize]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_rows(&DEFAULT_COLORS).unwrap_or(Self {
            colors: [Rgb::BLACK; PALETTE_SIZE],
        })
    }
}
