#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable per-tile event log with time-indexed replay.
//!
//! A [`TileLog`] is parsed once from a raw tile file buffer and never
//! mutated afterwards except for its drain cursor. Timestamps are ascending
//! by construction of the dataset, which makes seeking a binary search and
//! forward playback an incremental drain that touches every event exactly
//! once across the whole run.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use place_replay_core::{PackedPixel, PixelEvent, SimTime, TileIndex, TileOrigin};
use thiserror::Error;

/// Bytes occupied by the five-field tile file header.
const HEADER_BYTES: usize = 20;

/// Bytes occupied by one event across the three column arrays.
const EVENT_BYTES: usize = 2 + 4 + 4;

/// Defensive ceiling on the declared event count. The dataset's real tiles
/// stay far below this; anything above it is a corrupt file.
const MAX_EVENTS: u32 = 1 << 24;

/// Defensive ceiling on tile edge length in pixels.
const MAX_TILE_EDGE: u32 = 4096;

/// Defensive ceiling on tile grid coordinates. Together with
/// [`MAX_TILE_EDGE`] this keeps the derived origin within `u32` range, so
/// origin arithmetic never overflows for a loaded tile.
const MAX_TILE_INDEX: u32 = 1 << 16;

/// Header field that failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeaderField {
    /// Tile width (`res_x`).
    TileWidth,
    /// Tile height (`res_y`).
    TileHeight,
    /// Horizontal tile grid coordinate (`tile_x`).
    TileX,
    /// Vertical tile grid coordinate (`tile_y`).
    TileY,
    /// Declared event count (`n`).
    EventCount,
}

/// Errors produced while parsing a tile file buffer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The buffer ends before the declared layout does.
    #[error("tile file truncated: layout requires {expected} bytes, buffer holds {actual}")]
    Truncated {
        /// Bytes the header-declared layout requires.
        expected: usize,
        /// Bytes actually available in the buffer.
        actual: usize,
    },
    /// A header value lies outside its sane range.
    #[error("tile file malformed: header field {field:?} holds implausible value {value}")]
    Malformed {
        /// Field whose value failed validation.
        field: HeaderField,
        /// Value read from the header.
        value: u32,
    },
}

/// Immutable, time-ordered log of one tile's pixel updates.
#[derive(Clone, Debug)]
pub struct TileLog {
    tile: TileIndex,
    tile_width: u32,
    tile_height: u32,
    packed: Vec<u16>,
    user_ids: Vec<u32>,
    timestamps: Vec<u32>,
    cursor: usize,
}

impl TileLog {
    /// Parses a tile log from a raw file buffer.
    ///
    /// The layout is little-endian: a header of five `u32` values
    /// (`res_x`, `res_y`, `tile_x`, `tile_y`, `n`) followed by `n` packed
    /// `u16` fields, `n` `u32` user ids, and `n` `u32` timestamps.
    pub fn load(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() < HEADER_BYTES {
            return Err(ParseError::Truncated {
                expected: HEADER_BYTES,
                actual: bytes.len(),
            });
        }

        let mut reader = Cursor::new(bytes);
        let tile_width = read_u32(&mut reader)?;
        let tile_height = read_u32(&mut reader)?;
        let tile_x = read_u32(&mut reader)?;
        let tile_y = read_u32(&mut reader)?;
        let declared = read_u32(&mut reader)?;

        if tile_width == 0 || tile_width > MAX_TILE_EDGE {
            return Err(ParseError::Malformed {
                field: HeaderField::TileWidth,
                value: tile_width,
            });
        }
        if tile_height == 0 || tile_height > MAX_TILE_EDGE {
            return Err(ParseError::Malformed {
                field: HeaderField::TileHeight,
                value: tile_height,
            });
        }
        if tile_x > MAX_TILE_INDEX {
            return Err(ParseError::Malformed {
                field: HeaderField::TileX,
                value: tile_x,
            });
        }
        if tile_y > MAX_TILE_INDEX {
            return Err(ParseError::Malformed {
                field: HeaderField::TileY,
                value: tile_y,
            });
        }
        if declared > MAX_EVENTS {
            return Err(ParseError::Malformed {
                field: HeaderField::EventCount,
                value: declared,
            });
        }

        let n = declared as usize;
        let expected = HEADER_BYTES + n * EVENT_BYTES;
        if bytes.len() < expected {
            return Err(ParseError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }

        let mut packed = Vec::with_capacity(n);
        for _ in 0..n {
            packed.push(read_u16(&mut reader)?);
        }
        let mut user_ids = Vec::with_capacity(n);
        for _ in 0..n {
            user_ids.push(read_u32(&mut reader)?);
        }
        let mut timestamps = Vec::with_capacity(n);
        for _ in 0..n {
            timestamps.push(read_u32(&mut reader)?);
        }

        Ok(Self {
            tile: TileIndex::new(tile_x, tile_y),
            tile_width,
            tile_height,
            packed,
            user_ids,
            timestamps,
            cursor: 0,
        })
    }

    /// Serializes the log back into the exact on-disk layout it was parsed
    /// from. The drain cursor is runtime state and is not part of the
    /// layout.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_BYTES + self.len() * EVENT_BYTES);
        write_u32(&mut bytes, self.tile_width);
        write_u32(&mut bytes, self.tile_height);
        write_u32(&mut bytes, self.tile.x());
        write_u32(&mut bytes, self.tile.y());
        write_u32(&mut bytes, self.len() as u32);
        for &value in &self.packed {
            write_u16(&mut bytes, value);
        }
        for &value in &self.user_ids {
            write_u32(&mut bytes, value);
        }
        for &value in &self.timestamps {
            write_u32(&mut bytes, value);
        }
        bytes
    }

    /// Grid position of the tile.
    #[must_use]
    pub const fn tile(&self) -> TileIndex {
        self.tile
    }

    /// Width of the tile in pixels.
    #[must_use]
    pub const fn tile_width(&self) -> u32 {
        self.tile_width
    }

    /// Height of the tile in pixels.
    #[must_use]
    pub const fn tile_height(&self) -> u32 {
        self.tile_height
    }

    /// Global canvas coordinate of the tile's upper-left pixel.
    #[must_use]
    pub const fn origin(&self) -> TileOrigin {
        TileOrigin::of_tile(self.tile, self.tile_width, self.tile_height)
    }

    /// Number of events stored in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the log holds no events at all. Empty tiles are valid; every
    /// operation on them is a no-op.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Index of the next undrained event, in `[0, len]`.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Timestamp of the next undrained event, if any remain.
    #[must_use]
    pub fn peek_timestamp(&self) -> Option<SimTime> {
        self.timestamps
            .get(self.cursor)
            .copied()
            .map(SimTime::from_millis)
    }

    /// Moves the cursor to the first event with `timestamp >= target`.
    ///
    /// Binary search over the ascending timestamp column; used for
    /// random-access jumps, never by the steady-state forward loop.
    pub fn seek(&mut self, target: SimTime) {
        let target_ms = target.as_millis();
        self.cursor = self.timestamps.partition_point(|&ts| ts < target_ms);
    }

    /// Drains events with `timestamp < target`, starting at the cursor.
    ///
    /// The returned iterator advances the cursor past each yielded event,
    /// so a subsequent call with a later target resumes exactly where this
    /// one stopped. A target at or before the next event's timestamp
    /// yields nothing.
    pub fn drain_until(&mut self, target: SimTime) -> Drain<'_> {
        Drain {
            target_ms: target.as_millis(),
            log: self,
        }
    }
}

/// Lazy, finite, non-restartable event sequence produced by
/// [`TileLog::drain_until`].
#[derive(Debug)]
pub struct Drain<'a> {
    target_ms: u32,
    log: &'a mut TileLog,
}

impl Iterator for Drain<'_> {
    type Item = PixelEvent;

    fn next(&mut self) -> Option<PixelEvent> {
        let index = self.log.cursor;
        let &timestamp = self.log.timestamps.get(index)?;
        if timestamp >= self.target_ms {
            return None;
        }

        self.log.cursor = index + 1;
        Some(PixelEvent::from_columns(
            PackedPixel::from_raw(self.log.packed[index]),
            self.log.user_ids[index],
            SimTime::from_millis(timestamp),
        ))
    }
}

fn read_u16(reader: &mut Cursor<&[u8]>) -> Result<u16, ParseError> {
    let position = reader.position() as usize;
    reader
        .read_u16::<LittleEndian>()
        .map_err(|_| truncated(reader, position + 2))
}

fn read_u32(reader: &mut Cursor<&[u8]>) -> Result<u32, ParseError> {
    let position = reader.position() as usize;
    reader
        .read_u32::<LittleEndian>()
        .map_err(|_| truncated(reader, position + 4))
}

fn truncated(reader: &Cursor<&[u8]>, expected: usize) -> ParseError {
    ParseError::Truncated {
        expected,
        actual: reader.get_ref().len(),
    }
}

fn write_u16(bytes: &mut Vec<u8>, value: u16) {
    // Writing into a Vec cannot fail.
    let _ = bytes.write_u16::<LittleEndian>(value);
}

fn write_u32(bytes: &mut Vec<u8>, value: u32) {
    let _ = bytes.write_u32::<LittleEndian>(value);
}

/// Test-support encoder for the on-disk tile layout, shared by the test
/// suites of this crate and its consumers.
#[doc(hidden)]
pub mod testing {
    use place_replay_core::PackedPixel;

    /// Encodes a tile file buffer: five little-endian `u32` header fields
    /// followed by the three column arrays, one event per
    /// `(local_x, local_y, color_index, user_id, timestamp)` tuple.
    #[must_use]
    pub fn tile_bytes(
        res: (u32, u32),
        tile: (u32, u32),
        events: &[(u8, u8, u8, u32, u32)],
    ) -> Vec<u8> {
        let mut bytes = Vec::new();
        for value in [res.0, res.1, tile.0, tile.1, events.len() as u32] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        for &(x, y, c, _, _) in events {
            bytes.extend_from_slice(&PackedPixel::pack(x, y, c).raw().to_le_bytes());
        }
        for &(_, _, _, user, _) in events {
            bytes.extend_from_slice(&user.to_le_bytes());
        }
        for &(_, _, _, _, ts) in events {
            bytes.extend_from_slice(&ts.to_le_bytes());
        }
        bytes
    }
}
