#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Place Replay backends.
//!
//! A backend owns the window and the frame loop. Once per frame it hands a
//! mutable [`FrameBuffer`] to the update closure, which fills it with the
//! current composite and returns a [`FrameReport`] caption; the backend
//! then presents the buffer and polls for a quit request.

use anyhow::Result as AnyResult;
use place_replay_core::Rgb;
use std::{error::Error, fmt};

/// Fixed-size RGB frame handed to backends for presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl FrameBuffer {
    /// Creates a black frame buffer of the provided dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width as usize * height as usize],
        }
    }

    /// Width of the frame in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the frame in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major frame contents from the top-left pixel.
    #[must_use]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Replaces the frame contents with the provided composite.
    ///
    /// The composite must match the frame's dimensions exactly.
    pub fn copy_from(&mut self, composite: &[Rgb]) -> Result<(), RenderingError> {
        if composite.len() != self.pixels.len() {
            return Err(RenderingError::FrameSizeMismatch {
                expected: self.pixels.len(),
                actual: composite.len(),
            });
        }

        self.pixels.copy_from_slice(composite);
        Ok(())
    }
}

/// Per-frame annotation drawn by the backend on top of the canvas.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Human-readable playback status line (timestamp and update counts).
    pub caption: String,
}

impl FrameReport {
    /// Creates a report carrying the provided caption.
    #[must_use]
    pub fn new<T>(caption: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            caption: caption.into(),
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Width of the presented canvas in pixels.
    pub width: u32,
    /// Height of the presented canvas in pixels.
    pub height: u32,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, width: u32, height: u32) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            width,
            height,
        }
    }
}

/// Rendering backend capable of presenting replay frames.
pub trait RenderingBackend {
    /// Runs the backend until the user requests to quit.
    ///
    /// The provided `update_frame` closure is called once per frame to fill
    /// the buffer that will be presented; quitting is polled by the backend
    /// between frames, so the closure never observes a partial frame.
    fn run<F>(self, presentation: Presentation, update_frame: F) -> AnyResult<()>
    where
        F: FnMut(&mut FrameBuffer) -> FrameReport + 'static;
}

/// Errors that can occur while preparing frames for presentation.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// A composite was copied into a frame of a different size.
    FrameSizeMismatch {
        /// Pixel count the frame buffer holds.
        expected: usize,
        /// Pixel count the composite provided.
        actual: usize,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "composite holds {actual} pixels but the frame expects {expected}"
                )
            }
        }
    }
}

impl Error for RenderingError {}
