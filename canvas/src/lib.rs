#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative canvas state for Place Replay.
//!
//! The compositor owns the full-canvas color buffer and the optional
//! decaying activity overlay. It is constructed once at startup and mutated
//! only through [`CanvasCompositor::apply`] and
//! [`CanvasCompositor::decay_overlay`]; nothing else in the engine holds
//! mutable pixel state.

use std::borrow::Cow;

use place_replay_core::{Palette, PixelEvent, Rgb, TileOrigin};

/// Per-channel amount subtracted from the overlay every frame.
const OVERLAY_DECAY_STEP: u8 = 10;

/// Full-canvas pixel store with an optional recent-activity overlay.
#[derive(Clone, Debug)]
pub struct CanvasCompositor {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
    overlay: Option<Vec<Rgb>>,
    palette: Palette,
}

impl CanvasCompositor {
    /// Creates a compositor with a white base canvas and, when requested, a
    /// black activity overlay.
    #[must_use]
    pub fn new(width: u32, height: u32, palette: Palette, overlay_enabled: bool) -> Self {
        let len = width as usize * height as usize;
        let overlay = overlay_enabled.then(|| vec![Rgb::BLACK; len]);

        Self {
            width,
            height,
            pixels: vec![Rgb::WHITE; len],
            overlay,
            palette,
        }
    }

    /// Width of the canvas in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the canvas in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether the recent-activity overlay is maintained.
    #[must_use]
    pub const fn overlay_enabled(&self) -> bool {
        self.overlay.is_some()
    }

    /// Base canvas contents, row-major from the top-left pixel.
    #[must_use]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Writes one event into the canvas at its global coordinates.
    ///
    /// Coordinates outside the canvas are silently dropped: the canvas may
    /// be a cropped view of a larger logical grid, and the source dataset
    /// behaves the same way.
    pub fn apply(&mut self, event: &PixelEvent, origin: TileOrigin) {
        // Checked addition treats an origin near u32::MAX as out of canvas
        // rather than wrapping to a low coordinate.
        let gx = origin.x().checked_add(u32::from(event.local_x));
        let gy = origin.y().checked_add(u32::from(event.local_y));
        let (Some(gx), Some(gy)) = (gx, gy) else {
            return;
        };
        if gx >= self.width || gy >= self.height {
            return;
        }

        let index = gy as usize * self.width as usize + gx as usize;
        self.pixels[index] = self.palette.color(event.color_index);
        if let Some(overlay) = self.overlay.as_mut() {
            overlay[index] = Rgb::RED;
        }
    }

    /// Fades the activity overlay one step toward black.
    ///
    /// Called once per frame regardless of how many events arrived. No-op
    /// when the overlay is disabled.
    pub fn decay_overlay(&mut self) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };

        for pixel in overlay.iter_mut() {
            *pixel = Rgb::new(
                pixel.red().saturating_sub(OVERLAY_DECAY_STEP),
                pixel.green().saturating_sub(OVERLAY_DECAY_STEP),
                pixel.blue().saturating_sub(OVERLAY_DECAY_STEP),
            );
        }
    }

    /// Produces the presentable frame.
    ///
    /// With the overlay disabled this borrows the base canvas unchanged.
    /// With the overlay enabled it returns the base image dimmed to half
    /// brightness with the overlay superimposed additively, each channel
    /// clamped to the byte range.
    #[must_use]
    pub fn composite(&self) -> Cow<'_, [Rgb]> {
        let Some(overlay) = self.overlay.as_ref() else {
            return Cow::Borrowed(&self.pixels);
        };

        let blended = self
            .pixels
            .iter()
            .zip(overlay.iter())
            .map(|(base, marker)| {
                Rgb::new(
                    (base.red() >> 1).saturating_add(marker.red()),
                    (base.green() >> 1).saturating_add(marker.green()),
                    (base.blue() >> 1).saturating_add(marker.blue()),
                )
            })
            .collect();
        Cow::Owned(blended)
    }

    /// Reads back a single canvas pixel. Returns `None` outside the canvas.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Reads back a single overlay pixel. Returns `None` outside the canvas
    /// or when the overlay is disabled.
    #[must_use]
    pub fn overlay_pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.overlay
            .as_ref()
            .and_then(|overlay| overlay.get(y as usize * self.width as usize + x as usize))
            .copied()
    }
}
