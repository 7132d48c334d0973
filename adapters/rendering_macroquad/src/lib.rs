#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed presentation adapter for Place Replay.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without
//! its default `audio` feature; replay has no sound anyway.
//!
//! Each frame the adapter copies the finished RGB composite into an RGBA
//! image, uploads it to a single reused texture, and draws it letterboxed
//! with nearest-neighbor filtering so individual canvas pixels stay crisp
//! at any window size. The caption returned by the update closure is drawn
//! on top of the canvas, since macroquad cannot retitle a live window to
//! carry per-frame statistics.

use anyhow::{bail, Result};
use glam::Vec2;
use macroquad::{
    color::{Color, BLACK, WHITE},
    input::{is_key_pressed, KeyCode},
    texture::{draw_texture_ex, DrawTextureParams, FilterMode, Image, Texture2D},
};
use place_replay_core::Rgb;
use place_replay_rendering::{FrameBuffer, FrameReport, Presentation, RenderingBackend};

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_caption: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_caption: true,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the
    /// platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the
    /// display refresh rate or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the per-frame caption is drawn.
    #[must_use]
    pub fn with_caption(mut self, show: bool) -> Self {
        self.show_caption = show;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_frame: F) -> Result<()>
    where
        F: FnMut(&mut FrameBuffer) -> FrameReport + 'static,
    {
        let Self {
            swap_interval,
            show_caption,
        } = self;

        let Presentation {
            window_title,
            width,
            height,
        } = presentation;

        if width == 0 || height == 0 || width > u32::from(u16::MAX) || height > u32::from(u16::MAX)
        {
            bail!("canvas dimensions {width}x{height} cannot be presented as a texture");
        }

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: width as i32,
            window_height: height as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut frame = FrameBuffer::new(width, height);
            let mut image = Image::gen_image_color(width as u16, height as u16, BLACK);
            let texture = Texture2D::from_image(&image);
            texture.set_filter(FilterMode::Nearest);

            loop {
                if quit_requested() {
                    break;
                }

                let report = update_frame(&mut frame);
                write_rgba(frame.pixels(), &mut image.bytes);
                texture.update(&image);

                macroquad::window::clear_background(BLACK);

                let metrics = FrameMetrics::fit(
                    Vec2::new(width as f32, height as f32),
                    Vec2::new(
                        macroquad::window::screen_width(),
                        macroquad::window::screen_height(),
                    ),
                );
                draw_texture_ex(
                    texture,
                    metrics.offset.x,
                    metrics.offset.y,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(macroquad::math::Vec2::new(
                            metrics.dest_size.x,
                            metrics.dest_size.y,
                        )),
                        ..DrawTextureParams::default()
                    },
                );

                if show_caption && !report.caption.is_empty() {
                    draw_caption(&report.caption);
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn quit_requested() -> bool {
    is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q)
}

fn draw_caption(caption: &str) {
    let shadow = Color::new(0.0, 0.0, 0.0, 0.8);
    macroquad::text::draw_text(caption, 11.0, 21.0, 20.0, shadow);
    macroquad::text::draw_text(caption, 10.0, 20.0, 20.0, WHITE);
}

/// Letterbox placement of the canvas within the current window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FrameMetrics {
    offset: Vec2,
    dest_size: Vec2,
}

impl FrameMetrics {
    /// Scales the frame uniformly to fit the screen and centers it.
    fn fit(frame: Vec2, screen: Vec2) -> Self {
        if frame.x <= f32::EPSILON || frame.y <= f32::EPSILON {
            return Self {
                offset: Vec2::ZERO,
                dest_size: Vec2::ZERO,
            };
        }

        let scale = (screen.x / frame.x).min(screen.y / frame.y).max(0.0);
        let dest_size = frame * scale;
        let offset = (screen - dest_size) * 0.5;
        Self { offset, dest_size }
    }
}

/// Expands RGB pixels into the RGBA byte layout macroquad images use.
fn write_rgba(pixels: &[Rgb], bytes: &mut [u8]) {
    debug_assert_eq!(pixels.len() * 4, bytes.len());

    for (pixel, chunk) in pixels.iter().zip(bytes.chunks_exact_mut(4)) {
        chunk[0] = pixel.red();
        chunk[1] = pixel.green();
        chunk[2] = pixel.blue();
        chunk[3] = 255;
    }
}
