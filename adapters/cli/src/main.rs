#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Place Replay viewer.
//!
//! Wires the storage reader, the tile loader, the replay engine, and the
//! macroquad presentation backend together. Defaults open a 1000x1000
//! window over the top-left quadrant of the r/place 2022 canvas and
//! advance one simulated minute per rendered frame.

use std::{fs, path::PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use log::{info, warn};
use place_replay_canvas::CanvasCompositor;
use place_replay_core::{FrameStats, Palette, Rgb, SimTime};
use place_replay_engine::{load_tile_logs, ReplayEngine, TileFilter};
use place_replay_rendering::{FrameReport, Presentation, RenderingBackend};
use place_replay_rendering_macroquad::MacroquadBackend;
use place_replay_system_playback::{PlaybackClock, DEFAULT_EPOCH_OFFSET_MS, DEFAULT_STEP_MS};
use place_replay_system_tile_log::TileLog;

/// Palette file format revision this binary understands.
const SUPPORTED_PALETTE_VERSION: u32 = 1;

/// Replays the r/place 2022 pixel-update history as an animation.
#[derive(Debug, Parser)]
#[command(name = "place-replay", about)]
struct Args {
    /// Directory containing packed tile files.
    #[arg(long, default_value = "packed_tiles")]
    tiles_dir: PathBuf,

    /// Canvas (and initial window) width in pixels.
    #[arg(long, default_value_t = 1000)]
    width: u32,

    /// Canvas (and initial window) height in pixels.
    #[arg(long, default_value_t = 1000)]
    height: u32,

    /// Simulated milliseconds advanced per rendered frame.
    #[arg(long, default_value_t = DEFAULT_STEP_MS)]
    step_ms: u32,

    /// Starting offset into the dataset, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_EPOCH_OFFSET_MS)]
    epoch_offset_ms: u32,

    /// Superimpose a decaying heatmap of recent pixel activity.
    #[arg(long)]
    heatmap: bool,

    /// Only load tiles with tile_x below this bound.
    #[arg(long, default_value_t = 32)]
    max_tile_x: u32,

    /// Only load tiles with tile_y below this bound.
    #[arg(long, default_value_t = 32)]
    max_tile_y: u32,

    /// TOML file overriding the built-in color palette.
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Render frames as fast as possible instead of waiting for vsync.
    #[arg(long)]
    no_vsync: bool,

    /// Suppress the on-screen statistics caption.
    #[arg(long)]
    no_caption: bool,
}

/// Entry point for the Place Replay command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let palette = match &args.palette {
        Some(path) => load_palette_file(path)?,
        None => Palette::default(),
    };

    let filter = TileFilter::below(args.max_tile_x, args.max_tile_y);
    let tiles = load_tiles(&args.tiles_dir, &filter)?;
    if tiles.is_empty() {
        warn!("no tiles selected; the canvas will stay blank");
    }

    let clock = PlaybackClock::new(SimTime::from_millis(args.epoch_offset_ms), args.step_ms);
    let compositor = CanvasCompositor::new(args.width, args.height, palette, args.heatmap);
    let mut engine = ReplayEngine::new(clock, compositor, tiles);

    let presentation = Presentation::new("Place Replay", args.width, args.height);
    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_caption(!args.no_caption);

    backend.run(presentation, move |frame| {
        let stats = engine.tick();
        let composite = engine.compositor().composite();
        if let Err(error) = frame.copy_from(&composite) {
            warn!("dropping frame: {error}");
        }
        FrameReport::new(caption(engine.current_time(), stats))
    })
}

/// Reads, parses, and filters every tile file in the directory.
///
/// Unreadable and unparseable files exclude only the affected tile; they
/// are reported and playback proceeds with the rest.
fn load_tiles(tiles_dir: &std::path::Path, filter: &TileFilter) -> Result<Vec<TileLog>> {
    let files = place_replay_storage::list_tile_files(tiles_dir)?;
    info!("found {} tile files in {}", files.len(), tiles_dir.display());

    let mut buffers = Vec::with_capacity(files.len());
    for path in files {
        let name = path.display().to_string();
        match place_replay_storage::read_bytes(&path) {
            Ok(bytes) => buffers.push((name, bytes)),
            Err(error) => warn!("skipping unreadable tile file: {error:#}"),
        }
    }

    let (tiles, skipped) = load_tile_logs(buffers, filter);
    for tile in &skipped {
        warn!("excluding tile file {}: {}", tile.file, tile.error);
    }
    info!(
        "loaded {} tiles for playback ({} excluded)",
        tiles.len(),
        skipped.len()
    );
    Ok(tiles)
}

/// On-disk palette override: a format version and up to 64 RGB rows.
#[derive(Debug, serde::Deserialize)]
struct PaletteFile {
    version: u32,
    colors: Vec<[u8; 3]>,
}

fn load_palette_file(path: &std::path::Path) -> Result<Palette> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read palette file {}", path.display()))?;
    parse_palette(&contents)
}

fn parse_palette(contents: &str) -> Result<Palette> {
    let file: PaletteFile =
        toml::from_str(contents).context("failed to parse palette toml contents")?;
    if file.version != SUPPORTED_PALETTE_VERSION {
        bail!(
            "unsupported palette version {}; expected {}",
            file.version,
            SUPPORTED_PALETTE_VERSION
        );
    }

    let rows: Vec<Rgb> = file
        .colors
        .iter()
        .map(|&[red, green, blue]| Rgb::new(red, green, blue))
        .collect();
    Palette::from_rows(&rows).ok_or_else(|| {
        anyhow!(
            "palette holds {} colors; at most 64 are supported",
            rows.len()
        )
    })
}

/// Builds the per-frame statistics caption shown on top of the canvas.
fn caption(time: SimTime, stats: FrameStats) -> String {
    format!(
        "{} | updates={} ({} total)",
        format_sim_time(time),
        group_thousands(stats.applied),
        group_thousands(stats.total_applied)
    )
}

/// Renders a simulation timestamp as an absolute UTC instant. The dataset's
/// reference instant is midnight, April 1st 2022.
fn format_sim_time(time: SimTime) -> String {
    let Some(start) =
        NaiveDate::from_ymd_opt(2022, 4, 1).and_then(|date| date.and_hms_opt(0, 0, 0))
    else {
        return format!("t+{}ms", time.as_millis());
    };

    let instant = start + chrono::Duration::milliseconds(i64::from(time.as_millis()));
    instant.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Groups a count into comma-separated thousands for the caption.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::{caption, format_sim_time, group_thousands, parse_palette};
    use place_replay_core::{FrameStats, Rgb, SimTime};

    #[test]
    fn parse_palette_accepts_a_versioned_table() {
        let palette = parse_palette(
            "version = 1\ncolors = [[0, 0, 0], [0, 204, 192]]\n",
        )
        .expect("valid palette file");

        assert_eq!(palette.color(1), Rgb::new(0, 204, 192));
        assert_eq!(palette.color(2), Rgb::BLACK);
    }

    #[test]
    fn parse_palette_rejects_unknown_versions() {
        let error = parse_palette("version = 2\ncolors = []\n")
            .expect_err("unknown version must be rejected");
        assert!(error.to_string().contains("unsupported palette version"));
    }

    #[test]
    fn parse_palette_rejects_oversized_tables() {
        let mut contents = String::from("version = 1\ncolors = [\n");
        for _ in 0..65 {
            contents.push_str("[0, 0, 0],\n");
        }
        contents.push_str("]\n");

        let error = parse_palette(&contents).expect_err("65 rows must be rejected");
        assert!(error.to_string().contains("at most 64"));
    }

    #[test]
    fn sim_time_formats_as_an_absolute_utc_instant() {
        assert_eq!(
            format_sim_time(SimTime::from_millis(47_000_000)),
            "2022-04-01 13:03:20 UTC"
        );
        assert_eq!(
            format_sim_time(SimTime::from_millis(0)),
            "2022-04-01 00:00:00 UTC"
        );
    }

    #[test]
    fn group_thousands_inserts_separators() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn caption_combines_timestamp_and_counts() {
        let line = caption(
            SimTime::from_millis(60_000),
            FrameStats {
                applied: 1_500,
                total_applied: 20_000,
            },
        );
        assert_eq!(
            line,
            "2022-04-01 00:01:00 UTC | updates=1,500 (20,000 total)"
        );
    }
}
