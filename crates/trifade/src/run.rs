use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use kernel::FadingTriangles;
use renderer::{RenderPolicy, RenderReport, Renderer};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::bootstrap::{
    export_format_for, load_config, map_frame_format, renderer_config, LoadedConfig,
};
use crate::cli::{CommonArgs, ProbeArgs, SequenceArgs, StillArgs};
use crate::paths::AppPaths;

const DEFAULT_OUTPUT: &str = "trifade.png";

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(common: &CommonArgs) -> Result<LoadedConfig> {
    let paths = AppPaths::discover()?;
    let loaded = load_config(&paths, common.config.as_deref())?;
    tracing::debug!(
        config = ?loaded.source.as_ref().map(|p| p.display().to_string()),
        "resolved trifade config"
    );
    Ok(loaded)
}

fn build_renderer(
    common: &CommonArgs,
    loaded: &LoadedConfig,
    policy: RenderPolicy,
) -> Result<Renderer> {
    let config = renderer_config(common, &loaded.scene, policy)?;
    Renderer::new(config, Arc::new(FadingTriangles)).context("invalid render settings")
}

pub fn run_still(common: &CommonArgs, args: StillArgs) -> Result<()> {
    let loaded = resolve_config(common)?;
    let path = args.output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let format = export_format_for(&path)?;
    let time = args.time.unwrap_or_else(|| loaded.scene.start_seconds());

    let renderer = build_renderer(
        common,
        &loaded,
        RenderPolicy::Export {
            time: Some(time),
            path,
            format,
        },
    )?;
    let report = renderer.run()?;
    print_outputs(&report);
    Ok(())
}

pub fn run_sequence(common: &CommonArgs, args: SequenceArgs) -> Result<()> {
    let loaded = resolve_config(common)?;
    let sequence = &loaded.scene.sequence;
    let fps = args.fps.unwrap_or(sequence.fps);
    let frames = match (args.frames, args.duration) {
        (Some(frames), _) => frames,
        (None, Some(duration)) => sceneconfig::frames_for_duration(duration, fps),
        (None, None) => match sequence.frames {
            Some(frames) => frames,
            None => sceneconfig::frames_for_duration(sequence.duration, fps),
        },
    };
    let policy = RenderPolicy::Sequence {
        start: args.start.unwrap_or_else(|| loaded.scene.start_seconds()),
        fps,
        frames,
        directory: args.out_dir,
        format: args
            .format
            .unwrap_or_else(|| map_frame_format(sequence.format)),
    };

    let renderer = build_renderer(common, &loaded, policy)?;
    let report = renderer.run()?;
    print_outputs(&report);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ProbeOutput {
    x: u32,
    y: u32,
    time: f32,
    width: u32,
    height: u32,
    rgba: [f32; 4],
}

pub fn run_probe(common: &CommonArgs, args: ProbeArgs) -> Result<()> {
    let loaded = resolve_config(common)?;
    let time = args.time.unwrap_or_else(|| loaded.scene.start_seconds());
    let renderer = build_renderer(common, &loaded, RenderPolicy::Still { time: Some(time) })?;
    let colour = renderer.probe(args.x, args.y, time)?;
    let (width, height) = renderer.config().surface_size;

    if args.json {
        let output = ProbeOutput {
            x: args.x,
            y: args.y,
            time,
            width,
            height,
            rgba: colour.to_array(),
        };
        println!(
            "{}",
            serde_json::to_string(&output).context("failed to encode probe output")?
        );
    } else {
        println!(
            "pixel ({}, {}) at t={time}s in {width}x{height}: r={:.6} g={:.6} b={:.6} a={:.6}",
            args.x, args.y, colour.x, colour.y, colour.z, colour.w
        );
    }
    Ok(())
}

pub fn run_config_where(common: &CommonArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let user_file = paths.config_file();
    println!("Configuration:");
    println!("  directory:  {}", paths.config_dir().display());
    println!(
        "  file:       {} ({})",
        user_file.display(),
        if user_file.is_file() {
            "present"
        } else {
            "missing"
        }
    );
    if let Some(explicit) = &common.config {
        println!("  --config:   {}", explicit.display());
    }
    Ok(())
}

pub fn run_config_init(force: bool) -> Result<()> {
    let paths = AppPaths::discover()?;
    let path = crate::bootstrap::write_template(&paths, force)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_outputs(report: &RenderReport) {
    for path in &report.outputs {
        println!("{}", path.display());
    }
}
