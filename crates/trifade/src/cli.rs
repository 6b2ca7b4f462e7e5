use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use renderer::{ColorSpaceMode, ExportFormat};

#[derive(Parser, Debug)]
#[command(
    name = "trifade",
    author,
    version,
    about = "Render the fading-triangles background to images",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Still-frame options used when no subcommand is given.
    #[command(flatten)]
    pub still: StillArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options shared by every render command.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Read settings from this TOML file instead of the user config.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output resolution (e.g. `1280x720`).
    #[arg(long, global = true, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Fraction of the output resolution to shade at (0-1].
    #[arg(long, global = true, value_name = "SCALE", value_parser = parse_render_scale)]
    pub render_scale: Option<f32>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(long, global = true, value_name = "MODE", value_parser = parse_color_space)]
    pub color_space: Option<ColorSpaceMode>,

    /// Worker threads for pixel shading (defaults to one per core).
    #[arg(long, global = true, value_name = "N", value_parser = parse_threads)]
    pub threads: Option<usize>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct StillArgs {
    /// Shader time to evaluate, in seconds.
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub time: Option<f32>,

    /// Destination image; the extension (`.png` or `.exr`) picks the format.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SequenceArgs {
    /// Directory that receives `frame_NNNNN.*` and `sequence.json`.
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Frames per second of shader time.
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Exact number of frames to render.
    #[arg(long, value_name = "N", conflicts_with = "duration")]
    pub frames: Option<u32>,

    /// Length of the sequence in shader time (e.g. `10s`, `1m 30s`, `2.5`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Shader time of the first frame, in seconds.
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub start: Option<f32>,

    /// Frame file format: `png` or `exr`.
    #[arg(long, value_name = "FORMAT", value_parser = parse_format)]
    pub format: Option<ExportFormat>,
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Pixel column, counted from the left edge.
    pub x: u32,

    /// Pixel row, counted from the top edge.
    pub y: u32,

    /// Shader time to evaluate, in seconds.
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub time: Option<f32>,

    /// Print a JSON object instead of plain text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one frame to a PNG or EXR file (the default).
    Still(StillArgs),
    /// Render a numbered frame sequence plus a JSON manifest.
    Sequence(SequenceArgs),
    /// Print the unclamped colour of a single pixel.
    Probe(ProbeArgs),
    /// Inspect or create the user configuration file.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration directory and file.
    Where,
    /// Write a commented starter config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}

pub fn parse() -> Cli {
    let cli = Cli::parse();
    if let Err(err) = cli.check_still_flags() {
        err.exit();
    }
    cli
}

impl Cli {
    /// Rejects `--time`/`--output` given before a subcommand, where they
    /// would otherwise be dropped.
    pub fn check_still_flags(&self) -> Result<(), clap::Error> {
        let has_still_flags = self.still.time.is_some() || self.still.output.is_some();
        if self.command.is_some() && has_still_flags {
            return Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                "--time and --output must follow the subcommand they apply to",
            ));
        }
        Ok(())
    }
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    sceneconfig::parse_size(value)
}

pub fn parse_render_scale(value: &str) -> Result<f32, String> {
    let scale: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid render scale '{value}'"))?;
    if !(scale > 0.0 && scale <= 1.0) {
        return Err(format!("render scale must be in (0, 1]; got {scale}"));
    }
    Ok(scale)
}

pub fn parse_threads(value: &str) -> Result<usize, String> {
    let threads: usize = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid thread count '{value}'"))?;
    if threads == 0 {
        return Err("thread count must be at least 1".into());
    }
    Ok(threads)
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }
    trimmed.parse()
}

pub fn parse_format(value: &str) -> Result<ExportFormat, String> {
    value.parse()
}

/// Accepts plain seconds (`2.5`) or humantime strings (`1m 30s`).
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(format!("duration must be non-negative; got {trimmed}"));
        }
        return Ok(Duration::from_secs_f64(seconds));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{trimmed}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_renders_a_still() {
        let cli = Cli::try_parse_from(["trifade", "--time", "4", "--size", "64x36"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.still.time, Some(4.0));
        assert_eq!(cli.common.size, Some((64, 36)));
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "trifade",
            "sequence",
            "--out-dir",
            "frames",
            "--frames",
            "12",
            "--threads",
            "2",
            "--color-space",
            "linear",
        ])
        .unwrap();
        assert_eq!(cli.common.threads, Some(2));
        assert_eq!(cli.common.color_space, Some(ColorSpaceMode::Linear));
        let Some(Command::Sequence(args)) = cli.command else {
            panic!("expected sequence command");
        };
        assert_eq!(args.frames, Some(12));
        assert_eq!(args.out_dir, PathBuf::from("frames"));
    }

    #[test]
    fn negative_times_parse_as_values() {
        let cli = Cli::try_parse_from(["trifade", "--time", "-1.5"]).unwrap();
        assert_eq!(cli.still.time, Some(-1.5));

        let cli =
            Cli::try_parse_from(["trifade", "sequence", "--out-dir", "x", "--start", "-2"]).unwrap();
        let Some(Command::Sequence(args)) = cli.command else {
            panic!("expected sequence command");
        };
        assert_eq!(args.start, Some(-2.0));

        let cli = Cli::try_parse_from(["trifade", "probe", "1", "2", "--time", "-0.25"]).unwrap();
        let Some(Command::Probe(args)) = cli.command else {
            panic!("expected probe command");
        };
        assert_eq!(args.time, Some(-0.25));
    }

    #[test]
    fn still_flags_before_subcommand_are_rejected() {
        let cli = Cli::try_parse_from(["trifade", "--time", "3", "still"]).unwrap();
        let err = cli.check_still_flags().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);

        let cli = Cli::try_parse_from(["trifade", "-o", "a.png", "sequence", "--out-dir", "x"])
            .unwrap();
        assert!(cli.check_still_flags().is_err());

        let cli = Cli::try_parse_from(["trifade", "still", "--time", "3"]).unwrap();
        assert!(cli.check_still_flags().is_ok());
        let cli = Cli::try_parse_from(["trifade", "--time", "3"]).unwrap();
        assert!(cli.check_still_flags().is_ok());
    }

    #[test]
    fn frames_and_duration_conflict() {
        let result = Cli::try_parse_from([
            "trifade", "sequence", "--out-dir", "x", "--frames", "3", "--duration", "2s",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn probe_takes_positional_coordinates() {
        let cli = Cli::try_parse_from(["trifade", "probe", "10", "20", "--json"]).unwrap();
        let Some(Command::Probe(args)) = cli.command else {
            panic!("expected probe command");
        };
        assert_eq!((args.x, args.y), (10, 20));
        assert!(args.json);
    }

    #[test]
    fn value_parsers_reject_out_of_range_input() {
        assert!(parse_render_scale("0").is_err());
        assert!(parse_render_scale("1.01").is_err());
        assert_eq!(parse_render_scale("0.5"), Ok(0.5));
        assert!(parse_threads("0").is_err());
        assert!(parse_color_space("").is_err());
        assert_eq!(parse_format("EXR"), Ok(ExportFormat::Exr));
    }

    #[test]
    fn durations_accept_seconds_and_humantime() {
        assert_eq!(parse_duration("2.5"), Ok(Duration::from_millis(2500)));
        assert_eq!(parse_duration("1m 30s"), Ok(Duration::from_secs(90)));
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("soon").is_err());
    }
}
