use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    #[default]
    Auto,
    Gamma,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    #[default]
    Png,
    Exr,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneConfig {
    pub version: u32,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub time: TimeSection,
    #[serde(default)]
    pub sequence: SequenceSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_render_scale")]
    pub render_scale: f32,
    #[serde(default)]
    pub color_space: ColorSpace,
    /// Worker threads; 0 leaves the choice to the renderer.
    #[serde(default)]
    pub threads: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TimeSection {
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    pub start: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SequenceSection {
    #[serde(default = "default_fps")]
    pub fps: f32,
    #[serde(
        default = "default_sequence_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub duration: Duration,
    #[serde(default)]
    pub frames: Option<u32>,
    #[serde(default)]
    pub format: FrameFormat,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            version: 1,
            output: OutputSection::default(),
            time: TimeSection::default(),
            sequence: SequenceSection::default(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            size: default_size(),
            render_scale: default_render_scale(),
            color_space: ColorSpace::default(),
            threads: 0,
        }
    }
}

impl Default for SequenceSection {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            duration: default_sequence_duration(),
            frames: None,
            format: FrameFormat::default(),
        }
    }
}

fn default_size() -> String {
    "1920x1080".into()
}

fn default_render_scale() -> f32 {
    1.0
}

fn default_fps() -> f32 {
    30.0
}

fn default_sequence_duration() -> Duration {
    Duration::from_secs(10)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer).map(|d| d.unwrap_or_else(default_sequence_duration))
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

/// Parses `WIDTHxHEIGHT` (also accepts `X` and `×`).
pub fn parse_size(raw: &str) -> Result<(u32, u32), String> {
    let normalized = raw.trim().to_ascii_lowercase().replace('×', "x");
    let (w, h) = normalized
        .split_once('x')
        .ok_or_else(|| format!("size '{raw}' must look like 1920x1080"))?;
    let width: u32 = w
        .trim()
        .parse()
        .map_err(|err| format!("invalid width in '{raw}': {err}"))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|err| format!("invalid height in '{raw}': {err}"))?;
    if width == 0 || height == 0 {
        return Err(format!("size '{raw}' must be non-zero"));
    }
    Ok((width, height))
}

impl SceneConfig {
    /// Commented starter file; parses to [`SceneConfig::default`].
    pub const TEMPLATE: &'static str = r#"# trifade configuration
version = 1

[output]
size = "1920x1080"
render_scale = 1.0
color_space = "auto"      # auto | gamma | linear
threads = 0               # 0 = one per core

[time]
start = "0s"              # seconds, or a string such as "1m 30s"

[sequence]
fps = 30
duration = "10s"          # ignored when frames is set
# frames = 300
format = "png"            # png | exr
"#;

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Shader time of the first frame, in seconds.
    pub fn start_seconds(&self) -> f32 {
        self.time.start.map(|d| d.as_secs_f32()).unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        self.output.dimensions()?;

        let scale = self.output.render_scale;
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "output.render_scale must be in (0, 1]; got {scale}"
            )));
        }

        let fps = self.sequence.fps;
        if !(fps > 0.0 && fps.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "sequence.fps must be greater than zero; got {fps}"
            )));
        }

        match self.sequence.frames {
            Some(0) => {
                return Err(ConfigError::Invalid(
                    "sequence.frames must be greater than zero".into(),
                ))
            }
            Some(_) => {}
            None if self.sequence.duration.is_zero() => {
                return Err(ConfigError::Invalid(
                    "sequence.duration must be greater than zero".into(),
                ))
            }
            None => {}
        }

        Ok(())
    }
}

impl OutputSection {
    pub fn dimensions(&self) -> Result<(u32, u32), ConfigError> {
        parse_size(&self.size).map_err(|err| ConfigError::Invalid(format!("output.size: {err}")))
    }

    pub fn threads(&self) -> Option<usize> {
        (self.threads > 0).then_some(self.threads)
    }
}

impl SequenceSection {
    /// Explicit `frames` wins; otherwise enough frames to cover `duration`.
    pub fn frame_count(&self) -> u32 {
        if let Some(frames) = self.frames {
            return frames;
        }
        frames_for_duration(self.duration, self.fps)
    }
}

/// `ceil(duration * fps)`, at least one frame.
pub fn frames_for_duration(duration: Duration, fps: f32) -> u32 {
    let frames = (duration.as_secs_f64() * f64::from(fps)).ceil();
    if frames.is_finite() {
        frames.clamp(1.0, f64::from(u32::MAX)) as u32
    } else {
        1
    }
}
