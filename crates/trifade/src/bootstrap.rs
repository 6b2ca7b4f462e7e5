use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use renderer::{ColorSpaceMode, ExportFormat, RenderPolicy, RendererConfig};
use sceneconfig::{ColorSpace, FrameFormat, SceneConfig};
use tracing::{debug, info};

use crate::cli::CommonArgs;
use crate::paths::AppPaths;

/// Config file that was read, if any, alongside its parsed contents.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub source: Option<PathBuf>,
    pub scene: SceneConfig,
}

/// Resolves the scene configuration.
///
/// An explicit `--config` path must exist. Otherwise the user config file is
/// read when present and built-in defaults apply when it is not.
pub fn load_config(paths: &AppPaths, explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let scene = SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        debug!(path = %path.display(), "loaded explicit config");
        return Ok(LoadedConfig {
            source: Some(path.to_path_buf()),
            scene,
        });
    }

    let default_path = paths.config_file();
    if default_path.is_file() {
        let scene = SceneConfig::load(&default_path)
            .with_context(|| format!("failed to load config {}", default_path.display()))?;
        debug!(path = %default_path.display(), "loaded user config");
        Ok(LoadedConfig {
            source: Some(default_path),
            scene,
        })
    } else {
        debug!(path = %default_path.display(), "no user config; using defaults");
        Ok(LoadedConfig {
            source: None,
            scene: SceneConfig::default(),
        })
    }
}

/// Combines config-file values with CLI overrides; flags win.
pub fn renderer_config(
    common: &CommonArgs,
    scene: &SceneConfig,
    policy: RenderPolicy,
) -> Result<RendererConfig> {
    let surface_size = match common.size {
        Some(size) => size,
        None => scene.output.dimensions()?,
    };

    Ok(RendererConfig {
        surface_size,
        render_scale: common.render_scale.unwrap_or(scene.output.render_scale),
        color_space: common
            .color_space
            .unwrap_or_else(|| map_color_space(scene.output.color_space)),
        threads: common.threads.or_else(|| scene.output.threads()),
        policy,
    })
}

pub fn map_color_space(value: ColorSpace) -> ColorSpaceMode {
    match value {
        ColorSpace::Auto => ColorSpaceMode::Auto,
        ColorSpace::Gamma => ColorSpaceMode::Gamma,
        ColorSpace::Linear => ColorSpaceMode::Linear,
    }
}

pub fn map_frame_format(value: FrameFormat) -> ExportFormat {
    match value {
        FrameFormat::Png => ExportFormat::Png,
        FrameFormat::Exr => ExportFormat::Exr,
    }
}

/// Format for a still export path, taken from its extension.
pub fn export_format_for(path: &Path) -> Result<ExportFormat> {
    match ExportFormat::from_path(path) {
        Some(format) => Ok(format),
        None => bail!(
            "unsupported output extension for {}; expected .png or .exr",
            path.display()
        ),
    }
}

/// Writes the starter config; refuses to replace an existing file unless `force`.
pub fn write_template(paths: &AppPaths, force: bool) -> Result<PathBuf> {
    let path = paths.config_file();
    if path.exists() && !force {
        bail!(
            "config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    fs::create_dir_all(paths.config_dir()).with_context(|| {
        format!(
            "failed to create config directory at {}",
            paths.config_dir().display()
        )
    })?;
    fs::write(&path, SceneConfig::TEMPLATE)
        .with_context(|| format!("failed to write config file {}", path.display()))?;
    info!(path = %path.display(), "wrote config template");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(body: &str) -> SceneConfig {
        SceneConfig::from_toml_str(body).expect("valid config")
    }

    #[test]
    fn config_values_apply_without_flags() {
        let scene = scene(
            r#"
version = 1
[output]
size = "320x200"
render_scale = 0.5
color_space = "linear"
threads = 3
"#,
        );
        let config =
            renderer_config(&CommonArgs::default(), &scene, RenderPolicy::default()).unwrap();
        assert_eq!(config.surface_size, (320, 200));
        assert_eq!(config.render_scale, 0.5);
        assert_eq!(config.color_space, ColorSpaceMode::Linear);
        assert_eq!(config.threads, Some(3));
    }

    #[test]
    fn flags_override_config() {
        let scene = scene("version = 1\n[output]\nsize = \"320x200\"\nthreads = 3");
        let common = CommonArgs {
            size: Some((64, 36)),
            render_scale: Some(0.25),
            color_space: Some(ColorSpaceMode::Gamma),
            threads: Some(1),
            ..CommonArgs::default()
        };
        let config = renderer_config(&common, &scene, RenderPolicy::default()).unwrap();
        assert_eq!(config.surface_size, (64, 36));
        assert_eq!(config.render_scale, 0.25);
        assert_eq!(config.color_space, ColorSpaceMode::Gamma);
        assert_eq!(config.threads, Some(1));
    }

    #[test]
    fn zero_threads_in_config_means_automatic() {
        let config = renderer_config(
            &CommonArgs::default(),
            &SceneConfig::default(),
            RenderPolicy::default(),
        )
        .unwrap();
        assert_eq!(config.threads, None);
        assert_eq!(config.surface_size, (1920, 1080));
    }

    #[test]
    fn export_format_requires_known_extension() {
        assert_eq!(
            export_format_for(Path::new("out.exr")).unwrap(),
            ExportFormat::Exr
        );
        assert!(export_format_for(Path::new("out.jpg")).is_err());
        assert!(export_format_for(Path::new("out")).is_err());
    }

    #[test]
    fn maps_config_enums() {
        assert_eq!(map_color_space(ColorSpace::Gamma), ColorSpaceMode::Gamma);
        assert_eq!(map_frame_format(FrameFormat::Exr), ExportFormat::Exr);
    }
}
