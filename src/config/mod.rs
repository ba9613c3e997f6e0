//! Configuration file loading.
//!
//! The types live in [`sc_core::config`]; this module finds, parses and
//! checks the TOML file the binary runs with.

pub use sc_core::config::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Locations searched, in order, when no `--config` is given.
pub const DEFAULT_PATHS: &[&str] = &[
    "./slidecast.toml",
    "~/.config/slidecast/config.toml",
    "/etc/slidecast/config.toml",
];

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {}", path.display());
            return load_config(path);
        }
    }

    Ok(Config::default())
}

fn expand(path: &mut PathBuf) {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    *path = PathBuf::from(expanded);
}

/// Expand `~` in every path setting.
fn expand_paths(config: &mut Config) {
    expand(&mut config.storage.root);
    expand(&mut config.animation.wav2lip_dir);
    expand(&mut config.animation.checkpoint);

    let optional = [
        &mut config.server.static_dir,
        &mut config.render.font_file,
        &mut config.tools.ffmpeg_path,
        &mut config.tools.ffprobe_path,
        &mut config.tools.pdftoppm_path,
        &mut config.tools.pdftotext_path,
        &mut config.tools.espeak_path,
        &mut config.tools.python_path,
    ];
    for path in optional.into_iter().flatten() {
        expand(path);
    }
}

/// Reject settings the pipeline cannot run with. Softer problems are
/// reported by [`Config::validate`] at startup.
fn validate_config(config: &Config) -> Result<()> {
    if config.synthesis.max_attempts == 0 {
        anyhow::bail!("synthesis.max_attempts must be at least 1");
    }
    if config.animation.max_attempts == 0 {
        anyhow::bail!("animation.max_attempts must be at least 1");
    }

    let c = &config.composition;
    if c.canvas_width == 0 || c.canvas_height == 0 {
        anyhow::bail!("composition canvas size cannot be 0");
    }
    if c.avatar_width == 0 || c.avatar_height == 0 {
        anyhow::bail!("composition avatar size cannot be 0");
    }

    if config.render.width == 0 || config.render.height == 0 {
        anyhow::bail!("render size cannot be 0");
    }

    if config.storage.final_video.trim().is_empty() {
        anyhow::bail!("storage.final_video cannot be empty");
    }

    Ok(())
}
