//! Duration probing with ffprobe.

use std::path::Path;
use std::time::Duration;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Duration of a media file in seconds.
///
/// Returns `None` when ffprobe is unavailable, fails, or prints something
/// that is not a positive number; callers pick their own default.
pub async fn audio_duration(tools: &ToolRegistry, path: &Path) -> Option<f64> {
    let ffprobe = tools.require("ffprobe").ok()?;

    let mut cmd = ToolCommand::new(ffprobe.path.clone());
    cmd.args(["-v", "quiet", "-show_entries", "format=duration", "-of", "csv=p=0"]);
    cmd.arg(path.to_string_lossy().as_ref());
    cmd.timeout(Duration::from_secs(30));

    match cmd.execute().await {
        Ok(output) => parse_duration(&output.stdout),
        Err(e) => {
            tracing::debug!("ffprobe failed for {}: {e}", path.display());
            None
        }
    }
}

fn parse_duration(stdout: &str) -> Option<f64> {
    stdout
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
}
