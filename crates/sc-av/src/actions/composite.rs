//! Per-slide overlay segments and the final concatenation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sc_core::config::OverlayGeometry;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// The `-filter_complex` graph placing the avatar over the slide.
pub fn overlay_filter(g: &OverlayGeometry) -> String {
    format!(
        "[0:v]scale={}:{}[bg];[1:v]scale={}:{}[avatar];[bg][avatar]overlay={}:{}[out]",
        g.canvas_width, g.canvas_height, g.avatar_width, g.avatar_height, g.avatar_x, g.avatar_y
    )
}

/// Overlay `foreground` (a video with audio) on the still `background`.
///
/// The segment is cut at the shorter input and never exceeds `max_length`.
pub async fn overlay_segment(
    tools: &ToolRegistry,
    background: &Path,
    foreground: &Path,
    geometry: &OverlayGeometry,
    max_length: Duration,
    timeout: Duration,
    output: &Path,
) -> sc_core::Result<()> {
    let ffmpeg = tools.require("ffmpeg")?;

    let mut cmd = ToolCommand::new(ffmpeg.path.clone());
    cmd.args(["-y", "-loop", "1", "-i"]);
    cmd.arg(background.to_string_lossy().as_ref());
    cmd.arg("-i").arg(foreground.to_string_lossy().as_ref());
    cmd.arg("-filter_complex").arg(overlay_filter(geometry));
    cmd.args(["-map", "[out]", "-map", "1:a"]);
    cmd.args(["-c:v", "libx264", "-c:a", "aac", "-shortest"]);
    cmd.arg("-t").arg(max_length.as_secs().to_string());
    cmd.arg(output.to_string_lossy().as_ref());
    cmd.timeout(timeout);
    cmd.execute().await?;

    if !sc_core::is_present(output) {
        return Err(sc_core::Error::tool(
            "ffmpeg",
            format!("segment not created: {}", output.display()),
        ));
    }
    Ok(())
}

/// Contents of an ffmpeg concat-demuxer list for `segments`.
///
/// Paths are made absolute because the demuxer resolves relative entries
/// against the list file's directory.
pub fn concat_list(segments: &[PathBuf]) -> String {
    let mut list = String::new();
    for seg in segments {
        let abs = std::path::absolute(seg).unwrap_or_else(|_| seg.clone());
        // Single quotes inside a quoted entry are written as '\''.
        let escaped = abs.to_string_lossy().replace('\'', "'\\''");
        list.push_str(&format!("file '{escaped}'\n"));
    }
    list
}

/// Join `segments` in order into `output` without re-encoding.
pub async fn concat_segments(
    tools: &ToolRegistry,
    segments: &[PathBuf],
    list_dir: &Path,
    timeout: Duration,
    output: &Path,
) -> sc_core::Result<()> {
    let ffmpeg = tools.require("ffmpeg")?;

    std::fs::create_dir_all(list_dir)?;
    let mut list_file = tempfile::Builder::new()
        .prefix("concat_")
        .suffix(".txt")
        .tempfile_in(list_dir)?;
    list_file.write_all(concat_list(segments).as_bytes())?;
    list_file.flush()?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cmd = ToolCommand::new(ffmpeg.path.clone());
    cmd.args(["-y", "-f", "concat", "-safe", "0", "-i"]);
    cmd.arg(list_file.path().to_string_lossy().as_ref());
    cmd.args(["-c", "copy"]);
    cmd.arg(output.to_string_lossy().as_ref());
    cmd.timeout(timeout);
    cmd.execute().await?;

    tracing::info!(
        "Concatenated {} segments into {}",
        segments.len(),
        output.display()
    );
    Ok(())
}
