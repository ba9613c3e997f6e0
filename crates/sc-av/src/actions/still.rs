//! Still-face video: the face image held for the length of the narration.
//!
//! Used when the lip-sync model is not installed.

use std::path::Path;
use std::time::Duration;

use crate::actions::probe::audio_duration;
use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

#[derive(Debug, Clone)]
pub struct StillParams {
    pub width: u32,
    pub height: u32,
    /// Used when the audio duration cannot be probed.
    pub default_duration: f64,
    pub timeout: Duration,
}

/// Encode `face` over `audio` as a plain video clip at `output`.
pub async fn still_face_video(
    tools: &ToolRegistry,
    params: &StillParams,
    face: &Path,
    audio: &Path,
    output: &Path,
) -> sc_core::Result<()> {
    let ffmpeg = tools.require("ffmpeg")?;
    let duration = audio_duration(tools, audio)
        .await
        .unwrap_or(params.default_duration);

    let mut cmd = ToolCommand::new(ffmpeg.path.clone());
    cmd.args(still_args(params, face, audio, duration, output));
    cmd.timeout(params.timeout);
    cmd.execute().await?;

    if !sc_core::is_present(output) {
        return Err(sc_core::Error::tool(
            "ffmpeg",
            format!("still video not created: {}", output.display()),
        ));
    }
    Ok(())
}

fn still_args(
    params: &StillParams,
    face: &Path,
    audio: &Path,
    duration: f64,
    output: &Path,
) -> Vec<String> {
    vec![
        "-y".into(),
        "-loop".into(),
        "1".into(),
        "-i".into(),
        face.to_string_lossy().into_owned(),
        "-i".into(),
        audio.to_string_lossy().into_owned(),
        "-vf".into(),
        format!("scale={}:{}", params.width, params.height),
        "-c:v".into(),
        "libx264".into(),
        "-c:a".into(),
        "aac".into(),
        "-t".into(),
        format!("{duration}"),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-shortest".into(),
        output.to_string_lossy().into_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_arguments() {
        let params = StillParams {
            width: 426,
            height: 640,
            default_duration: 5.0,
            timeout: Duration::from_secs(60),
        };
        let args = still_args(
            &params,
            Path::new("face.png"),
            Path::new("slide_001.wav"),
            5.0,
            Path::new("slide_001_animated.mp4"),
        );
        assert_eq!(
            args.join(" "),
            "-y -loop 1 -i face.png -i slide_001.wav -vf scale=426:640 -c:v libx264 \
             -c:a aac -t 5 -pix_fmt yuv420p -shortest slide_001_animated.mp4"
        );
    }
}
