//! Wav2Lip inference.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Model location and inference options.
#[derive(Debug, Clone)]
pub struct Wav2LipParams {
    /// Checkout of the Wav2Lip repository (contains `inference.py`).
    pub repo_dir: PathBuf,
    pub checkpoint: PathBuf,
    pub fps: u32,
    pub pads: [u32; 4],
    pub resize_factor: u32,
    pub batch_size: u32,
    pub timeout: Duration,
}

impl Wav2LipParams {
    /// Both the inference script and the checkpoint exist.
    pub fn assets_available(&self) -> bool {
        self.repo_dir.join("inference.py").is_file() && self.checkpoint.is_file()
    }

    fn args(&self, face: &Path, audio: &Path, output: &Path) -> Vec<String> {
        let mut args = vec![
            self.repo_dir.join("inference.py").to_string_lossy().into_owned(),
            "--checkpoint_path".into(),
            self.checkpoint.to_string_lossy().into_owned(),
            "--face".into(),
            face.to_string_lossy().into_owned(),
            "--audio".into(),
            audio.to_string_lossy().into_owned(),
            "--outfile".into(),
            output.to_string_lossy().into_owned(),
            "--static".into(),
            "True".into(),
            "--fps".into(),
            self.fps.to_string(),
            "--pads".into(),
        ];
        args.extend(self.pads.iter().map(|p| p.to_string()));
        args.extend([
            "--resize_factor".to_string(),
            self.resize_factor.to_string(),
            "--wav2lip_batch_size".to_string(),
            self.batch_size.to_string(),
        ]);
        args
    }
}

/// Lip-sync `face` to `audio`, writing an MP4 to `output`.
pub async fn run_wav2lip(
    tools: &ToolRegistry,
    params: &Wav2LipParams,
    face: &Path,
    audio: &Path,
    output: &Path,
) -> sc_core::Result<()> {
    let python = tools.require("python3")?;

    tracing::info!("wav2lip {:?} -> {:?}", audio.file_name(), output.file_name());

    let mut cmd = ToolCommand::new(python.path.clone());
    cmd.args(params.args(face, audio, output));
    cmd.timeout(params.timeout);
    cmd.execute().await?;

    if !sc_core::is_present(output) {
        return Err(sc_core::Error::tool(
            "wav2lip",
            format!("output not created or empty: {}", output.display()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(dir: &Path) -> Wav2LipParams {
        Wav2LipParams {
            repo_dir: dir.join("Wav2Lip"),
            checkpoint: dir.join("checkpoints/wav2lip_gan.pth"),
            fps: 25,
            pads: [0, 20, 0, 0],
            resize_factor: 1,
            batch_size: 2,
            timeout: Duration::from_secs(300),
        }
    }

    #[test]
    fn inference_arguments() {
        let p = params(Path::new("/srv"));
        let args = p.args(
            Path::new("/up/face.png"),
            Path::new("/audio/slide_001.wav"),
            Path::new("/video/slide_001_animated.mp4"),
        );
        assert_eq!(args[0], "/srv/Wav2Lip/inference.py");
        let joined = args.join(" ");
        assert!(joined.contains("--checkpoint_path /srv/checkpoints/wav2lip_gan.pth"));
        assert!(joined.contains("--static True --fps 25 --pads 0 20 0 0"));
        assert!(joined.ends_with("--resize_factor 1 --wav2lip_batch_size 2"));
    }

    #[test]
    fn assets_missing_without_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let p = params(dir.path());
        std::fs::create_dir_all(&p.repo_dir).unwrap();
        std::fs::write(p.repo_dir.join("inference.py"), b"print()").unwrap();
        assert!(!p.assets_available());

        std::fs::create_dir_all(p.checkpoint.parent().unwrap()).unwrap();
        std::fs::write(&p.checkpoint, b"weights").unwrap();
        assert!(p.assets_available());
    }
}
