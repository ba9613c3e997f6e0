//! On-disk layout for uploads and generated artifacts.
//!
//! An [`ArtifactStore`] owns one directory per artifact kind plus the
//! uploads, output and temp directories. Artifact paths are derived from the
//! slide number, so every stage can find the files an earlier stage wrote
//! without passing lists around.

use std::path::{Path, PathBuf};

use sc_core::config::StorageConfig;
use sc_core::{Artifact, ArtifactKind};

/// Directory layout for one slidecast installation.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    config: StorageConfig,
}

impl ArtifactStore {
    /// Create a store rooted at `config.root`.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.root.clone(),
            config: config.clone(),
        }
    }

    /// Create a store rooted somewhere else, keeping the directory names.
    pub fn with_root(root: impl Into<PathBuf>, config: &StorageConfig) -> Self {
        Self {
            root: root.into(),
            config: config.clone(),
        }
    }

    /// Create every directory of the layout.
    pub fn ensure(&self) -> sc_core::Result<()> {
        for dir in self.all_dirs() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(&self.config.uploads)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.output)
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.root.join(&self.config.temp)
    }

    pub fn previews_dir(&self) -> PathBuf {
        self.root.join(&self.config.previews)
    }

    /// Directory holding artifacts of `kind`.
    pub fn dir(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(self.config.dir_name(kind))
    }

    /// Expected path of the `kind` artifact for `slide_number`.
    pub fn path_for(&self, kind: ArtifactKind, slide_number: u32) -> PathBuf {
        self.dir(kind).join(kind.file_name(slide_number))
    }

    /// The `kind` artifact for `slide_number`, with presence checked now.
    pub fn artifact(&self, kind: ArtifactKind, slide_number: u32) -> Artifact {
        Artifact::at(kind, slide_number, self.path_for(kind, slide_number))
    }

    /// Path of the final concatenated video.
    pub fn final_video(&self) -> PathBuf {
        self.output_dir().join(&self.config.final_video)
    }

    /// Where an uploaded file named `file_name` is stored.
    ///
    /// Directory components are stripped so a client cannot write outside
    /// the uploads directory.
    pub fn upload_path(&self, file_name: &str) -> sc_core::Result<PathBuf> {
        Ok(self.uploads_dir().join(bare_file_name(file_name)?))
    }

    /// Where the preview clip for `voice` is written, e.g.
    /// `previews/preview_English_(America).wav` becomes
    /// `previews/preview_English_America.wav`.
    pub fn preview_path(&self, voice: &str) -> sc_core::Result<PathBuf> {
        let safe: String = voice
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .trim_end()
            .replace(' ', "_");
        if safe.is_empty() {
            return Err(sc_core::Error::Validation(format!(
                "invalid voice name: {voice:?}"
            )));
        }
        Ok(self.previews_dir().join(format!("preview_{safe}.wav")))
    }

    /// A previously written preview clip, looked up by file name only.
    pub fn preview_file(&self, file_name: &str) -> sc_core::Result<PathBuf> {
        Ok(self.previews_dir().join(bare_file_name(file_name)?))
    }

    /// List the present artifacts of `kind`, sorted by file name.
    ///
    /// Files that do not follow the naming scheme or are empty are ignored.
    /// A missing directory yields an empty list.
    pub fn list(&self, kind: ArtifactKind) -> sc_core::Result<Vec<Artifact>> {
        let dir = self.dir(kind);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut artifacts = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(slide_number) = kind.parse_slide_number(&name) else {
                continue;
            };
            let artifact = Artifact::at(kind, slide_number, entry.path());
            if artifact.present {
                artifacts.push(artifact);
            }
        }

        artifacts.sort_by_key(|a| a.file_name());
        Ok(artifacts)
    }

    /// Delete every file in the layout's directories, keeping the
    /// directories themselves. Returns the number of files removed.
    pub fn clean(&self) -> sc_core::Result<usize> {
        let mut removed = 0;
        for dir in self.all_dirs() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            for entry in entries {
                let path = entry?.path();
                if path.is_file() {
                    match std::fs::remove_file(&path) {
                        Ok(()) => removed += 1,
                        Err(e) => tracing::warn!("Failed to remove {}: {e}", path.display()),
                    }
                }
            }
        }
        tracing::info!("Removed {removed} generated files");
        Ok(removed)
    }

    fn all_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![
            self.uploads_dir(),
            self.output_dir(),
            self.temp_dir(),
            self.previews_dir(),
        ];
        for kind in ArtifactKind::ALL {
            let dir = self.dir(kind);
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }
}

/// The last path component of `file_name`, rejecting empty and dot names.
fn bare_file_name(file_name: &str) -> sc_core::Result<String> {
    Path::new(file_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty() && n != "." && n != "..")
        .ok_or_else(|| sc_core::Error::Validation(format!("invalid file name: {file_name:?}")))
}
