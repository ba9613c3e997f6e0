//! Skip-existing cache gate.

use std::path::Path;

/// Decides whether an expected output needs to be produced again.
#[derive(Debug, Clone, Copy)]
pub struct CacheGate {
    skip_existing: bool,
}

impl CacheGate {
    pub fn new(skip_existing: bool) -> Self {
        Self { skip_existing }
    }

    /// True when skip-existing is on and `expected` is a non-empty file.
    ///
    /// A zero-byte file counts as absent.
    pub fn should_skip(&self, expected: &Path) -> bool {
        self.skip_existing && sc_core::is_present(expected)
    }
}

impl Default for CacheGate {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_only_present_files() {
        let dir = tempfile::tempdir().unwrap();
        let full = dir.path().join("slide_001.wav");
        let empty = dir.path().join("slide_002.wav");
        std::fs::write(&full, b"RIFF").unwrap();
        std::fs::write(&empty, b"").unwrap();

        let gate = CacheGate::new(true);
        assert!(gate.should_skip(&full));
        assert!(!gate.should_skip(&empty));
        assert!(!gate.should_skip(&dir.path().join("slide_003.wav")));
        assert!(!gate.should_skip(dir.path()));
    }

    #[test]
    fn disabled_gate_never_skips() {
        let dir = tempfile::tempdir().unwrap();
        let full = dir.path().join("slide_001.wav");
        std::fs::write(&full, b"RIFF").unwrap();
        assert!(!CacheGate::new(false).should_skip(&full));
    }
}
