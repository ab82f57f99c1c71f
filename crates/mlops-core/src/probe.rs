use std::path::Path;

/// Filesystem inspection used by the idempotency gates.
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
}

impl<P: PathProbe + ?Sized> PathProbe for &P {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProbe;

impl PathProbe for LocalProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn local_probe_sees_dirs_and_files() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("proj/.dvc");
        assert!(!LocalProbe.exists(&sub));
        std::fs::create_dir_all(&sub).unwrap();
        assert!(LocalProbe.exists(&sub));

        let file = dir.path().join("proj/data.dvc");
        std::fs::write(&file, b"outs: []").unwrap();
        assert!(LocalProbe.exists(&file));
    }
}
