use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Seam for the image storage provider. Documents persist only the
/// reference returned by `put`; how bytes are stored behind it is the
/// provider's business.
pub trait AssetStore: Send + Sync {
    fn put(&self, filename_hint: &str, bytes: &[u8]) -> Result<String, anyhow::Error>;
    fn delete(&self, reference: &str) -> Result<(), anyhow::Error>;
}

/// Local-disk provider used in development and tests.
pub struct DiskAssetStore {
    root: PathBuf,
}

impl DiskAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, anyhow::Error> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(DiskAssetStore { root })
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf, anyhow::Error> {
        // References are generated names, never paths.
        if reference.contains('/') || reference.contains("..") {
            anyhow::bail!("invalid asset reference: {}", reference);
        }
        Ok(self.root.join(reference))
    }
}

impl AssetStore for DiskAssetStore {
    fn put(&self, filename_hint: &str, bytes: &[u8]) -> Result<String, anyhow::Error> {
        let extension = Path::new(filename_hint)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin");
        let reference = format!("{}.{}", Uuid::new_v4(), extension);
        fs::write(self.root.join(&reference), bytes)?;
        Ok(reference)
    }

    fn delete(&self, reference: &str) -> Result<(), anyhow::Error> {
        let path = self.resolve(reference)?;
        fs::remove_file(path)?;
        Ok(())
    }
}
