//! Layer preparation.
//!
//! Before any construct is created, the build asks a [`Packager`] to put the
//! shared-code bundle and the third-party dependency bundle on disk. The
//! returned directories become the two layers attached to every compute unit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::BuildError;
use crate::config::BuildConfig;

/// Directory name of the shared-code layer under `layers_dir`.
pub const SHARED_LAYER_DIR: &str = "shared-layer";
/// Directory name of the dependency layer under `layers_dir`.
pub const DEPENDENCIES_LAYER_DIR: &str = "dependencies-layer";

/// Materializes layer contents for a build.
pub trait Packager {
    /// Prepares the shared-code layer and returns its directory.
    fn prepare_shared_layer(&self, config: &BuildConfig) -> Result<PathBuf, BuildError>;

    /// Prepares the third-party dependency layer and returns its directory.
    fn prepare_dependencies_layer(&self, config: &BuildConfig) -> Result<PathBuf, BuildError>;
}

/// Copies project files into `layers_dir` with plain filesystem operations.
///
/// Both layers are recreated from scratch on every build:
///
/// ```text
/// {layers_dir}/shared-layer/python/shared/...   <- copy of {shared_dir}
/// {layers_dir}/dependencies-layer/requirements.txt  (when the file exists)
/// ```
///
/// Resolving and installing the listed requirements is left to the deployment
/// tooling that uploads the layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryPackager;

impl Packager for DirectoryPackager {
    fn prepare_shared_layer(&self, config: &BuildConfig) -> Result<PathBuf, BuildError> {
        let layer = config.layers_dir.join(SHARED_LAYER_DIR);
        if layer.exists() {
            fs::remove_dir_all(&layer).map_err(|e| packaging(&layer, e))?;
        }
        let target = layer.join("python").join("shared");
        fs::create_dir_all(&target).map_err(|e| packaging(&target, e))?;
        if config.shared_dir.is_dir() {
            let copied = copy_tree(&config.shared_dir, &target).map_err(|e| packaging(&config.shared_dir, e))?;
            info!(files = copied, layer = %layer.display(), "Shared layer prepared");
        } else {
            info!(shared_dir = %config.shared_dir.display(), "No shared code, shared layer left empty");
        }
        Ok(layer)
    }

    fn prepare_dependencies_layer(&self, config: &BuildConfig) -> Result<PathBuf, BuildError> {
        let layer = config.layers_dir.join(DEPENDENCIES_LAYER_DIR);
        if layer.exists() {
            fs::remove_dir_all(&layer).map_err(|e| packaging(&layer, e))?;
        }
        fs::create_dir_all(&layer).map_err(|e| packaging(&layer, e))?;
        if config.requirements_file.is_file() {
            let name = config
                .requirements_file
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("requirements.txt"));
            let target = layer.join(name);
            fs::copy(&config.requirements_file, &target).map_err(|e| packaging(&target, e))?;
            info!(layer = %layer.display(), "Dependencies layer prepared");
        } else {
            debug!(requirements = %config.requirements_file.display(), "No requirements file");
        }
        Ok(layer)
    }
}

/// Returns the layer locations without touching the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPackager;

impl Packager for NoopPackager {
    fn prepare_shared_layer(&self, config: &BuildConfig) -> Result<PathBuf, BuildError> {
        Ok(config.layers_dir.join(SHARED_LAYER_DIR))
    }

    fn prepare_dependencies_layer(&self, config: &BuildConfig) -> Result<PathBuf, BuildError> {
        Ok(config.layers_dir.join(DEPENDENCIES_LAYER_DIR))
    }
}

fn packaging(path: &Path, source: io::Error) -> BuildError {
    BuildError::Packaging {
        path: path.to_path_buf(),
        source,
    }
}

/// Recursively copies `from` into `to`, returning the number of files copied.
fn copy_tree(from: &Path, to: &Path) -> io::Result<usize> {
    fs::create_dir_all(to)?;
    let mut copied = 0;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(root: &Path) -> BuildConfig {
        BuildConfig {
            shared_dir: root.join("shared"),
            layers_dir: root.join(".layers"),
            requirements_file: root.join("requirements.txt"),
            ..BuildConfig::default()
        }
    }

    #[test]
    fn shared_layer_copies_shared_tree() {
        let root = TempDir::new().unwrap();
        let config = config(root.path());
        fs::create_dir_all(config.shared_dir.join("util")).unwrap();
        fs::write(config.shared_dir.join("db.py"), "DB = 1").unwrap();
        fs::write(config.shared_dir.join("util").join("text.py"), "X = 2").unwrap();

        let layer = DirectoryPackager.prepare_shared_layer(&config).unwrap();

        let shared = layer.join("python").join("shared");
        assert_eq!(fs::read_to_string(shared.join("db.py")).unwrap(), "DB = 1");
        assert_eq!(fs::read_to_string(shared.join("util").join("text.py")).unwrap(), "X = 2");
    }

    #[test]
    fn shared_layer_is_recreated() {
        let root = TempDir::new().unwrap();
        let config = config(root.path());
        fs::create_dir_all(&config.shared_dir).unwrap();
        fs::write(config.shared_dir.join("old.py"), "").unwrap();
        DirectoryPackager.prepare_shared_layer(&config).unwrap();

        fs::remove_file(config.shared_dir.join("old.py")).unwrap();
        fs::write(config.shared_dir.join("new.py"), "").unwrap();
        let layer = DirectoryPackager.prepare_shared_layer(&config).unwrap();

        let shared = layer.join("python").join("shared");
        assert!(!shared.join("old.py").exists());
        assert!(shared.join("new.py").exists());
    }

    #[test]
    fn dependencies_layer_copies_requirements_when_present() {
        let root = TempDir::new().unwrap();
        let config = config(root.path());

        let layer = DirectoryPackager.prepare_dependencies_layer(&config).unwrap();
        assert!(layer.is_dir());
        assert!(!layer.join("requirements.txt").exists());

        fs::write(&config.requirements_file, "requests==2.31\n").unwrap();
        let layer = DirectoryPackager.prepare_dependencies_layer(&config).unwrap();
        assert_eq!(
            fs::read_to_string(layer.join("requirements.txt")).unwrap(),
            "requests==2.31\n"
        );
    }

    #[test]
    fn dependencies_layer_drops_removed_requirements() {
        let root = TempDir::new().unwrap();
        let config = config(root.path());
        fs::write(&config.requirements_file, "requests==2.31\n").unwrap();
        let layer = DirectoryPackager.prepare_dependencies_layer(&config).unwrap();
        assert!(layer.join("requirements.txt").is_file());

        fs::remove_file(&config.requirements_file).unwrap();
        let layer = DirectoryPackager.prepare_dependencies_layer(&config).unwrap();

        assert!(layer.is_dir());
        assert!(!layer.join("requirements.txt").exists());
    }

    #[test]
    fn noop_packager_touches_nothing() {
        let root = TempDir::new().unwrap();
        let config = config(root.path());

        let shared = NoopPackager.prepare_shared_layer(&config).unwrap();
        assert_eq!(shared, root.path().join(".layers").join("shared-layer"));
        assert!(!config.layers_dir.exists());
    }
}
