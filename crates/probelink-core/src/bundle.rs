//! Bundle loading - Enumerates firmware builds from a root directory
//!
//! A bundle is a read-only snapshot of every complete firmware build
//! found under one root. Two layouts are supported: a finished release
//! directory (one subdirectory per build) and a local project tree
//! (`<root>/projectfiles/<tool>/<name>/build/`).

use crate::firmware::{Discovered, FirmwareError, FirmwareImage};
use crate::registry::IdentifierRegistry;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to read bundle directory: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Firmware(#[from] FirmwareError),
    #[error("Unexpected entry \"{0}\" in release directory: neither a file nor a directory")]
    UnexpectedEntry(PathBuf),
    #[error("Project tree \"{root}\" has no \"projectfiles/{tool}\" directory")]
    MissingToolDir { root: PathBuf, tool: String },
}

/// Ordered collection of complete firmware images under one root.
///
/// Built once at construction; images are sorted by name so the
/// collection is deterministic regardless of directory enumeration
/// order.
#[derive(Debug, Clone, Serialize)]
pub struct FirmwareBundle {
    images: Vec<FirmwareImage>,
}

impl FirmwareBundle {
    /// Load a bundle from a finished release directory.
    ///
    /// Each subdirectory is treated as one firmware build named after
    /// the subdirectory. Loose files (release notes and the like) are
    /// ignored; any other entry kind is an integrity error.
    pub fn from_release_dir(
        dir: &Path,
        registry: &IdentifierRegistry,
    ) -> Result<Self, BundleError> {
        let mut images = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                let name = entry.file_name().to_string_lossy().into_owned();
                if let Discovered::Ready(image) =
                    FirmwareImage::discover(&name, &path, registry)?
                {
                    images.push(image);
                } else {
                    debug!(name = %name, "Skipping incomplete firmware build");
                }
            } else if path.is_file() {
                // No firmware to parse out of loose release files
            } else {
                return Err(BundleError::UnexpectedEntry(path));
            }
        }
        Ok(Self::from_images(images, dir))
    }

    /// Load a bundle from a local project tree.
    ///
    /// Does not build anything; it only picks up firmware that the
    /// given tool chain has already built under
    /// `<root>/projectfiles/<tool>/<name>/build/`.
    pub fn from_project_tree(
        root: &Path,
        tool: &str,
        registry: &IdentifierRegistry,
    ) -> Result<Self, BundleError> {
        let tool_dir = root.join("projectfiles").join(tool);
        if !tool_dir.is_dir() {
            return Err(BundleError::MissingToolDir {
                root: root.to_path_buf(),
                tool: tool.to_string(),
            });
        }

        let mut images = Vec::new();
        for entry in std::fs::read_dir(&tool_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let build_dir = path.join("build");
            if let Discovered::Ready(image) =
                FirmwareImage::discover(&name, &build_dir, registry)?
            {
                images.push(image);
            } else {
                debug!(name = %name, "Skipping unbuilt firmware target");
            }
        }
        Ok(Self::from_images(images, &tool_dir))
    }

    fn from_images(mut images: Vec<FirmwareImage>, root: &Path) -> Self {
        images.sort_by(|a, b| a.name.cmp(&b.name));
        info!(count = images.len(), root = %root.display(), "Firmware bundle loaded");
        Self { images }
    }

    /// The discovered images, sorted by name
    pub fn images(&self) -> &[FirmwareImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
