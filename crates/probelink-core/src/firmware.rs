//! Firmware image classification and artifact path derivation
//!
//! A firmware image is described entirely by its build-directory name:
//! the name encodes the HDK fragment, the role (interface vs
//! bootloader) and, for interface firmware, the target board. The
//! expected build artifacts are derived from the name with fixed
//! suffix conventions and checked for existence.

use crate::registry::IdentifierRegistry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static IF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z0-9]+)_([a-z0-9_]+)_if$").expect("valid pattern"));
static BL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z0-9]+)_bl$").expect("valid pattern"));

#[derive(Error, Debug)]
pub enum FirmwareError {
    #[error("Bad firmware name \"{0}\": matches neither the interface nor the bootloader naming scheme")]
    BadName(String),
    #[error("Unknown HDK \"{fragment}\" in firmware \"{name}\": the fragment must be added to the identifier registry")]
    UnknownHdk { name: String, fragment: String },
    #[error("Unknown board for interface firmware \"{0}\": the name must be added to the identifier registry")]
    UnknownBoard(String),
    #[error("Failed to resolve build directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Role a firmware image plays on the debug probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirmwareKind {
    /// Implements the probe-to-host protocol
    Interface,
    /// Field-updates the interface firmware
    Bootloader,
}

/// One discovered firmware image, immutable after construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmwareImage {
    /// Build-directory name, source of all derived classification
    pub name: String,
    pub kind: FirmwareKind,
    /// Hardware ID of the HDK this image runs on
    pub hdk_id: u32,
    /// Target board ID; bootloaders may be board-agnostic
    pub board_id: Option<u16>,
    pub bin_path: PathBuf,
    pub hex_path: PathBuf,
    pub elf_path: PathBuf,
}

/// Outcome of a discovery attempt for one candidate name.
///
/// `Incomplete` keeps the populated image so callers can report what
/// was expected where; bundles exclude it from their collections.
#[derive(Debug, Clone)]
pub enum Discovered {
    /// All three build artifacts exist
    Ready(FirmwareImage),
    /// Classification succeeded but some artifacts are missing
    Incomplete {
        image: FirmwareImage,
        missing: Vec<PathBuf>,
    },
}

impl FirmwareImage {
    /// Classify `name` and derive its artifact paths under `build_dir`.
    ///
    /// Returns an error for names that do not belong in a firmware
    /// tree at all (bad pattern, unregistered HDK fragment, interface
    /// firmware with an unregistered board). Missing artifact files
    /// are not an error; they produce [`Discovered::Incomplete`].
    pub fn discover(
        name: &str,
        build_dir: &Path,
        registry: &IdentifierRegistry,
    ) -> Result<Discovered, FirmwareError> {
        let (kind, fragment) = classify(name)?;

        let hdk_id = registry
            .hdk_id(fragment)
            .ok_or_else(|| FirmwareError::UnknownHdk {
                name: name.to_string(),
                fragment: fragment.to_string(),
            })?;

        let board_id = match registry.board_id(name) {
            Some(id) => Some(id),
            None if kind == FirmwareKind::Interface => {
                return Err(FirmwareError::UnknownBoard(name.to_string()));
            }
            None => None,
        };

        let build_dir = std::path::absolute(build_dir)?;
        let image = FirmwareImage {
            name: name.to_string(),
            kind,
            hdk_id,
            board_id,
            bin_path: build_dir.join(format!("{name}_crc.bin")),
            hex_path: build_dir.join(format!("{name}_crc.hex")),
            elf_path: build_dir.join(format!("{name}.axf")),
        };

        let missing: Vec<PathBuf> = [&image.bin_path, &image.hex_path, &image.elf_path]
            .into_iter()
            .filter(|p| !p.is_file())
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(Discovered::Ready(image))
        } else {
            debug!(name, ?missing, "Firmware build output incomplete");
            Ok(Discovered::Incomplete { image, missing })
        }
    }
}

impl std::fmt::Display for FirmwareImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Name={} Board ID=0x{:04x} HDK ID=0x{:08x}",
            self.name,
            self.board_id.unwrap_or(0),
            self.hdk_id
        )
    }
}

/// Match `name` against the two firmware naming schemes.
///
/// Exactly one scheme must match; returns the kind and the HDK
/// fragment captured from the name.
fn classify(name: &str) -> Result<(FirmwareKind, &str), FirmwareError> {
    if let Some(caps) = IF_RE.captures(name) {
        let fragment = caps.get(1).map_or("", |m| m.as_str());
        return Ok((FirmwareKind::Interface, fragment));
    }
    if let Some(caps) = BL_RE.captures(name) {
        let fragment = caps.get(1).map_or("", |m| m.as_str());
        return Ok((FirmwareKind::Bootloader, fragment));
    }
    Err(FirmwareError::BadName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_registry() -> IdentifierRegistry {
        let mut registry = IdentifierRegistry::default();
        registry.add_hdk("k20dx", 0x97969900);
        registry.add_hdk("lpc11u35", 0x97969902);
        registry.add_board("k20dx_frdmk22f_if", 0x0231);
        registry
    }

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    fn write_artifacts(dir: &Path, name: &str) {
        touch(dir, &format!("{name}_crc.bin"));
        touch(dir, &format!("{name}_crc.hex"));
        touch(dir, &format!("{name}.axf"));
    }

    #[test]
    fn test_interface_classification() {
        let temp = TempDir::new().unwrap();
        write_artifacts(temp.path(), "k20dx_frdmk22f_if");

        let discovered =
            FirmwareImage::discover("k20dx_frdmk22f_if", temp.path(), &test_registry()).unwrap();
        let Discovered::Ready(image) = discovered else {
            panic!("expected a ready image");
        };

        assert_eq!(image.kind, FirmwareKind::Interface);
        assert_eq!(image.hdk_id, 0x97969900);
        assert_eq!(image.board_id, Some(0x0231));
        assert!(image.bin_path.is_absolute());
        assert!(image.bin_path.ends_with("k20dx_frdmk22f_if_crc.bin"));
        assert!(image.hex_path.ends_with("k20dx_frdmk22f_if_crc.hex"));
        assert!(image.elf_path.ends_with("k20dx_frdmk22f_if.axf"));
    }

    #[test]
    fn test_bootloader_without_board_id() {
        let temp = TempDir::new().unwrap();
        write_artifacts(temp.path(), "k20dx_bl");

        let discovered =
            FirmwareImage::discover("k20dx_bl", temp.path(), &test_registry()).unwrap();
        let Discovered::Ready(image) = discovered else {
            panic!("expected a ready image");
        };

        assert_eq!(image.kind, FirmwareKind::Bootloader);
        assert_eq!(image.hdk_id, 0x97969900);
        assert_eq!(image.board_id, None);
    }

    #[test]
    fn test_bad_names_rejected() {
        let temp = TempDir::new().unwrap();
        let registry = test_registry();

        // "k64f_if" has no board fragment, so it fits neither scheme
        for name in ["k20dx", "K20DX_IF", "k20dx_frdmk22f", "k64f_if", "readme", ""] {
            assert!(matches!(
                FirmwareImage::discover(name, temp.path(), &registry),
                Err(FirmwareError::BadName(_))
            ));
        }
    }

    #[test]
    fn test_unknown_hdk_fatal() {
        let temp = TempDir::new().unwrap();
        let registry = test_registry();

        for name in ["k64f_frdmk64f_if", "k64f_bl"] {
            assert!(matches!(
                FirmwareImage::discover(name, temp.path(), &registry),
                Err(FirmwareError::UnknownHdk { .. })
            ));
        }
    }

    #[test]
    fn test_unknown_board_fatal_for_interface_only() {
        let temp = TempDir::new().unwrap();
        write_artifacts(temp.path(), "lpc11u35_bl");
        let registry = test_registry();

        // Interface name not in the board table
        assert!(matches!(
            FirmwareImage::discover("lpc11u35_archble_if", temp.path(), &registry),
            Err(FirmwareError::UnknownBoard(_))
        ));

        // Bootloader name not in the board table is fine
        let discovered = FirmwareImage::discover("lpc11u35_bl", temp.path(), &registry).unwrap();
        assert!(matches!(discovered, Discovered::Ready(_)));
    }

    #[test]
    fn test_missing_artifact_marks_incomplete() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "k20dx_bl_crc.bin");
        touch(temp.path(), "k20dx_bl_crc.hex");
        // No .axf

        let discovered =
            FirmwareImage::discover("k20dx_bl", temp.path(), &test_registry()).unwrap();
        let Discovered::Incomplete { image, missing } = discovered else {
            panic!("expected an incomplete image");
        };

        assert_eq!(image.name, "k20dx_bl");
        assert_eq!(missing.len(), 1);
        assert!(missing[0].ends_with("k20dx_bl.axf"));
    }

    #[test]
    fn test_path_derivation_deterministic() {
        let temp = TempDir::new().unwrap();
        let registry = test_registry();

        let a = FirmwareImage::discover("k20dx_bl", temp.path(), &registry).unwrap();
        let b = FirmwareImage::discover("k20dx_bl", temp.path(), &registry).unwrap();
        let (Discovered::Incomplete { image: a, .. }, Discovered::Incomplete { image: b, .. }) =
            (a, b)
        else {
            panic!("expected incomplete images");
        };

        assert_eq!(a.bin_path, b.bin_path);
        assert_eq!(a.hex_path, b.hex_path);
        assert_eq!(a.elf_path, b.elf_path);
    }

    #[test]
    fn test_display_format() {
        let temp = TempDir::new().unwrap();
        let registry = test_registry();
        write_artifacts(temp.path(), "k20dx_frdmk22f_if");
        write_artifacts(temp.path(), "k20dx_bl");

        let Discovered::Ready(interface) =
            FirmwareImage::discover("k20dx_frdmk22f_if", temp.path(), &registry).unwrap()
        else {
            panic!("expected a ready image");
        };
        assert_eq!(
            interface.to_string(),
            "Name=k20dx_frdmk22f_if Board ID=0x0231 HDK ID=0x97969900"
        );

        // Absent board ID renders as zero
        let Discovered::Ready(bootloader) =
            FirmwareImage::discover("k20dx_bl", temp.path(), &registry).unwrap()
        else {
            panic!("expected a ready image");
        };
        assert_eq!(
            bootloader.to_string(),
            "Name=k20dx_bl Board ID=0x0000 HDK ID=0x97969900"
        );
    }
}
