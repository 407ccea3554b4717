//! Probelink Core - Firmware artifact discovery for debug-probe builds
//!
//! This crate locates firmware images that a release process or a local
//! build tree has already produced:
//! - Identifier registry mapping HDK fragments and firmware names to IDs
//! - Firmware image classification from build-directory names
//! - Bundle loading from a release directory or a project build tree

pub mod bundle;
pub mod firmware;
pub mod registry;

pub use bundle::{BundleError, FirmwareBundle};
pub use firmware::{Discovered, FirmwareError, FirmwareImage, FirmwareKind};
pub use registry::{IdentifierRegistry, RegistryError};
