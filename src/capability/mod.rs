//! Version-gated entry points.
//!
//! `Capability` names each PROJ symbol whose presence depends on the release,
//! and `CapabilityRegistry` records which of them the loaded library provides.
//! Every native call that is not universally available goes through
//! `NativeLibrary::entry`, which consults the registry first.

pub mod identity;
pub mod registry;

pub use identity::{Capability, Version};
pub use registry::{CapabilityRegistry, CapabilitySnapshot, VersionSource};
