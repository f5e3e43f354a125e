//! Capability-gated, lifetime-safe access to the PROJ coordinate
//! transformation library.
//!
//! libproj is opened at runtime and probed once for its release. Each entry
//! point that only exists in some releases is described by a
//! [`Capability`]; calling one the loaded library lacks fails with
//! [`ProjError::CapabilityUnsupported`] before any native code runs. Native
//! handles are owned by [`Context`] and [`NativeObject`] and released exactly
//! once, and PROJ's errno convention is turned into [`ProjError`] values at the
//! call site.
//!
//! The crate does no coordinate math of its own.

pub mod capability;
pub mod config;
pub mod context;
pub mod coordinate;
pub mod error;
pub mod native;
pub mod object;

pub use capability::{Capability, CapabilityRegistry, CapabilitySnapshot, Version, VersionSource};
pub use config::DataSearch;
pub use context::{Context, WeakContext, current_for_thread, install_for_thread, teardown_for_thread};
pub use coordinate::{Coordinate, CoordinateFields, DEG_TO_RAD, Point, RAD_TO_DEG};
pub use error::{ErrorCategory, ErrorTranslator, ProjError, Result};
pub use native::NativeLibrary;
pub use native::ffi::{
    Comparison, CoordinateSystemType, Direction, LogLevel, PjType, ProjStringType, WktType,
};
pub use object::{
    AreaOfUse, AxisInfo, CoordinateOperation, CoordinateSystem, Crs, Definition, Ellipsoid,
    EllipsoidParameters, MethodInfo, NativeObject, Operation, PrimeMeridian,
    PrimeMeridianParameters, ProjInfo, Transformation,
};

/// Release libproj's process-wide caches (`proj_cleanup`, PROJ 6.2+).
///
/// Call once at orderly shutdown, after every context has been destroyed.
pub fn cleanup() -> Result<()> {
    NativeLibrary::global()?.cleanup()
}
