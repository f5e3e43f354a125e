//! Structured errors for every fallible call in the crate.
//!
//! PROJ reports failure through a per-context errno that the next native call
//! may overwrite. [`ErrorTranslator`] turns that errno into a [`ProjError`]
//! right away, so callers always get a typed value carrying the numeric code
//! and the message PROJ itself produced.

use crate::capability::{Capability, Version};
use crate::context::Context;
use crate::native::ffi::PjType;
use crate::native::{NativeLibrary, c_str_to_string};
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ProjError>;

#[derive(Debug, Error)]
pub enum ProjError {
    /// No shared library candidate could be opened.
    #[error("unable to load libproj; tried: {}", .searched.join(", "))]
    LibraryNotFound { searched: Vec<String> },

    /// The loaded PROJ release does not provide the requested entry point.
    #[error("{capability} requires PROJ {required} or later (loaded {resolved})")]
    CapabilityUnsupported {
        capability: Capability,
        required: Version,
        resolved: Version,
    },

    #[error("could not find proj.db; set PROJ_DATA (or PROJ_LIB) to the directory that contains it (searched {})", display_paths(.searched))]
    DatabaseNotFound { searched: Vec<PathBuf> },

    #[error("could not find the PROJ data directory; set PROJ_DATA (or PROJ_LIB) (searched {})", display_paths(.searched))]
    LibraryDataNotFound { searched: Vec<PathBuf> },

    /// The native factory rejected a definition.
    #[error("invalid definition {definition:?}: {message}")]
    InvalidDefinition {
        definition: String,
        code: i32,
        message: String,
    },

    #[error("expected a {expected} object, PROJ created {actual}")]
    UnexpectedObjectType {
        expected: &'static str,
        actual: PjType,
    },

    /// The supplied named fields do not form one recognised grouping.
    #[error("coordinate fields [{}] do not match a supported grouping (x,y[,z[,t]] | u,v[,w[,t]] | lam,phi[,z[,t]])", .supplied.join(", "))]
    AmbiguousCoordinateFields { supplied: Vec<&'static str> },

    #[error("proj error {code}: {message}")]
    Native { code: i32, message: String },

    /// An export call (`proj_as_wkt` and friends) returned nothing without
    /// setting an errno.
    #[error("PROJ could not export the object as {format}")]
    ExportFailed { format: &'static str },

    /// `proj_context_create` returned null. Only happens when the native
    /// allocator is exhausted; callers should treat it as fatal.
    #[error("proj_context_create failed to allocate a context")]
    ContextAllocation,

    #[error("the PROJ context has already been destroyed")]
    ContextReleased,

    #[error("the PROJ object has already been released")]
    ObjectReleased,

    #[error("string passed to PROJ contains an interior NUL byte")]
    InteriorNul(#[from] std::ffi::NulError),
}

/// Error code families defined by PROJ 8 and later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Coordinate operation initialisation (1024..2048).
    InvalidOperation,
    /// Failure transforming a specific coordinate (2048..4096).
    CoordinateTransform,
    /// API misuse, missing inverse, network failures (4096 and up).
    Other,
    /// Negative codes from the 4.x/5.x error list.
    Legacy,
    Unknown,
}

/// `proj.h` errno values (PROJ 8+). Each range base doubles as the generic
/// code of its category.
pub const PROJ_ERR_INVALID_OP: i32 = 1024;
pub const PROJ_ERR_INVALID_OP_WRONG_SYNTAX: i32 = PROJ_ERR_INVALID_OP + 1;
pub const PROJ_ERR_INVALID_OP_MISSING_ARG: i32 = PROJ_ERR_INVALID_OP + 2;
pub const PROJ_ERR_INVALID_OP_ILLEGAL_ARG_VALUE: i32 = PROJ_ERR_INVALID_OP + 3;
/// Per-coordinate failures from `proj_trans`.
pub const PROJ_ERR_COORD_TRANSFM: i32 = 2048;
pub const PROJ_ERR_COORD_TRANSFM_INVALID_COORD: i32 = PROJ_ERR_COORD_TRANSFM + 1;
pub const PROJ_ERR_COORD_TRANSFM_OUTSIDE_PROJECTION_DOMAIN: i32 = PROJ_ERR_COORD_TRANSFM + 2;
/// Everything else.
pub const PROJ_ERR_OTHER: i32 = 4096;
pub const PROJ_ERR_OTHER_API_MISUSE: i32 = PROJ_ERR_OTHER + 1;
pub const PROJ_ERR_OTHER_NO_INVERSE_OP: i32 = PROJ_ERR_OTHER + 2;

/// Error names from the 4.x `pj_strerrno` table, indexed by `-errno`.
const LEGACY_ERRORS: &[&str] = &[
    "unknown error",
    "no arguments in initialization list",
    "no options found in 'init' file",
    "no colon in init= string",
    "projection not named",
    "unknown projection id",
    "effective eccentricity = 1",
    "unknown unit conversion id",
    "invalid boolean param argument",
    "unknown elliptical parameter name",
    "reciprocal flattening (1/f) = 0",
    "|radius reference latitude| > 90",
    "squared eccentricity < 0",
    "major axis or radius = 0 or not given",
    "latitude or longitude exceeded limits",
    "invalid x or y",
    "improperly formed DMS value",
    "non-convergent inverse meridional dist",
    "non-convergent inverse phi2",
    "acos/asin: |arg| >1+1e-14",
    "tolerance condition error",
    "conic lat_1 = -lat_2",
    "lat_1 >= 90",
    "lat_1 = 0",
    "lat_ts >= 90",
    "no distance between control points",
    "projection not selected to be rotated",
    "W <= 0 or M <= 0",
    "lsat not in 1-5 range",
    "path not in range",
    "h <= 0",
    "k <= 0",
    "lat_0 = 0 or 90 or alpha = 90",
    "lat_1=lat_2 or lat_1=0 or lat_2=90",
    "elliptical usage required",
    "invalid UTM zone number",
    "arg(s) out of range for Tcheby eval",
    "failed to find projection to be rotated",
    "failed to load datum shift file",
    "both n & m must be spec'd and > 0",
    "n <= 0, n > 1 or not specified",
    "lat_1 or lat_2 not specified",
    "|lat_1| == |lat_2|",
    "lat_0 is pi/2 from mean lat",
    "unparseable coordinate system definition",
    "geocentric transformation missing z or ellps",
    "unknown prime meridian conversion id",
];

impl ProjError {
    /// Native error code carried by this error, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            ProjError::Native { code, .. } | ProjError::InvalidDefinition { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }

    /// Category of the native errno, when this error carries one.
    pub fn category(&self) -> Option<ErrorCategory> {
        self.code().map(category_for_code)
    }

    pub(crate) fn capability_unsupported(
        capability: Capability,
        resolved: Version,
    ) -> Self {
        ProjError::CapabilityUnsupported {
            capability,
            required: capability.introduced_in(),
            resolved,
        }
    }
}

/// Classify a native errno into its PROJ error family.
pub fn category_for_code(code: i32) -> ErrorCategory {
    match code {
        c if c < 0 => ErrorCategory::Legacy,
        c if (PROJ_ERR_INVALID_OP..PROJ_ERR_COORD_TRANSFM).contains(&c) => {
            ErrorCategory::InvalidOperation
        }
        c if (PROJ_ERR_COORD_TRANSFM..PROJ_ERR_OTHER).contains(&c) => {
            ErrorCategory::CoordinateTransform
        }
        c if c >= PROJ_ERR_OTHER => ErrorCategory::Other,
        _ => ErrorCategory::Unknown,
    }
}

/// Message for a 4.x errno when no native lookup is available.
pub fn legacy_error_message(code: i32) -> &'static str {
    let index = code.unsigned_abs() as usize;
    LEGACY_ERRORS.get(index).copied().unwrap_or(LEGACY_ERRORS[0])
}

/// Turns context errno values into [`ProjError`]s.
///
/// Must run directly after the native call that may have failed: any later
/// call through the same context can overwrite the errno.
pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Fails with [`ProjError::Native`] when `code` (or, if `None`, the
    /// context's current errno) is non-zero.
    pub fn check(context: &Context, code: Option<i32>) -> Result<()> {
        let code = match code {
            Some(code) => code,
            None => context.error_code()?,
        };
        if code == 0 {
            return Ok(());
        }
        Err(ProjError::Native {
            code,
            message: Self::message(context, code),
        })
    }

    /// Resolve the message for `code` using the newest lookup the loaded
    /// library offers.
    ///
    /// `proj_context_errno_string` (8.0) is preferred, then the context-free
    /// `proj_errno_string` (5.1), then the 4.x `pj_strerrno`, then the static
    /// legacy table.
    pub fn message(context: &Context, code: i32) -> String {
        let library = context.library();
        if let Ok(ptr) = context.raw() {
            if let Ok(lookup) =
                library.entry(Capability::ContextErrnoString, |s| s.proj_context_errno_string)
            {
                // SAFETY: ptr is a live context owned by `context`.
                let message = unsafe { c_str_to_string(lookup(ptr, code)) };
                if let Some(message) = message {
                    return message;
                }
            }
        }
        Self::message_without_context(library, code)
    }

    pub(crate) fn message_without_context(library: &NativeLibrary, code: i32) -> String {
        if let Ok(lookup) = library.entry(Capability::ErrnoString, |s| s.proj_errno_string) {
            // SAFETY: proj_errno_string returns a static or thread-local string.
            if let Some(message) = unsafe { c_str_to_string(lookup(code)) } {
                return message;
            }
        }
        if let Ok(lookup) = library.entry(Capability::PjStrerrno, |s| s.pj_strerrno) {
            // SAFETY: pj_strerrno returns a static string or a static buffer.
            if let Some(message) = unsafe { c_str_to_string(lookup(code)) } {
                return message;
            }
        }
        if code < 0 {
            legacy_error_message(code).to_string()
        } else {
            format!("unknown error (code {code})")
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
