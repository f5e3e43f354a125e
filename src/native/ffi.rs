//! C-compatible types shared with libproj.
//!
//! Layouts follow `proj.h`. Only the pieces this crate passes across the
//! boundary are declared; everything else stays opaque.

use serde::Serialize;
use std::ffi::{c_char, c_double, c_int, c_void};
use std::fmt;

/// Opaque `PJ_CONTEXT`.
#[repr(C)]
pub struct PjContext {
    _private: [u8; 0],
}

/// Opaque `PJ`.
#[repr(C)]
pub struct Pj {
    _private: [u8; 0],
}

/// Opaque `PJ_AREA`.
#[repr(C)]
pub struct PjArea {
    _private: [u8; 0],
}

/// `PJ_COORD`: a union of 4-double views, represented by its `v` member.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PjCoord {
    pub v: [c_double; 4],
}

/// `PJ_INFO` (5.0+).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PjInfo {
    pub major: c_int,
    pub minor: c_int,
    pub patch: c_int,
    pub release: *const c_char,
    pub version: *const c_char,
    pub searchpath: *const c_char,
    pub paths: *const *const c_char,
    pub path_count: usize,
}

/// `PJ_PROJ_INFO` (5.0+).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PjProjInfo {
    pub id: *const c_char,
    pub description: *const c_char,
    pub definition: *const c_char,
    pub has_inverse: c_int,
    pub accuracy: c_double,
}

/// `PJ_LOG_FUNCTION`.
pub type PjLogFunction = unsafe extern "C" fn(*mut c_void, c_int, *const c_char);

/// `PJ_DIRECTION`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Identity,
    Inverse,
}

impl Direction {
    pub(crate) fn as_raw(self) -> c_int {
        match self {
            Direction::Forward => 1,
            Direction::Identity => 0,
            Direction::Inverse => -1,
        }
    }
}

/// `PJ_LOG_LEVEL`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    None,
    Error,
    Debug,
    Trace,
}

impl LogLevel {
    pub(crate) const TELL: c_int = 4;

    pub(crate) fn as_raw(self) -> c_int {
        match self {
            LogLevel::None => 0,
            LogLevel::Error => 1,
            LogLevel::Debug => 2,
            LogLevel::Trace => 3,
        }
    }

    pub(crate) fn from_raw(raw: c_int) -> Self {
        match raw {
            i32::MIN..=0 => LogLevel::None,
            1 => LogLevel::Error,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// `PJ_WKT_TYPE`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WktType {
    Wkt2_2015,
    Wkt2_2015Simplified,
    #[default]
    Wkt2_2019,
    Wkt2_2019Simplified,
    Wkt1Gdal,
    Wkt1Esri,
}

impl WktType {
    pub(crate) fn as_raw(self) -> c_int {
        match self {
            WktType::Wkt2_2015 => 0,
            WktType::Wkt2_2015Simplified => 1,
            WktType::Wkt2_2019 => 2,
            WktType::Wkt2_2019Simplified => 3,
            WktType::Wkt1Gdal => 4,
            WktType::Wkt1Esri => 5,
        }
    }
}

/// `PJ_PROJ_STRING_TYPE`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProjStringType {
    Proj5,
    #[default]
    Proj4,
}

impl ProjStringType {
    pub(crate) fn as_raw(self) -> c_int {
        match self {
            ProjStringType::Proj5 => 0,
            ProjStringType::Proj4 => 1,
        }
    }
}

/// `PJ_COMPARISON_CRITERION`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Comparison {
    Strict,
    #[default]
    Equivalent,
    EquivalentExceptAxisOrderGeogcrs,
}

impl Comparison {
    pub(crate) fn as_raw(self) -> c_int {
        match self {
            Comparison::Strict => 0,
            Comparison::Equivalent => 1,
            Comparison::EquivalentExceptAxisOrderGeogcrs => 2,
        }
    }
}

/// `PJ_COORDINATE_SYSTEM_TYPE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSystemType {
    Unknown,
    Cartesian,
    Ellipsoidal,
    Vertical,
    Spherical,
    Ordinal,
    Parametric,
    DateTimeTemporal,
    TemporalCount,
    TemporalMeasure,
}

impl CoordinateSystemType {
    pub(crate) fn from_raw(raw: c_int) -> Self {
        match raw {
            1 => CoordinateSystemType::Cartesian,
            2 => CoordinateSystemType::Ellipsoidal,
            3 => CoordinateSystemType::Vertical,
            4 => CoordinateSystemType::Spherical,
            5 => CoordinateSystemType::Ordinal,
            6 => CoordinateSystemType::Parametric,
            7 => CoordinateSystemType::DateTimeTemporal,
            8 => CoordinateSystemType::TemporalCount,
            9 => CoordinateSystemType::TemporalMeasure,
            _ => CoordinateSystemType::Unknown,
        }
    }
}

/// `PJ_TYPE`, the kind of object a `PJ*` holds.
///
/// Values past the known list come back as `Other(raw)` so newer releases do
/// not break older builds of this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PjType {
    Unknown,
    Ellipsoid,
    PrimeMeridian,
    GeodeticReferenceFrame,
    DynamicGeodeticReferenceFrame,
    VerticalReferenceFrame,
    DynamicVerticalReferenceFrame,
    DatumEnsemble,
    Crs,
    GeodeticCrs,
    GeocentricCrs,
    GeographicCrs,
    Geographic2dCrs,
    Geographic3dCrs,
    VerticalCrs,
    ProjectedCrs,
    CompoundCrs,
    TemporalCrs,
    EngineeringCrs,
    BoundCrs,
    OtherCrs,
    Conversion,
    Transformation,
    ConcatenatedOperation,
    OtherCoordinateOperation,
    TemporalDatum,
    EngineeringDatum,
    ParametricDatum,
    DerivedProjectedCrs,
    CoordinateMetadata,
    Other(i32),
}

const PJ_TYPES: [PjType; 30] = [
    PjType::Unknown,
    PjType::Ellipsoid,
    PjType::PrimeMeridian,
    PjType::GeodeticReferenceFrame,
    PjType::DynamicGeodeticReferenceFrame,
    PjType::VerticalReferenceFrame,
    PjType::DynamicVerticalReferenceFrame,
    PjType::DatumEnsemble,
    PjType::Crs,
    PjType::GeodeticCrs,
    PjType::GeocentricCrs,
    PjType::GeographicCrs,
    PjType::Geographic2dCrs,
    PjType::Geographic3dCrs,
    PjType::VerticalCrs,
    PjType::ProjectedCrs,
    PjType::CompoundCrs,
    PjType::TemporalCrs,
    PjType::EngineeringCrs,
    PjType::BoundCrs,
    PjType::OtherCrs,
    PjType::Conversion,
    PjType::Transformation,
    PjType::ConcatenatedOperation,
    PjType::OtherCoordinateOperation,
    PjType::TemporalDatum,
    PjType::EngineeringDatum,
    PjType::ParametricDatum,
    PjType::DerivedProjectedCrs,
    PjType::CoordinateMetadata,
];

impl PjType {
    pub(crate) fn from_raw(raw: c_int) -> Self {
        usize::try_from(raw)
            .ok()
            .and_then(|index| PJ_TYPES.get(index).copied())
            .unwrap_or(PjType::Other(raw))
    }

    pub(crate) fn as_raw(self) -> c_int {
        match self {
            PjType::Other(raw) => raw,
            known => PJ_TYPES
                .iter()
                .position(|candidate| *candidate == known)
                .map(|index| index as c_int)
                .unwrap_or(0),
        }
    }

    /// Any of the CRS kinds, including bound and engineering CRSs.
    pub fn is_crs(self) -> bool {
        matches!(
            self,
            PjType::Crs
                | PjType::GeodeticCrs
                | PjType::GeocentricCrs
                | PjType::GeographicCrs
                | PjType::Geographic2dCrs
                | PjType::Geographic3dCrs
                | PjType::VerticalCrs
                | PjType::ProjectedCrs
                | PjType::CompoundCrs
                | PjType::TemporalCrs
                | PjType::EngineeringCrs
                | PjType::BoundCrs
                | PjType::OtherCrs
                | PjType::DerivedProjectedCrs
        )
    }

    pub fn is_coordinate_operation(self) -> bool {
        matches!(
            self,
            PjType::Conversion
                | PjType::Transformation
                | PjType::ConcatenatedOperation
                | PjType::OtherCoordinateOperation
        )
    }
}

impl fmt::Display for PjType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PjType::Other(raw) => write!(f, "PJ_TYPE({raw})"),
            known => write!(f, "{known:?}"),
        }
    }
}
