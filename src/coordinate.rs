//! Coordinate value types.
//!
//! A [`Coordinate`] is always four doubles, laid out like `PJ_COORD`. The
//! named accessors are views over the same slots:
//!
//! | slot | names                  |
//! |------|------------------------|
//! | 0    | x, u, lam, o, e, s     |
//! | 1    | y, v, phi, p, n, a1    |
//! | 2    | z, w, k, a2            |
//! | 3    | t                      |
//!
//! Nothing records which convention a value was built with, so `c.lam()`
//! on a coordinate built from `x`/`y` simply reads slot 0. Interpreting the
//! slots (degrees vs. radians, easting vs. longitude) is up to the caller and
//! the CRS in use.

use crate::error::{ProjError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Degrees to radians.
pub const DEG_TO_RAD: f64 = PI / 180.0;
/// Radians to degrees.
pub const RAD_TO_DEG: f64 = 180.0 / PI;

/// Field groupings accepted by [`CoordinateFields::build`], each mapped onto
/// slots 0.. in order.
const GROUPINGS: &[&[&str]] = &[
    &["x", "y"],
    &["x", "y", "z"],
    &["x", "y", "z", "t"],
    &["u", "v"],
    &["u", "v", "w"],
    &["u", "v", "w", "t"],
    &["lam", "phi"],
    &["lam", "phi", "z"],
    &["lam", "phi", "z", "t"],
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
/// The four-slot `PJ_COORD` union as a plain value.
///
/// The named accessors are views over the same slots: `x`, `u`, `lam`, `o`,
/// `e` and `s` all read slot 0.
pub struct Coordinate {
    v: [f64; 4],
}

impl Coordinate {
    /// Raw slot values, in `PJ_COORD` order.
    pub const fn from_array(v: [f64; 4]) -> Self {
        Self { v }
    }

    pub const fn to_array(&self) -> [f64; 4] {
        self.v
    }

    /// See [`CoordinateFields::build`].
    pub fn from_fields(fields: CoordinateFields) -> Result<Self> {
        fields.build()
    }

    /// Cartesian or projected position; missing slots are zero.
    pub const fn xy(x: f64, y: f64) -> Self {
        Self::from_array([x, y, 0.0, 0.0])
    }

    pub const fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self::from_array([x, y, z, 0.0])
    }

    pub const fn xyzt(x: f64, y: f64, z: f64, t: f64) -> Self {
        Self::from_array([x, y, z, t])
    }

    /// Same slots as [`xy`](Self::xy), named the way PROJ names `PJ_UV`.
    pub const fn uv(u: f64, v: f64) -> Self {
        Self::xy(u, v)
    }

    pub const fn uvw(u: f64, v: f64, w: f64) -> Self {
        Self::xyz(u, v, w)
    }

    pub const fn uvwt(u: f64, v: f64, w: f64, t: f64) -> Self {
        Self::xyzt(u, v, w, t)
    }

    /// Longitude/latitude, usually radians for PROJ pipelines.
    pub const fn lp(lam: f64, phi: f64) -> Self {
        Self::xy(lam, phi)
    }

    pub const fn lpz(lam: f64, phi: f64, z: f64) -> Self {
        Self::xyz(lam, phi, z)
    }

    pub const fn lpzt(lam: f64, phi: f64, z: f64, t: f64) -> Self {
        Self::xyzt(lam, phi, z, t)
    }

    /// Slot 0.
    pub const fn x(&self) -> f64 {
        self.v[0]
    }
    pub const fn y(&self) -> f64 {
        self.v[1]
    }
    pub const fn z(&self) -> f64 {
        self.v[2]
    }
    /// Slot 3, time in decimal years for time-dependent operations.
    pub const fn t(&self) -> f64 {
        self.v[3]
    }

    /// The uvw view; same slots as x/y/z.
    pub const fn u(&self) -> f64 {
        self.v[0]
    }
    pub const fn v(&self) -> f64 {
        self.v[1]
    }
    pub const fn w(&self) -> f64 {
        self.v[2]
    }

    /// Longitude slot.
    pub const fn lam(&self) -> f64 {
        self.v[0]
    }
    /// Latitude slot.
    pub const fn phi(&self) -> f64 {
        self.v[1]
    }

    /// Omega/phi/kappa view (`PJ_OPK`).
    pub const fn o(&self) -> f64 {
        self.v[0]
    }
    pub const fn p(&self) -> f64 {
        self.v[1]
    }
    pub const fn k(&self) -> f64 {
        self.v[2]
    }

    /// East/north/up view (`PJ_ENU`). `u` is not repeated here: it already
    /// names slot 0 in the uvw view.
    pub const fn e(&self) -> f64 {
        self.v[0]
    }
    pub const fn n(&self) -> f64 {
        self.v[1]
    }

    /// Geodesic distance/azimuth view (`PJ_GEOD`).
    pub const fn s(&self) -> f64 {
        self.v[0]
    }
    pub const fn a1(&self) -> f64 {
        self.v[1]
    }
    pub const fn a2(&self) -> f64 {
        self.v[2]
    }
}

impl From<[f64; 4]> for Coordinate {
    fn from(v: [f64; 4]) -> Self {
        Self::from_array(v)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [v0, v1, v2, v3] = self.v;
        write!(f, "v0: {v0}, v1: {v1}, v2: {v2}, v3: {v3}")
    }
}

/// Named-field builder for [`Coordinate`].
///
/// Exactly one grouping must be supplied in full; a partial or mixed set
/// (say `x` with `phi`) is rejected rather than guessed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinateFields {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub t: Option<f64>,
    pub u: Option<f64>,
    pub v: Option<f64>,
    pub w: Option<f64>,
    pub lam: Option<f64>,
    pub phi: Option<f64>,
}

impl CoordinateFields {
    /// No fields set.
    pub fn new() -> Self {
        Self::default()
    }

    // Setters below only record the value; grouping is checked in build().
    pub fn x(mut self, value: f64) -> Self {
        self.x = Some(value);
        self
    }
    pub fn y(mut self, value: f64) -> Self {
        self.y = Some(value);
        self
    }
    pub fn z(mut self, value: f64) -> Self {
        self.z = Some(value);
        self
    }
    pub fn t(mut self, value: f64) -> Self {
        self.t = Some(value);
        self
    }
    pub fn u(mut self, value: f64) -> Self {
        self.u = Some(value);
        self
    }
    pub fn v(mut self, value: f64) -> Self {
        self.v = Some(value);
        self
    }
    pub fn w(mut self, value: f64) -> Self {
        self.w = Some(value);
        self
    }
    pub fn lam(mut self, value: f64) -> Self {
        self.lam = Some(value);
        self
    }
    pub fn phi(mut self, value: f64) -> Self {
        self.phi = Some(value);
        self
    }

    fn entries(&self) -> [(&'static str, Option<f64>); 9] {
        [
            ("x", self.x),
            ("y", self.y),
            ("z", self.z),
            ("t", self.t),
            ("u", self.u),
            ("v", self.v),
            ("w", self.w),
            ("lam", self.lam),
            ("phi", self.phi),
        ]
    }

    /// Names of the fields that were set, in declaration order.
    pub fn supplied(&self) -> Vec<&'static str> {
        self.entries()
            .into_iter()
            .filter_map(|(name, value)| value.map(|_| name))
            .collect()
    }

    /// Map the supplied fields onto slots.
    ///
    /// The set must match one grouping exactly (`x,y[,z[,t]]`, `u,v[,w[,t]]`
    /// or `lam,phi[,z[,t]]`); anything else is
    /// [`ProjError::AmbiguousCoordinateFields`].
    pub fn build(self) -> Result<Coordinate> {
        let supplied = self.supplied();
        let grouping = GROUPINGS
            .iter()
            .find(|grouping| {
                grouping.len() == supplied.len()
                    && grouping.iter().all(|name| supplied.contains(name))
            })
            .ok_or_else(|| ProjError::AmbiguousCoordinateFields {
                supplied: supplied.clone(),
            })?;
        let entries = self.entries();
        let mut v = [0.0; 4];
        for (slot, name) in grouping.iter().enumerate() {
            v[slot] = entries
                .iter()
                .find(|(field, _)| field == name)
                .and_then(|(_, value)| *value)
                .unwrap_or_default();
        }
        Ok(Coordinate::from_array(v))
    }
}

/// Two- or three-dimensional point with x/y aliased as lon/lat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point {
    /// A 2D point; z is zero.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub const fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Alias for `x`.
    pub const fn lon(&self) -> f64 {
        self.x
    }

    /// Alias for `y`.
    pub const fn lat(&self) -> f64 {
        self.y
    }

    pub fn set_lon(&mut self, lon: f64) {
        self.x = lon;
    }

    pub fn set_lat(&mut self, lat: f64) {
        self.y = lat;
    }

    /// Scale x and y from degrees to radians; z is left alone.
    pub fn to_radians(&self) -> Self {
        Self::with_z(self.x * DEG_TO_RAD, self.y * DEG_TO_RAD, self.z)
    }

    /// Inverse of [`to_radians`](Self::to_radians).
    pub fn to_degrees(&self) -> Self {
        Self::with_z(self.x * RAD_TO_DEG, self.y * RAD_TO_DEG, self.z)
    }
}

impl From<Point> for Coordinate {
    fn from(point: Point) -> Self {
        Coordinate::xyz(point.x, point.y, point.z)
    }
}
