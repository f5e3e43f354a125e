//! Coordinate reference systems and their components.

use super::{Definition, NativeObject, Operation};
use crate::capability::Capability;
use crate::context::Context;
use crate::error::{ProjError, Result};
use crate::native::c_str_to_string;
use crate::native::ffi::{CoordinateSystemType, PjType};
use serde::Serialize;
use std::ffi::{c_char, c_int};
use std::ops::Deref;
use std::ptr;

/// A CRS object.
///
/// Construction fails with [`ProjError::UnexpectedObjectType`] when the
/// definition produces something other than a CRS (e.g. a bare
/// `+proj=merc` conversion), provided the library can answer `proj_is_crs`.
#[derive(Debug)]
pub struct Crs {
    object: NativeObject,
}

impl Crs {
    /// Create a CRS from any definition PROJ understands: `AUTH:CODE`, WKT,
    /// PROJJSON or a PROJ string with `+type=crs`.
    pub fn new(context: &Context, definition: impl Into<Definition>) -> Result<Self> {
        let object = NativeObject::create(context, &definition.into())?;
        Self::from_object(object)
    }

    pub(crate) fn from_object(object: NativeObject) -> Result<Self> {
        let capabilities = object.context().capabilities();
        if capabilities.is_available(Capability::IsCrs) && !object.is_crs()? {
            let actual = if capabilities.is_available(Capability::GetType) {
                object.object_type()?
            } else {
                PjType::Unknown
            };
            return Err(ProjError::UnexpectedObjectType {
                expected: "CRS",
                actual,
            });
        }
        Ok(Self { object })
    }

    /// Give up the CRS type and keep the handle.
    pub fn into_object(self) -> NativeObject {
        self.object
    }

    /// The geodetic (geographic or geocentric) CRS underlying this one.
    pub fn geodetic_crs(&self) -> Result<Option<Crs>> {
        self.object
            .child(Capability::CrsGetGeodeticCrs, |s| s.proj_crs_get_geodetic_crs)?
            .map(Crs::from_object)
            .transpose()
    }

    /// Child accessors below return `Ok(None)` when PROJ hands back null;
    /// the context errno is not consulted, since it may be stale.
    pub fn horizontal_datum(&self) -> Result<Option<NativeObject>> {
        self.object.child(Capability::CrsGetHorizontalDatum, |s| {
            s.proj_crs_get_horizontal_datum
        })
    }

    pub fn datum(&self) -> Result<Option<NativeObject>> {
        self.object
            .child(Capability::CrsGetDatum, |s| s.proj_crs_get_datum)
    }

    /// Component `index` of a compound CRS; `None` for other CRS kinds or an
    /// index past the end.
    pub fn sub_crs(&self, index: usize) -> Result<Option<Crs>> {
        let get = self
            .object
            .library()
            .entry(Capability::CrsGetSubCrs, |s| s.proj_crs_get_sub_crs)?;
        let (ctx, ptr) = self.object.handles()?;
        let index = c_int::try_from(index).unwrap_or(c_int::MAX);
        // SAFETY: handles are live; the result is a new owned object.
        let sub = unsafe { get(ctx, ptr, index) };
        NativeObject::from_optional(self.object.context(), sub)
            .map(Crs::from_object)
            .transpose()
    }

    /// The coordinate system; for a bound or compound CRS PROJ may have none.
    pub fn coordinate_system(&self) -> Result<Option<CoordinateSystem>> {
        Ok(self
            .object
            .child(Capability::CrsGetCoordinateSystem, |s| {
                s.proj_crs_get_coordinate_system
            })?
            .map(|object| CoordinateSystem { object }))
    }

    /// Kind of the coordinate system, if there is one.
    pub fn cs_type(&self) -> Result<Option<CoordinateSystemType>> {
        self.coordinate_system()?.map(|cs| cs.cs_type()).transpose()
    }

    /// Number of axes; 0 when PROJ reports no coordinate system.
    pub fn axis_count(&self) -> Result<usize> {
        match self.coordinate_system()? {
            Some(cs) => cs.axis_count(),
            None => Ok(0),
        }
    }

    /// Every axis, in order; empty without a coordinate system.
    pub fn axis_info(&self) -> Result<Vec<AxisInfo>> {
        match self.coordinate_system()? {
            Some(cs) => cs.axes(),
            None => Ok(Vec::new()),
        }
    }

    /// Ellipsoid of the CRS datum.
    pub fn ellipsoid(&self) -> Result<Option<Ellipsoid>> {
        Ok(self
            .object
            .child(Capability::GetEllipsoid, |s| s.proj_get_ellipsoid)?
            .map(|object| Ellipsoid { object }))
    }

    pub fn prime_meridian(&self) -> Result<Option<PrimeMeridian>> {
        Ok(self
            .object
            .child(Capability::GetPrimeMeridian, |s| s.proj_get_prime_meridian)?
            .map(|object| PrimeMeridian { object }))
    }

    /// Conversion from the base CRS of a projected/derived CRS.
    ///
    /// `None` for CRSs without one. A null from PROJ is not an error here.
    pub fn operation(&self) -> Result<Option<Operation>> {
        self.object
            .child(Capability::CrsGetCoordoperation, |s| {
                s.proj_crs_get_coordoperation
            })?
            .map(Operation::from_object)
            .transpose()
    }
}

impl Deref for Crs {
    type Target = NativeObject;

    fn deref(&self) -> &NativeObject {
        &self.object
    }
}

impl AsRef<NativeObject> for Crs {
    fn as_ref(&self) -> &NativeObject {
        &self.object
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// One axis of a coordinate system.
pub struct AxisInfo {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub direction: Option<String>,
    pub unit_conv_factor: f64,
    pub unit_name: Option<String>,
    pub unit_auth_name: Option<String>,
    pub unit_code: Option<String>,
}

#[derive(Debug)]
/// A coordinate system obtained from a [`Crs`].
pub struct CoordinateSystem {
    object: NativeObject,
}

impl CoordinateSystem {
    /// PROJ's `PJ_CS_TYPE_UNKNOWN` comes back as
    /// [`CoordinateSystemType::Unknown`] rather than an error; errno is not
    /// checked for it.
    pub fn cs_type(&self) -> Result<CoordinateSystemType> {
        let get = self
            .object
            .library()
            .entry(Capability::CsGetType, |s| s.proj_cs_get_type)?;
        let (ctx, ptr) = self.object.handles()?;
        // SAFETY: handles are live.
        Ok(CoordinateSystemType::from_raw(unsafe { get(ctx, ptr) }))
    }

    pub fn axis_count(&self) -> Result<usize> {
        let get = self
            .object
            .library()
            .entry(Capability::CsGetAxisCount, |s| s.proj_cs_get_axis_count)?;
        let (ctx, ptr) = self.object.handles()?;
        // SAFETY: handles are live.
        let count = unsafe { get(ctx, ptr) };
        if count < 0 {
            self.object.context().check(None)?;
        }
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Axis `index`, or `None` past the end.
    pub fn axis(&self, index: usize) -> Result<Option<AxisInfo>> {
        let get = self
            .object
            .library()
            .entry(Capability::CsGetAxisInfo, |s| s.proj_cs_get_axis_info)?;
        let (ctx, ptr) = self.object.handles()?;
        let mut name: *const c_char = ptr::null();
        let mut abbreviation: *const c_char = ptr::null();
        let mut direction: *const c_char = ptr::null();
        let mut factor = 0.0;
        let mut unit_name: *const c_char = ptr::null();
        let mut unit_auth: *const c_char = ptr::null();
        let mut unit_code: *const c_char = ptr::null();
        let index = c_int::try_from(index).unwrap_or(c_int::MAX);
        // SAFETY: handles are live; out-pointers reference locals and the
        // strings they receive belong to the coordinate system.
        unsafe {
            let found = get(
                ctx,
                ptr,
                index,
                &mut name,
                &mut abbreviation,
                &mut direction,
                &mut factor,
                &mut unit_name,
                &mut unit_auth,
                &mut unit_code,
            );
            if found == 0 {
                return Ok(None);
            }
            Ok(Some(AxisInfo {
                name: c_str_to_string(name),
                abbreviation: c_str_to_string(abbreviation),
                direction: c_str_to_string(direction),
                unit_conv_factor: factor,
                unit_name: c_str_to_string(unit_name),
                unit_auth_name: c_str_to_string(unit_auth),
                unit_code: c_str_to_string(unit_code),
            }))
        }
    }

    /// All axes in order.
    pub fn axes(&self) -> Result<Vec<AxisInfo>> {
        let mut axes = Vec::new();
        for index in 0..self.axis_count()? {
            if let Some(axis) = self.axis(index)? {
                axes.push(axis);
            }
        }
        Ok(axes)
    }
}

impl Deref for CoordinateSystem {
    type Target = NativeObject;

    fn deref(&self) -> &NativeObject {
        &self.object
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EllipsoidParameters {
    pub semi_major_metre: f64,
    pub semi_minor_metre: f64,
    pub is_semi_minor_computed: bool,
    pub inv_flattening: f64,
}

#[derive(Debug)]
pub struct Ellipsoid {
    object: NativeObject,
}

impl Ellipsoid {
    pub fn parameters(&self) -> Result<EllipsoidParameters> {
        let get = self.object.library().entry(Capability::EllipsoidGetParameters, |s| {
            s.proj_ellipsoid_get_parameters
        })?;
        let (ctx, ptr) = self.object.handles()?;
        let (mut semi_major, mut semi_minor, mut computed, mut inv_flattening) = (0.0, 0.0, 0, 0.0);
        // SAFETY: handles are live; out-pointers reference locals.
        let ok = unsafe {
            get(
                ctx,
                ptr,
                &mut semi_major,
                &mut semi_minor,
                &mut computed,
                &mut inv_flattening,
            )
        };
        if ok == 0 {
            self.object.context().check(None)?;
        }
        Ok(EllipsoidParameters {
            semi_major_metre: semi_major,
            semi_minor_metre: semi_minor,
            is_semi_minor_computed: computed != 0,
            inv_flattening,
        })
    }
}

impl Deref for Ellipsoid {
    type Target = NativeObject;

    fn deref(&self) -> &NativeObject {
        &self.object
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PrimeMeridianParameters {
    pub longitude: f64,
    pub unit_conv_factor: f64,
    pub unit_name: Option<String>,
}

#[derive(Debug)]
pub struct PrimeMeridian {
    object: NativeObject,
}

impl PrimeMeridian {
    pub fn parameters(&self) -> Result<PrimeMeridianParameters> {
        let get = self.object.library().entry(Capability::PrimeMeridianGetParameters, |s| {
            s.proj_prime_meridian_get_parameters
        })?;
        let (ctx, ptr) = self.object.handles()?;
        let (mut longitude, mut factor) = (0.0, 0.0);
        let mut unit_name: *const c_char = ptr::null();
        // SAFETY: handles are live; out-pointers reference locals.
        let ok = unsafe { get(ctx, ptr, &mut longitude, &mut factor, &mut unit_name) };
        if ok == 0 {
            self.object.context().check(None)?;
        }
        Ok(PrimeMeridianParameters {
            longitude,
            unit_conv_factor: factor,
            // SAFETY: unit_name is null or owned by the meridian.
            unit_name: unsafe { c_str_to_string(unit_name) },
        })
    }
}

impl Deref for PrimeMeridian {
    type Target = NativeObject;

    fn deref(&self) -> &NativeObject {
        &self.object
    }
}
