//! Coordinate operations and transformations.

use super::{Crs, Definition, NativeObject};
use crate::capability::Capability;
use crate::context::Context;
use crate::coordinate::Coordinate;
use crate::error::{ErrorTranslator, ProjError, Result};
use crate::native::c_str_to_string;
use crate::native::ffi::{Direction, PjCoord, PjType};
use serde::Serialize;
use std::ffi::{CString, c_char};
use std::ops::Deref;
use std::ptr;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Name and identifier of the method behind an operation.
pub struct MethodInfo {
    pub name: Option<String>,
    pub auth_name: Option<String>,
    pub code: Option<String>,
}

/// Anything that can move coordinates through `proj_trans`.
pub trait CoordinateOperation {
    fn native(&self) -> &NativeObject;

    /// One `proj_trans` call, with the object's errno reset before and
    /// checked right after.
    fn transform(&self, direction: Direction, coord: &Coordinate) -> Result<Coordinate> {
        let object = self.native();
        let library = object.library();
        let reset = library.entry(Capability::ErrnoReset, |s| s.proj_errno_reset)?;
        let trans = library.entry(Capability::Trans, |s| s.proj_trans)?;
        let errno = library.entry(Capability::Errno, |s| s.proj_errno)?;
        let ptr = object.raw()?;
        // SAFETY: ptr is live for the duration of these three calls.
        let (out, code) = unsafe {
            reset(ptr);
            let out = trans(ptr, direction.as_raw(), PjCoord { v: coord.to_array() });
            (out, errno(ptr))
        };
        if code != 0 {
            return Err(ProjError::Native {
                code,
                message: ErrorTranslator::message(object.context(), code),
            });
        }
        Ok(Coordinate::from_array(out.v))
    }

    fn forward(&self, coord: &Coordinate) -> Result<Coordinate> {
        self.transform(Direction::Forward, coord)
    }

    fn inverse(&self, coord: &Coordinate) -> Result<Coordinate> {
        self.transform(Direction::Inverse, coord)
    }

    /// Forward-transform each coordinate, stopping at the first failure.
    fn forward_all<'a, I>(&self, coords: I) -> Result<Vec<Coordinate>>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        coords.into_iter().map(|coord| self.forward(coord)).collect()
    }

    fn inverse_all<'a, I>(&self, coords: I) -> Result<Vec<Coordinate>>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        coords.into_iter().map(|coord| self.inverse(coord)).collect()
    }
}

/// A conversion, transformation or concatenated operation.
#[derive(Debug)]
pub struct Operation {
    object: NativeObject,
}

impl Operation {
    /// Create an operation, rejecting definitions that yield a CRS or
    /// another non-operation object.
    pub fn new(context: &Context, definition: impl Into<Definition>) -> Result<Self> {
        Self::from_object(NativeObject::create(context, &definition.into())?)
    }

    /// Accepts the object when `proj_get_type` reports a coordinate
    /// operation, or when the library is too old to ask.
    pub(crate) fn from_object(object: NativeObject) -> Result<Self> {
        Self::checked(object, false)
    }

    fn checked(object: NativeObject, allow_unknown: bool) -> Result<Self> {
        if object.context().capabilities().is_available(Capability::GetType) {
            let actual = object.object_type()?;
            let untyped = allow_unknown && actual == PjType::Unknown;
            if !untyped && !actual.is_coordinate_operation() {
                return Err(ProjError::UnexpectedObjectType {
                    expected: "coordinate operation",
                    actual,
                });
            }
        }
        Ok(Self { object })
    }

    /// Accuracy in metres as reported by the operation; -1 when unknown.
    ///
    /// Shadows [`NativeObject::accuracy`], which reads the `proj_pj_info`
    /// summary instead.
    pub fn accuracy(&self) -> Result<f64> {
        let get = self.object.library().entry(Capability::CoordoperationGetAccuracy, |s| {
            s.proj_coordoperation_get_accuracy
        })?;
        let (ctx, ptr) = self.object.handles()?;
        // SAFETY: handles are live.
        Ok(unsafe { get(ctx, ptr) })
    }

    /// `None` when PROJ cannot name the method.
    pub fn method_info(&self) -> Result<Option<MethodInfo>> {
        let get = self.object.library().entry(Capability::CoordoperationGetMethodInfo, |s| {
            s.proj_coordoperation_get_method_info
        })?;
        let (ctx, ptr) = self.object.handles()?;
        let mut name: *const c_char = ptr::null();
        let mut auth: *const c_char = ptr::null();
        let mut code: *const c_char = ptr::null();
        // SAFETY: handles are live; out-pointers reference locals and receive
        // strings owned by the operation.
        unsafe {
            if get(ctx, ptr, &mut name, &mut auth, &mut code) == 0 {
                return Ok(None);
            }
            Ok(Some(MethodInfo {
                name: c_str_to_string(name),
                auth_name: c_str_to_string(auth),
                code: c_str_to_string(code),
            }))
        }
    }

    /// Whether every grid the operation needs is available (PROJ 7.1+).
    pub fn is_instantiable(&self) -> Result<bool> {
        let get = self.object.library().entry(Capability::CoordoperationIsInstantiable, |s| {
            s.proj_coordoperation_is_instantiable
        })?;
        let (ctx, ptr) = self.object.handles()?;
        // SAFETY: handles are live.
        Ok(unsafe { get(ctx, ptr) } != 0)
    }
}

impl CoordinateOperation for Operation {
    fn native(&self) -> &NativeObject {
        &self.object
    }
}

impl Deref for Operation {
    type Target = NativeObject;

    fn deref(&self) -> &NativeObject {
        &self.object
    }
}

impl AsRef<NativeObject> for Operation {
    fn as_ref(&self) -> &NativeObject {
        &self.object
    }
}

/// An operation between two CRSs, built by `proj_create_crs_to_crs`.
#[derive(Debug)]
pub struct Transformation {
    operation: Operation,
}

impl Transformation {
    /// A transformation from an explicit pipeline or operation definition.
    pub fn new(context: &Context, definition: impl Into<Definition>) -> Result<Self> {
        Ok(Self {
            operation: Operation::new(context, definition)?,
        })
    }

    /// Let PROJ pick the operation between two CRS definitions.
    pub fn from_definitions(context: &Context, source: &str, target: &str) -> Result<Self> {
        let create = context
            .library()
            .entry(Capability::CreateCrsToCrs, |s| s.proj_create_crs_to_crs)?;
        let (c_source, c_target) = (CString::new(source)?, CString::new(target)?);
        let handle = context.raw()?;
        // SAFETY: handle is live and both strings outlive the call; no area.
        let ptr = unsafe { create(handle, c_source.as_ptr(), c_target.as_ptr(), ptr::null_mut()) };
        let object = NativeObject::from_raw(context, ptr, &format!("{source} -> {target}"))?;
        Self::from_object(object)
    }

    /// Transformation between two existing CRS objects.
    ///
    /// Uses `proj_create_crs_to_crs_from_pj` on 6.2+, otherwise falls back to
    /// the definitions reported by `proj_pj_info`.
    pub fn from_crs(context: &Context, source: &Crs, target: &Crs) -> Result<Self> {
        let library = context.library();
        if let Ok(create) =
            library.entry(Capability::CreateCrsToCrsFromPj, |s| s.proj_create_crs_to_crs_from_pj)
        {
            let handle = context.raw()?;
            let (src, dst) = (source.raw()?, target.raw()?);
            // SAFETY: all handles are live; no area, no options.
            let ptr = unsafe { create(handle, src, dst, ptr::null_mut(), ptr::null()) };
            let object = NativeObject::from_raw_with(context, ptr, || {
                let name = |crs: &Crs| crs.name().ok().flatten().unwrap_or_default();
                format!("{} -> {}", name(source), name(target))
            })?;
            return Self::from_object(object);
        }
        let source_def = source
            .definition()?
            .ok_or(ProjError::ExportFailed { format: "a PROJ definition" })?;
        let target_def = target
            .definition()?
            .ok_or(ProjError::ExportFailed { format: "a PROJ definition" })?;
        Self::from_definitions(context, &source_def, &target_def)
    }

    /// When PROJ finds several candidate operations it returns an untyped
    /// object that picks among them per coordinate, so `Unknown` passes here.
    fn from_object(object: NativeObject) -> Result<Self> {
        Ok(Self {
            operation: Operation::checked(object, true)?,
        })
    }
}

impl CoordinateOperation for Transformation {
    fn native(&self) -> &NativeObject {
        &self.operation.object
    }
}

impl Deref for Transformation {
    type Target = Operation;

    fn deref(&self) -> &Operation {
        &self.operation
    }
}

impl AsRef<NativeObject> for Transformation {
    fn as_ref(&self) -> &NativeObject {
        &self.operation.object
    }
}
