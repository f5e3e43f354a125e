//! Owned `PJ*` handles.
//!
//! [`NativeObject`] is the single owner of one native object. It releases the
//! handle exactly once: either through an explicit [`NativeObject::release`]
//! or on drop. It also holds a [`Context`] clone, which keeps the native
//! context alive for as long as the object exists. The typed wrappers
//! ([`Crs`], [`Operation`], [`Transformation`]) add a type check at
//! construction and deref to the underlying object.

pub mod crs;
pub mod operation;

pub use crs::{
    AxisInfo, CoordinateSystem, Crs, Ellipsoid, EllipsoidParameters, PrimeMeridian,
    PrimeMeridianParameters,
};
pub use operation::{CoordinateOperation, MethodInfo, Operation, Transformation};

use crate::capability::Capability;
use crate::context::Context;
use crate::error::{ErrorTranslator, ProjError, Result};
use crate::native::ffi::{Comparison, Pj, PjContext, PjType, ProjStringType, WktType};
use crate::native::{NativeLibrary, Symbols, c_str_to_string};
use serde::Serialize;
use std::ffi::{CString, c_char, c_int};
use std::fmt;
use std::ptr;

/// Input accepted by the object factories.
///
/// `Text` goes to `proj_create` untouched, so it may be an authority code,
/// a PROJ string, WKT or PROJJSON. The token forms go through
/// `proj_create_argv`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Definition {
    Text(String),
    /// Ordered `key=value` (or bare flag) tokens, with or without a leading `+`.
    Tokens(Vec<String>),
    /// Key/value pairs; `None` produces a bare flag such as `no_defs`.
    Params(Vec<(String, Option<String>)>),
}

impl Definition {
    /// Canonical token sequence: leading `+` removed, empty tokens dropped.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            Definition::Text(text) => text
                .split_whitespace()
                .map(strip_plus)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
            Definition::Tokens(tokens) => tokens
                .iter()
                .map(|token| strip_plus(token))
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
            Definition::Params(params) => params
                .iter()
                .filter(|(key, _)| !strip_plus(key).is_empty())
                .map(|(key, value)| match value {
                    Some(value) => format!("{}={value}", strip_plus(key)),
                    None => strip_plus(key).to_string(),
                })
                .collect(),
        }
    }
}

fn strip_plus(token: &str) -> &str {
    token.trim().trim_start_matches('+')
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Text(text) => f.write_str(text),
            _ => {
                let tokens = self.tokens();
                let mut first = true;
                for token in tokens {
                    if !first {
                        f.write_str(" ")?;
                    }
                    write!(f, "+{token}")?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Definition {
    fn from(value: &str) -> Self {
        Definition::Text(value.to_string())
    }
}

impl From<String> for Definition {
    fn from(value: String) -> Self {
        Definition::Text(value)
    }
}

impl From<Vec<String>> for Definition {
    fn from(value: Vec<String>) -> Self {
        Definition::Tokens(value)
    }
}

impl From<&[&str]> for Definition {
    fn from(value: &[&str]) -> Self {
        Definition::Tokens(value.iter().map(|token| token.to_string()).collect())
    }
}

impl From<Vec<(String, Option<String>)>> for Definition {
    fn from(value: Vec<(String, Option<String>)>) -> Self {
        Definition::Params(value)
    }
}

/// Geographic extent an object is valid for, in degrees.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AreaOfUse {
    pub name: Option<String>,
    pub west_lon_degree: f64,
    pub south_lat_degree: f64,
    pub east_lon_degree: f64,
    pub north_lat_degree: f64,
}

/// `proj_pj_info` summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjInfo {
    pub id: Option<String>,
    pub description: Option<String>,
    pub definition: Option<String>,
    pub has_inverse: bool,
    /// Expected accuracy in metres; negative when unknown.
    pub accuracy: f64,
}

type StringGetter = unsafe extern "C" fn(*const Pj) -> *const c_char;
type ChildGetter = unsafe extern "C" fn(*mut PjContext, *const Pj) -> *mut Pj;

/// Owning handle to one `PJ*`.
///
/// The native object is destroyed exactly once, by [`release`](Self::release)
/// or on drop. The object keeps its [`Context`] alive.
pub struct NativeObject {
    ptr: *mut Pj,
    context: Context,
}

impl NativeObject {
    /// Create an object from any [`Definition`].
    pub fn create(context: &Context, definition: &Definition) -> Result<Self> {
        let library = context.library();
        let ptr = match definition {
            Definition::Text(text) => {
                let create = library.entry(Capability::Create, |s| s.proj_create)?;
                let c_text = CString::new(text.as_str())?;
                let handle = context.raw()?;
                // SAFETY: handle is live and c_text outlives the call.
                unsafe { create(handle, c_text.as_ptr()) }
            }
            _ => {
                let create = library.entry(Capability::CreateArgv, |s| s.proj_create_argv)?;
                let tokens = definition
                    .tokens()
                    .into_iter()
                    .map(CString::new)
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                let mut argv: Vec<*mut c_char> =
                    tokens.iter().map(|token| token.as_ptr().cast_mut()).collect();
                let handle = context.raw()?;
                // SAFETY: argv points into `tokens`, which outlives the call;
                // PROJ does not write through the argument pointers.
                unsafe { create(handle, argv.len() as c_int, argv.as_mut_ptr()) }
            }
        };
        Self::from_raw(context, ptr, &definition.to_string())
    }

    /// Take ownership of a factory result.
    ///
    /// A null pointer becomes [`ProjError::InvalidDefinition`], with the
    /// message resolved before any other native call can clobber the errno.
    pub(crate) fn from_raw(context: &Context, ptr: *mut Pj, definition: &str) -> Result<Self> {
        Self::from_raw_with(context, ptr, || definition.to_string())
    }

    /// Like [`from_raw`](Self::from_raw), but the definition label is only
    /// built once the errno and its message have been read. `label` may make
    /// native calls of its own.
    pub(crate) fn from_raw_with(
        context: &Context,
        ptr: *mut Pj,
        label: impl FnOnce() -> String,
    ) -> Result<Self> {
        if ptr.is_null() {
            let code = context.error_code()?;
            let message = ErrorTranslator::message(context, code);
            return Err(ProjError::InvalidDefinition {
                definition: label(),
                code,
                message,
            });
        }
        Ok(Self {
            ptr,
            context: context.clone(),
        })
    }

    /// Take ownership of a derived object; null means "not present".
    pub(crate) fn from_optional(context: &Context, ptr: *mut Pj) -> Option<Self> {
        (!ptr.is_null()).then(|| Self {
            ptr,
            context: context.clone(),
        })
    }

    /// Context the object was created on.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub(crate) fn library(&self) -> &NativeLibrary {
        self.context.library()
    }

    /// The live `PJ*`, checked against both object and context release.
    pub fn raw(&self) -> Result<*mut Pj> {
        if self.ptr.is_null() {
            return Err(ProjError::ObjectReleased);
        }
        self.context.raw()?;
        Ok(self.ptr)
    }

    pub(crate) fn handles(&self) -> Result<(*mut PjContext, *mut Pj)> {
        let ptr = self.raw()?;
        Ok((self.context.raw()?, ptr))
    }

    /// True after [`release`](Self::release).
    pub fn is_released(&self) -> bool {
        self.ptr.is_null()
    }

    /// Destroy the native object now. Later calls are no-ops; later use fails
    /// with [`ProjError::ObjectReleased`].
    pub fn release(&mut self) {
        let ptr = std::mem::replace(&mut self.ptr, ptr::null_mut());
        if ptr.is_null() {
            return;
        }
        if let Ok(destroy) = self.library().entry(Capability::Destroy, |s| s.proj_destroy) {
            // SAFETY: ptr came from a PROJ factory and was just swapped out,
            // so it is destroyed exactly once.
            unsafe { destroy(ptr) };
        }
    }

    /// Independent copy (`proj_clone`) bound to the same context.
    pub fn try_clone(&self) -> Result<NativeObject> {
        let clone = self.library().entry(Capability::Clone, |s| s.proj_clone)?;
        let (ctx, ptr) = self.handles()?;
        // SAFETY: both handles are live.
        let copy = unsafe { clone(ctx, ptr) };
        Self::from_raw(&self.context, copy, "proj_clone")
    }

    pub(crate) fn string_property(
        &self,
        capability: Capability,
        select: impl FnOnce(&Symbols) -> Option<StringGetter>,
    ) -> Result<Option<String>> {
        let getter = self.library().entry(capability, select)?;
        let ptr = self.raw()?;
        // SAFETY: ptr is live; the string belongs to the object.
        Ok(unsafe { c_str_to_string(getter(ptr)) })
    }

    pub(crate) fn child(
        &self,
        capability: Capability,
        select: impl FnOnce(&Symbols) -> Option<ChildGetter>,
    ) -> Result<Option<NativeObject>> {
        let getter = self.library().entry(capability, select)?;
        let (ctx, ptr) = self.handles()?;
        // SAFETY: both handles are live; the result is a new owned object.
        let child = unsafe { getter(ctx, ptr) };
        Ok(Self::from_optional(&self.context, child))
    }

    /// `proj_get_type` (PROJ 6.0+).
    pub fn object_type(&self) -> Result<PjType> {
        let get_type = self.library().entry(Capability::GetType, |s| s.proj_get_type)?;
        let ptr = self.raw()?;
        // SAFETY: ptr is live.
        Ok(PjType::from_raw(unsafe { get_type(ptr) }))
    }

    pub fn is_crs(&self) -> Result<bool> {
        let is_crs = self.library().entry(Capability::IsCrs, |s| s.proj_is_crs)?;
        let ptr = self.raw()?;
        // SAFETY: ptr is live.
        Ok(unsafe { is_crs(ptr) } != 0)
    }

    /// Object name, e.g. `WGS 84`.
    pub fn name(&self) -> Result<Option<String>> {
        self.string_property(Capability::GetName, |s| s.proj_get_name)
    }

    /// Authority of identifier `index`, e.g. `EPSG`.
    pub fn auth_name(&self, index: usize) -> Result<Option<String>> {
        let getter = self
            .library()
            .entry(Capability::GetIdAuthName, |s| s.proj_get_id_auth_name)?;
        let ptr = self.raw()?;
        // SAFETY: ptr is live; out-of-range indexes return null.
        Ok(unsafe { c_str_to_string(getter(ptr, index_arg(index))) })
    }

    pub fn auth_code(&self, index: usize) -> Result<Option<String>> {
        let getter = self.library().entry(Capability::GetIdCode, |s| s.proj_get_id_code)?;
        let ptr = self.raw()?;
        // SAFETY: as above.
        Ok(unsafe { c_str_to_string(getter(ptr, index_arg(index))) })
    }

    /// `AUTHORITY:CODE` for the identifier at `index`, e.g. `EPSG:4326`.
    pub fn auth(&self, index: usize) -> Result<Option<String>> {
        Ok(match (self.auth_name(index)?, self.auth_code(index)?) {
            (Some(name), Some(code)) => Some(format!("{name}:{code}")),
            _ => None,
        })
    }

    pub fn info(&self) -> Result<ProjInfo> {
        let pj_info = self.library().entry(Capability::PjInfo, |s| s.proj_pj_info)?;
        let ptr = self.raw()?;
        // SAFETY: ptr is live; the strings belong to the object.
        unsafe {
            let info = pj_info(ptr);
            Ok(ProjInfo {
                id: c_str_to_string(info.id),
                description: c_str_to_string(info.description),
                definition: c_str_to_string(info.definition),
                has_inverse: info.has_inverse != 0,
                accuracy: info.accuracy,
            })
        }
    }

    pub fn description(&self) -> Result<Option<String>> {
        Ok(self.info()?.description)
    }

    pub fn definition(&self) -> Result<Option<String>> {
        Ok(self.info()?.definition)
    }

    pub fn has_inverse(&self) -> Result<bool> {
        Ok(self.info()?.has_inverse)
    }

    pub fn accuracy(&self) -> Result<f64> {
        Ok(self.info()?.accuracy)
    }

    pub fn remarks(&self) -> Result<Option<String>> {
        self.string_property(Capability::GetRemarks, |s| s.proj_get_remarks)
    }

    pub fn scope(&self) -> Result<Option<String>> {
        self.string_property(Capability::GetScope, |s| s.proj_get_scope)
    }

    pub fn is_deprecated(&self) -> Result<bool> {
        let deprecated = self
            .library()
            .entry(Capability::IsDeprecated, |s| s.proj_is_deprecated)?;
        let ptr = self.raw()?;
        // SAFETY: ptr is live.
        Ok(unsafe { deprecated(ptr) } != 0)
    }

    /// Compare two objects under `criterion`.
    pub fn is_equivalent_to(&self, other: &NativeObject, criterion: Comparison) -> Result<bool> {
        let equivalent = self
            .library()
            .entry(Capability::IsEquivalentTo, |s| s.proj_is_equivalent_to)?;
        let (ptr, other) = (self.raw()?, other.raw()?);
        // SAFETY: both objects are live.
        Ok(unsafe { equivalent(ptr, other, criterion.as_raw()) } != 0)
    }

    pub fn area_of_use(&self) -> Result<Option<AreaOfUse>> {
        let get_area = self
            .library()
            .entry(Capability::GetAreaOfUse, |s| s.proj_get_area_of_use)?;
        let (ctx, ptr) = self.handles()?;
        let (mut west, mut south, mut east, mut north) = (0.0, 0.0, 0.0, 0.0);
        let mut name: *const c_char = ptr::null();
        // SAFETY: all out-pointers reference locals.
        let found = unsafe {
            get_area(ctx, ptr, &mut west, &mut south, &mut east, &mut north, &mut name)
        };
        if found == 0 {
            return Ok(None);
        }
        Ok(Some(AreaOfUse {
            // SAFETY: name is null or owned by the object.
            name: unsafe { c_str_to_string(name) },
            west_lon_degree: west,
            south_lat_degree: south,
            east_lon_degree: east,
            north_lat_degree: north,
        }))
    }

    /// Export as WKT; objects PROJ cannot express fail with
    /// [`ProjError::ExportFailed`].
    pub fn to_wkt(&self, kind: WktType) -> Result<String> {
        let as_wkt = self.library().entry(Capability::AsWkt, |s| s.proj_as_wkt)?;
        let (ctx, ptr) = self.handles()?;
        // SAFETY: handles are live; no options.
        let text = unsafe { c_str_to_string(as_wkt(ctx, ptr, kind.as_raw(), ptr::null())) };
        self.exported(text, "WKT")
    }

    pub fn to_proj_string(&self, kind: ProjStringType) -> Result<String> {
        let as_proj = self
            .library()
            .entry(Capability::AsProjString, |s| s.proj_as_proj_string)?;
        let (ctx, ptr) = self.handles()?;
        // SAFETY: handles are live; no options.
        let text = unsafe { c_str_to_string(as_proj(ctx, ptr, kind.as_raw(), ptr::null())) };
        self.exported(text, "a PROJ string")
    }

    /// PROJJSON text (PROJ 6.2+).
    pub fn to_json(&self) -> Result<String> {
        let as_json = self.library().entry(Capability::AsProjjson, |s| s.proj_as_projjson)?;
        let (ctx, ptr) = self.handles()?;
        // SAFETY: handles are live; no options.
        let text = unsafe { c_str_to_string(as_json(ctx, ptr, ptr::null())) };
        self.exported(text, "PROJJSON")
    }

    fn exported(&self, text: Option<String>, format: &'static str) -> Result<String> {
        match text {
            Some(text) => Ok(text),
            None => {
                self.context.check(None)?;
                Err(ProjError::ExportFailed { format })
            }
        }
    }
}

fn index_arg(index: usize) -> c_int {
    c_int::try_from(index).unwrap_or(c_int::MAX)
}

impl Drop for NativeObject {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for NativeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeObject")
            .field("ptr", &self.ptr)
            .field("context", &self.context)
            .finish()
    }
}
