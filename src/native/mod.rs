//! Runtime binding to libproj.
//!
//! The shared library is opened with `dlopen` and every entry point this crate
//! knows about is looked up individually with `dlsym`. Symbols missing from
//! older releases simply stay `None` in [`Symbols`]; nothing here assumes a
//! particular API generation. Which symbols may actually be called is decided
//! by the [`CapabilityRegistry`] built right after loading.

pub mod ffi;
#[cfg(test)]
pub(crate) mod stub;

use crate::capability::{Capability, CapabilityRegistry};
use crate::error::{ProjError, Result};
use ffi::{Pj, PjArea, PjContext, PjCoord, PjInfo, PjLogFunction, PjProjInfo};
use std::env;
use std::ffi::{CStr, c_char, c_double, c_int, c_void};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Environment variable naming an explicit libproj to open.
pub const LIBRARY_ENV: &str = "PROJSHIM_LIBRARY";

// Newest soname first so a machine with several PROJ generations installed
// gets the most capable one.
const LIBRARY_CANDIDATES: &[&str] = &[
    "libproj.so",
    "libproj.so.25",
    "libproj.so.22",
    "libproj.so.19",
    "libproj.so.15",
    "libproj.so.13",
    "libproj.so.12",
    "libproj.dylib",
    "/opt/homebrew/lib/libproj.dylib",
    "/usr/local/lib/libproj.dylib",
    "/opt/local/lib/proj9/lib/libproj.dylib",
    "/opt/local/lib/proj6/lib/libproj.dylib",
    "/opt/local/lib/proj5/lib/libproj.dylib",
];

macro_rules! symbol_table {
    ($($name:ident: fn($($arg:ty),*) $(-> $ret:ty)?;)*) => {
        /// Function pointers resolved from libproj, one per known entry point.
        ///
        /// A field is `None` when the loaded library does not export the
        /// symbol. Callers never read fields directly; they go through
        /// [`NativeLibrary::entry`] so the capability check always runs first.
        #[derive(Clone, Copy, Default)]
        pub struct Symbols {
            $(pub $name: Option<unsafe extern "C" fn($($arg),*) $(-> $ret)?>,)*
        }

        impl Symbols {
            /// Names of every symbol the table can hold.
            pub const NAMES: &'static [&'static str] = &[$(stringify!($name)),*];

            #[cfg(unix)]
            unsafe fn resolve(handle: *mut c_void) -> Self {
                Self {
                    $($name: unsafe { lookup(handle, concat!(stringify!($name), "\0")) },)*
                }
            }

            /// Whether the symbol named `name` was resolved.
            pub fn has(&self, name: &str) -> bool {
                match name {
                    $(stringify!($name) => self.$name.is_some(),)*
                    _ => false,
                }
            }
        }
    };
}

symbol_table! {
    pj_get_release: fn() -> *const c_char;
    pj_strerrno: fn(c_int) -> *const c_char;
    proj_info: fn() -> PjInfo;
    proj_pj_info: fn(*mut Pj) -> PjProjInfo;
    proj_context_create: fn() -> *mut PjContext;
    proj_context_destroy: fn(*mut PjContext) -> *mut PjContext;
    proj_context_errno: fn(*mut PjContext) -> c_int;
    proj_errno: fn(*const Pj) -> c_int;
    proj_errno_reset: fn(*const Pj) -> c_int;
    proj_create: fn(*mut PjContext, *const c_char) -> *mut Pj;
    proj_create_argv: fn(*mut PjContext, c_int, *mut *mut c_char) -> *mut Pj;
    proj_create_crs_to_crs: fn(*mut PjContext, *const c_char, *const c_char, *mut PjArea) -> *mut Pj;
    proj_destroy: fn(*mut Pj) -> *mut Pj;
    proj_trans: fn(*mut Pj, c_int, PjCoord) -> PjCoord;
    proj_errno_string: fn(c_int) -> *const c_char;
    proj_log_level: fn(*mut PjContext, c_int) -> c_int;
    proj_log_func: fn(*mut PjContext, *mut c_void, Option<PjLogFunction>);
    proj_clone: fn(*mut PjContext, *const Pj) -> *mut Pj;
    proj_get_name: fn(*const Pj) -> *const c_char;
    proj_get_id_auth_name: fn(*const Pj, c_int) -> *const c_char;
    proj_get_id_code: fn(*const Pj, c_int) -> *const c_char;
    proj_get_remarks: fn(*const Pj) -> *const c_char;
    proj_get_scope: fn(*const Pj) -> *const c_char;
    proj_get_type: fn(*const Pj) -> c_int;
    proj_is_crs: fn(*const Pj) -> c_int;
    proj_is_equivalent_to: fn(*const Pj, *const Pj, c_int) -> c_int;
    proj_is_deprecated: fn(*const Pj) -> c_int;
    proj_get_area_of_use: fn(*mut PjContext, *const Pj, *mut c_double, *mut c_double, *mut c_double, *mut c_double, *mut *const c_char) -> c_int;
    proj_as_wkt: fn(*mut PjContext, *const Pj, c_int, *const *const c_char) -> *const c_char;
    proj_as_proj_string: fn(*mut PjContext, *const Pj, c_int, *const *const c_char) -> *const c_char;
    proj_context_set_database_path: fn(*mut PjContext, *const c_char, *const *const c_char, *const *const c_char) -> c_int;
    proj_context_get_database_path: fn(*mut PjContext) -> *const c_char;
    proj_context_use_proj4_init_rules: fn(*mut PjContext, c_int);
    proj_context_get_use_proj4_init_rules: fn(*mut PjContext, c_int) -> c_int;
    proj_crs_get_geodetic_crs: fn(*mut PjContext, *const Pj) -> *mut Pj;
    proj_crs_get_horizontal_datum: fn(*mut PjContext, *const Pj) -> *mut Pj;
    proj_crs_get_sub_crs: fn(*mut PjContext, *const Pj, c_int) -> *mut Pj;
    proj_crs_get_datum: fn(*mut PjContext, *const Pj) -> *mut Pj;
    proj_crs_get_coordinate_system: fn(*mut PjContext, *const Pj) -> *mut Pj;
    proj_cs_get_type: fn(*mut PjContext, *const Pj) -> c_int;
    proj_cs_get_axis_count: fn(*mut PjContext, *const Pj) -> c_int;
    proj_cs_get_axis_info: fn(*mut PjContext, *const Pj, c_int, *mut *const c_char, *mut *const c_char, *mut *const c_char, *mut c_double, *mut *const c_char, *mut *const c_char, *mut *const c_char) -> c_int;
    proj_crs_get_coordoperation: fn(*mut PjContext, *const Pj) -> *mut Pj;
    proj_coordoperation_get_accuracy: fn(*mut PjContext, *const Pj) -> c_double;
    proj_coordoperation_get_method_info: fn(*mut PjContext, *const Pj, *mut *const c_char, *mut *const c_char, *mut *const c_char) -> c_int;
    proj_get_ellipsoid: fn(*mut PjContext, *const Pj) -> *mut Pj;
    proj_ellipsoid_get_parameters: fn(*mut PjContext, *const Pj, *mut c_double, *mut c_double, *mut c_int, *mut c_double) -> c_int;
    proj_get_prime_meridian: fn(*mut PjContext, *const Pj) -> *mut Pj;
    proj_prime_meridian_get_parameters: fn(*mut PjContext, *const Pj, *mut c_double, *mut c_double, *mut *const c_char) -> c_int;
    proj_as_projjson: fn(*mut PjContext, *const Pj, *const *const c_char) -> *const c_char;
    proj_create_crs_to_crs_from_pj: fn(*mut PjContext, *const Pj, *const Pj, *mut PjArea, *const *const c_char) -> *mut Pj;
    proj_cleanup: fn();
    proj_coordoperation_is_instantiable: fn(*mut PjContext, *const Pj) -> c_int;
    proj_context_errno_string: fn(*mut PjContext, c_int) -> *const c_char;
}

impl fmt::Debug for Symbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved = Self::NAMES.iter().filter(|name| self.has(name)).count();
        f.debug_struct("Symbols")
            .field("resolved", &resolved)
            .field("known", &Self::NAMES.len())
            .finish()
    }
}

#[cfg(unix)]
unsafe fn lookup<F: Copy>(handle: *mut c_void, name: &str) -> Option<F> {
    debug_assert_eq!(std::mem::size_of::<F>(), std::mem::size_of::<*mut c_void>());
    // SAFETY: `name` is NUL-terminated by the macro and `handle` came from dlopen.
    let ptr = unsafe { libc::dlsym(handle, name.as_ptr().cast()) };
    if ptr.is_null() {
        None
    } else {
        // SAFETY: F is a function pointer type whose signature matches proj.h.
        Some(unsafe { std::mem::transmute_copy::<*mut c_void, F>(&ptr) })
    }
}

/// A loaded libproj: its symbol table plus the capabilities probed from it.
pub struct NativeLibrary {
    handle: *mut c_void,
    path: Option<String>,
    symbols: Symbols,
    capabilities: CapabilityRegistry,
}

// SAFETY: the dlopen handle and function pointers are process-global and
// immutable after loading; per-call thread affinity is enforced by Context.
unsafe impl Send for NativeLibrary {}
unsafe impl Sync for NativeLibrary {}

static GLOBAL: OnceLock<Arc<NativeLibrary>> = OnceLock::new();

impl NativeLibrary {
    /// The process-wide library, loaded on first use.
    ///
    /// A failed load is not cached, so fixing the environment and retrying
    /// works within the same process.
    pub fn global() -> Result<Arc<NativeLibrary>> {
        if let Some(library) = GLOBAL.get() {
            return Ok(library.clone());
        }
        let library = Self::load()?;
        Ok(GLOBAL.get_or_init(|| library).clone())
    }

    /// Open the first libproj found in the candidate list.
    ///
    /// Search order: `PROJSHIM_LIBRARY`, the build-time
    /// `PROJSHIM_LIBRARY_HINT`, then well-known sonames and install paths.
    pub fn load() -> Result<Arc<NativeLibrary>> {
        let candidates = library_candidates();
        for candidate in &candidates {
            if let Some(library) = Self::try_open(candidate) {
                return Ok(library);
            }
        }
        Err(ProjError::LibraryNotFound {
            searched: candidates,
        })
    }

    /// Open libproj from an explicit path or soname.
    pub fn open(path: &str) -> Result<Arc<NativeLibrary>> {
        Self::try_open(path).ok_or_else(|| ProjError::LibraryNotFound {
            searched: vec![path.to_string()],
        })
    }

    #[cfg(unix)]
    fn try_open(path: &str) -> Option<Arc<NativeLibrary>> {
        let c_path = std::ffi::CString::new(path).ok()?;
        // SAFETY: c_path is a valid C string; flags are standard.
        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        if handle.is_null() {
            return None;
        }
        // SAFETY: handle is a live dlopen handle.
        let symbols = unsafe { Symbols::resolve(handle) };
        let capabilities = CapabilityRegistry::probe(&symbols);
        debug!(
            library = path,
            version = %capabilities.version(),
            source = ?capabilities.source(),
            "loaded libproj"
        );
        Some(Arc::new(NativeLibrary {
            handle,
            path: Some(path.to_string()),
            symbols,
            capabilities,
        }))
    }

    #[cfg(not(unix))]
    fn try_open(_path: &str) -> Option<Arc<NativeLibrary>> {
        None
    }

    /// Wrap an already-populated symbol table, e.g. from a statically linked
    /// PROJ.
    ///
    /// When `capabilities` is `None` the registry is probed from `symbols`.
    ///
    /// # Safety
    ///
    /// Every `Some` entry must point to a function with the matching `proj.h`
    /// signature and semantics.
    pub unsafe fn from_symbols(
        symbols: Symbols,
        capabilities: Option<CapabilityRegistry>,
    ) -> Arc<NativeLibrary> {
        let capabilities = capabilities.unwrap_or_else(|| CapabilityRegistry::probe(&symbols));
        Arc::new(NativeLibrary {
            handle: std::ptr::null_mut(),
            path: None,
            symbols,
            capabilities,
        })
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    /// Path or soname the library was opened from.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Resolve a version-gated entry point.
    ///
    /// Fails with `CapabilityUnsupported` before touching native code when the
    /// registry says `capability` is unavailable or the symbol is missing.
    pub(crate) fn entry<F: Copy>(
        &self,
        capability: Capability,
        select: impl FnOnce(&Symbols) -> Option<F>,
    ) -> Result<F> {
        self.capabilities.require(capability)?;
        select(&self.symbols).ok_or_else(|| {
            ProjError::capability_unsupported(capability, self.capabilities.version())
        })
    }

    /// Release global state held by libproj (`proj_cleanup`, 6.2+).
    pub fn cleanup(&self) -> Result<()> {
        let cleanup = self.entry(Capability::Cleanup, |s| s.proj_cleanup)?;
        // SAFETY: proj_cleanup takes no arguments and is safe at shutdown.
        unsafe { cleanup() };
        debug!("released libproj global state");
        Ok(())
    }
}

impl fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("path", &self.path)
            .field("version", &self.capabilities.version())
            .field("symbols", &self.symbols)
            .finish()
    }
}

impl Drop for NativeLibrary {
    fn drop(&mut self) {
        #[cfg(unix)]
        if !self.handle.is_null() {
            // SAFETY: handle came from dlopen and is closed exactly once here.
            unsafe { libc::dlclose(self.handle) };
        }
    }
}

/// Candidate libraries in search order.
pub fn library_candidates() -> Vec<String> {
    let mut candidates = Vec::new();
    if let Ok(explicit) = env::var(LIBRARY_ENV) {
        if !explicit.trim().is_empty() {
            candidates.push(explicit);
        }
    }
    if let Some(hint) = option_env!("PROJSHIM_LIBRARY_HINT") {
        candidates.push(hint.to_string());
    }
    candidates.extend(LIBRARY_CANDIDATES.iter().map(|name| name.to_string()));
    candidates
}

/// Copy a borrowed C string returned by libproj.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid for
/// the duration of the call.
pub(crate) unsafe fn c_str_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: upheld by the caller.
    let text = unsafe { CStr::from_ptr(ptr) };
    Some(text.to_string_lossy().into_owned())
}
