//! Native PROJ contexts.
//!
//! A [`Context`] owns one `PJ_CONTEXT*`. It is a cheap reference-counted
//! handle: every object created through it keeps a clone, so the native
//! context is only destroyed after the last dependent object has been
//! released. Contexts are deliberately `!Send`; PROJ contexts must not be used
//! from two threads at once, and each thread gets its own through
//! [`current_for_thread`].
//!
//! A log sink that needs to reach back into its context should capture a
//! [`WeakContext`]; a captured [`Context`] keeps itself alive through the sink.

use crate::capability::{Capability, CapabilityRegistry};
use crate::config::DataSearch;
use crate::error::{ErrorTranslator, ProjError, Result};
use crate::native::ffi::{LogLevel, PjContext};
use crate::native::{NativeLibrary, c_str_to_string};
use std::cell::{Cell, RefCell};
use std::ffi::{CString, c_char, c_int, c_void};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::ptr;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tracing::debug;

/// Receives PROJ's own diagnostic messages.
pub type LogSink = dyn Fn(LogLevel, &str);

/// Shared handle to one native `PJ_CONTEXT`.
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

/// Non-owning handle to a [`Context`].
#[derive(Clone)]
pub struct WeakContext {
    inner: Weak<ContextInner>,
}

struct ContextInner {
    library: Arc<NativeLibrary>,
    handle: Cell<*mut PjContext>,
    closed: Cell<bool>,
    database_path: RefCell<Option<PathBuf>>,
    // Boxed so the app_data pointer PROJ holds stays put for the context's life.
    log_slot: Box<LogSlot>,
}

/// The installed sink. `forward_log` clones the `Rc` out before calling it,
/// so a sink may replace itself or destroy the context while running.
#[derive(Default)]
struct LogSlot {
    sink: RefCell<Option<Rc<LogSink>>>,
}

impl Context {
    /// Create a fresh native context on `library`.
    ///
    /// A null result from `proj_context_create` means the native allocator
    /// failed; it surfaces as [`ProjError::ContextAllocation`] and there is
    /// nothing useful to retry.
    pub fn new(library: &Arc<NativeLibrary>) -> Result<Self> {
        let create = library.entry(Capability::ContextCreate, |s| s.proj_context_create)?;
        // SAFETY: proj_context_create has no preconditions.
        let handle = unsafe { create() };
        if handle.is_null() {
            return Err(ProjError::ContextAllocation);
        }
        debug!(context = ?handle, "created PROJ context");
        Ok(Self {
            inner: Rc::new(ContextInner {
                library: library.clone(),
                handle: Cell::new(handle),
                closed: Cell::new(false),
                database_path: RefCell::new(None),
                log_slot: Box::default(),
            }),
        })
    }

    /// Context on the process-wide library.
    pub fn with_global_library() -> Result<Self> {
        Self::new(&NativeLibrary::global()?)
    }

    /// The library this context was created on.
    pub fn library(&self) -> &Arc<NativeLibrary> {
        &self.inner.library
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        self.inner.library.capabilities()
    }

    /// True once [`destroy`](Self::destroy) has been called, even while
    /// destruction is still deferred.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    /// A handle that does not keep the context alive. Log sinks should hold
    /// this rather than a [`Context`] clone.
    pub fn downgrade(&self) -> WeakContext {
        WeakContext {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// The live native handle, or [`ProjError::ContextReleased`] once
    /// [`destroy`](Self::destroy) has run.
    pub fn raw(&self) -> Result<*mut PjContext> {
        let handle = self.inner.handle.get();
        if self.is_closed() || handle.is_null() {
            return Err(ProjError::ContextReleased);
        }
        Ok(handle)
    }

    /// Close the context.
    ///
    /// The native handle is destroyed right away when nothing else holds this
    /// context; otherwise destruction waits for the last object or clone to
    /// drop. Either way no further operation can be issued through it.
    /// Calling this more than once is a no-op.
    pub fn destroy(&self) {
        if self.inner.closed.replace(true) {
            return;
        }
        if Rc::strong_count(&self.inner) == 1 {
            self.inner.release();
        } else {
            debug!(
                holders = Rc::strong_count(&self.inner),
                "deferring PROJ context destroy until dependents drop"
            );
        }
    }

    /// Current errno of the native context.
    pub fn error_code(&self) -> Result<i32> {
        let errno = self
            .library()
            .entry(Capability::ContextErrno, |s| s.proj_context_errno)?;
        let handle = self.raw()?;
        // SAFETY: handle is live while self is open.
        Ok(unsafe { errno(handle) })
    }

    /// Fail with [`ProjError::Native`] when `code` (or the context errno)
    /// is non-zero.
    pub fn check(&self, code: Option<i32>) -> Result<()> {
        ErrorTranslator::check(self, code)
    }

    /// Path of the `proj.db` this context reads.
    ///
    /// Asks PROJ first. When PROJ has none configured, the first database found
    /// by [`DataSearch::from_env`] is installed into the context. The result is
    /// cached for the lifetime of the context.
    pub fn resolve_database_path(&self) -> Result<PathBuf> {
        self.resolve_database_path_with(&DataSearch::from_env())
    }

    pub(crate) fn resolve_database_path_with(&self, search: &DataSearch) -> Result<PathBuf> {
        if let Some(path) = self.inner.database_path.borrow().as_ref() {
            return Ok(path.clone());
        }
        let get = self.library().entry(Capability::ContextGetDatabasePath, |s| {
            s.proj_context_get_database_path
        })?;
        let handle = self.raw()?;
        // SAFETY: handle is live; the returned string is owned by the context.
        let reported = unsafe { c_str_to_string(get(handle)) }.filter(|path| !path.is_empty());
        let path = match reported {
            Some(path) => PathBuf::from(path),
            None => {
                let path = search.database_path()?;
                self.set_database_path(&path)?;
                path
            }
        };
        debug!(path = %path.display(), "resolved proj.db");
        *self.inner.database_path.borrow_mut() = Some(path.clone());
        Ok(path)
    }

    /// Point the context at a specific `proj.db`.
    pub fn set_database_path(&self, path: &Path) -> Result<()> {
        let set = self.library().entry(Capability::ContextSetDatabasePath, |s| {
            s.proj_context_set_database_path
        })?;
        let handle = self.raw()?;
        let c_path = CString::new(path.to_string_lossy().into_owned())?;
        // SAFETY: handle is live and c_path outlives the call.
        let ok = unsafe { set(handle, c_path.as_ptr(), ptr::null(), ptr::null()) };
        if ok != 1 {
            self.check(None)?;
            return Err(ProjError::DatabaseNotFound {
                searched: vec![path.to_path_buf()],
            });
        }
        *self.inner.database_path.borrow_mut() = Some(path.to_path_buf());
        Ok(())
    }

    /// PROJ's current logging threshold for this context.
    pub fn log_level(&self) -> Result<LogLevel> {
        let level = self.library().entry(Capability::LogLevel, |s| s.proj_log_level)?;
        let handle = self.raw()?;
        // SAFETY: PJ_LOG_TELL only queries.
        Ok(LogLevel::from_raw(unsafe { level(handle, LogLevel::TELL) }))
    }

    /// Messages above `new_level` are not passed to the log sink.
    pub fn set_log_level(&self, new_level: LogLevel) -> Result<()> {
        let level = self.library().entry(Capability::LogLevel, |s| s.proj_log_level)?;
        let handle = self.raw()?;
        // SAFETY: handle is live.
        unsafe { level(handle, new_level.as_raw()) };
        Ok(())
    }

    /// Route PROJ's diagnostics for this context to `sink`.
    ///
    /// The sink replaces any previous one, and may itself call back into the
    /// context (through a [`WeakContext`]) to replace the sink or destroy the
    /// context. A panic inside it is caught and discarded before control
    /// returns to PROJ.
    pub fn set_log_sink<F>(&self, sink: F) -> Result<()>
    where
        F: Fn(LogLevel, &str) + 'static,
    {
        let install = self.library().entry(Capability::LogFunc, |s| s.proj_log_func)?;
        let handle = self.raw()?;
        let slot: &LogSlot = &self.inner.log_slot;
        let app_data = (slot as *const LogSlot).cast_mut().cast::<c_void>();
        let sink: Rc<LogSink> = Rc::new(sink);
        self.inner.log_slot.sink.replace(Some(sink));
        // SAFETY: the slot is owned by the context and outlives the native
        // handle, which is destroyed first in release().
        unsafe { install(handle, app_data, Some(forward_log)) };
        Ok(())
    }

    /// Re-emit PROJ diagnostics as `tracing` events under the `proj` target.
    pub fn forward_logs_to_tracing(&self) -> Result<()> {
        self.set_log_sink(|level, message| match level {
            LogLevel::None => {}
            LogLevel::Error => tracing::error!(target: "proj", "{message}"),
            LogLevel::Debug => tracing::debug!(target: "proj", "{message}"),
            LogLevel::Trace => tracing::trace!(target: "proj", "{message}"),
        })
    }

    /// Whether `+init=epsg:XXXX` strings are interpreted with PROJ 4 semantics.
    pub fn use_proj4_init_rules(&self) -> Result<bool> {
        let get = self.library().entry(Capability::ContextGetUseProj4InitRules, |s| {
            s.proj_context_get_use_proj4_init_rules
        })?;
        let handle = self.raw()?;
        // SAFETY: handle is live.
        Ok(unsafe { get(handle, 0) } != 0)
    }

    /// Switch the `+init=` interpretation; see
    /// [`use_proj4_init_rules`](Self::use_proj4_init_rules).
    pub fn set_use_proj4_init_rules(&self, enabled: bool) -> Result<()> {
        let set = self.library().entry(Capability::ContextUseProj4InitRules, |s| {
            s.proj_context_use_proj4_init_rules
        })?;
        let handle = self.raw()?;
        // SAFETY: handle is live.
        unsafe { set(handle, c_int::from(enabled)) };
        Ok(())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("handle", &self.inner.handle.get())
            .field("closed", &self.is_closed())
            .field("holders", &Rc::strong_count(&self.inner))
            .finish()
    }
}

impl WeakContext {
    /// The context, unless every strong handle has gone.
    pub fn upgrade(&self) -> Option<Context> {
        self.inner.upgrade().map(|inner| Context { inner })
    }
}

impl fmt::Debug for WeakContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakContext")
            .field("holders", &self.inner.strong_count())
            .finish()
    }
}

impl ContextInner {
    /// Destroy the native handle. Safe to call any number of times.
    fn release(&self) {
        let handle = self.handle.replace(ptr::null_mut());
        if handle.is_null() {
            return;
        }
        if let Ok(destroy) = self
            .library
            .entry(Capability::ContextDestroy, |s| s.proj_context_destroy)
        {
            // SAFETY: handle was created by proj_context_create and is
            // destroyed exactly once because it was just swapped out.
            unsafe { destroy(handle) };
        }
        self.log_slot.sink.borrow_mut().take();
        debug!(context = ?handle, "destroyed PROJ context");
    }
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        self.release();
    }
}

unsafe extern "C" fn forward_log(app_data: *mut c_void, level: c_int, message: *const c_char) {
    if app_data.is_null() {
        return;
    }
    // SAFETY: app_data is the LogSlot installed by set_log_sink, alive for as
    // long as PROJ can still call back on that context.
    let slot = unsafe { &*app_data.cast::<LogSlot>() };
    let Some(sink) = slot.sink.borrow().clone() else {
        return;
    };
    // SAFETY: PROJ passes a NUL-terminated message valid for this call.
    let text = unsafe { c_str_to_string(message) }.unwrap_or_default();
    let _ = catch_unwind(AssertUnwindSafe(|| sink(LogLevel::from_raw(level), &text)));
}

thread_local! {
    static THREAD_CONTEXT: RefCell<Option<Context>> = const { RefCell::new(None) };
}

/// This thread's context, created on first use against the global library.
///
/// A context that was destroyed through [`Context::destroy`] is replaced with
/// a fresh one.
pub fn current_for_thread() -> Result<Context> {
    THREAD_CONTEXT.with(|slot| {
        let existing = slot
            .borrow()
            .as_ref()
            .filter(|context| !context.is_closed())
            .cloned();
        if let Some(context) = existing {
            return Ok(context);
        }
        let context = Context::with_global_library()?;
        *slot.borrow_mut() = Some(context.clone());
        Ok(context)
    })
}

/// Make `context` this thread's context, returning the one it replaces.
pub fn install_for_thread(context: Context) -> Option<Context> {
    THREAD_CONTEXT.with(|slot| slot.borrow_mut().replace(context))
}

/// Drop and destroy this thread's context, if any.
pub fn teardown_for_thread() {
    let previous = THREAD_CONTEXT.with(|slot| slot.borrow_mut().take());
    if let Some(context) = previous {
        context.destroy();
    }
}
