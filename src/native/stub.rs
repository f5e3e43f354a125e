//! In-process fake libproj for unit tests.
//!
//! Every entry point records its call in a thread-local counter so tests can
//! assert exact native call counts (destroy exactly once, no call at all when a
//! capability is refused). Objects are heap records whose behaviour is keyed on
//! the definition text: `EPSG:4326` and friends are geographic CRSs,
//! `EPSG:3857` and `PROJCRS[...]` are projected, anything carrying
//! `proj=merc`/`proj=pipeline` without `type=crs` is a conversion, and
//! definitions starting with `invalid` fail.

use super::ffi::{Pj, PjArea, PjContext, PjCoord, PjInfo, PjLogFunction, PjProjInfo};
use super::{NativeLibrary, Symbols};
use crate::capability::{CapabilityRegistry, Version};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::{CStr, CString, c_char, c_double, c_int, c_void};
use std::ptr;
use std::sync::Arc;

const TYPE_UNKNOWN: c_int = 0;
const TYPE_ELLIPSOID: c_int = 1;
const TYPE_PRIME_MERIDIAN: c_int = 2;
const TYPE_GEODETIC_REFERENCE_FRAME: c_int = 3;
const TYPE_GEOGRAPHIC_2D_CRS: c_int = 12;
const TYPE_PROJECTED_CRS: c_int = 15;
const TYPE_CONVERSION: c_int = 21;
const TYPE_TRANSFORMATION: c_int = 22;

pub(crate) const ERR_WRONG_SYNTAX: c_int = 1025;
pub(crate) const ERR_INVALID_COORD: c_int = 2049;
pub(crate) const ERR_OTHER: c_int = 4096;

thread_local! {
    static CALLS: RefCell<HashMap<&'static str, usize>> = RefCell::new(HashMap::new());
    static LIVE_OBJECTS: Cell<isize> = const { Cell::new(0) };
    static LIVE_CONTEXTS: Cell<isize> = const { Cell::new(0) };
    static LAST_ARGV: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    static MESSAGE: RefCell<CString> = RefCell::new(CString::default());
    static SEQUENCE: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

fn bump(name: &'static str) {
    CALLS.with(|calls| *calls.borrow_mut().entry(name).or_default() += 1);
    SEQUENCE.with(|sequence| sequence.borrow_mut().push(name));
}

/// Calls made to `name` on this thread.
pub(crate) fn calls(name: &str) -> usize {
    CALLS.with(|calls| calls.borrow().get(name).copied().unwrap_or(0))
}

/// Calls made to any stub entry point on this thread.
pub(crate) fn total_calls() -> usize {
    CALLS.with(|calls| calls.borrow().values().sum())
}

/// Entry points called on this thread, in order, since the last
/// [`clear_sequence`].
pub(crate) fn sequence() -> Vec<&'static str> {
    SEQUENCE.with(|sequence| sequence.borrow().clone())
}

pub(crate) fn clear_sequence() {
    SEQUENCE.with(|sequence| sequence.borrow_mut().clear());
}

pub(crate) fn live_objects() -> isize {
    LIVE_OBJECTS.with(Cell::get)
}

pub(crate) fn live_contexts() -> isize {
    LIVE_CONTEXTS.with(Cell::get)
}

/// Tokens received by the most recent `proj_create_argv`.
pub(crate) fn last_argv() -> Vec<String> {
    LAST_ARGV.with(|argv| argv.borrow().clone())
}

/// Full symbol table pointing at the stub.
pub(crate) fn symbols() -> Symbols {
    Symbols {
        pj_get_release: Some(pj_get_release),
        pj_strerrno: Some(pj_strerrno),
        proj_info: Some(proj_info),
        proj_pj_info: Some(proj_pj_info),
        proj_context_create: Some(proj_context_create),
        proj_context_destroy: Some(proj_context_destroy),
        proj_context_errno: Some(proj_context_errno),
        proj_errno: Some(proj_errno),
        proj_errno_reset: Some(proj_errno_reset),
        proj_create: Some(proj_create),
        proj_create_argv: Some(proj_create_argv),
        proj_create_crs_to_crs: Some(proj_create_crs_to_crs),
        proj_destroy: Some(proj_destroy),
        proj_trans: Some(proj_trans),
        proj_errno_string: Some(proj_errno_string),
        proj_log_level: Some(proj_log_level),
        proj_log_func: Some(proj_log_func),
        proj_clone: Some(proj_clone),
        proj_get_name: Some(proj_get_name),
        proj_get_id_auth_name: Some(proj_get_id_auth_name),
        proj_get_id_code: Some(proj_get_id_code),
        proj_get_remarks: Some(proj_get_remarks),
        proj_get_scope: Some(proj_get_scope),
        proj_get_type: Some(proj_get_type),
        proj_is_crs: Some(proj_is_crs),
        proj_is_equivalent_to: Some(proj_is_equivalent_to),
        proj_is_deprecated: Some(proj_is_deprecated),
        proj_get_area_of_use: Some(proj_get_area_of_use),
        proj_as_wkt: Some(proj_as_wkt),
        proj_as_proj_string: Some(proj_as_proj_string),
        proj_context_set_database_path: Some(proj_context_set_database_path),
        proj_context_get_database_path: Some(proj_context_get_database_path),
        proj_context_use_proj4_init_rules: Some(proj_context_use_proj4_init_rules),
        proj_context_get_use_proj4_init_rules: Some(proj_context_get_use_proj4_init_rules),
        proj_crs_get_geodetic_crs: Some(proj_crs_get_geodetic_crs),
        proj_crs_get_horizontal_datum: Some(proj_crs_get_datum),
        proj_crs_get_sub_crs: Some(proj_crs_get_sub_crs),
        proj_crs_get_datum: Some(proj_crs_get_datum),
        proj_crs_get_coordinate_system: Some(proj_crs_get_coordinate_system),
        proj_cs_get_type: Some(proj_cs_get_type),
        proj_cs_get_axis_count: Some(proj_cs_get_axis_count),
        proj_cs_get_axis_info: Some(proj_cs_get_axis_info),
        proj_crs_get_coordoperation: Some(proj_crs_get_coordoperation),
        proj_coordoperation_get_accuracy: Some(proj_coordoperation_get_accuracy),
        proj_coordoperation_get_method_info: Some(proj_coordoperation_get_method_info),
        proj_get_ellipsoid: Some(proj_get_ellipsoid),
        proj_ellipsoid_get_parameters: Some(proj_ellipsoid_get_parameters),
        proj_get_prime_meridian: Some(proj_get_prime_meridian),
        proj_prime_meridian_get_parameters: Some(proj_prime_meridian_get_parameters),
        proj_as_projjson: Some(proj_as_projjson),
        proj_create_crs_to_crs_from_pj: Some(proj_create_crs_to_crs_from_pj),
        proj_cleanup: Some(proj_cleanup),
        proj_coordoperation_is_instantiable: Some(proj_coordoperation_is_instantiable),
        proj_context_errno_string: Some(proj_context_errno_string),
    }
}

/// Stub library probed through `proj_info` (reports 9.4.1).
pub(crate) fn library() -> Arc<NativeLibrary> {
    // SAFETY: every stub entry point matches its proj.h signature.
    unsafe { NativeLibrary::from_symbols(symbols(), None) }
}

/// Stub library whose registry claims `version`, as an older PROJ would.
pub(crate) fn library_at(version: Version) -> Arc<NativeLibrary> {
    // SAFETY: as above.
    unsafe { NativeLibrary::from_symbols(symbols(), Some(CapabilityRegistry::for_version(version))) }
}

struct StubContext {
    errno: Cell<c_int>,
    log_level: Cell<c_int>,
    logger: Cell<Option<(PjLogFunction, *mut c_void)>>,
    database: RefCell<Option<CString>>,
    proj4_rules: Cell<c_int>,
}

struct StubPj {
    kind: c_int,
    errno: Cell<c_int>,
    definition: CString,
    name: CString,
    auth: Option<(CString, CString)>,
    wkt: CString,
    projjson: CString,
}

impl StubPj {
    fn new(kind: c_int, definition: &str, name: &str) -> Self {
        let auth = authority_of(definition);
        let code = auth.as_ref().map(|(_, code)| code.as_str()).unwrap_or("0");
        let wkt = if definition.starts_with("GEOGCRS[") || definition.starts_with("PROJCRS[") {
            definition.to_string()
        } else if kind == TYPE_PROJECTED_CRS {
            format!("PROJCRS[\"{name}\",ID[\"EPSG\",{code}]]")
        } else {
            format!("GEOGCRS[\"{name}\",ID[\"EPSG\",{code}]]")
        };
        let projjson = format!("{{\"type\":\"CRS\",\"name\":\"{name}\"}}");
        Self {
            kind,
            errno: Cell::new(0),
            definition: owned(definition),
            name: owned(name),
            auth: auth.map(|(auth, code)| (owned(&auth), owned(&code))),
            wkt: owned(&wkt),
            projjson: owned(&projjson),
        }
    }

    fn into_raw(self) -> *mut Pj {
        LIVE_OBJECTS.with(|live| live.set(live.get() + 1));
        Box::into_raw(Box::new(self)).cast()
    }

    fn text(&self) -> String {
        self.definition.to_string_lossy().into_owned()
    }
}

fn owned(text: &str) -> CString {
    CString::new(text).unwrap()
}

fn hold(text: String) -> *const c_char {
    MESSAGE.with(|message| {
        *message.borrow_mut() = owned(&text);
        message.borrow().as_ptr()
    })
}

unsafe fn read(text: *const c_char) -> String {
    if text.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
}

unsafe fn ctx<'a>(ctx: *mut PjContext) -> &'a StubContext {
    unsafe { &*ctx.cast::<StubContext>() }
}

unsafe fn object<'a>(pj: *const Pj) -> &'a StubPj {
    unsafe { &*pj.cast::<StubPj>() }
}

fn authority_of(definition: &str) -> Option<(String, String)> {
    if let Some(code) = definition.strip_prefix("EPSG:") {
        return Some(("EPSG".to_string(), code.to_string()));
    }
    let start = definition.find("ID[\"")? + 4;
    let rest = &definition[start..];
    let (auth, rest) = rest.split_once("\",")?;
    let code: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    Some((auth.to_string(), code))
}

fn wkt_name(definition: &str) -> Option<String> {
    let start = definition.find("[\"")? + 2;
    let end = definition[start..].find('"')? + start;
    Some(definition[start..end].to_string())
}

fn classify(definition: &str) -> Option<(c_int, String)> {
    let trimmed = definition.trim();
    if trimmed.is_empty() || trimmed.starts_with("invalid") {
        return None;
    }
    let classified = match trimmed {
        "EPSG:4326" => (TYPE_GEOGRAPHIC_2D_CRS, "WGS 84".to_string()),
        "EPSG:4269" => (TYPE_GEOGRAPHIC_2D_CRS, "NAD83".to_string()),
        "EPSG:3857" => (TYPE_PROJECTED_CRS, "WGS 84 / Pseudo-Mercator".to_string()),
        other if other.starts_with("EPSG:") => (TYPE_GEOGRAPHIC_2D_CRS, other.to_string()),
        other if other.starts_with("GEOGCRS[") => {
            (TYPE_GEOGRAPHIC_2D_CRS, wkt_name(other).unwrap_or_default())
        }
        other if other.starts_with("PROJCRS[") => {
            (TYPE_PROJECTED_CRS, wkt_name(other).unwrap_or_default())
        }
        other if other.contains("proj=longlat") => (TYPE_GEOGRAPHIC_2D_CRS, "unknown".to_string()),
        other if other.contains("type=crs") => (TYPE_PROJECTED_CRS, "unknown".to_string()),
        other if other.contains("proj=") => (TYPE_CONVERSION, "PROJ-based coordinate operation".to_string()),
        _ => return None,
    };
    Some(classified)
}

unsafe fn log(context: &StubContext, level: c_int, message: &str) {
    if context.log_level.get() < level {
        return;
    }
    if let Some((logger, data)) = context.logger.get() {
        let text = owned(message);
        unsafe { logger(data, level, text.as_ptr()) };
    }
}

unsafe fn create_from_text(context: *mut PjContext, definition: &str) -> *mut Pj {
    let state = unsafe { ctx(context) };
    match classify(definition) {
        Some((kind, name)) => {
            unsafe { log(state, 2, &format!("proj_create: {definition}")) };
            StubPj::new(kind, definition, &name).into_raw()
        }
        None => {
            state.errno.set(ERR_WRONG_SYNTAX);
            unsafe { log(state, 1, "proj_create: unrecognized format / unknown name") };
            ptr::null_mut()
        }
    }
}

fn message_for(code: c_int) -> String {
    match code {
        ERR_WRONG_SYNTAX => "Invalid PROJ string syntax".to_string(),
        ERR_INVALID_COORD => "Invalid coordinate".to_string(),
        ERR_OTHER => "Unknown error (code 4096)".to_string(),
        other => format!("Unknown error (code {other})"),
    }
}

pub(crate) unsafe extern "C" fn pj_get_release() -> *const c_char {
    bump("pj_get_release");
    c"Rel. 4.9.3, 15 August 2016".as_ptr()
}

pub(crate) unsafe extern "C" fn pj_strerrno(_code: c_int) -> *const c_char {
    bump("pj_strerrno");
    c"legacy error".as_ptr()
}

fn info(major: c_int, minor: c_int, patch: c_int) -> PjInfo {
    PjInfo {
        major,
        minor,
        patch,
        release: ptr::null(),
        version: ptr::null(),
        searchpath: ptr::null(),
        paths: ptr::null(),
        path_count: 0,
    }
}

pub(crate) unsafe extern "C" fn proj_info() -> PjInfo {
    bump("proj_info");
    info(9, 4, 1)
}

pub(crate) unsafe extern "C" fn proj_info_5_2() -> PjInfo {
    bump("proj_info");
    info(5, 2, 0)
}

unsafe extern "C" fn proj_pj_info(pj: *mut Pj) -> PjProjInfo {
    bump("proj_pj_info");
    let object = unsafe { object(pj) };
    PjProjInfo {
        id: ptr::null(),
        description: object.name.as_ptr(),
        definition: object.definition.as_ptr(),
        has_inverse: 1,
        accuracy: -1.0,
    }
}

unsafe extern "C" fn proj_context_create() -> *mut PjContext {
    bump("proj_context_create");
    LIVE_CONTEXTS.with(|live| live.set(live.get() + 1));
    let context = StubContext {
        errno: Cell::new(0),
        log_level: Cell::new(1),
        logger: Cell::new(None),
        database: RefCell::new(None),
        proj4_rules: Cell::new(0),
    };
    Box::into_raw(Box::new(context)).cast()
}

unsafe extern "C" fn proj_context_destroy(context: *mut PjContext) -> *mut PjContext {
    bump("proj_context_destroy");
    LIVE_CONTEXTS.with(|live| live.set(live.get() - 1));
    drop(unsafe { Box::from_raw(context.cast::<StubContext>()) });
    ptr::null_mut()
}

unsafe extern "C" fn proj_context_errno(context: *mut PjContext) -> c_int {
    bump("proj_context_errno");
    unsafe { ctx(context) }.errno.get()
}

unsafe extern "C" fn proj_errno(pj: *const Pj) -> c_int {
    bump("proj_errno");
    unsafe { object(pj) }.errno.get()
}

unsafe extern "C" fn proj_errno_reset(pj: *const Pj) -> c_int {
    bump("proj_errno_reset");
    unsafe { object(pj) }.errno.replace(0)
}

unsafe extern "C" fn proj_create(context: *mut PjContext, definition: *const c_char) -> *mut Pj {
    bump("proj_create");
    let definition = unsafe { read(definition) };
    unsafe { create_from_text(context, &definition) }
}

unsafe extern "C" fn proj_create_argv(
    context: *mut PjContext,
    argc: c_int,
    argv: *mut *mut c_char,
) -> *mut Pj {
    bump("proj_create_argv");
    let tokens: Vec<String> = (0..argc as usize)
        .map(|i| unsafe { read(*argv.add(i)) })
        .collect();
    LAST_ARGV.with(|last| *last.borrow_mut() = tokens.clone());
    let definition = tokens
        .iter()
        .map(|token| format!("+{token}"))
        .collect::<Vec<_>>()
        .join(" ");
    unsafe { create_from_text(context, &definition) }
}

/// `EPSG:0` on either side finds no operation; `EPSG:4267` as the source
/// yields several candidates, which PROJ reports as an untyped object.
unsafe fn crs_to_crs(context: *mut PjContext, source: &str, target: &str) -> *mut Pj {
    let state = unsafe { ctx(context) };
    if classify(source).is_none() || classify(target).is_none() {
        state.errno.set(ERR_WRONG_SYNTAX);
        return ptr::null_mut();
    }
    if source == "EPSG:0" || target == "EPSG:0" {
        state.errno.set(ERR_OTHER);
        return ptr::null_mut();
    }
    let name = format!("{source} to {target}");
    if source == "EPSG:4267" {
        return StubPj::new(TYPE_UNKNOWN, &name, "Set of coordinate operations").into_raw();
    }
    StubPj::new(TYPE_TRANSFORMATION, &name, &name).into_raw()
}

unsafe extern "C" fn proj_create_crs_to_crs(
    context: *mut PjContext,
    source: *const c_char,
    target: *const c_char,
    _area: *mut PjArea,
) -> *mut Pj {
    bump("proj_create_crs_to_crs");
    let (source, target) = unsafe { (read(source), read(target)) };
    unsafe { crs_to_crs(context, &source, &target) }
}

unsafe extern "C" fn proj_create_crs_to_crs_from_pj(
    context: *mut PjContext,
    source: *const Pj,
    target: *const Pj,
    _area: *mut PjArea,
    _options: *const *const c_char,
) -> *mut Pj {
    bump("proj_create_crs_to_crs_from_pj");
    let (source, target) = unsafe { (object(source).text(), object(target).text()) };
    unsafe { crs_to_crs(context, &source, &target) }
}

unsafe extern "C" fn proj_destroy(pj: *mut Pj) -> *mut Pj {
    bump("proj_destroy");
    if !pj.is_null() {
        LIVE_OBJECTS.with(|live| live.set(live.get() - 1));
        drop(unsafe { Box::from_raw(pj.cast::<StubPj>()) });
    }
    ptr::null_mut()
}

/// Forward shifts x by +100 and y by +200; inverse undoes it. Non-finite
/// input fails with `PROJ_ERR_COORD_TRANSFM_INVALID_COORD`.
unsafe extern "C" fn proj_trans(pj: *mut Pj, direction: c_int, coord: PjCoord) -> PjCoord {
    bump("proj_trans");
    let object = unsafe { object(pj) };
    if !coord.v[0].is_finite() || !coord.v[1].is_finite() {
        object.errno.set(ERR_INVALID_COORD);
        return PjCoord { v: [f64::INFINITY; 4] };
    }
    let sign = f64::from(direction.signum());
    let [x, y, z, t] = coord.v;
    PjCoord {
        v: [x + sign * 100.0, y + sign * 200.0, z, t],
    }
}

unsafe extern "C" fn proj_errno_string(code: c_int) -> *const c_char {
    bump("proj_errno_string");
    hold(message_for(code))
}

unsafe extern "C" fn proj_context_errno_string(_context: *mut PjContext, code: c_int) -> *const c_char {
    bump("proj_context_errno_string");
    hold(message_for(code))
}

unsafe extern "C" fn proj_log_level(context: *mut PjContext, level: c_int) -> c_int {
    bump("proj_log_level");
    let state = unsafe { ctx(context) };
    let previous = state.log_level.get();
    if level != 4 {
        state.log_level.set(level);
    }
    previous
}

unsafe extern "C" fn proj_log_func(context: *mut PjContext, data: *mut c_void, logger: Option<PjLogFunction>) {
    bump("proj_log_func");
    unsafe { ctx(context) }.logger.set(logger.map(|logger| (logger, data)));
}

unsafe extern "C" fn proj_clone(_context: *mut PjContext, pj: *const Pj) -> *mut Pj {
    bump("proj_clone");
    let source = unsafe { object(pj) };
    StubPj::new(source.kind, &source.text(), &source.name.to_string_lossy()).into_raw()
}

unsafe extern "C" fn proj_get_name(pj: *const Pj) -> *const c_char {
    bump("proj_get_name");
    unsafe { object(pj) }.name.as_ptr()
}

unsafe extern "C" fn proj_get_id_auth_name(pj: *const Pj, index: c_int) -> *const c_char {
    bump("proj_get_id_auth_name");
    match (&unsafe { object(pj) }.auth, index) {
        (Some((auth, _)), 0) => auth.as_ptr(),
        _ => ptr::null(),
    }
}

unsafe extern "C" fn proj_get_id_code(pj: *const Pj, index: c_int) -> *const c_char {
    bump("proj_get_id_code");
    match (&unsafe { object(pj) }.auth, index) {
        (Some((_, code)), 0) => code.as_ptr(),
        _ => ptr::null(),
    }
}

unsafe extern "C" fn proj_get_remarks(_pj: *const Pj) -> *const c_char {
    bump("proj_get_remarks");
    ptr::null()
}

unsafe extern "C" fn proj_get_scope(_pj: *const Pj) -> *const c_char {
    bump("proj_get_scope");
    c"Horizontal component of 3D system.".as_ptr()
}

unsafe extern "C" fn proj_get_type(pj: *const Pj) -> c_int {
    bump("proj_get_type");
    unsafe { object(pj) }.kind
}

unsafe extern "C" fn proj_is_crs(pj: *const Pj) -> c_int {
    bump("proj_is_crs");
    let kind = unsafe { object(pj) }.kind;
    c_int::from((8..=20).contains(&kind) || kind == 28)
}

unsafe extern "C" fn proj_is_equivalent_to(a: *const Pj, b: *const Pj, _criterion: c_int) -> c_int {
    bump("proj_is_equivalent_to");
    let (a, b) = unsafe { (object(a), object(b)) };
    c_int::from(a.kind == b.kind && a.name == b.name)
}

unsafe extern "C" fn proj_is_deprecated(_pj: *const Pj) -> c_int {
    bump("proj_is_deprecated");
    0
}

unsafe extern "C" fn proj_get_area_of_use(
    _context: *mut PjContext,
    _pj: *const Pj,
    west: *mut c_double,
    south: *mut c_double,
    east: *mut c_double,
    north: *mut c_double,
    name: *mut *const c_char,
) -> c_int {
    bump("proj_get_area_of_use");
    unsafe {
        *west = -180.0;
        *south = -90.0;
        *east = 180.0;
        *north = 90.0;
        *name = c"World.".as_ptr();
    }
    1
}

unsafe extern "C" fn proj_as_wkt(
    _context: *mut PjContext,
    pj: *const Pj,
    _kind: c_int,
    _options: *const *const c_char,
) -> *const c_char {
    bump("proj_as_wkt");
    unsafe { object(pj) }.wkt.as_ptr()
}

unsafe extern "C" fn proj_as_proj_string(
    _context: *mut PjContext,
    pj: *const Pj,
    _kind: c_int,
    _options: *const *const c_char,
) -> *const c_char {
    bump("proj_as_proj_string");
    let object = unsafe { object(pj) };
    if object.kind == TYPE_GEOGRAPHIC_2D_CRS {
        c"+proj=longlat +datum=WGS84 +no_defs +type=crs".as_ptr()
    } else {
        object.definition.as_ptr()
    }
}

unsafe extern "C" fn proj_as_projjson(
    _context: *mut PjContext,
    pj: *const Pj,
    _options: *const *const c_char,
) -> *const c_char {
    bump("proj_as_projjson");
    unsafe { object(pj) }.projjson.as_ptr()
}

unsafe extern "C" fn proj_context_set_database_path(
    context: *mut PjContext,
    path: *const c_char,
    _aux: *const *const c_char,
    _options: *const *const c_char,
) -> c_int {
    bump("proj_context_set_database_path");
    let state = unsafe { ctx(context) };
    let path = unsafe { read(path) };
    if std::path::Path::new(&path).is_file() {
        *state.database.borrow_mut() = Some(owned(&path));
        1
    } else {
        state.errno.set(ERR_OTHER);
        0
    }
}

unsafe extern "C" fn proj_context_get_database_path(context: *mut PjContext) -> *const c_char {
    bump("proj_context_get_database_path");
    match &*unsafe { ctx(context) }.database.borrow() {
        Some(path) => path.as_ptr(),
        None => ptr::null(),
    }
}

unsafe extern "C" fn proj_context_use_proj4_init_rules(context: *mut PjContext, enabled: c_int) {
    bump("proj_context_use_proj4_init_rules");
    unsafe { ctx(context) }.proj4_rules.set(enabled);
}

unsafe extern "C" fn proj_context_get_use_proj4_init_rules(
    context: *mut PjContext,
    _from_legacy_code_path: c_int,
) -> c_int {
    bump("proj_context_get_use_proj4_init_rules");
    unsafe { ctx(context) }.proj4_rules.get()
}

unsafe extern "C" fn proj_crs_get_geodetic_crs(_context: *mut PjContext, _crs: *const Pj) -> *mut Pj {
    bump("proj_crs_get_geodetic_crs");
    StubPj::new(TYPE_GEOGRAPHIC_2D_CRS, "EPSG:4326", "WGS 84").into_raw()
}

unsafe extern "C" fn proj_crs_get_datum(_context: *mut PjContext, _crs: *const Pj) -> *mut Pj {
    bump("proj_crs_get_datum");
    StubPj::new(
        TYPE_GEODETIC_REFERENCE_FRAME,
        "EPSG:6326",
        "World Geodetic System 1984",
    )
    .into_raw()
}

unsafe extern "C" fn proj_crs_get_sub_crs(_context: *mut PjContext, _crs: *const Pj, _index: c_int) -> *mut Pj {
    bump("proj_crs_get_sub_crs");
    ptr::null_mut()
}

unsafe extern "C" fn proj_crs_get_coordinate_system(_context: *mut PjContext, _crs: *const Pj) -> *mut Pj {
    bump("proj_crs_get_coordinate_system");
    StubPj::new(TYPE_UNKNOWN, "EPSG:6422", "ellipsoidal").into_raw()
}

unsafe extern "C" fn proj_cs_get_type(_context: *mut PjContext, _cs: *const Pj) -> c_int {
    bump("proj_cs_get_type");
    2
}

unsafe extern "C" fn proj_cs_get_axis_count(_context: *mut PjContext, _cs: *const Pj) -> c_int {
    bump("proj_cs_get_axis_count");
    2
}

#[allow(clippy::too_many_arguments)]
unsafe extern "C" fn proj_cs_get_axis_info(
    _context: *mut PjContext,
    _cs: *const Pj,
    index: c_int,
    name: *mut *const c_char,
    abbreviation: *mut *const c_char,
    direction: *mut *const c_char,
    factor: *mut c_double,
    unit_name: *mut *const c_char,
    unit_auth: *mut *const c_char,
    unit_code: *mut *const c_char,
) -> c_int {
    bump("proj_cs_get_axis_info");
    let (axis, abbrev, dir) = match index {
        0 => (c"Geodetic latitude", c"Lat", c"north"),
        1 => (c"Geodetic longitude", c"Lon", c"east"),
        _ => return 0,
    };
    unsafe {
        *name = axis.as_ptr();
        *abbreviation = abbrev.as_ptr();
        *direction = dir.as_ptr();
        *factor = 0.017453292519943295;
        *unit_name = c"degree".as_ptr();
        *unit_auth = c"EPSG".as_ptr();
        *unit_code = c"9122".as_ptr();
    }
    1
}

unsafe extern "C" fn proj_crs_get_coordoperation(_context: *mut PjContext, crs: *const Pj) -> *mut Pj {
    bump("proj_crs_get_coordoperation");
    if unsafe { object(crs) }.kind != TYPE_PROJECTED_CRS {
        return ptr::null_mut();
    }
    StubPj::new(
        TYPE_CONVERSION,
        "+proj=merc +a=6378137 +b=6378137",
        "Popular Visualisation Pseudo-Mercator",
    )
    .into_raw()
}

unsafe extern "C" fn proj_coordoperation_get_accuracy(_context: *mut PjContext, _op: *const Pj) -> c_double {
    bump("proj_coordoperation_get_accuracy");
    -1.0
}

unsafe extern "C" fn proj_coordoperation_get_method_info(
    _context: *mut PjContext,
    _op: *const Pj,
    name: *mut *const c_char,
    auth: *mut *const c_char,
    code: *mut *const c_char,
) -> c_int {
    bump("proj_coordoperation_get_method_info");
    unsafe {
        *name = c"Popular Visualisation Pseudo Mercator".as_ptr();
        *auth = c"EPSG".as_ptr();
        *code = c"1024".as_ptr();
    }
    1
}

unsafe extern "C" fn proj_coordoperation_is_instantiable(_context: *mut PjContext, _op: *const Pj) -> c_int {
    bump("proj_coordoperation_is_instantiable");
    1
}

unsafe extern "C" fn proj_get_ellipsoid(_context: *mut PjContext, _pj: *const Pj) -> *mut Pj {
    bump("proj_get_ellipsoid");
    StubPj::new(TYPE_ELLIPSOID, "EPSG:7030", "WGS 84").into_raw()
}

unsafe extern "C" fn proj_ellipsoid_get_parameters(
    _context: *mut PjContext,
    _ellipsoid: *const Pj,
    semi_major: *mut c_double,
    semi_minor: *mut c_double,
    computed: *mut c_int,
    inv_flattening: *mut c_double,
) -> c_int {
    bump("proj_ellipsoid_get_parameters");
    unsafe {
        *semi_major = 6378137.0;
        *semi_minor = 6356752.314245179;
        *computed = 1;
        *inv_flattening = 298.257223563;
    }
    1
}

unsafe extern "C" fn proj_get_prime_meridian(_context: *mut PjContext, _pj: *const Pj) -> *mut Pj {
    bump("proj_get_prime_meridian");
    StubPj::new(TYPE_PRIME_MERIDIAN, "EPSG:8901", "Greenwich").into_raw()
}

unsafe extern "C" fn proj_prime_meridian_get_parameters(
    _context: *mut PjContext,
    _meridian: *const Pj,
    longitude: *mut c_double,
    factor: *mut c_double,
    unit_name: *mut *const c_char,
) -> c_int {
    bump("proj_prime_meridian_get_parameters");
    unsafe {
        *longitude = 0.0;
        *factor = 0.017453292519943295;
        *unit_name = c"degree".as_ptr();
    }
    1
}

unsafe extern "C" fn proj_cleanup() {
    bump("proj_cleanup");
}
