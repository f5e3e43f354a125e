use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=PROJSHIM_LIBRARY_HINT");
    println!("cargo:rerun-if-env-changed=PROJ_LIB_DIR");

    // An explicit hint wins; otherwise derive one from a PROJ_LIB_DIR install
    // prefix so packagers can point the runtime loader at a private build.
    let hint = env::var("PROJSHIM_LIBRARY_HINT").ok().or_else(|| {
        env::var("PROJ_LIB_DIR")
            .ok()
            .map(|dir| PathBuf::from(dir).join(shared_library_name()).display().to_string())
    });

    if let Some(raw_hint) = hint {
        let candidate = PathBuf::from(raw_hint);
        let canonical = candidate.canonicalize().unwrap_or(candidate);

        println!(
            "cargo:rustc-env=PROJSHIM_LIBRARY_HINT={}",
            canonical.display()
        );
    }
}

fn shared_library_name() -> &'static str {
    match env::var("CARGO_CFG_TARGET_OS").as_deref() {
        Ok("macos") => "libproj.dylib",
        Ok("windows") => "proj.dll",
        _ => "libproj.so",
    }
}
