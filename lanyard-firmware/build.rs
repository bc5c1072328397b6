//! Build script for lanyard-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Exposes the firmware build number to the crate

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    setup_linker();
    export_build_number();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Compare against the remote descriptor's `build` field
///
/// Set `LANYARD_BUILD` in the release pipeline; local builds report 0 and
/// therefore always see an update.
fn export_build_number() {
    println!("cargo:rerun-if-env-changed=LANYARD_BUILD");

    let build = env::var("LANYARD_BUILD").unwrap_or_else(|_| "0".into());
    if build.parse::<u32>().is_err() {
        panic!("LANYARD_BUILD must be a decimal build number, got {:?}", build);
    }
    println!("cargo:rustc-env=LANYARD_BUILD={}", build);
}
