//! ---
//! osr_section: "01-core-functionality"
//! osr_subsection: "build"
//! osr_type: "source"
//! osr_scope: "build"
//! osr_description: "Build metadata emission for version banners."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Not fail_on_error: outside a git checkout the VERGEN_GIT_* values are placeholders.
    EmitBuilder::builder()
        .all_build()
        .all_cargo()
        .all_git()
        .emit()?;

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
