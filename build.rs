use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Copy config files next to the built executable, where the CLI looks for them
    copy_to_target("hajri.json");
    copy_to_target("course_config.json");
}

/// Copies a file from the crate root to the target directory if it exists.
fn copy_to_target(name: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    // OUT_DIR is something like target/release/build/hajri-ocr-xxx/out
    let target_dir = Path::new(&out_dir)
        .ancestors()
        .nth(3) // Go up 3 levels: out -> hash -> build -> release
        .expect("Could not find target directory");

    let src = Path::new(name);
    if src.exists() {
        let _ = fs::copy(src, target_dir.join(name));
        println!("cargo:rerun-if-changed={}", name);
    }
}
