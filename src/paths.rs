use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the extractor config path: `<exe_dir>/hajri.json`
pub fn get_config_path() -> PathBuf {
    get_exe_dir().join("hajri.json")
}

/// Returns the course catalog path: `<exe_dir>/course_config.json`
pub fn get_catalog_path() -> PathBuf {
    get_exe_dir().join("course_config.json")
}
