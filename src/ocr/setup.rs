use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(windows)]
const TESSERACT_EXE: &str = "tesseract.exe";
#[cfg(not(windows))]
const TESSERACT_EXE: &str = "tesseract";

/// Returns the directory for locally installed Tesseract files
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hajri-ocr")
        .join("tesseract")
}

/// Finds the Tesseract executable.
///
/// Checks `TESSERACT_CMD`, then our local dir, then the system PATH.
pub fn find_tesseract_executable() -> Result<PathBuf> {
    if let Ok(cmd) = std::env::var("TESSERACT_CMD") {
        let p = PathBuf::from(&cmd);
        if p.exists() {
            return Ok(p);
        }
        log::warn!("TESSERACT_CMD points to missing file: {}", cmd);
    }

    let local_exe = get_tesseract_dir().join(TESSERACT_EXE);
    if local_exe.exists() {
        return Ok(local_exe);
    }

    if responds_to_version(Path::new("tesseract")) {
        return Ok(PathBuf::from("tesseract"));
    }

    // Check common paths
    let common_paths = [
        r"C:\Program Files\Tesseract-OCR\tesseract.exe",
        r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
        "/usr/local/bin/tesseract",
        "/opt/homebrew/bin/tesseract",
    ];

    for path in &common_paths {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "Tesseract not found. Install Tesseract-OCR or set TESSERACT_CMD."
    ))
}

/// Finds a tessdata directory containing eng.traineddata.
///
/// Returning an error is not fatal: Tesseract falls back to its compiled-in
/// data path when `--tessdata-dir` is omitted.
pub fn find_tessdata_dir() -> Result<PathBuf> {
    let local_tessdata = get_tesseract_dir().join("tessdata");
    if local_tessdata.join("eng.traineddata").exists() {
        return Ok(local_tessdata);
    }

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        if p.join("eng.traineddata").exists() {
            return Ok(p);
        }
        let p = p.join("tessdata");
        if p.join("eng.traineddata").exists() {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "tessdata directory not found. Please ensure eng.traineddata is available."
    ))
}

fn responds_to_version(executable: &Path) -> bool {
    Command::new(executable)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
