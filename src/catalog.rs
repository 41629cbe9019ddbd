//! Course catalog stored in course_config.json.
//!
//! A user-maintained `code -> {name, abbr}` list. The extractor consults it
//! only when the on-screen legend has no name for a course.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::table::normalize::normalize_course_code;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub abbr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseCatalog {
    #[serde(default)]
    courses: BTreeMap<String, CourseInfo>,
}

impl CourseCatalog {
    /// Loads the catalog. A missing file is an empty catalog.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("{} not found, course catalog is empty", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read course catalog: {}", path.display()))?;
        let catalog: CourseCatalog = serde_json::from_str(&content)
            .context(format!("Failed to parse course catalog: {}", path.display()))?;
        log::info!(
            "Loaded {} courses from {}",
            catalog.courses.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Writes the catalog as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize course catalog")?;
        fs::write(path, json)
            .context(format!("Failed to write course catalog: {}", path.display()))?;
        Ok(())
    }

    /// Adds or replaces a course. Codes are stored uppercased.
    pub fn upsert(&mut self, code: &str, name: &str, abbr: &str) {
        self.courses.insert(
            code.trim().to_uppercase(),
            CourseInfo {
                name: name.trim().to_string(),
                abbr: abbr.trim().to_string(),
            },
        );
    }

    /// Removes a course, returning whether it existed.
    pub fn remove(&mut self, code: &str) -> bool {
        self.courses.remove(&code.trim().to_uppercase()).is_some()
    }

    /// Finds a course by normalized code.
    ///
    /// Stored keys are normalized before comparing, so an entry saved as
    /// `CEUC201/FSE` answers for `CEUC201`. An exact key match wins.
    pub fn lookup(&self, code: &str) -> Option<&CourseInfo> {
        let code = code.to_uppercase();
        self.courses.get(&code).or_else(|| {
            self.courses
                .iter()
                .find(|(key, _)| normalize_course_code(key) == code)
                .map(|(_, info)| info)
        })
    }

    /// Returns the course name for a normalized code, skipping blank names.
    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.lookup(code)
            .map(|info| info.name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CourseInfo)> {
        self.courses.iter()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
