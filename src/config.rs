//! Tuning parameters for the anchor-based extractor.
//!
//! Loaded from hajri.json when present. Every field has a default, so a
//! partial file only overrides what it names. The values are empirically
//! tuned for the dashboard layout and are passed explicitly to each
//! extraction call rather than held globally.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A half-open band `[lo, hi)` of normalized horizontal position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub lo: f32,
    pub hi: f32,
}

impl Zone {
    pub const fn new(lo: f32, hi: f32) -> Self {
        Self { lo, hi }
    }

    /// Returns true if `x_ratio` lies inside the zone.
    pub fn contains(&self, x_ratio: f32) -> bool {
        self.lo <= x_ratio && x_ratio < self.hi
    }
}

/// Column zones of the attendance table, relative to the data region width.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub course_code: Zone,
    pub class_type: Zone,
    pub attendance: Zone,
    pub percentage: Zone,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            course_code: Zone::new(0.00, 0.35),
            class_type: Zone::new(0.35, 0.50),
            attendance: Zone::new(0.50, 0.75),
            percentage: Zone::new(0.75, 1.00),
        }
    }
}

/// Complete extractor configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Fraction of image width separating the attendance table from the legend
    pub region_split_threshold: f32,
    /// Max vertical distance (px) for a class type or field to join an anchor
    pub y_tolerance: f32,
    /// Max vertical distance (px) for legend tokens to share a row
    pub row_tolerance: f32,
    pub zones: ZoneConfig,
    /// Upper bound for present/total counts
    pub max_class_count: u32,
    /// Upper bound for a recognized percentage
    pub max_percentage: f64,
    /// Course names must be longer than this many characters
    pub min_name_len: usize,
    /// Allowed gap (percentage points) between observed and computed percentage
    pub percentage_tolerance: f64,
    /// Confidence assigned to every anchor-derived entry
    pub anchor_confidence: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            region_split_threshold: 0.52,
            y_tolerance: 20.0,
            row_tolerance: 20.0,
            zones: ZoneConfig::default(),
            max_class_count: 100,
            max_percentage: 100.0,
            min_name_len: 8,
            percentage_tolerance: 3.0,
            anchor_confidence: 0.95,
        }
    }
}

impl ExtractorConfig {
    /// Loads config from file, or returns defaults if it is missing or invalid.
    pub fn load(config_path: &Path) -> Self {
        if !config_path.exists() {
            log::info!(
                "{} not found. Using default extractor config.",
                config_path.display()
            );
            return Self::default();
        }

        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str::<ExtractorConfig>(&contents) {
                Ok(config) => match config.validate() {
                    Ok(()) => {
                        log::info!("Extractor config loaded from {}", config_path.display());
                        return config;
                    }
                    Err(e) => {
                        log::warn!("Invalid extractor config: {}. Using defaults.", e);
                    }
                },
                Err(e) => {
                    log::warn!(
                        "Failed to parse {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    );
                }
            },
            Err(e) => {
                log::warn!(
                    "Failed to read {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
            }
        }

        Self::default()
    }

    /// Writes the default config to file (for reference).
    pub fn save_default(config_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&Self::default())?;
        fs::write(config_path, json)?;
        Ok(())
    }

    /// Checks that tolerances are positive and zones are well-formed.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.region_split_threshold) {
            return Err(anyhow!(
                "region_split_threshold must be within [0, 1], got {}",
                self.region_split_threshold
            ));
        }
        if self.y_tolerance <= 0.0 || self.row_tolerance <= 0.0 {
            return Err(anyhow!("tolerances must be positive"));
        }
        let zones = [
            ("course_code", self.zones.course_code),
            ("class_type", self.zones.class_type),
            ("attendance", self.zones.attendance),
            ("percentage", self.zones.percentage),
        ];
        for (name, zone) in zones {
            if zone.lo >= zone.hi {
                return Err(anyhow!("zone {} is empty: [{}, {})", name, zone.lo, zone.hi));
            }
        }
        if !(0.0..=1.0).contains(&self.anchor_confidence) {
            return Err(anyhow!(
                "anchor_confidence must be within [0, 1], got {}",
                self.anchor_confidence
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_zone_half_open() {
        let zone = Zone::new(0.35, 0.50);
        assert!(zone.contains(0.35));
        assert!(zone.contains(0.49));
        assert!(!zone.contains(0.50));
        assert!(!zone.contains(0.10));
    }

    #[test]
    fn test_default_zones_cover_columns() {
        let zones = ZoneConfig::default();
        assert!(zones.course_code.contains(0.10));
        assert!(zones.class_type.contains(0.40));
        assert!(zones.attendance.contains(0.60));
        assert!(zones.percentage.contains(0.90));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hajri.json");
        std::fs::write(&path, r#"{ "y_tolerance": 12.5 }"#).unwrap();

        let config = ExtractorConfig::load(&path);
        assert_eq!(config.y_tolerance, 12.5);
        assert_eq!(config.region_split_threshold, 0.52);
        assert_eq!(config.zones, ZoneConfig::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = ExtractorConfig::load(&dir.path().join("nope.json"));
        assert_eq!(config, ExtractorConfig::default());
    }

    #[test]
    fn test_invalid_zone_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hajri.json");
        std::fs::write(
            &path,
            r#"{ "zones": { "attendance": { "lo": 0.8, "hi": 0.6 } } }"#,
        )
        .unwrap();

        let config = ExtractorConfig::load(&path);
        assert_eq!(config, ExtractorConfig::default());
    }

    #[test]
    fn test_save_default_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hajri.json");
        ExtractorConfig::save_default(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"region_split_threshold\": 0.52"));
        assert_eq!(ExtractorConfig::load(&path), ExtractorConfig::default());
    }
}
