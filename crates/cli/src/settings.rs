use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use face_enroll_core::shared::constants::{APP_DIR_NAME, AUTO_CAPTURE_DELAY, SAMPLE_INTERVAL};
use face_enroll_core::validation::face_validator::ValidationCriteria;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no configuration directory on this platform")]
    NoConfigDir,
    #[error("failed to read settings from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write settings to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sample_interval_ms: u64,
    pub auto_capture_delay_ms: u64,
    pub criteria: ValidationCriteria,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_interval_ms: SAMPLE_INTERVAL.as_millis() as u64,
            auto_capture_delay_ms: AUTO_CAPTURE_DELAY.as_millis() as u64,
            criteria: ValidationCriteria::default(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    /// Settings from the default location, or defaults if none are saved.
    pub fn load() -> Result<Self, SettingsError> {
        match Self::config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(json) => Self::parse(path, &json),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Settings from an explicitly named file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &json)
    }

    fn parse(path: &Path, json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn auto_capture_delay(&self) -> Duration {
        Duration::from_millis(self.auto_capture_delay_ms)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let c = &self.criteria;
        if self.sample_interval_ms == 0 {
            return Err(invalid("sample_interval_ms", "must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&c.eye_open_threshold) {
            return Err(invalid("eye_open_threshold", "must be between 0.0 and 1.0"));
        }
        if c.min_face_size < 0.0 {
            return Err(invalid("min_face_size", "must not be negative"));
        }
        if !(0.0..=180.0).contains(&c.max_rotation_deg) {
            return Err(invalid("max_rotation_deg", "must be between 0 and 180"));
        }
        for (name, tolerance) in [
            ("center_tolerance", c.center_tolerance),
            ("checklist_center_tolerance", c.checklist_center_tolerance),
        ] {
            if !(0.0..0.5).contains(&tolerance) {
                return Err(invalid(name, "must be at least 0.0 and below 0.5"));
            }
        }
        if c.reference_frame.width <= 0.0 || c.reference_frame.height <= 0.0 {
            return Err(invalid("reference_frame", "dimensions must be positive"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: &str) -> SettingsError {
    SettingsError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_core_constants() {
        let s = Settings::default();
        assert_eq!(s.sample_interval(), SAMPLE_INTERVAL);
        assert_eq!(s.auto_capture_delay(), AUTO_CAPTURE_DELAY);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load_or_default(&dir.path().join("settings.json")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load_from(&dir.path().join("settings.json"));
        assert!(matches!(err, Err(SettingsError::Read { .. })));
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "auto_capture_delay_ms": 3000, "criteria": { "min_face_size": 80.0 } }"#)
            .unwrap();

        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.auto_capture_delay(), Duration::from_millis(3000));
        assert_eq!(s.sample_interval(), SAMPLE_INTERVAL);
        assert_eq!(s.criteria.min_face_size, 80.0);
        assert_eq!(s.criteria.eye_open_threshold, 0.5);
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Settings::load_or_default(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FaceEnroll").join("settings.json");
        let mut s = Settings::default();
        s.sample_interval_ms = 250;
        s.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), s);
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut s = Settings::default();
        s.sample_interval_ms = 0;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.criteria.eye_open_threshold = 1.5;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.criteria.center_tolerance = 0.5;
        assert!(matches!(
            s.validate(),
            Err(SettingsError::Invalid {
                name: "center_tolerance",
                ..
            })
        ));
    }
}
