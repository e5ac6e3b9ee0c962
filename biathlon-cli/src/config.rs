//! Configuration loading

use anyhow::{Context, Result};
use biathlon_engine::RaceConfig;
use std::fs;
use std::path::Path;

/// Load and validate the race configuration from a JSON file
pub fn load_config(path: &Path) -> Result<RaceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: RaceConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    if config.start_tolerance().is_err() {
        log::warn!(
            "startDelta {:?} is not HH:MM:SS; no competitor will be disqualified",
            config.start_delta
        );
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config() {
        let file = write_config(
            r#"{
                "laps": 2,
                "lapLen": 3651,
                "penaltyLen": 50,
                "firingLines": 1,
                "start": "09:30:00.000",
                "startDelta": "00:00:30"
            }"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.laps, 2);
        assert_eq!(config.start, "09:30:00.000");
    }

    #[test]
    fn test_load_config_rejects_zero_laps() {
        let file = write_config(
            r#"{ "laps": 0, "lapLen": 3651, "penaltyLen": 50, "start": "09:30:00.000", "startDelta": "00:00:30" }"#,
        );
        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("laps must be at least 1"));
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Path::new("/nonexistent/config.json")).is_err());
    }
}
