//! Simple configuration persistence
//!
//! Stores the last-used session settings so the app restarts where the
//! user left off.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use entrain_audio::{Mode, SessionConfig};

/// Application configuration
#[derive(Debug, Default, PartialEq)]
pub struct AppConfig {
    /// Session settings from the previous run
    pub last_session: SessionConfig,
}

impl AppConfig {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = Self::config_path();
        Self::load_from(&path).unwrap_or_default()
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.serialize();
        fs::write(path, content)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("entrain")
            .join("config.txt")
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Self {
        let mut session = SessionConfig::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                match key {
                    "mode" => {
                        session.mode = match value {
                            "pure" => Mode::Pure,
                            "binaural" => Mode::Binaural,
                            _ => session.mode,
                        };
                    }
                    "carrier_hz" => {
                        if let Ok(v) = value.parse() {
                            session.carrier_hz = v;
                        }
                    }
                    "beat_hz" => {
                        if let Ok(v) = value.parse() {
                            session.beat_hz = v;
                        }
                    }
                    "volume" => {
                        if let Ok(v) = value.parse() {
                            session.volume = v;
                        }
                    }
                    "duration_secs" => {
                        if let Ok(v) = value.parse() {
                            session.duration_secs = v;
                        }
                    }
                    _ => {} // Ignore unknown keys
                }
            }
        }

        // Never hand back settings a session can't start with
        if session.validate().is_err() {
            session = SessionConfig::default();
        }

        Self {
            last_session: session,
        }
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let s = &self.last_session;
        [
            "# ENTRAIN Configuration".to_string(),
            format!("mode={}", s.mode.as_str()),
            format!("carrier_hz={}", s.carrier_hz),
            format!("beat_hz={}", s.beat_hz),
            format!("volume={}", s.volume),
            format!("duration_secs={}", s.duration_secs),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_gives_defaults() {
        let config = AppConfig::parse("");
        assert_eq!(config.last_session, SessionConfig::default());
    }

    #[test]
    fn test_parse_with_values() {
        let content = "# comment\nmode=pure\ncarrier_hz=432.5\nbeat_hz=6\nvolume=0.4\nduration_secs=900";
        let config = AppConfig::parse(content);
        assert_eq!(config.last_session.mode, Mode::Pure);
        assert_eq!(config.last_session.carrier_hz, 432.5);
        assert_eq!(config.last_session.beat_hz, 6.0);
        assert_eq!(config.last_session.volume, 0.4);
        assert_eq!(config.last_session.duration_secs, 900);
    }

    #[test]
    fn test_parse_rejects_invalid_session() {
        let config = AppConfig::parse("carrier_hz=-10");
        assert_eq!(config.last_session, SessionConfig::default());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = AppConfig {
            last_session: SessionConfig {
                mode: Mode::Binaural,
                carrier_hz: 639.0,
                beat_hz: 12.0,
                volume: 0.3,
                duration_secs: 900,
            },
        };

        let serialized = config.serialize();
        let parsed = AppConfig::parse(&serialized);
        assert_eq!(parsed, config);
    }
}
