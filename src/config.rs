use std::env;
use std::path::PathBuf;

use log::LevelFilter;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MOVES_CSV: &str = "data/moves_ja.csv";

/// Server settings, taken from the command line and environment
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_addr: String,
    pub moves_csv: PathBuf,
    /// Cookie signing secret; a fresh key is generated per process when absent
    pub session_secret: Option<Vec<u8>>,
    pub secure_cookies: bool,
    pub log_level: LevelFilter,
}

fn parse_flag(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "yes" || lower == "true" || lower == "1"
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::from_sources(&args, |key| env::var(key).ok())
    }

    /// `args` excludes the program name. The first positional argument wins
    /// over `PORT`.
    pub fn from_sources<F>(args: &[String], var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match args.first().cloned().or_else(|| var("PORT")) {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) => port,
                Err(_) => return Err(ConfigError::InvalidPort(raw)),
            },
            None => DEFAULT_PORT,
        };

        let session_secret = match var("SESSION_SECRET") {
            Some(secret) if secret.len() < 64 => {
                return Err(ConfigError::SessionSecretTooShort(secret.len()))
            }
            Some(secret) => Some(secret.into_bytes()),
            None => None,
        };

        let log_level = match var("LOG_LEVEL") {
            Some(raw) => match raw.trim().parse::<LevelFilter>() {
                Ok(level) => level,
                Err(_) => return Err(ConfigError::InvalidLogLevel(raw)),
            },
            None => LevelFilter::Info,
        };

        Ok(Config {
            port,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            moves_csv: var("MOVES_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MOVES_CSV)),
            session_secret,
            secure_cookies: var("SECURE_COOKIES").map(|v| parse_flag(&v)).unwrap_or(false),
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(args: &[&str], vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_sources(&args, |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[], &[]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.moves_csv, PathBuf::from(DEFAULT_MOVES_CSV));
        assert!(config.session_secret.is_none());
        assert!(!config.secure_cookies);
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn argument_port_wins_over_env() {
        assert_eq!(config(&["9000"], &[("PORT", "9100")]).unwrap().port, 9000);
        assert_eq!(config(&[], &[("PORT", "9100")]).unwrap().port, 9100);
        assert!(matches!(config(&["web"], &[]), Err(ConfigError::InvalidPort(p)) if p == "web"));
    }

    #[test]
    fn environment_overrides() {
        let secret = "s".repeat(64);
        let config = config(
            &[],
            &[
                ("MOVES_CSV", "/srv/moves.csv"),
                ("SESSION_SECRET", secret.as_str()),
                ("SECURE_COOKIES", "Yes"),
                ("LOG_LEVEL", "debug"),
                ("BIND_ADDR", "127.0.0.1"),
            ],
        )
        .unwrap();

        assert_eq!(config.moves_csv, PathBuf::from("/srv/moves.csv"));
        assert_eq!(config.session_secret.as_deref(), Some(secret.as_bytes()));
        assert!(config.secure_cookies);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.bind_addr, "127.0.0.1");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[], &[("SESSION_SECRET", "short")]),
            Err(ConfigError::SessionSecretTooShort(5))
        ));
        assert!(matches!(
            config(&[], &[("LOG_LEVEL", "loud")]),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}
