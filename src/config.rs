use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;
pub const DEFAULT_COMPLETED_DAYS: u64 = 14;
pub const DEFAULT_UPCOMING_DAYS: u64 = 7;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// How far back and ahead the home listing reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeWindow {
    pub completed_days: u64,
    pub upcoming_days: u64,
}

impl Default for HomeWindow {
    fn default() -> Self {
        HomeWindow {
            completed_days: DEFAULT_COMPLETED_DAYS,
            upcoming_days: DEFAULT_UPCOMING_DAYS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL; `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub listen_addr: SocketAddr,
    pub max_connections: u32,
    pub home: HomeWindow,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let listen_addr = parse_or(&lookup, "LISTEN_ADDR", DEFAULT_LISTEN_ADDR.parse().ok())?;
        let max_connections =
            parse_or(&lookup, "DB_MAX_CONNECTIONS", Some(DEFAULT_MAX_CONNECTIONS))?;
        let completed_days =
            parse_or(&lookup, "HOME_COMPLETED_DAYS", Some(DEFAULT_COMPLETED_DAYS))?;
        let upcoming_days = parse_or(&lookup, "HOME_UPCOMING_DAYS", Some(DEFAULT_UPCOMING_DAYS))?;

        Ok(Config {
            database_url,
            listen_addr,
            max_connections,
            home: HomeWindow {
                completed_days,
                upcoming_days,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { var, value: raw }),
        None => default.ok_or(ConfigError::Invalid {
            var,
            value: String::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.home, HomeWindow::default());
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/surveys"),
            ("LISTEN_ADDR", "127.0.0.1:3000"),
            ("DB_MAX_CONNECTIONS", "5"),
            ("HOME_COMPLETED_DAYS", "30"),
            ("HOME_UPCOMING_DAYS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/surveys"));
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.home.completed_days, 30);
        assert_eq!(config.home.upcoming_days, 3);
    }

    #[test]
    fn bad_numbers_name_the_variable() {
        let err = Config::from_lookup(lookup_from(&[("HOME_UPCOMING_DAYS", "soon")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value \"soon\" for HOME_UPCOMING_DAYS");
    }
}
