use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub solver_time_limit: Duration,
    pub solver_max_in_flight: usize,
    pub max_variables: usize,
    pub body_limit_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_level: "info".into(),
            solver_time_limit: Duration::from_secs(60),
            solver_max_in_flight: solver_milp::DEFAULT_MAX_IN_FLIGHT,
            max_variables: sched_core::DEFAULT_MAX_VARIABLES,
            body_limit_bytes: 2 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let host = lookup("UNISCHEDULE__SERVER__HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = lookup("UNISCHEDULE__SERVER__PORT").unwrap_or_else(|| "8080".into());
        let listen_addr = format!("{host}:{port}")
            .parse()
            .with_context(|| format!("invalid listen address {host}:{port}"))?;

        let log_level = lookup("UNISCHEDULE__LOG").unwrap_or(defaults.log_level);

        let solver_time_limit = match lookup("UNISCHEDULE__SOLVER__TIME_LIMIT_SECS") {
            Some(v) => Duration::from_secs(
                v.parse()
                    .with_context(|| format!("invalid UNISCHEDULE__SOLVER__TIME_LIMIT_SECS: {v}"))?,
            ),
            None => defaults.solver_time_limit,
        };

        let solver_max_in_flight = match lookup("UNISCHEDULE__SOLVER__MAX_IN_FLIGHT") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid UNISCHEDULE__SOLVER__MAX_IN_FLIGHT: {v}"))?,
            None => defaults.solver_max_in_flight,
        };

        let max_variables = match lookup("UNISCHEDULE__SOLVER__MAX_VARIABLES") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid UNISCHEDULE__SOLVER__MAX_VARIABLES: {v}"))?,
            None => defaults.max_variables,
        };

        let body_limit_bytes = match lookup("UNISCHEDULE__SERVER__BODY_LIMIT_BYTES") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid UNISCHEDULE__SERVER__BODY_LIMIT_BYTES: {v}"))?,
            None => defaults.body_limit_bytes,
        };

        Ok(Self {
            listen_addr,
            log_level,
            solver_time_limit,
            solver_max_in_flight,
            max_variables,
            body_limit_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.listen_addr.port(), 8080);
        assert_eq!(cfg.solver_time_limit, Duration::from_secs(60));
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.solver_max_in_flight, 4);
        assert_eq!(cfg.max_variables, 2_000_000);
    }

    #[test]
    fn env_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("UNISCHEDULE__SERVER__HOST", "127.0.0.1"),
            ("UNISCHEDULE__SERVER__PORT", "5000"),
            ("UNISCHEDULE__SOLVER__TIME_LIMIT_SECS", "5"),
            ("UNISCHEDULE__LOG", "debug"),
            ("UNISCHEDULE__SOLVER__MAX_IN_FLIGHT", "2"),
            ("UNISCHEDULE__SOLVER__MAX_VARIABLES", "10000"),
        ]))
        .unwrap();
        assert_eq!(cfg.solver_max_in_flight, 2);
        assert_eq!(cfg.max_variables, 10_000);
        assert_eq!(cfg.listen_addr.to_string(), "127.0.0.1:5000");
        assert_eq!(cfg.solver_time_limit, Duration::from_secs(5));
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn bad_values_fail() {
        assert!(Config::from_lookup(lookup(&[("UNISCHEDULE__SERVER__PORT", "http")])).is_err());
        assert!(
            Config::from_lookup(lookup(&[("UNISCHEDULE__SOLVER__TIME_LIMIT_SECS", "-1")])).is_err()
        );
    }
}
