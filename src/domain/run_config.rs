//! Run configuration, validated up front before any work starts.

use crate::domain::error::BarcrossError;
use crate::domain::session::{Interval, IntervalUnit, Session, parse_session_time};
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;

pub const DEFAULT_TICK_DIR: &str = "input/price_tick";
pub const DEFAULT_CACHE_DIR: &str = "input/K_line";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub tick_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    pub session: Session,
    pub interval: Interval,
    /// Empty means every instrument found under `tick_dir`.
    pub instruments: Vec<String>,
    /// 0 means one worker per available core.
    pub workers: usize,
    pub strategies: Vec<(String, StrategyConfig)>,
}

impl RunConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BarcrossError> {
        Ok(Self {
            tick_dir: read_dir(config, "tick_dir", DEFAULT_TICK_DIR),
            cache_dir: read_dir(config, "cache_dir", DEFAULT_CACHE_DIR),
            output_dir: read_dir(config, "output_dir", DEFAULT_OUTPUT_DIR),
            session: read_session(config)?,
            interval: read_interval(config)?,
            instruments: read_instruments(config),
            workers: read_workers(config)?,
            strategies: StrategyConfig::all_from_config(config)?,
        })
    }

    pub fn strategy(&self, label: &str) -> Result<&StrategyConfig, BarcrossError> {
        self.strategies
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, cfg)| cfg)
            .ok_or_else(|| BarcrossError::ConfigMissing {
                section: format!("strategy.{label}"),
                key: "kind".to_string(),
            })
    }
}

fn read_dir(config: &dyn ConfigPort, key: &str, default: &str) -> PathBuf {
    config
        .get_string("data", key)
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(s.trim()))
        .unwrap_or_else(|| PathBuf::from(default))
}

fn read_session(config: &dyn ConfigPort) -> Result<Session, BarcrossError> {
    let defaults = Session::default();
    let read = |key: &str, default| match config.get_string("session", key) {
        None => Ok(default),
        Some(raw) => parse_session_time(&raw)
            .map_err(|e| BarcrossError::invalid("session", key, e.to_string())),
    };
    Session::new(read("open", defaults.open)?, read("close", defaults.close)?)
}

fn read_interval(config: &dyn ConfigPort) -> Result<Interval, BarcrossError> {
    let width = match config.get_string("bars", "width") {
        None => 1,
        Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
            BarcrossError::invalid(
                "bars",
                "width",
                format!("{:?} is not a positive integer", raw.trim()),
            )
        })?,
    };
    let unit: IntervalUnit = config
        .get_string("bars", "unit")
        .as_deref()
        .unwrap_or("D")
        .parse()?;
    Interval::new(width, unit)
}

fn read_instruments(config: &dyn ConfigPort) -> Vec<String> {
    config
        .get_string("sweep", "instruments")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn read_workers(config: &dyn ConfigPort) -> Result<usize, BarcrossError> {
    match config.get_string("sweep", "workers") {
        None => Ok(0),
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
            BarcrossError::invalid(
                "sweep",
                "workers",
                format!("{:?} is not a non-negative integer", raw.trim()),
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use crate::domain::indicator::MaKind;
    use chrono::NaiveTime;

    fn load(content: &str) -> Result<RunConfig, BarcrossError> {
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        RunConfig::from_config(&adapter)
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = load("").unwrap();
        assert_eq!(cfg.tick_dir, PathBuf::from(DEFAULT_TICK_DIR));
        assert_eq!(cfg.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));
        assert_eq!(cfg.session, Session::default());
        assert_eq!(cfg.interval, Interval::new(1, IntervalUnit::Day).unwrap());
        assert!(cfg.instruments.is_empty());
        assert_eq!(cfg.workers, 0);
        assert!(cfg.strategies.is_empty());
    }

    #[test]
    fn full_config_is_parsed() {
        let cfg = load(
            "[data]\ntick_dir = ticks\ncache_dir = bars\noutput_dir = out\n\
             [session]\nopen = 08:45\nclose = 13:45:00\n\
             [bars]\nwidth = 15\nunit = min\n\
             [sweep]\ninstruments = 2330, 2317 ,\nworkers = 3\n\
             [strategy.fast]\nkind = dmac\nma_type = SMA\n",
        )
        .unwrap();
        assert_eq!(cfg.tick_dir, PathBuf::from("ticks"));
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.session.open, NaiveTime::from_hms_opt(8, 45, 0).unwrap());
        assert_eq!(cfg.interval, Interval::new(15, IntervalUnit::Minute).unwrap());
        assert_eq!(cfg.instruments, vec!["2330", "2317"]);
        assert_eq!(cfg.workers, 3);
        assert_eq!(
            cfg.strategy("fast").unwrap(),
            &StrategyConfig::DualMaCross {
                ma: MaKind::Simple,
                fast_period: 5,
                slow_period: 20,
            }
        );
    }

    #[test]
    fn zero_width_is_invalid() {
        let err = load("[bars]\nwidth = 0\n").unwrap_err();
        assert!(matches!(err, BarcrossError::ConfigInvalid { .. }));
    }

    #[test]
    fn unknown_unit_is_unsupported() {
        let err = load("[bars]\nunit = fortnight\n").unwrap_err();
        assert!(matches!(err, BarcrossError::UnsupportedConfig { .. }));
    }

    #[test]
    fn malformed_session_time_is_invalid() {
        let err = load("[session]\nopen = nine\n").unwrap_err();
        assert!(matches!(err, BarcrossError::ConfigInvalid { .. }));
    }

    #[test]
    fn inverted_session_is_invalid() {
        let err = load("[session]\nopen = 14:00\nclose = 09:00\n").unwrap_err();
        assert!(matches!(err, BarcrossError::ConfigInvalid { .. }));
    }

    #[test]
    fn unknown_strategy_label_is_missing() {
        let cfg = load("").unwrap();
        assert!(matches!(
            cfg.strategy("nope").unwrap_err(),
            BarcrossError::ConfigMissing { .. }
        ));
    }

    #[test]
    fn malformed_workers_is_invalid() {
        let err = load("[sweep]\nworkers = many\n").unwrap_err();
        assert!(matches!(err, BarcrossError::ConfigInvalid { .. }));
    }

    /// Strings and section names are all a config source has to provide.
    struct PairsConfig(Vec<(&'static str, &'static str, &'static str)>);

    impl ConfigPort for PairsConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0
                .iter()
                .find(|(s, k, _)| *s == section && *k == key)
                .map(|(_, _, v)| v.to_string())
        }

        fn sections(&self) -> Vec<String> {
            let mut names: Vec<String> = Vec::new();
            for (s, _, _) in &self.0 {
                if !names.iter().any(|n| n == s) {
                    names.push(s.to_string());
                }
            }
            names
        }
    }

    #[test]
    fn reads_from_any_string_config_source() {
        let config = PairsConfig(vec![
            ("bars", "width", "30"),
            ("bars", "unit", "s"),
            ("sweep", "workers", "2"),
            ("strategy.slope", "kind", "smas"),
            ("strategy.slope", "thresh", "-0.1"),
        ]);

        let cfg = RunConfig::from_config(&config).unwrap();

        assert_eq!(cfg.interval, Interval::new(30, IntervalUnit::Second).unwrap());
        assert_eq!(cfg.workers, 2);
        assert!(matches!(
            cfg.strategy("slope").unwrap(),
            StrategyConfig::SlopeThreshold { threshold, .. } if *threshold == -0.1
        ));
    }
}
