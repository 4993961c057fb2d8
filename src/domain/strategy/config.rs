//! Strategy configuration: one closed variant per strategy kind.
//!
//! Read from a `[strategy.<label>]` section. A section may expand into a grid
//! of units: `ma_type` takes a comma list, and a GMMA section may name period
//! groups through `short_groups` / `long_groups`. Group names resolve against
//! the `[groups]` section first, then the built-in `s1`-`s3` / `l1`-`l3`.
//!
//! ```ini
//! [groups]
//! s4 = 2,4,6
//!
//! [strategy.gmma]
//! kind = gmma
//! ma_type = SMA,EMA,WMA
//! short_groups = S1,S2,S3
//! long_groups = L1,L2,L3
//! ```
//!
//! The section above yields 27 units labelled `gmma_sma_s1l1` through
//! `gmma_wma_s3l3`. The MA tag is only added when `ma_type` lists more than
//! one kind; the group tag only when groups are named.

use crate::domain::error::BarcrossError;
use crate::domain::indicator::MaKind;
use crate::domain::strategy::{
    DualMaCross, MultiGroupMaCross, SignalStrategy, SingleMaCross, SlopeMethod, SlopeThreshold,
    TripleMaCross,
};
use crate::ports::config_port::ConfigPort;
use std::collections::HashSet;

pub const STRATEGY_SECTION_PREFIX: &str = "strategy.";
pub const GROUPS_SECTION: &str = "groups";

const DEFAULT_SHORT_GROUP: &[usize] = &[3, 5, 8, 10, 12, 15];
const DEFAULT_LONG_GROUP: &[usize] = &[30, 35, 40, 45, 50, 60];

/// Named period groups available without a `[groups]` section.
const BUILTIN_GROUPS: &[(&str, &[usize])] = &[
    ("s1", DEFAULT_SHORT_GROUP),
    ("s2", &[5, 7, 9, 11, 13, 15]),
    ("s3", &[1, 2, 3, 5, 7, 9]),
    ("l1", DEFAULT_LONG_GROUP),
    ("l2", &[21, 24, 27, 30, 33, 36]),
    ("l3", &[60, 65, 70, 75, 80, 85]),
];

/// One choice along a group axis: the tag it adds to the label (empty for
/// inline periods) and its periods.
type GroupChoice = (String, Vec<usize>);

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyConfig {
    SingleMaCross {
        ma: MaKind,
        period: usize,
    },
    DualMaCross {
        ma: MaKind,
        fast_period: usize,
        slow_period: usize,
    },
    TripleMaCross {
        ma: MaKind,
        short_period: usize,
        mid_period: usize,
        long_period: usize,
    },
    MultiGroup {
        ma: MaKind,
        short_periods: Vec<usize>,
        long_periods: Vec<usize>,
    },
    SlopeThreshold {
        ma: MaKind,
        ma_period: usize,
        slope_period: usize,
        method: SlopeMethod,
        threshold: f64,
    },
}

impl StrategyConfig {
    /// Parse and validate a section that describes exactly one strategy.
    pub fn from_config(config: &dyn ConfigPort, section: &str) -> Result<Self, BarcrossError> {
        let mut units = Self::expand(config, section, section)?;
        match units.len() {
            1 => Ok(units.remove(0).1),
            n => Err(BarcrossError::invalid(
                section,
                "ma_type",
                format!("section expands to {n} strategies, expected one"),
            )),
        }
    }

    /// Parse one section into its labelled units, in grid order: MA kind,
    /// then short group, then long group.
    pub fn expand(
        config: &dyn ConfigPort,
        section: &str,
        label: &str,
    ) -> Result<Vec<(String, Self)>, BarcrossError> {
        let kind = config
            .get_string(section, "kind")
            .map(|k| k.trim().to_ascii_lowercase())
            .ok_or_else(|| BarcrossError::ConfigMissing {
                section: section.to_string(),
                key: "kind".to_string(),
            })?;
        let kinds = read_ma_kinds(config, section)?;
        let grid = match kind.as_str() {
            "gmma" | "multi_group" => Some((
                read_group_choices(config, section, "short", DEFAULT_SHORT_GROUP)?,
                read_group_choices(config, section, "long", DEFAULT_LONG_GROUP)?,
            )),
            _ => None,
        };

        let mut units = Vec::new();
        for &ma in &kinds {
            let ma_tag = if kinds.len() > 1 {
                ma.to_string().to_ascii_lowercase()
            } else {
                String::new()
            };
            let Some((shorts, longs)) = &grid else {
                let parsed = Self::single(config, section, &kind, ma)?;
                units.push((unit_label(label, &[ma_tag.as_str()]), parsed));
                continue;
            };
            for (short_tag, short_periods) in shorts {
                for (long_tag, long_periods) in longs {
                    let group_tag = format!("{short_tag}{long_tag}");
                    units.push((
                        unit_label(label, &[ma_tag.as_str(), group_tag.as_str()]),
                        StrategyConfig::MultiGroup {
                            ma,
                            short_periods: short_periods.clone(),
                            long_periods: long_periods.clone(),
                        },
                    ));
                }
            }
        }
        Ok(units)
    }

    fn single(
        config: &dyn ConfigPort,
        section: &str,
        kind: &str,
        ma: MaKind,
    ) -> Result<Self, BarcrossError> {
        let parsed = match kind {
            "smac" | "single_ma_cross" => StrategyConfig::SingleMaCross {
                ma,
                period: read_period(config, section, "period", 5)?,
            },
            "dmac" | "dual_ma_cross" => StrategyConfig::DualMaCross {
                ma,
                fast_period: read_period(config, section, "fast_period", 5)?,
                slow_period: read_period(config, section, "slow_period", 20)?,
            },
            "tmac" | "triple_ma_cross" => StrategyConfig::TripleMaCross {
                ma,
                short_period: read_period(config, section, "short_period", 5)?,
                mid_period: read_period(config, section, "mid_period", 20)?,
                long_period: read_period(config, section, "long_period", 60)?,
            },
            "smas" | "slope_threshold" => StrategyConfig::SlopeThreshold {
                ma,
                ma_period: read_period(config, section, "ma_period", 20)?,
                slope_period: read_period(config, section, "slope_period", 5)?,
                method: config
                    .get_string(section, "method")
                    .as_deref()
                    .unwrap_or("M1")
                    .parse()?,
                threshold: read_threshold(config, section)?,
            },
            other => return Err(BarcrossError::unsupported("strategy kind", other)),
        };
        Ok(parsed)
    }

    /// Every unit of every `[strategy.<label>]` section, in file order.
    /// Two units sharing a label is a configuration error.
    pub fn all_from_config(
        config: &dyn ConfigPort,
    ) -> Result<Vec<(String, StrategyConfig)>, BarcrossError> {
        let mut units = Vec::new();
        let mut seen = HashSet::new();
        for section in config.sections() {
            let Some(label) = section.strip_prefix(STRATEGY_SECTION_PREFIX) else {
                continue;
            };
            for (unit, parsed) in Self::expand(config, &section, label)? {
                if !seen.insert(unit.clone()) {
                    return Err(BarcrossError::invalid(
                        &section,
                        "kind",
                        format!("strategy label {unit:?} is defined twice"),
                    ));
                }
                units.push((unit, parsed));
            }
        }
        Ok(units)
    }

    pub fn build(&self) -> Box<dyn SignalStrategy> {
        match self.clone() {
            StrategyConfig::SingleMaCross { ma, period } => {
                Box::new(SingleMaCross::new(ma, period))
            }
            StrategyConfig::DualMaCross {
                ma,
                fast_period,
                slow_period,
            } => Box::new(DualMaCross::new(ma, fast_period, slow_period)),
            StrategyConfig::TripleMaCross {
                ma,
                short_period,
                mid_period,
                long_period,
            } => Box::new(TripleMaCross::new(ma, short_period, mid_period, long_period)),
            StrategyConfig::MultiGroup {
                ma,
                short_periods,
                long_periods,
            } => Box::new(MultiGroupMaCross::new(ma, short_periods, long_periods)),
            StrategyConfig::SlopeThreshold {
                ma,
                ma_period,
                slope_period,
                method,
                threshold,
            } => Box::new(SlopeThreshold::new(
                ma,
                ma_period,
                slope_period,
                method,
                threshold,
            )),
        }
    }
}

fn unit_label(label: &str, tags: &[&str]) -> String {
    tags.iter()
        .filter(|tag| !tag.is_empty())
        .fold(label.to_string(), |acc, tag| format!("{acc}_{tag}"))
}

fn read_ma_kinds(config: &dyn ConfigPort, section: &str) -> Result<Vec<MaKind>, BarcrossError> {
    let raw = config
        .get_string(section, "ma_type")
        .unwrap_or_else(|| "EMA".to_string());
    let mut kinds = Vec::new();
    for name in raw.split(',') {
        if name.trim().is_empty() {
            return Err(BarcrossError::invalid(
                section,
                "ma_type",
                format!("{:?} has an empty entry", raw.trim()),
            ));
        }
        let kind: MaKind = name.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

/// Choices along one GMMA axis (`side` is `short` or `long`): the named
/// groups in `<side>_groups`, else the inline `<side>_periods`, else the
/// default group.
fn read_group_choices(
    config: &dyn ConfigPort,
    section: &str,
    side: &str,
    default: &[usize],
) -> Result<Vec<GroupChoice>, BarcrossError> {
    let groups_key = format!("{side}_groups");
    let Some(names) = config.get_string(section, &groups_key) else {
        let periods_key = format!("{side}_periods");
        let periods = read_group(config, section, &periods_key, default)?;
        return Ok(vec![(String::new(), periods)]);
    };

    let mut choices: Vec<GroupChoice> = Vec::new();
    for name in names.split(',') {
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(BarcrossError::invalid(
                section,
                &groups_key,
                format!("{:?} has an empty group name", names.trim()),
            ));
        }
        if choices.iter().any(|(tag, _)| *tag == name) {
            continue;
        }
        let periods = resolve_group(config, &name)?;
        choices.push((name, periods));
    }
    Ok(choices)
}

fn resolve_group(config: &dyn ConfigPort, name: &str) -> Result<Vec<usize>, BarcrossError> {
    if let Some(raw) = config.get_string(GROUPS_SECTION, name) {
        return parse_group(&raw)
            .map_err(|reason| BarcrossError::invalid(GROUPS_SECTION, name, reason));
    }
    BUILTIN_GROUPS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, periods)| periods.to_vec())
        .ok_or_else(|| BarcrossError::ConfigMissing {
            section: GROUPS_SECTION.to_string(),
            key: name.to_string(),
        })
}

fn read_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, BarcrossError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => {
            parse_period(&raw).map_err(|reason| BarcrossError::invalid(section, key, reason))
        }
    }
}

fn read_group(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: &[usize],
) -> Result<Vec<usize>, BarcrossError> {
    match config.get_string(section, key) {
        None => Ok(default.to_vec()),
        Some(raw) => {
            parse_group(&raw).map_err(|reason| BarcrossError::invalid(section, key, reason))
        }
    }
}

fn parse_group(raw: &str) -> Result<Vec<usize>, String> {
    let periods = raw
        .split(',')
        .map(parse_period)
        .collect::<Result<Vec<_>, _>>()?;
    if periods.is_empty() {
        return Err("group must not be empty".to_string());
    }
    Ok(periods)
}

fn parse_period(raw: &str) -> Result<usize, String> {
    let trimmed = raw.trim();
    match trimmed.parse::<usize>() {
        Ok(0) => Err("period must be positive".to_string()),
        Ok(p) => Ok(p),
        Err(_) => Err(format!("{trimmed:?} is not a positive integer")),
    }
}

/// Any finite value. A negative threshold makes the long and short bands
/// overlap; see `SlopeThreshold`.
fn read_threshold(config: &dyn ConfigPort, section: &str) -> Result<f64, BarcrossError> {
    let Some(raw) = config.get_string(section, "thresh") else {
        return Ok(0.0);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(BarcrossError::invalid(
            section,
            "thresh",
            format!("{:?} is not a finite number", raw.trim()),
        )),
    }
}
