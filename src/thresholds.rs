//! Warning and critical limits for each metric family
//!
//! Every family has a warning and a critical [`Threshold`], and every
//! threshold has two independent slots: an absolute limit (in processors)
//! and a percentage limit. A slot holding zero is not monitored.
//!
//! Limits are given on the command line as either `2.5` or `80%`, and a slot
//! may be filled at most once.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::checks::Family;

/// Which of a family's two thresholds a limit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Warning,
    Critical,
}

/// A single limit, as given on the command line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    /// An amount of processors, e.g. `2.5`
    Absolute(f64),
    /// A share of some capacity, e.g. `80%`
    Percent(i64),
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Limit::Absolute(v) => write!(f, "{:.1}", v),
            Limit::Percent(p) => write!(f, "{}%", p),
        }
    }
}

lazy_static! {
    static ref PERCENT: Regex = Regex::new(r"^([+-]?\d+)%$").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimitParseError(String);

impl fmt::Display for LimitParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid limit '{}': expected a number like 2.5 or an integer percentage like 80%",
            self.0
        )
    }
}

impl FromStr for Limit {
    type Err = LimitParseError;

    fn from_str(s: &str) -> Result<Limit, LimitParseError> {
        let s = s.trim();
        let invalid = || LimitParseError(s.to_string());
        if s.ends_with('%') {
            let caps = PERCENT.captures(s).ok_or_else(invalid)?;
            let pct = caps[1].parse().map_err(|_| invalid())?;
            Ok(Limit::Percent(pct))
        } else {
            let value: f64 = s.parse().map_err(|_| invalid())?;
            if !value.is_finite() {
                return Err(invalid());
            }
            Ok(Limit::Absolute(value))
        }
    }
}

/// Cut an absolute limit down to one decimal digit
///
/// Truncates rather than rounds: `3.17` and `3.19` both become `3.1`.
pub fn truncate_tenths(value: f64) -> f64 {
    (value * 10.0).trunc() / 10.0
}

/// One severity level's limits for a family
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Threshold {
    /// Limit in processors, `0.0` when not monitored
    pub absolute: f64,
    /// Limit in percent of the family's capacity, `0` when not monitored
    pub percent: u32,
}

impl Threshold {
    pub fn is_set(&self) -> bool {
        self.absolute != 0.0 || self.percent != 0
    }
}

/// The warning and critical thresholds of one family
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Limits {
    pub warning: Threshold,
    pub critical: Threshold,
}

impl Limits {
    pub fn get(&self, level: Level) -> &Threshold {
        match level {
            Level::Warning => &self.warning,
            Level::Critical => &self.critical,
        }
    }

    fn get_mut(&mut self, level: Level) -> &mut Threshold {
        match level {
            Level::Warning => &mut self.warning,
            Level::Critical => &mut self.critical,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.warning.is_set() || self.critical.is_set()
    }
}

/// Mistakes in the check configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The same slot was given twice
    Duplicate { flag: &'static str, previous: Limit },
    /// A percentage outside of what the family allows
    PercentOutOfRange {
        flag: &'static str,
        given: i64,
        max: u32,
    },
    /// An absolute limit that is zero, negative, or too small to survive truncation
    NotPositive { flag: &'static str, given: f64 },
    /// An absolute limit for a family that only takes percentages
    PercentOnly {
        flag: &'static str,
        given: f64,
        max: u32,
    },
    /// Interval outside of 1..=30 seconds
    Interval(u64),
    /// No threshold at all, listing the flags that could have been used
    NothingToCheck(Vec<&'static str>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::ConfigError::*;
        match self {
            Duplicate { flag, previous } => write!(
                f,
                "--{} already set to {}! Don't specify more than once!",
                flag, previous
            ),
            PercentOutOfRange { flag, given, max } => write!(
                f,
                "--{} {}% out of range! Allowed 1%..{}%",
                flag, given, max
            ),
            NotPositive { flag, given } => {
                write!(f, "--{} {} out of range: Argument has to be >0 !", flag, given)
            }
            PercentOnly { flag, given, max } => write!(
                f,
                "--{} {} out of range: Allowed 1%..{}%",
                flag, given, max
            ),
            Interval(secs) => write!(
                f,
                "Interval out of range: {}! Allowed range is 1..30!",
                secs
            ),
            NothingToCheck(flags) => {
                let flags: Vec<String> = flags.iter().map(|fl| format!("--{}", fl)).collect();
                write!(f, "Specify at least one option {}", flags.join(", "))
            }
        }
    }
}

/// The resolved limits for all families
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Thresholds {
    limits: [Limits; 6],
}

impl Thresholds {
    pub fn new() -> Thresholds {
        Thresholds::default()
    }

    pub fn family(&self, family: Family) -> &Limits {
        &self.limits[family.index()]
    }

    /// Fill one slot, validating the limit against the family's rules
    pub fn set(&mut self, family: Family, level: Level, limit: Limit) -> Result<(), ConfigError> {
        let flag = family.flag(level);
        let max = family.percent_max();
        let threshold = self.limits[family.index()].get_mut(level);
        match limit {
            Limit::Percent(pct) => {
                if threshold.percent != 0 {
                    return Err(ConfigError::Duplicate {
                        flag,
                        previous: Limit::Percent(i64::from(threshold.percent)),
                    });
                }
                if pct < 1 || pct > i64::from(max) {
                    return Err(ConfigError::PercentOutOfRange {
                        flag,
                        given: pct,
                        max,
                    });
                }
                threshold.percent = pct as u32;
            }
            Limit::Absolute(value) => {
                if !family.accepts_absolute() {
                    return Err(ConfigError::PercentOnly {
                        flag,
                        given: value,
                        max,
                    });
                }
                if threshold.absolute != 0.0 {
                    return Err(ConfigError::Duplicate {
                        flag,
                        previous: Limit::Absolute(threshold.absolute),
                    });
                }
                let truncated = truncate_tenths(value);
                if truncated <= 0.0 {
                    return Err(ConfigError::NotPositive { flag, given: value });
                }
                threshold.absolute = truncated;
            }
        }
        Ok(())
    }

    pub fn is_configured(&self, family: Family) -> bool {
        self.family(family).is_configured()
    }

    pub fn any_configured(&self) -> bool {
        Family::ALL.iter().any(|f| self.is_configured(*f))
    }

    /// Whether any pool family has a threshold
    pub fn pool_requested(&self) -> bool {
        Family::ALL
            .iter()
            .filter(|f| f.is_pool())
            .any(|f| self.is_configured(*f))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::checks::Family::*;

    #[test]
    fn parses_limits() {
        assert_eq!("2.5".parse::<Limit>(), Ok(Limit::Absolute(2.5)));
        assert_eq!(" 80% ".parse::<Limit>(), Ok(Limit::Percent(80)));
        assert_eq!("-3%".parse::<Limit>(), Ok(Limit::Percent(-3)));
        assert_eq!("0".parse::<Limit>(), Ok(Limit::Absolute(0.0)));
    }

    #[test]
    fn rejects_garbage_limits() {
        for bad in &["", "abc", "2.5x", "12.5%", "%", "80%%", "inf", "NaN"] {
            assert!(bad.parse::<Limit>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn truncates_to_one_decimal() {
        assert_eq!(truncate_tenths(3.17), 3.1);
        assert_eq!(truncate_tenths(3.19), 3.1);
        assert_eq!(truncate_tenths(2.0), 2.0);
    }

    #[test]
    fn absolute_and_percent_share_a_threshold() {
        let mut t = Thresholds::new();
        t.set(Entitlement, Level::Critical, Limit::Absolute(3.17)).unwrap();
        t.set(Entitlement, Level::Critical, Limit::Percent(200)).unwrap();
        assert_eq!(
            t.family(Entitlement).critical,
            Threshold {
                absolute: 3.1,
                percent: 200,
            }
        );
        assert!(!t.family(Entitlement).warning.is_set());
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut t = Thresholds::new();
        t.set(Entitlement, Level::Critical, Limit::Percent(200)).unwrap();
        let err = t
            .set(Entitlement, Level::Critical, Limit::Percent(150))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "--ec already set to 200%! Don't specify more than once!"
        );

        t.set(Pool, Level::Warning, Limit::Absolute(1.5)).unwrap();
        assert_eq!(
            t.set(Pool, Level::Warning, Limit::Absolute(2.0)),
            Err(ConfigError::Duplicate {
                flag: "pw",
                previous: Limit::Absolute(1.5),
            })
        );

        t.set(Pool, Level::Critical, Limit::Absolute(2.0)).unwrap();
        let err = t
            .set(Pool, Level::Critical, Limit::Absolute(3.0))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "--pc already set to 2.0! Don't specify more than once!"
        );
    }

    #[test]
    fn percent_ranges_depend_on_family() {
        let mut t = Thresholds::new();
        assert!(t.set(Entitlement, Level::Warning, Limit::Percent(2000)).is_ok());
        assert_eq!(
            t.set(Entitlement, Level::Critical, Limit::Percent(2001)),
            Err(ConfigError::PercentOutOfRange {
                flag: "ec",
                given: 2001,
                max: 2000,
            })
        );
        assert!(t.set(PoolFree, Level::Warning, Limit::Percent(101)).is_err());
        assert!(t.set(SystemPool, Level::Warning, Limit::Percent(0)).is_err());
        assert!(t.set(SystemPool, Level::Warning, Limit::Percent(100)).is_ok());
    }

    #[test]
    fn absolute_must_be_positive() {
        let mut t = Thresholds::new();
        assert_eq!(
            t.set(Pool, Level::Critical, Limit::Absolute(0.0)),
            Err(ConfigError::NotPositive {
                flag: "pc",
                given: 0.0,
            })
        );
        assert_eq!(
            t.set(Pool, Level::Warning, Limit::Absolute(0.0))
                .unwrap_err()
                .to_string(),
            "--pw 0 out of range: Argument has to be >0 !"
        );
        assert!(t.set(Pool, Level::Critical, Limit::Absolute(-2.0)).is_err());
        // would silently disable the slot after truncation
        assert!(t.set(Pool, Level::Critical, Limit::Absolute(0.05)).is_err());
        assert!(!t.any_configured());
    }

    #[test]
    fn vcpu_busy_takes_percent_only() {
        let mut t = Thresholds::new();
        let err = t.set(VcpuBusy, Level::Warning, Limit::Absolute(3.0)).unwrap_err();
        assert_eq!(err.to_string(), "--vbw 3 out of range: Allowed 1%..100%");
        assert!(t.set(VcpuBusy, Level::Warning, Limit::Percent(90)).is_ok());
    }

    #[test]
    fn pool_requested_only_for_pool_families() {
        let mut t = Thresholds::new();
        t.set(VcpuBusy, Level::Critical, Limit::Percent(95)).unwrap();
        assert!(t.any_configured());
        assert!(!t.pool_requested());

        t.set(SystemPoolFree, Level::Warning, Limit::Absolute(1.0)).unwrap();
        assert!(t.pool_requested());
    }

    #[test]
    fn nothing_to_check_lists_flags() {
        let err = ConfigError::NothingToCheck(vec!["ew", "ec"]);
        assert_eq!(err.to_string(), "Specify at least one option --ew, --ec");
        assert_eq!(
            ConfigError::Interval(45).to_string(),
            "Interval out of range: 45! Allowed range is 1..30!"
        );
    }
}
