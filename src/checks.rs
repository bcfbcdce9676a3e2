//! Classifying rates against thresholds, and folding the results
//!
//! Each metric family is checked once per slot (percentage, then absolute).
//! Every check's status is folded into the family's status and the run's
//! global status with [`max_state`].

use std::fmt;

use crate::thresholds::{Level, Limits};
use crate::{max_state, Status};

/// Which side of a limit is bad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Usage style metrics: alarm when above the limit
    ExceedsIsBad,
    /// Free capacity metrics: alarm when below the limit
    FallsBelowIsBad,
}

/// A group of related checks that share thresholds and a reported status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    Entitlement,
    VcpuBusy,
    Pool,
    PoolFree,
    SystemPool,
    SystemPoolFree,
}

/// Which slot of a threshold a check compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Percent,
    Absolute,
}

impl Family {
    pub const ALL: [Family; 6] = [
        Family::Entitlement,
        Family::VcpuBusy,
        Family::Pool,
        Family::PoolFree,
        Family::SystemPool,
        Family::SystemPoolFree,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn direction(self) -> Direction {
        match self {
            Family::PoolFree | Family::SystemPoolFree => Direction::FallsBelowIsBad,
            _ => Direction::ExceedsIsBad,
        }
    }

    /// Whether the family needs pool utilization data
    pub fn is_pool(self) -> bool {
        match self {
            Family::Entitlement | Family::VcpuBusy => false,
            _ => true,
        }
    }

    /// Highest allowed percentage limit
    ///
    /// A partition can consume far more than its entitlement, so entitlement
    /// percentages go up to 2000.
    pub fn percent_max(self) -> u32 {
        match self {
            Family::Entitlement => 2000,
            _ => 100,
        }
    }

    pub fn accepts_absolute(self) -> bool {
        self != Family::VcpuBusy
    }

    /// The slots that are checked, in order
    pub fn measures(self) -> &'static [Measure] {
        if self.accepts_absolute() {
            &[Measure::Percent, Measure::Absolute]
        } else {
            &[Measure::Percent]
        }
    }

    /// The command line flag for one of the family's thresholds
    pub fn flag(self, level: Level) -> &'static str {
        use self::Level::*;
        match (self, level) {
            (Family::Entitlement, Warning) => "ew",
            (Family::Entitlement, Critical) => "ec",
            (Family::VcpuBusy, Warning) => "vbw",
            (Family::VcpuBusy, Critical) => "vbc",
            (Family::Pool, Warning) => "pw",
            (Family::Pool, Critical) => "pc",
            (Family::PoolFree, Warning) => "pfw",
            (Family::PoolFree, Critical) => "pfc",
            (Family::SystemPool, Warning) => "sw",
            (Family::SystemPool, Critical) => "sc",
            (Family::SystemPoolFree, Warning) => "sfw",
            (Family::SystemPoolFree, Critical) => "sfc",
        }
    }

    /// Human readable name, used in verbose output
    pub fn label(self) -> &'static str {
        match self {
            Family::Entitlement => "Entitlement",
            Family::VcpuBusy => "vCPU busy",
            Family::Pool => "Pool usage",
            Family::PoolFree => "Pool free",
            Family::SystemPool => "System pool usage",
            Family::SystemPoolFree => "System pool free",
        }
    }
}

/// Compare a value against a warning and a critical limit
///
/// A limit of `0` is disabled. Critical is tested before warning.
pub fn classify(value: f64, warn: f64, crit: f64, direction: Direction) -> Status {
    let breaches = |limit: f64| {
        limit > 0.0
            && match direction {
                Direction::ExceedsIsBad => value > limit,
                Direction::FallsBelowIsBad => value < limit,
            }
    };
    if breaches(crit) {
        Status::Critical
    } else if breaches(warn) {
        Status::Warning
    } else {
        Status::Ok
    }
}

/// The outcome of comparing one rate against one slot of a family's thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckResult {
    pub family: Family,
    pub measure: Measure,
    /// `None` when the rate could not be computed
    pub value: Option<f64>,
    pub warn: f64,
    pub crit: f64,
    pub status: Status,
}

impl CheckResult {
    /// Check `value` against the slot of `limits` selected by `measure`
    ///
    /// An undefined value only matters when the slot is actually monitored,
    /// and then it is `Unknown`.
    pub fn evaluate(
        family: Family,
        measure: Measure,
        value: Option<f64>,
        limits: &Limits,
    ) -> CheckResult {
        let (warn, crit) = match measure {
            Measure::Percent => (
                f64::from(limits.warning.percent),
                f64::from(limits.critical.percent),
            ),
            Measure::Absolute => (limits.warning.absolute, limits.critical.absolute),
        };
        let status = match value {
            _ if warn == 0.0 && crit == 0.0 => Status::Ok,
            Some(v) => classify(v, warn, crit, family.direction()),
            None => Status::Unknown,
        };
        CheckResult {
            family,
            measure,
            value,
            warn,
            crit,
            status,
        }
    }

    pub fn name(&self) -> String {
        match self.measure {
            Measure::Percent => format!("{} percentage check", self.family.label()),
            Measure::Absolute => format!("{} check", self.family.label()),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cmp = match self.family.direction() {
            Direction::ExceedsIsBad => '>',
            Direction::FallsBelowIsBad => '<',
        };
        let or_nan = |limit: f64| if limit == 0.0 { std::f64::NAN } else { limit };
        write!(f, "{} state -> {} (val=", self.name(), self.status)?;
        match self.value {
            Some(v) => write!(f, "{:.2}", v)?,
            None => write!(f, "U")?,
        }
        write!(
            f,
            " warn{}{:.2} crit{}{:.2})",
            cmp,
            or_nan(self.warn),
            cmp,
            or_nan(self.crit)
        )
    }
}

/// Running statuses for the whole run and for each family
///
/// Every family starts out `Ok`. Because `Ok` outranks `Unknown`, a check
/// that could not be evaluated is remembered separately: a family (or the
/// run) whose status is still `Ok` but that had such a check reports
/// `Unknown` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    global: Status,
    families: [Status; 6],
    undetermined: [bool; 6],
}

impl Default for Tally {
    fn default() -> Tally {
        Tally {
            global: Status::Ok,
            families: [Status::Ok; 6],
            undetermined: [false; 6],
        }
    }
}

impl Tally {
    pub fn new() -> Tally {
        Tally::default()
    }

    pub fn record(&mut self, check: &CheckResult) {
        let i = check.family.index();
        self.global = max_state(self.global, check.status);
        self.families[i] = max_state(self.families[i], check.status);
        if check.status == Status::Unknown {
            self.undetermined[i] = true;
        }
    }

    pub fn family(&self, family: Family) -> Status {
        let i = family.index();
        undetermined_as_unknown(self.families[i], self.undetermined[i])
    }

    pub fn global(&self) -> Status {
        let any = self.undetermined.iter().any(|u| *u);
        undetermined_as_unknown(self.global, any)
    }
}

fn undetermined_as_unknown(status: Status, undetermined: bool) -> Status {
    if undetermined && status == Status::Ok {
        Status::Unknown
    } else {
        status
    }
}
