//! LPAR plugins: checks for processor entitlement and shared pool usage
//!
//! A set of Nagios/Sensu compatible check binaries for virtualized
//! partitions. Each check takes two readings of the partition counters an
//! interval apart, turns the counter deltas into utilization rates, and
//! compares them against configured warning and critical limits.
//!
//! The binaries (`check-ent-pools`, `check-entitlement` and `check-cpu-pools`)
//! are thin wrappers around [`probe::Probe`], differing only in which metric
//! families they are able to check. See the [`scripts`] module for the usage
//! of each.

pub mod checks;
pub mod cli;
pub mod mode;
pub mod perfstat;
pub mod plausibility;
pub mod probe;
pub mod rates;
pub mod scripts;
pub mod thresholds;
pub mod timebase;

use std::cmp::Ordering;
use std::fmt;
use std::process;

/// All possible exit statuses of a check
///
/// Statuses are ordered by how much they matter to whoever reads the result,
/// so `std::cmp::max` of two statuses is the one to report:
///
/// `Dependent < Unknown < Ok < Warning < Critical`
///
/// Note that this is not the order of the exit codes.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
    Dependent,
}

impl Status {
    #![cfg_attr(test, allow(dead_code))]
    pub fn exit(self) -> ! {
        process::exit(self.code())
    }

    /// The process exit code for this status
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
            Status::Dependent => 4,
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Status::Dependent => 0,
            Status::Unknown => 1,
            Status::Ok => 2,
            Status::Warning => 3,
            Status::Critical => 4,
        }
    }
}

impl Ord for Status {
    fn cmp(&self, other: &Status) -> Ordering {
        self.precedence().cmp(&other.precedence())
    }
}

impl PartialOrd for Status {
    fn partial_cmp(&self, other: &Status) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
            Status::Dependent => "DEPENDENT",
        };
        f.pad(name)
    }
}

/// Combine two statuses, keeping the one that matters more
pub fn max_state(a: Status, b: Status) -> Status {
    std::cmp::max(a, b)
}
