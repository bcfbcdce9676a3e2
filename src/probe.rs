//! One run of a check: sample, select the mode, wait, sample again, classify
//!
//! A [`Probe`] is configured once from the command line and then run against
//! a [`Sampler`]. Everything it finds ends up in a [`Report`], whose
//! `Display` impl is the plugin output line:
//!
//! ```text
//! ENT_POOLS WARNING ent_used=1.20(OK) ent=1.50 ent_max=4 vcpu_busy=30.00%(OK) ... |ent_used=1.20;ent=1.50;...
//! ```

use std::fmt;
use std::time::Duration;

use derive_more::From;
use itertools::Itertools;
use tracing::{debug, warn};

use crate::checks::{CheckResult, Family, Measure, Tally};
use crate::mode::{self, Mode, Rejection};
use crate::perfstat::{Sampler, Snapshot, SnapshotError};
use crate::plausibility::{self, Violation};
use crate::rates::Rates;
use crate::thresholds::{Level, Thresholds};
use crate::timebase::CounterError;
use crate::Status;

/// The metric families a check binary is able to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub entitlement: bool,
    pub pool: bool,
}

impl Capabilities {
    pub fn includes(self, family: Family) -> bool {
        if family.is_pool() {
            self.pool
        } else {
            self.entitlement
        }
    }

    pub fn families(self) -> Vec<Family> {
        Family::ALL
            .iter()
            .cloned()
            .filter(|f| self.includes(*f))
            .collect()
    }

    /// Every threshold flag that makes sense for these capabilities
    pub fn flags(self) -> Vec<&'static str> {
        self.families()
            .into_iter()
            .flat_map(|f| vec![f.flag(Level::Warning), f.flag(Level::Critical)])
            .collect()
    }
}

/// Everything a run needs to know, resolved before the first sample
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// Prefix of every output line, e.g. `ENT_POOLS`
    pub tag: &'static str,
    pub capabilities: Capabilities,
    pub thresholds: Thresholds,
    pub interval: Duration,
    pub strict: bool,
    pub verbose: bool,
}

/// Reasons a run ends without a report
#[derive(Debug, From)]
pub enum ProbeError {
    Acquire(SnapshotError),
    Counter(CounterError),
    Rejected(Rejection),
}

impl ProbeError {
    pub fn status(&self) -> Status {
        match self {
            ProbeError::Rejected(r) => r.status(),
            ProbeError::Acquire(_) | ProbeError::Counter(_) => Status::Unknown,
        }
    }

    /// The plugin output line for a run that ended early
    pub fn output_line(&self, tag: &str) -> String {
        format!("{} {} {}", tag, self.status(), self)
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProbeError::Acquire(e) => write!(f, "Error getting partition counters: {}", e),
            ProbeError::Counter(e) => write!(f, "{}", e),
            ProbeError::Rejected(r) => write!(f, "{}", r),
        }
    }
}

/// The result of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub tag: &'static str,
    pub mode: Mode,
    pub capabilities: Capabilities,
    /// The second reading, which the capacities are taken from
    pub snapshot: Snapshot,
    pub rates: Rates,
    /// In evaluation order
    pub checks: Vec<CheckResult>,
    pub tally: Tally,
    /// Only ever filled in strict mode
    pub violations: Vec<Violation>,
}

impl Report {
    pub fn status(&self) -> Status {
        if self.violations.is_empty() {
            self.tally.global()
        } else {
            Status::Critical
        }
    }

    fn shows_entitlement(&self) -> bool {
        self.capabilities.entitlement
    }

    fn shows_pool(&self) -> bool {
        self.capabilities.pool && self.mode.is_shared()
    }

    fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        let snap = &self.snapshot;
        let rates = &self.rates;
        if self.shows_entitlement() {
            fields.push(Field::rate(
                "ent_used",
                rates.entitlement.value,
                self.tally.family(Family::Entitlement),
            ));
            fields.push(Field::plain("ent", format!("{:.2}", snap.entitlement())));
            fields.push(Field::plain("ent_max", snap.online_cpus.to_string()));
            fields.push(Field {
                key: "vcpu_busy",
                value: optional(rates.vcpu_busy.percent, 0),
                unit: "%",
                status: Some(self.tally.family(Family::VcpuBusy)),
            });
        }
        if self.shows_pool() {
            fields.push(Field::plain("pool_id", snap.pool_id.to_string()));
            fields.push(Field::plain("pool_size", snap.phys_cpus_pool.to_string()));
            fields.push(Field::rate(
                "pool_used",
                rates.pool_busy.value,
                self.tally.family(Family::Pool),
            ));
            fields.push(Field::rate(
                "pool_free",
                rates.pool_free.value,
                self.tally.family(Family::PoolFree),
            ));
            fields.push(Field::plain("syspool_size", snap.shcpus_in_sys.to_string()));
            fields.push(Field::rate(
                "syspool_used",
                rates.system_busy.value,
                self.tally.family(Family::SystemPool),
            ));
            fields.push(Field::rate(
                "syspool_free",
                rates.system_free.value,
                self.tally.family(Family::SystemPoolFree),
            ));
        }
        fields
    }

    /// The lines printed ahead of the output line with `--verbose`
    pub fn verbose_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.checks.iter().map(|c| c.to_string()).collect();
        if !self.violations.is_empty() {
            lines.push("Insane performance values detected".to_string());
        }
        lines.push(String::new());

        let snap = &self.snapshot;
        let rates = &self.rates;
        if self.shows_entitlement() {
            lines.push(format!(
                "Entitlement used: {:.2} ({}%), desired: {:.2}, max: {:.2}, vCPU busy: {}%",
                rates.entitlement.value,
                optional(rates.entitlement.percent, 0),
                snap.entitlement(),
                f64::from(snap.online_cpus),
                optional(rates.vcpu_busy.percent, 6),
            ));
        }
        if self.shows_pool() {
            lines.push(format!(
                "Pool ID {:3} size: {:4}, used: {:6.2} ({}%), free: {:6.2} ({}%)",
                snap.pool_id,
                snap.phys_cpus_pool,
                rates.pool_busy.value,
                optional(rates.pool_busy.percent, 6),
                rates.pool_free.value,
                optional(rates.pool_free.percent, 6),
            ));
            lines.push(format!(
                "System pool size: {:4}, used: {:6.2} ({}%), free: {:6.2} ({}%)",
                snap.shcpus_in_sys,
                rates.system_busy.value,
                optional(rates.system_busy.percent, 6),
                rates.system_free.value,
                optional(rates.system_free.percent, 6),
            ));
        }
        lines
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let fields = self.fields();
        write!(f, "{} {}", self.tag, self.status())?;
        for field in &fields {
            write!(f, " {}={}{}", field.key, field.value, field.unit)?;
            if let Some(status) = field.status {
                write!(f, "({})", status)?;
            }
        }
        write!(
            f,
            " |{}",
            fields
                .iter()
                .map(|field| format!("{}={}", field.key, field.value))
                .join(";")
        )
    }
}

/// One `key=value` pair of the output line
struct Field {
    key: &'static str,
    value: String,
    unit: &'static str,
    status: Option<Status>,
}

impl Field {
    fn plain(key: &'static str, value: String) -> Field {
        Field {
            key,
            value,
            unit: "",
            status: None,
        }
    }

    fn rate(key: &'static str, value: f64, status: Status) -> Field {
        Field {
            key,
            value: format!("{:.2}", value),
            unit: "",
            status: Some(status),
        }
    }
}

/// A percentage with two decimals, or `U` when it is undefined
fn optional(value: Option<f64>, width: usize) -> String {
    match value {
        Some(v) => format!("{:w$.2}", v, w = width),
        None => format!("{:>w$}", "U", w = width),
    }
}

pub struct Probe {
    config: ProbeConfig,
}

impl Probe {
    pub fn new(config: ProbeConfig) -> Probe {
        Probe { config }
    }

    /// Take both samples and evaluate every configured check
    ///
    /// Mode rejections happen right after the first sample, before waiting.
    pub fn run<S: Sampler>(&self, sampler: &mut S) -> Result<Report, ProbeError> {
        let config = &self.config;
        let first = sampler.sample()?;
        let mode = mode::select(&first.flags, config.thresholds.pool_requested())?;
        debug!(?mode, interval = ?config.interval, "sampling");

        sampler.wait(config.interval);
        let second = sampler.sample()?;
        let rates = Rates::between(&first, &second, mode.has_pool_data())?;

        let mut checks = Vec::new();
        let mut tally = Tally::new();
        for family in config.capabilities.families() {
            if family.is_pool() && !mode.is_shared() {
                continue;
            }
            let rate = rates.family(family);
            let limits = config.thresholds.family(family);
            for measure in family.measures() {
                let value = match measure {
                    Measure::Percent => rate.percent,
                    Measure::Absolute => Some(rate.value),
                };
                let check = CheckResult::evaluate(family, *measure, value, limits);
                debug!(check = %check, "evaluated");
                tally.record(&check);
                checks.push(check);
            }
        }

        let violations = if config.strict {
            plausibility::violations(&second, &rates, mode, config.capabilities)
        } else {
            Vec::new()
        };
        for violation in &violations {
            warn!(%violation, "implausible counters");
        }

        Ok(Report {
            tag: config.tag,
            mode,
            capabilities: config.capabilities,
            snapshot: second,
            rates,
            checks,
            tally,
            violations,
        })
    }

    /// Run, print the plugin output, and return the status to exit with
    pub fn execute<S: Sampler>(&self, sampler: &mut S) -> Status {
        match self.run(sampler) {
            Ok(report) => {
                if self.config.verbose {
                    for line in report.verbose_lines() {
                        println!("{}", line);
                    }
                }
                println!("{}", report);
                report.status()
            }
            Err(e) => {
                println!("{}", e.output_line(self.config.tag));
                e.status()
            }
        }
    }
}
