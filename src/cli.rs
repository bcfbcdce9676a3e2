//! Command line arguments shared by the check binaries
//!
//! Each binary flattens the groups it supports into its own `Args` struct and
//! hands them to [`resolve`], which validates everything once and produces
//! the immutable [`ProbeConfig`].

use std::path::PathBuf;
use std::time::Duration;

use structopt::clap::ErrorKind;
use structopt::StructOpt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::checks::Family;
use crate::probe::{Capabilities, ProbeConfig};
use crate::thresholds::{ConfigError, Level, Limit, Thresholds};
use crate::Status;

#[derive(StructOpt, Debug)]
pub struct CommonArgs {
    #[structopt(
        long = "counters",
        value_name = "FILE",
        parse(from_os_str),
        help = "Partition counter dump to sample, re-read for every sample"
    )]
    pub counters: PathBuf,
    #[structopt(
        short = "i",
        long = "interval",
        default_value = "1",
        help = "Seconds between the two samples (1..30)"
    )]
    pub interval: u64,
    #[structopt(
        short = "x",
        long = "strict",
        help = "Go critical when the counters contain impossible values"
    )]
    pub strict: bool,
    #[structopt(
        short = "v",
        long = "verbose",
        help = "Print every check and a human readable summary, and log debug info to stderr"
    )]
    pub verbose: bool,
}

/// Entitlement and virtual processor thresholds
#[derive(StructOpt, Debug, Default)]
pub struct EntitlementArgs {
    #[structopt(
        long = "entitlement-warning",
        visible_alias = "ew",
        value_name = "LIMIT",
        raw(number_of_values = "1"),
        help = "Warn when consumed processors exceed this, or this % of entitlement (1%..2000%)"
    )]
    pub entitlement_warning: Vec<Limit>,
    #[structopt(
        long = "entitlement-critical",
        visible_alias = "ec",
        value_name = "LIMIT",
        raw(number_of_values = "1"),
        help = "Go critical when consumed processors exceed this, or this % of entitlement (1%..2000%)"
    )]
    pub entitlement_critical: Vec<Limit>,
    #[structopt(
        long = "vcpu-busy-warning",
        visible_alias = "vbw",
        value_name = "PERCENT",
        raw(number_of_values = "1"),
        help = "Warn when consumption exceeds this % of the online virtual processors"
    )]
    pub vcpu_busy_warning: Vec<Limit>,
    #[structopt(
        long = "vcpu-busy-critical",
        visible_alias = "vbc",
        value_name = "PERCENT",
        raw(number_of_values = "1"),
        help = "Go critical when consumption exceeds this % of the online virtual processors"
    )]
    pub vcpu_busy_critical: Vec<Limit>,
}

/// Shared processor pool thresholds
#[derive(StructOpt, Debug, Default)]
pub struct PoolArgs {
    #[structopt(
        long = "pool-warning",
        visible_alias = "pw",
        value_name = "LIMIT",
        raw(number_of_values = "1"),
        help = "Warn when the pool's busy processors exceed this, or this % of its size"
    )]
    pub pool_warning: Vec<Limit>,
    #[structopt(
        long = "pool-critical",
        visible_alias = "pc",
        value_name = "LIMIT",
        raw(number_of_values = "1"),
        help = "Go critical when the pool's busy processors exceed this, or this % of its size"
    )]
    pub pool_critical: Vec<Limit>,
    #[structopt(
        long = "pool-free-warning",
        visible_alias = "pfw",
        value_name = "LIMIT",
        raw(number_of_values = "1"),
        help = "Warn when the pool's idle processors fall below this, or this % of its size"
    )]
    pub pool_free_warning: Vec<Limit>,
    #[structopt(
        long = "pool-free-critical",
        visible_alias = "pfc",
        value_name = "LIMIT",
        raw(number_of_values = "1"),
        help = "Go critical when the pool's idle processors fall below this, or this % of its size"
    )]
    pub pool_free_critical: Vec<Limit>,
    #[structopt(
        long = "system-warning",
        visible_alias = "sw",
        value_name = "LIMIT",
        raw(number_of_values = "1"),
        help = "Warn when the system's busy shared processors exceed this, or this % of them"
    )]
    pub system_warning: Vec<Limit>,
    #[structopt(
        long = "system-critical",
        visible_alias = "sc",
        value_name = "LIMIT",
        raw(number_of_values = "1"),
        help = "Go critical when the system's busy shared processors exceed this, or this % of them"
    )]
    pub system_critical: Vec<Limit>,
    #[structopt(
        long = "system-free-warning",
        visible_alias = "sfw",
        value_name = "LIMIT",
        raw(number_of_values = "1"),
        help = "Warn when the system's idle shared processors fall below this, or this % of them"
    )]
    pub system_free_warning: Vec<Limit>,
    #[structopt(
        long = "system-free-critical",
        visible_alias = "sfc",
        value_name = "LIMIT",
        raw(number_of_values = "1"),
        help = "Go critical when the system's idle shared processors fall below this, or this % of them"
    )]
    pub system_free_critical: Vec<Limit>,
}

/// A group of threshold flags
pub trait ThresholdArgs {
    /// Every limit given, with the slot it belongs to
    fn limits(&self) -> Vec<(Family, Level, &[Limit])>;
}

impl ThresholdArgs for EntitlementArgs {
    fn limits(&self) -> Vec<(Family, Level, &[Limit])> {
        vec![
            (Family::Entitlement, Level::Warning, &self.entitlement_warning[..]),
            (Family::Entitlement, Level::Critical, &self.entitlement_critical[..]),
            (Family::VcpuBusy, Level::Warning, &self.vcpu_busy_warning[..]),
            (Family::VcpuBusy, Level::Critical, &self.vcpu_busy_critical[..]),
        ]
    }
}

impl ThresholdArgs for PoolArgs {
    fn limits(&self) -> Vec<(Family, Level, &[Limit])> {
        vec![
            (Family::Pool, Level::Warning, &self.pool_warning[..]),
            (Family::Pool, Level::Critical, &self.pool_critical[..]),
            (Family::PoolFree, Level::Warning, &self.pool_free_warning[..]),
            (Family::PoolFree, Level::Critical, &self.pool_free_critical[..]),
            (Family::SystemPool, Level::Warning, &self.system_warning[..]),
            (Family::SystemPool, Level::Critical, &self.system_critical[..]),
            (Family::SystemPoolFree, Level::Warning, &self.system_free_warning[..]),
            (Family::SystemPoolFree, Level::Critical, &self.system_free_critical[..]),
        ]
    }
}

/// Validate the parsed arguments into a run configuration
pub fn resolve(
    tag: &'static str,
    capabilities: Capabilities,
    common: &CommonArgs,
    groups: &[&dyn ThresholdArgs],
) -> Result<ProbeConfig, ConfigError> {
    if common.interval < 1 || common.interval > 30 {
        return Err(ConfigError::Interval(common.interval));
    }

    let mut thresholds = Thresholds::new();
    for group in groups {
        for (family, level, limits) in group.limits() {
            for limit in limits {
                thresholds.set(family, level, *limit)?;
                debug!(flag = family.flag(level), %limit, "threshold");
            }
        }
    }
    if !thresholds.any_configured() {
        return Err(ConfigError::NothingToCheck(capabilities.flags()));
    }

    Ok(ProbeConfig {
        tag,
        capabilities,
        thresholds,
        interval: Duration::from_secs(common.interval),
        strict: common.strict,
        verbose: common.verbose,
    })
}

/// Parse the process arguments, exiting UNKNOWN on bad syntax
///
/// `--help` and `--version` still exit 0.
pub fn parse_or_exit<T: StructOpt>() -> T {
    T::from_iter_safe(std::env::args_os()).unwrap_or_else(|e| match e.kind {
        ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => e.exit(),
        _ => {
            println!("{}", e.message);
            Status::Unknown.exit()
        }
    })
}

/// Report a configuration mistake and exit UNKNOWN
pub fn config_error(err: ConfigError) -> ! {
    println!("ERROR: {}", err);
    println!("For more information try --help");
    Status::Unknown.exit()
}

/// Send diagnostics to stderr, stdout belongs to the monitoring system
///
/// `--verbose` turns on debug events, otherwise `RUST_LOG` decides.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(StructOpt, Debug)]
    struct Args {
        #[structopt(flatten)]
        common: CommonArgs,
        #[structopt(flatten)]
        entitlement: EntitlementArgs,
        #[structopt(flatten)]
        pool: PoolArgs,
    }

    const BOTH: Capabilities = Capabilities {
        entitlement: true,
        pool: true,
    };

    fn parse(argv: &[&str]) -> Args {
        let mut full = vec!["check", "--counters", "/dev/null"];
        full.extend_from_slice(argv);
        Args::from_iter_safe(full).unwrap()
    }

    fn resolve_args(args: &Args) -> Result<ProbeConfig, ConfigError> {
        resolve("ENT_POOLS", BOTH, &args.common, &[&args.entitlement, &args.pool])
    }

    #[test]
    fn value_and_percent_for_one_slot() {
        let args = parse(&["--ec", "3.17", "--entitlement-critical", "200%"]);
        let config = resolve_args(&args).unwrap();
        let critical = config.thresholds.family(Family::Entitlement).critical;
        assert_eq!(critical.absolute, 3.1);
        assert_eq!(critical.percent, 200);
        assert_eq!(config.interval, Duration::from_secs(1));
        assert!(!config.strict);
    }

    #[test]
    fn repeated_slot_is_rejected() {
        let args = parse(&["--ec", "200%", "--ec", "150%"]);
        assert_eq!(
            resolve_args(&args).unwrap_err().to_string(),
            "--ec already set to 200%! Don't specify more than once!"
        );
    }

    #[test]
    fn interval_range() {
        let args = parse(&["-i", "45", "--pw", "80%"]);
        assert_eq!(resolve_args(&args), Err(ConfigError::Interval(45)));
        let args = parse(&["-i", "0", "--pw", "80%"]);
        assert_eq!(resolve_args(&args), Err(ConfigError::Interval(0)));

        let args = parse(&["--interval", "30", "-x", "-v", "--pw", "80%"]);
        let config = resolve_args(&args).unwrap();
        assert_eq!(config.interval, Duration::from_secs(30));
        assert!(config.strict && config.verbose);
    }

    #[test]
    fn something_must_be_checked() {
        let args = parse(&["-x"]);
        let err = resolve_args(&args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Specify at least one option --ew, --ec, --vbw, --vbc, --pw, --pc, --pfw, \
             --pfc, --sw, --sc, --sfw, --sfc"
        );
    }

    #[test]
    fn pool_flags_fill_pool_families() {
        let args = parse(&["--pfc", "10%", "--system-free-warning", "2", "--sc", "95%"]);
        let config = resolve_args(&args).unwrap();
        assert!(config.thresholds.pool_requested());
        assert_eq!(config.thresholds.family(Family::PoolFree).critical.percent, 10);
        assert_eq!(config.thresholds.family(Family::SystemPoolFree).warning.absolute, 2.0);
        assert_eq!(config.thresholds.family(Family::SystemPool).critical.percent, 95);
    }

    #[test]
    fn malformed_limits_fail_to_parse() {
        let argv = vec!["check", "--counters", "/dev/null", "--pw", "lots"];
        assert!(Args::from_iter_safe(argv).is_err());
    }

    #[test]
    fn counters_are_required() {
        assert!(Args::from_iter_safe(vec!["check", "--pw", "80%"]).is_err());
    }
}
