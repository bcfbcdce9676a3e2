//! Check entitlement usage and shared processor pool usage of a partition
//!
//! Works on shared processor partitions and on dedicated partitions that
//! donate idle cycles. Pool checks need the partition profile to allow
//! collecting pool utilization, and are not available when donating.

use structopt::StructOpt;

use lpar_plugins::cli::{self, CommonArgs, EntitlementArgs, PoolArgs};
use lpar_plugins::perfstat::CounterFile;
use lpar_plugins::probe::{Capabilities, Probe, ProbeConfig};
use lpar_plugins::thresholds::ConfigError;

const TAG: &str = "ENT_POOLS";
const CAPABILITIES: Capabilities = Capabilities {
    entitlement: true,
    pool: true,
};

/// Check entitlement usage and shared processor pool usage of a partition
///
/// Samples the partition counters twice, --interval seconds apart. Every
/// LIMIT is either processors (`2.5`) or a percentage (`80%`), and each flag
/// may be given once of each kind.
#[derive(Debug, StructOpt)]
#[structopt(
    name = "check-ent-pools (part of lpar-plugins)",
    raw(setting = "structopt::clap::AppSettings::ColoredHelp")
)]
struct Args {
    #[structopt(flatten)]
    common: CommonArgs,
    #[structopt(flatten)]
    entitlement: EntitlementArgs,
    #[structopt(flatten)]
    pool: PoolArgs,
}

fn config(args: &Args) -> Result<ProbeConfig, ConfigError> {
    cli::resolve(TAG, CAPABILITIES, &args.common, &[&args.entitlement, &args.pool])
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args: Args = cli::parse_or_exit();
    cli::init_tracing(args.common.verbose);
    let config = config(&args).unwrap_or_else(|e| cli::config_error(e));

    let mut sampler = CounterFile::new(args.common.counters.clone());
    let status = Probe::new(config).execute(&mut sampler);
    status.exit();
}

#[cfg(test)]
mod test {
    use structopt::StructOpt;

    use lpar_plugins::checks::Family;

    use super::{config, Args};

    fn build_args(argv: Vec<&str>) -> Args {
        Args::from_iter(argv.into_iter())
    }

    #[test]
    fn all_families_are_accepted() {
        let args = build_args(vec![
            "check-ent-pools",
            "--counters",
            "/var/run/partition_total",
            "--ew",
            "150%",
            "--vbc",
            "95%",
            "--pool-warning",
            "6",
            "--sfc",
            "1.5",
        ]);
        let config = config(&args).unwrap();
        assert_eq!(config.tag, "ENT_POOLS");
        assert_eq!(config.thresholds.family(Family::Entitlement).warning.percent, 150);
        assert_eq!(config.thresholds.family(Family::VcpuBusy).critical.percent, 95);
        assert_eq!(config.thresholds.family(Family::Pool).warning.absolute, 6.0);
        assert_eq!(config.thresholds.family(Family::SystemPoolFree).critical.absolute, 1.5);
    }

    #[test]
    fn entitlement_percent_goes_past_100() {
        let args = build_args(vec!["check-ent-pools", "--counters", "f", "--ec", "2000%"]);
        assert!(config(&args).is_ok());

        let args = build_args(vec!["check-ent-pools", "--counters", "f", "--pc", "120%"]);
        assert_eq!(
            config(&args).unwrap_err().to_string(),
            "--pc 120% out of range! Allowed 1%..100%"
        );
    }
}
