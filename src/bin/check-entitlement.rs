//! Check entitlement usage of a partition
//!
//! Works on shared processor partitions and on dedicated partitions that
//! donate idle cycles. Dedicated partitions that do neither have no
//! entitlement to check.

use structopt::StructOpt;

use lpar_plugins::cli::{self, CommonArgs, EntitlementArgs};
use lpar_plugins::perfstat::CounterFile;
use lpar_plugins::probe::{Capabilities, Probe, ProbeConfig};
use lpar_plugins::thresholds::ConfigError;

const TAG: &str = "ENTITLEMENT";
const CAPABILITIES: Capabilities = Capabilities {
    entitlement: true,
    pool: false,
};

/// Check entitlement usage of a partition
///
/// Samples the partition counters twice, --interval seconds apart. The
/// entitlement LIMITs are either processors (`2.5`) or a percentage of the
/// entitlement (`150%`), the virtual processor limits are percentages only.
#[derive(Debug, StructOpt)]
#[structopt(
    name = "check-entitlement (part of lpar-plugins)",
    raw(setting = "structopt::clap::AppSettings::ColoredHelp")
)]
struct Args {
    #[structopt(flatten)]
    common: CommonArgs,
    #[structopt(flatten)]
    entitlement: EntitlementArgs,
}

fn config(args: &Args) -> Result<ProbeConfig, ConfigError> {
    cli::resolve(TAG, CAPABILITIES, &args.common, &[&args.entitlement])
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
