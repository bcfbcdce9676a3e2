//! Check shared processor pool usage from inside a partition
//!
//! Only works on shared processor partitions whose profile allows collecting
//! pool utilization.

use structopt::StructOpt;

use lpar_plugins::cli::{self, CommonArgs, PoolArgs};
use lpar_plugins::perfstat::CounterFile;
use lpar_plugins::probe::{Capabilities, Probe, ProbeConfig};
use lpar_plugins::thresholds::ConfigError;

const TAG: &str = "CPU_POOLS";
const CAPABILITIES: Capabilities = Capabilities {
    entitlement: false,
    pool: true,
};

/// Check shared processor pool usage from inside a partition
///
/// Samples the partition counters twice, --interval seconds apart. Every
/// LIMIT is either processors (`6`) or a percentage of the pool (`80%`), and
/// each flag may be given once of each kind.
#[derive(Debug, StructOpt)]
#[structopt(
    name = "check-cpu-pools (part of lpar-plugins)",
    raw(setting = "structopt::clap::AppSettings::ColoredHelp")
)]
struct Args {
    #[structopt(flatten)]
    common: CommonArgs,
    #[structopt(flatten)]
    pool: PoolArgs,
}

fn config(args: &Args) -> Result<ProbeConfig, ConfigError> {
    cli::resolve(TAG, CAPABILITIES, &args.common, &[&args.pool])
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
