//! Documentation about the various scripts contained herein
//!
//! - [check-ent-pools](#check-ent-pools)
//! - [check-entitlement](#check-entitlement)
//! - [check-cpu-pools](#check-cpu-pools)
//!
//! # check-ent-pools
//!
//! Shared processor partitions, and dedicated partitions that donate idle cycles.
//!
//! ```plain
//! $ check-ent-pools --help
//! check-ent-pools (part of lpar-plugins) 0.1.0
//! Check entitlement usage and shared processor pool usage of a partition
//!
//! Samples the partition counters twice, --interval seconds apart. Every LIMIT is either processors (`2.5`) or a
//! percentage (`80%`), and each flag may be given once of each kind.
//!
//! USAGE:
//!     check-ent-pools [FLAGS] [OPTIONS] --counters <FILE>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -x, --strict     Go critical when the counters contain impossible values
//!     -V, --version    Prints version information
//!     -v, --verbose    Print every check and a human readable summary, and log debug info to stderr
//!
//! OPTIONS:
//!         --counters <FILE>                      Partition counter dump to sample, re-read for every sample
//!         --entitlement-critical <LIMIT>...
//!             Go critical when consumed processors exceed this, or this % of entitlement (1%..2000%) [aliases: ec]
//!
//!         --entitlement-warning <LIMIT>...
//!             Warn when consumed processors exceed this, or this % of entitlement (1%..2000%) [aliases: ew]
//!
//!     -i, --interval <interval>                  Seconds between the two samples (1..30) [default: 1]
//!         --pool-critical <LIMIT>...
//!             Go critical when the pool's busy processors exceed this, or this % of its size [aliases: pc]
//!
//!         --pool-free-critical <LIMIT>...
//!             Go critical when the pool's idle processors fall below this, or this % of its size [aliases: pfc]
//!
//!         --pool-free-warning <LIMIT>...
//!             Warn when the pool's idle processors fall below this, or this % of its size [aliases: pfw]
//!
//!         --pool-warning <LIMIT>...
//!             Warn when the pool's busy processors exceed this, or this % of its size [aliases: pw]
//!
//!         --system-critical <LIMIT>...
//!             Go critical when the system's busy shared processors exceed this, or this % of them [aliases: sc]
//!
//!         --system-free-critical <LIMIT>...
//!             Go critical when the system's idle shared processors fall below this, or this % of them [aliases: sfc]
//!
//!         --system-free-warning <LIMIT>...
//!             Warn when the system's idle shared processors fall below this, or this % of them [aliases: sfw]
//!
//!         --system-warning <LIMIT>...
//!             Warn when the system's busy shared processors exceed this, or this % of them [aliases: sw]
//!
//!         --vcpu-busy-critical <PERCENT>...
//!             Go critical when consumption exceeds this % of the online virtual processors [aliases: vbc]
//!
//!         --vcpu-busy-warning <PERCENT>...
//!             Warn when consumption exceeds this % of the online virtual processors [aliases: vbw]
//! ```
//!
//! # check-entitlement
//!
//! Shared processor partitions, and dedicated partitions that donate idle cycles.
//!
//! ```plain
//! $ check-entitlement --help
//! check-entitlement (part of lpar-plugins) 0.1.0
//! Check entitlement usage of a partition
//!
//! Samples the partition counters twice, --interval seconds apart. The entitlement LIMITs are either processors
//! (`2.5`) or a percentage of the entitlement (`150%`), the virtual processor limits are percentages only.
//!
//! USAGE:
//!     check-entitlement [FLAGS] [OPTIONS] --counters <FILE>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -x, --strict     Go critical when the counters contain impossible values
//!     -V, --version    Prints version information
//!     -v, --verbose    Print every check and a human readable summary, and log debug info to stderr
//!
//! OPTIONS:
//!         --counters <FILE>                      Partition counter dump to sample, re-read for every sample
//!         --entitlement-critical <LIMIT>...
//!             Go critical when consumed processors exceed this, or this % of entitlement (1%..2000%) [aliases: ec]
//!
//!         --entitlement-warning <LIMIT>...
//!             Warn when consumed processors exceed this, or this % of entitlement (1%..2000%) [aliases: ew]
//!
//!     -i, --interval <interval>                  Seconds between the two samples (1..30) [default: 1]
//!         --vcpu-busy-critical <PERCENT>...
//!             Go critical when consumption exceeds this % of the online virtual processors [aliases: vbc]
//!
//!         --vcpu-busy-warning <PERCENT>...
//!             Warn when consumption exceeds this % of the online virtual processors [aliases: vbw]
//! ```
//!
//! # check-cpu-pools
//!
//! Shared processor partitions whose profile allows collecting pool utilization.
//!
//! ```plain
//! $ check-cpu-pools --help
//! check-cpu-pools (part of lpar-plugins) 0.1.0
//! Check shared processor pool usage from inside a partition
//!
//! Samples the partition counters twice, --interval seconds apart. Every LIMIT is either processors (`6`) or a
//! percentage of the pool (`80%`), and each flag may be given once of each kind.
//!
//! USAGE:
//!     check-cpu-pools [FLAGS] [OPTIONS] --counters <FILE>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -x, --strict     Go critical when the counters contain impossible values
//!     -V, --version    Prints version information
//!     -v, --verbose    Print every check and a human readable summary, and log debug info to stderr
//!
//! OPTIONS:
//!         --counters <FILE>                Partition counter dump to sample, re-read for every sample
//!     -i, --interval <interval>            Seconds between the two samples (1..30) [default: 1]
//!         --pool-critical <LIMIT>...
//!             Go critical when the pool's busy processors exceed this, or this % of its size [aliases: pc]
//!
//!         --pool-free-critical <LIMIT>...
//!             Go critical when the pool's idle processors fall below this, or this % of its size [aliases: pfc]
//!
//!         --pool-free-warning <LIMIT>...
//!             Warn when the pool's idle processors fall below this, or this % of its size [aliases: pfw]
//!
//!         --pool-warning <LIMIT>...
//!             Warn when the pool's busy processors exceed this, or this % of its size [aliases: pw]
//!
//!         --system-critical <LIMIT>...
//!             Go critical when the system's busy shared processors exceed this, or this % of them [aliases: sc]
//!
//!         --system-free-critical <LIMIT>...
//!             Go critical when the system's idle shared processors fall below this, or this % of them [aliases: sfc]
//!
//!         --system-free-warning <LIMIT>...
//!             Warn when the system's idle shared processors fall below this, or this % of them [aliases: sfw]
//!
//!         --system-warning <LIMIT>...
//!             Warn when the system's busy shared processors exceed this, or this % of them [aliases: sw]
//! ```
