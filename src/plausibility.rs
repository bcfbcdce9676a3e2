//! Strict mode: refuse to trust rates built on impossible counters
//!
//! A zero where there must be something (consumed time, entitlement, pool
//! size) or a pool larger than the machine means the counters cannot be
//! believed. In strict mode any such violation makes the run CRITICAL.

use std::fmt;

use crate::mode::Mode;
use crate::perfstat::Snapshot;
use crate::probe::Capabilities;
use crate::rates::Rates;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Violation {
    NoConsumption,
    NoEntitlement,
    NoPoolSize,
    NoPoolUsage,
    NoSystemSize,
    NoSystemUsage,
    PoolLargerThanSystem { pool: u32, system: u32 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Violation::NoConsumption => write!(f, "no processor time consumed"),
            Violation::NoEntitlement => write!(f, "entitlement is zero"),
            Violation::NoPoolSize => write!(f, "pool size is zero"),
            Violation::NoPoolUsage => write!(f, "pool busy time is zero"),
            Violation::NoSystemSize => write!(f, "system pool size is zero"),
            Violation::NoSystemUsage => write!(f, "system pool busy time is zero"),
            Violation::PoolLargerThanSystem { pool, system } => write!(
                f,
                "pool size {} exceeds system pool size {}",
                pool, system
            ),
        }
    }
}

/// Every implausible value among what this run checks
pub fn violations(
    snapshot: &Snapshot,
    rates: &Rates,
    mode: Mode,
    capabilities: Capabilities,
) -> Vec<Violation> {
    let mut found = Vec::new();
    if capabilities.entitlement {
        if rates.entitlement.value == 0.0 {
            found.push(Violation::NoConsumption);
        }
        if snapshot.entitled_proc_capacity == 0 {
            found.push(Violation::NoEntitlement);
        }
    }
    if capabilities.pool && mode.is_shared() {
        if snapshot.phys_cpus_pool == 0 {
            found.push(Violation::NoPoolSize);
        }
        if rates.pool_busy.value == 0.0 {
            found.push(Violation::NoPoolUsage);
        }
        if snapshot.shcpus_in_sys == 0 {
            found.push(Violation::NoSystemSize);
        }
        if rates.system_busy.value == 0.0 {
            found.push(Violation::NoSystemUsage);
        }
        if snapshot.phys_cpus_pool > snapshot.shcpus_in_sys {
            found.push(Violation::PoolLargerThanSystem {
                pool: snapshot.phys_cpus_pool,
                system: snapshot.shcpus_in_sys,
            });
        }
    }
    found
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rates::test::begin;
    use crate::rates::Rate;

    const BOTH: Capabilities = Capabilities {
        entitlement: true,
        pool: true,
    };

    fn busy_rates() -> Rates {
        Rates {
            entitlement: Rate::of(1.2, 1.5),
            pool_busy: Rate::of(3.0, 8.0),
            system_busy: Rate::of(6.0, 16.0),
            ..Rates::default()
        }
    }

    #[test]
    fn sane_values_pass() {
        let found = violations(&begin(), &busy_rates(), Mode::SharedWithAuthority, BOTH);
        assert!(found.is_empty(), "{:?}", found);
    }

    #[test]
    fn pool_bigger_than_system() {
        let snap = Snapshot {
            phys_cpus_pool: 32,
            ..begin()
        };
        assert_eq!(
            violations(&snap, &busy_rates(), Mode::SharedWithAuthority, BOTH),
            vec![Violation::PoolLargerThanSystem {
                pool: 32,
                system: 16,
            }]
        );
    }

    #[test]
    fn idle_entitlement_is_implausible() {
        let rates = Rates {
            entitlement: Rate::of(0.0, 1.5),
            ..busy_rates()
        };
        let found = violations(&begin(), &rates, Mode::DedicatedDonating, BOTH);
        assert_eq!(found, vec![Violation::NoConsumption]);
    }

    #[test]
    fn only_checked_families_count() {
        let snap = Snapshot {
            entitled_proc_capacity: 0,
            ..begin()
        };
        let pool_only = Capabilities {
            entitlement: false,
            pool: true,
        };
        assert!(violations(&snap, &busy_rates(), Mode::SharedWithAuthority, pool_only).is_empty());

        // hidden pool data reads as zero busy time
        let found = violations(
            &begin(),
            &Rates {
                entitlement: Rate::of(1.2, 1.5),
                ..Rates::default()
            },
            Mode::SharedWithoutAuthority,
            BOTH,
        );
        assert_eq!(found, vec![Violation::NoPoolUsage, Violation::NoSystemUsage]);
    }
}
