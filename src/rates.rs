//! Turning two snapshots into utilization rates
//!
//! Everything is measured in processors: a rate of `2.0` means two physical
//! processors' worth of time was used per unit of wall time. Entitlement
//! consumption comes from the PURR counters, which tick with the timebase.
//! Pool counters are kept in nanoseconds, so they are scaled by the
//! timebase's nanoseconds per tick first.

use tracing::debug;

use crate::checks::Family;
use crate::perfstat::Snapshot;
use crate::timebase::{delta, CounterError, Ticks};

/// A rate in processors, along with its share of some capacity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rate {
    pub value: f64,
    /// Percentage of the capacity, `None` when the capacity is zero
    pub percent: Option<f64>,
}

impl Rate {
    /// `value` as a share of `capacity` processors
    pub fn of(value: f64, capacity: f64) -> Rate {
        let percent = if capacity > 0.0 {
            Some(value * 100.0 / capacity)
        } else {
            None
        };
        Rate { value, percent }
    }
}

/// Processors used per unit of time
///
/// `scale` converts the counter's unit to timebase ticks.
pub fn processors(counter_delta: u64, elapsed: Ticks, scale: f64) -> f64 {
    counter_delta as f64 / (scale * elapsed.as_f64())
}

/// All the rates of one run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rates {
    pub elapsed: Ticks,
    /// Processors consumed, as a share of entitlement
    pub entitlement: Rate,
    /// Processors consumed, as a share of online virtual processors
    pub vcpu_busy: Rate,
    pub pool_busy: Rate,
    pub pool_free: Rate,
    pub system_busy: Rate,
    pub system_free: Rate,
}

impl Rates {
    /// Compute the rates between two readings
    ///
    /// Capacities come from `second`. Pool rates are only computed when
    /// `pool_data` is set, otherwise they stay zero.
    pub fn between(
        first: &Snapshot,
        second: &Snapshot,
        pool_data: bool,
    ) -> Result<Rates, CounterError> {
        let elapsed = second.timebase_last.since(first.timebase_last, "timebase_last")?;
        if elapsed.get() == 0 {
            return Err(CounterError::NoElapsedTime);
        }

        let purr = Ticks::new(delta("puser", first.puser, second.puser)?)
            + Ticks::new(delta("psys", first.psys, second.psys)?)
            + Ticks::new(delta("pidle", first.pidle, second.pidle)?)
            + Ticks::new(delta("pwait", first.pwait, second.pwait)?);
        let consumed = processors(purr.get(), elapsed, 1.0);

        let mut rates = Rates {
            elapsed,
            entitlement: Rate::of(consumed, second.entitlement()),
            vcpu_busy: Rate::of(consumed, f64::from(second.online_cpus)),
            ..Rates::default()
        };
        debug!(%elapsed, consumed, "entitlement rates");

        if pool_data {
            let scale = second.ns_per_tick();
            if !(scale > 0.0 && scale.is_finite()) {
                return Err(CounterError::NoTimebaseScale);
            }
            let pool_size = f64::from(second.phys_cpus_pool);
            let system_size = f64::from(second.shcpus_in_sys);

            let busy = delta("pool_busy_time", first.pool_busy_time, second.pool_busy_time)?;
            let idle = delta("pool_idle_time", first.pool_idle_time, second.pool_idle_time)?;
            let shared = delta("shcpu_busy_time", first.shcpu_busy_time, second.shcpu_busy_time)?;

            rates.pool_busy = Rate::of(processors(busy, elapsed, scale), pool_size);
            rates.pool_free = Rate::of(processors(idle, elapsed, scale), pool_size);
            let system_busy = processors(shared, elapsed, scale);
            rates.system_busy = Rate::of(system_busy, system_size);
            rates.system_free = Rate::of(system_size - system_busy, system_size);
            debug!(
                pool_busy = rates.pool_busy.value,
                pool_free = rates.pool_free.value,
                system_busy,
                "pool rates"
            );
        }
        Ok(rates)
    }

    /// The rate a family's checks are evaluated against
    pub fn family(&self, family: Family) -> Rate {
        match family {
            Family::Entitlement => self.entitlement,
            Family::VcpuBusy => self.vcpu_busy,
            Family::Pool => self.pool_busy,
            Family::PoolFree => self.pool_free,
            Family::SystemPool => self.system_busy,
            Family::SystemPoolFree => self.system_free,
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::perfstat::ModeFlags;

    /// A shared partition with pool authority, 1.5 processors entitled,
    /// 4 virtual processors, in an 8 processor pool of a 16 processor system
    pub(crate) fn begin() -> Snapshot {
        Snapshot {
            timebase_last: Ticks::new(1_000),
            xint: 1,
            xfrac: 1,
            puser: 100,
            psys: 100,
            pidle: 100,
            pwait: 100,
            pool_busy_time: 1_000,
            pool_idle_time: 1_000,
            shcpu_busy_time: 1_000,
            entitled_proc_capacity: 150,
            online_cpus: 4,
            pool_id: 0,
            phys_cpus_pool: 8,
            shcpus_in_sys: 16,
            flags: ModeFlags {
                shared_enabled: true,
                donate_enabled: false,
                pool_util_authority: true,
            },
        }
    }

    #[test]
    fn pool_busy_rate() {
        let start = begin();
        let end = Snapshot {
            timebase_last: Ticks::new(1_250),
            pool_busy_time: 1_500,
            ..start.clone()
        };
        let rates = Rates::between(&start, &end, true).unwrap();
        assert_eq!(rates.elapsed, Ticks::new(250));
        assert_eq!(rates.pool_busy.value, 2.0);
        assert_eq!(rates.pool_busy.percent, Some(25.0));
    }

    #[test]
    fn entitlement_and_vcpu_rates() {
        let start = begin();
        let end = Snapshot {
            timebase_last: Ticks::new(2_000),
            puser: 1_100,
            psys: 600,
            pidle: 100,
            pwait: 100,
            ..start.clone()
        };
        // 1500 PURR ticks over 1000 timebase ticks
        let rates = Rates::between(&start, &end, false).unwrap();
        assert_eq!(rates.entitlement.value, 1.5);
        assert_eq!(rates.entitlement.percent, Some(100.0));
        assert_eq!(rates.vcpu_busy.value, 1.5);
        assert_eq!(rates.vcpu_busy.percent, Some(37.5));
    }

    #[test]
    fn pool_rates_scale_nanoseconds() {
        let start = begin();
        // 4 ns per tick, 100 ticks elapsed, so 400 ns of wall time
        let end = Snapshot {
            timebase_last: Ticks::new(1_100),
            xint: 4,
            pool_busy_time: 1_000 + 800,
            pool_idle_time: 1_000 + 2_400,
            shcpu_busy_time: 1_000 + 1_600,
            ..start.clone()
        };
        let rates = Rates::between(&start, &end, true).unwrap();
        assert_eq!(rates.pool_busy.value, 2.0);
        assert_eq!(rates.pool_free.value, 6.0);
        assert_eq!(rates.pool_free.percent, Some(75.0));
        assert_eq!(rates.system_busy.value, 4.0);
        assert_eq!(rates.system_busy.percent, Some(25.0));
        assert_eq!(rates.system_free.value, 12.0);
        assert_eq!(rates.system_free.percent, Some(75.0));
    }

    #[test]
    fn pool_rates_stay_zero_without_pool_data() {
        let start = begin();
        let end = Snapshot {
            timebase_last: Ticks::new(1_250),
            pool_busy_time: 1_500,
            ..start.clone()
        };
        let rates = Rates::between(&start, &end, false).unwrap();
        assert_eq!(rates.pool_busy, Rate::default());
        assert_eq!(rates.system_free, Rate::default());
    }

    #[test]
    fn zero_capacity_makes_percent_undefined() {
        let start = Snapshot {
            entitled_proc_capacity: 0,
            online_cpus: 0,
            phys_cpus_pool: 0,
            ..begin()
        };
        let end = Snapshot {
            timebase_last: Ticks::new(1_250),
            puser: 350,
            pool_busy_time: 1_500,
            ..start.clone()
        };
        let rates = Rates::between(&start, &end, true).unwrap();
        assert_eq!(rates.entitlement.value, 1.0);
        assert_eq!(rates.entitlement.percent, None);
        assert_eq!(rates.vcpu_busy.percent, None);
        assert_eq!(rates.pool_busy.percent, None);
        assert!(rates.system_busy.percent.is_some());
    }

    #[test]
    fn counters_going_backwards_are_errors() {
        let start = begin();
        let end = Snapshot {
            timebase_last: Ticks::new(1_250),
            pool_idle_time: 10,
            ..start.clone()
        };
        match Rates::between(&start, &end, true) {
            Err(CounterError::WentBackwards {
                counter: "pool_idle_time",
                ..
            }) => {}
            other => panic!("expected pool_idle_time to go backwards, got {:?}", other),
        }
        // pool counters are not looked at without pool data
        assert!(Rates::between(&start, &end, false).is_ok());
    }

    #[test]
    fn timebase_must_advance() {
        let start = begin();
        assert_eq!(
            Rates::between(&start, &start.clone(), true),
            Err(CounterError::NoElapsedTime)
        );
        let earlier = Snapshot {
            timebase_last: Ticks::new(10),
            ..start.clone()
        };
        assert!(Rates::between(&start, &earlier, false).is_err());
    }

    #[test]
    fn zero_timebase_scale_is_an_error() {
        let start = Snapshot {
            xint: 0,
            ..begin()
        };
        let end = Snapshot {
            timebase_last: Ticks::new(2_000),
            pool_busy_time: 1_500,
            ..start.clone()
        };
        assert_eq!(
            Rates::between(&start, &end, true),
            Err(CounterError::NoTimebaseScale)
        );
        // entitlement rates do not need the scale
        assert!(Rates::between(&start, &end, false).is_ok());
    }
}
