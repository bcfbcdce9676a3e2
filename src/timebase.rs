//! Timebase ticks and the counter arithmetic built on them
//!
//! The partition counters only ever grow while the partition is running, so
//! every rate is computed from the difference between two readings. A
//! difference that would be negative means the counters were reset (or the
//! source is broken) and is reported instead of being wrapped or clamped.

use std::fmt;
use std::ops;

/// A count of timebase ticks
///
/// The processor timebase register, and the PURR counters which advance in
/// the same unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Ticks(u64);

impl Ticks {
    pub fn new(val: u64) -> Ticks {
        Ticks(val)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }

    /// The number of ticks from `earlier` to `self`
    pub fn since(self, earlier: Ticks, counter: &'static str) -> Result<Ticks, CounterError> {
        delta(counter, earlier.0, self.0).map(Ticks)
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ticks({})", self.0)
    }
}

impl ops::Add for Ticks {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Ticks(self.0.saturating_add(rhs.0))
    }
}

/// Problems with the counters themselves, as opposed to reading them
#[derive(Debug, Clone, PartialEq)]
pub enum CounterError {
    /// A counter has a smaller value in the second reading than in the first
    WentBackwards {
        counter: &'static str,
        first: u64,
        second: u64,
    },
    /// The timebase did not advance between the two readings
    NoElapsedTime,
    /// The timebase to nanoseconds factor is zero
    NoTimebaseScale,
}

impl fmt::Display for CounterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CounterError::WentBackwards {
                counter,
                first,
                second,
            } => write!(
                f,
                "Counter {} went backwards between samples ({} -> {})",
                counter, first, second
            ),
            CounterError::NoElapsedTime => {
                write!(f, "Timebase did not advance between samples")
            }
            CounterError::NoTimebaseScale => {
                write!(f, "Timebase to nanoseconds factor is zero")
            }
        }
    }
}

/// The growth of a monotonic counter between two readings
pub fn delta(counter: &'static str, first: u64, second: u64) -> Result<u64, CounterError> {
    second
        .checked_sub(first)
        .ok_or(CounterError::WentBackwards {
            counter,
            first,
            second,
        })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn delta_of_growing_counter() {
        assert_eq!(delta("puser", 1000, 1500), Ok(500));
        assert_eq!(delta("puser", 7, 7), Ok(0));
    }

    #[test]
    fn delta_never_wraps() {
        assert_eq!(
            delta("pool_busy_time", 1500, 1000),
            Err(CounterError::WentBackwards {
                counter: "pool_busy_time",
                first: 1500,
                second: 1000,
            })
        );
    }

    #[test]
    fn ticks_since() {
        let start = Ticks::new(512_000_000);
        let end = Ticks::new(1_024_000_000);
        assert_eq!(end.since(start, "timebase_last"), Ok(Ticks::new(512_000_000)));
        assert!(start.since(end, "timebase_last").is_err());
    }

    #[test]
    fn went_backwards_message_names_counter() {
        let err = delta("shcpu_busy_time", 10, 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Counter shcpu_busy_time went backwards between samples (10 -> 3)"
        );
    }
}
