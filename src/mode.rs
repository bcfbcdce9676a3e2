//! Deciding what can be monitored on this partition
//!
//! The processor mode is read from the first snapshot and held for the whole
//! run. Some combinations of mode and requested checks cannot produce a
//! meaningful result; those are rejected before any time is spent waiting
//! for the second snapshot.

use std::fmt;

use crate::perfstat::ModeFlags;
use crate::Status;

/// How the partition gets its processors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Shared processors, pool utilization visible
    SharedWithAuthority,
    /// Shared processors, pool utilization hidden by the partition profile
    SharedWithoutAuthority,
    /// Dedicated processors, idle cycles donated to the pool
    DedicatedDonating,
    /// Dedicated processors, nothing to measure against
    DedicatedPlain,
}

impl Mode {
    pub fn from_flags(flags: &ModeFlags) -> Mode {
        match (flags.shared_enabled, flags.pool_util_authority, flags.donate_enabled) {
            (true, true, _) => Mode::SharedWithAuthority,
            (true, false, _) => Mode::SharedWithoutAuthority,
            (false, _, true) => Mode::DedicatedDonating,
            (false, _, false) => Mode::DedicatedPlain,
        }
    }

    pub fn is_shared(self) -> bool {
        match self {
            Mode::SharedWithAuthority | Mode::SharedWithoutAuthority => true,
            _ => false,
        }
    }

    /// Whether pool utilization counters are meaningful
    pub fn has_pool_data(self) -> bool {
        self == Mode::SharedWithAuthority
    }
}

/// Reasons to stop after the first snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Pool checks requested, but the profile hides pool utilization
    CollectionDisabled,
    /// Neither shared nor donating: there is no entitlement or pool
    Dedicated,
    /// Pool checks requested on a donating dedicated partition
    DonatingWithoutPool,
}

impl Rejection {
    pub fn status(self) -> Status {
        match self {
            Rejection::CollectionDisabled => Status::Critical,
            Rejection::Dedicated | Rejection::DonatingWithoutPool => Status::Unknown,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Rejection::CollectionDisabled => {
                "Performance collection is disabled in LPAR profile! Monitoring is not possible!"
            }
            Rejection::Dedicated => {
                "Entitlement and pool data not available in dedicated LPAR mode"
            }
            Rejection::DonatingWithoutPool => {
                "Pool data is not available in dedicated donating mode!"
            }
        })
    }
}

/// Pick the mode for this run, or the reason the run cannot go on
///
/// The rules are applied in order, so a shared partition without authority
/// is always rejected as `CollectionDisabled` when pool checks are requested.
pub fn select(flags: &ModeFlags, pool_requested: bool) -> Result<Mode, Rejection> {
    if pool_requested && flags.shared_enabled && !flags.pool_util_authority {
        return Err(Rejection::CollectionDisabled);
    }
    if !flags.donate_enabled && !flags.shared_enabled {
        return Err(Rejection::Dedicated);
    }
    if flags.donate_enabled && pool_requested {
        return Err(Rejection::DonatingWithoutPool);
    }
    Ok(Mode::from_flags(flags))
}
