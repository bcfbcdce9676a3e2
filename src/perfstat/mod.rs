//! Partition-wide counters, as exported by the platform performance library
//!
//! A [`Snapshot`] is one reading of the partition totals. Readings come from
//! a [`Sampler`]; the built-in one is [`CounterFile`], which re-reads a
//! `key=value` dump of the partition totals every time it is asked for a
//! sample. The keys use the performance library's own field names:
//!
//! ```text
//! # partition_total
//! timebase_last=1024000000
//! xint=125
//! xfrac=16
//! puser=...
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use derive_more::From;
use lazy_static::lazy_static;
use regex::Regex;

use crate::timebase::Ticks;

/// Errors acquiring a reading of the partition counters
#[derive(Debug, From)]
pub enum SnapshotError {
    /// The counter source could not be read
    Io(io::Error),
    /// A line that is neither blank, a comment, nor `key=value`
    #[from(ignore)]
    Malformed { line: usize, text: String },
    /// A required counter is absent
    #[from(ignore)]
    MissingField(&'static str),
    /// A required counter is present but does not parse
    #[from(ignore)]
    InvalidValue { field: &'static str, value: String },
    /// A timebase conversion factor (`xint` or `xfrac`) is zero
    #[from(ignore)]
    ZeroScale(&'static str),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter) -> StdResult<(), fmt::Error> {
        use self::SnapshotError::*;
        match self {
            Io(e) => write!(f, "{}", e),
            Malformed { line, text } => write!(f, "malformed line {}: '{}'", line, text),
            MissingField(field) => write!(f, "missing counter '{}'", field),
            InvalidValue { field, value } => {
                write!(f, "invalid value for '{}': '{}'", field, value)
            }
            ZeroScale(field) => write!(f, "{} must not be 0", field),
        }
    }
}

pub type Result<T> = StdResult<T, SnapshotError>;

/// How the partition is configured to use processors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeFlags {
    /// The partition runs on the shared processor pool
    pub shared_enabled: bool,
    /// The partition is dedicated, but donates idle cycles to the pool
    pub donate_enabled: bool,
    /// The partition profile allows it to see pool utilization
    pub pool_util_authority: bool,
}

/// One reading of the partition totals
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub timebase_last: Ticks,
    /// Numerator of the timebase to nanoseconds conversion
    pub xint: u64,
    /// Denominator of the timebase to nanoseconds conversion
    pub xfrac: u64,

    // ////
    // PURR based consumption of this partition, in timebase ticks
    pub puser: u64,
    pub psys: u64,
    pub pidle: u64,
    pub pwait: u64,

    // ////
    // Pool counters, in nanoseconds
    pub pool_busy_time: u64,
    pub pool_idle_time: u64,
    pub shcpu_busy_time: u64,

    // ////
    // Capacities
    /// Entitled capacity in hundredths of a processor
    pub entitled_proc_capacity: u64,
    pub online_cpus: u32,
    pub pool_id: u32,
    pub phys_cpus_pool: u32,
    pub shcpus_in_sys: u32,

    pub flags: ModeFlags,
}

impl Snapshot {
    /// Read the counter dump at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        contents.parse()
    }

    /// Nanoseconds per timebase tick
    pub fn ns_per_tick(&self) -> f64 {
        self.xint as f64 / self.xfrac as f64
    }

    /// Entitled capacity in processors
    pub fn entitlement(&self) -> f64 {
        self.entitled_proc_capacity as f64 / 100.0
    }
}

lazy_static! {
    static ref COUNTER_LINE: Regex =
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(\S+)\s*$").unwrap();
}

struct Fields<'a>(HashMap<&'a str, &'a str>);

impl<'a> Fields<'a> {
    fn get<T: FromStr>(&self, field: &'static str) -> Result<T> {
        let raw = self
            .0
            .get(field)
            .ok_or(SnapshotError::MissingField(field))?;
        raw.parse().map_err(|_| SnapshotError::InvalidValue {
            field,
            value: raw.to_string(),
        })
    }

    fn flag(&self, field: &'static str) -> Result<bool> {
        let raw = self
            .0
            .get(field)
            .ok_or(SnapshotError::MissingField(field))?;
        match *raw {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            other => Err(SnapshotError::InvalidValue {
                field,
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for Snapshot {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Snapshot> {
        let mut fields = HashMap::new();
        for (i, line) in s.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let caps = COUNTER_LINE
                .captures(line)
                .ok_or_else(|| SnapshotError::Malformed {
                    line: i + 1,
                    text: line.to_string(),
                })?;
            if let (Some(k), Some(v)) = (caps.get(1), caps.get(2)) {
                fields.insert(k.as_str(), v.as_str());
            }
        }
        let fields = Fields(fields);

        let snapshot = Snapshot {
            timebase_last: Ticks::new(fields.get("timebase_last")?),
            xint: fields.get("xint")?,
            xfrac: fields.get("xfrac")?,
            puser: fields.get("puser")?,
            psys: fields.get("psys")?,
            pidle: fields.get("pidle")?,
            pwait: fields.get("pwait")?,
            pool_busy_time: fields.get("pool_busy_time")?,
            pool_idle_time: fields.get("pool_idle_time")?,
            shcpu_busy_time: fields.get("shcpu_busy_time")?,
            entitled_proc_capacity: fields.get("entitled_proc_capacity")?,
            online_cpus: fields.get("online_cpus")?,
            pool_id: fields.get("pool_id")?,
            phys_cpus_pool: fields.get("phys_cpus_pool")?,
            shcpus_in_sys: fields.get("shcpus_in_sys")?,
            flags: ModeFlags {
                shared_enabled: fields.flag("shared_enabled")?,
                donate_enabled: fields.flag("donate_enabled")?,
                pool_util_authority: fields.flag("pool_util_authority")?,
            },
        };
        if snapshot.xint == 0 {
            return Err(SnapshotError::ZeroScale("xint"));
        }
        if snapshot.xfrac == 0 {
            return Err(SnapshotError::ZeroScale("xfrac"));
        }
        Ok(snapshot)
    }
}

/// A source of partition counter readings
pub trait Sampler {
    /// Take one reading of the partition totals
    fn sample(&mut self) -> Result<Snapshot>;

    /// Block until the next reading should be taken
    fn wait(&mut self, interval: Duration) {
        thread::sleep(interval)
    }
}

/// Reads the partition totals from a counter dump on disk
#[derive(Debug, Clone)]
pub struct CounterFile {
    path: PathBuf,
}

impl CounterFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> CounterFile {
        CounterFile { path: path.into() }
    }
}

impl Sampler for CounterFile {
    fn sample(&mut self) -> Result<Snapshot> {
        Snapshot::load(&self.path)
    }
}
