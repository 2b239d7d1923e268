//! JPL SPK ephemeris reading.
//!
//! Reads NAIF DAF/SPK binary kernels (de421.bsp, de422.bsp, ...) and
//! evaluates Chebyshev position records for solar system bodies.

mod chebyshev;
mod daf;
mod kernel;
mod spk;

pub use kernel::SpiceKernel;

use std::path::PathBuf;
use thiserror::Error;

/// AU in kilometers (IAU 2012 exact definition).
pub const AU_KM: f64 = 149_597_870.7;
/// J2000 epoch as a Julian date.
pub const J2000_JD: f64 = 2_451_545.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Convert a Julian date to TDB seconds past J2000.
pub fn jd_to_seconds(jd: f64) -> f64 {
    (jd - J2000_JD) * SECONDS_PER_DAY
}

/// Convert TDB seconds past J2000 to a Julian date.
pub fn seconds_to_jd(et: f64) -> f64 {
    J2000_JD + et / SECONDS_PER_DAY
}

#[derive(Debug, Error)]
pub enum EphemError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid SPK file: {0}")]
    InvalidFormat(String),

    #[error("JD {jd} is outside ephemeris coverage ({start_jd}..{end_jd})")]
    OutOfRange { jd: f64, start_jd: f64, end_jd: f64 },

    #[error("no segment for center {center} -> target {target}")]
    SegmentNotFound { center: i32, target: i32 },

    #[error("no chain from the solar system barycenter to body {0}")]
    NoChain(i32),

    #[error("unsupported SPK data type {0}")]
    UnsupportedDataType(i32),
}

pub type Result<T> = std::result::Result<T, EphemError>;
