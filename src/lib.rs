//! Generate `.calc` files: the observation descriptions consumed by difxcalc
//! to compute geometric delays for VLBI correlation.

pub mod eop;
pub mod leap;
pub mod write;

use hifitime::{Duration, Epoch};
use marlu::{RADec, XyzGeocentric};

/// A single station in the array.
#[derive(Debug, Clone)]
pub struct Telescope {
    /// The station name. difxcalc indexes telescopes both positionally and by
    /// name, so names must be unique within a single file.
    pub name: String,

    /// The geocentric position of the station \[metres\].
    pub position: XyzGeocentric,
}

/// A sky position to compute delays towards.
#[derive(Debug, Clone)]
pub struct Source {
    /// The source name.
    pub name: String,

    /// Right ascension and declination \[radians\].
    pub radec: RADec,
}

/// The time span covered by the observation.
///
/// One `.calc` file describes a single scan spanning the whole window, and
/// the first source in the source list is its pointing/phase centre.
#[derive(Debug, Clone, Copy)]
pub struct ObservationWindow {
    /// The start of the observation (UTC).
    pub start: Epoch,

    /// How long the observation runs for. Must be positive.
    pub duration: Duration,
}

impl ObservationWindow {
    /// Create a new window.
    ///
    /// # Panics
    ///
    /// Panics if `duration` isn't positive.
    pub fn new(start: Epoch, duration: Duration) -> ObservationWindow {
        assert!(
            duration.to_seconds() > 0.0,
            "observation duration must be positive"
        );
        ObservationWindow { start, duration }
    }
}
