//! Header space reservation.
//!
//! The pinned logo header has no fixed rendered height (dynamic type, asset
//! size), so the scroll content is offset by whatever the renderer last
//! measured. Measurements arrive on every layout pass and some are junk: zero
//! before the first pass settles, or the full screen height during a
//! transition. [`HeaderReservationTracker`] keeps only plausible values and
//! never lets the reservation fall below the logo footprint.

use serde::{Deserialize, Serialize};

/// Largest header height taken as real; anything above is a layout glitch.
pub const DEFAULT_HEADER_CEILING: f64 = 500.0;

/// Logo max height (180) plus its top padding (4).
pub const DEFAULT_MINIMUM_FALLBACK: f64 = 184.0;

/// Acceptance window and floor for header measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderBounds {
    pub ceiling: f64,
    pub minimum_fallback: f64,
}

impl Default for HeaderBounds {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_HEADER_CEILING,
            minimum_fallback: DEFAULT_MINIMUM_FALLBACK,
        }
    }
}

impl HeaderBounds {
    /// Whether a raw measurement is worth taking: finite, above zero, not above the ceiling.
    pub fn admits(&self, measurement: f64) -> bool {
        measurement.is_finite() && measurement > 0.0 && measurement <= self.ceiling
    }
}

/// Result of feeding one measurement to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reservation {
    /// The reserved height changed to this value.
    Updated(f64),
    /// Measurement rejected, or accepted without changing the reservation.
    Unchanged,
}

/// Turns a stream of measured header heights into a stable content offset.
#[derive(Debug, Clone)]
pub struct HeaderReservationTracker {
    bounds: HeaderBounds,
    reserved: f64,
    last_accepted: Option<f64>,
}

impl Default for HeaderReservationTracker {
    fn default() -> Self {
        Self::new(HeaderBounds::default())
    }
}

impl HeaderReservationTracker {
    /// Starts out reserving `bounds.minimum_fallback`, so the first frame is never zero.
    pub fn new(bounds: HeaderBounds) -> Self {
        Self {
            bounds,
            reserved: bounds.minimum_fallback,
            last_accepted: None,
        }
    }

    pub fn bounds(&self) -> HeaderBounds {
        self.bounds
    }

    /// Height currently reserved above the scroll content.
    pub fn reserved(&self) -> f64 {
        self.reserved
    }

    /// Most recent raw measurement that passed the filter.
    pub fn last_accepted(&self) -> Option<f64> {
        self.last_accepted
    }

    /// Feed one raw measurement.
    ///
    /// Rejected values (≤ 0, above the ceiling, non-finite) leave the held
    /// reservation untouched.
    pub fn accept(&mut self, measurement: f64) -> Reservation {
        if !self.bounds.admits(measurement) {
            tracing::debug!(
                measurement,
                ceiling = self.bounds.ceiling,
                "ignoring transient header measurement"
            );
            return Reservation::Unchanged;
        }

        self.last_accepted = Some(measurement);
        let next = measurement.max(self.bounds.minimum_fallback);
        if next == self.reserved {
            return Reservation::Unchanged;
        }

        tracing::debug!(from = self.reserved, to = next, "header reservation updated");
        self.reserved = next;
        Reservation::Updated(next)
    }
}
