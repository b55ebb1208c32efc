//! Leak enumeration at a checkpoint.
//!
//! A [`LeakReport`] is a snapshot of every allocation the tracker still
//! considers live, typically captured at process shutdown: an empty report
//! means no tracked allocation leaked.

use std::fmt;

use crate::site::AllocSite;
use crate::tracker::{self, TrackResult, Tracker};

/// One live allocation at capture time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeakEntry {
    pub address: usize,
    pub site: AllocSite,
}

/// Snapshot of the allocations still tracked at a checkpoint.
///
/// # Examples
///
/// ```rust
/// # #[cfg(not(feature = "track-off"))]
/// # {
/// use memtrack::{LeakReport, TrackedVec};
///
/// let values = TrackedVec::<u32>::with_len(8);
/// let report = LeakReport::capture().unwrap();
/// assert!(report
///     .entries()
///     .iter()
///     .any(|entry| entry.address == values.as_ptr() as usize));
/// # }
/// ```
pub struct LeakReport {
    entries: Vec<LeakEntry>,
}

impl LeakReport {
    /// Captures the global tracker's live set, in registration order.
    pub fn capture() -> TrackResult<Self> {
        Self::capture_from(tracker::global())
    }

    /// Captures the live set of a specific tracker instance.
    pub fn capture_from(tracker: &Tracker) -> TrackResult<Self> {
        let mut entries = Vec::new();
        tracker.trace(|addr, site| {
            entries.push(LeakEntry {
                address: addr as usize,
                site,
            })
        })?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LeakEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forwards every entry to the logging collaborator as a warning.
    ///
    /// Installing a `tracing` subscriber is optional; without one this
    /// emits nothing. Correctness never depends on it.
    pub fn emit(&self) {
        for entry in &self.entries {
            tracing::warn!(
                address = %format_args!("{:#x}", entry.address),
                site = %entry.site,
                "allocation still live"
            );
        }
    }
}

impl fmt::Display for LeakReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "no live allocations");
        }
        writeln!(f, "{} live allocation(s):", self.entries.len())?;
        for entry in &self.entries {
            writeln!(f, "  {:#014x} allocated at {}", entry.address, entry.site)?;
        }
        Ok(())
    }
}
