//! Instrumented dynamic-array and allocation-tracking primitives for manual
//! memory management debugging.
//!
//! Three pieces work together:
//!
//! - [`Tracker`]: a process-wide registry of live allocations, each keyed
//!   by address and carrying the source location that requested it;
//! - the [`alloc`] facade: `std::alloc` wrappers that register, rekey and
//!   unregister on every allocate / reallocate / release;
//! - [`TrackedVec`]: a growable array built on the facade, whose backing
//!   buffer keeps its original allocation site across every reallocation.
//!
//! At a checkpoint (typically shutdown) a [`LeakReport`] enumerates
//! everything still tracked; a non-empty report pinpoints each leaked
//! buffer's origin.
//!
//! Enable the `track-off` feature to compile all tracking away: the same
//! API remains, the tracker becomes inert, and the facade and `TrackedVec`
//! behave as plain allocation wrappers with zero diagnostic overhead.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(not(feature = "track-off"))]
//! # {
//! use memtrack::{LeakReport, TrackedVec};
//!
//! fn leaky() -> usize {
//!     let mut values = TrackedVec::new();
//!     values.push(1u32);
//!     let addr = values.as_ptr() as usize;
//!     std::mem::forget(values);
//!     addr
//! }
//!
//! let addr = leaky();
//! let report = LeakReport::capture().unwrap();
//! assert!(report.entries().iter().any(|entry| entry.address == addr));
//! # }
//! ```

pub mod alloc;
pub mod report;
mod site;
pub mod tracker;
mod vec;

pub use report::{LeakEntry, LeakReport};
pub use site::AllocSite;
pub use tracker::{global, TrackError, TrackResult, Tracker};
pub use vec::TrackedVec;
