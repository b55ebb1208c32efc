use std::fmt;
use std::panic::Location;

/// Origin of a tracked allocation: the source file and line that requested it.
///
/// This is the only metadata the tracker keeps about an allocation besides
/// its address, and it is surfaced verbatim to [`trace`](crate::Tracker::trace)
/// visitors. Sites are captured automatically at allocation call sites via
/// [`AllocSite::caller`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AllocSite {
    file: &'static str,
    line: u32,
}

impl AllocSite {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// Captures the location of the nearest non-`#[track_caller]` frame.
    ///
    /// The instrumented allocation entry points are all `#[track_caller]`,
    /// so the recorded site is the user call site, not a frame inside this
    /// crate.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }

    pub const fn file(&self) -> &'static str {
        self.file
    }

    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Final path component of the source file, for compact report lines.
    pub fn file_name(&self) -> &'static str {
        self.file.rsplit(['/', '\\']).next().unwrap_or(self.file)
    }
}

impl fmt::Display for AllocSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
