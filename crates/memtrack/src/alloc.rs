//! Instrumented wrappers over the system allocator.
//!
//! Each function behaves exactly like its [`std::alloc`] counterpart
//! (nullable on exhaustion) plus the bookkeeping side effect: successful
//! allocations are registered under the caller's source location,
//! reallocations rekey the existing record so a moved buffer keeps its
//! original allocation site, and releases unregister. In `track-off`
//! builds the bookkeeping is inert and these reduce to the bare allocator.

use std::alloc::Layout;
use std::process;

use crate::site::AllocSite;
use crate::tracker::{self, TrackError, TrackResult};

fn corrupted(err: TrackError) -> ! {
    tracing::error!(error = %err, "allocation tracker bookkeeping is corrupted");
    process::abort()
}

#[inline]
fn note(result: TrackResult) {
    if let Err(err) = result {
        corrupted(err);
    }
}

/// Allocates memory and registers the block under the caller's location.
///
/// # Safety
///
/// Same contract as [`std::alloc::alloc`]: `layout` must have non-zero
/// size.
#[track_caller]
pub unsafe fn alloc(layout: Layout) -> *mut u8 {
    let site = AllocSite::caller();
    // SAFETY: contract forwarded to the caller.
    let ptr = unsafe { std::alloc::alloc(layout) };
    // Registering null is a no-op, so exhaustion needs no special case.
    note(tracker::global().register(ptr, site));
    ptr
}

/// Allocates zero-initialized memory and registers the block under the
/// caller's location.
///
/// # Safety
///
/// Same contract as [`std::alloc::alloc_zeroed`].
#[track_caller]
pub unsafe fn alloc_zeroed(layout: Layout) -> *mut u8 {
    let site = AllocSite::caller();
    // SAFETY: contract forwarded to the caller.
    let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
    note(tracker::global().register(ptr, site));
    ptr
}

/// Resizes (possibly moving) a block and rekeys its record to the new
/// address. The record keeps its original site, so leak reports attribute
/// a resized buffer to where it was first allocated. A failed reallocation
/// leaves the registry untouched; the old block is still live.
///
/// # Safety
///
/// Same contract as [`std::alloc::realloc`]: `ptr` must be a block
/// allocated through this facade with `layout`, and `new_size` must be
/// non-zero.
pub unsafe fn realloc(ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
    // SAFETY: contract forwarded to the caller.
    let new_ptr = unsafe { std::alloc::realloc(ptr, layout, new_size) };
    if !new_ptr.is_null() {
        note(tracker::global().change_register(ptr, new_ptr));
    }
    new_ptr
}

/// Unregisters and releases a block. A null pointer is a no-op.
///
/// The record is removed before the memory is returned to the allocator,
/// so an immediate reuse of the address by another thread cannot collide
/// in the registry.
///
/// # Safety
///
/// Same contract as [`std::alloc::dealloc`]: a non-null `ptr` must be a
/// block allocated through this facade with `layout`.
pub unsafe fn dealloc(ptr: *mut u8, layout: Layout) {
    if ptr.is_null() {
        return;
    }
    note(tracker::global().unregister(ptr));
    // SAFETY: contract forwarded to the caller.
    unsafe { std::alloc::dealloc(ptr, layout) };
}
