use std::alloc::{handle_alloc_error, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

use bytemuck::Zeroable;

use crate::alloc;

/// A growable contiguous array whose backing buffer is a tracked
/// allocation.
///
/// Capacity is managed automatically: after any size change the capacity
/// doubles until it covers the logical length, and halves once when more
/// than twice the length (the 2x hysteresis band prevents grow/shrink
/// thrashing under alternating push/remove). Reallocation rekeys the
/// buffer's tracker record in place, so leak reports always attribute the
/// buffer to the site that created the array, no matter how often it has
/// moved.
///
/// # Ownership policy
///
/// Elements are moved in ([`push`](Self::push), [`insert`](Self::insert))
/// and moved out ([`remove`](Self::remove)). Dropping the array releases
/// **only the backing buffer** and never runs element destructors:
/// dropping a `TrackedVec<TrackedVec<T>>` leaves the inner buffers live
/// and tracked, which is exactly the leak the tracker exists to surface.
/// Element types owning other resources must be drained by the caller
/// first.
///
/// No internal synchronization is provided; concurrent mutation of one
/// instance must be serialized by the caller.
///
/// # Examples
///
/// ```rust
/// use memtrack::TrackedVec;
///
/// let mut values = TrackedVec::new();
/// for n in 0..10 {
///     values.push(n);
/// }
/// assert_eq!(values.len(), 10);
/// assert!(values.capacity() >= 10);
/// assert_eq!(values.find(&7), Some(7));
/// ```
pub struct TrackedVec<T> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send> Send for TrackedVec<T> {}
unsafe impl<T: Sync> Sync for TrackedVec<T> {}

impl<T> TrackedVec<T> {
    // The facade delegates to the system allocator, which rejects
    // zero-size layouts.
    const NOT_ZST: () = assert!(
        mem::size_of::<T>() != 0,
        "TrackedVec does not support zero-sized element types"
    );

    fn layout(cap: usize) -> Layout {
        Layout::array::<T>(cap).expect("capacity overflow")
    }

    #[track_caller]
    fn alloc_buffer(cap: usize, zeroed: bool) -> NonNull<T> {
        let layout = Self::layout(cap);
        // SAFETY: cap >= 1 and T is not zero-sized, so the layout has
        // non-zero size.
        let raw = unsafe {
            if zeroed {
                alloc::alloc_zeroed(layout)
            } else {
                alloc::alloc(layout)
            }
        };
        match NonNull::new(raw as *mut T) {
            Some(ptr) => ptr,
            None => handle_alloc_error(layout),
        }
    }

    /// Creates an empty array. One slot of capacity is allocated up front
    /// and registered under the caller's source location.
    #[track_caller]
    pub fn new() -> Self {
        let _ = Self::NOT_ZST;
        let ptr = Self::alloc_buffer(1, false);
        Self {
            ptr,
            len: 0,
            cap: 1,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: every slot in [0, len) was written by push/insert/resize
        // before becoming reachable.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for as_slice, plus exclusive access through &mut self.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Appends `elem` to the end of the array.
    pub fn push(&mut self, elem: T) {
        self.len += 1;
        self.grow_if_needed();
        // SAFETY: grow_if_needed restored cap >= len, so len - 1 is in
        // bounds of the buffer.
        unsafe { self.ptr.as_ptr().add(self.len - 1).write(elem) };
    }

    /// Inserts `elem` at `index`, shifting the elements at `[index, len)`
    /// up by one.
    ///
    /// An `index` past the current length is a silent no-op (the element
    /// is dropped), not an error; callers that need to distinguish "did
    /// nothing" from "succeeded" must pre-validate the index.
    pub fn insert(&mut self, index: usize, elem: T) {
        if index > self.len {
            return;
        }
        self.len += 1;
        self.grow_if_needed();
        // SAFETY: index <= len - 1 < cap after growth; the shifted range
        // stays inside the buffer.
        unsafe {
            let base = self.ptr.as_ptr();
            ptr::copy(base.add(index), base.add(index + 1), self.len - 1 - index);
            base.add(index).write(elem);
        }
    }

    /// Removes and returns the element at `index`, shifting the elements
    /// at `[index + 1, len)` down by one.
    ///
    /// An out-of-range `index` returns `None` and leaves the array
    /// unchanged.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        // SAFETY: index < len, so both the read and the shifted range are
        // in bounds; the vacated slot is no longer reachable once len
        // shrinks.
        let elem = unsafe {
            let base = self.ptr.as_ptr();
            let elem = base.add(index).read();
            ptr::copy(base.add(index + 1), base.add(index), self.len - index - 1);
            elem
        };
        self.len -= 1;
        self.shrink_if_needed();
        Some(elem)
    }

    /// Returns the lowest index whose element equals `elem`, or `None`.
    pub fn find(&self, elem: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.as_slice().iter().position(|candidate| candidate == elem)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    fn grow_if_needed(&mut self) {
        if self.cap >= self.len {
            return;
        }
        let mut new_cap = self.cap;
        while new_cap < self.len {
            new_cap *= 2;
        }
        self.reallocate(new_cap);
    }

    fn shrink_if_needed(&mut self) {
        if self.cap > self.len * 2 && self.cap > 1 {
            self.reallocate(self.cap / 2);
        }
    }

    fn reallocate(&mut self, new_cap: usize) {
        debug_assert!(new_cap >= self.len.max(1));
        let old_layout = Self::layout(self.cap);
        let new_layout = Self::layout(new_cap);
        // SAFETY: the buffer was allocated through the facade with
        // old_layout, and the new size is non-zero. The facade rekeys the
        // tracker record to the new address.
        let raw = unsafe {
            alloc::realloc(self.ptr.as_ptr() as *mut u8, old_layout, new_layout.size())
        };
        let Some(ptr) = NonNull::new(raw as *mut T) else {
            handle_alloc_error(new_layout);
        };
        self.ptr = ptr;
        self.cap = new_cap;
    }
}

impl<T: Zeroable> TrackedVec<T> {
    /// Creates an array of `len` zero-initialized elements. Capacity is
    /// `max(len, 1)`; the buffer is registered under the caller's source
    /// location.
    #[track_caller]
    pub fn with_len(len: usize) -> Self {
        let _ = Self::NOT_ZST;
        let cap = len.max(1);
        let ptr = Self::alloc_buffer(cap, true);
        Self {
            ptr,
            len,
            cap,
            _marker: PhantomData,
        }
    }

    /// Sets the logical length, zero-filling any newly exposed slots, then
    /// applies the growth/shrink policy.
    pub fn resize(&mut self, new_len: usize) {
        let old_len = self.len;
        self.len = new_len;
        self.grow_if_needed();
        if new_len > old_len {
            // realloc leaves the grown region uninitialized.
            // SAFETY: cap >= new_len after growth, so the filled range is
            // in bounds.
            unsafe {
                ptr::write_bytes(self.ptr.as_ptr().add(old_len), 0, new_len - old_len);
            }
        }
        self.shrink_if_needed();
    }
}

impl<T> Drop for TrackedVec<T> {
    fn drop(&mut self) {
        // Releases only the backing buffer; element destructors are not
        // run (see the ownership policy above).
        // SAFETY: the buffer was allocated through the facade with this
        // layout and is exclusively owned.
        unsafe { alloc::dealloc(self.ptr.as_ptr() as *mut u8, Self::layout(self.cap)) };
    }
}

impl<T> Default for TrackedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for TrackedVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for TrackedVec<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for TrackedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
