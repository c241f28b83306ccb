use core::{
    marker::PhantomData,
    mem::size_of,
    ptr::{self, NonNull},
};
use std::alloc;

use strata_logging::{log_error, LogCategory};

use crate::{
    alloc::{allocate_array, deallocate_array},
    collections::TryReserveError,
};

const LOG_CAT: LogCategory = LogCategory::new_with_sub("collections", "array");

/// Low level utility for more ergonomically allocating, reallocating, and deallocating a buffer of memory
/// without having to worry about all the corner cases involved.
/// In particular:
///
/// - Produces a dangling pointer on zero-sized types and on zero-length allocations.
/// - Avoids freeing the dangling pointer.
/// - Catches all overflows in capacity computations (promotes them to "capacity overflow" errors).
/// - Never grows implicitly, every change in capacity is requested by the owner.
///
/// This type does not in anyway inspect the memory it manages. When dropped it *will* free its memory, but it *won't* try to drop its contents.
/// It is up to the user of `RawArray` to handle the actual things *stored* inside of `RawArray`.
///
/// Zero-sized types never allocate, but their capacity is still tracked, so `capacity()` returns what was last requested.
pub(crate) struct RawArray<T> {
    ptr:      NonNull<T>,
    cap:      usize,
    _phantom: PhantomData<T>,
}

impl<T> RawArray<T> {
    /// Largest number of elements a `RawArray<T>` can hold, which makes sure the total size never exceeds `isize::MAX` bytes.
    pub const MAX_SIZE: usize = isize::MAX as usize / if size_of::<T>() == 0 { 1 } else { size_of::<T>() };

    /// Creates an empty `RawArray` without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self { ptr: NonNull::dangling(), cap: 0, _phantom: PhantomData }
    }

    /// Creates a `RawArray` with exactly the capacity and alignment requirements for a `[T; capacity]`.
    ///
    /// Non-fallible version of `try_with_capacity`.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity exceeds [`RawArray::MAX_SIZE`].
    ///
    /// # Aborts
    ///
    /// Aborts on OOM
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(arr) => arr,
            Err(err) => handle_error(err),
        }
    }

    /// Tries to create a `RawArray` with exactly the capacity and alignment requirements for a `[T; capacity]`.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        if capacity > Self::MAX_SIZE {
            return Err(TryReserveError::CapacityOverflow);
        }
        let ptr = allocate_array::<T>(capacity)?;
        Ok(Self { ptr, cap: capacity, _phantom: PhantomData })
    }

    /// Get the capacity of the allocation.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Get a raw pointer to the start of the allocation.
    /// Note that this is a dangling pointer when either `capacity() == 0` or `T` is zero-sized.
    #[inline]
    pub const fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Ensures that the buffer contains at least enough space to hold `len + additional` elements.
    /// If it doesn't already have enough capacity, will reallocate to the larger of double the current capacity or the required capacity,
    /// to get amortized *O*(1) behavior.
    ///
    /// `len` may not exceed `self.capacity()`, and the first `len` elements are moved to the new allocation.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds [`RawArray::MAX_SIZE`].
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    pub fn reserve(&mut self, len: usize, additional: usize) {
        // Callers expect this function to be very cheap when there is already sufficient capacity.
        // Therefore, we move all the resizing and error-handling logic behind a call,
        // while making sure that this function is likely to be inlined as just a comparison and a call if the comparison fails.
        #[cold]
        fn do_reserve_and_handle<T>(slf: &mut RawArray<T>, len: usize, additional: usize) {
            if let Err(err) = slf.grow_amortized(len, additional) {
                handle_error(err);
            }
        }

        if self.needs_to_grow(len, additional) {
            do_reserve_and_handle(self, len, additional);
        }
    }

    /// A specialized version of `self.reserve(len, 1)`, which requires the caller to ensure `len == self.capacity()`.
    pub fn grow_one(&mut self) {
        if let Err(err) = self.grow_amortized(self.cap, 1) {
            handle_error(err);
        }
    }

    /// Ensures that the buffer can hold exactly `new_capacity` elements, moving the first `len` elements into the new allocation.
    ///
    /// Does nothing if the capacity already is large enough.
    pub fn try_reserve_exact(&mut self, len: usize, new_capacity: usize) -> Result<(), TryReserveError> {
        debug_assert!(len <= self.cap);
        if new_capacity <= self.cap {
            return Ok(());
        }
        self.relocate(len, new_capacity)
    }

    /// Shrinks the buffer down to exactly `len` elements, which are moved into the new allocation.
    /// If `len` is 0, actually completely deallocates.
    ///
    /// On failure, the buffer is left untouched.
    pub fn try_shrink_to_fit(&mut self, len: usize) -> Result<(), TryReserveError> {
        assert!(len <= self.cap, "Tried to shrink to a larger capacity");
        if len == self.cap {
            return Ok(());
        }
        self.relocate(len, len)
    }

    //--------------------------------------------------------------

    /// Returns if the buffer needs to grow to fulfill the needed extra capacity.
    /// Mainly used to make inlining reserve-calls possible without inlining `grow`.
    #[inline]
    fn needs_to_grow(&self, len: usize, additional: usize) -> bool {
        additional > self.cap.wrapping_sub(len)
    }

    fn grow_amortized(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        debug_assert!(additional > 0);
        let required = len.checked_add(additional).ok_or(TryReserveError::CapacityOverflow)?;
        let new_cap = Self::grown_capacity(self.cap, required)?;
        self.relocate(len, new_cap)
    }

    /// Capacity to grow to when at least `required` elements are needed: double the current capacity, or the required capacity, whichever is bigger.
    ///
    /// Doubling stops at `MAX_SIZE`, only a `required` capacity over that limit is an error.
    pub fn grown_capacity(cur_capacity: usize, required: usize) -> Result<usize, TryReserveError> {
        if required > Self::MAX_SIZE {
            return Err(TryReserveError::CapacityOverflow);
        }
        let double_cap = cur_capacity.saturating_mul(2).min(Self::MAX_SIZE);
        Ok(double_cap.max(required).max(1))
    }

    /// Move the first `len` elements into a new allocation of exactly `new_cap` elements and release the old one.
    ///
    /// Moving is a bitwise copy, so once the new allocation succeeded, nothing can fail anymore.
    fn relocate(&mut self, len: usize, new_cap: usize) -> Result<(), TryReserveError> {
        debug_assert!(len <= new_cap && len <= self.cap);
        if new_cap > Self::MAX_SIZE {
            return Err(TryReserveError::CapacityOverflow);
        }

        let new_ptr = allocate_array::<T>(new_cap)?;
        // SAFETY:
        // - Both allocations are valid for at least `len` elements and don't overlap.
        // - The old allocation was returned by `allocate_array` for `self.cap` elements (or is dangling with a zero-sized layout).
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), len);
            deallocate_array(self.ptr, self.cap);
        }
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }
}

impl<T> Drop for RawArray<T> {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `allocate_array` for `cap` elements, or is dangling for a zero-sized layout, which is ignored.
        unsafe { deallocate_array(self.ptr, self.cap) };
    }
}

// SAFETY: `RawArray` owns its buffer
unsafe impl<T: Send> Send for RawArray<T> {}
// SAFETY: `RawArray` hands out no references to its contents
unsafe impl<T: Sync> Sync for RawArray<T> {}

/// Central function for reserve error handling
#[cold]
#[track_caller]
pub(crate) fn handle_error(e: TryReserveError) -> ! {
    match e {
        TryReserveError::CapacityOverflow => capacity_overflow(),
        TryReserveError::AllocError { layout } => alloc::handle_alloc_error(layout),
    }
}

#[track_caller]
fn capacity_overflow() -> ! {
    log_error!(LOG_CAT, "Requested capacity exceeds the maximum size");
    panic!("capacity overflow");
}
