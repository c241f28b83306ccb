use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    iter,
    mem::{self, ManuallyDrop},
    ops::{self, Bound, Index, IndexMut, RangeBounds},
    ptr,
    slice::{self, SliceIndex},
};

use scopeguard::{guard, ScopeGuard};
use strata_logging::{log_debug, LogCategory};

use super::{
    imp::array::{handle_error, RawArray},
    impl_slice_partial_eq_generic,
    DynArrError,
    TryReserveError,
};

mod into_iter;

pub use into_iter::IntoIter;

const LOG_CAT: LogCategory = LogCategory::new_with_sub("collections", "dynarr");

/// A contiguous growable array type, written as `DynArr<T>`, short for 'dynamic array'.
///
/// # Examples
///
/// ```
/// use strata_common::{collections::DynArr, dynarr};
///
/// let mut arr = DynArr::new();
/// arr.push(1);
/// arr.push(2);
///
/// assert_eq!(arr.len(), 2);
/// assert_eq!(arr[0], 1);
///
/// assert_eq!(arr.pop(), Some(2));
/// assert_eq!(arr.len(), 1);
///
/// arr[0] = 7;
/// assert_eq!(arr[0], 7);
///
/// arr.extend([1, 2, 3]);
///
/// for x in &arr {
///     println!("{x}");
/// }
/// assert_eq!(arr, [7, 1, 2, 3]);
/// ```
///
/// The [`dynarr!`] macro is provided for convenient initialization:
///
/// ```
/// use strata_common::dynarr;
///
/// let mut arr = dynarr![1, 2, 3];
/// arr.push(4);
/// assert_eq!(arr, [1, 2, 3, 4]);
///
/// let zeros = dynarr![0; 5];
/// assert_eq!(zeros, [0, 0, 0, 0, 0]);
/// ```
///
/// # Capacity and reallocation
///
/// The capacity of a dynamic array is the amount of space allocated for any future elements that will be added onto it.
/// This is not to be confused with the *length* of the array, which specifies the number of actual elements within it.
/// If the length would exceed the capacity, the capacity is doubled (or grows to the required capacity, whichever is larger),
/// and the elements are moved to the new buffer.
///
/// The array never shrinks implicitly, only [`DynArr::shrink_to_fit`] gives memory back.
///
/// # Guarantees
///
/// Moving elements into a new buffer is a bitwise copy that can't fail, so growing either fully succeeds or leaves the array untouched.
/// When user code panics inside an operation (a `Clone`, `Default` or closure call), the array only keeps the elements that are fully constructed,
/// and every buffer is released exactly once.
///
/// Positions are passed and returned as indices.
/// Passing a reference into the array to one of its own mutating methods is rejected by the borrow checker,
/// so self-assignment and self-swap can't happen.
pub struct DynArr<T> {
    arr: RawArray<T>,
    len: usize,
}

impl<T> DynArr<T> {
    /// Constructs a new, empty `DynArr<T>`.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::collections::DynArr;
    ///
    /// let arr: DynArr<i32> = DynArr::new();
    /// assert_eq!(arr.capacity(), 0);
    /// assert!(arr.data().is_null());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { arr: RawArray::new(), len: 0 }
    }

    /// Constructs a new, empty `DynArr<T>` with exactly the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if the capacity exceeds [`DynArr::max_size`].
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { arr: RawArray::with_capacity(capacity), len: 0 }
    }

    /// Tries to construct a new, empty `DynArr<T>` with exactly the specified capacity.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Ok(Self { arr: RawArray::try_with_capacity(capacity)?, len: 0 })
    }

    /// Constructs a dynamic array containing `count` default values, allocating exactly `count` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::collections::DynArr;
    ///
    /// let arr = DynArr::<String>::with_default(3);
    /// assert_eq!(arr, ["", "", ""]);
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    pub fn with_default(count: usize) -> Self where
        T: Default
    {
        let mut arr = Self::with_capacity(count);
        arr.extend_exact(count, iter::repeat_with(T::default));
        arr
    }

    /// Constructs a dynamic array from an iterator which knows its length up front, allocating exactly once.
    ///
    /// If the iterator yields fewer items than it announced, the array holds what it got, extra items are ignored.
    pub fn from_iter_exact<I>(iter: I) -> Self where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator
    {
        let iter = iter.into_iter();
        let count = iter.len();
        let mut arr = Self::with_capacity(count);
        arr.extend_exact(count, iter);
        arr
    }

    /// Returns the total number of elements the dynamic array can hold without reallocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::collections::DynArr;
    ///
    /// let mut arr: DynArr<i32> = DynArr::with_capacity(10);
    /// arr.push(42);
    /// assert_eq!(arr.capacity(), 10);
    /// ```
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.arr.capacity()
    }

    /// Largest number of elements a dynamic array of `T` could ever hold, derived from the addressable range.
    ///
    /// This is not a promise that the allocator can provide that much memory.
    #[inline]
    pub const fn max_size(&self) -> usize {
        RawArray::<T>::MAX_SIZE
    }

    /// Makes sure the dynamic array can hold at least `new_capacity` elements in total.
    ///
    /// Does nothing if the capacity is already sufficient, otherwise exactly `new_capacity` elements are allocated,
    /// and all elements are moved to the new buffer.
    ///
    /// # Panics
    ///
    /// Panics if `new_capacity` exceeds [`DynArr::max_size`].
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::dynarr;
    ///
    /// let mut arr = dynarr![1];
    /// arr.reserve(10);
    /// assert_eq!(arr.capacity(), 10);
    /// arr.reserve(5);
    /// assert_eq!(arr.capacity(), 10);
    /// ```
    pub fn reserve(&mut self, new_capacity: usize) {
        if let Err(err) = self.try_reserve(new_capacity) {
            handle_error(err);
        }
    }

    /// Tries to make sure the dynamic array can hold at least `new_capacity` elements in total.
    ///
    /// # Errors
    ///
    /// If `new_capacity` exceeds [`DynArr::max_size`], or the allocator reports a failure, an error is returned and the array is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::collections::{DynArr, TryReserveError};
    ///
    /// let mut arr: DynArr<u64> = DynArr::new();
    /// assert!(arr.try_reserve(16).is_ok());
    /// assert_eq!(arr.try_reserve(usize::MAX), Err(TryReserveError::CapacityOverflow));
    /// assert_eq!(arr.capacity(), 16);
    /// ```
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), TryReserveError> {
        self.arr.try_reserve_exact(self.len, new_capacity)
    }

    /// Shrinks the capacity of the dynamic array to its length.
    ///
    /// An empty dynamic array releases its buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::collections::DynArr;
    ///
    /// let mut arr = DynArr::with_capacity(10);
    /// arr.extend([1, 2, 3]);
    /// arr.shrink_to_fit();
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        if let Err(err) = self.try_shrink_to_fit() {
            handle_error(err);
        }
    }

    /// Tries to shrink the capacity of the dynamic array to its length.
    ///
    /// On failure, the dynamic array is left unchanged.
    pub fn try_shrink_to_fit(&mut self) -> Result<(), TryReserveError> {
        self.arr.try_shrink_to_fit(self.len)
    }

    /// Shortens the dynamic array, keeping the first `len` elements and dropping the rest.
    ///
    /// If `len` is greater or equal to the dynamic array's current length, this has no effect.
    ///
    /// Note that this method has no effect on the allocated capacity of the dynamic array.
    pub fn truncate(&mut self, len: usize) {
        // Safety:
        // - The slice passed to `drop_in_place` is valid; the `len >= self.len` case avoids creating an invalid slice, and
        // - The `len` of the dynamic array is shrunk before calling `drop_in_place` such that no value will be dropped twice
        //   in case `drop_in_place` were to panic once (if it panics twice, the program aborts.)
        unsafe {
            if len >= self.len {
                return;
            }
            let remaining_len = self.len - len;
            let s = ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(len), remaining_len);
            self.len = len;
            ptr::drop_in_place(s);
        }
    }

    /// Extracts a slice containing the entire dynamic array.
    ///
    /// Equivalent to `&s[..]`.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// Extracts a mutable slice of the entire dynamic array.
    ///
    /// Equivalent to `&mut s[..]`.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    /// Returns a raw pointer to the dynamic array's buffer, or a dangling raw pointer valid for zero sized reads if the dynamic array didn't allocate.
    ///
    /// The caller must ensure that the dynamic array outlives the pointer this function returns, or else it will end up pointing to garbage.
    /// Modifying the dynamic array may cause its buffer to be reallocated, which would also make any pointer to it invalid.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.arr.ptr()
    }

    /// Returns an unsafe mutable pointer to the dynamic array's buffer, or a dangling raw pointer valid for zero sized reads if the dynamic array didn't allocate.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.arr.ptr()
    }

    /// Returns a pointer to the buffer, which is null if and only if the dynamic array has no capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::collections::DynArr;
    ///
    /// let mut arr: DynArr<u8> = DynArr::new();
    /// assert!(arr.data().is_null());
    ///
    /// arr.push(3);
    /// assert_eq!(unsafe { *arr.data() }, 3);
    /// ```
    #[inline]
    pub fn data(&self) -> *const T {
        if self.capacity() == 0 {
            ptr::null()
        } else {
            self.as_ptr()
        }
    }

    /// Forces the length of the dynamic array to `new_len`.
    ///
    /// # Safety
    ///
    /// - `new_len` must be less than or equal to [`capacity()`].
    /// - The elements at `old_len..new_len` must be initialized.
    ///
    /// [`capacity()`]: DynArr::capacity
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        self.len = new_len;
    }

    /// Returns the number of elements in the dynamic array, also referred to as the 'length'.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the dynamic array contains no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DynArrError::OutOfRange`] if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::{collections::DynArrError, dynarr};
    ///
    /// let arr = dynarr![10, 20, 30];
    /// assert_eq!(arr.at(1), Ok(&20));
    /// assert_eq!(arr.at(3), Err(DynArrError::OutOfRange { index: 3, len: 3 }));
    /// ```
    pub fn at(&self, index: usize) -> Result<&T, DynArrError> {
        let len = self.len;
        self.as_slice().get(index).ok_or(DynArrError::OutOfRange { index, len })
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DynArrError::OutOfRange`] if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, DynArrError> {
        let len = self.len;
        self.as_mut_slice().get_mut(index).ok_or(DynArrError::OutOfRange { index, len })
    }

    /// Returns the first element, or `None` if the dynamic array is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// Returns the first element mutably, or `None` if the dynamic array is empty.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// Returns the last element, or `None` if the dynamic array is empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Returns the last element mutably, or `None` if the dynamic array is empty.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Appends an element to the back of the dynamic array.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds [`DynArr::max_size`].
    ///
    /// # Time complexity
    ///
    /// Takes amortized *O*(1) time.
    /// If the dynamic array's length would exceed its capacity after the push, *O*(*capacity*) time is taken to move the elements to a larger buffer.
    #[inline]
    pub fn push(&mut self, value: T) {
        // Inform codegen that the length does not change across grow_one()
        let len = self.len;
        // This will panic or abort if we would allocate more than `max_size()` elements.
        if len == self.arr.capacity() {
            self.arr.grow_one();
        }
        unsafe {
            let end = self.as_mut_ptr().add(len);
            ptr::write(end, value);
            self.len += 1;
        }
    }

    /// Constructs a new element at the back of the dynamic array with `f`, and returns a reference to it.
    ///
    /// The element is created before the array grows, so a panic in `f` leaves the array untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::collections::DynArr;
    ///
    /// let mut arr = DynArr::new();
    /// let elem = arr.emplace_back(|| String::from("test"));
    /// elem.push('!');
    /// assert_eq!(arr, ["test!"]);
    /// ```
    pub fn emplace_back<F>(&mut self, f: F) -> &mut T where
        F: FnOnce() -> T
    {
        let value = f();
        self.push(value);
        // SAFETY: `push` just initialized the last element
        unsafe { &mut *self.as_mut_ptr().add(self.len - 1) }
    }

    /// Removes the last element from a dynamic array and returns it, or [`None`] if it is empty.
    ///
    /// # Time complexity
    ///
    /// Takes *O*(1) time.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            unsafe {
                self.len -= 1;
                Some(ptr::read(self.as_ptr().add(self.len)))
            }
        }
    }

    /// Inserts an element at position `index` within the dynamic array, shifting all elements after it to the right.
    ///
    /// Returns the index of the inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2, 3, 4, 5];
    /// assert_eq!(arr.insert(2, 99), 2);
    /// assert_eq!(arr, [1, 2, 99, 3, 4, 5]);
    /// ```
    ///
    /// # Time complexity
    ///
    /// Takes *O*([`DynArr::len`]) time.
    /// All items after the insertion index must be shifted to the right.
    #[track_caller]
    pub fn insert(&mut self, index: usize, element: T) -> usize {
        self.insert_exact(index, 1, iter::once(element))
    }

    /// Inserts `count` copies of `value` at position `index`, returns the index of the first inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2];
    /// arr.insert_n(0, 3, 77);
    /// assert_eq!(arr, [77, 77, 77, 1, 2]);
    /// ```
    #[track_caller]
    pub fn insert_n(&mut self, index: usize, count: usize, value: T) -> usize where
        T: Clone
    {
        self.insert_exact(index, count, iter::repeat(value))
    }

    /// Inserts clones of all elements in `values` at position `index`, returns the index of the first inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2];
    /// let end = arr.len();
    /// arr.insert_from_slice(end, &[88, 89]);
    /// assert_eq!(arr, [1, 2, 88, 89]);
    /// ```
    #[track_caller]
    pub fn insert_from_slice(&mut self, index: usize, values: &[T]) -> usize where
        T: Clone
    {
        self.insert_exact(index, values.len(), values.iter().cloned())
    }

    /// Moves all elements produced by `iter` into the dynamic array at position `index`, returns the index of the first inserted element.
    ///
    /// Space is made for the announced length of the iterator up front, if it yields fewer elements, the gap is closed again.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    #[track_caller]
    pub fn insert_iter<I>(&mut self, index: usize, iter: I) -> usize where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator
    {
        let iter = iter.into_iter();
        let count = iter.len();
        self.insert_exact(index, count, iter)
    }

    /// Constructs a new element with `f` at position `index`, returns the index of the new element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    #[track_caller]
    pub fn emplace<F>(&mut self, index: usize, f: F) -> usize where
        F: FnOnce() -> T
    {
        self.insert_exact(index, 1, iter::once_with(f))
    }

    /// Removes the element at position `index`, shifting all elements after it to the left.
    ///
    /// Returns the index of the element that followed the removed element, which is `index` itself.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`
    #[track_caller]
    pub fn erase(&mut self, index: usize) -> usize {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("erase index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }
        self.erase_range(index..index + 1)
    }

    /// Removes the elements in `range`, shifting all elements after it to the left.
    ///
    /// Returns the index of the element that followed the last removed element, which is the start of the range.
    /// An empty range removes nothing.
    ///
    /// # Panics
    ///
    /// Panics if the start of the range is greater than its end, or if the end is greater than the length of the dynamic array.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2, 3, 4, 5];
    /// assert_eq!(arr.erase_range(1..3), 1);
    /// assert_eq!(arr, [1, 4, 5]);
    /// ```
    #[track_caller]
    pub fn erase_range<R>(&mut self, range: R) -> usize where
        R: RangeBounds<usize>
    {
        struct BackshiftOnDrop<'a, T> {
            arr:   &'a mut DynArr<T>,
            start: usize,
            end:   usize,
            tail:  usize,
        }

        impl<T> Drop for BackshiftOnDrop<'_, T> {
            fn drop(&mut self) {
                // SAFETY: The tail `[end, end + tail)` is still initialized and gets moved right behind the kept prefix.
                unsafe {
                    let base = self.arr.as_mut_ptr();
                    ptr::copy(base.add(self.end), base.add(self.start), self.tail);
                }
                self.arr.len = self.start + self.tail;
            }
        }

        let len = self.len;
        let (start, end) = resolve_range(range, len);
        if start == end {
            return start;
        }

        unsafe {
            // Only keep the prefix while the erased elements are dropped, the guard moves the tail down even if a drop panics.
            self.len = start;
            let to_drop = ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(start), end - start);
            let _backshift = BackshiftOnDrop { arr: self, start, end, tail: len - end };
            ptr::drop_in_place(to_drop);
        }
        start
    }

    /// Removes and returns the element at position `index` within the dynamic array, shifting all elements after it to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2, 3];
    /// assert_eq!(arr.remove(1), 2);
    /// assert_eq!(arr, [1, 3]);
    /// ```
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("removal index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }
        unsafe {
            // infallible
            let ret;
            {
                // the place we are taking from
                let ptr = self.as_mut_ptr().add(index);
                // copy it out, unsafely having a copy of the value on the stack and in the dynamic array at the same time
                ret = ptr::read(ptr);

                // Shift everything down to fill in that spot
                ptr::copy(ptr.add(1), ptr, len - index - 1);
            }
            self.len = len - 1;
            ret
        }
    }

    /// Resizes the dynamic array in-place so that `len` is equal to `new_len`, filling new slots with values returned by `f`.
    ///
    /// When growing, exactly `new_len` elements are reserved first.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::collections::DynArr;
    ///
    /// let mut arr = DynArr::new();
    /// let mut p = 1;
    /// arr.resize_with(4, || { p *= 2; p });
    /// assert_eq!(arr, [2, 4, 8, 16]);
    /// ```
    pub fn resize_with<F>(&mut self, new_len: usize, f: F) where
        F: FnMut() -> T
    {
        let len = self.len;
        if new_len > len {
            self.extend_exact(new_len - len, iter::repeat_with(f));
        } else {
            self.truncate(new_len);
        }
    }

    /// Resizes the dynamic array in-place so that `len` is equal to `new_len`, filling new slots with the default value.
    pub fn resize_default(&mut self, new_len: usize) where
        T: Default
    {
        self.resize_with(new_len, T::default)
    }

    /// Drops all elements, the capacity is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2, 3];
    /// arr.clear();
    /// assert!(arr.is_empty());
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        let elems: *mut [T] = self.as_mut_slice();

        // SAFETY
        // - `elems` comes directly from `as_mut_slice` and is therefore valid.
        // - Setting `self.len` before calling `drop_in_place` means that if an element's `Drop` impl panics,
        // the dynamic array's `Drop` impl will do nothing (leaking the rest of the elements) instead of dropping some twice.
        unsafe {
            self.len = 0;
            ptr::drop_in_place(elems);
        }
    }

    /// Exchanges the contents of 2 dynamic arrays in constant time, without touching any element.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other)
    }

    /// Replaces the content of the dynamic array by the items of `iter`.
    ///
    /// The new content is built first, so if `iter` panics, the dynamic array is left unchanged.
    pub fn assign<I>(&mut self, iter: I) where
        I: IntoIterator<Item = T>
    {
        let mut tmp: Self = iter.into_iter().collect();
        self.swap(&mut tmp);
    }

    /// Replaces the content of the dynamic array by clones of `values`.
    ///
    /// The copy is built first, so if a clone panics, the dynamic array is left unchanged.
    pub fn assign_from_slice(&mut self, values: &[T]) where
        T: Clone
    {
        let mut tmp = Self::from(values);
        self.swap(&mut tmp);
    }

    /// Logs the elements, length and capacity of the dynamic array at debug level.
    pub fn show(&self) where
        T: fmt::Debug
    {
        log_debug!(LOG_CAT, "{:?} (size: {}, capacity: {})", self.as_slice(), self.len, self.capacity());
    }

    //--------------------------------------------------------------

    /// Appends up to `count` items from `iter`, after making sure exactly `len + count` elements fit.
    fn extend_exact<I: Iterator<Item = T>>(&mut self, count: usize, iter: I) {
        let required = match self.len.checked_add(count) {
            Some(required) => required,
            None => handle_error(TryReserveError::CapacityOverflow),
        };
        self.reserve(required);

        for elem in iter.take(count) {
            unsafe {
                ptr::write(self.as_mut_ptr().add(self.len), elem);
                // Since next() executes user code which can panic, we have to bump the length after each step.
                self.len += 1;
            }
        }
    }

    /// Leaf method to which every `Extend` and `FromIterator` implementation delegates.
    fn extend_desugared<I: Iterator<Item = T>>(&mut self, mut iter: I) {
        // This function should be the moral equivalent of:
        //
        //      for item in iterator {
        //          self.push(item);
        //      }
        while let Some(elem) = iter.next() {
            let len = self.len;
            if len == self.capacity() {
                let (lower, _) = iter.size_hint();
                self.arr.reserve(len, lower.saturating_add(1));
            }
            unsafe {
                ptr::write(self.as_mut_ptr().add(len), elem);
                // Since next() executes user code which can panic, we have to bump the length after each step.
                self.len = len + 1;
            }
        }
    }

    /// Inserts up to `count` items from `iter` at `index`.
    ///
    /// When the items don't fit, a new buffer of the grown capacity is allocated and the new items are written into it first,
    /// the old elements are moved around them afterwards. Otherwise the tail is shifted up in place and the gap is filled.
    #[track_caller]
    fn insert_exact<I: Iterator<Item = T>>(&mut self, index: usize, count: usize, iter: I) -> usize {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("insertion index (is {index}) should be <= len (is {len})");
        }

        let len = self.len;
        if index > len {
            assert_failed(index, len);
        }
        if count == 0 {
            return index;
        }

        if count > self.capacity() - len {
            self.insert_realloc(index, count, iter);
        } else {
            self.insert_in_place(index, count, iter);
        }
        index
    }

    fn insert_realloc<I: Iterator<Item = T>>(&mut self, index: usize, count: usize, iter: I) {
        let len = self.len;
        let required = match len.checked_add(count) {
            Some(required) => required,
            None => handle_error(TryReserveError::CapacityOverflow),
        };
        let new_cap = match RawArray::<T>::grown_capacity(self.capacity(), required) {
            Ok(new_cap) => new_cap,
            Err(err) => handle_error(err),
        };
        let mut new_arr = RawArray::<T>::with_capacity(new_cap);

        // The gap is filled before anything is moved, so if producing an element panics, `self` is still untouched.
        // The guard then drops what was written, after which `new_arr` releases the new buffer.
        let gap = unsafe { new_arr.ptr().add(index) };
        let mut filled = guard(0usize, |filled| unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(gap, filled));
        });
        for elem in iter.take(count) {
            unsafe { ptr::write(gap.add(*filled), elem) };
            *filled += 1;
        }
        let filled = ScopeGuard::into_inner(filled);

        // SAFETY: Both buffers are valid for the copied ranges and don't overlap, `index + filled + (len - index) <= new_cap`.
        unsafe {
            let old = self.as_mut_ptr();
            let new = new_arr.ptr();
            ptr::copy_nonoverlapping(old, new, index);
            ptr::copy_nonoverlapping(old.add(index), new.add(index + filled), len - index);
        }
        // `new_arr` ends up with the old buffer, which no longer holds any live element.
        mem::swap(&mut self.arr, &mut new_arr);
        self.len = len + filled;
    }

    fn insert_in_place<I: Iterator<Item = T>>(&mut self, index: usize, count: usize, iter: I) {
        struct FillGapOnDrop<'a, T> {
            arr:    &'a mut DynArr<T>,
            index:  usize,
            count:  usize,
            tail:   usize,
            filled: usize,
        }

        impl<T> Drop for FillGapOnDrop<'_, T> {
            fn drop(&mut self) {
                // Any part of the gap that did not get filled, because of a panic or a short iterator, is closed by moving the tail back down.
                unsafe {
                    if self.filled < self.count {
                        let base = self.arr.as_mut_ptr();
                        ptr::copy(base.add(self.index + self.count), base.add(self.index + self.filled), self.tail);
                    }
                }
                self.arr.len = self.index + self.filled + self.tail;
            }
        }

        let len = self.len;
        unsafe {
            let p = self.as_mut_ptr().add(index);
            // Shift everything over to make space.
            ptr::copy(p, p.add(count), len - index);
            // The shifted tail is owned by the guard until the gap is closed.
            self.len = index;
        }

        let mut gap = FillGapOnDrop { arr: self, index, count, tail: len - index, filled: 0 };
        for elem in iter.take(count) {
            unsafe { ptr::write(gap.arr.as_mut_ptr().add(index + gap.filled), elem) };
            gap.filled += 1;
        }
    }
}

impl<T: Clone> DynArr<T> {
    /// Constructs a dynamic array containing `count` clones of `elem`, allocating exactly `count` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::collections::DynArr;
    ///
    /// let arr = DynArr::from_elem("hello", 3);
    /// assert_eq!(arr, ["hello", "hello", "hello"]);
    /// ```
    pub fn from_elem(elem: T, count: usize) -> Self {
        let mut arr = Self::with_capacity(count);
        arr.extend_exact(count, iter::repeat(elem));
        arr
    }

    /// Resizes the dynamic array in-place so that `len` is equal to `new_len`.
    ///
    /// If `new_len` is greater than `len`, exactly `new_len` elements are reserved and the dynamic array is extended by the difference,
    /// with each additional slot filled with `value`.
    /// If `new_len` is less than `len`, the dynamic array is simply truncated.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::dynarr;
    ///
    /// let mut arr = dynarr!["hello"];
    /// arr.resize(3, "world");
    /// assert_eq!(arr, ["hello", "world", "world"]);
    ///
    /// let mut arr = dynarr![1, 2, 3, 4];
    /// arr.resize(2, 0);
    /// assert_eq!(arr, [1, 2]);
    /// ```
    pub fn resize(&mut self, new_len: usize, value: T) {
        let len = self.len;
        if new_len > len {
            self.extend_exact(new_len - len, iter::repeat(value));
        } else {
            self.truncate(new_len);
        }
    }
}

#[track_caller]
fn resolve_range<R: RangeBounds<usize>>(range: R, len: usize) -> (usize, usize) {
    #[cold]
    #[track_caller]
    fn bound_overflow() -> ! {
        panic!("range bound overflows usize");
    }

    #[cold]
    #[track_caller]
    fn order_failed(start: usize, end: usize) -> ! {
        panic!("range start (is {start}) should be <= range end (is {end})");
    }

    #[cold]
    #[track_caller]
    fn end_failed(end: usize, len: usize) -> ! {
        panic!("range end (is {end}) should be <= len (is {len})");
    }

    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => match start.checked_add(1) {
            Some(start) => start,
            None => bound_overflow(),
        },
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => match end.checked_add(1) {
            Some(end) => end,
            None => bound_overflow(),
        },
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };

    if start > end {
        order_failed(start, end);
    }
    if end > len {
        end_failed(end, len);
    }
    (start, end)
}

impl<T> ops::Deref for DynArr<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }
}

impl<T> ops::DerefMut for DynArr<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }
}

impl<T: Clone> Clone for DynArr<T> {
    /// Deep copy of the live elements, the capacity of the copy equals the length of the source.
    fn clone(&self) -> Self {
        Self::from_iter_exact(self.iter().cloned())
    }

    /// Overwrites the contents of `self` with a clone of the contents of `source`.
    ///
    /// The copy is built before anything is replaced, so if a clone panics, `self` is left unchanged.
    fn clone_from(&mut self, source: &Self) {
        let mut tmp = source.clone();
        self.swap(&mut tmp);
    }
}

impl<T: Hash> Hash for DynArr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&**self, state)
    }
}

impl<T, I: SliceIndex<[T]>> Index<I> for DynArr<T> {
    type Output = I::Output;

    #[track_caller]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(&**self, index)
    }
}

impl<T, I: SliceIndex<[T]>> IndexMut<I> for DynArr<T> {
    #[track_caller]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(&mut **self, index)
    }
}

/// Collects an iterator into a DynArr, commonly called via [`Iterator::collect()`].
///
/// The lower bound of the iterator's size hint is reserved whenever the dynamic array runs out of space,
/// use [`DynArr::from_iter_exact`] to allocate exactly once for iterators with a known length.
impl<T> FromIterator<T> for DynArr<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::new();
        arr.extend_desugared(iter.into_iter());
        arr
    }
}

impl<T> IntoIterator for DynArr<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Creates a consuming iterator, that is, one that moves each value out of the dynamic array (from start to end).
    /// The dynamic array cannot be used after calling this
    fn into_iter(self) -> Self::IntoIter {
        let mut me = ManuallyDrop::new(self);
        let len = me.len;
        // The empty buffer left behind doesn't own any memory, so never dropping it leaks nothing.
        let arr = mem::replace(&mut me.arr, RawArray::new());
        IntoIter::new(arr, len)
    }
}

impl<'a, T> IntoIterator for &'a DynArr<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArr<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> Extend<T> for DynArr<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.extend_desugared(iter.into_iter())
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for DynArr<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend_desugared(iter.into_iter().copied())
    }
}

impl_slice_partial_eq_generic!([] DynArr<T>, DynArr<U>);
impl_slice_partial_eq_generic!([] DynArr<T>, &[U]);
impl_slice_partial_eq_generic!([] DynArr<T>, &mut [U]);
impl_slice_partial_eq_generic!([] &[T], DynArr<U>);
impl_slice_partial_eq_generic!([] &mut [T], DynArr<U>);
impl_slice_partial_eq_generic!([] DynArr<T>, [U]);
impl_slice_partial_eq_generic!([] [T], DynArr<U>);
impl_slice_partial_eq_generic!([const N: usize] DynArr<T>, [U; N]);
impl_slice_partial_eq_generic!([const N: usize] [T; N], DynArr<U>);
impl_slice_partial_eq_generic!([const N: usize] DynArr<T>, &[U; N]);

impl<T: PartialOrd> PartialOrd for DynArr<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        PartialOrd::partial_cmp(&**self, &**other)
    }
}

impl<T: Eq> Eq for DynArr<T> {}

impl<T: Ord> Ord for DynArr<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        Ord::cmp(&**self, &**other)
    }
}

impl<T> Drop for DynArr<T> {
    fn drop(&mut self) {
        unsafe {
            // use drop for [T]
            // uses a raw slice to refer to the elements of the dynamic array as the weakest necessary type;
            // could avoid question of validity in certain cases
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr(), self.len))
        }
        // RawArray handles deallocation
    }
}

impl<T> Default for DynArr<T> {
    /// Creates an empty `DynArr<T>`.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynArr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T> AsRef<[T]> for DynArr<T> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T> AsMut<[T]> for DynArr<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: Clone> From<&[T]> for DynArr<T> {
    /// Allocate a `DynArr<T>` and fill it by cloning `s`'s items.
    fn from(s: &[T]) -> Self {
        Self::from_iter_exact(s.iter().cloned())
    }
}

impl<T: Clone> From<&mut [T]> for DynArr<T> {
    /// Allocate a `DynArr<T>` and fill it by cloning `s`'s items.
    fn from(s: &mut [T]) -> Self {
        Self::from(&*s)
    }
}

impl<T, const N: usize> From<[T; N]> for DynArr<T> {
    /// Allocate a `DynArr<T>` and move the array's items into it.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::{collections::DynArr, dynarr};
    ///
    /// assert_eq!(DynArr::from([1, 2, 3]), dynarr![1, 2, 3]);
    /// ```
    fn from(value: [T; N]) -> Self {
        let mut res = Self::with_capacity(N);
        let value = ManuallyDrop::new(value);
        unsafe {
            ptr::copy_nonoverlapping(value.as_ptr(), res.as_mut_ptr(), N);
            res.set_len(N);
        }
        res
    }
}

/// Creates a [`DynArr`] containing the arguments.
///
/// - Create a [`DynArr`] containing a given list of elements:
///
/// ```
/// use strata_common::dynarr;
///
/// let arr = dynarr![1, 2, 3];
/// assert_eq!(arr[0], 1);
/// assert_eq!(arr.capacity(), 3);
/// ```
///
/// - Create a [`DynArr`] from a given element and size, the element is cloned:
///
/// ```
/// use strata_common::dynarr;
///
/// let arr = dynarr![1; 3];
/// assert_eq!(arr, [1, 1, 1]);
/// ```
#[macro_export]
macro_rules! dynarr {
    () => {
        $crate::collections::DynArr::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::collections::DynArr::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::collections::DynArr::from([$($x),+])
    };
}

#[cfg(test)]
mod tests;
