use core::{
    fmt,
    marker::PhantomData,
    mem,
    ops::{Deref, DerefMut},
    ptr::{self, NonNull},
};
use std::alloc::handle_alloc_error;

use static_assertions::assert_eq_size;

use crate::alloc::{allocate_one, deallocate_one, AllocError};
use super::CompressedPair;

/// Policy deciding how the object owned by a [`UniquePtr`] gets destroyed.
pub trait Deleter<T> {
    /// Destroy the object `ptr` points to and release its storage.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live object that this deleter knows how to destroy, and must not be used afterwards.
    unsafe fn delete(&mut self, ptr: NonNull<T>);
}

/// Deleter for objects allocated by [`UniquePtr::new`]: drops the value and releases its storage to the [`Mallocator`](crate::alloc::Mallocator).
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct DefaultDelete;

impl<T> Deleter<T> for DefaultDelete {
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        ptr::drop_in_place(ptr.as_ptr());
        deallocate_one(ptr);
    }
}

impl<T, F: FnMut(NonNull<T>)> Deleter<T> for F {
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        self(ptr)
    }
}

//------------------------------------------------------------------------------------------------------------------------------

/// Owning pointer with a single owner.
///
/// A `UniquePtr` is either null or owns exactly one object, which is destroyed by its deleter `D` when the pointer is dropped or reset.
/// Ownership can only be moved, never copied.
///
/// The deleter is stored in a [`CompressedPair`] next to the pointer, so a stateless deleter like [`DefaultDelete`] takes no space.
///
/// # Examples
///
/// ```
/// use strata_common::mem::UniquePtr;
///
/// let mut ptr = UniquePtr::new(5);
/// *ptr += 1;
/// assert_eq!(*ptr, 6);
///
/// let other = core::mem::replace(&mut ptr, UniquePtr::null());
/// assert!(ptr.is_null());
/// assert_eq!(other.as_ref(), Some(&6));
/// ```
pub struct UniquePtr<T, D: Deleter<T> = DefaultDelete> {
    pair:    CompressedPair<D, Option<NonNull<T>>>,
    phantom: PhantomData<T>,
}

impl<T> UniquePtr<T> {
    /// Allocate `value` and take ownership of it.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM
    pub fn new(value: T) -> Self {
        match Self::try_new(value) {
            Ok(ptr) => ptr,
            Err(err) => handle_alloc_error(err.layout),
        }
    }

    /// Try to allocate `value` and take ownership of it.
    ///
    /// On failure, `value` is dropped.
    pub fn try_new(value: T) -> Result<Self, AllocError> {
        let ptr = allocate_one::<T>()?;
        // SAFETY: `ptr` is valid for writes of a single `T`
        unsafe { ptr.as_ptr().write(value) };
        Ok(Self { pair: CompressedPair::new(DefaultDelete, Some(ptr)), phantom: PhantomData })
    }

    /// Create a null pointer.
    pub const fn null() -> Self {
        Self { pair: CompressedPair::new(DefaultDelete, None), phantom: PhantomData }
    }

    /// Take ownership of an object allocated with [`allocate_one`].
    ///
    /// # Safety
    ///
    /// `ptr` must point to an initialized `T` in storage allocated by [`allocate_one`], and nothing else may destroy or release it.
    pub const unsafe fn from_raw(ptr: NonNull<T>) -> Self {
        Self { pair: CompressedPair::new(DefaultDelete, Some(ptr)), phantom: PhantomData }
    }

    /// Move the owned value out of the pointer and release its storage.
    ///
    /// Returns `None` if the pointer is null.
    pub fn into_inner(mut this: Self) -> Option<T> {
        let ptr = this.release()?;
        // SAFETY: `ptr` was allocated and initialized by `try_new` or given to `from_raw` under the same contract,
        // and ownership was just released, so it is read and released exactly once.
        unsafe {
            let value = ptr.as_ptr().read();
            deallocate_one(ptr);
            Some(value)
        }
    }
}

impl<T, D: Deleter<T>> UniquePtr<T, D> {
    /// Create a null pointer that will use `deleter` for any object it receives later on.
    pub const fn null_with_deleter(deleter: D) -> Self {
        Self { pair: CompressedPair::new(deleter, None), phantom: PhantomData }
    }

    /// Take ownership of `ptr`, which will be destroyed using `deleter`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to an initialized `T` that can be destroyed by `deleter`, and nothing else may destroy or release it.
    pub const unsafe fn from_raw_with_deleter(ptr: NonNull<T>, deleter: D) -> Self {
        Self { pair: CompressedPair::new(deleter, Some(ptr)), phantom: PhantomData }
    }

    /// Give up ownership of the managed object without destroying it, leaving the pointer null.
    ///
    /// The caller becomes responsible for destroying the returned object.
    #[must_use = "the released object is leaked if the pointer is dropped"]
    pub fn release(&mut self) -> Option<NonNull<T>> {
        self.pair.second_mut().take()
    }

    /// Replace the managed object by `ptr`, destroying the previously managed object if there was one.
    ///
    /// # Safety
    ///
    /// If `ptr` is `Some`, it must point to an initialized `T` that can be destroyed by this pointer's deleter, and nothing else may destroy or release it.
    pub unsafe fn reset(&mut self, ptr: Option<NonNull<T>>) {
        let (deleter, cur) = self.pair.parts_mut();
        let old = mem::replace(cur, ptr);
        if let Some(old) = old {
            deleter.delete(old);
        }
    }

    /// Destroy the managed object, if any, leaving the pointer null.
    pub fn reset_null(&mut self) {
        // SAFETY: A null pointer has no requirements
        unsafe { self.reset(None) }
    }

    /// Exchange the managed objects and deleters of 2 pointers.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other)
    }

    /// Get the raw pointer to the managed object, or `None` if the pointer is null.
    ///
    /// Ownership is not affected.
    pub fn get(&self) -> Option<NonNull<T>> {
        *self.pair.second()
    }

    /// Check if the pointer is null.
    pub fn is_null(&self) -> bool {
        self.pair.second().is_none()
    }

    /// Get a reference to the managed object, or `None` if the pointer is null.
    pub fn as_ref(&self) -> Option<&T> {
        // SAFETY: A non-null pointer always points to a live object owned by `self`
        self.get().map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Get a mutable reference to the managed object, or `None` if the pointer is null.
    pub fn as_mut(&mut self) -> Option<&mut T> {
        // SAFETY: A non-null pointer always points to a live object owned by `self`, which we borrow mutably
        self.get().map(|ptr| unsafe { &mut *ptr.as_ptr() })
    }

    /// Get the deleter.
    pub fn deleter(&self) -> &D {
        self.pair.first()
    }

    /// Get the deleter mutably.
    pub fn deleter_mut(&mut self) -> &mut D {
        self.pair.first_mut()
    }
}

#[cold]
#[track_caller]
fn null_deref() -> ! {
    panic!("dereferenced a null `UniquePtr`");
}

impl<T, D: Deleter<T>> Deref for UniquePtr<T, D> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the pointer is null.
    #[track_caller]
    fn deref(&self) -> &T {
        match self.as_ref() {
            Some(val) => val,
            None => null_deref(),
        }
    }
}

impl<T, D: Deleter<T>> DerefMut for UniquePtr<T, D> {
    /// # Panics
    ///
    /// Panics if the pointer is null.
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        match self.as_mut() {
            Some(val) => val,
            None => null_deref(),
        }
    }
}

impl<T, D: Deleter<T>> Drop for UniquePtr<T, D> {
    fn drop(&mut self) {
        self.reset_null()
    }
}

impl<T> Default for UniquePtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T, D: Deleter<T>> PartialEq for UniquePtr<T, D> {
    /// Pointers are equal when they manage the same object, or are both null.
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl<T, D: Deleter<T>> Eq for UniquePtr<T, D> {}

impl<T, D: Deleter<T>> fmt::Debug for UniquePtr<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(ptr) => f.debug_tuple("UniquePtr").field(&ptr).finish(),
            None => f.write_str("UniquePtr(null)"),
        }
    }
}

// SAFETY: `UniquePtr` owns its object, same as a `Box`
unsafe impl<T: Send, D: Deleter<T> + Send> Send for UniquePtr<T, D> {}
// SAFETY: Shared access only hands out shared references to the object and deleter
unsafe impl<T: Sync, D: Deleter<T> + Sync> Sync for UniquePtr<T, D> {}

assert_eq_size!(UniquePtr<u64>, *mut u64);
assert_eq_size!(UniquePtr<[u8; 64]>, Option<NonNull<[u8; 64]>>);

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::mem::thread_alloc_stats;

    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn new_and_deref() {
        let mut ptr = UniquePtr::new(String::from("strata"));
        assert!(!ptr.is_null());
        assert_eq!(ptr.len(), 6);
        ptr.push('!');
        assert_eq!(&*ptr, "strata!");
    }

    #[test]
    fn drop_deletes_once() {
        let drops = Rc::new(Cell::new(0));
        let before = thread_alloc_stats();
        {
            let _ptr = UniquePtr::new(DropCounter(drops.clone()));
        }
        assert_eq!(drops.get(), 1);
        assert_eq!(thread_alloc_stats().live_allocs, before.live_allocs);
    }

    #[test]
    fn release_and_reset() {
        let drops = Rc::new(Cell::new(0));
        let mut ptr = UniquePtr::new(DropCounter(drops.clone()));

        let raw = ptr.release();
        assert!(ptr.is_null());
        assert_eq!(drops.get(), 0);

        unsafe { ptr.reset(raw) };
        assert!(!ptr.is_null());
        assert_eq!(drops.get(), 0);

        let other = UniquePtr::new(DropCounter(drops.clone())).release();
        unsafe { ptr.reset(other) };
        assert_eq!(drops.get(), 1);

        ptr.reset_null();
        assert!(ptr.is_null());
        assert_eq!(drops.get(), 2);

        drop(ptr);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn swap_and_identity() {
        let mut a = UniquePtr::new(1);
        let mut b = UniquePtr::new(2);
        let (pa, pb) = (a.get(), b.get());

        a.swap(&mut b);
        assert_eq!((a.get(), b.get()), (pb, pa));
        assert_eq!((*a, *b), (2, 1));

        assert_ne!(a, b);
        assert_eq!(UniquePtr::<i32>::null(), UniquePtr::null());
    }

    #[test]
    fn move_leaves_source_null() {
        let mut src = UniquePtr::new(vec![1, 2, 3]);
        let dst = core::mem::take(&mut src);
        assert!(src.is_null());
        assert_eq!(dst.as_ref().map(|v| v.len()), Some(3));
    }

    #[test]
    fn into_inner() {
        let before = thread_alloc_stats();
        let ptr = UniquePtr::new(String::from("moved"));
        assert_eq!(UniquePtr::into_inner(ptr).as_deref(), Some("moved"));
        assert_eq!(UniquePtr::into_inner(UniquePtr::<u8>::null()), None);
        assert_eq!(thread_alloc_stats().live_allocs, before.live_allocs);
    }

    #[test]
    fn custom_deleter() {
        let deleted = Rc::new(Cell::new(0));
        let counter = deleted.clone();
        let mut value = 7u32;

        {
            let ptr = unsafe { UniquePtr::from_raw_with_deleter(NonNull::from(&mut value), move |_: NonNull<u32>| counter.set(counter.get() + 1)) };
            assert_eq!(*ptr, 7);
        }
        assert_eq!(deleted.get(), 1);

        let mut ptr: UniquePtr<u32, _> = UniquePtr::null_with_deleter(|_: NonNull<u32>| {});
        assert!(ptr.is_null());
        assert!(ptr.as_mut().is_none());
        let _ = ptr.deleter_mut();
        let _ = ptr.deleter();
    }

    #[test]
    fn zero_sized_value() {
        let before = thread_alloc_stats();
        let ptr = UniquePtr::new(());
        assert!(!ptr.is_null());
        drop(ptr);
        assert_eq!(thread_alloc_stats().total_allocs, before.total_allocs);
    }

    #[test]
    #[should_panic(expected = "null `UniquePtr`")]
    fn null_deref_panics() {
        let ptr = UniquePtr::<u32>::null();
        let _value: u32 = *ptr;
    }

    #[test]
    fn stateless_deleter_is_free() {
        assert_eq!(core::mem::size_of::<UniquePtr<String>>(), core::mem::size_of::<usize>());
        assert_eq!(format!("{:?}", UniquePtr::<u8>::null()), "UniquePtr(null)");
    }
}
