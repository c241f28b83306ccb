use core::{
    alloc::Layout,
    fmt,
    mem,
    ptr::NonNull,
};

use strata_logging::{log_error, LogCategory};

use super::Mallocator;

const LOG_CAT: LogCategory = LogCategory::new("alloc");

//------------------------------------------------------------------------------------------------------------------------------

/// Allocator/Arena that can provide access to heap memory for the program
pub trait Allocator {
    /// Allocate memory from an allocator/arena
    ///
    /// # Return
    ///
    /// If no memory could be allocated, `None` should be returned.
    ///
    /// A zero-sized layout never fails, the returned pointer is then dangling, but aligned to `layout.align()`.
    ///
    /// # Safety
    ///
    /// The returned memory is uninitialized and must be released with [`Allocator::dealloc`] on the same allocator, using the same layout.
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>>;

    /// Deallocate an allocation
    ///
    /// # Safety
    ///
    /// `ptr` needs to have been returned by a call to [`Allocator::alloc`] on this allocator with the same `layout`, and may only be deallocated once.
    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout);

    /// Check if the allocator own the allocation
    ///
    /// This function is mainly meant for sub-allocators, a direct allocator can't tell which memory it handed out.
    fn owns(&self, ptr: NonNull<u8>, layout: Layout) -> bool;

    /// Get the allocator's alloc id
    fn alloc_id(&self) -> u16;

    /// Does the allocator support freeing of memory, if not, it means freeing of memory will only happen when the full allocator has been reset
    ///
    /// Default implementation assumes the allocator can free
    fn supports_free(&self) -> bool { true }
}

//------------------------------------------------------------------------------------------------------------------------------

/// Enum telling what allocator an allocation comes from
#[derive(Clone, Copy, Eq, Debug)]
pub enum AllocId {
    /// The system allocator
    Malloc,
    /// The allocator associated with the given id
    Id(u16),
}

/// Reserved allocs IDs
/// - 0: Malloc
pub const NUM_RESERVED_ALLOC_IDS: u16 = 1;

impl AllocId {
    pub const fn get_id(&self) -> u16 {
        match self {
            Self::Malloc => 0,
            Self::Id(id) => *id,
        }
    }
}

impl PartialEq for AllocId {
    fn eq(&self, other: &Self) -> bool {
        self.get_id() == other.get_id()
    }
}

impl From<&dyn Allocator> for AllocId {
    fn from(alloc: &dyn Allocator) -> Self {
        AllocId::Id(alloc.alloc_id())
    }
}

//------------------------------------------------------------------------------------------------------------------------------

/// The allocator could not provide memory for the given layout.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AllocError {
    pub layout: Layout,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory allocation of {} bytes (align {}) failed", self.layout.size(), self.layout.align())
    }
}

impl std::error::Error for AllocError {}

//------------------------------------------------------------------------------------------------------------------------------

/// Allocate uninitialized storage for `count` values of `T` using the [`Mallocator`].
///
/// When `count == 0` or `T` is zero-sized, nothing is allocated and a dangling, well aligned pointer is returned.
///
/// # Errors
///
/// Returns an [`AllocError`] if the system allocator is out of memory, the failure is logged before returning.
///
/// # Panics
///
/// Panics if `count` values of `T` would take up more than `isize::MAX` bytes.
pub fn allocate_array<T>(count: usize) -> Result<NonNull<T>, AllocError> {
    let layout = array_layout::<T>(count);
    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }

    // SAFETY: The layout has a non-zero size.
    match unsafe { Mallocator.alloc(layout) } {
        Some(ptr) => Ok(ptr.cast()),
        None => {
            log_error!(LOG_CAT, "Failed to allocate {} bytes (align {})", layout.size(), layout.align());
            Err(AllocError { layout })
        },
    }
}

/// Release storage returned by [`allocate_array`].
///
/// # Safety
///
/// - `ptr` must have been returned by `allocate_array::<T>(count)` with the same `count`.
/// - Any values still living in the storage are not dropped, and the storage must not be used afterwards.
pub unsafe fn deallocate_array<T>(ptr: NonNull<T>, count: usize) {
    let layout = array_layout::<T>(count);
    if layout.size() != 0 {
        Mallocator.dealloc(ptr.cast(), layout);
    }
}

/// Allocate uninitialized storage for a single `T`.
pub fn allocate_one<T>() -> Result<NonNull<T>, AllocError> {
    allocate_array::<T>(1)
}

/// Release storage returned by [`allocate_one`].
///
/// # Safety
///
/// Same requirements as [`deallocate_array`] with a count of 1.
pub unsafe fn deallocate_one<T>(ptr: NonNull<T>) {
    deallocate_array(ptr, 1)
}

fn array_layout<T>(count: usize) -> Layout {
    #[cold]
    #[track_caller]
    fn layout_overflow(count: usize, size: usize) -> ! {
        panic!("array of {count} elements of {size} bytes exceeds the maximum allocation size");
    }

    match Layout::array::<T>(count) {
        Ok(layout) => layout,
        Err(_) => layout_overflow(count, mem::size_of::<T>()),
    }
}
