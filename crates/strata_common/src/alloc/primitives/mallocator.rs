use std::{
    alloc::{self, Layout},
    ptr::NonNull,
};

use crate::{alloc::{Allocator, AllocId}, mem::alloc_stats};

/// Allocator calling directly to the system allocator
///
/// Mallocator uses rust's global allocator to retrieve memory, there is no pooling and no size negotiation.
/// Zero-sized requests never reach the global allocator.
///
/// This allocator has a special allocator id, which will always refer to the Mallocator: `AllocId::Malloc`
#[derive(Clone, Copy, Default, Debug)]
pub struct Mallocator;

impl Allocator for Mallocator {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            // An address equal to the alignment is always non-null and well aligned
            return NonNull::new(layout.align() as *mut u8);
        }

        let ptr = NonNull::new(alloc::alloc(layout))?;
        alloc_stats::record_alloc(layout.size());
        Some(ptr)
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }

        alloc::dealloc(ptr.as_ptr(), layout);
        alloc_stats::record_dealloc(layout.size());
    }

    fn owns(&self, _ptr: NonNull<u8>, _layout: Layout) -> bool {
        // We have no real way of knowing that we allocated this, so we'll just assume that we allocated it
        true
    }

    fn alloc_id(&self) -> u16 {
        AllocId::Malloc.get_id()
    }
}
