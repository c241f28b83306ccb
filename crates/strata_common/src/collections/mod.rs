mod imp;

mod dynarr;
pub mod linked_list;

use core::{alloc::Layout, fmt};

use crate::alloc::AllocError;

pub use dynarr::*;
pub use linked_list::LinkedList;

//--------------------------------------------------------------

macro_rules! impl_slice_partial_eq_generic {
    ([$($vars:tt)*] $lhs:ty, $rhs:ty $(where $ty:ty: $bound:ident)?) => {
        impl<T, U, $($vars)*> PartialEq<$rhs> for $lhs  where
            T : PartialEq<U>,
            $($ty: $bound)?
        {
            #[inline]
            fn eq(&self, other: &$rhs) -> bool { self[..] == other[..] }
            #[inline]
            fn ne(&self, other: &$rhs) -> bool { self[..] != other[..] }
        }
    };
}
use impl_slice_partial_eq_generic;

//--------------------------------------------------------------

/// The error type for `try_reserve` methods.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TryReserveError {
    /// The requested capacity exceeds the maximum size of the collection (`max_size()`).
    CapacityOverflow,
    /// The memory allocator returned an error
    AllocError {
        /// The layout of the allocation request that failed
        layout: Layout,
    },
}

impl From<AllocError> for TryReserveError {
    fn from(err: AllocError) -> Self {
        TryReserveError::AllocError { layout: err.layout }
    }
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")?;
        match self {
            TryReserveError::CapacityOverflow => f.write_str(" because the computed capacity exceeded the collection's maximum"),
            TryReserveError::AllocError { .. } => f.write_str(" because the memory allocator returned an error"),
        }
    }
}

impl std::error::Error for TryReserveError {}

/// Errors returned by checked accessors of a [`DynArr`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DynArrError {
    /// The index does not refer to a live element.
    OutOfRange {
        index: usize,
        len:   usize,
    },
}

impl fmt::Display for DynArrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynArrError::OutOfRange { index, len } => write!(f, "index (is {index}) should be < len (is {len})"),
        }
    }
}

impl std::error::Error for DynArrError {}
