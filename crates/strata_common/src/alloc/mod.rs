mod alloc;

pub mod primitives;

pub use alloc::*;
pub use primitives::Mallocator;
