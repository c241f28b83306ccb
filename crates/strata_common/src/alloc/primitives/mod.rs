mod mallocator;

pub use mallocator::*;
