pub use crate::alloc::{AllocId, Allocator, Mallocator};
pub use crate::mem::{UniquePtr, DefaultDelete, Deleter};
pub use crate::collections::{DynArr, LinkedList, TryReserveError};
pub use crate::dynarr;
