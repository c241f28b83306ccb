pub(crate) mod alloc_stats;
mod compressed_pair;
mod unique;

pub use alloc_stats::{thread_alloc_stats, AllocStats};
pub use compressed_pair::*;
pub use unique::*;
