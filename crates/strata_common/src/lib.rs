//! Low level building blocks shared by the rest of the workspace: raw allocation, owning pointers and containers.

pub mod alloc;
pub mod mem;
pub mod collections;

pub mod prelude;
