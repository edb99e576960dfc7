//! API token resolution.

mod memory;

pub use memory::InMemoryTokenResolver;
