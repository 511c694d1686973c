#[path = "buffer_pool_manager.rs"]
mod inner;

pub use inner::{BufferPoolManager, BufferPoolManagerBuilder};
