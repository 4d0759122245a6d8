//! Document providers for batch import

pub mod files;
pub mod memory;

pub use files::FileProvider;
pub use memory::MemoryProvider;
