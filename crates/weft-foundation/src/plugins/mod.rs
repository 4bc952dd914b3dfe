//! Kernel plugins built on foundation services

pub mod text_memory;

pub use text_memory::{PLUGIN_NAME as TEXT_MEMORY_PLUGIN, TextMemoryPlugin};
