//! Weft kernel
//!
//! Core traits and types for the Weft orchestration kernel:
//!
//! - [`ai`]: AI service traits, capability tags and the service registry
//! - [`function`]: kernel functions, context variables and results
//! - [`kernel`]: the [`Kernel`](kernel::Kernel) pipeline executor and its builder
//! - [`memory`]: semantic memory records and the vector store / embedding seams
//! - [`config`]: kernel settings and the multi-format loader
//!
//! Concrete memory stores, embedding generators and plugins live in
//! `weft-foundation`.

// AI services
pub mod ai;

// configuration
pub mod config;

// error module
pub mod error;

// functions and pipeline values
pub mod function;

// kernel
pub mod kernel;

// semantic memory
pub mod memory;

pub use error::{KernelError, KernelReport, Result};
pub use kernel::{Kernel, KernelBuilder};
