//! Shared utilities for the cani2d CLI

pub mod progress;
pub mod table;
pub mod tree;

pub use progress::*;
pub use table::*;
pub use tree::*;
