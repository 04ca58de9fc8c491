//! File access shared by the compiler and the CLI.

pub mod error;
pub mod filesystem;

pub use error::*;
pub use filesystem::*;
