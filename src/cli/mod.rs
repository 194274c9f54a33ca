//! Command-line surface of the worker binary.

pub mod args;
pub mod paths;

pub use args::Cli;
