//! Progress reporters for long-running tallies

pub mod reporter;

pub use reporter::ConsoleProgress;
