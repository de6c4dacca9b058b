//! Output storage adapters

pub mod filesystem;

pub use filesystem::FileSystemOutput;
