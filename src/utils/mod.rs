//! Utilities for credentials and input files

pub mod credentials;
pub mod input_file;
