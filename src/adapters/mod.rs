/// Adapters - concrete implementations of the port traits
///
/// These modules implement the port traits for specific services and
/// storage backends.
pub mod services;
pub mod storage;
