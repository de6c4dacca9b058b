//! External service adapters
//!
//! This module contains adapters for the generative APIs used to enrich
//! meeting records.

pub mod llm;
