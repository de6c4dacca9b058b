//! Generative service adapters
//!
//! Implementations of the GenerativeServicePort:
//! - OpenAI (chat completions with function tools, image generation)

pub mod openai;

pub use openai::OpenAIService;
