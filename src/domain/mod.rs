/// Domain layer - meeting records, validation and prompts
///
/// These models are independent of any particular generative API.
pub mod models;
pub mod prompts;
pub mod tools;
pub mod validation;
