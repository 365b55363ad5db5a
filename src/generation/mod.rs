//! Text generation backends for the relevance judge

mod http;
mod traits;

pub use http::HttpGenerator;
pub use traits::{GenerationError, GenerationResult, TextGenerator};
