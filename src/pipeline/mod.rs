pub mod types;
pub mod prompt;
pub mod extract;
pub mod normalize;
pub mod image;
pub mod gemini;
pub mod demo;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use extract::*;
pub use self::image::*;
pub use gemini::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("No API key. Save your Gemini API key first.")]
    NoCredential,

    #[error("No image loaded. Please upload a screenshot.")]
    NoImage,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("{0}")]
    Transport(String),

    #[error("The inference service withheld its answer for safety reasons.")]
    ContentWithheld,

    #[error("The inference service returned an empty response.")]
    EmptyResponse,

    #[error("Could not read the AI response. Please try again.")]
    UnparseableResponse,

    #[error("A scan is already running.")]
    RunInProgress,
}
