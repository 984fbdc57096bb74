//! Configuration management for Lectio.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    EmbeddingSettings, GeneralSettings, GenerationSettings, RetrievalSettings, RetrySettings,
    Settings,
};
