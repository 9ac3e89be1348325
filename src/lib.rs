pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;

pub use config::Config;
pub use error::{Error, Result};
pub use llm::{build_provider, LLMProvider, ProviderKind};
