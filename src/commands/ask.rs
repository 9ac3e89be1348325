//! Ask command: one question, one provider call, one printed answer.
//!
//! Resolves the prompt from flags, trailing text and piped stdin, loads the
//! config, picks the provider, queries it and writes the unquoted answer
//! to stdout.

use crate::config::Config;
use crate::input::{is_input_from_pipe, read_input, resolve_prompt};
use crate::llm::{build_provider, LLMProvider};
use crate::output;
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

/// Options collected from the command line
#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    pub question: Option<String>,
    pub provider: Option<String>,
    pub verbose: bool,
    pub config_path: Option<PathBuf>,
    pub text: Vec<String>,
}

/// Run the ask command against real stdin/stdout
pub async fn ask_command(options: AskOptions) -> Result<()> {
    let piped = if is_input_from_pipe() {
        debug!("Reading piped input from stdin");
        Some(read_input(io::stdin().lock())?)
    } else {
        None
    };

    let prompt = resolve_prompt(options.question.as_deref(), piped.as_deref(), &options.text)?;

    let config_path = match &options.config_path {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;

    let answer = ask(&config, options.provider.as_deref(), &prompt, options.verbose).await?;

    output::write(&answer, &mut io::stdout().lock())?;
    Ok(())
}

/// Send `prompt` to the selected provider and return its raw answer
pub async fn ask(
    config: &Config,
    provider_flag: Option<&str>,
    prompt: &str,
    verbose: bool,
) -> Result<String> {
    let kind = config.resolve_provider(provider_flag)?;
    let provider = build_provider(kind, config)?;
    info!("Asking {} ({} chars)", provider.name(), prompt.len());

    if verbose {
        print_params(provider.as_ref());
    }

    let pb = spinner(&format!("Waiting for {}...", provider.name()));
    let result = provider.query(prompt).await;
    pb.finish_and_clear();

    let answer = result.with_context(|| format!("{} chat call failed", provider.name()))?;
    debug!("Received {} chars from {}", answer.len(), provider.name());
    Ok(answer)
}

/// Print model parameters to stderr so stdout stays clean for the answer
fn print_params(provider: &dyn LLMProvider) {
    eprintln!("{}", "Model Params:".yellow());
    eprintln!("{}", format!("Provider: {}", provider.name()).cyan());
    for (label, value) in provider.params() {
        eprintln!("{}", format!("{}: {}", label, value).cyan());
    }
    eprintln!();
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_provider_flag() {
        let config = Config::from_yaml("gemini:\n  apiKey: k\n").unwrap();
        let err = ask(&config, Some("cohere"), "hi", false).await.unwrap_err();
        assert!(err.to_string().contains("Unsupported provider: cohere"));
    }

    #[tokio::test]
    async fn test_missing_section_for_selected_provider() {
        let config = Config::from_yaml("gemini:\n  apiKey: k\n").unwrap();
        let err = ask(&config, Some("openai"), "hi", false).await.unwrap_err();
        assert!(err.to_string().contains("openAI"));
    }

    #[tokio::test]
    async fn test_unsupported_openai_model() {
        let config =
            Config::from_yaml("openAI:\n  apiKey: k\n  modelName: davinci\n").unwrap();
        let err = ask(&config, Some("openai"), "hi", false).await.unwrap_err();
        assert!(err.to_string().contains("davinci"));
    }
}
