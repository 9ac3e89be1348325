use clap::Parser;
use gq_cli::commands::ask::{ask_command, AskOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gq")]
#[command(about = "A CLI to ask questions about the data")]
#[command(
    long_about = "Ask questions about the data you send to it.\n\n\
    Data is read from stdin when piped, otherwise from the trailing text arguments.\n\
    The answer from the selected LLM provider is written to stdout."
)]
struct Cli {
    /// Question about the data sent
    #[arg(short, long)]
    question: Option<String>,

    /// Provider to ask: gemini, openai, azure or bedrock (default from config)
    #[arg(short, long)]
    provider: Option<String>,

    /// Print model parameters before asking
    #[arg(short, long)]
    verbose: bool,

    /// Debug logging to stderr
    #[arg(short = 'x', long)]
    debug: bool,

    /// Config file (default is $HOME/.config/gq/.gq.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data to ask about when nothing is piped in
    text: Vec<String>,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("gq=debug,gq_cli=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    ask_command(AskOptions {
        question: cli.question,
        provider: cli.provider,
        verbose: cli.verbose,
        config_path: cli.config,
        text: cli.text,
    })
    .await
}
