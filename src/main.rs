use clap::Parser;
use form_autofill::cli::commands::{FillArgs, cmd_discover, cmd_fill, log_filter};
use form_autofill::cli::config::{Cli, Commands, load_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref());

    // Resolve Ollama settings: CLI > config > defaults
    let ollama_endpoint = cli
        .ollama_endpoint
        .as_deref()
        .or(config.ollama.endpoint.as_deref());
    let ollama_model = cli
        .ollama_model
        .as_deref()
        .or(config.ollama.model.as_deref());

    match cli.command {
        Commands::Fill {
            target,
            context,
            provider,
            answers,
            settle_ms,
            field_delay_ms,
            headless,
            keep_open,
            output,
            trace,
        } => {
            let args = FillArgs {
                target,
                context,
                provider,
                answers,
                settle_ms,
                field_delay_ms,
                headless,
                keep_open,
                output,
                trace,
            };
            cmd_fill(&args, &config, ollama_endpoint, ollama_model)?;
        }
        Commands::Discover {
            target,
            format,
            settle_ms,
            headless,
        } => {
            cmd_discover(&target, &format, settle_ms, headless, &config)?;
        }
    }

    Ok(())
}
