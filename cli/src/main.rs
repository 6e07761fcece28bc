//! CLI entrypoint for helm
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use helm_application::{
    ConversationLogger, NoConversationLogger, RunTurnUseCase, StatusReader, TextGenerator,
    ToolBoundary,
};
use helm_domain::{TurnHistory, TurnInput};
use helm_infrastructure::{
    CommandToolBoundary, ConfigLoader, FileConfig, JsonlConversationLogger,
    OpenAiCompatibleGenerator, ToolStatusReader,
};
use helm_presentation::{ChatRepl, Cli, ConsoleFormatter, ProgressReporter};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        print_config_sources(&cli);
        return Ok(());
    }

    // Load configuration
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    if let Some(model) = &cli.model {
        config.generation.model = model.clone();
    }
    if let Some(max) = cli.max_iterations {
        config.agent.max_iterations = max;
    }
    config.validate().context("invalid configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_logging(&cli, &config)?;

    info!("Starting helm");

    // === Dependency Injection ===
    let generator = Arc::new(OpenAiCompatibleGenerator::from_config(&config.generation)?);
    let tools = Arc::new(CommandToolBoundary::from_config(&config.tools));
    if tools.is_empty() {
        warn!("No tools configured; every request will be answered without tools");
    }
    info!(model = generator.model(), tools = tools.len(), "Agent ready");

    let logger: Arc<dyn ConversationLogger> = match cli
        .conversation_log
        .clone()
        .or_else(|| config.logging.conversation_log_path())
    {
        Some(path) => match JsonlConversationLogger::new(&path) {
            Some(logger) => {
                info!("Conversation log: {}", logger.path().display());
                Arc::new(logger)
            }
            None => Arc::new(NoConversationLogger),
        },
        None => Arc::new(NoConversationLogger),
    };

    let params = config.execution_params();
    let use_case = RunTurnUseCase::new(generator, tools.clone(), params.clone())
        .with_conversation_logger(logger);

    match &config.status.tool {
        Some(tool) => {
            let reader = Arc::new(ToolStatusReader::new(
                tools,
                tool.as_str(),
                params.generation_timeout,
            ));
            run(&cli, use_case.with_status_reader(reader)).await
        }
        None => run(&cli, use_case).await,
    }
}

async fn run<G, T, S>(cli: &Cli, use_case: RunTurnUseCase<G, T, S>) -> Result<()>
where
    G: TextGenerator + 'static,
    T: ToolBoundary + 'static,
    S: StatusReader + 'static,
{
    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(use_case)
            .with_progress(!cli.quiet)
            .with_verbose(cli.verbose > 0)
            .with_output(cli.output);

        repl.run().await?;
        return Ok(());
    }

    // Single request mode - utterance is required
    let utterance = match &cli.utterance {
        Some(u) => u.clone(),
        None => bail!("A request is required. Use --chat for interactive mode."),
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });
    let use_case = use_case.with_cancellation(cancel);

    let history = TurnHistory::new(use_case.params().history_limit);
    let input = TurnInput::new(utterance);

    let output = if cli.quiet {
        use_case.execute(input, &history).await?
    } else if cli.verbose > 0 {
        let progress = ProgressReporter::verbose();
        use_case.execute_with_progress(input, &history, &progress).await?
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &history, &progress).await?
    };

    print!("{}", ConsoleFormatter::render(&output, cli.output));

    Ok(())
}

/// Console logs go to stderr; a log file, when configured, gets the same
/// events without colour.
fn init_logging(cli: &Cli, config: &FileConfig) -> Result<Option<WorkerGuard>> {
    // Initialize logging based on verbosity level
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match cli.log_file.clone().or_else(|| config.logging.file_path()) {
        Some(path) => {
            let (dir, name) = split_log_path(&path)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(std::path::PathBuf, std::ffi::OsString)> {
    let name = path
        .file_name()
        .with_context(|| format!("log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    Ok((dir, name.to_os_string()))
}

fn print_config_sources(cli: &Cli) {
    println!("Configuration sources (highest to lowest priority):");
    println!("  {:<10} HELM_* variables, nested keys joined with __", "Env");
    for (label, path, exists) in ConfigLoader::config_sources(cli.config.as_ref()) {
        let marker = if exists { "found" } else { "missing" };
        println!("  {:<10} {} ({})", label, path, marker);
    }
    println!("  {:<10} built-in", "Defaults");
}
