//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::cli::commands::OutputFormat;
use crate::progress::reporter::ProgressReporter;
use crate::ConsoleFormatter;
use colored::Colorize;
use helm_application::{
    NoTurnProgress, RunTurnUseCase, StatusReader, TextGenerator, ToolBoundary,
    TurnProgressNotifier,
};
use helm_domain::{HistoryEntry, TurnHistory, TurnInput};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const LINE_HISTORY_SIZE: usize = 1000;

/// Slash commands understood by the REPL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatCommand {
    Help,
    History,
    Tools,
    Quit,
    Unknown,
}

impl ChatCommand {
    fn parse(line: &str) -> Self {
        match line.split_whitespace().next().unwrap_or_default() {
            "/help" | "/h" | "/?" => ChatCommand::Help,
            "/history" => ChatCommand::History,
            "/tools" => ChatCommand::Tools,
            "/quit" | "/exit" | "/q" => ChatCommand::Quit,
            _ => ChatCommand::Unknown,
        }
    }
}

/// Interactive chat REPL
pub struct ChatRepl<G, T, S>
where
    G: TextGenerator + 'static,
    T: ToolBoundary + 'static,
    S: StatusReader + 'static,
{
    use_case: RunTurnUseCase<G, T, S>,
    history: TurnHistory,
    previous_response: Option<String>,
    show_progress: bool,
    verbose: bool,
    output: OutputFormat,
    history_path: Option<PathBuf>,
}

impl<G, T, S> ChatRepl<G, T, S>
where
    G: TextGenerator + 'static,
    T: ToolBoundary + 'static,
    S: StatusReader + 'static,
{
    pub fn new(use_case: RunTurnUseCase<G, T, S>) -> Self {
        let history = TurnHistory::new(use_case.params().history_limit);
        Self {
            use_case,
            history,
            previous_response: None,
            show_progress: true,
            verbose: false,
            output: OutputFormat::Text,
            history_path: dirs::data_dir().map(|p| p.join("helm").join("history.txt")),
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Show consensus rounds and retries
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    /// Where typed lines are kept between sessions
    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_path else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(LINE_HISTORY_SIZE, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("Line history unavailable at {}: {}", path.display(), e);
                editor
            }
        }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut editor = self.editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("helm".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    self.process_request(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              helm - Chat Mode               │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Tools: {}", self.use_case.tool_spec().len());
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?    - Show this help");
        println!("  /history         - Show earlier turns");
        println!("  /tools           - List available tools");
        println!("  /quit, /exit, /q - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&self, line: &str) -> bool {
        match ChatCommand::parse(line) {
            ChatCommand::Quit => {
                println!("Bye!");
                true
            }
            ChatCommand::Help => {
                println!();
                Self::print_help();
                false
            }
            ChatCommand::History => {
                println!();
                println!("{}", self.history.to_prompt_context());
                println!();
                false
            }
            ChatCommand::Tools => {
                println!();
                for tool in self.use_case.tool_spec().all() {
                    println!(
                        "  {} {} - {}",
                        tool.name.bold(),
                        format!("[{}]", tool.tier.as_str()).dimmed(),
                        tool.description
                    );
                }
                println!();
                false
            }
            ChatCommand::Unknown => {
                println!("Unknown command: {}", line);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn process_request(&mut self, request: &str) {
        println!();

        let mut input = TurnInput::new(request);
        if let Some(previous) = &self.previous_response {
            input = input.with_previous_response(previous.clone());
        }

        // Ctrl-C while a turn runs cancels that turn only.
        let token = CancellationToken::new();
        let use_case = self.use_case.clone().with_cancellation(token.clone());
        let watcher = tokio::spawn({
            let token = token.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            }
        });

        let progress: Box<dyn TurnProgressNotifier> = match (self.show_progress, self.verbose) {
            (false, _) => Box::new(NoTurnProgress),
            (true, false) => Box::new(ProgressReporter::new()),
            (true, true) => Box::new(ProgressReporter::verbose()),
        };
        let result = use_case
            .execute_with_progress(input, &self.history, progress.as_ref())
            .await;
        watcher.abort();

        match result {
            Ok(output) => {
                print!("{}", ConsoleFormatter::render(&output, self.output));
                self.history.push(HistoryEntry::from_turn(request, &output));
                self.previous_response = Some(output.text);
            }
            Err(e) => {
                eprintln!("{}", e.to_string().yellow());
            }
        }
        println!();
    }
}
