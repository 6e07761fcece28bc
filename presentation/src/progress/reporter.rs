//! Progress reporting for turn execution

use colored::Colorize;
use helm_application::TurnProgressNotifier;
use helm_domain::{ReflectionDecision, ToolEvent, TurnBranch, TurnState, truncate};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

const RESULT_PREVIEW_LEN: usize = 120;

/// Spinner showing the current state, with one line per finished tool
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
    verbose: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            verbose: false,
        }
    }

    /// Also print consensus rounds and retries
    pub fn verbose() -> Self {
        Self {
            spinner: Mutex::new(None),
            verbose: true,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn state_label(state: TurnState) -> &'static str {
        match state {
            TurnState::Interpret => "Interpreting",
            TurnState::SelectTool => "Choosing a tool",
            TurnState::Execute => "Running tool",
            TurnState::ReflectSummarize => "Reflecting",
        }
    }

    fn with_spinner(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.spinner.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }

    /// Print above the spinner, or directly when none is active
    fn println(&self, line: String) {
        if let Ok(guard) = self.spinner.lock() {
            match guard.as_ref() {
                Some(pb) => pb.println(line),
                None => eprintln!("{}", line),
            }
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.spinner.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnProgressNotifier for ProgressReporter {
    fn on_state_change(&self, state: TurnState, iteration: usize, max_iterations: usize) {
        let prefix = if iteration > 0 {
            format!("[{}/{}] {}", iteration, max_iterations, Self::state_label(state))
        } else {
            Self::state_label(state).to_string()
        };

        if let Ok(mut guard) = self.spinner.lock() {
            let pb = guard.get_or_insert_with(|| {
                let pb = ProgressBar::new_spinner();
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            });
            pb.set_prefix(prefix);
            pb.set_message("");
        }
    }

    fn on_interpretation(&self, kind: &str, text: &str) {
        if self.verbose {
            self.println(format!("  {} {}: {}", "→".dimmed(), kind, text.dimmed()));
        }
    }

    fn on_consensus(&self, purpose: &str, winner: Option<&str>, matches: usize, queries: usize) {
        if self.verbose {
            self.println(format!(
                "  {} {} {} ({}/{} agree)",
                "⚖".dimmed(),
                purpose,
                winner.unwrap_or("no consensus").bold(),
                matches,
                queries
            ));
        }
    }

    fn on_retry(&self, purpose: &str, attempt: usize, reason: &str) {
        self.with_spinner(|pb| pb.set_message(format!("retrying {} (#{})", purpose, attempt)));
        if self.verbose {
            self.println(format!(
                "  {} retry {} #{}: {}",
                "↻".yellow(),
                purpose,
                attempt,
                reason.dimmed()
            ));
        }
    }

    fn on_tool_call(&self, tool_name: &str, args: &str) {
        self.with_spinner(|pb| pb.set_message(format!("{} {}", tool_name.bold(), args.dimmed())));
    }

    fn on_tool_progress(&self, tool_name: &str, message: &str) {
        self.with_spinner(|pb| pb.set_message(format!("{}: {}", tool_name.bold(), message)));
    }

    fn on_tool_result(&self, event: &ToolEvent) {
        let marker = if event.success {
            event.marker().green()
        } else {
            event.marker().red()
        };
        self.println(format!(
            "  {} {} {}",
            marker,
            event.call_signature(),
            truncate(event.result.trim(), RESULT_PREVIEW_LEN).dimmed()
        ));
    }

    fn on_reflection(&self, decision: &ReflectionDecision) {
        if self.verbose
            && let Some(remaining) = decision.remaining_query()
        {
            self.println(format!("  {} next: {}", "→".dimmed(), remaining));
        }
    }

    fn on_turn_complete(&self, _branch: TurnBranch, _iterations: usize) {
        self.clear();
    }
}

/// Simple text-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl TurnProgressNotifier for SimpleProgress {
    fn on_state_change(&self, state: TurnState, iteration: usize, max_iterations: usize) {
        eprintln!(
            "{} {} ({}/{})",
            "->".cyan(),
            state.as_str().bold(),
            iteration,
            max_iterations
        );
    }

    fn on_tool_call(&self, tool_name: &str, args: &str) {
        eprintln!("  call {} {}", tool_name, args);
    }

    fn on_tool_progress(&self, tool_name: &str, message: &str) {
        eprintln!("  {}: {}", tool_name, message);
    }

    fn on_tool_result(&self, event: &ToolEvent) {
        if event.success {
            eprintln!("  {} {}", "v".green(), event.short_summary());
        } else {
            eprintln!("  {} {} (failed)", "x".red(), event.short_summary());
        }
    }

    fn on_turn_complete(&self, branch: TurnBranch, iterations: usize) {
        eprintln!("{} {} after {} iteration(s)", "->".cyan(), branch, iterations);
    }
}
