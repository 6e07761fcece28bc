//! Command-backed tool boundary.
//!
//! Each configured tool is an external process:
//!
//! - call arguments are written to stdin as one JSON object
//! - every non-empty stderr line is a progress checkpoint
//! - stdout is the result, parsed as JSON when possible
//! - a non-zero exit code marks the result as an error
//!
//! The timeout bounds the whole call. Progress does not extend it, and the
//! process is killed when the timeout or cancellation fires.

use crate::config::FileToolConfig;
use async_trait::async_trait;
use helm_application::{ProgressFn, ToolBoundary, ToolBoundaryError};
use helm_domain::{ToolOutcome, ToolSpec};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Maximum stdout kept per call (1 MB)
const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// How one tool is launched
#[derive(Debug, Clone)]
struct CommandTool {
    command: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

/// What the process left behind
struct ProcessOutput {
    status: ExitStatus,
    stdout: String,
    stderr: Vec<String>,
}

/// Tool boundary running one process per call.
pub struct CommandToolBoundary {
    spec: ToolSpec,
    tools: HashMap<String, CommandTool>,
}

impl CommandToolBoundary {
    /// Build from `[tools.<name>]` config entries.
    pub fn from_config(configs: &BTreeMap<String, FileToolConfig>) -> Self {
        let mut spec = ToolSpec::new();
        let mut tools = HashMap::new();

        for (name, config) in configs {
            spec = spec.register(config.to_definition(name));
            for alias in &config.aliases {
                spec = spec.register_alias(alias.as_str(), name.as_str());
            }
            tools.insert(
                name.clone(),
                CommandTool {
                    command: config.command.clone(),
                    args: config.args.clone(),
                    working_dir: config.working_dir.as_ref().map(PathBuf::from),
                },
            );
        }

        info!(tools = tools.len(), "Command tools registered");
        Self { spec, tools }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn spawn(tool: &CommandTool) -> std::io::Result<Child> {
        let mut cmd = Command::new(&tool.command);
        cmd.args(&tool.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &tool.working_dir
            && dir.is_dir()
        {
            cmd.current_dir(dir);
        }
        cmd.spawn()
    }
}

/// Feed stdin, stream stderr as progress, collect stdout and wait.
async fn drive(
    child: &mut Child,
    input: String,
    progress: ProgressFn<'_>,
) -> std::io::Result<ProcessOutput> {
    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let feed = async move {
        if let Some(mut stdin) = stdin {
            // A tool that ignores its input may close stdin early.
            if let Err(e) = stdin.write_all(input.as_bytes()).await {
                debug!(error = %e, "Tool did not read its arguments");
            }
        }
        Ok::<_, std::io::Error>(())
    };

    let collect_stdout = async move {
        let mut buf = Vec::new();
        if let Some(stdout) = stdout {
            stdout.take(MAX_OUTPUT_SIZE as u64).read_to_end(&mut buf).await?;
        }
        Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
    };

    let stream_stderr = async move {
        let mut collected = Vec::new();
        if let Some(stderr) = stderr {
            let mut lines = BufReader::new(stderr).lines();
            while let Some(line) = lines.next_line().await? {
                let line = line.trim();
                if !line.is_empty() {
                    progress(line);
                    collected.push(line.to_string());
                }
            }
        }
        Ok::<_, std::io::Error>(collected)
    };

    let (fed, stdout, stderr) = tokio::join!(feed, collect_stdout, stream_stderr);
    fed?;
    let status = child.wait().await?;

    Ok(ProcessOutput {
        status,
        stdout: stdout?,
        stderr: stderr?,
    })
}

/// Turn process output into a tool outcome.
fn to_outcome(output: ProcessOutput) -> ToolOutcome {
    let stdout = output.stdout.trim();
    let mut outcome = match serde_json::from_str::<Value>(stdout) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => ToolOutcome::structured(value),
        _ if stdout.is_empty() => ToolOutcome::default(),
        _ => ToolOutcome::text(stdout),
    };

    if !output.status.success() {
        outcome.is_error = true;
        if outcome.text.is_empty() && outcome.structured.is_none() {
            let detail = output
                .stderr
                .last()
                .cloned()
                .unwrap_or_else(|| match output.status.code() {
                    Some(code) => format!("exited with status {}", code),
                    None => "terminated by signal".to_string(),
                });
            outcome = outcome.with_text(detail);
        }
    }
    outcome
}

#[async_trait]
impl ToolBoundary for CommandToolBoundary {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &BTreeMap<String, Value>,
        timeout: Duration,
        progress: ProgressFn<'_>,
        cancel: &CancellationToken,
    ) -> Result<ToolOutcome, ToolBoundaryError> {
        let canonical = self.spec.resolve(name).unwrap_or(name);
        let tool = self
            .tools
            .get(canonical)
            .ok_or_else(|| ToolBoundaryError::UnknownTool(name.to_string()))?;

        let input = serde_json::to_string(arguments)
            .map_err(|e| ToolBoundaryError::Transport(e.to_string()))?;
        let mut child = Self::spawn(tool).map_err(|e| {
            ToolBoundaryError::Transport(format!("failed to start '{}': {}", tool.command, e))
        })?;
        debug!(tool = canonical, command = %tool.command, "Tool process started");

        let result = {
            let work = drive(&mut child, input, progress);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = tokio::time::timeout(timeout, work) => Some(result),
            }
        };

        match result {
            None => {
                let _ = child.start_kill();
                Err(ToolBoundaryError::Cancelled)
            }
            Some(Err(_)) => {
                let _ = child.start_kill();
                warn!(tool = canonical, timeout_secs = timeout.as_secs(), "Tool timed out, process killed");
                Err(ToolBoundaryError::Timeout {
                    tool: canonical.to_string(),
                    seconds: timeout.as_secs(),
                })
            }
            Some(Ok(Err(e))) => Err(ToolBoundaryError::Transport(e.to_string())),
            Some(Ok(Ok(output))) => {
                debug!(tool = canonical, status = %output.status, "Tool process finished");
                Ok(to_outcome(output))
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn shell_tool(script: &str) -> FileToolConfig {
        FileToolConfig {
            description: "test tool".to_string(),
            tier: Default::default(),
            command: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            aliases: vec!["alias_tool".to_string()],
            working_dir: None,
            parameters: BTreeMap::new(),
        }
    }

    fn boundary(script: &str) -> CommandToolBoundary {
        let mut configs = BTreeMap::new();
        configs.insert("sensor".to_string(), shell_tool(script));
        CommandToolBoundary::from_config(&configs)
    }

    async fn call(
        boundary: &CommandToolBoundary,
        name: &str,
        arguments: BTreeMap<String, Value>,
        timeout: Duration,
    ) -> (Result<ToolOutcome, ToolBoundaryError>, Vec<String>) {
        let seen = Mutex::new(Vec::new());
        let progress = |message: &str| seen.lock().unwrap().push(message.to_string());
        let result = boundary
            .call_tool(name, &arguments, timeout, &progress, &CancellationToken::new())
            .await;
        let seen = seen.into_inner().unwrap();
        (result, seen)
    }

    #[tokio::test]
    async fn test_arguments_arrive_on_stdin() {
        let boundary = boundary("cat");
        let mut args = BTreeMap::new();
        args.insert("room".to_string(), Value::from("kitchen"));

        let (result, _) = call(&boundary, "sensor", args, Duration::from_secs(10)).await;
        let outcome = result.unwrap();

        assert!(outcome.classify());
        assert_eq!(outcome.structured.unwrap()["room"], "kitchen");
    }

    #[tokio::test]
    async fn test_stderr_lines_are_progress() {
        let boundary = boundary("echo warming >&2; echo moving >&2; echo done");

        let (result, progress) =
            call(&boundary, "sensor", BTreeMap::new(), Duration::from_secs(10)).await;

        assert_eq!(progress, vec!["warming".to_string(), "moving".to_string()]);
        assert_eq!(result.unwrap().render(), "done");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_error() {
        let boundary = boundary("echo jammed >&2; exit 3");

        let (result, _) = call(&boundary, "sensor", BTreeMap::new(), Duration::from_secs(10)).await;
        let outcome = result.unwrap();

        assert!(!outcome.classify());
        assert_eq!(outcome.render(), "jammed");
    }

    #[tokio::test]
    async fn test_status_field_classifies() {
        let boundary = boundary(r#"echo '{"status": "error", "message": "hydraulics offline"}'"#);

        let (result, _) = call(&boundary, "sensor", BTreeMap::new(), Duration::from_secs(10)).await;
        let outcome = result.unwrap();

        assert!(!outcome.classify());
        assert_eq!(outcome.render(), "hydraulics offline");
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let boundary = boundary("echo still going >&2; exec sleep 30");

        let started = std::time::Instant::now();
        let (result, _) =
            call(&boundary, "sensor", BTreeMap::new(), Duration::from_millis(300)).await;

        assert!(matches!(result, Err(ToolBoundaryError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_cancelled_call() {
        let boundary = boundary("exec sleep 30");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = boundary
            .call_tool(
                "sensor",
                &BTreeMap::new(),
                Duration::from_secs(60),
                &|_: &str| {},
                &cancel,
            )
            .await;

        assert_eq!(result.unwrap_err(), ToolBoundaryError::Cancelled);
    }

    #[tokio::test]
    async fn test_alias_and_unknown_tool() {
        let boundary = boundary("echo ok");

        let (result, _) =
            call(&boundary, "alias_tool", BTreeMap::new(), Duration::from_secs(10)).await;
        assert_eq!(result.unwrap().render(), "ok");

        let (result, _) = call(&boundary, "warp", BTreeMap::new(), Duration::from_secs(10)).await;
        assert!(matches!(result, Err(ToolBoundaryError::UnknownTool(_))));
    }

    #[tokio::test]
    async fn test_missing_binary_is_transport_error() {
        let mut configs = BTreeMap::new();
        let mut config = shell_tool("");
        config.command = "/nonexistent/helm-tool".to_string();
        configs.insert("ghost".to_string(), config);
        let boundary = CommandToolBoundary::from_config(&configs);

        let (result, _) = call(&boundary, "ghost", BTreeMap::new(), Duration::from_secs(10)).await;
        assert!(matches!(result, Err(ToolBoundaryError::Transport(_))));
    }

    #[test]
    fn test_spec_from_config() {
        let boundary = boundary("true");
        assert_eq!(boundary.len(), 1);
        assert!(boundary.has_tool("sensor"));
        assert_eq!(boundary.tool_spec().resolve("alias_tool"), Some("sensor"));
    }
}
