//! Log configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration
///
/// ```toml
/// [logging]
/// conversation_log = "~/.local/share/helm/conversation.jsonl"
/// file = "~/.local/share/helm/helm.log"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of turn events
    pub conversation_log: Option<PathBuf>,
    /// Diagnostic log file (in addition to stderr)
    pub file: Option<PathBuf>,
}

impl FileLoggingConfig {
    /// Conversation log path with a leading `~` expanded.
    pub fn conversation_log_path(&self) -> Option<PathBuf> {
        self.conversation_log.as_deref().map(expand_home)
    }

    /// Diagnostic log path with a leading `~` expanded.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.as_deref().map(expand_home)
    }
}

fn expand_home(path: &std::path::Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let config = FileLoggingConfig {
            conversation_log: Some(PathBuf::from("~/logs/turns.jsonl")),
            file: Some(PathBuf::from("/var/log/helm.log")),
        };
        let expanded = config.conversation_log_path().unwrap();
        if dirs::home_dir().is_some() {
            assert!(!expanded.starts_with("~"));
            assert!(expanded.ends_with("logs/turns.jsonl"));
        }
        assert_eq!(config.file_path(), Some(PathBuf::from("/var/log/helm.log")));
    }
}
