//! status reader configuration from TOML (`[status]` section)

use serde::{Deserialize, Serialize};

/// Raw status configuration
///
/// ```toml
/// [status]
/// tool = "read_status"   # read-only tool called before selection and reflection
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStatusConfig {
    /// Name of a configured tool used to read status
    pub tool: Option<String>,
}
