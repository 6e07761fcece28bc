//! Status readers

mod tool_status;

pub use tool_status::ToolStatusReader;
