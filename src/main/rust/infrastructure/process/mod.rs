mod tool_runner;

pub use tool_runner::{ToolOutput, ToolRunner};
