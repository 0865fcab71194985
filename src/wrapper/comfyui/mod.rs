//! ComfyUI 节点相关封装

mod prompt_server;
pub use prompt_server::PromptServer;

pub mod types;
