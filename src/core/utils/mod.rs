//! 工具
pub mod filename;
pub mod image;
