//! python 包装
//!
//! 宿主 (ComfyUI) 与 torch 的 Python 对象封装, 节点只通过这里访问宿主

pub mod comfy;
pub mod comfyui;
pub mod torch;
