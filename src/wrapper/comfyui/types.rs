//! 类型定义
//! 相关节点定义: ComfyUI/comfy/comfy_types/node_typing.py

pub const NODE_INT: &str = "INT";
pub const NODE_STRING: &str = "STRING";
pub const NODE_IMAGE: &str = "IMAGE";
pub const NODE_MODEL: &str = "MODEL";
pub const NODE_CONDITIONING: &str = "CONDITIONING";
pub const NODE_LATENT: &str = "LATENT";

/// 采样参数记录列表, 由 FluxTextSampler 输出, FluxPromptSaver 输入
pub const NODE_SAMPLER_PARAMS: &str = "SAMPLER_PARAMS";

pub const NODE_INT_MAX: u64 = 0xffffffffffffffffu64;
