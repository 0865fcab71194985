//! comfy 宿主库封装
//!
//! 相关模块:
//! - folder_paths
//! - comfy.samplers / comfy.model_base / comfy.utils
//! - comfy_extras.nodes_custom_sampler / nodes_latent / nodes_model_advanced

pub mod custom_sampler;
pub mod folder_paths;
pub mod model_sampling;
pub mod node_helpers;
pub mod samplers;
pub mod utils;
