//! 节点分类
//!
//! 与宿主自带节点的分类保持一致, 节点出现在对应的菜单中

/// 采样
pub const CATEGORY_SAMPLING: &str = "sampling";
/// 图片
pub const CATEGORY_IMAGE: &str = "image";
/// 实用工具
pub const CATEGORY_UTILS: &str = "utils";
