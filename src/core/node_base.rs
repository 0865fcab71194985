//! ComfyUI 节点输入构建器
//!
//! 提供类型安全、易用的构建器 API，用于生成 ComfyUI 节点的 INPUT_TYPES
//!
//! # 使用示例
//!
//! ```rust,ignore
//! Python::with_gil(|py| {
//!     InputSpec::new()
//!         .with_required("steps", InputType::string().default("20").multiline(false))
//!         .with_required("seed", InputType::int().default(0u64).min(0u64).max(NODE_INT_MAX))
//!         .with_optional("negative", InputType::string().force_input(true))
//!         .build(py)
//! })
//! ```

use indexmap::IndexMap;
use pyo3::{
    types::{PyDict, PyDictMethods},
    Bound, IntoPyObject, Py, PyAny, PyResult, Python,
};

use crate::wrapper::comfyui::types::{
    NODE_CONDITIONING, NODE_IMAGE, NODE_INT, NODE_LATENT, NODE_MODEL, NODE_SAMPLER_PARAMS,
    NODE_STRING,
};

/// 输入规范构建器
///
/// 用于构建 ComfyUI 节点的 INPUT_TYPES 字典结构
pub struct InputSpec {
    required: Vec<(String, InputType)>,
    optional: Vec<(String, InputType)>,
}

impl InputSpec {
    /// 创建一个新的输入规范构建器
    pub fn new() -> Self {
        Self {
            required: Vec::new(),
            optional: Vec::new(),
        }
    }

    /// 添加必需输入
    pub fn with_required(mut self, name: impl Into<String>, input: InputType) -> Self {
        self.required.push((name.into(), input));
        self
    }

    /// 添加可选输入
    pub fn with_optional(mut self, name: impl Into<String>, input: InputType) -> Self {
        self.optional.push((name.into(), input));
        self
    }

    /// 构建 PyDict
    ///
    /// 生成符合 ComfyUI INPUT_TYPES 格式的字典结构, 没有可选输入时不输出 optional
    pub fn build(self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let dict = PyDict::new(py);

        let required = PyDict::new(py);
        for (name, input_type) in self.required {
            required.set_item(name, input_type.to_py_tuple(py)?)?;
        }
        dict.set_item("required", required)?;

        if !self.optional.is_empty() {
            let optional = PyDict::new(py);
            for (name, input_type) in self.optional {
                optional.set_item(name, input_type.to_py_tuple(py)?)?;
            }
            dict.set_item("optional", optional)?;
        }

        Ok(dict.into())
    }
}

impl Default for InputSpec {
    fn default() -> Self {
        Self::new()
    }
}

/// 输入类型（包含类型和参数）
pub struct InputType {
    kind: InputKind,
    params: IndexMap<String, ParamValue>,
    list_options: Vec<String>,
}

/// 输入类型枚举（仅表示类型，不包含参数）
#[derive(Debug, Clone, PartialEq)]
enum InputKind {
    String,
    Int,
    List,
    Image,
    Model,
    Conditioning,
    Latent,
    SamplerParams,
}

/// 参数值
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    UInt(u64),
    Bool(bool),
}

impl InputType {
    fn new(kind: InputKind) -> Self {
        Self {
            kind,
            params: IndexMap::new(),
            list_options: Vec::new(),
        }
    }

    /// String 类型
    pub fn string() -> Self {
        Self::new(InputKind::String)
    }

    /// Int 类型
    pub fn int() -> Self {
        Self::new(InputKind::Int)
    }

    /// Image 类型
    pub fn image() -> Self {
        Self::new(InputKind::Image)
    }

    /// 动态选项列表
    pub fn list(options: Vec<String>) -> Self {
        Self {
            kind: InputKind::List,
            params: IndexMap::new(),
            list_options: options,
        }
    }

    /// Model 类型
    pub fn model() -> Self {
        Self::new(InputKind::Model)
    }

    /// Conditioning 类型
    pub fn conditioning() -> Self {
        Self::new(InputKind::Conditioning)
    }

    /// Latent 类型
    pub fn latent() -> Self {
        Self::new(InputKind::Latent)
    }

    /// 采样参数记录列表
    pub fn sampler_params() -> Self {
        Self::new(InputKind::SamplerParams)
    }
}

impl InputType {
    // ============ 通用参数 ============

    /// 设置默认值
    pub fn default<V: Into<ParamValue>>(mut self, value: V) -> Self {
        self.params.insert("default".to_string(), value.into());
        self
    }

    /// 设置提示文本
    pub fn tooltip(mut self, value: impl Into<String>) -> Self {
        self.params
            .insert("tooltip".to_string(), ParamValue::String(value.into()));
        self
    }

    /// 强制输入
    pub fn force_input(mut self, force: bool) -> Self {
        self.params
            .insert("forceInput".to_string(), ParamValue::Bool(force));
        self
    }

    // ============ 数值类型参数 ============

    /// 设置最小值
    pub fn min<V: Into<ParamValue>>(mut self, value: V) -> Self {
        self.params.insert("min".to_string(), value.into());
        self
    }

    /// 设置最大值
    pub fn max<V: Into<ParamValue>>(mut self, value: V) -> Self {
        self.params.insert("max".to_string(), value.into());
        self
    }

    // ============ 字符串类型参数 ============

    /// 设置多行文本
    pub fn multiline(mut self, multiline: bool) -> Self {
        self.params
            .insert("multiline".to_string(), ParamValue::Bool(multiline));
        self
    }

    /// 是否启用动态提示词语法 `{a|b}`
    pub fn dynamic_prompts(mut self, enabled: bool) -> Self {
        self.params
            .insert("dynamicPrompts".to_string(), ParamValue::Bool(enabled));
        self
    }

    /// 类型名称
    fn type_name(&self) -> &'static str {
        match &self.kind {
            InputKind::String => NODE_STRING,
            InputKind::Int => NODE_INT,
            InputKind::Image => NODE_IMAGE,
            InputKind::Model => NODE_MODEL,
            InputKind::Conditioning => NODE_CONDITIONING,
            InputKind::Latent => NODE_LATENT,
            InputKind::SamplerParams => NODE_SAMPLER_PARAMS,
            // 列表类型没有类型名称, 由选项列表代替
            InputKind::List => "",
        }
    }

    /// 转换为 Python 元组
    ///
    /// 列表类型：(options_list, params_dict)
    /// 其他类型：(type_name, params_dict)
    fn to_py_tuple<'py>(self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        let params_dict = self.params.to_py_dict(py)?;
        if self.kind == InputKind::List {
            return Ok((self.list_options, params_dict)
                .into_pyobject(py)?
                .into_any());
        }

        Ok((self.type_name(), params_dict).into_pyobject(py)?.into_any())
    }
}

/// 将 IndexMap<String, ParamValue> 转换为 PyDict
trait ToPyDict {
    fn to_py_dict(&self, py: Python<'_>) -> PyResult<Py<PyDict>>;
}

impl ToPyDict for IndexMap<String, ParamValue> {
    fn to_py_dict(&self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let dict = PyDict::new(py);
        for (key, value) in self {
            match value {
                ParamValue::String(s) => dict.set_item(key, s.as_str())?,
                ParamValue::UInt(u) => dict.set_item(key, *u)?,
                ParamValue::Bool(b) => dict.set_item(key, *b)?,
            }
        }
        Ok(dict.into())
    }
}

// ============ ParamValue 的 From 实现 ============

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<u64> for ParamValue {
    fn from(u: u64) -> Self {
        ParamValue::UInt(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrapper::comfyui::types::NODE_INT_MAX;

    #[test]
    fn test_input_spec_builder() -> anyhow::Result<()> {
        let spec = InputSpec::new()
            .with_required("model", InputType::model())
            .with_required("seed", InputType::int().default(0u64).min(0u64).max(NODE_INT_MAX))
            .with_optional("negative", InputType::string().force_input(true));

        assert_eq!(spec.required.len(), 2);
        assert_eq!(spec.optional.len(), 1);
        assert_eq!(spec.required[0].0, "model");
        assert_eq!(spec.required[0].1.type_name(), NODE_MODEL);
        assert_eq!(
            spec.required[1].1.params.get("max"),
            Some(&ParamValue::UInt(0xffffffffffffffff))
        );
        Ok(())
    }

    /// 参数保持插入顺序, 重复设置时覆盖
    #[test]
    fn test_string_params_order() -> anyhow::Result<()> {
        let input = InputType::string()
            .multiline(false)
            .dynamic_prompts(false)
            .default("euler")
            .default("ddim");

        let keys: Vec<&str> = input.params.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["multiline", "dynamicPrompts", "default"]);
        assert_eq!(
            input.params.get("default"),
            Some(&ParamValue::String("ddim".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_list_input_type() -> anyhow::Result<()> {
        let options = vec!["flux1-dev.safetensors".to_string(), "sd3.sft".to_string()];
        let spec = InputSpec::new().with_required("model_name", InputType::list(options.clone()));

        assert_eq!(spec.required[0].1.list_options, options);
        assert_eq!(spec.required[0].1.type_name(), "");
        Ok(())
    }
}
