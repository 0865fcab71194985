//! 采样参数记录
//!
//! 每次采样生成一条记录, 以 `list[dict]` 形式在节点之间传递 (SAMPLER_PARAMS)

use pyo3::{Bound, PyAny, Python};
use serde::{Deserialize, Serialize};

use crate::{error::Error, sampling::Number};

/// 单次采样的参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerParams {
    /// 采样耗时, 秒
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    pub width: u64,
    pub height: u64,
    pub sampler: String,
    pub scheduler: String,
    pub steps: Number,
    #[serde(default)]
    pub guidance: Option<Number>,
    #[serde(default)]
    pub max_shift: Option<Number>,
    #[serde(default)]
    pub base_shift: Option<Number>,
    #[serde(default)]
    pub denoise: Option<Number>,
    /// 批量文本编码时对应的提示词
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_hash: Option<String>,
}

/// 转换为 Python 的 `list[dict]`
pub fn params_to_py<'py>(
    py: Python<'py>,
    params: &[SamplerParams],
) -> Result<Bound<'py, PyAny>, Error> {
    Ok(pythonize::pythonize(py, params)?)
}

/// 从 Python 的 `list[dict]` 解析
pub fn params_from_py(params: &Bound<'_, PyAny>) -> Result<Vec<SamplerParams>, Error> {
    Ok(pythonize::depythonize(params)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_json_fields() -> anyhow::Result<()> {
        let params = SamplerParams {
            time: 1.25,
            seed: Some(42),
            width: 1024,
            height: 768,
            sampler: "euler".to_string(),
            scheduler: "simple".to_string(),
            steps: Number::Int(20),
            guidance: Some(Number::Float(3.5)),
            max_shift: Some(Number::Float(1.15)),
            base_shift: Some(Number::Float(0.5)),
            denoise: Some(Number::Int(1)),
            prompt: None,
            model_hash: None,
        };

        let value = serde_json::to_value(&params)?;
        assert_eq!(value["steps"], 20);
        assert_eq!(value["guidance"], 3.5);
        assert!(value["prompt"].is_null());
        assert!(value.get("model_hash").is_none());
        Ok(())
    }

    /// 其他节点生成的记录可能缺少部分字段
    #[test]
    fn test_params_lenient_parse() -> anyhow::Result<()> {
        let params: SamplerParams = serde_json::from_str(
            r#"{"width": 512, "height": 512, "sampler": "ddim", "scheduler": "normal",
                "steps": 30, "model_hash": "abc123", "unknown": true}"#,
        )?;

        assert_eq!(params.seed, None);
        assert_eq!(params.guidance, None);
        assert_eq!(params.model_hash.as_deref(), Some("abc123"));
        Ok(())
    }
}
