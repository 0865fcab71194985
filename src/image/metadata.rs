//! 图像元数据
//!
//! 生成与 A1111 `parameters` 文本兼容的元数据

use crate::sampling::{Number, SamplerParams};

/// 未提供负向提示词时的占位文本
const NEGATIVE_NOT_USED: &str = "(not used)";
/// 未记录引导强度时的 CFG scale
const DEFAULT_CFG_SCALE: Number = Number::Float(1.0);

/// 外部提供的提示词与模型名称
#[derive(Debug, Clone, Default)]
pub struct PromptInfo<'a> {
    pub positive: &'a str,
    pub negative: Option<&'a str>,
    pub model_name: &'a str,
}

/// 采样器与调度器的组合名称, normal 调度器省略
fn sampler_scheduler(sampler: &str, scheduler: &str) -> String {
    if scheduler == "normal" {
        sampler.to_string()
    } else {
        format!("{sampler}_{scheduler}")
    }
}

/// 生成元数据文本
pub fn create_metadata_string(params: &SamplerParams, prompt: &PromptInfo) -> String {
    let negative = prompt
        .negative
        .filter(|negative| !negative.is_empty())
        .unwrap_or(NEGATIVE_NOT_USED);
    let seed = params
        .seed
        .map(|seed| seed.to_string())
        .unwrap_or_else(|| "?".to_string());

    format!(
        "{positive}\nNegative prompt: {negative}\nSteps: {steps}, Sampler: {sampler}, CFG scale: {cfg}, Seed: {seed}, Size: {width}x{height}, Model hash: {hash}, Model: {model}, Version: ComfyUI",
        positive = prompt.positive,
        steps = params.steps,
        sampler = sampler_scheduler(&params.sampler, &params.scheduler),
        cfg = params.guidance.unwrap_or(DEFAULT_CFG_SCALE),
        width = params.width,
        height = params.height,
        hash = params.model_hash.as_deref().unwrap_or_default(),
        model = prompt.model_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SamplerParams {
        SamplerParams {
            time: 0.5,
            seed: Some(1234),
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
        }
    }

    #[test]
    fn test_metadata_string() -> anyhow::Result<()> {
        let prompt = PromptInfo {
            positive: "a cat on a sofa",
            negative: Some("blurry"),
            model_name: "flux1-dev.safetensors",
        };

        assert_eq!(
            create_metadata_string(&params(), &prompt),
            "a cat on a sofa\nNegative prompt: blurry\nSteps: 20, Sampler: euler_simple, CFG scale: 3.5, Seed: 1234, Size: 1024x768, Model hash: , Model: flux1-dev.safetensors, Version: ComfyUI"
        );
        Ok(())
    }

    #[test]
    fn test_metadata_defaults() -> anyhow::Result<()> {
        let mut params = params();
        params.scheduler = "normal".to_string();
        params.seed = None;
        params.guidance = None;
        params.model_hash = Some("abc123".to_string());

        let prompt = PromptInfo {
            positive: "p",
            negative: None,
            model_name: "m",
        };

        assert_eq!(
            create_metadata_string(&params, &prompt),
            "p\nNegative prompt: (not used)\nSteps: 20, Sampler: euler, CFG scale: 1.0, Seed: ?, Size: 1024x768, Model hash: abc123, Model: m, Version: ComfyUI"
        );
        Ok(())
    }
}
