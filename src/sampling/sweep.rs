//! 采样参数扫描
//!
//! 文本输入既可以是单个值, 也可以是逗号或换行分隔的列表.
//! 采样器与调度器支持 `*` (全部) 与 `!a, b` (排除) 两种写法.

use std::collections::BTreeSet;

use strum_macros::Display;

use crate::{sampling::Number, wrapper::comfy::samplers::KSamplerNames};

pub const DEFAULT_SAMPLER: &str = "euler";
pub const DEFAULT_SCHEDULER: &str = "simple";
pub const DEFAULT_STEPS: &str = "20";
pub const DEFAULT_SCHNELL_STEPS: &str = "4";
pub const DEFAULT_GUIDANCE: &str = "3.5";
pub const DEFAULT_DENOISE: &str = "1.0";
pub const DEFAULT_MAX_SHIFT: &str = "1.15";
pub const DEFAULT_BASE_SHIFT: &str = "0.5";
pub const DEFAULT_SCHNELL_BASE_SHIFT: &str = "1.0";
/// schnell 模型不使用 max_shift
pub const SCHNELL_MAX_SHIFT: &str = "0";

/// 按逗号与换行拆分, 去掉空白项
fn split_items(text: &str) -> impl Iterator<Item = &str> {
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// 解析数值列表
///
/// 无法解析的项会被忽略, 例如 `"1.5, abc, 2.0"` 得到 `[1.5, 2]`
pub fn parse_number_list(text: &str) -> Vec<Number> {
    split_items(text)
        .filter_map(|item| item.parse::<f64>().ok())
        .map(Number::from_f64)
        .collect()
}

/// 空文本使用默认值, 解析结果为空时同样回退到默认值
fn number_axis(text: &str, default: &str) -> Vec<Number> {
    let text = if text.trim().is_empty() { default } else { text };
    let values = parse_number_list(text);
    if values.is_empty() {
        return parse_number_list(default);
    }
    values
}

/// 枚举值选择器
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// 全部已知值
    All,
    /// 排除指定值后的全部已知值
    Exclude(BTreeSet<String>),
    /// 指定值, 保持输入顺序
    Include(Vec<String>),
}

impl Selector {
    /// 从文本解析
    ///
    /// - `*` 全部
    /// - `!` 开头为排除列表, 每一项两端的 `!` 与空格会被去掉
    /// - 其余为包含列表
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text == "*" {
            return Selector::All;
        }

        if let Some(rest) = text.strip_prefix('!') {
            let names = split_items(rest)
                .map(|item| item.trim_matches(|c| c == '!' || c == ' '))
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect();
            return Selector::Exclude(names);
        }

        Selector::Include(split_items(text).map(str::to_string).collect())
    }

    /// 根据已知值列表展开
    ///
    /// 未知名称会被丢弃
    pub fn resolve(&self, known: &[String]) -> Vec<String> {
        match self {
            Selector::All => known.to_vec(),
            Selector::Exclude(names) => known
                .iter()
                .filter(|name| !names.contains(name.as_str()))
                .cloned()
                .collect(),
            Selector::Include(names) => names
                .iter()
                .filter(|name| known.contains(*name))
                .cloned()
                .collect(),
        }
    }

    /// 展开结果为空时使用默认值
    pub fn resolve_or(&self, known: &[String], default: &str) -> Vec<String> {
        let values = self.resolve(known);
        if values.is_empty() {
            return vec![default.to_string()];
        }
        values
    }
}

/// 模型类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ModelKind {
    /// flux dev, 使用 max_shift / base_shift
    Dev,
    /// FLOW 类型的模型 (flux schnell), 只使用 base_shift
    Schnell,
}

/// 模型采样补丁参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelShift {
    Flux {
        max_shift: Number,
        base_shift: Number,
        width: u64,
        height: u64,
    },
    AuraFlow {
        shift: Number,
    },
}

impl ModelShift {
    pub fn new(
        kind: ModelKind,
        max_shift: Number,
        base_shift: Number,
        width: u64,
        height: u64,
    ) -> Self {
        match kind {
            ModelKind::Dev => ModelShift::Flux {
                max_shift,
                base_shift,
                width,
                height,
            },
            ModelKind::Schnell => ModelShift::AuraFlow { shift: base_shift },
        }
    }
}

/// 节点的文本输入
#[derive(Debug, Clone, Default)]
pub struct SweepInputs<'a> {
    pub sampler: &'a str,
    pub scheduler: &'a str,
    pub steps: &'a str,
    pub guidance: &'a str,
    pub max_shift: &'a str,
    pub base_shift: &'a str,
    pub denoise: &'a str,
}

/// 扫描计划, 每个字段为一个维度
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    pub seeds: Vec<u64>,
    pub max_shifts: Vec<Number>,
    pub base_shifts: Vec<Number>,
    pub guidances: Vec<Number>,
    pub samplers: Vec<String>,
    pub schedulers: Vec<String>,
    pub steps: Vec<Number>,
    pub denoises: Vec<Number>,
}

impl SweepPlan {
    pub fn new(inputs: &SweepInputs, seed: u64, kind: ModelKind, names: &KSamplerNames) -> Self {
        let samplers =
            Selector::parse(inputs.sampler).resolve_or(&names.samplers, DEFAULT_SAMPLER);
        let schedulers =
            Selector::parse(inputs.scheduler).resolve_or(&names.schedulers, DEFAULT_SCHEDULER);

        let (default_steps, max_shifts, base_shifts) = match kind {
            ModelKind::Dev => (
                DEFAULT_STEPS,
                number_axis(inputs.max_shift, DEFAULT_MAX_SHIFT),
                number_axis(inputs.base_shift, DEFAULT_BASE_SHIFT),
            ),
            ModelKind::Schnell => (
                DEFAULT_SCHNELL_STEPS,
                parse_number_list(SCHNELL_MAX_SHIFT),
                number_axis(inputs.base_shift, DEFAULT_SCHNELL_BASE_SHIFT),
            ),
        };

        Self {
            seeds: vec![seed],
            max_shifts,
            base_shifts,
            guidances: number_axis(inputs.guidance, DEFAULT_GUIDANCE),
            samplers,
            schedulers,
            steps: number_axis(inputs.steps, default_steps),
            denoises: number_axis(inputs.denoise, DEFAULT_DENOISE),
        }
    }

    /// 单个 conditioning 的组合数
    pub fn combinations(&self) -> usize {
        self.seeds.len()
            * self.max_shifts.len()
            * self.base_shifts.len()
            * self.guidances.len()
            * self.samplers.len()
            * self.schedulers.len()
            * self.steps.len()
            * self.denoises.len()
    }

    /// 总采样次数
    pub fn total(&self, conditionings: usize) -> usize {
        conditionings * self.combinations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> KSamplerNames {
        KSamplerNames {
            samplers: ["euler", "euler_ancestral", "heun", "dpmpp_2m", "ddim"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            schedulers: ["normal", "karras", "simple", "beta"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    #[test]
    fn test_parse_number_list() -> anyhow::Result<()> {
        assert_eq!(
            parse_number_list("20, 30\n40"),
            vec![Number::Int(20), Number::Int(30), Number::Int(40)]
        );
        assert_eq!(
            parse_number_list("1.5, abc, 2.0"),
            vec![Number::Float(1.5), Number::Int(2)]
        );
        assert!(parse_number_list(" , \n,").is_empty());
        assert!(parse_number_list("").is_empty());
        Ok(())
    }

    #[test]
    fn test_selector_all() -> anyhow::Result<()> {
        let names = names();
        assert_eq!(Selector::parse("*"), Selector::All);
        assert_eq!(Selector::parse(" * ").resolve(&names.samplers), names.samplers);
        Ok(())
    }

    #[test]
    fn test_selector_exclude() -> anyhow::Result<()> {
        let names = names();
        let selector = Selector::parse("!euler, ddim");
        assert_eq!(
            selector,
            Selector::Exclude(BTreeSet::from(["euler".to_string(), "ddim".to_string()]))
        );
        assert_eq!(
            selector.resolve(&names.samplers),
            vec!["euler_ancestral", "heun", "dpmpp_2m"]
        );

        // 每一项前的 ! 同样有效
        assert_eq!(
            Selector::parse("!euler\n!heun").resolve(&names.samplers),
            vec!["euler_ancestral", "dpmpp_2m", "ddim"]
        );

        // 重复的 ! 全部去掉
        assert_eq!(
            Selector::parse("!!euler, ! heun!").resolve(&names.samplers),
            vec!["euler_ancestral", "dpmpp_2m", "ddim"]
        );
        Ok(())
    }

    #[test]
    fn test_selector_include() -> anyhow::Result<()> {
        let names = names();
        assert_eq!(
            Selector::parse("ddim, unknown,\neuler").resolve(&names.samplers),
            vec!["ddim", "euler"]
        );
        assert_eq!(
            Selector::parse("unknown").resolve_or(&names.schedulers, DEFAULT_SCHEDULER),
            vec!["simple"]
        );
        Ok(())
    }

    #[test]
    fn test_plan_defaults_dev() -> anyhow::Result<()> {
        let inputs = SweepInputs {
            sampler: "euler",
            scheduler: "simple",
            ..Default::default()
        };
        let plan = SweepPlan::new(&inputs, 42, ModelKind::Dev, &names());

        assert_eq!(plan.seeds, vec![42]);
        assert_eq!(plan.steps, vec![Number::Int(20)]);
        assert_eq!(plan.guidances, vec![Number::Float(3.5)]);
        assert_eq!(plan.max_shifts, vec![Number::Float(1.15)]);
        assert_eq!(plan.base_shifts, vec![Number::Float(0.5)]);
        assert_eq!(plan.denoises, vec![Number::Int(1)]);
        assert_eq!(plan.combinations(), 1);
        Ok(())
    }

    #[test]
    fn test_plan_defaults_schnell() -> anyhow::Result<()> {
        let inputs = SweepInputs {
            max_shift: "1.5, 2.0",
            ..Default::default()
        };
        let plan = SweepPlan::new(&inputs, 0, ModelKind::Schnell, &names());

        assert_eq!(plan.steps, vec![Number::Int(4)]);
        // schnell 忽略 max_shift 输入
        assert_eq!(plan.max_shifts, vec![Number::Int(0)]);
        assert_eq!(plan.base_shifts, vec![Number::Int(1)]);
        assert_eq!(plan.samplers, vec!["euler"]);
        assert_eq!(plan.schedulers, vec!["simple"]);
        Ok(())
    }

    #[test]
    fn test_plan_malformed_falls_back() -> anyhow::Result<()> {
        let inputs = SweepInputs {
            steps: "abc",
            denoise: "x, y",
            max_shift: "?",
            ..Default::default()
        };
        let plan = SweepPlan::new(&inputs, 0, ModelKind::Dev, &names());

        assert_eq!(plan.steps, vec![Number::Int(20)]);
        assert_eq!(plan.denoises, vec![Number::Int(1)]);
        assert_eq!(plan.max_shifts, vec![Number::Float(1.15)]);
        Ok(())
    }

    #[test]
    fn test_plan_total_is_product() -> anyhow::Result<()> {
        let inputs = SweepInputs {
            sampler: "euler, heun",
            scheduler: "!normal",
            steps: "10, 20, 30",
            guidance: "2.5\n3.5",
            max_shift: "1.15",
            base_shift: "0.5, 0.75",
            denoise: "1.0",
        };
        let plan = SweepPlan::new(&inputs, 7, ModelKind::Dev, &names());

        assert_eq!(plan.schedulers, vec!["karras", "simple", "beta"]);
        // 1 seed * 1 max * 2 base * 2 guidance * 2 sampler * 3 scheduler * 3 steps * 1 denoise
        assert_eq!(plan.combinations(), 72);
        assert_eq!(plan.total(3), 216);
        Ok(())
    }
}
