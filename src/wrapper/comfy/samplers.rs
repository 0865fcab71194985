//! comfy.samplers / comfy.model_base

use pyo3::{
    types::{PyAnyMethods, PyModule},
    Bound, PyAny, Python,
};

use crate::error::Error;

/// 宿主已知的采样器与调度器名称
#[derive(Debug, Clone, Default)]
pub struct KSamplerNames {
    pub samplers: Vec<String>,
    pub schedulers: Vec<String>,
}

impl KSamplerNames {
    /// 读取 `comfy.samplers.KSampler.SAMPLERS / SCHEDULERS`
    pub fn load(py: Python<'_>) -> Result<Self, Error> {
        let ksampler = PyModule::import(py, "comfy.samplers")?.getattr("KSampler")?;
        let samplers: Vec<String> = ksampler.getattr("SAMPLERS")?.extract()?;
        let schedulers: Vec<String> = ksampler.getattr("SCHEDULERS")?.extract()?;
        Ok(Self {
            samplers,
            schedulers,
        })
    }
}

/// `comfy.samplers.sampler_object(name)`
pub fn sampler_object<'py>(py: Python<'py>, name: &str) -> Result<Bound<'py, PyAny>, Error> {
    let sampler = PyModule::import(py, "comfy.samplers")?.call_method1("sampler_object", (name,))?;
    Ok(sampler)
}

/// 是否为 FLOW 类型的模型 (flux schnell)
///
/// `model.model.model_type == comfy.model_base.ModelType.FLOW`
pub fn is_flow_model(py: Python<'_>, model: &Bound<'_, PyAny>) -> Result<bool, Error> {
    let flow = PyModule::import(py, "comfy.model_base")?
        .getattr("ModelType")?
        .getattr("FLOW")?;
    let model_type = model.getattr("model")?.getattr("model_type")?;
    Ok(model_type.eq(flow)?)
}
