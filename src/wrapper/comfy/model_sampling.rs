//! comfy_extras.nodes_model_advanced
//!
//! ModelSamplingFlux / ModelSamplingAuraFlow 模型补丁

use pyo3::{
    types::{PyAnyMethods, PyModule},
    Bound, PyAny, Python,
};

use crate::{
    error::Error,
    sampling::{ModelKind, ModelShift},
};

/// 模型采样补丁节点
pub struct ModelSampling<'py> {
    node: Bound<'py, PyAny>,
}

impl<'py> ModelSampling<'py> {
    /// dev 模型使用 ModelSamplingFlux, schnell 模型使用 ModelSamplingAuraFlow
    pub fn new(py: Python<'py>, kind: ModelKind) -> Result<Self, Error> {
        let class_name = match kind {
            ModelKind::Dev => "ModelSamplingFlux",
            ModelKind::Schnell => "ModelSamplingAuraFlow",
        };
        let node = PyModule::import(py, "comfy_extras.nodes_model_advanced")?
            .getattr(class_name)?
            .call0()?;
        Ok(Self { node })
    }

    /// 返回打过补丁的模型副本
    pub fn patch(
        &self,
        model: &Bound<'py, PyAny>,
        shift: &ModelShift,
    ) -> Result<Bound<'py, PyAny>, Error> {
        let patched = match *shift {
            ModelShift::Flux {
                max_shift,
                base_shift,
                width,
                height,
            } => self.node.call_method1(
                "patch",
                (model, max_shift, base_shift, width, height),
            )?,
            ModelShift::AuraFlow { shift } => {
                self.node.call_method1("patch_aura", (model, shift))?
            }
        };
        Ok(patched.get_item(0)?)
    }
}
