//! 采样
use pyo3::{
    types::{PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::core::node::NodeRegister;

mod number;
pub use number::Number;

pub mod sweep;
pub use sweep::{ModelKind, ModelShift, Selector, SweepInputs, SweepPlan};

pub mod params;
pub use params::SamplerParams;

pub mod backend;
pub use backend::{FluxSweep, SamplingBackend, SweepOutput};

mod flux_text_sampler;
pub use flux_text_sampler::FluxTextSampler;

/// 采样模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "sampling")?;
    submodule.add_class::<FluxTextSampler>()?;
    Ok(submodule)
}

/// Sampling node register
pub fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let nodes: Vec<NodeRegister> = vec![NodeRegister(
        "FluxTextSampler",
        py.get_type::<FluxTextSampler>(),
        "🐈‍⬛ Flux Text Sampler",
    )];
    Ok(nodes)
}
