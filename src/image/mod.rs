//! 图片
use pyo3::{
    types::{PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::core::node::NodeRegister;

pub mod metadata;
pub mod png_writer;

mod flux_prompt_saver;
pub use flux_prompt_saver::{save_images, FluxPromptSaver};

/// 图片模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "image")?;
    submodule.add_class::<FluxPromptSaver>()?;
    Ok(submodule)
}

/// Image node register
pub fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let nodes: Vec<NodeRegister> = vec![NodeRegister(
        "FluxPromptSaver",
        py.get_type::<FluxPromptSaver>(),
        "🐈‍⬛ Flux Prompt Saver",
    )];
    Ok(nodes)
}
