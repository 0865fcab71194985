//! 工具
use pyo3::{
    types::{PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::core::node::NodeRegister;

mod model_name;
pub use model_name::ModelName;

/// 工具模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "utils")?;
    submodule.add_class::<ModelName>()?;
    Ok(submodule)
}

/// Utils node register
pub fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let nodes: Vec<NodeRegister> = vec![NodeRegister(
        "ModelName",
        py.get_type::<ModelName>(),
        "🐈‍⬛ Model Name",
    )];
    Ok(nodes)
}
