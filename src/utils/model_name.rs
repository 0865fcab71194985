//! 模型名称选择

use pyo3::{
    pyclass, pymethods,
    types::{PyDict, PyType},
    Bound, Py, PyResult, Python,
};

use crate::{
    core::{
        category::CATEGORY_UTILS,
        node_base::{InputSpec, InputType},
    },
    wrapper::comfy::folder_paths::FolderPaths,
    wrapper::comfyui::{types::NODE_STRING, PromptServer},
};

/// 搜索模型文件的文件夹
const MODEL_FOLDERS: [&str; 4] = ["checkpoints", "models", "unet", "diffusion_models"];

/// 模型名称选择
///
/// 输出所选模型的文件名, 用于写入图像元数据
#[pyclass(subclass)]
pub struct ModelName {}

impl PromptServer for ModelName {}

#[pymethods]
impl ModelName {
    #[new]
    fn new() -> Self {
        Self {}
    }

    // 返回参数类型
    #[classattr]
    #[pyo3(name = "RETURN_TYPES")]
    fn return_types() -> (&'static str,) {
        (NODE_STRING,)
    }

    // 返回参数名称
    #[classattr]
    #[pyo3(name = "RETURN_NAMES")]
    fn return_names() -> (&'static str,) {
        ("model_name",)
    }

    // 节点分类
    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_UTILS;

    // 调研方法函数名称
    #[classattr]
    #[pyo3(name = "FUNCTION")]
    const FUNCTION: &'static str = "execute";

    #[classmethod]
    #[pyo3(name = "INPUT_TYPES")]
    fn input_types(_cls: &Bound<'_, PyType>) -> PyResult<Py<PyDict>> {
        Python::with_gil(|py| {
            let model_names = match FolderPaths::new(py) {
                Ok(folder_paths) => folder_paths.merged_filename_list(&MODEL_FOLDERS),
                Err(e) => return Err(ModelName {}.raise_error(py, "ModelName", e)),
            };

            InputSpec::new()
                .with_required("model_name", InputType::list(model_names))
                .build(py)
        })
    }

    #[pyo3(name = "execute")]
    fn execute(&self, model_name: String) -> PyResult<(String,)> {
        Ok((model_name,))
    }
}
