//! 保存图像与采样参数
//!
//! 图像保存为 PNG, 采样参数写入 `parameters` 文本块

use std::{
    fs,
    path::{Path, PathBuf},
};

use candle_core::Device;
use image::DynamicImage;
use log::info;
use pyo3::{
    pyclass, pymethods,
    types::{PyDict, PyDictMethods, PyList, PyListMethods, PyTuple, PyType},
    Bound, Py, PyAny, PyResult, Python,
};

use crate::{
    core::{
        category::CATEGORY_IMAGE,
        node_base::{InputSpec, InputType},
        utils::{
            filename::{replace_date_placeholders, unique_file_path},
            image::tensor_to_images,
        },
    },
    error::Error,
    image::{
        metadata::{create_metadata_string, PromptInfo},
        png_writer::{save_png_with_text, TextChunk},
    },
    sampling::{params::params_from_py, SamplerParams},
    wrapper::{
        comfy::folder_paths::FolderPaths,
        comfyui::PromptServer,
        torch::tensor::TensorWrapper,
    },
};

/// 默认子目录
pub const DEFAULT_FILENAME_PREFIX: &str = "%date:yyyy-MM-dd%";
/// 默认文件名
pub const DEFAULT_FILENAME: &str = "FLUX_%date:HHmmss%";
/// 元数据文本块关键字
const PARAMETERS_KEYWORD: &str = "parameters";
const IMAGE_EXTENSION: &str = "png";

/// 保存图像与采样参数
#[pyclass(subclass)]
pub struct FluxPromptSaver {
    device: Device,
}

impl PromptServer for FluxPromptSaver {}

#[pymethods]
impl FluxPromptSaver {
    #[new]
    fn new() -> Self {
        Self {
            device: Device::Cpu,
        }
    }

    // 输出节点, 可选
    #[classattr]
    #[pyo3(name = "OUTPUT_NODE")]
    fn output_node() -> bool {
        true
    }

    // 返回参数类型
    #[classattr]
    #[pyo3(name = "RETURN_TYPES")]
    fn return_types(py: Python<'_>) -> Bound<'_, PyTuple> {
        PyTuple::empty(py)
    }

    // 节点分类
    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_IMAGE;

    // 节点描述, 可选
    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Save images as PNG with the prompt and sampler parameters embedded."
    }

    // 调研方法函数名称
    #[classattr]
    #[pyo3(name = "FUNCTION")]
    const FUNCTION: &'static str = "execute";

    #[classmethod]
    #[pyo3(name = "INPUT_TYPES")]
    fn input_types(_cls: &Bound<'_, PyType>) -> PyResult<Py<PyDict>> {
        Python::with_gil(|py| {
            InputSpec::new()
                .with_required("images", InputType::image())
                .with_required("params", InputType::sampler_params())
                .with_required("positive", InputType::string().force_input(true))
                .with_required("model_name", InputType::string().force_input(true))
                .with_required(
                    "filename_prefix",
                    InputType::string()
                        .default(DEFAULT_FILENAME_PREFIX)
                        .tooltip("Subfolder in the output directory, supports %date:yyyy-MM-dd%"),
                )
                .with_required(
                    "filename",
                    InputType::string()
                        .default(DEFAULT_FILENAME)
                        .tooltip("File name without extension, supports %date:HHmmss%"),
                )
                .with_optional("negative", InputType::string().force_input(true))
                .build(py)
        })
    }

    #[allow(clippy::too_many_arguments)]
    #[pyo3(
        name = "execute",
        signature = (images, params, positive, model_name, filename_prefix, filename, negative=None)
    )]
    fn execute<'py>(
        &mut self,
        py: Python<'py>,
        images: Bound<'py, PyAny>,
        params: Bound<'py, PyAny>,
        positive: &str,
        model_name: &str,
        filename_prefix: &str,
        filename: &str,
        negative: Option<&str>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let prompt = PromptInfo {
            positive,
            negative,
            model_name,
        };

        self.save(py, &images, &params, &prompt, filename_prefix, filename)
            .map_err(|e| self.raise_error(py, "FluxPromptSaver", e))
    }
}

impl FluxPromptSaver {
    fn save<'py>(
        &self,
        py: Python<'py>,
        images: &Bound<'py, PyAny>,
        params: &Bound<'py, PyAny>,
        prompt: &PromptInfo,
        filename_prefix: &str,
        filename: &str,
    ) -> Result<Bound<'py, PyDict>, Error> {
        let params = params_from_py(params)?;

        let tensor = TensorWrapper::<f32>::new(images, &self.device)?.into_tensor();
        let images = tensor_to_images(&tensor)?;

        let subfolder = replace_date_placeholders(filename_prefix)?;
        let filename = replace_date_placeholders(filename)?;
        let output_dir = FolderPaths::new(py)?.output_directory()?.join(&subfolder);

        let paths = save_images(&images, &params, prompt, &output_dir, &filename)?;
        info!("FluxPromptSaver: saved {} images to {}", paths.len(), output_dir.display());

        node_result(py, &paths, &subfolder)
    }
}

/// 保存全部图像, 返回保存路径
///
/// 第 i 张图像使用第 i 条参数记录, 不足时使用第一条
pub fn save_images(
    images: &[DynamicImage],
    params: &[SamplerParams],
    prompt: &PromptInfo,
    output_dir: &Path,
    filename: &str,
) -> Result<Vec<PathBuf>, Error> {
    if images.is_empty() {
        return Ok(Vec::new());
    }

    let first = params
        .first()
        .ok_or_else(|| Error::InputListEmpty("params".to_string()))?;

    fs::create_dir_all(output_dir)?;

    let mut paths = Vec::with_capacity(images.len());
    for (i, image) in images.iter().enumerate() {
        let record = params.get(i).unwrap_or(first);

        // 批量文本编码时使用记录中的提示词
        let positive = match record.prompt.as_deref() {
            Some(text) if prompt.positive.is_empty() => text,
            _ => prompt.positive,
        };
        let metadata = create_metadata_string(
            record,
            &PromptInfo {
                positive,
                ..prompt.clone()
            },
        );

        let path = unique_file_path(output_dir, filename, IMAGE_EXTENSION);
        save_png_with_text(image, &path, &[TextChunk::new(PARAMETERS_KEYWORD, metadata)])?;
        paths.push(path);
    }

    Ok(paths)
}

/// 组合为前端需要的数据结构
///
/// `{"ui": {"images": [{"filename", "subfolder", "type"}]}}`
fn node_result<'py>(
    py: Python<'py>,
    paths: &[PathBuf],
    subfolder: &str,
) -> Result<Bound<'py, PyDict>, Error> {
    let images = PyList::empty(py);
    for path in paths {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let item = PyDict::new(py);
        item.set_item("filename", filename)?;
        item.set_item("subfolder", subfolder)?;
        item.set_item("type", "output")?;
        images.append(item)?;
    }

    let ui = PyDict::new(py);
    ui.set_item("images", images)?;

    let result = PyDict::new(py);
    result.set_item("ui", ui)?;
    Ok(result)
}
