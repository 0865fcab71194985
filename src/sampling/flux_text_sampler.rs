//! Flux 参数扫描采样

use log::info;
use pyo3::{
    pyclass, pymethods,
    types::{PyAnyMethods, PyDict, PyType},
    Bound, Py, PyAny, PyResult, Python,
};

use crate::{
    core::{
        category::CATEGORY_SAMPLING,
        node_base::{InputSpec, InputType},
    },
    error::Error,
    sampling::{
        backend::{FluxSweep, SamplingBackend},
        params::params_to_py,
        sweep::{DEFAULT_DENOISE, DEFAULT_GUIDANCE, DEFAULT_SAMPLER, DEFAULT_SCHEDULER, DEFAULT_STEPS},
        ModelKind, ModelShift, Number, SweepInputs, SweepPlan,
    },
    wrapper::{
        comfy::{
            custom_sampler::CustomSamplerNodes,
            model_sampling::ModelSampling,
            node_helpers::{conditioning_set_guidance, split_conditioning},
            samplers::{is_flow_model, sampler_object, KSamplerNames},
            utils::ProgressBar,
        },
        comfyui::{
            types::{NODE_LATENT, NODE_INT_MAX, NODE_SAMPLER_PARAMS},
            PromptServer,
        },
    },
};

/// latent 与像素尺寸的比例
const LATENT_SCALE: u64 = 8;

/// 宿主采样后端
///
/// 所有对象均为宿主的 Python 对象
struct ComfyBackend<'py> {
    py: Python<'py>,
    nodes: CustomSamplerNodes<'py>,
    model_sampling: ModelSampling<'py>,
    model: Bound<'py, PyAny>,
    latent_image: Bound<'py, PyAny>,
    pbar: Option<ProgressBar<'py>>,
}

impl<'py> SamplingBackend for ComfyBackend<'py> {
    type Conditioning = Bound<'py, PyAny>;
    type Model = Bound<'py, PyAny>;
    type Noise = Bound<'py, PyAny>;
    type Guider = Bound<'py, PyAny>;
    type Sampler = Bound<'py, PyAny>;
    type Sigmas = Bound<'py, PyAny>;
    type Latent = Bound<'py, PyAny>;

    fn noise(&mut self, seed: u64) -> Result<Self::Noise, Error> {
        self.nodes.random_noise(seed)
    }

    fn patch_model(&mut self, shift: &ModelShift) -> Result<Self::Model, Error> {
        self.model_sampling.patch(&self.model, shift)
    }

    fn guider(
        &mut self,
        model: &Self::Model,
        conditioning: &Self::Conditioning,
        guidance: Number,
    ) -> Result<Self::Guider, Error> {
        let conditioning = conditioning_set_guidance(self.py, conditioning, guidance)?;
        self.nodes.get_guider(model, conditioning.as_any())
    }

    fn sampler(&mut self, name: &str) -> Result<Self::Sampler, Error> {
        sampler_object(self.py, name)
    }

    fn sigmas(
        &mut self,
        model: &Self::Model,
        scheduler: &str,
        steps: Number,
        denoise: Number,
    ) -> Result<Self::Sigmas, Error> {
        self.nodes.get_sigmas(model, scheduler, steps, denoise)
    }

    fn sample(
        &mut self,
        noise: &Self::Noise,
        guider: &Self::Guider,
        sampler: &Self::Sampler,
        sigmas: &Self::Sigmas,
    ) -> Result<Self::Latent, Error> {
        self.nodes
            .sample(noise, guider, sampler, sigmas, &self.latent_image)
    }

    fn batch(&mut self, batch: Self::Latent, latent: Self::Latent) -> Result<Self::Latent, Error> {
        self.nodes.latent_batch(&batch, &latent)
    }

    fn progress(&mut self, _current: usize, _total: usize) -> Result<(), Error> {
        if let Some(pbar) = &self.pbar {
            pbar.update(1)?;
        }
        Ok(())
    }
}

/// Flux 参数扫描采样
///
/// 文本参数支持逗号或换行分隔的多个值, 对所有组合依次采样
#[pyclass(subclass)]
pub struct FluxTextSampler {}

impl PromptServer for FluxTextSampler {}

#[pymethods]
impl FluxTextSampler {
    #[new]
    fn new() -> Self {
        Self {}
    }

    // 返回参数类型
    #[classattr]
    #[pyo3(name = "RETURN_TYPES")]
    fn return_types() -> (&'static str, &'static str) {
        (NODE_LATENT, NODE_SAMPLER_PARAMS)
    }

    // 返回参数名称
    #[classattr]
    #[pyo3(name = "RETURN_NAMES")]
    fn return_names() -> (&'static str, &'static str) {
        ("latent", "params")
    }

    // 节点分类
    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_SAMPLING;

    // 节点描述, 可选
    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Sample every combination of seed, shift, guidance, sampler, scheduler, steps and denoise."
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
                .with_required("model", InputType::model())
                .with_required("conditioning", InputType::conditioning())
                .with_required("latent_image", InputType::latent())
                .with_required("seed", InputType::int().default(0u64).min(0u64).max(NODE_INT_MAX))
                .with_required("sampler", text_input(DEFAULT_SAMPLER))
                .with_required("scheduler", text_input(DEFAULT_SCHEDULER))
                .with_required("steps", text_input(DEFAULT_STEPS))
                .with_required("guidance", text_input(DEFAULT_GUIDANCE))
                .with_required("max_shift", text_input(""))
                .with_required("base_shift", text_input(""))
                .with_required("denoise", text_input(DEFAULT_DENOISE))
                .build(py)
        })
    }

    #[allow(clippy::too_many_arguments)]
    #[pyo3(name = "execute")]
    fn execute<'py>(
        &mut self,
        py: Python<'py>,
        model: Bound<'py, PyAny>,
        conditioning: Bound<'py, PyAny>,
        latent_image: Bound<'py, PyAny>,
        seed: u64,
        sampler: &str,
        scheduler: &str,
        steps: &str,
        guidance: &str,
        max_shift: &str,
        base_shift: &str,
        denoise: &str,
    ) -> PyResult<(Bound<'py, PyAny>, Bound<'py, PyAny>)> {
        let inputs = SweepInputs {
            sampler,
            scheduler,
            steps,
            guidance,
            max_shift,
            base_shift,
            denoise,
        };

        self.sample(py, model, &conditioning, latent_image, seed, &inputs)
            .map_err(|e| self.raise_error(py, "FluxTextSampler", e))
    }
}

impl FluxTextSampler {
    fn sample<'py>(
        &self,
        py: Python<'py>,
        model: Bound<'py, PyAny>,
        conditioning: &Bound<'py, PyAny>,
        latent_image: Bound<'py, PyAny>,
        seed: u64,
        inputs: &SweepInputs,
    ) -> Result<(Bound<'py, PyAny>, Bound<'py, PyAny>), Error> {
        let kind = if is_flow_model(py, &model)? {
            ModelKind::Schnell
        } else {
            ModelKind::Dev
        };
        let (width, height) = latent_size(&latent_image)?;

        let names = KSamplerNames::load(py)?;
        let plan = SweepPlan::new(inputs, seed, kind, &names);
        let conditionings = split_conditioning(conditioning)?;

        let total = plan.total(conditionings.len());
        info!("FluxTextSampler: {kind} model, {width}x{height}, {total} samples");

        let pbar = if total > 1 {
            Some(ProgressBar::new(py, total)?)
        } else {
            None
        };

        let mut backend = ComfyBackend {
            py,
            nodes: CustomSamplerNodes::new(py)?,
            model_sampling: ModelSampling::new(py, kind)?,
            model,
            latent_image,
            pbar,
        };

        let output = FluxSweep::new(&plan, kind, width, height).run(&mut backend, &conditionings)?;
        let params = params_to_py(py, &output.params)?;

        Ok((output.latent, params))
    }
}

/// 单行文本参数
fn text_input(default: &str) -> InputType {
    InputType::string()
        .default(default)
        .multiline(false)
        .dynamic_prompts(false)
}

/// 由 `latent["samples"].shape` 计算像素尺寸 (width, height)
fn latent_size(latent_image: &Bound<'_, PyAny>) -> Result<(u64, u64), Error> {
    let shape: Vec<u64> = latent_image
        .get_item("samples")?
        .getattr("shape")?
        .extract()?;
    if shape.len() < 4 {
        return Err(Error::InvalidParameter(format!(
            "latent samples shape {shape:?}"
        )));
    }
    Ok((shape[3] * LATENT_SCALE, shape[2] * LATENT_SCALE))
}
