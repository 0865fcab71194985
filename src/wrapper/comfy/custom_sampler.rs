//! comfy_extras.nodes_custom_sampler / comfy_extras.nodes_latent
//!
//! 宿主自带的自定义采样节点, 节点方法返回元组, 这里取出需要的元素

use pyo3::{
    types::{PyAnyMethods, PyModule},
    Bound, PyAny, Python,
};

use crate::{error::Error, sampling::Number};

/// 自定义采样相关节点实例
pub struct CustomSamplerNodes<'py> {
    module: Bound<'py, PyModule>,
    basic_scheduler: Bound<'py, PyAny>,
    basic_guider: Bound<'py, PyAny>,
    sampler_custom_advanced: Bound<'py, PyAny>,
    latent_batch: Bound<'py, PyAny>,
}

impl<'py> CustomSamplerNodes<'py> {
    pub fn new(py: Python<'py>) -> Result<Self, Error> {
        let module = PyModule::import(py, "comfy_extras.nodes_custom_sampler")?;
        let basic_scheduler = module.getattr("BasicScheduler")?.call0()?;
        let basic_guider = module.getattr("BasicGuider")?.call0()?;
        let sampler_custom_advanced = module.getattr("SamplerCustomAdvanced")?.call0()?;
        let latent_batch = PyModule::import(py, "comfy_extras.nodes_latent")?
            .getattr("LatentBatch")?
            .call0()?;

        Ok(Self {
            module,
            basic_scheduler,
            basic_guider,
            sampler_custom_advanced,
            latent_batch,
        })
    }

    /// `Noise_RandomNoise(seed)`
    pub fn random_noise(&self, seed: u64) -> Result<Bound<'py, PyAny>, Error> {
        let noise = self.module.getattr("Noise_RandomNoise")?.call1((seed,))?;
        Ok(noise)
    }

    /// `BasicScheduler.get_sigmas(model, scheduler, steps, denoise)[0]`
    pub fn get_sigmas(
        &self,
        model: &Bound<'py, PyAny>,
        scheduler: &str,
        steps: Number,
        denoise: Number,
    ) -> Result<Bound<'py, PyAny>, Error> {
        let sigmas = self
            .basic_scheduler
            .call_method1("get_sigmas", (model, scheduler, steps, denoise))?
            .get_item(0)?;
        Ok(sigmas)
    }

    /// `BasicGuider.get_guider(model, conditioning)[0]`
    pub fn get_guider(
        &self,
        model: &Bound<'py, PyAny>,
        conditioning: &Bound<'py, PyAny>,
    ) -> Result<Bound<'py, PyAny>, Error> {
        let guider = self
            .basic_guider
            .call_method1("get_guider", (model, conditioning))?
            .get_item(0)?;
        Ok(guider)
    }

    /// `SamplerCustomAdvanced.sample(noise, guider, sampler, sigmas, latent_image)[1]`
    ///
    /// 取第二个输出 (denoised_output)
    pub fn sample(
        &self,
        noise: &Bound<'py, PyAny>,
        guider: &Bound<'py, PyAny>,
        sampler: &Bound<'py, PyAny>,
        sigmas: &Bound<'py, PyAny>,
        latent_image: &Bound<'py, PyAny>,
    ) -> Result<Bound<'py, PyAny>, Error> {
        let latent = self
            .sampler_custom_advanced
            .call_method1("sample", (noise, guider, sampler, sigmas, latent_image))?
            .get_item(1)?;
        Ok(latent)
    }

    /// `LatentBatch.batch(samples1, samples2)[0]`
    pub fn latent_batch(
        &self,
        samples1: &Bound<'py, PyAny>,
        samples2: &Bound<'py, PyAny>,
    ) -> Result<Bound<'py, PyAny>, Error> {
        let latent = self
            .latent_batch
            .call_method1("batch", (samples1, samples2))?
            .get_item(0)?;
        Ok(latent)
    }
}
