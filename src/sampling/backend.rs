//! 采样后端与扫描执行
//!
//! 扩散计算由宿主完成, 这里只负责按顺序组合参数并调用后端.
//! 嵌套顺序: conditioning → seed → max_shift → base_shift → guidance
//! → sampler → scheduler → steps → denoise

use std::time::Instant;

use log::info;

use crate::{
    error::Error,
    sampling::{ModelKind, ModelShift, Number, SamplerParams, SweepPlan},
};

/// 采样后端
///
/// 每个方法对应宿主的一个操作, 在对应的循环层级调用
pub trait SamplingBackend {
    type Conditioning;
    type Model;
    type Noise;
    type Guider;
    type Sampler;
    type Sigmas;
    type Latent;

    /// 按种子生成噪声
    fn noise(&mut self, seed: u64) -> Result<Self::Noise, Error>;

    /// 按 shift 参数给模型打补丁
    fn patch_model(&mut self, shift: &ModelShift) -> Result<Self::Model, Error>;

    /// 设置引导强度并创建引导器
    fn guider(
        &mut self,
        model: &Self::Model,
        conditioning: &Self::Conditioning,
        guidance: Number,
    ) -> Result<Self::Guider, Error>;

    /// 按名称创建采样器
    fn sampler(&mut self, name: &str) -> Result<Self::Sampler, Error>;

    /// 计算 sigma 序列
    fn sigmas(
        &mut self,
        model: &Self::Model,
        scheduler: &str,
        steps: Number,
        denoise: Number,
    ) -> Result<Self::Sigmas, Error>;

    /// 执行一次采样
    fn sample(
        &mut self,
        noise: &Self::Noise,
        guider: &Self::Guider,
        sampler: &Self::Sampler,
        sigmas: &Self::Sigmas,
    ) -> Result<Self::Latent, Error>;

    /// 合并 latent 批次
    fn batch(&mut self, batch: Self::Latent, latent: Self::Latent)
        -> Result<Self::Latent, Error>;

    /// 每完成一次采样调用一次
    fn progress(&mut self, _current: usize, _total: usize) -> Result<(), Error> {
        Ok(())
    }
}

/// 扫描结果
#[derive(Debug)]
pub struct SweepOutput<L> {
    pub latent: L,
    pub params: Vec<SamplerParams>,
}

/// 参数扫描
pub struct FluxSweep<'a> {
    plan: &'a SweepPlan,
    kind: ModelKind,
    width: u64,
    height: u64,
}

impl<'a> FluxSweep<'a> {
    pub fn new(plan: &'a SweepPlan, kind: ModelKind, width: u64, height: u64) -> Self {
        Self {
            plan,
            kind,
            width,
            height,
        }
    }

    /// 执行全部组合
    ///
    /// conditionings: (conditioning, 对应的提示词)
    pub fn run<B: SamplingBackend>(
        &self,
        backend: &mut B,
        conditionings: &[(B::Conditioning, Option<String>)],
    ) -> Result<SweepOutput<B::Latent>, Error> {
        let plan = self.plan;
        let total = plan.total(conditionings.len());
        let mut current = 0;

        let mut out_latent: Option<B::Latent> = None;
        let mut out_params = Vec::with_capacity(total);

        for (conditioning, prompt) in conditionings {
            for &seed in &plan.seeds {
                let noise = backend.noise(seed)?;
                for &max_shift in &plan.max_shifts {
                    for &base_shift in &plan.base_shifts {
                        let shift =
                            ModelShift::new(self.kind, max_shift, base_shift, self.width, self.height);
                        let model = backend.patch_model(&shift)?;
                        for &guidance in &plan.guidances {
                            let guider = backend.guider(&model, conditioning, guidance)?;
                            for sampler_name in &plan.samplers {
                                let sampler = backend.sampler(sampler_name)?;
                                for scheduler in &plan.schedulers {
                                    for &steps in &plan.steps {
                                        for &denoise in &plan.denoises {
                                            let sigmas =
                                                backend.sigmas(&model, scheduler, steps, denoise)?;

                                            current += 1;
                                            info!(
                                                "Sampling {current}/{total} with seed {seed}, sampler {sampler_name}, scheduler {scheduler}, steps {steps}, guidance {guidance}, max_shift {max_shift}, base_shift {base_shift}, denoise {denoise}"
                                            );

                                            let start = Instant::now();
                                            let latent =
                                                backend.sample(&noise, &guider, &sampler, &sigmas)?;
                                            let elapsed = start.elapsed().as_secs_f64();

                                            out_params.push(SamplerParams {
                                                time: elapsed,
                                                seed: Some(seed),
                                                width: self.width,
                                                height: self.height,
                                                sampler: sampler_name.clone(),
                                                scheduler: scheduler.clone(),
                                                steps,
                                                guidance: Some(guidance),
                                                max_shift: Some(max_shift),
                                                base_shift: Some(base_shift),
                                                denoise: Some(denoise),
                                                prompt: prompt.clone(),
                                                model_hash: None,
                                            });

                                            out_latent = Some(match out_latent.take() {
                                                None => latent,
                                                Some(batch) => backend.batch(batch, latent)?,
                                            });
                                            backend.progress(current, total)?;
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        let latent = out_latent.ok_or(Error::NoSamples)?;
        Ok(SweepOutput {
            latent,
            params: out_params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sampling::{SweepInputs, SweepPlan},
        wrapper::comfy::samplers::KSamplerNames,
    };

    /// 记录调用的后端, latent 为采样序号列表
    #[derive(Default)]
    struct RecordingBackend {
        calls: Vec<String>,
        patched: Vec<ModelShift>,
        samples: usize,
        progress: Vec<(usize, usize)>,
    }

    impl SamplingBackend for RecordingBackend {
        type Conditioning = &'static str;
        type Model = usize;
        type Noise = u64;
        type Guider = String;
        type Sampler = String;
        type Sigmas = String;
        type Latent = Vec<usize>;

        fn noise(&mut self, seed: u64) -> Result<u64, Error> {
            self.calls.push(format!("noise {seed}"));
            Ok(seed)
        }

        fn patch_model(&mut self, shift: &ModelShift) -> Result<usize, Error> {
            self.patched.push(*shift);
            Ok(self.patched.len())
        }

        fn guider(
            &mut self,
            model: &usize,
            conditioning: &&'static str,
            guidance: Number,
        ) -> Result<String, Error> {
            Ok(format!("{conditioning}@{guidance}/m{model}"))
        }

        fn sampler(&mut self, name: &str) -> Result<String, Error> {
            Ok(name.to_string())
        }

        fn sigmas(
            &mut self,
            _model: &usize,
            scheduler: &str,
            steps: Number,
            denoise: Number,
        ) -> Result<String, Error> {
            Ok(format!("{scheduler}:{steps}:{denoise}"))
        }

        fn sample(
            &mut self,
            noise: &u64,
            guider: &String,
            sampler: &String,
            sigmas: &String,
        ) -> Result<Vec<usize>, Error> {
            self.calls
                .push(format!("sample {noise} {guider} {sampler} {sigmas}"));
            self.samples += 1;
            Ok(vec![self.samples])
        }

        fn batch(&mut self, mut batch: Vec<usize>, latent: Vec<usize>) -> Result<Vec<usize>, Error> {
            batch.extend(latent);
            Ok(batch)
        }

        fn progress(&mut self, current: usize, total: usize) -> Result<(), Error> {
            self.progress.push((current, total));
            Ok(())
        }
    }

    fn names() -> KSamplerNames {
        KSamplerNames {
            samplers: vec!["euler".to_string(), "heun".to_string(), "ddim".to_string()],
            schedulers: vec!["normal".to_string(), "simple".to_string()],
        }
    }

    #[test]
    fn test_invocation_count_is_product() -> anyhow::Result<()> {
        let inputs = SweepInputs {
            sampler: "euler, heun",
            scheduler: "*",
            steps: "10, 20",
            guidance: "3.5",
            max_shift: "1.15",
            base_shift: "0.5, 1.0",
            denoise: "1.0, 0.8",
        };
        let plan = SweepPlan::new(&inputs, 1, ModelKind::Dev, &names());
        let mut backend = RecordingBackend::default();

        let output = FluxSweep::new(&plan, ModelKind::Dev, 1024, 1024)
            .run(&mut backend, &[("a", None), ("b", Some("b prompt".to_string()))])?;

        // 2 cond * 2 base * 2 sampler * 2 scheduler * 2 steps * 2 denoise
        assert_eq!(plan.total(2), 64);
        assert_eq!(backend.samples, 64);
        assert_eq!(output.params.len(), 64);
        assert_eq!(output.latent, (1..=64).collect::<Vec<_>>());
        // 每个 conditioning 对每个 base_shift 打一次补丁
        assert_eq!(backend.patched.len(), 4);
        assert_eq!(backend.progress.last(), Some(&(64, 64)));

        assert_eq!(output.params[0].prompt, None);
        assert_eq!(output.params[63].prompt.as_deref(), Some("b prompt"));
        Ok(())
    }

    #[test]
    fn test_iteration_order() -> anyhow::Result<()> {
        let inputs = SweepInputs {
            sampler: "euler, heun",
            scheduler: "simple",
            steps: "10, 20",
            ..Default::default()
        };
        let plan = SweepPlan::new(&inputs, 5, ModelKind::Dev, &names());
        let mut backend = RecordingBackend::default();

        let output = FluxSweep::new(&plan, ModelKind::Dev, 512, 768).run(&mut backend, &[("c", None)])?;

        let order: Vec<(String, Number)> = output
            .params
            .iter()
            .map(|p| (p.sampler.clone(), p.steps))
            .collect();
        assert_eq!(
            order,
            vec![
                ("euler".to_string(), Number::Int(10)),
                ("euler".to_string(), Number::Int(20)),
                ("heun".to_string(), Number::Int(10)),
                ("heun".to_string(), Number::Int(20)),
            ]
        );
        assert_eq!(backend.calls[0], "noise 5");
        assert_eq!(backend.calls[1], "sample 5 c@3.5/m1 euler simple:10:1");

        let first = &output.params[0];
        assert_eq!((first.width, first.height), (512, 768));
        assert_eq!(first.seed, Some(5));
        assert_eq!(first.max_shift, Some(Number::Float(1.15)));
        Ok(())
    }

    #[test]
    fn test_schnell_uses_aura_flow_shift() -> anyhow::Result<()> {
        let inputs = SweepInputs {
            base_shift: "1.0, 2.0",
            ..Default::default()
        };
        let plan = SweepPlan::new(&inputs, 0, ModelKind::Schnell, &names());
        let mut backend = RecordingBackend::default();

        FluxSweep::new(&plan, ModelKind::Schnell, 1024, 1024).run(&mut backend, &[("c", None)])?;

        assert_eq!(
            backend.patched,
            vec![
                ModelShift::AuraFlow {
                    shift: Number::Int(1)
                },
                ModelShift::AuraFlow {
                    shift: Number::Int(2)
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_no_conditioning_is_error() -> anyhow::Result<()> {
        let plan = SweepPlan::new(&SweepInputs::default(), 0, ModelKind::Dev, &names());
        let mut backend = RecordingBackend::default();

        let result = FluxSweep::new(&plan, ModelKind::Dev, 64, 64).run(&mut backend, &[]);
        assert!(matches!(result, Err(Error::NoSamples)));
        assert_eq!(backend.samples, 0);
        Ok(())
    }
}
