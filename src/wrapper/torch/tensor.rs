//! torch.Tensor 与 candle Tensor 的转换
//! 依赖:
//! - python: torch

use std::marker::PhantomData;

use candle_core::{Device, Tensor, WithDType};
use numpy::{Element, PyArrayDyn, PyArrayMethods, PyUntypedArrayMethods};
use pyo3::{types::PyAnyMethods, Bound, PyAny};

use crate::error::Error;

pub struct TensorWrapper<T>
where
    T: Element + WithDType,
{
    tensor: Tensor,
    _marker: PhantomData<T>,
}

impl<T> TensorWrapper<T>
where
    T: Element + WithDType,
{
    /// 从 Python torch.Tensor 创建
    pub fn new(py_any: &Bound<'_, PyAny>, device: &Device) -> Result<Self, Error> {
        let tensor = Self::torch_to_candle(py_any, device)?;

        Ok(Self {
            tensor,
            _marker: PhantomData,
        })
    }

    pub fn into_tensor(self) -> Tensor {
        self.tensor
    }

    /// 从 Python torch.Tensor 转为 Rust candle_core::Tensor
    ///
    /// 张量可能在 GPU 上, 先拷贝到 CPU 并转为连续内存再取 numpy 数组
    fn torch_to_candle(torch_tensor: &Bound<'_, PyAny>, device: &Device) -> Result<Tensor, Error> {
        let np = torch_tensor
            .call_method0("detach")?
            .call_method0("cpu")?
            .call_method0("contiguous")?
            .call_method0("numpy")?;

        let arr = np
            .downcast::<PyArrayDyn<T>>()
            .map_err(|e| Error::PyDowncastError(e.to_string()))?;

        let shape = arr.shape().to_vec();
        let data = arr.to_vec().map_err(|e| Error::PyDowncastError(e.to_string()))?;

        let tensor = Tensor::from_vec(data, shape, device)?;
        Ok(tensor)
    }
}
