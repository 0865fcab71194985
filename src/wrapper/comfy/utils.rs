//! comfy.utils

use pyo3::{
    types::{PyAnyMethods, PyModule},
    Bound, PyAny, Python,
};

use crate::error::Error;

/// 宿主进度条 `comfy.utils.ProgressBar`
pub struct ProgressBar<'py> {
    pbar: Bound<'py, PyAny>,
}

impl<'py> ProgressBar<'py> {
    pub fn new(py: Python<'py>, total: usize) -> Result<Self, Error> {
        let pbar = PyModule::import(py, "comfy.utils")?.call_method1("ProgressBar", (total,))?;
        Ok(Self { pbar })
    }

    /// 进度加一
    pub fn update(&self, value: usize) -> Result<(), Error> {
        self.pbar.call_method1("update", (value,))?;
        Ok(())
    }
}
