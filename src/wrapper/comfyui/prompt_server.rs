//! Prompt Server

use log::error;
use pyo3::{
    exceptions::PyRuntimeError,
    types::{PyAnyMethods, PyDict, PyModule},
    PyErr, PyResult, PyTypeInfo, Python,
};

use crate::error::Error;

/// 前端消息事件名称
const EVENT_NAME: &str = "fluxsampler";

/// comfyui PromptServer wrapper
pub trait PromptServer: PyTypeInfo {
    /// 发送日志信息到ComfyUI
    ///
    /// 当节点执行出现异常时通知前端
    fn send_error(&self, py: Python, error_type: String, message: String) -> PyResult<()> {
        let server = PyModule::import(py, "server")?
            .getattr("PromptServer")?
            .getattr("instance")?;

        let error_data = PyDict::new(py);
        error_data.set_item("type", &error_type)?;
        error_data.set_item("node", self.get_class_name(py)?)?;
        error_data.set_item("message", message)?;

        server
            .getattr("send_sync")?
            .call1((EVENT_NAME, error_data))?;

        Ok(())
    }

    /// Class 名称
    fn get_class_name(&self, py: Python) -> PyResult<String> {
        Self::type_object(py)
            .getattr("__name__")?
            .extract::<String>()
    }

    /// 将节点内部错误转换为 Python 异常
    ///
    /// 记录日志, 尽力通知前端, 然后以 RuntimeError 抛给宿主
    fn raise_error(&self, py: Python, node: &str, e: Error) -> PyErr {
        error!("{node} error, {e}");
        if let Err(send_err) = self.send_error(py, node.to_string(), e.to_string()) {
            error!("send error failed, {send_err}");
        }
        PyErr::new::<PyRuntimeError, _>(e.to_string())
    }
}
