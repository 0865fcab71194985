//! node_helpers
//!
//! conditioning 为 `[[tensor, {options}], ...]` 结构

use pyo3::{
    types::{PyAnyMethods, PyDict, PyDictMethods, PyList, PyTuple},
    Bound, PyAny, Python,
};

use crate::{error::Error, sampling::Number};

/// conditioning 中 flux 引导强度的键名
///
/// 宿主 FluxGuidance 节点与 flux 模型读取的是 `guidance`, 不是 `guidance_scale`
const GUIDANCE_KEY: &str = "guidance";

/// 复制 conditioning 并设置引导强度
///
/// 每一项的 options 字典都会被浅拷贝, 原 conditioning 不受影响
pub fn conditioning_set_guidance<'py>(
    py: Python<'py>,
    conditioning: &Bound<'py, PyAny>,
    guidance: Number,
) -> Result<Bound<'py, PyList>, Error> {
    let mut items = Vec::new();
    for item in conditioning.try_iter()? {
        let item = item?;
        let tensor = item.get_item(0)?;
        let options = item
            .get_item(1)?
            .downcast::<PyDict>()
            .map_err(|e| Error::PyDowncastError(e.to_string()))?
            .copy()?;
        options.set_item(GUIDANCE_KEY, guidance)?;

        items.push(PyTuple::new(py, [tensor, options.into_any()])?);
    }

    Ok(PyList::new(py, items)?)
}

/// 采样节点的 conditioning 输入
///
/// 普通 conditioning 只有一项, 批量文本编码节点输出
/// `{"encoded": [conditioning, ...], "text": [prompt, ...]}`
pub fn split_conditioning<'py>(
    conditioning: &Bound<'py, PyAny>,
) -> Result<Vec<(Bound<'py, PyAny>, Option<String>)>, Error> {
    let Ok(dict) = conditioning.downcast::<PyDict>() else {
        return Ok(vec![(conditioning.clone(), None)]);
    };
    let Some(encoded) = dict.get_item("encoded")? else {
        return Ok(vec![(conditioning.clone(), None)]);
    };

    let texts: Vec<String> = match dict.get_item("text")? {
        Some(text) if !text.is_none() => text.extract()?,
        _ => Vec::new(),
    };

    let mut results = Vec::new();
    for (i, item) in encoded.try_iter()?.enumerate() {
        results.push((item?, texts.get(i).cloned()));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guidance_key_matches_flux_guidance() -> anyhow::Result<()> {
        assert_eq!(GUIDANCE_KEY, "guidance");
        Ok(())
    }
}
