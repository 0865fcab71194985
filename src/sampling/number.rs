//! 扫描参数数值
//!
//! 与文本解析结果保持一致: 整数值的浮点数记为整数, 其余记为浮点数

use std::{convert::Infallible, fmt};

use pyo3::{Bound, IntoPyObject, PyAny, Python};
use serde::{Deserialize, Serialize};

/// 扫描参数数值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// 整数值且在 i64 范围内时转换为整数
    pub fn from_f64(value: f64) -> Self {
        // i64::MAX as f64 为 2^63, 需要严格小于
        if value.is_finite()
            && value.fract() == 0.0
            && value >= i64::MIN as f64
            && value < i64::MAX as f64
        {
            Number::Int(value as i64)
        } else {
            Number::Float(value)
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// 与 Python 的 str() 输出一致, 浮点数至少保留一位小数
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(v) => write!(f, "{v}"),
            Number::Float(v) if v.is_nan() => write!(f, "nan"),
            Number::Float(v) if v.is_infinite() => {
                write!(f, "{}", if v > 0.0 { "inf" } else { "-inf" })
            }
            Number::Float(v) if v.fract() == 0.0 => write!(f, "{v:.1}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

impl<'py> IntoPyObject<'py> for Number {
    type Target = PyAny;
    type Output = Bound<'py, PyAny>;
    type Error = Infallible;

    fn into_pyobject(self, py: Python<'py>) -> Result<Self::Output, Self::Error> {
        match self {
            Number::Int(v) => Ok(v.into_pyobject(py)?.into_any()),
            Number::Float(v) => Ok(v.into_pyobject(py)?.into_any()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f64() -> anyhow::Result<()> {
        assert_eq!(Number::from_f64(20.0), Number::Int(20));
        assert_eq!(Number::from_f64(-3.0), Number::Int(-3));
        assert_eq!(Number::from_f64(1.15), Number::Float(1.15));
        assert!(matches!(Number::from_f64(f64::INFINITY), Number::Float(_)));
        assert!(matches!(Number::from_f64(1e30), Number::Float(_)));
        Ok(())
    }

    #[test]
    fn test_display() -> anyhow::Result<()> {
        assert_eq!(Number::Int(20).to_string(), "20");
        assert_eq!(Number::Float(3.5).to_string(), "3.5");
        assert_eq!(Number::Float(1.0).to_string(), "1.0");
        assert_eq!(Number::Float(f64::NEG_INFINITY).to_string(), "-inf");
        Ok(())
    }

    #[test]
    fn test_serde_untagged() -> anyhow::Result<()> {
        let values: Vec<Number> = serde_json::from_str("[20, 3.5, 1.0]")?;
        assert_eq!(
            values,
            vec![Number::Int(20), Number::Float(3.5), Number::Float(1.0)]
        );
        assert_eq!(serde_json::to_string(&Number::Int(4))?, "4");
        Ok(())
    }
}
