//! 错误处理

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // 标准库错误处理
    #[error("io error, {0}")]
    Io(std::io::Error),

    #[error("the input list is empty, {0}")]
    InputListEmpty(String),
    #[error("no samples were generated")]
    NoSamples,

    #[error("py error, {0}")]
    PyErr(#[from] pyo3::PyErr),
    #[error("pythonize error, {0}")]
    PythonizeError(#[from] pythonize::PythonizeError),
    #[error("py downcast error, {0}")]
    PyDowncastError(String),

    #[error("tensor error, {0}")]
    TensorErr(#[from] candle_core::Error),

    #[error("creating image buffer error")]
    ImageBuffer,
    #[error("invalid tensor shape, {0}")]
    InvalidTensorShape(String),
    #[error("unsupported image channels, {0}")]
    UnsupportedChannels(usize),
    #[error("png encoding error, {0}")]
    PngEncoding(#[from] png::EncodingError),

    #[error("regex error, {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid parameter, {0}")]
    InvalidParameter(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
