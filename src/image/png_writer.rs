//! 带文本块的 PNG 保存

use std::{fs::File, io::BufWriter, path::Path};

use encoding::{all::ISO_8859_1, EncoderTrap, Encoding};
use image::DynamicImage;
use png::{BitDepth, ColorType, Compression, Encoder};

use crate::error::Error;

/// PNG 文本块
#[derive(Debug, Clone)]
pub struct TextChunk {
    pub keyword: String,
    pub text: String,
}

impl TextChunk {
    pub fn new(keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            text: text.into(),
        }
    }
}

/// 文本能否无损编码为 ISO-8859-1
fn is_latin1(text: &str) -> bool {
    ISO_8859_1.encode(text, EncoderTrap::Strict).is_ok()
}

/// 保存 PNG 图片并嵌入文本块
///
/// Latin-1 文本写入 tEXt, 其余写入 iTXt (UTF-8)
pub fn save_png_with_text<P>(image: &DynamicImage, path: P, chunks: &[TextChunk]) -> Result<(), Error>
where
    P: AsRef<Path>,
{
    let (width, height) = (image.width(), image.height());
    let (color_type, data) = match image {
        DynamicImage::ImageLuma8(_) => (ColorType::Grayscale, image.as_bytes().to_vec()),
        DynamicImage::ImageLumaA8(_) => (ColorType::GrayscaleAlpha, image.as_bytes().to_vec()),
        DynamicImage::ImageRgb8(_) => (ColorType::Rgb, image.as_bytes().to_vec()),
        DynamicImage::ImageRgba8(_) => (ColorType::Rgba, image.as_bytes().to_vec()),
        // 其他类型转换为RGB
        _ => (ColorType::Rgb, image.to_rgb8().into_raw()),
    };

    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(Compression::Best);

    for chunk in chunks {
        if is_latin1(&chunk.text) {
            encoder.add_text_chunk(chunk.keyword.clone(), chunk.text.clone())?;
        } else {
            encoder.add_itxt_chunk(chunk.keyword.clone(), chunk.text.clone())?;
        }
    }

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&data)?;
    writer.finish()?;

    Ok(())
}
