//! tensor 转换为图像

use candle_core::{DType, Tensor};
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::error::Error;

/// 将批量张量转换为图像列表
///
/// tensor: BHWC, 取值范围 0-1
pub fn tensor_to_images(tensor: &Tensor) -> Result<Vec<DynamicImage>, Error> {
    let (batch, _, _, _) = tensor.dims4()?;
    if batch == 0 {
        return Ok(Vec::new());
    }

    // BHWC -> Vec<1HWC>
    let tensors = tensor.chunk(batch, 0)?;

    let mut images = Vec::with_capacity(batch);
    for tensor in tensors.iter() {
        images.push(tensor_to_image(tensor)?);
    }
    Ok(images)
}

/// 将张量转换为图像
///
/// tensor: HWC/1HWC
pub fn tensor_to_image(tensor: &Tensor) -> Result<DynamicImage, Error> {
    let (height, width, channels) = match tensor.dims() {
        [h, w, c] => (*h, *w, *c),
        [1, h, w, c] => (*h, *w, *c),
        dims => {
            return Err(Error::InvalidTensorShape(format!("{dims:?}")));
        }
    };

    // 缩放 + clip, 截断为 u8
    let data: Vec<u8> = tensor
        .to_dtype(DType::F32)?
        .flatten_all()?
        .to_vec1::<f32>()?
        .into_iter()
        .map(|x| (255.0 * x).clamp(0.0, 255.0) as u8)
        .collect();

    let (width, height) = (width as u32, height as u32);
    let image = match channels {
        1 => DynamicImage::ImageLuma8(
            GrayImage::from_raw(width, height, data).ok_or(Error::ImageBuffer)?,
        ),
        3 => DynamicImage::ImageRgb8(
            RgbImage::from_raw(width, height, data).ok_or(Error::ImageBuffer)?,
        ),
        4 => DynamicImage::ImageRgba8(
            RgbaImage::from_raw(width, height, data).ok_or(Error::ImageBuffer)?,
        ),
        c => return Err(Error::UnsupportedChannels(c)),
    };
    Ok(image)
}
