use crate::utils::error::{AgriError, Result};
use image::imageops::FilterType;

pub const DEFAULT_IMAGE_SIZE: u32 = 224;

/// HWC 排列的 RGB 影像，像素值已縮放到 [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl ImageTensor {
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let offset = pixel_offset(self.width, x, y);
        [self.data[offset], self.data[offset + 1], self.data[offset + 2]]
    }

    /// 轉成模型伺服器接受的 [height][width][3] 巢狀陣列
    pub fn to_nested(&self) -> Vec<Vec<[f32; 3]>> {
        (0..self.height)
            .map(|y| (0..self.width).map(|x| self.pixel(x, y)).collect())
            .collect()
    }
}

fn pixel_offset(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * 3
}

/// 解碼上傳的影像、轉 RGB、縮放為 size x size 並正規化
pub fn preprocess_image(bytes: &[u8], size: u32) -> Result<ImageTensor> {
    if size == 0 {
        return Err(AgriError::processing("target image size must be positive"));
    }

    let decoded = image::load_from_memory(bytes)?;
    tracing::debug!(
        "Decoded image {}x{}, resizing to {}x{}",
        decoded.width(),
        decoded.height(),
        size,
        size
    );

    let rgb = decoded.to_rgb8();
    let resized = image::imageops::resize(&rgb, size, size, FilterType::CatmullRom);

    let data = resized
        .as_raw()
        .iter()
        .map(|&channel| channel as f32 / 255.0)
        .collect();

    Ok(ImageTensor {
        width: size,
        height: size,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(width, height, Rgb(color));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_resize_and_normalize() {
        let png = solid_png(40, 30, [255, 0, 51]);
        let tensor = preprocess_image(&png, DEFAULT_IMAGE_SIZE).unwrap();

        assert_eq!(tensor.width, 224);
        assert_eq!(tensor.height, 224);
        assert_eq!(tensor.data.len(), 224 * 224 * 3);
        let [r, g, b] = tensor.pixel(100, 100);
        assert!((r - 1.0).abs() < 1e-6);
        assert!(g.abs() < 1e-6);
        assert!((b - 0.2).abs() < 1e-6);
        assert!(tensor.data.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_nested_layout() {
        let png = solid_png(2, 2, [0, 255, 0]);
        let tensor = preprocess_image(&png, 4).unwrap();
        let nested = tensor.to_nested();
        assert_eq!(nested.len(), 4);
        assert_eq!(nested[0].len(), 4);
        assert_eq!(nested[3][3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        let err = preprocess_image(b"definitely not an image", 224).unwrap_err();
        assert!(matches!(err, AgriError::ImageError(_)));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_pixel_offset_beyond_u32_range() {
        // 70000 x 20000 的影像，索引已超過 u32
        let offset = pixel_offset(70_000, 5, 20_000);
        assert_eq!(offset as u64, (20_000u64 * 70_000 + 5) * 3);
        assert!(offset > u32::MAX as usize);

        let tensor = ImageTensor {
            width: 3,
            height: 2,
            data: (0..18).map(|v| v as f32).collect(),
        };
        assert_eq!(tensor.pixel(2, 1), [15.0, 16.0, 17.0]);
    }
}
