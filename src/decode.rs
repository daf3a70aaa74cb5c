use std::path::Path;

use image::{ColorType, DynamicImage, ImageReader};

use crate::error::TextureError;

/// Raw pixels produced by an [`ImageDecoder`], row 0 being the bottom row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl DecodedImage {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        Self {
            pixels,
            width,
            height,
            channels,
        }
    }

    /// Number of bytes a tightly packed buffer of this shape must hold.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// Expands the pixels to four channels, filling alpha with 255.
    ///
    /// Returns `None` for layouts other than RGB and RGBA.
    pub fn to_rgba(&self) -> Option<Vec<u8>> {
        match self.channels {
            4 => Some(self.pixels.clone()),
            3 => Some(
                self.pixels
                    .chunks_exact(3)
                    .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], u8::MAX])
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Image-decode boundary: file path in, pixels out.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, TextureError>;
}

/// Decodes image files from disk with the `image` crate.
///
/// The format is sniffed from the file contents rather than the extension and
/// every image is flipped vertically on load. 8-bit layouts keep their native
/// channel count so that the registry can reject the ones it does not handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageDecoder;

impl FileImageDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ImageDecoder for FileImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, TextureError> {
        let decode_error = |message: String| TextureError::Decode {
            path: path.to_path_buf(),
            message,
        };
        let image = ImageReader::open(path)
            .map_err(|err| decode_error(err.to_string()))?
            .with_guessed_format()
            .map_err(|err| decode_error(err.to_string()))?
            .decode()
            .map_err(|err| decode_error(err.to_string()))?;
        Ok(into_decoded(image.flipv()))
    }
}

fn into_decoded(image: DynamicImage) -> DecodedImage {
    let (width, height) = (image.width(), image.height());
    let (pixels, channels) = match image.color() {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => {
            let channels = image.color().channel_count();
            (image.into_bytes(), channels)
        }
        ColorType::L16 => (image.into_luma8().into_raw(), 1),
        ColorType::La16 => (image.into_luma_alpha8().into_raw(), 2),
        ColorType::Rgb16 | ColorType::Rgb32F => (image.into_rgb8().into_raw(), 3),
        _ => (image.into_rgba8().into_raw(), 4),
    };
    DecodedImage::new(pixels, width, height, channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn rgb_expands_to_rgba() {
        let image = DecodedImage::new(vec![1, 2, 3, 4, 5, 6], 2, 1, 3);
        assert_eq!(image.to_rgba().unwrap(), vec![1, 2, 3, 255, 4, 5, 6, 255]);
        let gray = DecodedImage::new(vec![7], 1, 1, 1);
        assert!(gray.to_rgba().is_none());
    }

    #[test]
    fn decoded_rows_are_flipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stripes.png");
        let mut source = RgbImage::new(1, 2);
        source.put_pixel(0, 0, Rgb([255, 0, 0]));
        source.put_pixel(0, 1, Rgb([0, 0, 255]));
        source.save(&path).unwrap();

        let decoded = FileImageDecoder::new().decode(&path).unwrap();
        assert_eq!((decoded.width, decoded.height, decoded.channels), (1, 2, 3));
        assert_eq!(&decoded.pixels[..3], &[0, 0, 255]);
        assert_eq!(&decoded.pixels[3..], &[255, 0, 0]);
    }

    #[test]
    fn grayscale_keeps_single_channel() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gray.png");
        GrayImage::from_pixel(2, 2, Luma([9])).save(&path).unwrap();
        let decoded = FileImageDecoder::new().decode(&path).unwrap();
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.expected_len(), decoded.pixels.len());
    }

    #[test]
    fn format_is_sniffed_from_contents() {
        let dir = TempDir::new().unwrap();
        let png = dir.path().join("tile.png");
        RgbImage::from_pixel(1, 1, Rgb([1, 2, 3])).save(&png).unwrap();
        let disguised = dir.path().join("tile.jpg");
        std::fs::rename(&png, &disguised).unwrap();
        let decoded = FileImageDecoder::new().decode(&disguised).unwrap();
        assert_eq!(decoded.pixels, vec![1, 2, 3]);
    }

    #[test]
    fn missing_file_is_decode_error() {
        let err = FileImageDecoder::new()
            .decode(Path::new("does/not/exist.jpg"))
            .unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }
}
