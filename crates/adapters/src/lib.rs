pub mod fs;
pub mod http;
pub mod presenters;

pub use fs::FsFileStore;
pub use http::{
    HttpPredictionGateway, HttpTransport, PredictionTransport, TransportFailure,
    GENERIC_FAILURE_MESSAGE, HEALTH_FAILURE_MESSAGE,
};
pub use presenters::{present_health, present_metrics, present_outcome, present_sample};

use color_probe_application::{ApplicationError, DecodedPixels, ImageDecoder};
use color_probe_domain::pack_rgb;

#[derive(Debug, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedPixels, ApplicationError> {
        let image = image::load_from_memory(bytes)
            .map_err(|error| ApplicationError::Decode(error.to_string()))?;
        // Sampling reads original-resolution pixels; alpha is dropped here.
        let source = image.to_rgb8();
        let width = source.width();
        let height = source.height();
        if width == 0 || height == 0 {
            return Err(ApplicationError::Decode(
                "decoded image has empty dimensions".to_string(),
            ));
        }

        let mut pixels = vec![0_u32; width as usize * height as usize];
        for (x, y, pixel) in source.enumerate_pixels() {
            let [red, green, blue] = pixel.0;
            pixels[y as usize * width as usize + x as usize] = pack_rgb(red, green, blue);
        }
        Ok(DecodedPixels {
            width,
            height,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use color_probe_domain::unpack_rgb;
    use image::{ImageBuffer, ImageFormat, Rgb, Rgba};

    use super::*;

    fn quad_png_bytes() -> Vec<u8> {
        let mut pixels = ImageBuffer::new(2, 2);
        pixels.put_pixel(0, 0, Rgb([255_u8, 0, 0]));
        pixels.put_pixel(1, 0, Rgb([0_u8, 255, 0]));
        pixels.put_pixel(0, 1, Rgb([0_u8, 0, 255]));
        pixels.put_pixel(1, 1, Rgb([255_u8, 255, 255]));
        let mut bytes = Cursor::new(Vec::new());
        pixels
            .write_to(&mut bytes, ImageFormat::Png)
            .expect("encode png");
        bytes.into_inner()
    }

    #[test]
    fn decodes_png_into_packed_natural_resolution_buffer() {
        let decoder = ImageCrateDecoder;
        let decoded = decoder.decode(&quad_png_bytes()).expect("decode");
        assert_eq!((decoded.width, decoded.height), (2, 2));
        assert_eq!(unpack_rgb(decoded.pixels[0]), [255, 0, 0]);
        assert_eq!(unpack_rgb(decoded.pixels[1]), [0, 255, 0]);
        assert_eq!(unpack_rgb(decoded.pixels[2]), [0, 0, 255]);
        assert_eq!(unpack_rgb(decoded.pixels[3]), [255, 255, 255]);
    }

    #[test]
    fn alpha_channel_is_discarded() {
        let pixels = ImageBuffer::from_pixel(1, 1, Rgba([10_u8, 20, 30, 40]));
        let mut bytes = Cursor::new(Vec::new());
        pixels
            .write_to(&mut bytes, ImageFormat::Png)
            .expect("encode png");

        let decoder = ImageCrateDecoder;
        let decoded = decoder.decode(&bytes.into_inner()).expect("decode");
        assert_eq!(unpack_rgb(decoded.pixels[0]), [10, 20, 30]);
    }

    #[test]
    fn corrupt_bytes_fail_with_decode_error() {
        let decoder = ImageCrateDecoder;
        let result = decoder.decode(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(matches!(result, Err(ApplicationError::Decode(_))));
    }
}
