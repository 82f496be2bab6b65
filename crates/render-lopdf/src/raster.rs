use crate::error::AssemblyError;
use image::RgbaImage;
use inkpress_pdf_composer::{deflate, flate_stream};
use lopdf::{dictionary, Stream};

/// A page raster already compressed for embedding.
///
/// Encoding happens where the raster is produced, so a multi-page render
/// only holds the deflated planes of finished pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRaster {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl EncodedRaster {
    /// Splits `raster` into a deflated RGB plane and, with `with_alpha`, a
    /// deflated alpha plane used as the image's soft mask.
    pub fn encode(raster: &RgbaImage, with_alpha: bool) -> Result<Self, AssemblyError> {
        let (width, height) = raster.dimensions();
        if width == 0 || height == 0 {
            return Err(AssemblyError::EmptyRaster { width, height });
        }

        let pixels = (width as usize) * (height as usize);
        let mut rgb = Vec::with_capacity(pixels * 3);
        let mut alpha = Vec::with_capacity(if with_alpha { pixels } else { 0 });
        for px in raster.pixels() {
            rgb.extend_from_slice(&px.0[..3]);
            if with_alpha {
                alpha.push(px[3]);
            }
        }

        Ok(Self {
            width,
            height,
            rgb: deflate(&rgb)?,
            alpha: if with_alpha { Some(deflate(&alpha)?) } else { None },
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    /// Compressed size of both planes.
    pub fn encoded_len(&self) -> usize {
        self.rgb.len() + self.alpha.as_ref().map_or(0, Vec::len)
    }

    pub(crate) fn into_streams(self) -> (Stream, Option<Stream>) {
        let image = |color_space: &str, data| {
            flate_stream(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(self.width),
                    "Height" => i64::from(self.height),
                    "ColorSpace" => color_space,
                    "BitsPerComponent" => 8,
                },
                data,
            )
        };
        let smask = self.alpha.map(|alpha| image("DeviceGray", alpha));
        (image("DeviceRGB", self.rgb), smask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn blank_pages_compress_well() {
        let raster = RgbaImage::from_pixel(1404, 1872, Rgba([0, 0, 0, 0]));
        let encoded = EncodedRaster::encode(&raster, true).unwrap();
        assert_eq!(encoded.dimensions(), (1404, 1872));
        assert!(encoded.has_alpha());
        assert!(encoded.encoded_len() < 64 * 1024, "{}", encoded.encoded_len());
    }

    #[test]
    fn streams_carry_planes() {
        let raster = RgbaImage::from_pixel(2, 3, Rgba([10, 20, 30, 40]));
        let (image, smask) = EncodedRaster::encode(&raster, true).unwrap().into_streams();
        assert_eq!(image.decompressed_content().unwrap(), [10, 20, 30].repeat(6));
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 2);
        let smask = smask.unwrap();
        assert_eq!(smask.decompressed_content().unwrap(), vec![40; 6]);
        assert_eq!(smask.dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceGray");

        let (_, none) = EncodedRaster::encode(&raster, false).unwrap().into_streams();
        assert!(none.is_none());
    }

    #[test]
    fn empty_raster_is_rejected() {
        assert!(matches!(
            EncodedRaster::encode(&RgbaImage::new(0, 4), false),
            Err(AssemblyError::EmptyRaster { width: 0, height: 4 })
        ));
    }
}
