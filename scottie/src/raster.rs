//! The 320×256 RGB raster handed over by the image acquisition side.
//!
//! In storage a raster is a plain byte stream of three-byte RGB records in
//! row-major order, without any header.

use std::{
    io::{
        Read,
        Write,
    },
    path::Path,
};

use image::{
    DynamicImage,
    imageops::FilterType,
};

use crate::modes::ModeSpecification;

pub const BYTES_PER_PIXEL: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("raster io error")]
    Io(#[from] std::io::Error),
    #[error("image decode error")]
    Decode(#[from] image::ImageError),
    #[error("raster of {width}x{height} needs {expected} bytes, got {actual}")]
    Size {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Channel {
    #[default]
    Green,
    Blue,
    Red,
}

impl Channel {
    /// Offset of this channel inside an RGB record.
    #[inline]
    pub const fn rgb_offset(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    #[inline]
    pub const fn from_rgb_offset(offset: usize) -> Option<Self> {
        match offset {
            0 => Some(Channel::Red),
            1 => Some(Channel::Green),
            2 => Some(Channel::Blue),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct Raster {
    width: usize,
    height: usize,
    #[debug(skip)]
    data: Box<[u8]>,
}

impl Raster {
    /// A black raster.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * BYTES_PER_PIXEL].into_boxed_slice(),
        }
    }

    /// A black raster with the geometry of `mode`.
    #[inline]
    pub fn for_mode(mode: &ModeSpecification) -> Self {
        Self::new(mode.pixels_per_line, mode.num_lines)
    }

    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> [u8; 3],
    ) -> Self {
        let mut raster = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                raster.set_pixel(x, y, f(x, y));
            }
        }
        raster
    }

    pub fn from_bytes(data: Vec<u8>, width: usize, height: usize) -> Result<Self, Error> {
        let expected = width * height * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(Error::Size {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: data.into_boxed_slice(),
        })
    }

    /// Reads a whole raster in storage layout. Fails unless the stream holds
    /// exactly one raster.
    pub fn from_reader<R: Read>(mut reader: R, width: usize, height: usize) -> Result<Self, Error> {
        let mut data = Vec::with_capacity(width * height * BYTES_PER_PIXEL);
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data, width, height)
    }

    /// Decodes an image file and scales it to the given geometry.
    pub fn open_image(path: impl AsRef<Path>, width: usize, height: usize) -> Result<Self, Error> {
        let image = image::open(path)?;
        Ok(Self::from_image(&image, width, height))
    }

    /// Scales a decoded image to the given geometry.
    pub fn from_image(image: &DynamicImage, width: usize, height: usize) -> Self {
        let rgb = image.to_rgb8();
        let rgb = if rgb.width() as usize == width && rgb.height() as usize == height {
            rgb
        }
        else {
            tracing::debug!(
                from_width = rgb.width(),
                from_height = rgb.height(),
                width,
                height,
                "resizing image"
            );
            image::imageops::resize(&rgb, width as u32, height as u32, FilterType::Triangle)
        };

        Self {
            width,
            height,
            data: rgb.into_raw().into_boxed_slice(),
        }
    }

    /// Writes the raster in storage layout.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn line_bytes(&self) -> usize {
        self.width * BYTES_PER_PIXEL
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Interleaved RGB bytes of line `y`.
    #[inline]
    pub fn line(&self, y: usize) -> &[u8] {
        let line_bytes = self.line_bytes();
        &self.data[y * line_bytes..][..line_bytes]
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let offset = (y * self.width + x) * BYTES_PER_PIXEL;
        [self.data[offset], self.data[offset + 1], self.data[offset + 2]]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let offset = (y * self.width + x) * BYTES_PER_PIXEL;
        self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgb);
    }
}
