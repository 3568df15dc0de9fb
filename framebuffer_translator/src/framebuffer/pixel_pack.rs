/// Readback destination layout and texel encoding

use glam::Vec4;
use crate::error::{Error, Result};

/// Channel layout of packed output pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgba,
    Bgra,
    Rgb,
    Rg,
    Red,
}

impl PixelFormat {
    pub fn components(self) -> usize {
        match self {
            PixelFormat::Rgba | PixelFormat::Bgra => 4,
            PixelFormat::Rgb => 3,
            PixelFormat::Rg => 2,
            PixelFormat::Red => 1,
        }
    }

    /// Output channels in order, taken from an RGBA value
    fn swizzle(self, rgba: Vec4) -> [f32; 4] {
        match self {
            PixelFormat::Bgra => [rgba.z, rgba.y, rgba.x, rgba.w],
            _ => rgba.to_array(),
        }
    }
}

/// Component type of packed output pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    UnsignedByte,
    Float,
}

impl PixelType {
    pub fn size(self) -> usize {
        match self {
            PixelType::UnsignedByte => 1,
            PixelType::Float => 4,
        }
    }
}

/// Bytes of one packed pixel
pub fn pixel_size(format: PixelFormat, ty: PixelType) -> usize {
    format.components() * ty.size()
}

/// Pack parameters of the portable API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPackState {
    /// Row start alignment in bytes (1, 2, 4 or 8)
    pub alignment: usize,
    /// Pixels per row in the destination, 0 = area width
    pub row_length: usize,
    pub skip_rows: usize,
    pub skip_pixels: usize,
    /// Write the first source row last
    pub reverse_row_order: bool,
}

impl Default for PixelPackState {
    fn default() -> Self {
        Self { alignment: 4, row_length: 0, skip_rows: 0, skip_pixels: 0, reverse_row_order: false }
    }
}

impl PixelPackState {
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Byte layout of a packed rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackLayout {
    pub row_pitch: usize,
    pub skip_bytes: usize,
    pub row_bytes: usize,
    pub rows: usize,
    pub pixel_size: usize,
}

impl PackLayout {
    /// Layout of a `width` x `height` rectangle
    ///
    /// An explicit `pitch > 0` overrides the pitch derived from `row_length`
    /// and `alignment`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when the alignment is not 1, 2, 4 or 8.
    /// `InvalidRectangle` when the packed extent does not fit a `usize`.
    pub fn new(width: usize, height: usize, pixel_size: usize, pitch: usize, pack: &PixelPackState) -> Result<Self> {
        if !matches!(pack.alignment, 1 | 2 | 4 | 8) {
            crate::shim_bail!("fbt::PixelPack", Error::OutOfRange(format!(
                "Pack alignment {} is not 1, 2, 4 or 8", pack.alignment)));
        }

        let row_length = if pack.row_length > 0 { pack.row_length } else { width };
        let layout = (|| {
            let row_pitch = if pitch > 0 {
                pitch
            } else {
                row_length.checked_mul(pixel_size)?.div_ceil(pack.alignment).checked_mul(pack.alignment)?
            };
            let skip_bytes = pack.skip_rows.checked_mul(row_pitch)?.checked_add(pack.skip_pixels.checked_mul(pixel_size)?)?;
            let layout = Self { row_pitch, skip_bytes, row_bytes: width.checked_mul(pixel_size)?, rows: height, pixel_size };
            // Every row offset stays below the last byte written
            if layout.rows > 0 {
                (layout.rows - 1).checked_mul(row_pitch)?.checked_add(skip_bytes)?.checked_add(layout.row_bytes)?;
            }
            Some(layout)
        })();

        match layout {
            Some(layout) => Ok(layout),
            None => crate::shim_bail!("fbt::PixelPack", Error::InvalidRectangle(format!(
                "Packing {}x{} pixels of {} bytes with {:?} overflows the address space", width, height, pixel_size, pack))),
        }
    }

    /// Offset of destination row `row`
    pub fn row_offset(&self, row: usize) -> usize {
        self.skip_bytes + row * self.row_pitch
    }

    /// Smallest buffer holding the last byte written
    pub fn required_size(&self) -> usize {
        if self.rows == 0 || self.row_bytes == 0 {
            return 0;
        }
        self.row_offset(self.rows - 1) + self.row_bytes
    }
}

/// Encode one RGBA value into `out` (at least `pixel_size(format, ty)` bytes)
pub fn encode_pixel(rgba: Vec4, format: PixelFormat, ty: PixelType, out: &mut [u8]) {
    let channels = format.swizzle(rgba);
    for (index, &value) in channels.iter().take(format.components()).enumerate() {
        match ty {
            PixelType::UnsignedByte => {
                out[index] = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
            PixelType::Float => {
                out[index * 4..index * 4 + 4].copy_from_slice(bytemuck::bytes_of(&value));
            }
        }
    }
}

#[cfg(test)]
#[path = "pixel_pack_tests.rs"]
mod tests;
