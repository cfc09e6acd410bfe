use core::f32::consts::PI;
use core::fmt::{self, Display};

use libm::{cosf, fabsf, floorf};

use super::*;

#[cfg(feature = "alloc")]
use alloc::string::String;

/// Errors that may occur during hash encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncodeError {
    /// Raster has zero width or height.
    EmptyRaster,

    /// Component counts lie outside `1..=9`.
    InvalidComponents,

    /// Pixels buffer is too small for the raster.
    NotEnoughPixelData,

    /// Value needs more base 83 digits than it was given.
    ValueOutOfRange,

    /// Output buffer is too small to fit the hash.
    OutputIsTooSmall,
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::EmptyRaster => f.write_str("Raster has zero width or height"),
            EncodeError::InvalidComponents => f.write_str("Component counts lie outside 1..=9"),
            EncodeError::NotEnoughPixelData => {
                f.write_str("Pixels buffer is too small for raster")
            }
            EncodeError::ValueOutOfRange => {
                f.write_str("Value needs more base 83 digits than it was given")
            }
            EncodeError::OutputIsTooSmall => {
                f.write_str("Output buffer is too small to fit the hash")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

/// Hash encoder configuration.
///
/// The one knob is the size of the coefficient grid the raster is
/// projected onto. More components keep more detail and lengthen the
/// hash; the 4x4 default is the conventional placeholder choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Encoder {
    /// Size of the coefficient grid.
    pub components: Components,
}

impl Encoder {
    /// Encode a raster into a hash.\
    /// The hash is written into the front of `output` as ASCII.
    ///
    /// `pixels` holds `height` rows of `width` pixels, row-major.
    ///
    /// On success this function returns `Ok(len)` with `len` bytes written,
    /// always exactly `self.components.hash_len()`.\
    /// On failure this function returns `Err(err)` with `err` describing
    /// cause of the error.
    pub fn encode<P>(
        &self,
        pixels: &[P],
        width: u32,
        height: u32,
        output: &mut [u8],
    ) -> Result<usize, EncodeError>
    where
        P: Pixel,
    {
        let Components { x: cx, y: cy } = self.components;

        if unlikely(cx < 1 || cx > 9 || cy < 1 || cy > 9) {
            return Err(EncodeError::InvalidComponents);
        }

        if unlikely(width == 0 || height == 0) {
            return Err(EncodeError::EmptyRaster);
        }

        let cx = cx as usize;
        let cy = cy as usize;
        let px_count = width as usize * height as usize;

        let pixels = match pixels.get(..px_count) {
            None => {
                cold();
                return Err(EncodeError::NotEnoughPixelData);
            }
            Some(pixels) => pixels,
        };

        let hash_len = self.components.hash_len();
        let output = match output.get_mut(..hash_len) {
            None => {
                cold();
                return Err(EncodeError::OutputIsTooSmall);
            }
            Some(output) => output,
        };

        // Project onto the cosine basis one row at a time, leaning on the
        // basis separability: fold each row against the horizontal cosines
        // first, then fold the row sums against the vertical ones. Cells
        // are kept j outer, i inner, matching the wire order.
        let mut coeff = [[0.0f32; 3]; 81];
        let inv_w = 1.0 / width as f32;
        let inv_h = 1.0 / height as f32;

        for (y, row) in pixels.chunks_exact(width as usize).enumerate() {
            let mut row_sums = [[0.0f32; 3]; 9];

            for (x, px) in row.iter().enumerate() {
                let [r, g, b] = px.to_linear();
                let angle_x = PI * x as f32 * inv_w;
                for i in 0..cx {
                    let basis = cosf(angle_x * i as f32);
                    row_sums[i][0] += basis * r;
                    row_sums[i][1] += basis * g;
                    row_sums[i][2] += basis * b;
                }
            }

            let angle_y = PI * y as f32 * inv_h;
            for j in 0..cy {
                let basis = cosf(angle_y * j as f32);
                for i in 0..cx {
                    let cell = &mut coeff[j * cx + i];
                    cell[0] += basis * row_sums[i][0];
                    cell[1] += basis * row_sums[i][1];
                    cell[2] += basis * row_sums[i][2];
                }
            }
        }

        // DC keeps weight 1, AC cells carry 2, all over the pixel count.
        // Decoders then evaluate a plain weighted sum.
        let scale = 1.0 / px_count as f32;
        for channel in coeff[0].iter_mut() {
            *channel *= scale;
        }
        for cell in coeff[1..cx * cy].iter_mut() {
            for channel in cell.iter_mut() {
                *channel *= 2.0 * scale;
            }
        }

        let mut max_ac = 0.0f32;
        for cell in coeff[1..cx * cy].iter() {
            for &channel in cell {
                max_ac = max_ac.max(fabsf(channel));
            }
        }

        let q_max = (floorf(max_ac * 166.0 - 0.5) as i32).clamp(0, 82);
        let actual_max = (q_max + 1) as f32 / 166.0;

        let marker = (cx - 1) + (cy - 1) * 9;
        encode83(marker as u64, &mut output[0..1])?;
        encode83(q_max as u64, &mut output[1..2])?;

        let dc = coeff[0];
        let dc_value = u64::from(linear_to_srgb(dc[0])) * 65536
            + u64::from(linear_to_srgb(dc[1])) * 256
            + u64::from(linear_to_srgb(dc[2]));
        encode83(dc_value, &mut output[2..6])?;

        let cells = coeff[1..cx * cy].iter();
        for (cell, digits) in cells.zip(output[6..].chunks_exact_mut(2)) {
            let qr = quantize_ac(cell[0], actual_max);
            let qg = quantize_ac(cell[1], actual_max);
            let qb = quantize_ac(cell[2], actual_max);
            encode83(qr * 361 + qg * 19 + qb, digits)?;
        }

        Ok(hash_len)
    }

    /// Encode a raster into a hash in memory.
    ///
    /// On success this function returns `Ok(hash)` with the allocated hash
    /// string.\
    /// On failure this function returns `Err(err)` with `err` describing
    /// cause of the error.
    #[cfg(feature = "alloc")]
    pub fn encode_alloc<P>(
        &self,
        pixels: &[P],
        width: u32,
        height: u32,
    ) -> Result<String, EncodeError>
    where
        P: Pixel,
    {
        // Fits the longest valid hash, 9x9 components.
        let mut buf = [0u8; 166];
        let len = self.encode(pixels, width, height, &mut buf)?;
        Ok(buf[..len].iter().copied().map(char::from).collect())
    }
}

// Maps one AC channel onto the 19-step quantizer grid.
fn quantize_ac(value: f32, actual_max: f32) -> u64 {
    let q = floorf(sign_pow(value / actual_max, 0.5) * 9.0 + 9.5) as i32;
    q.clamp(0, 18) as u64
}
