use core::f32::consts::PI;
use core::fmt::{self, Display};

use libm::cosf;

use super::*;

#[cfg(feature = "alloc")]
use alloc::{vec, vec::Vec};

/// Errors that may occur during hash decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecodeError {
    /// Requested raster has zero width or height.
    EmptyRaster,

    /// Hash is shorter than the 6 character minimum.
    DataIsTooSmall,

    /// Hash length does not match its size marker.
    InvalidLength,

    /// Hash contains a byte outside the base 83 alphabet.
    InvalidCharacter,

    /// Size marker names an impossible component count.
    InvalidComponentsValue,

    /// Base 83 value does not fit in 64 bits.
    ValueOverflow,

    /// Output buffer is too small for the requested raster.
    OutputIsTooSmall,
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::EmptyRaster => f.write_str("Requested raster has zero width or height"),
            DecodeError::DataIsTooSmall => {
                f.write_str("Hash is shorter than the 6 character minimum")
            }
            DecodeError::InvalidLength => {
                f.write_str("Hash length does not match its size marker")
            }
            DecodeError::InvalidCharacter => {
                f.write_str("Hash contains a byte outside the base 83 alphabet")
            }
            DecodeError::InvalidComponentsValue => {
                f.write_str("Size marker names an impossible component count")
            }
            DecodeError::ValueOverflow => f.write_str("Base 83 value does not fit in 64 bits"),
            DecodeError::OutputIsTooSmall => {
                f.write_str("Output buffer is too small for the requested raster")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

// Expands a size marker byte into the component counts it names. Markers
// 81 and 82 decode to ten vertical components and are rejected.
fn components_from_marker(byte: u8) -> Result<Components, DecodeError> {
    let value = u32::from(digit83(byte)?);
    let components = Components {
        x: value % 9 + 1,
        y: value / 9 + 1,
    };
    if unlikely(components.y > 9) {
        return Err(DecodeError::InvalidComponentsValue);
    }
    Ok(components)
}

impl Components {
    /// Decodes the coefficient grid size from a hash.
    ///
    /// Reads only the first character, so callers can size output buffers
    /// before running a full decode. The rest of the hash may be missing
    /// or invalid; the decoding entry points still validate all of it.
    pub fn decode_header(hash: &str) -> Result<Self, DecodeError> {
        match hash.as_bytes().first() {
            None => {
                cold();
                Err(DecodeError::DataIsTooSmall)
            }
            Some(&byte) => components_from_marker(byte),
        }
    }
}

/// Hash decoder configuration.
///
/// `punch` scales every AC coefficient before reconstruction: values above
/// 1.0 exaggerate contrast, values below flatten the result toward the
/// average color. 1.0 reproduces the hash as encoded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoder {
    /// AC contrast factor.
    pub punch: f32,
}

impl Default for Decoder {
    #[inline]
    fn default() -> Self {
        Decoder { punch: 1.0 }
    }
}

impl Decoder {
    // Validates the whole hash and expands it into the linear coefficient
    // grid, j outer, i inner, with punch already folded into the AC cells.
    fn parse(&self, hash: &[u8]) -> Result<(Components, [[f32; 3]; 81]), DecodeError> {
        if unlikely(hash.len() < 6) {
            return Err(DecodeError::DataIsTooSmall);
        }

        let components = components_from_marker(hash[0])?;

        if unlikely(hash.len() != components.hash_len()) {
            return Err(DecodeError::InvalidLength);
        }

        let q_max = digit83(hash[1])?;
        let actual_max = (q_max as f32 + 1.0) / 166.0;

        let mut coeff = [[0.0f32; 3]; 81];

        let dc = decode83_bytes(&hash[2..6])?;
        coeff[0] = [
            srgb_to_linear((dc >> 16) as u8),
            srgb_to_linear((dc >> 8) as u8),
            srgb_to_linear(dc as u8),
        ];

        let cells = coeff[1..components.count()].iter_mut();
        for (cell, digits) in cells.zip(hash[6..].chunks_exact(2)) {
            let value = decode83_bytes(digits)?;
            let qr = value / 361;
            let qg = (value / 19) % 19;
            let qb = value % 19;
            cell[0] = dequantize_ac(qr, actual_max) * self.punch;
            cell[1] = dequantize_ac(qg, actual_max) * self.punch;
            cell[2] = dequantize_ac(qb, actual_max) * self.punch;
        }

        Ok((components, coeff))
    }

    /// Decode a hash into a `width` by `height` raster.\
    /// Pixels are written into `output` row-major; anything past
    /// `width * height` is left untouched.
    ///
    /// On success this function returns `Ok(components)` with the
    /// coefficient grid size the hash carried.\
    /// On failure this function returns `Err(err)` with `err` describing
    /// cause of the error.
    pub fn decode<P>(
        &self,
        hash: &str,
        width: u32,
        height: u32,
        output: &mut [P],
    ) -> Result<Components, DecodeError>
    where
        P: Pixel,
    {
        if unlikely(width == 0 || height == 0) {
            return Err(DecodeError::EmptyRaster);
        }

        let (components, coeff) = self.parse(hash.as_bytes())?;

        let px_count = width as usize * height as usize;
        let output = match output.get_mut(..px_count) {
            None => {
                cold();
                return Err(DecodeError::OutputIsTooSmall);
            }
            Some(output) => output,
        };

        let cx = components.x as usize;
        let cy = components.y as usize;
        let inv_w = 1.0 / width as f32;
        let inv_h = 1.0 / height as f32;

        for (y, row) in output.chunks_exact_mut(width as usize).enumerate() {
            // Collapse the grid's vertical axis once per row, then sweep
            // the row against the horizontal cosines.
            let mut row_coeff = [[0.0f32; 3]; 9];
            let angle_y = PI * y as f32 * inv_h;
            for j in 0..cy {
                let basis = cosf(angle_y * j as f32);
                for i in 0..cx {
                    let cell = coeff[j * cx + i];
                    row_coeff[i][0] += basis * cell[0];
                    row_coeff[i][1] += basis * cell[1];
                    row_coeff[i][2] += basis * cell[2];
                }
            }

            for (x, px) in row.iter_mut().enumerate() {
                let angle_x = PI * x as f32 * inv_w;
                let mut rgb = [0.0f32; 3];
                for i in 0..cx {
                    let basis = cosf(angle_x * i as f32);
                    rgb[0] += basis * row_coeff[i][0];
                    rgb[1] += basis * row_coeff[i][1];
                    rgb[2] += basis * row_coeff[i][2];
                }
                *px = P::from_linear(rgb);
            }
        }

        Ok(components)
    }

    /// Decode a hash into a raster in memory.
    ///
    /// On success this function returns `Ok((components, pixels))` with
    /// the allocated row-major raster.\
    /// On failure this function returns `Err(err)` with `err` describing
    /// cause of the error.
    #[cfg(feature = "alloc")]
    pub fn decode_alloc<P>(
        &self,
        hash: &str,
        width: u32,
        height: u32,
    ) -> Result<(Components, Vec<P>), DecodeError>
    where
        P: Pixel,
    {
        let mut pixels = vec![P::zeroed(); width as usize * height as usize];
        let components = self.decode(hash, width, height, &mut pixels)?;
        Ok((components, pixels))
    }

    /// Decode a hash into one sample per coefficient cell.
    ///
    /// Rather than evaluating the inverse transform at every pixel of a
    /// `width` by `height` canvas, this evaluates it only at the center of
    /// each cell's tile when the canvas is split into a grid of
    /// `components.x` by `components.y` equal tiles. The work grows with
    /// the square of the cell count and not with the canvas size, so a
    /// renderer that fills flat tiles and blurs them (see the crate docs)
    /// gets a placeholder at a small fraction of the dense cost.
    ///
    /// Samples are written in the wire's cell order, j outer, i inner;
    /// anything past `components.count()` is left untouched.
    ///
    /// On success this function returns `Ok(components)` with the
    /// coefficient grid size the hash carried.\
    /// On failure this function returns `Err(err)` with `err` describing
    /// cause of the error.
    pub fn decode_samples(
        &self,
        hash: &str,
        width: u32,
        height: u32,
        output: &mut [Sample],
    ) -> Result<Components, DecodeError> {
        if unlikely(width == 0 || height == 0) {
            return Err(DecodeError::EmptyRaster);
        }

        let (components, coeff) = self.parse(hash.as_bytes())?;

        let output = match output.get_mut(..components.count()) {
            None => {
                cold();
                return Err(DecodeError::OutputIsTooSmall);
            }
            Some(output) => output,
        };

        let cx = components.x as usize;
        let cy = components.y as usize;
        let inv_w = 1.0 / width as f32;
        let inv_h = 1.0 / height as f32;
        let tile_w = width as f32 / components.x as f32;
        let tile_h = height as f32 / components.y as f32;

        for j in 0..cy {
            let y = (j as f32 + 0.5) * tile_h;

            let mut row_coeff = [[0.0f32; 3]; 9];
            let angle_y = PI * y * inv_h;
            for jj in 0..cy {
                let basis = cosf(angle_y * jj as f32);
                for ii in 0..cx {
                    let cell = coeff[jj * cx + ii];
                    row_coeff[ii][0] += basis * cell[0];
                    row_coeff[ii][1] += basis * cell[1];
                    row_coeff[ii][2] += basis * cell[2];
                }
            }

            for i in 0..cx {
                let x = (i as f32 + 0.5) * tile_w;
                let angle_x = PI * x * inv_w;
                let mut rgb = [0.0f32; 3];
                for ii in 0..cx {
                    let basis = cosf(angle_x * ii as f32);
                    rgb[0] += basis * row_coeff[ii][0];
                    rgb[1] += basis * row_coeff[ii][1];
                    rgb[2] += basis * row_coeff[ii][2];
                }
                output[j * cx + i] = Sample {
                    x,
                    y,
                    color: Srgb8::from_linear(rgb),
                };
            }
        }

        Ok(components)
    }

    /// Decode a hash into a sample list in memory.
    ///
    /// On success this function returns `Ok((components, samples))` with
    /// the allocated samples in wire cell order.\
    /// On failure this function returns `Err(err)` with `err` describing
    /// cause of the error.
    #[cfg(feature = "alloc")]
    pub fn decode_samples_alloc(
        &self,
        hash: &str,
        width: u32,
        height: u32,
    ) -> Result<(Components, Vec<Sample>), DecodeError> {
        let components = Components::decode_header(hash)?;

        let empty = Sample {
            x: 0.0,
            y: 0.0,
            color: Srgb8::default(),
        };
        let mut samples = vec![empty; components.count()];
        let components = self.decode_samples(hash, width, height, &mut samples)?;
        Ok((components, samples))
    }
}

// Inverse of the encoder's quantizer for one AC channel.
fn dequantize_ac(quantile: u64, actual_max: f32) -> f32 {
    sign_pow((quantile as f32 - 9.0) / 9.0, 2.0) * actual_max
}
