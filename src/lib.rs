//! BlurHash - compact image placeholders as short printable strings
//!
//! Dag Ågren and the Wolt team - https://blurha.sh
//!
//!
//! -- LICENSE: The MIT License(MIT)
//!
//! Copyright(c) 2018 Wolt Enterprises
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy of
//! this software and associated documentation files(the "Software"), to deal in
//! the Software without restriction, including without limitation the rights to
//! use, copy, modify, merge, publish, distribute, sublicense, and / or sell copies
//! of the Software, and to permit persons to whom the Software is furnished to do
//! so, subject to the following conditions :
//! The above copyright notice and this permission notice shall be included in all
//! copies or substantial portions of the Software.
//! THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//! IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//! FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.IN NO EVENT SHALL THE
//! AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//! LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//! OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//! SOFTWARE.
//!
//!
//! -- About
//!
//! BlurHash boils an image down to a handful of cosine coefficients and
//! serializes them as 6 to 166 printable characters. Decoding the string
//! yields a smooth, low-frequency approximation of the original image,
//! good enough to stand in for the real thing while it loads.
//!
//! This crate implements the codec in both directions, plus a second
//! reconstruction path the reference codec does not have: a *sample*
//! decoder that evaluates the inverse transform only at the center of each
//! coefficient-grid tile instead of at every output pixel. Its cost depends
//! on the coefficient count alone, never on the requested resolution, and
//! its output is a short list of tile-center colors a renderer can paint as
//! flat tiles and blur (sigma of about a quarter tile width) into a
//! placeholder visually equivalent to the full decode.
//!
//! The core is `no_std`; the `alloc` feature adds the `_alloc` entry points
//! and `std` (default) adds `std::error::Error` impls.
//!
//! -- Data Format
//!
//! A hash is a sequence of base 83 digits drawn from this alphabet,
//! index 0 to 82:
//!
//! 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz#$%*+,-.:;=?@[]^_{|}~
//!
//! Multi-digit fields are big endian. With n = componentsX * componentsY
//! cells in the coefficient grid, the layout is:
//!
//! marker  1 digit    (componentsX - 1) + (componentsY - 1) * 9,
//!                    both counts in 1..=9
//! max AC  1 digit    quantized maximum AC magnitude q in 0..=82;
//!                    decoders use (q + 1) / 166. Present even when
//!                    n == 1 (then always 0)
//! DC      4 digits   average image color as 8-bit sRGB channels packed
//!                    r * 65536 + g * 256 + b
//! AC      2 digits   per remaining cell in row-major order (j outer,
//!                    i inner, cell (0, 0) skipped): channel quantiles
//!                    in 0..=18 packed qr * 361 + qg * 19 + qb
//!
//! Total length is always 4 + 2 * n. Cell (i, j) weighs the basis function
//! cos(PI * i * x / width) * cos(PI * j * y / height); the DC cell holds
//! the average linear color and every AC cell was scaled by 2 at encode
//! time, so decoders evaluate a plain weighted sum.
//!
#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use bytemuck::{Pod, Zeroable};

mod base83;
mod color;
mod decode;
mod encode;

pub use self::{
    base83::{decode83, encode83},
    color::{linear_to_srgb, srgb_to_linear},
    decode::{DecodeError, Decoder},
    encode::{EncodeError, Encoder},
};

pub(crate) use self::{
    base83::{decode83_bytes, digit83},
    color::sign_pow,
};

#[cold]
#[inline(always)]
fn cold() {}

#[inline(always)]
fn unlikely(b: bool) -> bool {
    if b {
        cold();
    }
    b
}

/// Coefficient grid descriptor value.
///
/// Names the size of the cosine coefficient grid a hash carries. The
/// encoder takes it as configuration; decoders recover it from the hash's
/// first character, either implicitly or through
/// [`Components::decode_header`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Components {
    /// Number of horizontal frequency components, `1..=9`.
    pub x: u32,

    /// Number of vertical frequency components, `1..=9`.
    pub y: u32,
}

impl Default for Components {
    /// Returns the 4x4 grid, the conventional default.
    #[inline]
    fn default() -> Self {
        Components { x: 4, y: 4 }
    }
}

impl Components {
    /// Number of cells in the coefficient grid.
    #[inline]
    pub fn count(&self) -> usize {
        self.x as usize * self.y as usize
    }

    /// Exact length of a hash carrying this grid.
    #[inline]
    pub fn hash_len(&self) -> usize {
        4 + 2 * self.count()
    }
}

/// Pixel representation the codec reads and writes.
///
/// The wire format always stores sRGB, but callers may keep their raster in
/// 8-bit sRGB or in linear floating point. The two implementations say how
/// a pixel maps to and from the linear RGB channels the transform works in,
/// so picking the pixel type picks the conversion.
pub trait Pixel: Pod {
    /// Linear RGB channels of this pixel.
    fn to_linear(self) -> [f32; 3];

    /// Pixel closest to the given linear RGB channels.
    ///
    /// Channels outside `0.0..=1.0` are clamped.
    fn from_linear(rgb: [f32; 3]) -> Self;
}

/// 24-bit sRGB pixel, the representation the wire format quantizes against.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Srgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel for Srgb8 {
    #[inline]
    fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }

    #[inline]
    fn from_linear(rgb: [f32; 3]) -> Self {
        Srgb8 {
            r: linear_to_srgb(rgb[0]),
            g: linear_to_srgb(rgb[1]),
            b: linear_to_srgb(rgb[2]),
        }
    }
}

/// Linear floating point pixel for callers running their own color
/// pipeline, typically around a linear-space resize before encoding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LinearF32 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Pixel for LinearF32 {
    #[inline]
    fn to_linear(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    fn from_linear(rgb: [f32; 3]) -> Self {
        LinearF32 {
            r: rgb[0].clamp(0.0, 1.0),
            g: rgb[1].clamp(0.0, 1.0),
            b: rgb[2].clamp(0.0, 1.0),
        }
    }
}

/// One reconstructed sample produced by [`Decoder::decode_samples`].
///
/// `x` and `y` are the center of the tile this sample colors when the
/// output canvas is split into a `components.x` by `components.y` grid of
/// equal tiles. Renderers fill that tile with `color` and blur the
/// composite; see the crate docs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Horizontal tile center in output pixel coordinates.
    pub x: f32,

    /// Vertical tile center in output pixel coordinates.
    pub y: f32,

    /// Tile color.
    pub color: Srgb8,
}
