use super::*;

/// The 83 hash digits in value order.
pub(crate) const ALPHABET: &[u8; 83] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz#$%*+,-.:;=?@[]^_{|}~";

/// Inverse of [`ALPHABET`] over ASCII, with 255 marking bytes outside it.
static DECODE_LUT: [u8; 128] = build_decode_lut();

const fn build_decode_lut() -> [u8; 128] {
    let mut lut = [255u8; 128];
    let mut value = 0;
    while value < ALPHABET.len() {
        lut[ALPHABET[value] as usize] = value as u8;
        value += 1;
    }
    lut
}

/// Value of a single alphabet byte.
#[inline]
pub(crate) fn digit83(byte: u8) -> Result<u8, DecodeError> {
    match DECODE_LUT.get(byte as usize) {
        Some(&digit) if digit != 255 => Ok(digit),
        _ => {
            cold();
            Err(DecodeError::InvalidCharacter)
        }
    }
}

/// Writes `value` as exactly `output.len()` base 83 digits, most
/// significant first.
///
/// Fails with [`EncodeError::ValueOutOfRange`] when the value needs more
/// digits than it was given.
pub fn encode83(value: u64, output: &mut [u8]) -> Result<(), EncodeError> {
    // 83^11 exceeds u64, so eleven digits and up always fit.
    if let Some(limit) = 83u64.checked_pow(output.len() as u32) {
        if unlikely(value >= limit) {
            return Err(EncodeError::ValueOutOfRange);
        }
    }

    let mut rest = value;
    for digit in output.iter_mut().rev() {
        *digit = ALPHABET[(rest % 83) as usize];
        rest /= 83;
    }
    Ok(())
}

/// Folds a string of base 83 digits into the integer it spells.
///
/// The empty string folds to zero. Fails with
/// [`DecodeError::InvalidCharacter`] on any byte outside the alphabet and
/// with [`DecodeError::ValueOverflow`] when the result does not fit in 64
/// bits.
pub fn decode83(s: &str) -> Result<u64, DecodeError> {
    decode83_bytes(s.as_bytes())
}

// Byte-wise worker shared with the hash parser, which slices hashes as
// bytes so a stray multi-byte character becomes an error instead of a
// char-boundary panic.
pub(crate) fn decode83_bytes(bytes: &[u8]) -> Result<u64, DecodeError> {
    let mut acc = 0u64;
    for &byte in bytes {
        let digit = digit83(byte)?;
        acc = match acc.checked_mul(83).and_then(|v| v.checked_add(u64::from(digit))) {
            None => {
                cold();
                return Err(DecodeError::ValueOverflow);
            }
            Some(acc) => acc,
        };
    }
    Ok(acc)
}
