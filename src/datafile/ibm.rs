//! # IBM/360 Hexadecimal Float Conversion
//!
//! Tape-era datasets encode samples as IBM System/360 single-precision
//! floats: a sign bit, a 7-bit base-16 exponent biased by 64, and a 24-bit
//! fraction with no hidden bit.
//!
//! ```text
//! IBM:  s eeeeeee ffffffff ffffffff ffffffff     value = (-1)^s * 16^(e-64) * 0.f
//! IEEE: s eeeeeeee fffffff ffffffff ffffffff     value = (-1)^s * 2^(e-127) * 1.f
//! ```
//!
//! Conversion rebases the exponent to powers of two and shifts the fraction
//! left until its top bit becomes IEEE's implicit one. Values above the IEEE
//! range clamp to the maximum finite magnitude; values below it flush to
//! zero. IBM's wider exponent range makes both cases reachable.
//!
//! | IBM word     | IEEE word    | Value    |
//! |--------------|--------------|----------|
//! | `0x00000000` | `0x00000000` | 0.0      |
//! | `0x41100000` | `0x3f800000` | 1.0      |
//! | `0x42640000` | `0x42c80000` | 100.0    |
//! | `0xc276a000` | `0xc2ed4000` | -118.625 |

/// Convert one IBM word (already decoded from big-endian storage) to
/// IEEE-754 single-precision bits.
///
/// The flag marks the degenerate case of a non-zero word with an all-zero
/// fraction, which no IBM writer produces. Such a word converts to 0.0 and
/// the caller reports the file as suspect, once.
pub(crate) fn ibm_to_ieee_bits(word: u32) -> (u32, bool) {
    if word == 0 {
        return (0, false);
    }
    let mut fraction = word & 0x00ff_ffff;
    if fraction == 0 {
        return (0, true);
    }
    // 16^(e-64) * 0.f  ==  2^(4e-256) * 0.f; the shift loop moves 0.f's top
    // bit into the implicit position, adjusting the exponent per bit
    let mut exponent = (((word & 0x7f00_0000) >> 22) as i32) - 130;
    while fraction & 0x0080_0000 == 0 {
        exponent -= 1;
        fraction <<= 1;
    }
    let sign = word & 0x8000_0000;
    if exponent > 254 {
        (sign | 0x7f7f_ffff, false)
    } else if exponent <= 0 {
        (0, false)
    } else {
        (sign | ((exponent as u32) << 23) | (fraction & 0x007f_ffff), false)
    }
}
