//! Decimal renderings of huge step counts: the exact digits wrapped into fixed-width lines,
//! and a scientific form rounded on the digit string so no precision is lost to floats.

use num_bigint::BigUint;
use std::fmt::{Display, Formatter};

/// A value in scientific notation, `d.ddd...e+exponent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scientific {
    /// Mantissa digits without the decimal point; the first one is the integer part.
    digits: Vec<u8>,
    exponent: usize,
}

impl Scientific {
    /// Rounds `value` to `precision` digits after the decimal point.
    ///
    /// Ties are rounded half to even, as decimal formatting does. A carry out
    /// of the mantissa moves the exponent up by one.
    pub fn new(value: &BigUint, precision: usize) -> Self {
        let text = value.to_str_radix(10);
        let all: Vec<u8> = text.bytes().map(|b| b - b'0').collect();
        let keep = precision + 1;

        if all == [0] {
            return Self {
                digits: vec![0; keep],
                exponent: 0,
            };
        }

        let mut exponent = all.len() - 1;
        if all.len() <= keep {
            let mut digits = all;
            digits.resize(keep, 0);
            return Self { digits, exponent };
        }

        let (head, tail) = all.split_at(keep);
        let mut digits = head.to_vec();

        let round_up = match tail[0] {
            d if d > 5 => true,
            d if d < 5 => false,
            _ => tail[1..].iter().any(|&d| d != 0) || digits[keep - 1] % 2 == 1,
        };

        if round_up && increment(&mut digits) {
            digits.insert(0, 1);
            digits.truncate(keep);
            exponent += 1;
        }

        Self { digits, exponent }
    }

    /// Returns the mantissa as text, e.g. `"1.404"`.
    pub fn mantissa(&self) -> String {
        let (integer, fraction) = self.digits.split_at(1);
        let mut text = integer[0].to_string();
        if !fraction.is_empty() {
            text.push('.');
            text.extend(fraction.iter().map(|d| char::from(b'0' + d)));
        }
        text
    }

    /// Returns the power of ten, `floor(log10(value))` before rounding carries.
    pub fn exponent(&self) -> usize {
        self.exponent
    }
}

impl Display for Scientific {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}e+{}", self.mantissa(), self.exponent)
    }
}

/// Adds one to a decimal digit vector, returning `true` if it carried out of
/// the most significant digit.
fn increment(digits: &mut [u8]) -> bool {
    for digit in digits.iter_mut().rev() {
        if *digit == 9 {
            *digit = 0;
        } else {
            *digit += 1;
            return false;
        }
    }
    true
}

/// Splits an ASCII digit string into lines of at most `width` characters.
///
/// A width of 0 leaves the text on a single line.
pub fn wrap_digits(digits: &str, width: usize) -> String {
    if width == 0 {
        return digits.to_string();
    }

    digits
        .as_bytes()
        .chunks(width)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join("\n")
}
