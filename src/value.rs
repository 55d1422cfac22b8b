//! Names and literal values.
//!
//! Every literal is derived from the Keccak-256 hash of the decimal string
//! of a monotonically increasing counter, so output only depends on how many
//! values were drawn before it.

use tiny_keccak::{Hasher, Keccak};

/// Prefix of every generated variable name.
pub const VAR_PREFIX: &str = "x_";

/// Monotonic counters for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    value: u64,
    variable: u64,
    check: u64,
}

impl Counters {
    pub fn new() -> Self {
        Counters::default()
    }

    /// Draws the next value seed. Never reused within one conversion.
    pub fn next_value(&mut self) -> u64 {
        let counter = self.value;
        self.value += 1;
        counter
    }

    /// Allocates the next variable name, `x_0`, `x_1`, ...
    pub fn next_name(&mut self) -> String {
        let name = format!("{VAR_PREFIX}{}", self.variable);
        self.variable += 1;
        name
    }

    /// Allocates the next check id, starting from 1.
    pub fn next_check(&mut self) -> u64 {
        self.check += 1;
        self.check
    }

    /// Number of variable names handed out so far.
    pub fn variables(&self) -> u64 {
        self.variable
    }
}

pub fn hash_counter(counter: u64) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(counter.to_string().as_bytes());
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Hash of `counter` with everything but the low `nibbles` hex digits zeroed,
/// as a `0x` prefixed 64 digit hex string.
pub fn masked_hex(counter: u64, nibbles: usize) -> String {
    assert!(nibbles <= 64, "cannot keep {nibbles} nibbles of a 256 bit hash");
    let digits = hex::encode(hash_counter(counter));
    let keep = 64 - nibbles;
    format!("0x{}{}", "0".repeat(keep), &digits[keep..])
}

/// Unsigned literal fitting in `width` bits.
pub fn uint_value(width: u16, counter: u64) -> String {
    assert!(
        width % 8 == 0 && (8..=256).contains(&width),
        "unsigned integer width {width} is not a multiple of 8 in 8..=256"
    );
    masked_hex(counter, usize::from(width / 4))
}

/// Non-negative literal fitting in `width - 4` bits, so it is representable
/// in the signed type.
pub fn int_value(width: u16, counter: u64) -> String {
    assert!(
        width % 8 == 0 && (8..=256).contains(&width),
        "signed integer width {width} is not a multiple of 8 in 8..=256"
    );
    masked_hex(counter, usize::from(width / 4) - 1)
}

pub fn integer_value(signed: bool, width: u16, counter: u64) -> String {
    if signed {
        int_value(width, counter)
    } else {
        uint_value(width, counter)
    }
}

pub fn address_value(counter: u64) -> String {
    format!("address({})", uint_value(160, counter))
}

/// `hex"..."` literal of exactly `width` bytes.
///
/// A plain 20 byte hex number would be typed as an address, hence the
/// `hex` string form.
pub fn fixed_byte_value(width: u8, counter: u64) -> String {
    assert!(
        (1..=32).contains(&width),
        "fixed byte width {width} is not in 1..=32"
    );
    let nibbles = usize::from(width) * 2;
    let masked = masked_hex(counter, nibbles);
    format!("hex\"{}\"", &masked[masked.len() - nibbles..])
}

/// Quoted hex digits of the hash, used for both `bytes` and `string`.
pub fn dynamic_bytes_value(counter: u64) -> String {
    format!("\"{}\"", hex::encode(hash_counter(counter)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // keccak256("0")
    const HASH_0: &str = "044852b2a670ade5407e78fb2863c51de9fcb96542a07186fe3aeda6bb8a116d";

    #[test]
    fn hash_of_decimal_string() {
        assert_eq!(hex::encode(hash_counter(0)), HASH_0);
    }

    #[test]
    fn counters_are_monotonic() {
        let mut counters = Counters::new();
        assert_eq!(counters.next_name(), "x_0");
        assert_eq!(counters.next_name(), "x_1");
        assert_eq!(counters.variables(), 2);
        assert_eq!(counters.next_check(), 1);
        assert_eq!(counters.next_check(), 2);
        assert_eq!(counters.next_value(), 0);
        assert_eq!(counters.next_value(), 1);
    }

    #[test]
    fn uint8_keeps_two_nibbles() {
        let value = uint_value(8, 0);
        assert_eq!(value.len(), 66);
        assert_eq!(value, format!("0x{}6d", "0".repeat(62)));
    }

    #[test]
    fn int8_keeps_one_nibble() {
        assert_eq!(int_value(8, 0), format!("0x{}d", "0".repeat(63)));
    }

    #[test]
    fn uint256_is_whole_hash() {
        assert_eq!(uint_value(256, 0), format!("0x{HASH_0}"));
    }

    #[test]
    fn address_wraps_160_bits() {
        assert_eq!(
            address_value(0),
            format!("address(0x{}{})", "0".repeat(24), &HASH_0[24..])
        );
    }

    #[test]
    fn fixed_bytes_trailing_digits() {
        assert_eq!(fixed_byte_value(1, 0), "hex\"6d\"");
        assert_eq!(fixed_byte_value(32, 0), format!("hex\"{HASH_0}\""));
        assert_eq!(fixed_byte_value(20, 0).len(), "hex\"\"".len() + 40);
    }

    #[test]
    fn dynamic_bytes_quoted() {
        assert_eq!(dynamic_bytes_value(0), format!("\"{HASH_0}\""));
    }

    #[test]
    fn integer_bit_lengths() {
        for width in (8..=256).step_by(8) {
            for counter in 0..4 {
                let unsigned = uint_value(width, counter);
                let signed = int_value(width, counter);
                let significant = |s: &str| {
                    let digits = s[2..].trim_start_matches('0');
                    digits.len() * 4
                };
                assert!(significant(&unsigned) <= usize::from(width));
                assert!(significant(&signed) <= usize::from(width) - 4);
            }
        }
    }

    #[test]
    #[should_panic]
    fn uint_width_not_multiple_of_8() {
        uint_value(12, 0);
    }

    #[test]
    #[should_panic]
    fn fixed_byte_width_zero() {
        fixed_byte_value(0, 0);
    }
}
