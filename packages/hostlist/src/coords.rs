//! Base-36 coordinate tuples used by multi-dimensional (torus) host names.
//!
//! A coordinate suffix such as `0AZ` stores one base-36 digit per axis, most significant axis
//! first. The numeric value of the suffix is the digits read as a base-36 number, so points that
//! differ only in the last axis are numerically adjacent.

use crate::config::MAX_DIMENSIONS;

/// Number of distinct values along each axis.
pub(crate) const BASE: u64 = 36;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A point on the torus, one digit value per axis. Only the first `dims` entries are used.
pub(crate) type Coords = [u8; MAX_DIMENSIONS];

/// Returns the value of a base-36 digit (`0-9`, `A-Z`).
pub(crate) fn digit_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'Z' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Returns the base-36 digit for a value below 36.
pub(crate) fn digit_char(value: u8) -> char {
    char::from(*ALPHABET.get(usize::from(value)).unwrap_or(&b'?'))
}

/// Parses exactly `s.len()` base-36 digits into their numeric value.
pub(crate) fn parse_base36(s: &str) -> Option<u64> {
    s.bytes().try_fold(0_u64, |acc, c| {
        let digit = digit_value(c)?;
        acc.checked_mul(BASE)?.checked_add(u64::from(digit))
    })
}

/// Number of points in a `dims`-dimensional torus.
pub(crate) fn volume(dims: usize) -> u64 {
    (0..dims).fold(1, |acc, _| acc.saturating_mul(BASE))
}

/// Splits a numeric value into `dims` coordinates, most significant axis first.
pub(crate) fn to_coords(mut value: u64, dims: usize) -> Coords {
    let mut coords = Coords::default();

    for slot in coords.iter_mut().take(dims).rev() {
        // Always < 36, so the narrowing is lossless.
        *slot = u8::try_from(value % BASE).unwrap_or_default();
        value /= BASE;
    }

    coords
}

/// Combines `dims` coordinates into their numeric value.
pub(crate) fn from_coords(coords: &Coords, dims: usize) -> u64 {
    coords
        .iter()
        .take(dims)
        .fold(0, |acc, &c| acc * BASE + u64::from(c))
}

/// Appends the `dims`-digit base-36 rendering of `value` to `out`.
pub(crate) fn write_coords(out: &mut String, value: u64, dims: usize) {
    let coords = to_coords(value, dims);
    out.extend(coords.iter().take(dims).map(|&c| digit_char(c)));
}
