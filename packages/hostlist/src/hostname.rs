use crate::Dimensions;
use crate::coords::{digit_value, parse_base36};

/// A single host name split into a prefix and an optional numeric suffix.
///
/// In plain (1-D) clusters the suffix is the longest trailing run of decimal digits:
/// `node017` splits into prefix `node`, number 17 and width 3. The width records the suffix
/// exactly as written so that `node01` and `node001` stay distinct.
///
/// In multi-dimensional clusters the suffix is the trailing N characters if the name is longer
/// than N and all of them are base-36 digits (`0-9`, `A-Z`). Otherwise the decimal rule applies.
///
/// A name without a usable suffix, including one whose decimal suffix does not fit in 64 bits,
/// is all prefix.
///
/// # Example
///
/// ```
/// use hostlist::{Dimensions, Hostname};
///
/// let name = Hostname::parse("node017", Dimensions::OneD);
/// assert_eq!(name.prefix(), "node");
/// assert_eq!(name.number(), Some(17));
/// assert_eq!(name.width(), 3);
///
/// let bare = Hostname::parse("login", Dimensions::OneD);
/// assert_eq!(bare.prefix(), "login");
/// assert_eq!(bare.number(), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hostname {
    name: String,

    /// Byte offset where the suffix starts; equals `name.len()` if there is no suffix.
    split: usize,

    number: Option<u64>,
}

impl Hostname {
    /// Decomposes a host name according to the given dimensionality.
    #[must_use]
    pub fn parse(name: &str, dims: Dimensions) -> Self {
        let (split, number) = decompose(name, dims).unwrap_or((name.len(), None));

        Self {
            name: name.to_owned(),
            split,
            number,
        }
    }

    /// The complete host name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The part of the name before the numeric suffix, or the whole name if there is no suffix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.name.get(..self.split).unwrap_or(&self.name)
    }

    /// The numeric suffix as written, if any.
    #[must_use]
    pub fn suffix(&self) -> Option<&str> {
        self.number.and(self.name.get(self.split..))
    }

    /// The value of the numeric suffix, if any.
    #[must_use]
    #[inline]
    pub fn number(&self) -> Option<u64> {
        self.number
    }

    /// The number of characters in the numeric suffix, or zero if there is none.
    #[must_use]
    pub fn width(&self) -> usize {
        self.suffix().map_or(0, str::len)
    }

    /// Moves the first `count` suffix characters into the prefix and re-reads the remainder
    /// as a decimal number. Returns `None` if the suffix is not long enough or is not decimal.
    pub(crate) fn shift_into_prefix(&self, count: usize) -> Option<Self> {
        let suffix = self.suffix()?;
        if suffix.len() < count {
            return None;
        }

        let split = self.split.checked_add(count)?;
        let rest = self.name.get(split..)?;

        let number = if rest.is_empty() {
            None
        } else {
            Some(parse_decimal(rest)?)
        };

        Some(Self {
            name: self.name.clone(),
            split,
            number,
        })
    }
}

fn decompose(name: &str, dims: Dimensions) -> Option<(usize, Option<u64>)> {
    let bytes = name.as_bytes();

    if let Dimensions::MultiD(_) = dims {
        let n = dims.count();

        if bytes.len() > n {
            let split = bytes.len() - n;
            let tail = name.get(split..)?;

            if tail.bytes().all(|c| digit_value(c).is_some()) {
                return Some((split, Some(parse_base36(tail)?)));
            }
        }
    }

    let digits = bytes.iter().rev().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }

    let split = bytes.len() - digits;
    let suffix = name.get(split..)?;

    // A suffix exactly as wide as the torus is a coordinate tuple even without a prefix.
    let number = if dims.coordinate_width(digits).is_some() {
        parse_base36(suffix)?
    } else {
        parse_decimal(suffix)?
    };

    Some((split, Some(number)))
}

fn parse_decimal(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn decimal_suffix() {
        let name = Hostname::parse("node001", Dimensions::OneD);
        assert_eq!(name.name(), "node001");
        assert_eq!(name.prefix(), "node");
        assert_eq!(name.suffix(), Some("001"));
        assert_eq!(name.number(), Some(1));
        assert_eq!(name.width(), 3);
    }

    #[test]
    fn width_is_preserved_as_written() {
        assert_eq!(Hostname::parse("node01", Dimensions::OneD).width(), 2);
        assert_eq!(Hostname::parse("node001", Dimensions::OneD).width(), 3);
        assert_eq!(Hostname::parse("node10", Dimensions::OneD).width(), 2);
    }

    #[test]
    fn no_suffix() {
        let name = Hostname::parse("login", Dimensions::OneD);
        assert_eq!(name.prefix(), "login");
        assert_eq!(name.suffix(), None);
        assert_eq!(name.number(), None);
        assert_eq!(name.width(), 0);

        // Digits followed by non-digits do not form a suffix.
        let name = Hostname::parse("n1.ib", Dimensions::OneD);
        assert_eq!(name.prefix(), "n1.ib");
        assert_eq!(name.number(), None);
    }

    #[test]
    fn all_digits_has_empty_prefix() {
        let name = Hostname::parse("42", Dimensions::OneD);
        assert_eq!(name.prefix(), "");
        assert_eq!(name.number(), Some(42));
    }

    #[test]
    fn overflowing_suffix_is_all_prefix() {
        let name = Hostname::parse("n123456789012345678901234567890", Dimensions::OneD);
        assert_eq!(name.prefix(), "n123456789012345678901234567890");
        assert_eq!(name.number(), None);
    }

    #[test]
    fn coordinate_suffix() {
        let name = Hostname::parse("bg0AZ", Dimensions::MultiD(3));
        assert_eq!(name.prefix(), "bg");
        assert_eq!(name.suffix(), Some("0AZ"));
        assert_eq!(name.number(), Some(10 * 36 + 35));
        assert_eq!(name.width(), 3);
    }

    #[test]
    fn coordinate_suffix_falls_back_to_decimal() {
        // Lower case is not a base-36 digit, so only the decimal digits form a suffix.
        let name = Hostname::parse("bgxa12", Dimensions::MultiD(3));
        assert_eq!(name.prefix(), "bgxa");
        assert_eq!(name.number(), Some(12));
        assert_eq!(name.width(), 2);

        // Bare coordinates without a prefix are still coordinates.
        let name = Hostname::parse("012", Dimensions::MultiD(3));
        assert_eq!(name.prefix(), "");
        assert_eq!(name.number(), Some(38));

        // Longer all-digit names take the trailing coordinate tuple.
        let name = Hostname::parse("1234", Dimensions::MultiD(3));
        assert_eq!(name.prefix(), "1");
        assert_eq!(name.number(), Some(2 * 36 * 36 + 3 * 36 + 4));
    }

    #[test]
    fn shift_into_prefix_moves_leading_digits() {
        let name = Hostname::parse("nid00003", Dimensions::OneD);
        let shifted = name.shift_into_prefix(4).unwrap();
        assert_eq!(shifted.prefix(), "nid0000");
        assert_eq!(shifted.number(), Some(3));
        assert_eq!(shifted.width(), 1);

        assert!(name.shift_into_prefix(6).is_none());
    }
}
