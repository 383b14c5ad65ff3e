use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::Write as _;

use crate::coords::write_coords;
use crate::natural::natural_cmp;
use crate::{Dimensions, Hostname};

/// A run of host names sharing one prefix, or a single host name without a numeric suffix.
///
/// A numeric range covers the inclusive interval `lo..=hi`, rendered with the numeric part
/// zero-padded to `width`. A single-host range stands for the host whose whole name is the
/// prefix; its numbers and width carry no meaning.
///
/// # Example
///
/// ```
/// use hostlist::{Dimensions, HostRange};
///
/// let range = HostRange::new("gpu", 1, 8, 3);
/// assert_eq!(range.count(), 8);
/// assert_eq!(range.render(Dimensions::OneD), "gpu[001-008]");
///
/// let login = HostRange::single("login");
/// assert_eq!(login.count(), 1);
/// assert_eq!(login.render(Dimensions::OneD), "login");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HostRange {
    prefix: String,
    lo: u64,
    hi: u64,
    width: usize,
    single_host: bool,
}

/// How the numbers of a range are written.
///
/// Padded ranges order before unpadded ones, narrowest padding first, so that `n[001-099]`
/// sits right before `n[100-128]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Padding {
    /// Zero-padded to this many digits.
    Zeros(usize),

    /// Plain decimal numbers.
    Unpadded,

    /// Coordinate tuples on a multi-dimensional torus.
    Coordinates,
}

impl HostRange {
    /// Creates a numeric range covering `prefix{lo}` to `prefix{hi}` with the numbers padded
    /// to `width` digits.
    ///
    /// # Panics
    ///
    /// Panics if `lo > hi`.
    #[must_use]
    pub fn new(prefix: impl Into<String>, lo: u64, hi: u64, width: usize) -> Self {
        assert!(lo <= hi, "host range start {lo} must be <= end {hi}");

        Self {
            prefix: prefix.into(),
            lo,
            hi,
            width,
            single_host: false,
        }
    }

    /// Creates a range holding the one host whose whole name is `name`.
    #[must_use]
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            prefix: name.into(),
            lo: 0,
            hi: 0,
            width: 0,
            single_host: true,
        }
    }

    pub(crate) fn from_hostname(host: &Hostname) -> Self {
        match host.number() {
            Some(number) => Self::new(host.prefix(), number, number, host.width()),
            None => Self::single(host.name()),
        }
    }

    /// The shared prefix, or the whole host name of a single-host range.
    #[must_use]
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The first number of the range.
    #[must_use]
    #[inline]
    pub fn lo(&self) -> u64 {
        self.lo
    }

    /// The last number of the range (inclusive).
    #[must_use]
    #[inline]
    pub fn hi(&self) -> u64 {
        self.hi
    }

    /// The zero-padded width of the numeric part.
    #[must_use]
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether this range is one host without a numeric suffix.
    #[must_use]
    #[inline]
    pub fn is_single_host(&self) -> bool {
        self.single_host
    }

    /// The number of hosts in the range.
    #[must_use]
    pub fn count(&self) -> u64 {
        if self.is_empty() {
            0
        } else if self.single_host {
            1
        } else {
            (self.hi - self.lo).saturating_add(1)
        }
    }

    /// Whether every host has been removed from the range.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hi < self.lo
    }

    fn clear(&mut self) {
        if self.lo == 0 {
            self.lo = 1;
            self.hi = 0;
        } else {
            self.hi = self.lo - 1;
        }
    }

    /// How the numbers of this range are written.
    ///
    /// A range is classified by its first number, so a padded range that runs past the
    /// largest padded number (`n[098-102]`) only has uniform padding after
    /// [`split_by_padding()`][Self::split_by_padding].
    pub(crate) fn padding(&self, dims: Dimensions) -> Padding {
        if self.single_host {
            Padding::Unpadded
        } else if dims.coordinate_width(self.width).is_some() {
            Padding::Coordinates
        } else if zero_padding(self.lo, self.width) > 0 {
            Padding::Zeros(self.width)
        } else {
            Padding::Unpadded
        }
    }

    /// Splits the range where its numbers stop being zero-padded and gives ranges without
    /// padding the width 1, so that equal host names always have equal numbers, padding and
    /// width.
    ///
    /// Returns this range holding the padded numbers and the range holding the rest, if any.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "the first unpadded number is at least 10"
    )]
    pub(crate) fn split_by_padding(mut self, dims: Dimensions) -> (Self, Option<Self>) {
        match self.padding(dims) {
            Padding::Zeros(width) => {
                let first = first_unpadded(width).filter(|&first| first <= self.hi);

                let Some(first) = first else {
                    return (self, None);
                };

                let mut upper = self.clone();
                upper.lo = first;
                upper.width = 1;
                self.hi = first - 1;

                (self, Some(upper))
            }
            Padding::Unpadded if !self.single_host => {
                self.width = 1;
                (self, None)
            }
            _ => (self, None),
        }
    }

    /// Orders by prefix (natural order), single hosts before numeric ranges, then by padding,
    /// first number, last number and width.
    ///
    /// This is a total order. Ranges with the same prefix and padding end up next to each
    /// other, sorted by number.
    pub(crate) fn normal_cmp(&self, other: &Self, dims: Dimensions) -> Ordering {
        self.prefix_cmp(other)
            .then_with(|| self.padding(dims).cmp(&other.padding(dims)))
            .then_with(|| self.lo.cmp(&other.lo))
            .then_with(|| self.hi.cmp(&other.hi))
            .then_with(|| self.width.cmp(&other.width))
    }

    /// Whether both ranges have the same prefix and padding. Two such ranges that have been
    /// through [`split_by_padding()`][Self::split_by_padding] hold the same host name exactly
    /// when they hold the same number.
    pub(crate) fn same_padding(&self, other: &Self, dims: Dimensions) -> bool {
        self.prefix_cmp(other) == Ordering::Equal && self.padding(dims) == other.padding(dims)
    }

    /// A copy of this range covering `lo..=hi` instead.
    pub(crate) fn with_bounds(&self, lo: u64, hi: u64) -> Self {
        debug_assert!(lo <= hi);

        Self {
            lo,
            hi,
            ..self.clone()
        }
    }

    pub(crate) fn prefix_cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.prefix, &other.prefix)
            .then_with(|| other.single_host.cmp(&self.single_host))
    }

    pub(crate) fn widths_combinable(&self, other: &Self) -> bool {
        combined_widths(self.lo, self.width, other.lo, other.width).is_some()
    }

    /// Unifies the widths of both ranges if that does not change the padded form of either
    /// first number. Returns whether the widths were compatible.
    pub(crate) fn width_combine(&mut self, other: &mut Self) -> bool {
        match combined_widths(self.lo, self.width, other.lo, other.width) {
            Some((a, b)) => {
                self.width = a;
                other.width = b;
                true
            }
            None => false,
        }
    }

    /// Whether both ranges may share one bracket group when rendered.
    pub(crate) fn same_group(&self, other: &Self) -> bool {
        !self.single_host
            && !other.single_host
            && self.prefix_cmp(other) == Ordering::Equal
            && self.widths_combinable(other)
    }

    /// Whether `other` starts right after this range ends, under the same prefix and a
    /// compatible width.
    pub(crate) fn is_followed_by(&self, other: &Self) -> bool {
        !self.single_host
            && self.hi.checked_add(1) == Some(other.lo)
            && self.prefix_cmp(other) == Ordering::Equal
            && self.widths_combinable(other)
    }

    /// Merges `other` into this range if they overlap or touch.
    ///
    /// Returns the number of hosts present in both ranges, or `None` if the ranges cannot be
    /// joined. Two equal single hosts join with one duplicate.
    ///
    /// The widths of both ranges are unified whenever they are combinable, even if the ranges
    /// then turn out not to touch.
    pub(crate) fn join(&mut self, other: &mut Self) -> Option<u64> {
        if self.prefix_cmp(other) != Ordering::Equal || !self.width_combine(other) {
            return None;
        }

        if self.single_host {
            return Some(1);
        }

        let overlap_lo = self.lo.max(other.lo);
        let overlap_hi = self.hi.min(other.hi);

        let duplicates = if overlap_lo <= overlap_hi {
            overlap_hi - overlap_lo + 1
        } else if overlap_hi.checked_add(1) == Some(overlap_lo) {
            0
        } else {
            return None;
        };

        self.lo = self.lo.min(other.lo);
        self.hi = self.hi.max(other.hi);

        Some(duplicates)
    }

    /// Returns the hosts present in both ranges. Single hosts never intersect.
    pub(crate) fn intersect(&self, other: &Self) -> Option<Self> {
        if self.single_host || other.single_host || self.prefix_cmp(other) != Ordering::Equal {
            return None;
        }

        let (width, _) = combined_widths(self.lo, self.width, other.lo, other.width)?;

        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);

        (lo <= hi).then(|| Self {
            prefix: self.prefix.clone(),
            lo,
            hi,
            width,
            single_host: false,
        })
    }

    /// Removes host number `n`, which must be within the range.
    ///
    /// Removing an end shrinks the range in place. Removing an interior host shrinks this range
    /// to the part below `n` and returns the part above `n` as a new range.
    pub(crate) fn delete_host(&mut self, n: u64) -> Option<Self> {
        debug_assert!(self.lo <= n && n <= self.hi);

        if self.lo == self.hi {
            self.clear();
            None
        } else if n == self.lo {
            self.lo += 1;
            None
        } else if n == self.hi {
            self.hi -= 1;
            None
        } else {
            let mut upper = self.clone();
            upper.lo = n + 1;
            self.hi = n - 1;
            Some(upper)
        }
    }

    /// Removes and returns the last host.
    pub(crate) fn pop_last(&mut self, dims: Dimensions) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let name = self.host_name(self.hi, dims);
        self.delete_host(self.hi);
        Some(name)
    }

    /// Removes and returns the first host.
    pub(crate) fn shift_first(&mut self, dims: Dimensions) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let name = self.host_name(self.lo, dims);
        self.delete_host(self.lo);
        Some(name)
    }

    /// Returns the part of the range from the host at `offset` onwards.
    pub(crate) fn tail_from(&self, offset: u64) -> Option<Self> {
        if offset >= self.count() {
            return None;
        }

        let mut tail = self.clone();
        tail.lo = self.lo + offset;
        Some(tail)
    }

    /// Returns the position of `host` within this range, if the range contains it.
    ///
    /// In 1-D clusters a range whose prefix absorbed some leading zeros (`nid0000[2-7]`) still
    /// contains the fully padded names (`nid00003`).
    pub(crate) fn offset_of(&self, host: &Hostname, dims: Dimensions) -> Option<u64> {
        if self.is_empty() {
            return None;
        }

        if self.single_host {
            return (host.name() == self.prefix).then_some(0);
        }

        let mut host = Cow::Borrowed(host);

        if host.prefix() != self.prefix {
            if dims != Dimensions::OneD {
                return None;
            }

            let extra = self
                .prefix
                .len()
                .checked_sub(host.prefix().len())
                .filter(|&extra| extra > 0)?;

            let shifted = host.shift_into_prefix(extra)?;
            if shifted.prefix() != self.prefix {
                return None;
            }

            host = Cow::Owned(shifted);
        }

        let number = host.number()?;
        if number < self.lo || number > self.hi {
            return None;
        }

        combined_widths(self.lo, self.width, number, host.width())?;

        Some(number - self.lo)
    }

    /// The name of the host at `offset` within the range.
    pub(crate) fn host_at(&self, offset: u64, dims: Dimensions) -> String {
        self.host_name(self.lo.saturating_add(offset), dims)
    }

    fn host_name(&self, number: u64, dims: Dimensions) -> String {
        let mut name = self.prefix.clone();

        if !self.single_host {
            write_number(&mut name, number, self.width, dims);
        }

        name
    }

    /// Appends `lo` or `lo-hi` with padding reduced by `zero_pad` digits that the caller
    /// already wrote into the prefix. Single hosts have no numeric part.
    pub(crate) fn write_numeric(&self, out: &mut String, dims: Dimensions, zero_pad: usize) {
        if self.single_host || self.is_empty() {
            return;
        }

        let width = self.width.saturating_sub(zero_pad);
        let coordinate_width = dims.coordinate_width(self.width);

        let write = |out: &mut String, value: u64| match coordinate_width {
            Some(n) => write_coords(out, value, n),
            None => write_padded(out, value, width),
        };

        write(out, self.lo);
        if self.hi > self.lo {
            out.push('-');
            write(out, self.hi);
        }
    }

    /// Renders the range on its own: `prefix`, `prefix7` or `prefix[7-9]`.
    #[must_use]
    pub fn render(&self, dims: Dimensions) -> String {
        let mut out = self.prefix.clone();

        if self.single_host || self.is_empty() {
            return out;
        }

        if self.count() == 1 {
            self.write_numeric(&mut out, dims, 0);
        } else {
            out.push('[');
            self.write_numeric(&mut out, dims, 0);
            out.push(']');
        }

        out
    }
}

/// Appends `number` to `out`, as a coordinate tuple if `width` matches a multi-dimensional
/// torus and as a zero-padded decimal otherwise.
pub(crate) fn write_number(out: &mut String, number: u64, width: usize, dims: Dimensions) {
    match dims.coordinate_width(width) {
        Some(n) => write_coords(out, number, n),
        None => write_padded(out, number, width),
    }
}

fn write_padded(out: &mut String, number: u64, width: usize) {
    // Writing to a String cannot fail.
    _ = write!(out, "{number:0width$}");
}

/// Number of zeros needed to pad `number` to `width` digits.
pub(crate) fn zero_padding(number: u64, width: usize) -> usize {
    width.saturating_sub(decimal_digits(number))
}

fn decimal_digits(number: u64) -> usize {
    number.checked_ilog10().map_or(1, |log| log as usize + 1)
}

/// The smallest number that `width` digits write without zero padding.
fn first_unpadded(width: usize) -> Option<u64> {
    let exponent = u32::try_from(width.checked_sub(1)?).ok()?;
    10_u64.checked_pow(exponent)
}

/// Decides whether values `n` (written with width `wn`) and `m` (written with width `wm`) can
/// share one width without changing the zero padding either value was written with.
///
/// Returns the widths to use for `n` and `m`, which are then equal, or `None` if neither value
/// tolerates the other's width.
fn combined_widths(n: u64, wn: usize, m: u64, wm: usize) -> Option<(usize, usize)> {
    if wn == wm {
        return Some((wn, wm));
    }

    let n_keeps_padding = zero_padding(n, wn) == zero_padding(n, wm);
    let m_keeps_padding = zero_padding(m, wm) == zero_padding(m, wn);

    if !n_keeps_padding && !m_keeps_padding {
        None
    } else if !n_keeps_padding {
        Some((wn, wn))
    } else {
        Some((wm, wm))
    }
}
