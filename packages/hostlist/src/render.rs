use std::borrow::Cow;
use std::iter::repeat_n;

use itertools::Itertools;

use crate::range::zero_padding;
use crate::{Dimensions, Error, HostListConfig, HostRange, grid};

/// Renders ranges in compressed form: `node[1-3,5],login`.
///
/// On a multi-dimensional torus, a list whose ranges all share one prefix and are written as
/// full coordinate tuples renders as bounding boxes instead: `bg[000x133]`.
pub(crate) fn ranged(ranges: &[HostRange], config: &HostListConfig) -> String {
    if let Dimensions::MultiD(n) = config.dimensions() {
        if let Some(prefix) = common_prefix(ranges) {
            let dims = usize::from(n);

            if grid::fits(ranges, dims) {
                return grid::render_boxes(prefix, ranges, dims);
            }
        }
    }

    let factor = config.factor_zero_padding() && config.dimensions() == Dimensions::OneD;

    let mut out = String::new();
    let mut rest = ranges;

    while let Some((first, _)) = rest.split_first() {
        // Consecutive ranges whose numbers can share one bracket group.
        let group_len = 1 + rest
            .iter()
            .tuple_windows()
            .take_while(|(prev, next)| prev.same_group(next))
            .count();

        let (group, remainder) = rest.split_at(group_len);
        rest = remainder;

        if !out.is_empty() {
            out.push(',');
        }

        write_group(&mut out, first, group, config.dimensions(), factor);
    }

    out
}

fn write_group(
    out: &mut String,
    first: &HostRange,
    group: &[HostRange],
    dims: Dimensions,
    factor: bool,
) {
    out.push_str(first.prefix());

    if first.is_single_host() {
        return;
    }

    let zero_pad = if factor {
        group
            .iter()
            .map(|range| zero_padding(range.hi(), range.width()))
            .min()
            .unwrap_or_default()
    } else {
        0
    };

    out.extend(repeat_n('0', zero_pad));

    let brackets = group.len() > 1 || first.count() > 1;

    if brackets {
        out.push('[');
    }

    // Sorting splits `n[098-102]` where the padding ends; such pieces are written as one item.
    let items = group.iter().map(Cow::Borrowed).coalesce(|prev, next| {
        if prev.is_followed_by(&next) {
            let mut item = prev.into_owned();
            item.join(&mut next.into_owned());
            Ok(Cow::Owned(item))
        } else {
            Err((prev, next))
        }
    });

    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push(',');
        }
        item.write_numeric(out, dims, zero_pad);
    }

    if brackets {
        out.push(']');
    }
}

/// The prefix shared by every range, or `None` if the prefixes differ or there are no ranges.
fn common_prefix(ranges: &[HostRange]) -> Option<&str> {
    let (first, rest) = ranges.split_first()?;

    rest.iter()
        .all(|range| range.prefix() == first.prefix())
        .then_some(first.prefix())
}

/// Renders every host separately: `node1,node2,node3,node5,login`.
pub(crate) fn deranged(ranges: &[HostRange], dims: Dimensions) -> String {
    ranges
        .iter()
        .flat_map(|range| (0..range.count()).map(move |offset| range.host_at(offset, dims)))
        .join(",")
}

/// Copies `rendered` into `buf` followed by a NUL byte. Returns the length of `rendered`.
///
/// If `buf` is too small, it receives as much of `rendered` as fits followed by a NUL byte.
pub(crate) fn write_truncated(rendered: &str, buf: &mut [u8]) -> crate::Result<usize> {
    let bytes = rendered.as_bytes();
    let required = bytes.len().saturating_add(1);
    let available = buf.len();

    let Some((terminator, head)) = buf.split_last_mut() else {
        return Err(Error::Truncated {
            required,
            available,
        });
    };

    let copied = head.len().min(bytes.len());
    head.iter_mut()
        .zip(bytes)
        .for_each(|(dest, &src)| *dest = src);

    if copied == bytes.len() {
        if let Some(nul) = head.get_mut(copied) {
            *nul = 0;
        } else {
            *terminator = 0;
        }
        return Ok(copied);
    }

    *terminator = 0;
    Err(Error::Truncated {
        required,
        available,
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn one_d() -> HostListConfig {
        HostListConfig::default()
    }

    #[test]
    fn groups_share_brackets() {
        let ranges = [
            HostRange::new("a", 1, 3, 1),
            HostRange::new("a", 5, 5, 1),
            HostRange::single("login"),
            HostRange::new("b", 7, 7, 1),
        ];

        assert_eq!(ranged(&ranges, &one_d()), "a[1-3,5],login,b7");
    }

    #[test]
    fn incompatible_widths_split_groups() {
        let ranges = [HostRange::new("n", 1, 9, 1), HostRange::new("n", 2, 2, 2)];
        assert_eq!(ranged(&ranges, &one_d()), "n[1-9],n02");
    }

    #[test]
    fn padding_is_kept() {
        let ranges = [HostRange::new("node", 8, 12, 2)];
        assert_eq!(ranged(&ranges, &one_d()), "node[08-12]");
        assert_eq!(
            deranged(&ranges, Dimensions::OneD),
            "node08,node09,node10,node11,node12"
        );
    }

    #[test]
    fn touching_pieces_share_one_item() {
        let ranges = [
            HostRange::new("node", 1, 99, 3),
            HostRange::new("node", 100, 128, 1),
            HostRange::new("node", 130, 131, 1),
        ];
        assert_eq!(ranged(&ranges, &one_d()), "node[001-128,130-131]");

        // A shared boundary host is a duplicate, not a continuation.
        let ranges = [HostRange::new("n", 1, 3, 1), HostRange::new("n", 3, 4, 1)];
        assert_eq!(ranged(&ranges, &one_d()), "n[1-3,3-4]");
    }

    #[test]
    fn empty_renders_empty() {
        assert_eq!(ranged(&[], &one_d()), "");
        assert_eq!(deranged(&[], Dimensions::OneD), "");
    }

    #[test]
    fn zero_padding_factored_when_enabled() {
        let ranges = [HostRange::new("nid", 3, 7, 5), HostRange::new("nid", 9, 9, 5)];
        let config = HostListConfig::builder().factor_zero_padding(true).build();

        assert_eq!(ranged(&ranges, &config), "nid0000[3-7,9]");
        assert_eq!(ranged(&ranges, &one_d()), "nid[00003-00007,00009]");

        let ranges = [HostRange::new("nid", 8, 12, 5)];
        assert_eq!(ranged(&ranges, &config), "nid000[08-12]");
    }

    #[test]
    fn torus_boxes() {
        let config = HostListConfig::builder().dimensions(3).build();

        let ranges = [HostRange::new("bg", 38, 39, 3)];
        assert_eq!(ranged(&ranges, &config), "bg[012x013]");

        // Mixed prefixes fall back to coordinate ranges.
        let ranges = [HostRange::new("bg", 38, 39, 3), HostRange::single("login")];
        assert_eq!(ranged(&ranges, &config), "bg[012-013],login");
    }

    #[test]
    fn write_truncated_fits_exactly() {
        let mut buf = [0xFF_u8; 4];
        assert_eq!(write_truncated("abc", &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"abc\0");
    }

    #[test]
    fn write_truncated_too_small() {
        let mut buf = [0xFF_u8; 3];
        let error = write_truncated("abc", &mut buf).unwrap_err();

        assert!(matches!(
            error,
            Error::Truncated {
                required: 4,
                available: 3
            }
        ));
        assert_eq!(&buf, b"ab\0");

        let mut empty = [0_u8; 0];
        assert!(write_truncated("", &mut empty).is_err());

        let mut one = [0xFF_u8; 1];
        assert_eq!(write_truncated("", &mut one).unwrap(), 0);
        assert_eq!(one, [0]);
    }
}
