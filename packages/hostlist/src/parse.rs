use tracing::{debug, error};

use crate::coords::{digit_value, from_coords, parse_base36};
use crate::range::write_number;
use crate::{Error, HostListConfig, HostRange, Hostname, MAX_DIMENSIONS};

const SEPARATORS: [char; 3] = [',', ' ', '\t'];

/// A token may carry at most this many bracket groups, e.g. `rack[1-4]_node[0-9]`.
const MAX_BRACKET_GROUPS: usize = 2;

/// One numeric range item from inside a bracket group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Item {
    lo: u64,
    hi: u64,
    width: usize,
}

impl Item {
    fn count(self) -> u64 {
        (self.hi - self.lo).saturating_add(1)
    }
}

/// Parses a [host list][crate] string into ranges in the order they are written.
///
/// Tokens are separated by commas, spaces or tabs outside of brackets. An empty string is valid
/// input and returns no ranges.
pub(crate) fn parse(hosts: &str, config: &HostListConfig) -> crate::Result<Vec<HostRange>> {
    let mut ranges = Vec::new();

    for token in tokens(hosts) {
        parse_token(token, config, &mut ranges)
            .inspect_err(|e| debug!(token, error = %e, "rejected host list token"))?;
    }

    Ok(ranges)
}

/// Turns one complete host name into a range, checking it against the length limit.
pub(crate) fn host_range(name: &str, config: &HostListConfig) -> crate::Result<HostRange> {
    check_length(name, config)?;
    Ok(HostRange::from_hostname(&Hostname::parse(
        name,
        config.dimensions(),
    )))
}

fn check_length(name: &str, config: &HostListConfig) -> crate::Result<()> {
    if name.len() > config.max_hostname_length() {
        return Err(Error::HostnameTooLong {
            invalid_value: name.to_owned(),
            limit: config.max_hostname_length(),
        });
    }

    Ok(())
}

/// Splits the input on separators that are not inside brackets, skipping empty tokens.
fn tokens(hosts: &str) -> impl Iterator<Item = &str> {
    let mut depth = 0_usize;

    hosts
        .split(move |c: char| {
            match c {
                '[' => depth = depth.saturating_add(1),
                ']' => depth = depth.saturating_sub(1),
                _ => {}
            }

            depth == 0 && SEPARATORS.contains(&c)
        })
        .filter(|token| !token.is_empty())
}

/// A token split at its brackets: `literals` has one more entry than `groups`.
#[derive(Debug)]
struct Brackets<'a> {
    literals: Vec<&'a str>,
    groups: Vec<&'a str>,
}

fn split_brackets(token: &str) -> crate::Result<Brackets<'_>> {
    let mut literals = Vec::new();
    let mut groups = Vec::new();
    let mut rest = token;

    while let Some((literal, after_open)) = rest.split_once('[') {
        if literal.contains(']') {
            return Err(Error::invalid_brackets(token, "']' without matching '['"));
        }

        let Some((group, after_close)) = after_open.split_once(']') else {
            return Err(Error::invalid_brackets(token, "'[' is never closed"));
        };

        if group.contains('[') {
            return Err(Error::invalid_brackets(token, "brackets cannot be nested"));
        }

        literals.push(literal);
        groups.push(group);
        rest = after_close;

        if groups.len() > MAX_BRACKET_GROUPS {
            return Err(Error::invalid_brackets(
                token,
                format!("at most {MAX_BRACKET_GROUPS} bracket groups are allowed per host name"),
            ));
        }
    }

    if rest.contains(']') {
        return Err(Error::invalid_brackets(token, "']' without matching '['"));
    }

    literals.push(rest);

    Ok(Brackets { literals, groups })
}

fn parse_token(
    token: &str,
    config: &HostListConfig,
    ranges: &mut Vec<HostRange>,
) -> crate::Result<()> {
    let Brackets { literals, groups } = split_brackets(token)?;

    let Some((&last_group, outer_groups)) = groups.split_last() else {
        ranges.push(host_range(token, config)?);
        return Ok(());
    };

    let (&first_literal, following_literals) = literals
        .split_first()
        .expect("a token always has one more literal than bracket groups");

    let mut stems = vec![first_literal.to_owned()];

    for (&group, &literal) in outer_groups.iter().zip(following_literals) {
        stems = expand(token, &stems, group, literal, config)?;
    }

    let &suffix = following_literals
        .last()
        .expect("a token with a bracket group has a literal after it");

    if suffix.is_empty() {
        // The last group supplies the numeric suffixes of the ranges.
        let items = parse_group(last_group, config)?;

        for stem in &stems {
            for item in &items {
                let mut last_host = stem.clone();
                write_number(&mut last_host, item.hi, item.width, config.dimensions());
                check_length(&last_host, config)?;

                ranges.push(HostRange::new(stem.as_str(), item.lo, item.hi, item.width));
            }
        }
    } else {
        // Text after the last group means every combination is a complete host name.
        for name in expand(token, &stems, last_group, suffix, config)? {
            ranges.push(host_range(&name, config)?);
        }
    }

    Ok(())
}

/// Appends every number of `group` followed by `literal` to every stem.
fn expand(
    token: &str,
    stems: &[String],
    group: &str,
    literal: &str,
    config: &HostListConfig,
) -> crate::Result<Vec<String>> {
    let items = parse_group(group, config)?;

    let per_stem = items
        .iter()
        .fold(0_u64, |acc, item| acc.saturating_add(item.count()));
    let total = per_stem.saturating_mul(u64::try_from(stems.len()).unwrap_or(u64::MAX));

    if total > config.max_prefix_count() {
        error!(
            token,
            count = total,
            limit = config.max_prefix_count(),
            "too many host name prefixes"
        );
        return Err(Error::too_large(token, total, config.max_prefix_count()));
    }

    let dims = config.dimensions();
    let mut expanded = Vec::new();

    for stem in stems {
        for item in &items {
            for number in item.lo..=item.hi {
                let mut name = stem.clone();
                write_number(&mut name, number, item.width, dims);
                name.push_str(literal);
                check_length(&name, config)?;

                expanded.push(name);
            }
        }
    }

    Ok(expanded)
}

/// Parses the comma-separated range items between one pair of brackets.
fn parse_group(group: &str, config: &HostListConfig) -> crate::Result<Vec<Item>> {
    let mut items = Vec::new();

    for part in group.split(',') {
        parse_item(part, config, &mut items)?;

        if items.len() > config.max_ranges() {
            let count = u64::try_from(items.len()).unwrap_or(u64::MAX);
            let limit = u64::try_from(config.max_ranges()).unwrap_or(u64::MAX);

            error!(group, count, limit, "too many ranges in bracket group");
            return Err(Error::too_large(group, count, limit));
        }
    }

    Ok(items)
}

fn parse_item(part: &str, config: &HostListConfig, items: &mut Vec<Item>) -> crate::Result<()> {
    if part.is_empty() {
        return Err(Error::invalid_range(part, "range item is empty"));
    }

    let dims = config.dimensions();

    if dims.count() > 1 {
        if let Some((first, last)) = part.split_once('x') {
            return parse_box(part, first, last, config, items);
        }
    }

    let (lo_digits, hi_digits) = part.split_once('-').unwrap_or((part, part));

    let width = lo_digits.len();
    let coordinates = dims.coordinate_width(width).is_some();

    let lo = parse_number(lo_digits, coordinates, width)?;
    let hi = parse_number(hi_digits, coordinates, width)?;

    if lo > hi {
        return Err(Error::invalid_range(part, "range start must be <= end"));
    }

    let count = (hi - lo).saturating_add(1);
    if count > config.max_range() {
        error!(
            range = part,
            count,
            limit = config.max_range(),
            "too many hosts in range"
        );
        return Err(Error::too_large(part, count, config.max_range()));
    }

    items.push(Item { lo, hi, width });
    Ok(())
}

/// Parses one end of a range item, as base-36 coordinates if `coordinates` is set and as a
/// decimal number otherwise.
fn parse_number(digits: &str, coordinates: bool, width: usize) -> crate::Result<u64> {
    if digits.is_empty() {
        return Err(Error::invalid_range(digits, "expected a number"));
    }

    if coordinates {
        if digits.len() != width {
            return Err(Error::invalid_range(
                digits,
                format!("coordinates must have exactly {width} digits"),
            ));
        }

        return parse_base36(digits)
            .ok_or_else(|| Error::invalid_range(digits, "coordinates must be digits 0-9 or A-Z"));
    }

    if !digits.bytes().all(|c| c.is_ascii_digit()) {
        return Err(Error::invalid_range(digits, "expected a decimal number"));
    }

    // Only overflow remains once every byte is known to be a digit.
    digits.parse().ok().ok_or_else(|| Error::NumberTooLarge {
        invalid_value: digits.to_owned(),
    })
}

/// Parses the box item `first` x `last` and emits one range per sweep of the innermost axis.
fn parse_box(
    part: &str,
    first: &str,
    last: &str,
    config: &HostListConfig,
    items: &mut Vec<Item>,
) -> crate::Result<()> {
    let dims = config.dimensions().count();

    let lo = box_corner(part, first, dims)?;
    let hi = box_corner(part, last, dims)?;

    if lo.iter().zip(&hi).any(|(l, h)| l > h) {
        return Err(Error::invalid_range(
            part,
            "box start must be <= end along every axis",
        ));
    }

    let (outer_lo, inner_lo) = lo.split_at(dims - 1);
    let (outer_hi, inner_hi) = hi.split_at(dims - 1);

    let sweeps = outer_lo
        .iter()
        .zip(outer_hi)
        .map(|(l, h)| usize::from(h - l) + 1)
        .product::<usize>();

    let limit = config.max_ranges();
    if items.len().saturating_add(sweeps) > limit {
        let count = u64::try_from(items.len().saturating_add(sweeps)).unwrap_or(u64::MAX);
        let limit = u64::try_from(limit).unwrap_or(u64::MAX);

        error!(range = part, count, limit, "too many ranges in box");
        return Err(Error::too_large(part, count, limit));
    }

    // Odometer over every axis but the innermost.
    let mut point = [0_u8; MAX_DIMENSIONS];
    point[..dims].copy_from_slice(&lo);

    loop {
        point[dims - 1] = inner_lo[0];
        let sweep_lo = from_coords(&point, dims);
        point[dims - 1] = inner_hi[0];
        let sweep_hi = from_coords(&point, dims);

        items.push(Item {
            lo: sweep_lo,
            hi: sweep_hi,
            width: dims,
        });

        let next_axis = (0..dims - 1).rev().find(|&axis| point[axis] < outer_hi[axis]);

        let Some(axis) = next_axis else {
            return Ok(());
        };

        point[axis] += 1;
        for reset in axis + 1..dims - 1 {
            point[reset] = outer_lo[reset];
        }
    }
}

fn box_corner(part: &str, corner: &str, dims: usize) -> crate::Result<Vec<u8>> {
    if corner.len() != dims {
        return Err(Error::invalid_range(
            part,
            format!("box corners must have exactly {dims} coordinate digits"),
        ));
    }

    corner
        .bytes()
        .map(|c| {
            digit_value(c)
                .ok_or_else(|| Error::invalid_range(part, "coordinates must be digits 0-9 or A-Z"))
        })
        .collect()
}
