//! Natural-order string comparison: embedded digit runs compare by numeric value, so `rack2`
//! sorts before `rack10`.

use std::cmp::Ordering;

/// Compares two strings in natural order.
///
/// Digit runs compare by value; runs of equal value compare by length so that the one with
/// fewer leading zeros comes first. All other bytes compare by value. Two strings compare
/// equal only if they are byte-for-byte identical.
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    // Tie-breaker from leading zeros, applied only if everything else is equal.
    let mut zeros_order = Ordering::Equal;

    while let (Some(&ca), Some(&cb)) = (a.get(i), b.get(j)) {
        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let run_a = digit_run(a, i);
            let run_b = digit_run(b, j);
            i += run_a.len();
            j += run_b.len();

            let value_a = strip_leading_zeros(run_a);
            let value_b = strip_leading_zeros(run_b);

            let order = value_a
                .len()
                .cmp(&value_b.len())
                .then_with(|| value_a.cmp(value_b));
            if order != Ordering::Equal {
                return order;
            }

            if zeros_order == Ordering::Equal {
                zeros_order = run_a.len().cmp(&run_b.len());
            }
        } else {
            if ca != cb {
                return ca.cmp(&cb);
            }
            i += 1;
            j += 1;
        }
    }

    let remaining_a = a.len().saturating_sub(i);
    let remaining_b = b.len().saturating_sub(j);

    remaining_a.cmp(&remaining_b).then(zeros_order)
}

fn digit_run(s: &[u8], start: usize) -> &[u8] {
    let tail = s.get(start..).unwrap_or_default();
    let len = tail.iter().take_while(|c| c.is_ascii_digit()).count();
    tail.get(..len).unwrap_or_default()
}

fn strip_leading_zeros(digits: &[u8]) -> &[u8] {
    let zeros = digits.iter().take_while(|&&c| c == b'0').count();
    digits.get(zeros..).unwrap_or_default()
}
