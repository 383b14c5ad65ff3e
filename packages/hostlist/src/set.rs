use std::cmp::Ordering;
use std::str::FromStr;
use std::{fmt, iter};

use crate::list::Inner;
use crate::{Dimensions, HostList, HostListConfig, HostListIter, HostRange, Hostname, parse};

/// A sorted collection of unique host names.
///
/// A host set keeps its ranges in sorted order and merges overlapping ranges as hosts are
/// inserted, so every host appears at most once. It is otherwise a [`HostList`] and shares its
/// locking and iteration behavior.
///
/// # Example
///
/// ```
/// use hostlist::HostSet;
///
/// let set = HostSet::parse("node[5-8]").unwrap();
///
/// assert_eq!(set.insert("node[1-6],login").unwrap(), 5);
/// assert_eq!(set.ranged_string(), "login,node[1-8]");
///
/// assert!(set.within("node[2-3]").unwrap());
/// assert!(!set.within("node[8-9]").unwrap());
/// ```
#[derive(Clone, Debug, Default)]
pub struct HostSet {
    list: HostList,
}

impl HostSet {
    /// Creates an empty host set with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty host set with the given configuration.
    #[must_use]
    pub fn with_config(config: HostListConfig) -> Self {
        Self {
            list: HostList::with_config(config),
        }
    }

    /// Parses a ranged host list string into a set with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid host list or exceeds a configured limit.
    pub fn parse(hosts: &str) -> crate::Result<Self> {
        Self::parse_with_config(hosts, HostListConfig::default())
    }

    /// Parses a ranged host list string into a set with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid host list or exceeds a configured limit.
    pub fn parse_with_config(hosts: &str, config: HostListConfig) -> crate::Result<Self> {
        let set = Self::with_config(config);
        set.insert(hosts)?;
        Ok(set)
    }

    /// Inserts every host in `hosts` that is not already present. Returns the number of hosts
    /// added.
    ///
    /// # Errors
    ///
    /// Returns an error if `hosts` cannot be parsed, in which case the set is unchanged.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "joining ranges never drops hosts that were present before"
    )]
    pub fn insert(&self, hosts: &str) -> crate::Result<u64> {
        let incoming = HostList::parse_with_config(hosts, self.list.config())?;
        incoming.uniq();

        let mut inner = self.list.lock();
        let before = inner.count;

        for range in incoming.ranges() {
            insert_sorted(&mut inner, range);
        }

        Ok(inner.count - before)
    }

    /// Removes every host in `hosts`. Returns the number of hosts removed.
    ///
    /// # Errors
    ///
    /// Returns an error if `hosts` cannot be parsed, in which case the set is unchanged.
    pub fn delete(&self, hosts: &str) -> crate::Result<u64> {
        self.list.delete(hosts)
    }

    /// Whether every host in `hosts` is in the set.
    ///
    /// # Errors
    ///
    /// Returns an error if `hosts` cannot be parsed.
    pub fn within(&self, hosts: &str) -> crate::Result<bool> {
        self.probe(hosts, true)
    }

    /// Whether any host in `hosts` is in the set.
    ///
    /// # Errors
    ///
    /// Returns an error if `hosts` cannot be parsed.
    pub fn intersects(&self, hosts: &str) -> crate::Result<bool> {
        self.probe(hosts, false)
    }

    /// Looks up every host in `hosts`, requiring all of them to be present if `require_all` is
    /// set and any one of them otherwise.
    fn probe(&self, hosts: &str, require_all: bool) -> crate::Result<bool> {
        let config = self.list.config();
        let dims = config.dimensions();
        let ranges = parse::parse(hosts, &config)?;

        let inner = self.list.lock();

        let mut names = ranges.iter().flat_map(|range| {
            (0..range.count()).map(move |offset| Hostname::parse(&range.host_at(offset, dims), dims))
        });

        let present = |host: Hostname| inner.find_host(&host).is_some();

        Ok(if require_all {
            names.all(present)
        } else {
            names.any(present)
        })
    }

    /// Returns a new set holding the hosts present in both sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let theirs = other.list.ranges();
        let result = Self::with_config(self.list.config());

        {
            let ours = self.list.lock();
            let mut common = result.list.lock();

            for a in &ours.ranges {
                for b in &theirs {
                    let shared = if a.is_single_host() {
                        (a == b).then(|| a.clone())
                    } else {
                        a.intersect(b)
                    };

                    if let Some(range) = shared {
                        insert_sorted(&mut common, range);
                    }
                }
            }
        }

        result
    }

    /// Returns the position of `name` in sorted order, counting hosts from zero.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<u64> {
        self.list.find(name)
    }

    /// Returns the host at position `n` in sorted order, counting from zero.
    #[must_use]
    pub fn nth(&self, n: u64) -> Option<String> {
        self.list.nth(n)
    }

    /// The number of hosts in the set.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.list.count()
    }

    /// Whether the set holds no hosts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Removes the host at position `n` in sorted order. Returns whether it existed.
    pub fn delete_nth(&self, n: u64) -> bool {
        self.list.delete_nth(n)
    }

    /// Removes the host `name`. Returns whether it was present.
    pub fn delete_host(&self, name: &str) -> bool {
        self.list.delete_host(name)
    }

    /// Removes and returns the last host.
    pub fn pop(&self) -> Option<String> {
        self.list.pop()
    }

    /// Removes the last bracket group and returns it as a ranged string.
    pub fn pop_range(&self) -> Option<String> {
        self.list.pop_range()
    }

    /// Removes and returns the first host.
    pub fn shift(&self) -> Option<String> {
        self.list.shift()
    }

    /// Removes the first bracket group and returns it as a ranged string.
    pub fn shift_range(&self) -> Option<String> {
        self.list.shift_range()
    }

    /// Renders the set in compressed form.
    #[must_use]
    pub fn ranged_string(&self) -> String {
        self.list.ranged_string()
    }

    /// Renders every host separately.
    #[must_use]
    pub fn deranged_string(&self) -> String {
        self.list.deranged_string()
    }

    /// Writes the compressed form into `buf` followed by a NUL byte. Returns the length of the
    /// string, excluding the NUL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Truncated`][crate::Error::Truncated] if `buf` is too small.
    pub fn write_ranged(&self, buf: &mut [u8]) -> crate::Result<usize> {
        self.list.write_ranged(buf)
    }

    /// Returns an iterator over the hosts in sorted order.
    #[must_use]
    pub fn iter(&self) -> HostListIter<'_> {
        self.list.iter()
    }

    /// The underlying host list, for reading.
    ///
    /// Adding hosts through the list skips the set's ordering and merging, after which the
    /// set may hold a host twice. Use [`insert()`][Self::insert] instead.
    #[must_use]
    pub fn as_list(&self) -> &HostList {
        &self.list
    }
}

/// Inserts `range` at its sorted position and merges it with every neighbor it overlaps or
/// touches.
///
/// The set keeps its ranges split by padding and ordered by [`HostRange::normal_cmp`], so
/// every range holding a host of `range` has the same prefix and padding and sits next to it.
fn insert_sorted(inner: &mut Inner, range: HostRange) {
    let dims = inner.config.dimensions();
    let (range, upper) = range.split_by_padding(dims);

    for part in iter::once(range).chain(upper) {
        insert_uniform(inner, part, dims);
    }
}

#[expect(
    clippy::arithmetic_side_effects,
    reason = "the host count cannot exceed the u64 range of host numbers"
)]
fn insert_uniform(inner: &mut Inner, range: HostRange, dims: Dimensions) {
    let index = inner
        .ranges
        .partition_point(|existing| existing.normal_cmp(&range, dims) == Ordering::Less);

    inner.count += range.count();
    inner.insert_range(index, range);

    while join_same_padding(inner, index, dims) {}

    if let Some(prev) = index.checked_sub(1) {
        while join_same_padding(inner, prev, dims) {}
    }
}

/// Joins `ranges[index + 1]` into `ranges[index]` if both have the same padding and overlap or
/// touch.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "index + 1 is only used to look up a range"
)]
fn join_same_padding(inner: &mut Inner, index: usize, dims: Dimensions) -> bool {
    let same = match (inner.ranges.get(index), inner.ranges.get(index + 1)) {
        (Some(range), Some(next)) => range.same_padding(next, dims),
        _ => false,
    };

    same && inner.join_with_next(index).is_some()
}

impl<'a> IntoIterator for &'a HostSet {
    type Item = String;
    type IntoIter = HostListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for HostSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.list, f)
    }
}

impl FromStr for HostSet {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
