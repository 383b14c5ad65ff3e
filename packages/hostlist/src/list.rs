use std::any::type_name;
use std::cmp::Ordering;
use std::str::FromStr;
use std::{fmt, iter, mem};

use foldhash::{HashMap, HashMapExt};
use itertools::Itertools;
use parking_lot::{Mutex, MutexGuard};
use tracing::trace;

use crate::{HostListConfig, HostListIter, HostRange, Hostname, parse, render};

/// An ordered collection of host names, stored as compressed ranges.
///
/// A host list keeps the order in which hosts were added and permits duplicates. Use
/// [`sort()`][Self::sort] to order and coalesce it, [`uniq()`][Self::uniq] to also remove
/// duplicates, or a [`HostSet`][crate::HostSet] to keep it unique at all times.
///
/// # Thread safety
///
/// Every operation takes `&self` and holds the list's own lock for its duration, so one list
/// can be shared between threads. Iterators created by [`iter()`][Self::iter] stay valid while
/// the list is modified; their positions are adjusted by each mutation.
///
/// # Example
///
/// ```
/// use hostlist::HostList;
///
/// let hosts = HostList::parse("node[1-3],login,node[4-6]").unwrap();
/// assert_eq!(hosts.count(), 7);
/// assert_eq!(hosts.ranged_string(), "node[1-3],login,node[4-6]");
///
/// hosts.sort();
/// assert_eq!(hosts.ranged_string(), "login,node[1-6]");
/// ```
pub struct HostList {
    inner: Mutex<Inner>,
}

/// Position of an iterator within the range array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub(crate) index: usize,

    /// Offset within `ranges[index]` of the host most recently returned; `None` before the
    /// first host of that range.
    pub(crate) depth: Option<u64>,
}

#[derive(Debug)]
pub(crate) struct Inner {
    pub(crate) config: HostListConfig,
    pub(crate) ranges: Vec<HostRange>,

    /// Sum of `count()` over `ranges`.
    pub(crate) count: u64,

    cursors: HashMap<u64, Cursor>,
    next_cursor_id: u64,
}

impl HostList {
    /// Creates an empty host list with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HostListConfig::default())
    }

    /// Creates an empty host list with the given configuration.
    #[must_use]
    pub fn with_config(config: HostListConfig) -> Self {
        Self {
            inner: Mutex::new(Inner::new(config)),
        }
    }

    /// Parses a ranged host list string such as `node[1-4,7],login` with the default
    /// configuration.
    ///
    /// An empty string yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid host list or exceeds a configured limit.
    pub fn parse(hosts: &str) -> crate::Result<Self> {
        Self::parse_with_config(hosts, HostListConfig::default())
    }

    /// Parses a ranged host list string with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid host list or exceeds a configured limit.
    /// No list is created in that case.
    pub fn parse_with_config(hosts: &str, config: HostListConfig) -> crate::Result<Self> {
        let list = Self::with_config(config);
        list.push(hosts)?;
        Ok(list)
    }

    /// The configuration the list was created with.
    #[must_use]
    pub fn config(&self) -> HostListConfig {
        self.inner.lock().config
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock()
    }

    /// Parses `hosts` and appends every host in it. Returns the number of hosts added.
    ///
    /// # Errors
    ///
    /// Returns an error if `hosts` cannot be parsed, in which case the list is unchanged.
    pub fn push(&self, hosts: &str) -> crate::Result<u64> {
        let config = self.config();
        let ranges = parse::parse(hosts, &config)?;

        let mut inner = self.inner.lock();
        Ok(ranges.into_iter().map(|range| inner.push_range(range)).sum())
    }

    /// Appends one host name. Returns the number of hosts in the list afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is longer than the configured maximum.
    pub fn push_host(&self, name: &str) -> crate::Result<u64> {
        let config = self.config();
        let range = parse::host_range(name, &config)?;

        let mut inner = self.inner.lock();
        inner.push_range(range);
        Ok(inner.count)
    }

    /// Appends a range, extending the last range instead if the new one continues it.
    /// Returns the number of hosts in the list afterwards.
    pub fn push_range(&self, range: HostRange) -> u64 {
        let mut inner = self.inner.lock();
        inner.push_range(range);
        inner.count
    }

    /// Appends every host of `other`. Returns the number of hosts added.
    ///
    /// `other` is only locked while its ranges are copied, so a list may be pushed onto itself.
    pub fn push_list(&self, other: &Self) -> u64 {
        let ranges = other.inner.lock().ranges.clone();

        let mut inner = self.inner.lock();
        ranges
            .into_iter()
            .map(|range| inner.push_range(range))
            .sum()
    }

    /// Removes and returns the last host.
    pub fn pop(&self) -> Option<String> {
        self.inner.lock().pop()
    }

    /// Removes and returns the first host.
    pub fn shift(&self) -> Option<String> {
        self.inner.lock().shift()
    }

    /// Removes the last range, together with every preceding range that would share its
    /// bracket group, and returns them as a ranged string.
    pub fn pop_range(&self) -> Option<String> {
        self.inner.lock().pop_range()
    }

    /// Removes the first range, together with every following range that would share its
    /// bracket group, and returns them as a ranged string.
    pub fn shift_range(&self) -> Option<String> {
        self.inner.lock().shift_range()
    }

    /// Returns the position of the first occurrence of `name`, counting hosts from zero.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<u64> {
        self.inner.lock().find(name)
    }

    /// Returns the host at position `n`, counting from zero.
    #[must_use]
    pub fn nth(&self, n: u64) -> Option<String> {
        self.inner.lock().nth(n)
    }

    /// Removes the first occurrence of every host named in `hosts`. Returns the number of
    /// hosts removed.
    ///
    /// # Errors
    ///
    /// Returns an error if `hosts` cannot be parsed, in which case the list is unchanged.
    pub fn delete(&self, hosts: &str) -> crate::Result<u64> {
        let config = self.config();
        let targets = parse::parse(hosts, &config)?;

        let mut inner = self.inner.lock();
        Ok(inner.delete_all(&targets))
    }

    /// Removes the first occurrence of `name`. Returns whether it was found.
    pub fn delete_host(&self, name: &str) -> bool {
        self.inner.lock().delete_host(name)
    }

    /// Removes the host at position `n`. Returns whether the position existed.
    pub fn delete_nth(&self, n: u64) -> bool {
        self.inner.lock().delete_nth(n)
    }

    /// The number of hosts, counting duplicates.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.inner.lock().count
    }

    /// Whether the list holds no hosts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().count == 0
    }

    /// The number of ranges the hosts are stored in.
    #[must_use]
    pub fn range_count(&self) -> usize {
        self.inner.lock().ranges.len()
    }

    /// A snapshot of the ranges the hosts are stored in.
    #[must_use]
    pub fn ranges(&self) -> Vec<HostRange> {
        self.inner.lock().ranges.clone()
    }

    /// Sorts the hosts and merges overlapping and adjacent ranges, keeping duplicates.
    ///
    /// Every iterator is reset to the start of the list.
    pub fn sort(&self) {
        self.inner.lock().sort();
    }

    /// Sorts the hosts and removes duplicates.
    ///
    /// Every iterator is reset to the start of the list.
    pub fn uniq(&self) {
        self.inner.lock().uniq();
    }

    /// Renders the list in compressed form, e.g. `node[1-3,5],login`.
    #[must_use]
    pub fn ranged_string(&self) -> String {
        let inner = self.inner.lock();
        render::ranged(&inner.ranges, &inner.config)
    }

    /// Renders every host separately, e.g. `node1,node2,node3,node5,login`.
    #[must_use]
    pub fn deranged_string(&self) -> String {
        let inner = self.inner.lock();
        render::deranged(&inner.ranges, inner.config.dimensions())
    }

    /// Writes the compressed form into `buf` followed by a NUL byte. Returns the length of the
    /// string, excluding the NUL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Truncated`][crate::Error::Truncated] if `buf` is too small. The buffer
    /// then holds as much of the string as fits, followed by a NUL byte.
    pub fn write_ranged(&self, buf: &mut [u8]) -> crate::Result<usize> {
        render::write_truncated(&self.ranged_string(), buf)
    }

    /// Writes every host separately into `buf` followed by a NUL byte. Returns the length of
    /// the string, excluding the NUL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Truncated`][crate::Error::Truncated] if `buf` is too small. The buffer
    /// then holds as much of the string as fits, followed by a NUL byte.
    pub fn write_deranged(&self, buf: &mut [u8]) -> crate::Result<usize> {
        render::write_truncated(&self.deranged_string(), buf)
    }

    /// Returns an iterator over the host names in list order.
    ///
    /// The iterator observes modifications made to the list while it is alive.
    ///
    /// # Example
    ///
    /// ```
    /// use hostlist::HostList;
    ///
    /// let hosts = HostList::parse("n[1-3]").unwrap();
    /// let mut iter = hosts.iter();
    ///
    /// assert_eq!(iter.next().as_deref(), Some("n1"));
    /// hosts.push("n4").unwrap();
    /// assert_eq!(iter.collect::<Vec<_>>(), ["n2", "n3", "n4"]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> HostListIter<'_> {
        HostListIter::new(self)
    }
}

impl Default for HostList {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a HostList {
    type Item = String;
    type IntoIter = HostListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Clone for HostList {
    /// Copies the ranges into a new list. Iterators of the original are not carried over.
    fn clone(&self) -> Self {
        let inner = self.inner.lock();

        let mut copy = Inner::new(inner.config);
        copy.ranges.extend(inner.ranges.iter().cloned());
        copy.count = inner.count;

        Self {
            inner: Mutex::new(copy),
        }
    }
}

impl fmt::Debug for HostList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();

        f.debug_struct(type_name::<Self>())
            .field("ranges", &inner.ranges)
            .field("count", &inner.count)
            .field("iterators", &inner.cursors.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for HostList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ranged_string())
    }
}

impl FromStr for HostList {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Inner {
    fn new(config: HostListConfig) -> Self {
        Self {
            config,
            ranges: Vec::with_capacity(config.chunk().get()),
            count: 0,
            cursors: HashMap::new(),
            next_cursor_id: 0,
        }
    }

    fn reserve_one(&mut self) {
        if self.ranges.len() == self.ranges.capacity() {
            self.ranges.reserve(self.config.chunk().get());
        }
    }

    /// Appends a range, joining it onto the last range if it continues it. Returns the number
    /// of hosts added.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "the host count cannot exceed the u64 range of host numbers"
    )]
    pub(crate) fn push_range(&mut self, mut range: HostRange) -> u64 {
        let added = range.count();
        if added == 0 {
            return 0;
        }

        match self.ranges.last_mut() {
            Some(tail) if tail.is_followed_by(&range) => {
                tail.join(&mut range);
            }
            _ => {
                self.reserve_one();
                self.ranges.push(range);
            }
        }

        self.count += added;
        added
    }

    /// Inserts a range at `index`, moving iterators at or after `index` along with the ranges
    /// they point into. The caller adjusts the host count.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "cursor indexes are bounded by the range count"
    )]
    pub(crate) fn insert_range(&mut self, index: usize, range: HostRange) {
        self.reserve_one();
        self.ranges.insert(index, range);

        for cursor in self.cursors.values_mut() {
            if cursor.index >= index {
                cursor.index += 1;
            }
        }
    }

    /// Removes the range at `index`. Iterators inside it move to the start of its successor.
    /// The caller adjusts the host count.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "only cursors past the removed range move back"
    )]
    pub(crate) fn delete_range(&mut self, index: usize) -> HostRange {
        let removed = self.ranges.remove(index);

        for cursor in self.cursors.values_mut() {
            match cursor.index.cmp(&index) {
                Ordering::Greater => cursor.index -= 1,
                Ordering::Equal => cursor.depth = None,
                Ordering::Less => {}
            }
        }

        removed
    }

    /// Removes the ranges `start..end`, adjusting iterators like `delete_range` and the host
    /// count.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "the drained hosts are part of the count"
    )]
    fn drain_ranges(&mut self, start: usize, end: usize) -> Vec<HostRange> {
        let removed = self.ranges.drain(start..end).collect_vec();
        self.count -= removed.iter().map(HostRange::count).sum::<u64>();

        let len = removed.len();
        for cursor in self.cursors.values_mut() {
            if cursor.index >= end {
                cursor.index -= len;
            } else if cursor.index >= start {
                cursor.index = start;
                cursor.depth = None;
            }
        }

        removed
    }

    /// Removes the host at `offset` within `ranges[index]` and moves iterators so that each one
    /// still returns the same next host.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "offsets are checked against the range before use"
    )]
    pub(crate) fn remove_host_at(&mut self, index: usize, offset: u64) {
        let Some(range) = self.ranges.get_mut(index) else {
            return;
        };

        if offset >= range.count() {
            return;
        }

        self.count -= 1;

        if range.count() == 1 {
            self.delete_range(index);
            return;
        }

        let upper = range.delete_host(range.lo() + offset);

        match upper {
            Some(upper) => {
                self.insert_range(index + 1, upper);

                for cursor in self.cursors.values_mut() {
                    if cursor.index == index {
                        if let Some(depth) = cursor.depth.filter(|&depth| depth > offset) {
                            cursor.index = index + 1;
                            cursor.depth = Some(depth - offset - 1);
                        }
                    }
                }
            }
            None if offset == 0 => {
                for cursor in self.cursors.values_mut() {
                    if cursor.index == index {
                        cursor.depth = cursor.depth.and_then(|depth| depth.checked_sub(1));
                    }
                }
            }
            None => {}
        }
    }

    /// Merges `ranges[index + 1]` into `ranges[index]` if they overlap or touch. Returns the
    /// number of hosts present in both, which are dropped from the count.
    ///
    /// Iterators keep pointing at the same host number within the merged range.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "a joined range starts at or before both of its parts"
    )]
    pub(crate) fn join_with_next(&mut self, index: usize) -> Option<u64> {
        let mut next = self.ranges.get(index + 1)?.clone();
        let range = self.ranges.get_mut(index)?;

        let old_lo = range.lo();
        let duplicates = range.join(&mut next)?;
        let new_lo = range.lo();

        self.ranges.remove(index + 1);
        self.count -= duplicates;

        for cursor in self.cursors.values_mut() {
            if cursor.index > index + 1 {
                cursor.index -= 1;
            } else if cursor.index == index + 1 {
                let start = next.lo() - new_lo;
                cursor.index = index;
                cursor.depth = match cursor.depth {
                    Some(depth) => Some(start + depth),
                    None => start.checked_sub(1),
                };
            } else if cursor.index == index {
                cursor.depth = cursor.depth.map(|depth| old_lo - new_lo + depth);
            }
        }

        Some(duplicates)
    }

    /// Maps a host position to `(range index, offset within range)`.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "skipped never exceeds n"
    )]
    fn position(&self, n: u64) -> Option<(usize, u64)> {
        let mut skipped = 0_u64;

        for (index, range) in self.ranges.iter().enumerate() {
            let count = range.count();
            if n - skipped < count {
                return Some((index, n - skipped));
            }
            skipped += count;
        }

        None
    }

    pub(crate) fn find(&self, name: &str) -> Option<u64> {
        let host = Hostname::parse(name, self.config.dimensions());
        self.find_host(&host)
    }

    #[expect(
        clippy::arithmetic_side_effects,
        reason = "positions are bounded by the host count"
    )]
    pub(crate) fn find_host(&self, host: &Hostname) -> Option<u64> {
        self.locate(host)
            .map(|(index, offset)| self.hosts_before(index) + offset)
    }

    fn locate(&self, host: &Hostname) -> Option<(usize, u64)> {
        let dims = self.config.dimensions();

        self.ranges
            .iter()
            .enumerate()
            .find_map(|(index, range)| Some((index, range.offset_of(host, dims)?)))
    }

    fn hosts_before(&self, index: usize) -> u64 {
        self.ranges.iter().take(index).map(HostRange::count).sum()
    }

    pub(crate) fn nth(&self, n: u64) -> Option<String> {
        let (index, offset) = self.position(n)?;
        let range = self.ranges.get(index)?;
        Some(range.host_at(offset, self.config.dimensions()))
    }

    pub(crate) fn delete_nth(&mut self, n: u64) -> bool {
        match self.position(n) {
            Some((index, offset)) => {
                self.remove_host_at(index, offset);
                true
            }
            None => false,
        }
    }

    pub(crate) fn delete_host(&mut self, name: &str) -> bool {
        let host = Hostname::parse(name, self.config.dimensions());
        self.delete_hostname(&host)
    }

    fn delete_hostname(&mut self, host: &Hostname) -> bool {
        match self.locate(host) {
            Some((index, offset)) => {
                self.remove_host_at(index, offset);
                true
            }
            None => false,
        }
    }

    /// Removes one occurrence of every host in `targets`. Returns the number removed.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "at most one removal per parsed host"
    )]
    pub(crate) fn delete_all(&mut self, targets: &[HostRange]) -> u64 {
        let dims = self.config.dimensions();
        let mut removed = 0;

        for target in targets {
            for offset in 0..target.count() {
                let host = Hostname::parse(&target.host_at(offset, dims), dims);
                if self.delete_hostname(&host) {
                    removed += 1;
                }
            }
        }

        removed
    }

    #[expect(clippy::arithmetic_side_effects, reason = "the popped host was counted")]
    pub(crate) fn pop(&mut self) -> Option<String> {
        let dims = self.config.dimensions();
        let index = self.ranges.len().checked_sub(1)?;
        let range = self.ranges.get_mut(index)?;

        let name = range.pop_last(dims)?;
        let emptied = range.is_empty();
        self.count -= 1;

        // Cursors stay valid when a range loses its last host, unless the range empties.
        if emptied {
            self.delete_range(index);
        }

        Some(name)
    }

    #[expect(clippy::arithmetic_side_effects, reason = "the shifted host was counted")]
    pub(crate) fn shift(&mut self) -> Option<String> {
        let dims = self.config.dimensions();
        let range = self.ranges.first_mut()?;

        let name = range.shift_first(dims)?;
        let emptied = range.is_empty();
        self.count -= 1;

        if emptied {
            self.delete_range(0);
        } else {
            for cursor in self.cursors.values_mut().filter(|cursor| cursor.index == 0) {
                cursor.depth = cursor.depth.and_then(|depth| depth.checked_sub(1));
            }
        }

        Some(name)
    }

    #[expect(
        clippy::arithmetic_side_effects,
        reason = "the group is never longer than the list"
    )]
    fn pop_range(&mut self) -> Option<String> {
        let tail = self.ranges.last()?;

        let group_len = self
            .ranges
            .iter()
            .rev()
            .take_while(|range| tail.same_group(range))
            .count()
            .max(1);

        let end = self.ranges.len();
        let removed = self.drain_ranges(end - group_len, end);
        Some(render::ranged(&removed, &self.config))
    }

    pub(crate) fn shift_range(&mut self) -> Option<String> {
        let head = self.ranges.first()?;

        let group_len = self
            .ranges
            .iter()
            .take_while(|range| head.same_group(range))
            .count()
            .max(1);

        let removed = self.drain_ranges(0, group_len);
        Some(render::ranged(&removed, &self.config))
    }

    fn reset_cursors(&mut self) {
        for cursor in self.cursors.values_mut() {
            *cursor = Cursor::default();
        }
    }

    pub(crate) fn sort(&mut self) {
        self.order();
        self.coalesce();
        self.reset_cursors();
    }

    /// Splits every range where its numbers stop being zero-padded and sorts the pieces by
    /// [`HostRange::normal_cmp`]. Ranges sharing a prefix and padding then form one run,
    /// ordered by number.
    fn order(&mut self) {
        let dims = self.config.dimensions();
        let mut ordered = Vec::with_capacity(self.ranges.capacity());

        for range in self.ranges.drain(..) {
            let (range, upper) = range.split_by_padding(dims);
            ordered.push(range);
            ordered.extend(upper);
        }

        ordered.sort_by(|a, b| a.normal_cmp(b, dims));
        self.ranges = ordered;
    }

    /// Rewrites each run of ranges sharing a prefix and padding so that no two ranges overlap:
    /// hosts present once stay in ranges and every further copy of a host becomes a
    /// single-number range next to them. Then collapses adjacent ranges.
    ///
    /// Expects ordered ranges and leaves cursors for the caller to reset.
    fn coalesce(&mut self) {
        let dims = self.config.dimensions();
        let ranges = mem::take(&mut self.ranges);
        let mut pieces = Vec::with_capacity(ranges.capacity());

        for run in ranges.chunk_by(|a, b| a.same_padding(b, dims)) {
            match run {
                [first, ..] if first.is_single_host() => pieces.extend_from_slice(run),
                _ => split_overlaps(run, &mut pieces),
            }
        }

        self.ranges = pieces;
        self.collapse();
    }

    /// Merges each range into its predecessor if it starts right after it with the same
    /// padding.
    fn collapse(&mut self) {
        let dims = self.config.dimensions();
        let mut collapsed: Vec<HostRange> = Vec::with_capacity(self.ranges.capacity());

        for mut range in self.ranges.drain(..) {
            match collapsed.last_mut() {
                Some(prev) if prev.is_followed_by(&range) && prev.same_padding(&range, dims) => {
                    prev.join(&mut range);
                }
                _ => collapsed.push(range),
            }
        }

        self.ranges = collapsed;
    }

    /// Orders the ranges and joins every pair that overlaps or touches, leaving each host
    /// once.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "duplicates are counted hosts"
    )]
    pub(crate) fn uniq(&mut self) {
        self.order();

        let dims = self.config.dimensions();
        let mut unique: Vec<HostRange> = Vec::with_capacity(self.ranges.capacity());
        let mut duplicates = 0;

        // Within a run of equal prefix and padding the ranges are sorted by first number, so
        // joining each one onto the last kept range merges every overlap.
        for mut range in self.ranges.drain(..) {
            let joined = unique
                .last_mut()
                .filter(|prev| prev.same_padding(&range, dims))
                .and_then(|prev| prev.join(&mut range));

            match joined {
                Some(count) => duplicates += count,
                None => unique.push(range),
            }
        }

        self.ranges = unique;
        self.count -= duplicates;

        self.reset_cursors();
    }

    #[expect(
        clippy::arithmetic_side_effects,
        reason = "a u64 of iterator ids is never exhausted"
    )]
    pub(crate) fn register_cursor(&mut self) -> u64 {
        let id = self.next_cursor_id;
        self.next_cursor_id += 1;
        self.cursors.insert(id, Cursor::default());
        id
    }

    pub(crate) fn unregister_cursor(&mut self, id: u64) {
        self.cursors.remove(&id);
    }

    pub(crate) fn reset_cursor(&mut self, id: u64) {
        if let Some(cursor) = self.cursors.get_mut(&id) {
            *cursor = Cursor::default();
        }
    }

    pub(crate) fn cursor(&self, id: u64) -> Option<Cursor> {
        self.cursors.get(&id).copied()
    }

    /// Advances the cursor and returns the host it now points at.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "depth stays below the range count"
    )]
    pub(crate) fn cursor_next(&mut self, id: u64) -> Option<String> {
        let dims = self.config.dimensions();
        let cursor = self.cursors.get_mut(&id)?;

        loop {
            let range = self.ranges.get(cursor.index)?;
            let next = cursor.depth.map_or(0, |depth| depth + 1);

            if next < range.count() {
                cursor.depth = Some(next);
                return Some(range.host_at(next, dims));
            }

            cursor.index += 1;
            cursor.depth = None;
        }
    }

    /// Returns the hosts remaining in the cursor's bracket group as a ranged string and moves
    /// the cursor past them.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "depth stays below the range count"
    )]
    pub(crate) fn cursor_next_range(&mut self, id: u64) -> Option<String> {
        let cursor = self.cursors.get_mut(&id)?;

        loop {
            let range = self.ranges.get(cursor.index)?;
            let start = cursor.depth.map_or(0, |depth| depth + 1);

            if let Some(tail) = range.tail_from(start) {
                let group = iter::once(tail)
                    .chain(
                        self.ranges
                            .iter()
                            .skip(cursor.index + 1)
                            .take_while(|next| range.same_group(next))
                            .cloned(),
                    )
                    .collect_vec();

                cursor.index += group.len();
                cursor.depth = None;
                return Some(render::ranged(&group, &self.config));
            }

            cursor.index += 1;
            cursor.depth = None;
        }
    }

    /// Removes the host the cursor most recently returned.
    pub(crate) fn cursor_remove(&mut self, id: u64) -> bool {
        let Some(Cursor {
            index,
            depth: Some(offset),
        }) = self.cursor(id)
        else {
            return false;
        };

        let exists = self
            .ranges
            .get(index)
            .is_some_and(|range| offset < range.count());

        if exists {
            self.remove_host_at(index, offset);
        }

        exists
    }
}

/// Appends the hosts of `run`, which share a prefix and padding, in number order. Numbers
/// present once are appended as ranges and every copy of a number present more than once as
/// a single-number range, ready for [`Inner::collapse`] to chain them.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "the number of copies is bounded by the run length"
)]
fn split_overlaps(run: &[HostRange], out: &mut Vec<HostRange>) {
    let Some(template) = run.first() else {
        return;
    };

    // A range adds a copy of its numbers at `lo` and removes it after `hi`.
    let mut changes = Vec::with_capacity(run.len() * 2);
    for range in run {
        changes.push((range.lo(), true));
        if let Some(after) = range.hi().checked_add(1) {
            changes.push((after, false));
        }
    }
    changes.sort_unstable_by_key(|&(at, _)| at);

    let mut emit = |lo: u64, hi: u64, copies: usize| {
        if copies == 1 {
            out.push(template.with_bounds(lo, hi));
            return;
        }

        trace!(
            prefix = template.prefix(),
            lo,
            hi,
            copies,
            "splitting duplicated hosts into single ranges"
        );

        for n in lo..=hi {
            out.extend(iter::repeat_n(template.with_bounds(n, n), copies));
        }
    };

    let mut copies = 0_usize;
    let mut start = 0_u64;

    for (at, group) in &changes.into_iter().chunk_by(|&(at, _)| at) {
        if copies > 0 {
            emit(start, at - 1, copies);
        }

        for (_, opens) in group {
            if opens {
                copies += 1;
            } else {
                copies -= 1;
            }
        }

        start = at;
    }

    // Only a range ending at `u64::MAX` is still open here.
    if copies > 0 {
        emit(start, u64::MAX, copies);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(HostList: Send, Sync, Debug, Clone);

    fn list(hosts: &str) -> HostList {
        HostList::parse(hosts).unwrap()
    }

    fn range_tuples(list: &HostList) -> Vec<(String, u64, u64)> {
        list.ranges()
            .iter()
            .map(|r| (r.prefix().to_owned(), r.lo(), r.hi()))
            .collect()
    }

    #[test]
    fn push_joins_perfectly_adjacent_tail() {
        let hosts = HostList::new();
        hosts.push("n1").unwrap();
        hosts.push("n2").unwrap();
        hosts.push("n3").unwrap();

        assert_eq!(hosts.range_count(), 1);
        assert_eq!(hosts.count(), 3);

        // Going backwards does not join.
        hosts.push("n1").unwrap();
        assert_eq!(hosts.range_count(), 2);
        assert_eq!(hosts.count(), 4);
    }

    #[test]
    fn push_host_and_range_return_new_count() {
        let hosts = HostList::new();
        assert_eq!(hosts.push_host("login").unwrap(), 1);
        assert_eq!(hosts.push_range(HostRange::new("n", 0, 9, 1)), 11);
        assert_eq!(hosts.ranged_string(), "login,n[0-9]");
    }

    #[test]
    fn push_list_copies_hosts() {
        let a = list("a[1-3]");
        let b = list("a[4-5],b");

        assert_eq!(a.push_list(&b), 3);
        assert_eq!(a.ranged_string(), "a[1-5],b");
        assert_eq!(b.count(), 3);

        // Pushing a list onto itself doubles it.
        assert_eq!(b.push_list(&b), 3);
        assert_eq!(b.count(), 6);
    }

    #[test]
    fn pop_and_shift() {
        let hosts = list("a[1-2],b");

        assert_eq!(hosts.pop().as_deref(), Some("b"));
        assert_eq!(hosts.shift().as_deref(), Some("a1"));
        assert_eq!(hosts.pop().as_deref(), Some("a2"));
        assert_eq!(hosts.pop(), None);
        assert_eq!(hosts.shift(), None);
        assert!(hosts.is_empty());
        assert_eq!(hosts.range_count(), 0);
    }

    #[test]
    fn pop_and_shift_range() {
        let hosts = list("a[1-2],b[1-3],b[7-9],c,d[4-5]");

        assert_eq!(hosts.pop_range().as_deref(), Some("d[4-5]"));
        assert_eq!(hosts.pop_range().as_deref(), Some("c"));
        assert_eq!(hosts.shift_range().as_deref(), Some("a[1-2]"));
        assert_eq!(hosts.shift_range().as_deref(), Some("b[1-3,7-9]"));
        assert_eq!(hosts.shift_range(), None);
        assert_eq!(hosts.count(), 0);
    }

    #[test]
    fn find_returns_position() {
        let hosts = list("login,n[1-3],m[8-12]");

        assert_eq!(hosts.find("login"), Some(0));
        assert_eq!(hosts.find("n1"), Some(1));
        assert_eq!(hosts.find("n3"), Some(3));
        assert_eq!(hosts.find("m10"), Some(6));
        assert_eq!(hosts.find("m13"), None);
        assert_eq!(hosts.find("m08"), None);
    }

    #[test]
    fn nth_and_delete_nth() {
        let hosts = list("a,b[1-3]");

        assert_eq!(hosts.nth(0).as_deref(), Some("a"));
        assert_eq!(hosts.nth(2).as_deref(), Some("b2"));
        assert_eq!(hosts.nth(4), None);

        assert!(hosts.delete_nth(2));
        assert_eq!(hosts.ranged_string(), "a,b[1,3]");
        assert_eq!(hosts.count(), 3);
        assert!(!hosts.delete_nth(3));
    }

    #[test]
    fn delete_removes_one_occurrence_each() {
        let hosts = list("f[0-5]");
        assert_eq!(hosts.delete("f[1-3]").unwrap(), 3);
        assert_eq!(hosts.deranged_string(), "f0,f4,f5");
        assert_eq!(hosts.ranged_string(), "f[0,4-5]");

        let hosts = list("x,x,y");
        assert_eq!(hosts.delete("x,z").unwrap(), 1);
        assert_eq!(hosts.deranged_string(), "x,y");
        assert!(hosts.delete("x[").is_err());
    }

    #[test]
    fn delete_host_reports_presence() {
        let hosts = list("n[1-3]");
        assert!(hosts.delete_host("n2"));
        assert!(!hosts.delete_host("n2"));
        assert_eq!(range_tuples(&hosts), [("n".into(), 1, 1), ("n".into(), 3, 3)]);
    }

    #[test]
    fn sort_orders_and_collapses() {
        let hosts = list("n[5-7],login,n[1-4],m2,n10");
        hosts.sort();

        assert_eq!(hosts.ranged_string(), "login,m2,n[1-7,10]");
        assert_eq!(hosts.count(), 10);
    }

    #[test]
    fn sort_keeps_duplicates_without_overlap() {
        let hosts = list("n[1-5],n[3-7]");
        hosts.sort();

        assert_eq!(hosts.count(), 10);

        let ranges = hosts.ranges();
        for pair in ranges.windows(2) {
            assert!(pair[0].hi() <= pair[1].lo(), "{ranges:?}");
        }

        let mut names: Vec<_> = hosts.iter().collect();
        names.sort();
        assert_eq!(
            names,
            ["n1", "n2", "n3", "n3", "n4", "n4", "n5", "n5", "n6", "n7"]
        );
    }

    #[test]
    fn sort_splits_contained_range() {
        let hosts = list("n[1-10],n[2-3],n[4-5]");
        hosts.sort();

        assert_eq!(hosts.count(), 14);
        assert_eq!(hosts.iter().count(), 14);
    }

    #[test]
    fn sort_is_idempotent() {
        let hosts = list("b[3-9],a7,b[1-4],c,a[1-7],b2");
        hosts.sort();
        let once = hosts.ranges();
        hosts.sort();
        assert_eq!(hosts.ranges(), once);
    }

    #[test]
    fn uniq_removes_duplicates() {
        let hosts = list("r1,r2,r3,r3");
        hosts.uniq();

        assert_eq!(hosts.ranged_string(), "r[1-3]");
        assert_eq!(hosts.deranged_string(), "r1,r2,r3");
        assert_eq!(hosts.count(), 3);

        let hosts = list("x,n[1-5],x,n[3-9],n02");
        hosts.uniq();
        assert_eq!(hosts.ranged_string(), "n02,n[1-9],x");
        assert_eq!(hosts.count(), 11);
    }

    #[test]
    fn clone_is_deep() {
        let original = list("n[1-3]");
        let copy = original.clone();

        original.pop();
        assert_eq!(copy.count(), 3);
        assert_eq!(original.count(), 2);
    }

    #[test]
    fn display_and_from_str() {
        let hosts: HostList = "n[1-3],x".parse().unwrap();
        assert_eq!(hosts.to_string(), "n[1-3],x");
        assert!("n[1-".parse::<HostList>().is_err());
    }

    #[test]
    fn write_ranged_truncates() {
        let hosts = list("node[1-3]");

        let mut buf = [0xFF_u8; 16];
        assert_eq!(hosts.write_ranged(&mut buf).unwrap(), 9);
        assert_eq!(&buf[..10], b"node[1-3]\0");

        let mut small = [0xFF_u8; 5];
        let error = hosts.write_ranged(&mut small).unwrap_err();
        assert!(matches!(
            error,
            crate::Error::Truncated {
                required: 10,
                available: 5
            }
        ));
        assert_eq!(&small, b"node\0");

        let mut buf = [0_u8; 32];
        assert_eq!(hosts.write_deranged(&mut buf).unwrap(), 17);
    }

    #[test]
    fn count_matches_ranges_after_mutations() {
        let hosts = list("a[1-9],b[1-3],a[5-12],c");
        let check = |hosts: &HostList| {
            let sum: u64 = hosts.ranges().iter().map(HostRange::count).sum();
            assert_eq!(hosts.count(), sum);
        };

        check(&hosts);
        hosts.sort();
        check(&hosts);
        hosts.delete_nth(4);
        check(&hosts);
        hosts.pop_range();
        check(&hosts);
        hosts.uniq();
        check(&hosts);
    }

    #[test]
    fn sort_is_idempotent_with_mixed_widths() {
        let hosts = list("n[98-102],n091,n100,n[97-105]");
        hosts.sort();
        let once = hosts.ranges();

        assert_eq!(hosts.count(), 16);
        assert_eq!(
            hosts.ranged_string(),
            "n091,n[97-98,98-99,99-100,100,100-101,101-102,102-105]"
        );

        hosts.sort();
        assert_eq!(hosts.ranges(), once);
    }

    #[test]
    fn sort_splits_at_first_unpadded_number() {
        let hosts = list("node[001-128],node005");
        hosts.sort();

        assert_eq!(
            range_tuples(&hosts),
            [
                ("node".into(), 1, 5),
                ("node".into(), 5, 99),
                ("node".into(), 100, 128)
            ]
        );
        assert_eq!(hosts.ranged_string(), "node[001-005,005-128]");
        assert_eq!(hosts.count(), 129);
    }

    #[test]
    fn uniq_joins_across_widths() {
        let hosts = list("n[97-105],n091,n100");
        hosts.uniq();

        assert_eq!(hosts.ranged_string(), "n091,n[97-105]");
        assert_eq!(hosts.count(), 10);

        let hosts = list("n[098-102],n100,n[100-101]");
        hosts.uniq();

        assert_eq!(hosts.ranged_string(), "n[098-102]");
        assert_eq!(hosts.count(), 5);
        assert_eq!(hosts.deranged_string(), "n098,n099,n100,n101,n102");
    }

    #[test]
    fn uniq_is_idempotent_with_mixed_widths() {
        let hosts = list("z9,z10,z09,z010,z[1-12],z[08-11],z[008-101]");
        hosts.uniq();
        let once = hosts.ranges();
        let count = hosts.count();

        hosts.uniq();
        assert_eq!(hosts.ranges(), once);
        assert_eq!(hosts.count(), count);
    }
}
