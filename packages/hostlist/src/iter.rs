use std::fmt;
use std::iter::FusedIterator;

use crate::HostList;

/// Iterates over the host names of a [`HostList`] in list order.
///
/// The iterator is registered with its list for as long as it lives. Every modification of
/// the list adjusts the iterator's position, so removing hosts never makes it skip or repeat a
/// host that is still present and hosts appended past its position are still visited.
/// [`sort()`][HostList::sort] and [`uniq()`][HostList::uniq] reset it to the start.
///
/// Each step briefly takes the list's lock, so other threads may modify the list between steps.
pub struct HostListIter<'a> {
    list: &'a HostList,
    id: u64,
}

impl<'a> HostListIter<'a> {
    pub(crate) fn new(list: &'a HostList) -> Self {
        let id = list.lock().register_cursor();
        Self { list, id }
    }

    /// Moves the iterator back to the start of the list.
    pub fn reset(&mut self) {
        self.list.lock().reset_cursor(self.id);
    }

    /// Returns the rest of the current bracket group as a ranged string, e.g. `node[4-7,9]`,
    /// and moves past it.
    ///
    /// # Example
    ///
    /// ```
    /// use hostlist::HostList;
    ///
    /// let hosts = HostList::parse("a[1-4],a[7-8],b[1-2]").unwrap();
    /// let mut iter = hosts.iter();
    ///
    /// assert_eq!(iter.next().as_deref(), Some("a1"));
    /// assert_eq!(iter.next_range().as_deref(), Some("a[2-4,7-8]"));
    /// assert_eq!(iter.next_range().as_deref(), Some("b[1-2]"));
    /// assert_eq!(iter.next_range(), None);
    /// ```
    pub fn next_range(&mut self) -> Option<String> {
        self.list.lock().cursor_next_range(self.id)
    }

    /// Removes the host most recently returned by [`next()`][Iterator::next] from the list.
    ///
    /// Returns `false` if the iterator has not returned a host since it was created or reset,
    /// or if that host is already gone.
    pub fn remove(&mut self) -> bool {
        self.list.lock().cursor_remove(self.id)
    }
}

impl Iterator for HostListIter<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.lock().cursor_next(self.id)
    }
}

impl FusedIterator for HostListIter<'_> {}

impl Drop for HostListIter<'_> {
    fn drop(&mut self) {
        self.list.lock().unregister_cursor(self.id);
    }
}

impl fmt::Debug for HostListIter<'_> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostListIter")
            .field("id", &self.id)
            .field("cursor", &self.list.lock().cursor(self.id))
            .finish()
    }
}
