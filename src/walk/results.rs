use crate::fs::Entry;
use core::{cmp::Ordering, ops::Index, slice};
use std::vec;

/**
 The entries produced by one finder search, in listing order until sorted.

 Iterating borrows the collection, so it can be walked any number of times
 without going back to storage.

 All sorts are stable: entries with equal keys keep their relative order, in
 both directions.
*/
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultCollection {
    entries: Vec<Entry>,
}

impl ResultCollection {
    #[must_use]
    pub const fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    /// The paths in their current order
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(Entry::path).collect()
    }

    fn sort_directed<F: Fn(&Entry, &Entry) -> Ordering>(&mut self, descending: bool, compare: F) {
        self.entries.sort_by(|a, b| {
            let ordering = compare(a, b);
            if descending { ordering.reverse() } else { ordering }
        });
    }

    /// Orders by modification time
    pub fn sort_by_date(&mut self, descending: bool) {
        self.sort_directed(descending, |a, b| a.last_modified().cmp(&b.last_modified()));
    }

    /// Orders by size in bytes; entries without a size sort before any file
    pub fn sort_by_size(&mut self, descending: bool) {
        self.sort_directed(descending, |a, b| a.size().cmp(&b.size()));
    }

    /// Orders by extension, byte-wise and case-sensitive
    pub fn sort_by_extension(&mut self, descending: bool) {
        self.sort_directed(descending, |a, b| a.extension().cmp(b.extension()));
    }

    /// Orders by file name, byte-wise and case-sensitive
    pub fn sort_by_name(&mut self, descending: bool) {
        self.sort_directed(descending, |a, b| a.file_name().cmp(b.file_name()));
    }
}

impl From<Vec<Entry>> for ResultCollection {
    fn from(entries: Vec<Entry>) -> Self {
        Self::new(entries)
    }
}

impl Index<usize> for ResultCollection {
    type Output = Entry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a ResultCollection {
    type Item = &'a Entry;
    type IntoIter = slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for ResultCollection {
    type Item = Entry;
    type IntoIter = vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
