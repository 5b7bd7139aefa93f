use crate::{
    Result,
    filters::FilterChain,
    fs::{Entry, EntryKind, Storage},
    walk::{ExprList, FinderQuery, ResultCollection},
};
use chrono::{DateTime, Utc};
use core::slice;
use tracing::debug;

/**
 The query builder and result collection for one search over a [`Storage`].

 A finder starts out configuring: the chained setters (`within`, `files`, `only`,
 `size`, ...) consume and return it. [`Finder::get`] lists the configured path,
 runs the [`FilterChain`] and keeps the result, which can then be counted,
 iterated and sorted. Calling a setter after that drops the result and goes back
 to configuring; the next `get` lists and filters from scratch.

 Listing is non-recursive unless [`Finder::recursive`] is set.

 # Examples
 ```
 use storefind::{Finder, fs::{MemoryStorage, Storage}};

 let storage = MemoryStorage::new();
 storage.write("cache/file1.txt", b"123456789").unwrap();
 storage.write("cache/file1.php", b"<?php echo 'hello'; ?>\n").unwrap();

 let mut finder = Finder::new(&storage).within("cache").files().only("txt");
 let results = finder.get().unwrap();
 assert_eq!(results.len(), 1);
 assert_eq!(results[0].file_name(), "file1.txt");
 assert_eq!(finder.count(), 1);
 ```
*/
#[derive(Debug)]
pub struct Finder<'s, S: Storage + ?Sized> {
    storage: &'s S,
    query: FinderQuery,
    results: Option<ResultCollection>,
}

impl<'s, S: Storage + ?Sized> Finder<'s, S> {
    /// A finder over the whole storage root, with no filters
    #[must_use]
    pub fn new(storage: &'s S) -> Self {
        Self::with_query(storage, FinderQuery::default())
    }

    #[must_use]
    pub const fn with_query(storage: &'s S, query: FinderQuery) -> Self {
        Self {
            storage,
            query,
            results: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn query(&self) -> &FinderQuery {
        &self.query
    }

    /// Replaces the query, dropping any previous result
    fn configure<F: FnOnce(FinderQuery) -> FinderQuery>(mut self, change: F) -> Self {
        self.query = change(self.query);
        self.results = None;
        self
    }

    /// Set the path to list, defaults to the storage root
    #[must_use]
    pub fn within<P: Into<String>>(self, path: P) -> Self {
        self.configure(|query| query.with_path(path))
    }

    /// Set whether to list everything below the path, defaults to false
    #[must_use]
    pub fn recursive(self, recursive: bool) -> Self {
        self.configure(|query| query.with_recursive(recursive))
    }

    /// Only keep files
    #[must_use]
    pub fn files(self) -> Self {
        self.configure(|query| query.with_kind(Some(EntryKind::File)))
    }

    /// Only keep directories
    #[must_use]
    pub fn directories(self) -> Self {
        self.configure(|query| query.with_kind(Some(EntryKind::Directory)))
    }

    /// Only keep entries with one of these extensions (`"txt"` or `".txt"`)
    #[must_use]
    pub fn only<L: Into<ExprList>>(self, extensions: L) -> Self {
        self.configure(|query| query.with_only(extensions.into().into_vec()))
    }

    /// Drop entries with any of these extensions
    #[must_use]
    pub fn except<L: Into<ExprList>>(self, extensions: L) -> Self {
        self.configure(|query| query.with_except(extensions.into().into_vec()))
    }

    /// Size predicates, all of which must hold. Requires [`Finder::files`].
    #[must_use]
    pub fn size<L: Into<ExprList>>(self, expressions: L) -> Self {
        self.configure(|query| query.with_sizes(expressions.into().into_vec()))
    }

    /// Date predicates, all of which must hold
    #[must_use]
    pub fn date<L: Into<ExprList>>(self, expressions: L) -> Self {
        self.configure(|query| query.with_dates(expressions.into().into_vec()))
    }

    /**
     Lists the configured path and filters it, resolving relative dates against now.

     # Errors
     Returns [`Error::InvalidExpression`](crate::Error::InvalidExpression) for a malformed
     or misplaced predicate, before storage is touched, and
     [`Error::StorageAccess`](crate::Error::StorageAccess) if the listing fails.
    */
    pub fn get(&mut self) -> Result<&ResultCollection> {
        self.get_at(Utc::now())
    }

    /// Like [`get`](Self::get), with an explicit clock for relative dates
    ///
    /// # Errors
    /// See [`Finder::get`].
    pub fn get_at(&mut self, now: DateTime<Utc>) -> Result<&ResultCollection> {
        self.results = None;
        let chain = FilterChain::compile(&self.query, now)?;
        let listed = self
            .storage
            .list_contents(self.query.path(), self.query.recursive())?;
        let kept = chain.apply(&listed)?;
        debug!(
            path = self.query.path(),
            listed = listed.len(),
            kept = kept.len(),
            "finder materialised"
        );
        Ok(&*self.results.insert(ResultCollection::new(kept)))
    }

    /// Number of entries in the last result, `0` before [`get`](Self::get)
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.results.as_ref().map_or(0, ResultCollection::len)
    }

    #[inline]
    #[must_use]
    pub fn has_results(&self) -> bool {
        self.count() > 0
    }

    /// The last result, if a search has run since the last setter call
    #[inline]
    #[must_use]
    pub const fn results(&self) -> Option<&ResultCollection> {
        self.results.as_ref()
    }

    /// Iterates the last result, empty before [`get`](Self::get)
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Entry> {
        self.results
            .as_ref()
            .map(ResultCollection::as_slice)
            .unwrap_or_default()
            .iter()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.results
            .map(ResultCollection::into_entries)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Entry> {
        self.iter().cloned().collect()
    }

    fn sort_results<F: FnOnce(&mut ResultCollection)>(&mut self, sort: F) -> &mut Self {
        if let Some(results) = self.results.as_mut() {
            sort(results);
        }
        self
    }

    /// Stable sort of the last result by modification time; no-op before `get`
    pub fn sort_by_date(&mut self, descending: bool) -> &mut Self {
        self.sort_results(|results| results.sort_by_date(descending))
    }

    /// Stable sort of the last result by size
    pub fn sort_by_size(&mut self, descending: bool) -> &mut Self {
        self.sort_results(|results| results.sort_by_size(descending))
    }

    /// Stable sort of the last result by extension
    pub fn sort_by_extension(&mut self, descending: bool) -> &mut Self {
        self.sort_results(|results| results.sort_by_extension(descending))
    }

    /// Stable sort of the last result by file name
    pub fn sort_by_name(&mut self, descending: bool) -> &mut Self {
        self.sort_results(|results| results.sort_by_name(descending))
    }
}

impl<'a, S: Storage + ?Sized> IntoIterator for &'a Finder<'_, S> {
    type Item = &'a Entry;
    type IntoIter = slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ExpressionErrorKind, fs::MemoryStorage};

    fn storage() -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage.write("cache/file1.txt", b"123456789").unwrap();
        storage.write("cache/file1.php", &[b'x'; 24]).unwrap();
        storage.write("cache/nested/deep.txt", b"1").unwrap();
        storage
    }

    #[test]
    fn counts_before_and_after_get() {
        let storage = storage();
        let mut finder = Finder::new(&storage).within("cache");
        assert_eq!(finder.count(), 0);
        assert!(!finder.has_results());
        assert!(finder.iter().next().is_none());

        let len = finder.get().unwrap().len();
        assert_eq!(len, 3);
        assert_eq!(finder.count(), len);
        assert!(finder.has_results());
    }

    #[test]
    fn recursive_listing_is_opt_in() {
        let storage = storage();
        let mut flat = Finder::new(&storage).within("cache").files().only("txt");
        assert_eq!(flat.get().unwrap().paths(), ["cache/file1.txt"]);

        let mut deep = flat.recursive(true);
        assert_eq!(deep.get().unwrap().len(), 2);
    }

    #[test]
    fn setters_drop_the_previous_result() {
        let storage = storage();
        let mut finder = Finder::new(&storage).within("cache");
        finder.get().unwrap();
        let finder = finder.directories();
        assert_eq!(finder.count(), 0);
        assert!(finder.results().is_none());
    }

    #[test]
    fn invalid_date_fails_before_listing() {
        let storage = MemoryStorage::new();
        // the path does not exist, so only an early parse failure explains the error kind
        let mut finder = Finder::new(&storage).within("missing").date("foo");
        let err = finder.get().unwrap_err();
        assert!(matches!(err, Error::InvalidExpression(_)));
        assert_eq!(finder.count(), 0);
    }

    #[test]
    fn size_without_files_is_rejected() {
        let storage = storage();
        let mut finder = Finder::new(&storage).within("cache").size("< 25");
        let err = finder.get().unwrap_err();
        assert_eq!(
            err.as_expression_error().map(|err| err.kind().clone()),
            Some(ExpressionErrorKind::SizeRequiresFiles)
        );
    }

    #[test]
    fn missing_directory_is_a_storage_error() {
        let storage = MemoryStorage::new();
        let mut finder = Finder::new(&storage).within("nope");
        let err = finder.get().unwrap_err();
        assert_eq!(err.as_storage_error().map(|err| err.path()), Some("nope"));
    }

    #[test]
    fn sorting_chains_on_the_result() {
        let storage = storage();
        let mut finder = Finder::new(&storage).within("cache").files();
        finder.get().unwrap();
        finder.sort_by_size(true).sort_by_extension(false);
        let names: Vec<_> = finder.iter().map(Entry::file_name).collect();
        assert_eq!(names, ["file1.php", "file1.txt"]);

        let names: Vec<_> = (&finder).into_iter().map(Entry::file_name).collect();
        assert_eq!(names.len(), 2);
        assert_eq!(finder.to_vec().len(), 2);
        assert_eq!(finder.into_entries().len(), 2);
    }
}
