use crate::{
    ExpressionError, ExpressionErrorKind,
    filters::{DateExpression, SizeExpression, filter_kind},
    fs::{Entry, EntryKind},
    walk::FinderQuery,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/**
 A compiled set of filters, applied in a fixed order:

 1. entry kind
 2. `only` extensions
 3. `except` extensions
 4. date predicates, all of which must hold
 5. size predicates, all of which must hold

 Every expression is parsed by [`FilterChain::compile`], so a malformed predicate is
 reported before anything is listed or filtered.
*/
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FilterChain {
    kind: Option<EntryKind>,
    only: Vec<String>,
    except: Vec<String>,
    dates: Vec<DateExpression>,
    sizes: Vec<SizeExpression>,
}

impl FilterChain {
    /**
     Parses every predicate in `query`, resolving relative dates against `now`.

     # Errors
     Returns the first [`ExpressionError`] found. Size predicates are rejected with
     [`ExpressionErrorKind::SizeRequiresFiles`] unless the query is restricted to files.
    */
    pub fn compile(query: &FinderQuery, now: DateTime<Utc>) -> Result<Self, ExpressionError> {
        let dates = query
            .dates()
            .iter()
            .map(|raw| DateExpression::parse_at(raw, now))
            .collect::<Result<Vec<_>, _>>()?;
        let sizes = query
            .sizes()
            .iter()
            .map(|raw| SizeExpression::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(first) = query.sizes().first()
            && query.kind() != Some(EntryKind::File)
        {
            return Err(ExpressionError::new(
                first.as_str(),
                ExpressionErrorKind::SizeRequiresFiles,
            ));
        }

        Ok(Self {
            kind: query.kind(),
            only: query.only().to_vec(),
            except: query.except().to_vec(),
            dates,
            sizes,
        })
    }

    #[must_use]
    pub fn dates(&self) -> &[DateExpression] {
        &self.dates
    }

    #[must_use]
    pub fn sizes(&self) -> &[SizeExpression] {
        &self.sizes
    }

    /// Runs every step over `entries`, returning the survivors in their original order
    ///
    /// # Errors
    /// Fails only if a size predicate meets an entry without a size.
    pub fn apply(&self, entries: &[Entry]) -> Result<Vec<Entry>, ExpressionError> {
        let total = entries.len();
        let kept = filter_kind(entries, self.kind);
        debug!(before = total, after = kept.len(), kind = ?self.kind, "kind filter");

        let kept = filter_only(&kept, &self.only);
        debug!(after = kept.len(), only = ?self.only, "only filter");

        let kept = filter_except(&kept, &self.except);
        debug!(after = kept.len(), except = ?self.except, "except filter");

        let kept = filter_dates(&kept, &self.dates);
        debug!(after = kept.len(), predicates = self.dates.len(), "date filter");

        let kept = filter_sizes(&kept, &self.sizes)?;
        debug!(after = kept.len(), predicates = self.sizes.len(), "size filter");

        Ok(kept)
    }
}

/// Keeps entries whose extension is in `extensions`, everything if it is empty
#[must_use]
pub fn filter_only(entries: &[Entry], extensions: &[String]) -> Vec<Entry> {
    if extensions.is_empty() {
        return entries.to_vec();
    }
    entries
        .iter()
        .filter(|entry| extensions.iter().any(|ext| ext == entry.extension()))
        .cloned()
        .collect()
}

/// Drops entries whose extension is in `extensions`
#[must_use]
pub fn filter_except(entries: &[Entry], extensions: &[String]) -> Vec<Entry> {
    if extensions.is_empty() {
        return entries.to_vec();
    }
    entries
        .iter()
        .filter(|entry| !extensions.iter().any(|ext| ext == entry.extension()))
        .cloned()
        .collect()
}

/// Keeps entries satisfying every date predicate
#[must_use]
pub fn filter_dates(entries: &[Entry], predicates: &[DateExpression]) -> Vec<Entry> {
    entries
        .iter()
        .filter(|entry| predicates.iter().all(|predicate| predicate.matches(entry)))
        .cloned()
        .collect()
}

/// Keeps entries satisfying every size predicate
///
/// # Errors
/// Fails if a predicate meets an entry without a size.
pub fn filter_sizes(
    entries: &[Entry],
    predicates: &[SizeExpression],
) -> Result<Vec<Entry>, ExpressionError> {
    let mut kept = Vec::with_capacity(entries.len());
    'entries: for entry in entries {
        for predicate in predicates {
            if !predicate.matches(entry)? {
                continue 'entries;
            }
        }
        kept.push(entry.clone());
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn fixture() -> Vec<Entry> {
        vec![
            Entry::file("cache/file1.txt", 9, 1_700_000_000),
            Entry::file("cache/file1.php", 24, 1_600_000_000),
            Entry::directory("cache/sub", 1_700_000_000),
            Entry::file("cache/README", 2048, 1_700_000_000),
            Entry::file("cache/file2.txt", 9, 1_500_000_000),
        ]
    }

    fn paths(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(Entry::path).collect()
    }

    #[test]
    fn extension_steps() {
        let entries = fixture();
        let txt = vec!["txt".to_owned()];
        assert_eq!(
            paths(&filter_only(&entries, &txt)),
            ["cache/file1.txt", "cache/file2.txt"]
        );
        assert_eq!(filter_except(&entries, &txt).len(), 3);
        assert_eq!(filter_only(&entries, &[String::new()]).len(), 2);
        assert_eq!(filter_only(&entries, &[]).len(), 5);
    }

    #[test]
    fn non_ascii_extensions_match_exactly() {
        let entries = vec![
            Entry::file("cache/notes.txé", 1, 0),
            Entry::file("cache/notes.txt", 1, 0),
        ];
        let accented = vec!["txé".to_owned()];
        assert_eq!(paths(&filter_only(&entries, &accented)), ["cache/notes.txé"]);
        assert_eq!(paths(&filter_except(&entries, &accented)), ["cache/notes.txt"]);
    }

    #[test]
    fn steps_do_not_touch_their_input() {
        let entries = fixture();
        let before = entries.clone();
        let _ = filter_except(&entries, &["php".to_owned()]);
        assert_eq!(entries, before);
    }

    #[test]
    fn compile_and_apply() {
        let query = FinderQuery::new("cache")
            .with_kind(Some(EntryKind::File))
            .with_only(vec!["txt".into(), "php".into()])
            .with_dates(vec!["after 2020-01-01".into()])
            .with_sizes(vec!["> 5".into(), "< 20".into()]);
        let chain = FilterChain::compile(&query, now()).unwrap();
        assert_eq!(chain.dates().len(), 1);
        assert_eq!(paths(&chain.apply(&fixture()).unwrap()), ["cache/file1.txt"]);
    }

    #[test]
    fn size_requires_files() {
        let query = FinderQuery::new("cache").with_sizes(vec!["< 25".into()]);
        let err = FilterChain::compile(&query, now()).unwrap_err();
        assert_eq!(err.kind(), &ExpressionErrorKind::SizeRequiresFiles);
        assert_eq!(err.expression(), "< 25");

        let dirs = query.with_kind(Some(EntryKind::Directory));
        assert!(FilterChain::compile(&dirs, now()).is_err());
    }

    #[test]
    fn malformed_predicates_fail_compile() {
        let query = FinderQuery::new("cache").with_dates(vec!["foo".into()]);
        let err = FilterChain::compile(&query, now()).unwrap_err();
        assert_eq!(err.expression(), "foo");
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let query = FinderQuery::new("cache")
            .with_except(vec!["php".into()])
            .with_dates(vec!["> 2020-01-01".into()]);
        let chain = FilterChain::compile(&query, now()).unwrap();
        let once = chain.apply(&fixture()).unwrap();
        let twice = chain.apply(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(paths(&once), ["cache/file1.txt", "cache/sub", "cache/README"]);
    }
}
