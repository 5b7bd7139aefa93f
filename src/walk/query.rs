use crate::fs::EntryKind;

/**
 One or more strings passed to a finder setter.

 Lets `only`, `except`, `size` and `date` take either a single value or a list.

 ```
 use storefind::walk::ExprList;

 assert_eq!(ExprList::from("< 25").into_vec(), ["< 25"]);
 assert_eq!(ExprList::from(["txt", "php"]).len(), 2);
 assert!(ExprList::from(Vec::<String>::new()).is_empty());
 ```
*/
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExprList(Vec<String>);

impl ExprList {
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ExprList {
    fn from(value: &str) -> Self {
        Self(vec![value.to_owned()])
    }
}

impl From<String> for ExprList {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<&String> for ExprList {
    fn from(value: &String) -> Self {
        Self(vec![value.clone()])
    }
}

impl From<Vec<String>> for ExprList {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl From<Vec<&str>> for ExprList {
    fn from(values: Vec<&str>) -> Self {
        Self(values.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for ExprList {
    fn from(values: &[&str]) -> Self {
        Self(values.iter().map(|&value| value.to_owned()).collect())
    }
}

impl From<&[String]> for ExprList {
    fn from(values: &[String]) -> Self {
        Self(values.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for ExprList {
    fn from(values: [&str; N]) -> Self {
        Self(values.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[String; N]> for ExprList {
    fn from(values: [String; N]) -> Self {
        Self(values.into())
    }
}

impl IntoIterator for ExprList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/**
 Everything a finder has been told to look for.

 The listing root, whether to recurse, an optional kind restriction, the extension
 allow and deny lists, and the raw size and date predicates. Predicates are kept as
 text and only parsed when a search runs.

 Setters replace earlier values rather than appending to them.
*/
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FinderQuery {
    pub(crate) path: String,
    pub(crate) recursive: bool,
    pub(crate) kind: Option<EntryKind>,
    pub(crate) only: Vec<String>,
    pub(crate) except: Vec<String>,
    pub(crate) sizes: Vec<String>,
    pub(crate) dates: Vec<String>,
}

/// Extensions are compared without their leading dot
fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|ext| match ext.strip_prefix('.') {
            Some(stripped) => stripped.to_owned(),
            None => ext,
        })
        .collect()
}

impl FinderQuery {
    /// A query listing `path` non-recursively with no filters
    #[must_use]
    pub fn new<P: Into<String>>(path: P) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_path<P: Into<String>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    /// Set whether to list the whole tree below the path, defaults to false
    #[must_use]
    pub const fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Restrict results to one kind, `None` keeps both
    #[must_use]
    pub const fn with_kind(mut self, kind: Option<EntryKind>) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_only(mut self, extensions: Vec<String>) -> Self {
        self.only = normalize_extensions(extensions);
        self
    }

    #[must_use]
    pub fn with_except(mut self, extensions: Vec<String>) -> Self {
        self.except = normalize_extensions(extensions);
        self
    }

    #[must_use]
    pub fn with_sizes(mut self, expressions: Vec<String>) -> Self {
        self.sizes = expressions;
        self
    }

    #[must_use]
    pub fn with_dates(mut self, expressions: Vec<String>) -> Self {
        self.dates = expressions;
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn recursive(&self) -> bool {
        self.recursive
    }

    #[must_use]
    pub const fn kind(&self) -> Option<EntryKind> {
        self.kind
    }

    #[must_use]
    pub fn only(&self) -> &[String] {
        &self.only
    }

    #[must_use]
    pub fn except(&self) -> &[String] {
        &self.except
    }

    #[must_use]
    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    #[must_use]
    pub fn dates(&self) -> &[String] {
        &self.dates
    }
}
