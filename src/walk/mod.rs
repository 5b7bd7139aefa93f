mod finder;
mod query;
mod results;

pub use finder::Finder;
pub use query::{ExprList, FinderQuery};
pub use results::ResultCollection;
