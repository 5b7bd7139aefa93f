mod chain;
mod comparison;
mod date_filter;
mod file_type_filter;
pub mod lexer;
mod size_filter;

pub use chain::{FilterChain, filter_dates, filter_except, filter_only, filter_sizes};
pub use comparison::Comparison;
pub use date_filter::{DateExpression, DateExpressionParser, DateUnit};
pub use file_type_filter::{EntryKindParser, filter_kind};
pub use size_filter::{GIBI, KIBI, MEBI, SizeExpression, SizeExpressionParser};
