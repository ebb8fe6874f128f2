//! Entity filter parsing and compilation
//!
//! Each filterable property takes one filter string. The string is compiled
//! against the property's declared type and all property predicates are
//! combined with AND into one predicate over the entity.
//!
//! # Syntax
//!
//! ```text
//! value        Default equality for the type
//! ~value       Contains (strings, guid fragments; numbers match +value and -value)
//! =value       Equal, case-insensitive
//! ==value      Equal, case-sensitive
//! !value       Not equal
//! <value       Less than            <=value   Less than or equal
//! >value       Greater than         >=value   Greater than or equal
//! ISNULL       Property is null (or empty, for strings)
//! NOTNULL      Property is not null
//! ```
//!
//! Values separated by commas combine with OR. A value without its own
//! operator reuses the previous one, so `=red, green` tests both names
//! case-insensitively. An empty or whitespace-only string puts no constraint
//! on the property.
//!
//! The comma is always a separator, so numbers written with a decimal comma
//! (`de-DE`, `fr-FR`) cannot appear in filter syntax. Pass them through
//! [`EntityFilter::add_values`], which takes the values already split.
//!
//! # Examples
//!
//! ```text
//! ~smith                   Name contains "smith" in any case
//! >=5, <=-5                Magnitude at least 5
//! 2020-01-01               Any time on that day
//! !true, !false            Every value, null included
//! ISNULL, 0                Null or zero
//! ```

pub mod cast;
pub mod compiled;
pub mod creators;
pub mod entity;
pub mod parser;
pub mod property;

pub use compiled::CompiledFilter;
pub use creators::{ValueExpressionCreator, creator_for};
pub use entity::{EntityFilter, SubFilter, SubFilterKind};
pub use parser::{FilterOperator, ValueFilter, format_values};
pub use property::PropertyFilter;
