use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operators a filter value can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilterOperator {
    /// No explicit symbol; each value type picks its natural equality
    Default,
    /// `~value`
    Contains,
    /// `==value`
    EqualCaseSensitive,
    /// `=value`
    EqualCaseInsensitive,
    /// `!value`
    NotEqual,
    /// `<value`
    LessThan,
    /// `<=value`
    LessThanOrEqual,
    /// `>value`
    GreaterThan,
    /// `>=value`
    GreaterThanOrEqual,
    /// `ISNULL`
    IsNull,
    /// `NOTNULL`
    NotNull,
}

lazy_static! {
    /// Symbol table, longest symbols first so `==` wins over `=`.
    static ref SYMBOLS: Vec<(&'static str, FilterOperator)> = vec![
        ("==", FilterOperator::EqualCaseSensitive),
        ("<=", FilterOperator::LessThanOrEqual),
        (">=", FilterOperator::GreaterThanOrEqual),
        ("=", FilterOperator::EqualCaseInsensitive),
        ("!", FilterOperator::NotEqual),
        ("~", FilterOperator::Contains),
        ("<", FilterOperator::LessThan),
        (">", FilterOperator::GreaterThan),
    ];
    static ref NULL_TEST_RE: Regex =
        Regex::new(r"(?i)^(ISNULL|NOTNULL)$").expect("valid null test regex");
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 11] = [
        FilterOperator::Default,
        FilterOperator::Contains,
        FilterOperator::EqualCaseSensitive,
        FilterOperator::EqualCaseInsensitive,
        FilterOperator::NotEqual,
        FilterOperator::LessThan,
        FilterOperator::LessThanOrEqual,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterThanOrEqual,
        FilterOperator::IsNull,
        FilterOperator::NotNull,
    ];

    /// Text written in front of a value (the whole segment for null tests)
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOperator::Default => "",
            FilterOperator::IsNull => "ISNULL",
            FilterOperator::NotNull => "NOTNULL",
            other => SYMBOLS
                .iter()
                .find(|(_, op)| op == other)
                .map(|(symbol, _)| *symbol)
                .unwrap_or_default(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterOperator::Default => "Default",
            FilterOperator::Contains => "Contains",
            FilterOperator::EqualCaseSensitive => "EqualCaseSensitive",
            FilterOperator::EqualCaseInsensitive => "EqualCaseInsensitive",
            FilterOperator::NotEqual => "NotEqual",
            FilterOperator::LessThan => "LessThan",
            FilterOperator::LessThanOrEqual => "LessThanOrEqual",
            FilterOperator::GreaterThan => "GreaterThan",
            FilterOperator::GreaterThanOrEqual => "GreaterThanOrEqual",
            FilterOperator::IsNull => "IsNull",
            FilterOperator::NotNull => "NotNull",
        }
    }

    pub fn is_null_test(&self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::NotNull)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Split the longest known operator symbol off the front of a segment
fn split_symbol(segment: &str) -> (Option<FilterOperator>, &str) {
    for (symbol, op) in SYMBOLS.iter() {
        if let Some(rest) = segment.strip_prefix(symbol) {
            return (Some(*op), rest);
        }
    }
    (None, segment)
}

/// A single operator/value pair (e.g. `>=5` or `ISNULL`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueFilter {
    operator: FilterOperator,
    /// `None` for null tests
    value: Option<String>,
}

impl ValueFilter {
    pub fn new(operator: FilterOperator, value: impl Into<String>) -> Self {
        if operator.is_null_test() {
            return Self::null_test(operator);
        }
        Self {
            operator,
            value: Some(value.into()),
        }
    }

    pub fn null_test(operator: FilterOperator) -> Self {
        Self {
            operator,
            value: None,
        }
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Parse a whole filter string into its comma separated values
    ///
    /// A value without its own symbol takes the operator of the value before
    /// it, so `=true, false` yields two case-insensitive equality tests.
    /// Whitespace-only input yields no values at all. Parsing never fails;
    /// whether a value makes sense for a type is decided when the filter is
    /// compiled against a property.
    pub fn parse_all(s: &str) -> Vec<ValueFilter> {
        if s.trim().is_empty() {
            return Vec::new();
        }

        let mut filters = Vec::new();
        let mut inherited = FilterOperator::Default;

        for segment in s.split(',') {
            let segment = segment.trim();

            if NULL_TEST_RE.is_match(segment) {
                let op = if segment.eq_ignore_ascii_case("ISNULL") {
                    FilterOperator::IsNull
                } else {
                    FilterOperator::NotNull
                };
                filters.push(ValueFilter::null_test(op));
                inherited = FilterOperator::Default;
                continue;
            }

            let (explicit, rest) = split_symbol(segment);
            let op = explicit.unwrap_or(inherited);
            inherited = op;
            filters.push(ValueFilter::new(op, rest.trim()));
        }

        filters
    }
}

impl FromStr for ValueFilter {
    type Err = std::convert::Infallible;

    /// Parses a single segment; commas are not treated as separators
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segment = s.trim();
        if NULL_TEST_RE.is_match(segment) {
            let op = if segment.eq_ignore_ascii_case("ISNULL") {
                FilterOperator::IsNull
            } else {
                FilterOperator::NotNull
            };
            return Ok(ValueFilter::null_test(op));
        }
        let (explicit, rest) = split_symbol(segment);
        Ok(ValueFilter::new(
            explicit.unwrap_or(FilterOperator::Default),
            rest.trim(),
        ))
    }
}

impl fmt::Display for ValueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}{}", self.operator.symbol(), value),
            None => write!(f, "{}", self.operator.symbol()),
        }
    }
}

/// Render values back into filter syntax
pub fn format_values(values: &[ValueFilter]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
