use super::{ValueExpressionCreator, comparison_for};
use crate::config::{Culture, FilterConfiguration};
use crate::errors::FilterCreationError;
use crate::expression::{CompareOp, Expr};
use crate::filter::FilterOperator;
use crate::schema::{PropertyDescriptor, PropertyType, ScalarType};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};

const OPERATORS: &[FilterOperator] = &[
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

const ISO_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const TIME_SUFFIXES: &[&str] = &[" %H:%M:%S", " %H:%M"];

/// Date-time and date properties.
///
/// A date written without a time of day stands for the whole day when the
/// property carries a time: `=2020-01-01` matches any instant on that day and
/// `>2020-01-01` starts at the next midnight. `~` is plain equality.
pub struct DateTimeExpressionCreator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedMoment {
    Day(NaiveDate),
    Instant(NaiveDateTime),
}

/// Accepts ISO 8601 / RFC 3339 text and the culture's short date format.
/// Offsets are converted to UTC.
pub fn parse_moment(text: &str, culture: &Culture) -> Option<ParsedMoment> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(ParsedMoment::Instant(dt.naive_utc()));
    }
    for format in ISO_DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ParsedMoment::Instant(dt));
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(text, crate::value::DATE_FORMAT) {
        return Some(ParsedMoment::Day(d));
    }

    let short_date = culture.short_date_format();
    if let Ok(d) = NaiveDate::parse_from_str(text, &short_date) {
        return Some(ParsedMoment::Day(d));
    }
    TIME_SUFFIXES.iter().find_map(|suffix| {
        NaiveDateTime::parse_from_str(text, &format!("{short_date}{suffix}"))
            .ok()
            .map(ParsedMoment::Instant)
    })
}

fn day_range(
    property: &str,
    operator: FilterOperator,
    day: NaiveDate,
) -> Option<Expr> {
    let start = day.and_hms_opt(0, 0, 0)?;
    let next = start.checked_add_signed(TimeDelta::days(1))?;
    let on_day = || {
        Expr::and_all(vec![
            Expr::property_compare(CompareOp::Ge, property, start),
            Expr::property_compare(CompareOp::Lt, property, next),
        ])
    };

    Some(match operator {
        FilterOperator::NotEqual => on_day().negate(),
        FilterOperator::LessThan => Expr::property_compare(CompareOp::Lt, property, start),
        FilterOperator::LessThanOrEqual => Expr::property_compare(CompareOp::Lt, property, next),
        FilterOperator::GreaterThan => Expr::property_compare(CompareOp::Ge, property, next),
        FilterOperator::GreaterThanOrEqual => {
            Expr::property_compare(CompareOp::Ge, property, start)
        }
        _ => on_day(),
    })
}

impl ValueExpressionCreator for DateTimeExpressionCreator {
    fn can_create_expression_for(&self, property_type: &PropertyType) -> bool {
        matches!(
            property_type.scalar(),
            ScalarType::DateTime | ScalarType::Date
        )
    }

    fn supported_filter_operators(&self) -> &'static [FilterOperator] {
        OPERATORS
    }

    fn create_expression_for_value(
        &self,
        property: &PropertyDescriptor,
        operator: FilterOperator,
        value: &str,
        configuration: &FilterConfiguration,
    ) -> Result<Expr, FilterCreationError> {
        if !OPERATORS.contains(&operator) || operator.is_null_test() {
            return Err(FilterCreationError::unsupported_operator(
                property,
                operator,
                Some(value),
            ));
        }
        let moment = parse_moment(value, configuration.culture())
            .ok_or_else(|| FilterCreationError::unparsable_value(property, operator, value))?;
        let op = comparison_for(operator).unwrap_or(CompareOp::Eq);
        let name = property.name();

        let expr = match (property.property_type().scalar(), moment) {
            (ScalarType::Date, ParsedMoment::Day(d)) => Expr::property_compare(op, name, d),
            (ScalarType::Date, ParsedMoment::Instant(dt)) => {
                Expr::property_compare(op, name, dt.date())
            }
            (_, ParsedMoment::Instant(dt)) => Expr::property_compare(op, name, Value::DateTime(dt)),
            (_, ParsedMoment::Day(d)) => day_range(name, operator, d)
                .ok_or_else(|| FilterCreationError::unparsable_value(property, operator, value))?,
        };
        Ok(expr)
    }
}
