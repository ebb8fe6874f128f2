use super::{ValueExpressionCreator, comparison_for};
use crate::config::{Culture, FilterConfiguration};
use crate::errors::FilterCreationError;
use crate::expression::{CompareOp, Expr};
use crate::filter::FilterOperator;
use crate::schema::{NumericType, PropertyDescriptor, PropertyType, ScalarType};
use crate::value::Value;

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

/// Integer and floating point properties of every width.
///
/// `~v` does not search digits: it matches `v` and `-v`, so `~5` finds both
/// `5` and `-5` while `~-5` only finds `-5`.
pub struct NumericExpressionCreator;

/// Parses culture-formatted text into a value of the declared width.
pub fn parse_number(numeric: NumericType, text: &str, culture: &Culture) -> Option<Value> {
    let normalized = culture.normalize_number(text)?;

    match numeric.integer_range() {
        Some((min, max)) => {
            let n: i128 = normalized.parse().ok()?;
            if n < min || n > max {
                return None;
            }
            if numeric.is_signed() {
                i64::try_from(n).ok().map(Value::Int)
            } else {
                u64::try_from(n).ok().map(Value::UInt)
            }
        }
        None => {
            let n: f64 = normalized.parse().ok()?;
            let in_range = match numeric {
                NumericType::F32 => n.abs() <= f64::from(f32::MAX),
                _ => n.is_finite(),
            };
            in_range.then_some(Value::Float(n))
        }
    }
}

fn negate(value: &Value) -> Option<Value> {
    match value {
        Value::Int(n) if *n > 0 => Some(Value::Int(-n)),
        Value::Float(n) if *n > 0.0 => Some(Value::Float(-n)),
        _ => None,
    }
}

impl ValueExpressionCreator for NumericExpressionCreator {
    fn can_create_expression_for(&self, property_type: &PropertyType) -> bool {
        matches!(property_type.scalar(), ScalarType::Numeric(_))
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
        let ScalarType::Numeric(numeric) = property.property_type().scalar() else {
            return Err(FilterCreationError::unsupported_operator(
                property,
                operator,
                Some(value),
            ));
        };
        let parsed = parse_number(*numeric, value, configuration.culture())
            .ok_or_else(|| FilterCreationError::unparsable_value(property, operator, value))?;
        let name = property.name();

        if operator == FilterOperator::Contains {
            let exact = Expr::property_compare(CompareOp::Eq, name, parsed.clone());
            return Ok(match negate(&parsed) {
                Some(negated) => Expr::or_any(vec![
                    exact,
                    Expr::property_compare(CompareOp::Eq, name, negated),
                ]),
                None => exact,
            });
        }

        let op = comparison_for(operator).ok_or_else(|| {
            FilterCreationError::unsupported_operator(property, operator, Some(value))
        })?;
        Ok(Expr::property_compare(op, name, parsed))
    }
}
