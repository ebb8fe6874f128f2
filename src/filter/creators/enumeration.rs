use super::{StringExpressionCreator, ValueExpressionCreator, comparison_for};
use crate::config::FilterConfiguration;
use crate::errors::FilterCreationError;
use crate::expression::{CompareOp, Expr};
use crate::filter::FilterOperator;
use crate::record::Record;
use crate::schema::{EntityType, PropertyDescriptor, PropertyType, ScalarType};
use crate::value::Value;
use lazy_static::lazy_static;
use std::sync::Arc;

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

const NAME: &str = "Name";

lazy_static! {
    /// Stand-in entity the variant names are matched against.
    static ref VARIANT_TYPE: Arc<EntityType> = EntityType::builder("EnumVariant")
        .property(NAME, PropertyType::string())
        .build()
        .expect("valid enum variant type");
}

/// Enumerations compare by numeric code.
///
/// The value is either a code or a variant name. Names are matched with the
/// string rules (`~` substring, `==` exact case, anything else
/// case-insensitive) and every matching variant contributes its code.
pub struct EnumExpressionCreator;

impl ValueExpressionCreator for EnumExpressionCreator {
    fn can_create_expression_for(&self, property_type: &PropertyType) -> bool {
        matches!(property_type.scalar(), ScalarType::Enum(_))
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
        let ScalarType::Enum(enum_type) = property.property_type().scalar() else {
            return Err(FilterCreationError::unsupported_operator(
                property,
                operator,
                Some(value),
            ));
        };
        if operator.is_null_test() {
            return Err(FilterCreationError::unsupported_operator(
                property,
                operator,
                Some(value),
            ));
        }
        let text = value.trim();
        if text.is_empty() {
            return Err(FilterCreationError::unparsable_value(property, operator, value));
        }

        let op = comparison_for(operator).unwrap_or(CompareOp::Eq);
        let name = property.name();

        let code = configuration
            .culture()
            .normalize_number(text)
            .and_then(|normalized| normalized.parse::<i64>().ok());
        if let Some(code) = code {
            return Ok(Expr::property_compare(op, name, code));
        }

        let name_operator = match operator {
            FilterOperator::Contains
            | FilterOperator::EqualCaseSensitive
            | FilterOperator::EqualCaseInsensitive => operator,
            _ => FilterOperator::EqualCaseInsensitive,
        };
        let name_property = VARIANT_TYPE.property(NAME).ok_or_else(|| {
            FilterCreationError::unsupported_operator(property, operator, Some(value))
        })?;
        let name_filter = StringExpressionCreator.create_expression_for_value(
            name_property,
            name_operator,
            text,
            configuration,
        )?;

        let per_code: Vec<Expr> = enum_type
            .variants()
            .iter()
            .filter(|variant| {
                let candidate = Record::new(VARIANT_TYPE.clone()).with(NAME, variant.name.as_str());
                name_filter.evaluate(&candidate)
            })
            .map(|variant| Expr::property_compare(op, name, Value::Int(variant.code)))
            .collect();

        Ok(match (op, per_code.is_empty()) {
            (_, true) => Expr::Constant(false),
            // Excluding several names must exclude each of them.
            (CompareOp::Ne, false) => Expr::and_all(per_code),
            _ => Expr::or_any(per_code),
        })
    }
}
