use crate::filter::FilterOperator;
use crate::schema::PropertyDescriptor;
use thiserror::Error;

/// Why a filter could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterErrorReason {
    #[error("Filter operator '{operator}' not allowed for property type '{property_type}'")]
    UnsupportedOperator {
        operator: FilterOperator,
        property_type: String,
    },

    #[error("Unable to parse given filter value")]
    UnparsableValue,

    #[error("Property '{property}' does not exist on type '{entity_type}'")]
    UnknownProperty {
        property: String,
        entity_type: String,
    },

    #[error("Property '{property}' of type '{entity_type}' is not filterable")]
    PropertyNotFilterable {
        property: String,
        entity_type: String,
    },

    #[error("Type '{sub_type}' is not derived from '{entity_type}'")]
    NotASubtype {
        sub_type: String,
        entity_type: String,
    },

    #[error("A filter for type '{0}' was already added, use replace to update it")]
    DuplicateSubFilter(String),

    #[error("No filter for type '{0}' exists to be replaced")]
    MissingSubFilter(String),

    #[error("Filter for type '{sub_type}' constrains property '{property}' differently than the filter it is combined with")]
    ConflictingSubFilter { sub_type: String, property: String },
}

/// Error raised while building or compiling an entity filter.
///
/// Carries the offending property, operator and raw value whenever they are
/// known at the point of failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct FilterCreationError {
    reason: FilterErrorReason,
    property: Option<String>,
    operator: Option<FilterOperator>,
    value: Option<String>,
}

impl FilterCreationError {
    pub fn new(reason: FilterErrorReason) -> Self {
        Self {
            reason,
            property: None,
            operator: None,
            value: None,
        }
    }

    pub fn unsupported_operator(
        property: &PropertyDescriptor,
        operator: FilterOperator,
        value: Option<&str>,
    ) -> Self {
        Self::new(FilterErrorReason::UnsupportedOperator {
            operator,
            property_type: property.property_type().to_string(),
        })
        .with_property(property.name())
        .with_operator(operator)
        .with_value(value)
    }

    pub fn unparsable_value(
        property: &PropertyDescriptor,
        operator: FilterOperator,
        value: &str,
    ) -> Self {
        Self::new(FilterErrorReason::UnparsableValue)
            .with_property(property.name())
            .with_operator(operator)
            .with_value(Some(value))
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn with_operator(mut self, operator: FilterOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_value(mut self, value: Option<&str>) -> Self {
        self.value = value.map(str::to_string);
        self
    }

    pub fn reason(&self) -> &FilterErrorReason {
        &self.reason
    }

    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    pub fn operator(&self) -> Option<FilterOperator> {
        self.operator
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Parse failures are the only errors `ignore_parse_exceptions` may suppress.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self.reason, FilterErrorReason::UnparsableValue)
    }
}
