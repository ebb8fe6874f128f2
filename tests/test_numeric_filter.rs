use entity_filter::{
    Culture, Entity, EntityFilter, EntityType, FilterConfiguration, FilterCreationError,
    FilterErrorReason, FilterOperator, NumericType, PropertyType, Record, Value,
};
use std::sync::Arc;

fn entity_type(numeric: NumericType, nullable: bool) -> Arc<EntityType> {
    let property_type = PropertyType::numeric(numeric);
    EntityType::builder("NumericEntity")
        .property(
            "ValueA",
            if nullable {
                property_type.nullable()
            } else {
                property_type
            },
        )
        .build()
        .unwrap()
}

fn records<V: Into<Value> + Clone>(entity_type: &Arc<EntityType>, values: &[V]) -> Vec<Record> {
    values
        .iter()
        .map(|v| Record::new(entity_type.clone()).with("ValueA", v.clone()))
        .collect()
}

fn filtered(
    entity_type: &Arc<EntityType>,
    records: &[Record],
    syntax: &str,
    configuration: FilterConfiguration,
) -> Result<Vec<Value>, FilterCreationError> {
    let mut filter = EntityFilter::with_configuration(entity_type.clone(), Arc::new(configuration));
    filter.add("ValueA", syntax)?;
    let compiled = filter.compile()?;
    Ok(compiled
        .filter(records)
        .into_iter()
        .map(|r| r.property_value("ValueA"))
        .collect())
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|v| Value::Int(*v)).collect()
}

fn short_scenario() -> (Arc<EntityType>, Vec<Record>) {
    let ty = entity_type(NumericType::I16, false);
    let records = records(&ty, &[-9i16, -5, 0, 5, 9]);
    (ty, records)
}

#[test]
fn test_short_less_than_or_equal_negative() {
    let (ty, records) = short_scenario();
    let result = filtered(&ty, &records, "<=-5", FilterConfiguration::new()).unwrap();
    assert_eq!(result, ints(&[-9, -5]));
}

#[test]
fn test_short_contains_matches_both_signs() {
    let (ty, records) = short_scenario();
    let strict = FilterConfiguration::new;

    assert_eq!(filtered(&ty, &records, "~5", strict()).unwrap(), ints(&[-5, 5]));
    assert_eq!(filtered(&ty, &records, "~-5", strict()).unwrap(), ints(&[-5]));
    assert_eq!(filtered(&ty, &records, "~3", strict()).unwrap(), ints(&[]));
    assert_eq!(filtered(&ty, &records, "~0", strict()).unwrap(), ints(&[0]));
}

#[test]
fn test_short_comparison_operators() {
    let (ty, records) = short_scenario();
    let strict = FilterConfiguration::new;

    assert_eq!(filtered(&ty, &records, "-5", strict()).unwrap(), ints(&[-5]));
    assert_eq!(filtered(&ty, &records, "=5", strict()).unwrap(), ints(&[5]));
    assert_eq!(filtered(&ty, &records, "==5", strict()).unwrap(), ints(&[5]));
    assert_eq!(
        filtered(&ty, &records, "!0", strict()).unwrap(),
        ints(&[-9, -5, 5, 9])
    );
    assert_eq!(filtered(&ty, &records, "<0", strict()).unwrap(), ints(&[-9, -5]));
    assert_eq!(filtered(&ty, &records, ">5", strict()).unwrap(), ints(&[9]));
    assert_eq!(filtered(&ty, &records, ">=5", strict()).unwrap(), ints(&[5, 9]));
    assert_eq!(
        filtered(&ty, &records, ">=5, <=-5", strict()).unwrap(),
        ints(&[-9, -5, 5, 9])
    );
    assert_eq!(
        filtered(&ty, &records, "-9, 9", strict()).unwrap(),
        ints(&[-9, 9])
    );
}

#[test]
fn test_short_unparsable_values_raise() {
    let (ty, records) = short_scenario();

    for syntax in ["=null", "<", "abc", "1.5", "40000"] {
        let err = filtered(&ty, &records, syntax, FilterConfiguration::new()).unwrap_err();
        assert_eq!(err.reason(), &FilterErrorReason::UnparsableValue, "{syntax}");
        assert_eq!(err.to_string(), "Unable to parse given filter value");
        assert_eq!(err.property(), Some("ValueA"));
    }
}

#[test]
fn test_short_unparsable_values_ignored_match_everything() {
    let (ty, records) = short_scenario();
    let lenient = FilterConfiguration::new().with_ignore_parse_exceptions(true);

    let result = filtered(&ty, &records, "=null", lenient.clone()).unwrap();
    assert_eq!(result.len(), 5);

    // Only the bad value is dropped
    let result = filtered(&ty, &records, "abc, 9", lenient).unwrap();
    assert_eq!(result, ints(&[9]));
}

#[test]
fn test_null_tests_on_non_nullable_raise_even_when_lenient() {
    let (ty, records) = short_scenario();
    let lenient = FilterConfiguration::new().with_ignore_parse_exceptions(true);

    for syntax in ["ISNULL", "NOTNULL"] {
        let err = filtered(&ty, &records, syntax, lenient.clone()).unwrap_err();
        assert!(
            matches!(err.reason(), FilterErrorReason::UnsupportedOperator { .. }),
            "{syntax}"
        );
    }
    let err = filtered(&ty, &records, "ISNULL", FilterConfiguration::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Filter operator 'IsNull' not allowed for property type 'i16'"
    );
    assert_eq!(err.operator(), Some(FilterOperator::IsNull));
}

#[test]
fn test_nullable_short_null_tests() {
    let ty = entity_type(NumericType::I16, true);
    let records = records(&ty, &[Some(-5i16), None, Some(5)]);
    let strict = FilterConfiguration::new;

    assert_eq!(
        filtered(&ty, &records, "ISNULL", strict()).unwrap(),
        vec![Value::Null]
    );
    assert_eq!(
        filtered(&ty, &records, "NOTNULL", strict()).unwrap(),
        ints(&[-5, 5])
    );
    assert_eq!(
        filtered(&ty, &records, "!5", strict()).unwrap(),
        vec![Value::Int(-5), Value::Null]
    );
    assert_eq!(
        filtered(&ty, &records, "ISNULL, 5", strict()).unwrap(),
        vec![Value::Null, Value::Int(5)]
    );
    assert_eq!(filtered(&ty, &records, "<0", strict()).unwrap(), ints(&[-5]));
}

#[test]
fn test_unsigned_contains_is_plain_equality() {
    let ty = entity_type(NumericType::U32, false);
    let records = records(&ty, &[1u64, 5, 7]);
    let result = filtered(&ty, &records, "~5", FilterConfiguration::new()).unwrap();
    assert_eq!(result, vec![Value::UInt(5)]);

    let err = filtered(&ty, &records, "-1", FilterConfiguration::new()).unwrap_err();
    assert!(err.is_parse_failure());
}

#[test]
fn test_double_parsing_follows_culture() {
    let ty = entity_type(NumericType::F64, false);
    let records = records(&ty, &[-2.5f64, 1.5, 2.5, 1234.5]);

    let german = FilterConfiguration::new().with_culture("de-DE".parse::<Culture>().unwrap());
    let mut filter = EntityFilter::with_configuration(ty.clone(), Arc::new(german.clone()));
    filter
        .add_values("ValueA", FilterOperator::Default, ["1,5"])
        .unwrap();
    let matched: Vec<Value> = filter
        .compile()
        .unwrap()
        .filter(&records)
        .into_iter()
        .map(|r| r.property_value("ValueA"))
        .collect();
    assert_eq!(matched, vec![Value::Float(1.5)]);

    // In filter syntax the comma separates values.
    assert_eq!(
        filtered(&ty, &records, "1,5", german.clone()).unwrap(),
        Vec::<Value>::new()
    );
    assert_eq!(
        filtered(&ty, &records, "1,5,2,5", german.clone()).unwrap(),
        Vec::<Value>::new()
    );
    assert_eq!(
        filtered(&ty, &records, ">1.000", german).unwrap(),
        vec![Value::Float(1234.5)]
    );

    assert_eq!(
        filtered(&ty, &records, "~2.5", FilterConfiguration::new()).unwrap(),
        vec![Value::Float(-2.5), Value::Float(2.5)]
    );
}

#[test]
fn test_integer_filter_matches_wider_stored_values() {
    let ty = entity_type(NumericType::I64, false);
    let records = records(&ty, &[i64::MIN, 0, i64::MAX]);
    let result = filtered(&ty, &records, ">0", FilterConfiguration::new()).unwrap();
    assert_eq!(result, ints(&[i64::MAX]));
}

#[test]
fn test_whitespace_filter_keeps_every_record() {
    let (ty, records) = short_scenario();
    for syntax in ["", "   ", "\t"] {
        let result = filtered(&ty, &records, syntax, FilterConfiguration::new()).unwrap();
        assert_eq!(result, ints(&[-9, -5, 0, 5, 9]), "{syntax:?}");
    }
}
