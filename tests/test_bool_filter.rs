use entity_filter::{
    Entity, EntityFilter, EntityType, FilterConfiguration, FilterCreationError, FilterErrorReason,
    PropertyType, Record, Value,
};
use std::sync::Arc;

fn nullable_bool_records() -> (Arc<EntityType>, Vec<Record>) {
    let ty = EntityType::builder("BoolEntity")
        .property("ValueA", PropertyType::boolean().nullable())
        .build()
        .unwrap();
    let records = [Some(true), Some(false), None]
        .into_iter()
        .map(|v| Record::new(ty.clone()).with("ValueA", v))
        .collect();
    (ty, records)
}

fn filtered(
    entity_type: &Arc<EntityType>,
    records: &[Record],
    syntax: &str,
    ignore_parse_exceptions: bool,
) -> Result<Vec<Value>, FilterCreationError> {
    let configuration =
        FilterConfiguration::new().with_ignore_parse_exceptions(ignore_parse_exceptions);
    let mut filter = EntityFilter::with_configuration(entity_type.clone(), Arc::new(configuration));
    filter.add("ValueA", syntax)?;
    Ok(filter
        .compile()?
        .filter(records)
        .into_iter()
        .map(|r| r.property_value("ValueA"))
        .collect())
}

#[test]
fn test_bool_literals() {
    let (ty, records) = nullable_bool_records();

    for syntax in ["true", "=TRUE", "==1", "yes", "Yes"] {
        assert_eq!(
            filtered(&ty, &records, syntax, false).unwrap(),
            vec![Value::Bool(true)],
            "{syntax}"
        );
    }
    for syntax in ["false", "0", "=no"] {
        assert_eq!(
            filtered(&ty, &records, syntax, false).unwrap(),
            vec![Value::Bool(false)],
            "{syntax}"
        );
    }
}

#[test]
fn test_not_true_or_not_false_matches_all_including_null() {
    let (ty, records) = nullable_bool_records();
    let result = filtered(&ty, &records, "!true, !false", false).unwrap();
    assert_eq!(
        result,
        vec![Value::Bool(true), Value::Bool(false), Value::Null]
    );
}

#[test]
fn test_equal_values_are_ored() {
    let (ty, records) = nullable_bool_records();
    let result = filtered(&ty, &records, "=true, false", false).unwrap();
    assert_eq!(result, vec![Value::Bool(true), Value::Bool(false)]);
}

#[test]
fn test_not_equal_includes_null() {
    let (ty, records) = nullable_bool_records();
    let result = filtered(&ty, &records, "!true", false).unwrap();
    assert_eq!(result, vec![Value::Bool(false), Value::Null]);
}

#[test]
fn test_null_tests_on_nullable_bool() {
    let (ty, records) = nullable_bool_records();
    assert_eq!(
        filtered(&ty, &records, "ISNULL", false).unwrap(),
        vec![Value::Null]
    );
    assert_eq!(
        filtered(&ty, &records, "notnull", false).unwrap(),
        vec![Value::Bool(true), Value::Bool(false)]
    );
}

#[test]
fn test_null_literal_is_a_parse_failure() {
    let (ty, records) = nullable_bool_records();

    let err = filtered(&ty, &records, "null", false).unwrap_err();
    assert!(err.is_parse_failure());

    let result = filtered(&ty, &records, "null", true).unwrap();
    assert_eq!(result.len(), 3);
}

#[test]
fn test_contains_and_ordering_are_unsupported() {
    let (ty, records) = nullable_bool_records();

    let err = filtered(&ty, &records, "~", true).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Filter operator 'Contains' not allowed for property type 'bool?'"
    );

    for syntax in ["<true", "<=true", ">false", ">=false"] {
        let err = filtered(&ty, &records, syntax, true).unwrap_err();
        assert!(
            matches!(err.reason(), FilterErrorReason::UnsupportedOperator { .. }),
            "{syntax}"
        );
    }
}

#[test]
fn test_null_test_on_non_nullable_bool_is_unsupported() {
    let ty = EntityType::builder("StrictBool")
        .property("ValueA", PropertyType::boolean())
        .build()
        .unwrap();
    let records = vec![Record::new(ty.clone()).with("ValueA", true)];

    let err = filtered(&ty, &records, "ISNULL", true).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Filter operator 'IsNull' not allowed for property type 'bool'"
    );
}

#[test]
fn test_whitespace_filter_keeps_every_record() {
    let (ty, records) = nullable_bool_records();
    assert_eq!(
        filtered(&ty, &records, "  ", false).unwrap(),
        vec![Value::Bool(true), Value::Bool(false), Value::Null]
    );
}
