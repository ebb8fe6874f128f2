use entity_filter::{
    Culture, Entity, EntityFilter, EntityType, EnumType, FilterConfiguration, FilterCreationError,
    FilterErrorReason, PropertyType, Record, Value,
};
use std::sync::Arc;

fn color() -> Arc<EnumType> {
    Arc::new(EnumType::new(
        "Color",
        [("Red", 1), ("Green", 2), ("Blue", 3), ("DarkRed", 4)],
    ))
}

fn painted(nullable: bool) -> (Arc<EntityType>, Vec<Record>) {
    let property_type = PropertyType::enumeration(color());
    let ty = EntityType::builder("Painted")
        .property(
            "Color",
            if nullable {
                property_type.nullable()
            } else {
                property_type
            },
        )
        .build()
        .unwrap();
    let records = [Some(1i64), Some(2), Some(3), Some(4), None]
        .into_iter()
        .map(|code| Record::new(ty.clone()).with("Color", code))
        .collect();
    (ty, records)
}

fn codes(
    entity_type: &Arc<EntityType>,
    records: &[Record],
    syntax: &str,
) -> Result<Vec<Value>, FilterCreationError> {
    let mut filter = EntityFilter::with_configuration(
        entity_type.clone(),
        Arc::new(FilterConfiguration::new()),
    );
    filter.add("Color", syntax)?;
    Ok(filter
        .compile()?
        .filter(records)
        .into_iter()
        .map(|r| r.property_value("Color"))
        .collect())
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|v| Value::Int(*v)).collect()
}

#[test]
fn test_names_match_case_insensitively() {
    let (ty, records) = painted(true);
    assert_eq!(codes(&ty, &records, "red").unwrap(), ints(&[1]));
    assert_eq!(codes(&ty, &records, "=GREEN").unwrap(), ints(&[2]));
    assert_eq!(codes(&ty, &records, "red, blue").unwrap(), ints(&[1, 3]));
}

#[test]
fn test_case_sensitive_names() {
    let (ty, records) = painted(true);
    assert_eq!(codes(&ty, &records, "==Red").unwrap(), ints(&[1]));
    assert_eq!(codes(&ty, &records, "==red").unwrap(), ints(&[]));
}

#[test]
fn test_contains_searches_variant_names() {
    let (ty, records) = painted(true);
    assert_eq!(codes(&ty, &records, "~red").unwrap(), ints(&[1, 4]));
    assert_eq!(codes(&ty, &records, "~E").unwrap(), ints(&[1, 2, 3, 4]));
}

#[test]
fn test_numeric_codes() {
    let (ty, records) = painted(true);
    assert_eq!(codes(&ty, &records, "2").unwrap(), ints(&[2]));
    assert_eq!(codes(&ty, &records, ">2").unwrap(), ints(&[3, 4]));
}

#[test]
fn test_ordering_by_name_uses_codes() {
    let (ty, records) = painted(true);
    assert_eq!(codes(&ty, &records, ">=Blue").unwrap(), ints(&[3, 4]));
    assert_eq!(codes(&ty, &records, "<green").unwrap(), ints(&[1]));
}

#[test]
fn test_not_equal_name_keeps_null() {
    let (ty, records) = painted(true);
    let mut expected = ints(&[2, 3, 4]);
    expected.push(Value::Null);
    assert_eq!(codes(&ty, &records, "!red").unwrap(), expected);
}

#[test]
fn test_unknown_name_matches_nothing() {
    let (ty, records) = painted(true);
    assert_eq!(codes(&ty, &records, "Purple").unwrap(), ints(&[]));
}

#[test]
fn test_null_tests_require_nullable_enum() {
    let (ty, records) = painted(true);
    assert_eq!(
        codes(&ty, &records, "ISNULL").unwrap(),
        vec![Value::Null]
    );

    let (ty, records) = painted(false);
    let err = codes(&ty, &records, "ISNULL").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Filter operator 'IsNull' not allowed for property type 'Color'"
    );
}

#[test]
fn test_empty_value_is_a_parse_failure() {
    let (ty, records) = painted(true);
    let err = codes(&ty, &records, "=").unwrap_err();
    assert_eq!(err.reason(), &FilterErrorReason::UnparsableValue);
}

#[test]
fn test_whitespace_filter_keeps_every_record() {
    let (ty, records) = painted(true);
    assert_eq!(codes(&ty, &records, "  ").unwrap().len(), records.len());
}

#[test]
fn test_numeric_codes_follow_culture() {
    let weight = Arc::new(EnumType::new("Weight", [("Light", 1), ("Heavy", 1000)]));
    let ty = EntityType::builder("Parcel")
        .property("Weight", PropertyType::enumeration(weight))
        .build()
        .unwrap();
    let records: Vec<Record> = [1i64, 1000]
        .into_iter()
        .map(|code| Record::new(ty.clone()).with("Weight", code))
        .collect();

    let german = FilterConfiguration::new().with_culture("de-DE".parse::<Culture>().unwrap());
    let mut filter = EntityFilter::with_configuration(ty.clone(), Arc::new(german));
    filter.add("Weight", "1.000").unwrap();
    let matched: Vec<Value> = filter
        .compile()
        .unwrap()
        .filter(&records)
        .into_iter()
        .map(|r| r.property_value("Weight"))
        .collect();
    assert_eq!(matched, ints(&[1000]));
}
