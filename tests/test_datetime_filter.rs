use chrono::{NaiveDate, NaiveDateTime};
use entity_filter::{
    Culture, Entity, EntityFilter, EntityType, FilterConfiguration, FilterCreationError,
    PropertyType, Record, Value,
};
use std::sync::Arc;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

fn moments() -> (Arc<EntityType>, Vec<Record>) {
    let ty = EntityType::builder("Event")
        .property("At", PropertyType::date_time().nullable())
        .build()
        .unwrap();
    let records = [
        Some(at(2020, 1, 1, 0, 0, 0)),
        Some(at(2020, 1, 1, 23, 59, 59)),
        Some(at(2020, 1, 2, 0, 0, 0)),
        Some(at(2019, 12, 31, 12, 0, 0)),
        None,
    ]
    .into_iter()
    .map(|v| Record::new(ty.clone()).with("At", v))
    .collect();
    (ty, records)
}

fn matching(
    entity_type: &Arc<EntityType>,
    records: &[Record],
    property: &str,
    syntax: &str,
    configuration: FilterConfiguration,
) -> Result<Vec<Value>, FilterCreationError> {
    let mut filter = EntityFilter::with_configuration(entity_type.clone(), Arc::new(configuration));
    filter.add(property, syntax)?;
    Ok(filter
        .compile()?
        .filter(records)
        .into_iter()
        .map(|r| r.property_value(property))
        .collect())
}

fn values(moments: &[NaiveDateTime]) -> Vec<Value> {
    moments.iter().map(|m| Value::DateTime(*m)).collect()
}

#[test]
fn test_date_only_equality_covers_whole_day() {
    let (ty, records) = moments();
    let expected = values(&[at(2020, 1, 1, 0, 0, 0), at(2020, 1, 1, 23, 59, 59)]);

    for syntax in ["2020-01-01", "=2020-01-01", "==2020-01-01", "~2020-01-01"] {
        assert_eq!(
            matching(&ty, &records, "At", syntax, FilterConfiguration::new()).unwrap(),
            expected,
            "{syntax}"
        );
    }
}

#[test]
fn test_date_only_not_equal_excludes_whole_day() {
    let (ty, records) = moments();
    let mut expected = values(&[at(2020, 1, 2, 0, 0, 0), at(2019, 12, 31, 12, 0, 0)]);
    expected.push(Value::Null);
    assert_eq!(
        matching(&ty, &records, "At", "!2020-01-01", FilterConfiguration::new()).unwrap(),
        expected
    );
}

#[test]
fn test_date_only_ordering_uses_day_boundaries() {
    let (ty, records) = moments();
    let config = FilterConfiguration::new;

    assert_eq!(
        matching(&ty, &records, "At", "<2020-01-01", config()).unwrap(),
        values(&[at(2019, 12, 31, 12, 0, 0)])
    );
    assert_eq!(
        matching(&ty, &records, "At", "<=2020-01-01", config()).unwrap(),
        values(&[
            at(2020, 1, 1, 0, 0, 0),
            at(2020, 1, 1, 23, 59, 59),
            at(2019, 12, 31, 12, 0, 0)
        ])
    );
    assert_eq!(
        matching(&ty, &records, "At", ">2020-01-01", config()).unwrap(),
        values(&[at(2020, 1, 2, 0, 0, 0)])
    );
    assert_eq!(
        matching(&ty, &records, "At", ">=2020-01-01", config()).unwrap(),
        values(&[
            at(2020, 1, 1, 0, 0, 0),
            at(2020, 1, 1, 23, 59, 59),
            at(2020, 1, 2, 0, 0, 0)
        ])
    );
}

#[test]
fn test_date_time_values_are_exact() {
    let (ty, records) = moments();
    assert_eq!(
        matching(
            &ty,
            &records,
            "At",
            "2020-01-01T23:59:59",
            FilterConfiguration::new()
        )
        .unwrap(),
        values(&[at(2020, 1, 1, 23, 59, 59)])
    );
    assert_eq!(
        matching(
            &ty,
            &records,
            "At",
            ">2020-01-01 23:59",
            FilterConfiguration::new()
        )
        .unwrap(),
        values(&[at(2020, 1, 1, 23, 59, 59), at(2020, 1, 2, 0, 0, 0)])
    );
    assert_eq!(
        matching(
            &ty,
            &records,
            "At",
            "2020-01-02T02:00:00+02:00",
            FilterConfiguration::new()
        )
        .unwrap(),
        values(&[at(2020, 1, 2, 0, 0, 0)])
    );
}

#[test]
fn test_culture_short_dates() {
    let (ty, records) = moments();
    let german = FilterConfiguration::new().with_culture("de-DE".parse::<Culture>().unwrap());
    let american = FilterConfiguration::new().with_culture("en-US".parse::<Culture>().unwrap());

    assert_eq!(
        matching(&ty, &records, "At", "01.01.2020", german).unwrap(),
        values(&[at(2020, 1, 1, 0, 0, 0), at(2020, 1, 1, 23, 59, 59)])
    );
    assert_eq!(
        matching(&ty, &records, "At", "01/02/2020", american).unwrap(),
        values(&[at(2020, 1, 2, 0, 0, 0)])
    );
}

#[test]
fn test_null_tests_and_parse_failures() {
    let (ty, records) = moments();
    assert_eq!(
        matching(&ty, &records, "At", "ISNULL", FilterConfiguration::new()).unwrap(),
        vec![Value::Null]
    );

    let err = matching(&ty, &records, "At", "yesterday", FilterConfiguration::new()).unwrap_err();
    assert!(err.is_parse_failure());

    let lenient = FilterConfiguration::new().with_ignore_parse_exceptions(true);
    assert_eq!(
        matching(&ty, &records, "At", "yesterday", lenient)
            .unwrap()
            .len(),
        5
    );
}

#[test]
fn test_date_property_compares_days() {
    let ty = EntityType::builder("Booking")
        .property("Day", PropertyType::date())
        .build()
        .unwrap();
    let first = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let second = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let records: Vec<Record> = [first, second]
        .into_iter()
        .map(|d| Record::new(ty.clone()).with("Day", d))
        .collect();

    assert_eq!(
        matching(&ty, &records, "Day", ">2020-01-01", FilterConfiguration::new()).unwrap(),
        vec![Value::Date(second)]
    );
    assert_eq!(
        matching(&ty, &records, "Day", "2020-01-01T18:00:00", FilterConfiguration::new()).unwrap(),
        vec![Value::Date(first)]
    );

    let err = matching(&ty, &records, "Day", "NOTNULL", FilterConfiguration::new()).unwrap_err();
    assert!(!err.is_parse_failure());
}

#[test]
fn test_whitespace_filter_keeps_every_record() {
    let (ty, records) = moments();
    assert_eq!(
        matching(&ty, &records, "At", "   ", FilterConfiguration::new())
            .unwrap()
            .len(),
        records.len()
    );
}
