//! Rendering of CLI results as text tables or JSON.

use crate::filter::{CompiledFilter, EntityFilter, SubFilterKind, creator_for};
use crate::record::{Record, TYPE_FIELD};
use crate::schema::EntityType;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use serde_json::{Value as JsonValue, json};
use std::fmt::Write as _;

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    table
}

fn cell_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "-".to_string(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Matching records as a table with one column per property of `entity_type`.
pub fn format_records_text(entity_type: &EntityType, matches: &[&Record], total: usize) -> String {
    let mut out = String::new();
    let properties = entity_type.properties();

    let mut headers = vec![TYPE_FIELD];
    headers.extend(properties.iter().map(|p| p.name()));
    let mut table = create_styled_table(&headers);

    for record in matches {
        let json = record.to_json();
        let mut row = vec![Cell::new(cell_text(&json[TYPE_FIELD]))];
        row.extend(
            properties
                .iter()
                .map(|p| Cell::new(cell_text(&json[p.name()]))),
        );
        table.add_row(row);
    }

    if !matches.is_empty() {
        let _ = writeln!(out, "{table}");
    }
    let summary = format!("{} of {} records matched", matches.len(), total);
    let _ = writeln!(
        out,
        "{}",
        if matches.is_empty() {
            summary.yellow().bold()
        } else {
            summary.green().bold()
        }
    );
    out
}

pub fn format_records_json(matches: &[&Record]) -> String {
    let records: Vec<JsonValue> = matches.iter().map(|r| r.to_json()).collect();
    serde_json::to_string_pretty(&records).unwrap_or_default()
}

fn describe_sub_filter_kind(kind: SubFilterKind) -> &'static str {
    match kind {
        SubFilterKind::DerivedClass => "derived",
        SubFilterKind::Subclass { inclusive: true } => "subclass",
        SubFilterKind::Subclass { inclusive: false } => "subclass (exact)",
    }
}

pub fn format_explain_text(filter: &EntityFilter, compiled: &CompiledFilter) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        "Entity type:".bold().bright_blue(),
        filter.entity_type().name()
    );

    if filter.is_empty() {
        let _ = writeln!(out, "  {}", "no property filters".dimmed());
    }
    for property_filter in filter.property_filters() {
        let _ = writeln!(
            out,
            "  {} {}",
            format!("{}:", property_filter.name()).cyan(),
            property_filter.syntax()
        );
    }
    for sub_filter in filter.sub_filters() {
        let _ = writeln!(
            out,
            "  {} {}",
            format!("[{}]", describe_sub_filter_kind(sub_filter.kind())).magenta(),
            sub_filter.target_type().name()
        );
        for property_filter in sub_filter.filter().property_filters() {
            let _ = writeln!(
                out,
                "    {} {}",
                format!("{}:", property_filter.name()).cyan(),
                property_filter.syntax()
            );
        }
    }

    let _ = writeln!(out, "{}", "Predicate:".bold().bright_blue());
    let _ = writeln!(out, "  {compiled}");
    out
}

pub fn format_explain_json(compiled: &CompiledFilter) -> String {
    let document = json!({
        "entity_type": compiled.entity_type().name(),
        "predicate": compiled.to_string(),
        "expression": compiled.expression(),
    });
    serde_json::to_string_pretty(&document).unwrap_or_default()
}

fn operator_symbols(entity_type: &EntityType, property: &str) -> Vec<String> {
    entity_type
        .property(property)
        .map(|p| {
            creator_for(p.property_type())
                .supported_filter_operators()
                .iter()
                .map(|op| match op.symbol() {
                    "" => "(none)".to_string(),
                    symbol => symbol.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn format_describe_text(entity_type: &EntityType) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        "Entity type:".bold().bright_blue(),
        entity_type.name()
    );
    if let Some(base) = entity_type.base() {
        let _ = writeln!(out, "{} {}", "Derives from:".bold(), base.name());
    }

    let mut table = create_styled_table(&["Property", "Type", "Parameter", "Operators"]);
    for property in entity_type.filterable_properties() {
        let operators = operator_symbols(entity_type, property.name());
        table.add_row(vec![
            Cell::new(property.name()),
            Cell::new(property.property_type()),
            Cell::new(entity_type.filter_parameter_name(property.name())),
            Cell::new(if operators.is_empty() {
                "not filterable".to_string()
            } else {
                operators.join(" ")
            }),
        ]);
    }
    let _ = writeln!(out, "{table}");
    out
}

pub fn format_describe_json(entity_type: &EntityType) -> String {
    let properties: Vec<JsonValue> = entity_type
        .filterable_properties()
        .iter()
        .map(|p| {
            json!({
                "name": p.name(),
                "type": p.property_type().to_string(),
                "parameter": entity_type.filter_parameter_name(p.name()),
                "operators": creator_for(p.property_type())
                    .supported_filter_operators()
                    .iter()
                    .map(|op| op.name())
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    let document = json!({
        "entity_type": entity_type.name(),
        "base": entity_type.base().map(|b| b.name()),
        "properties": properties,
    });
    serde_json::to_string_pretty(&document).unwrap_or_default()
}
