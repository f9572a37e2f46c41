//! Dataset metadata report.
//!
//! The metadata endpoint answers with JSON-LD whose shape varies between
//! datasets: most fields may be a single object, a list of objects or a plain
//! string. The accessors below accept all three.

use serde_json::Value;

use super::common_error_text;
use crate::dataverse::DataverseError;
use crate::models::DatasetIdentifier;
use crate::utils::{format_date, strip_html, truncate_chars};

/// Descriptions are cut to this many characters
const DESCRIPTION_CHARS: usize = 500;

/// Render a JSON-LD metadata document
pub fn render(metadata: &Value) -> String {
    let is_empty = match metadata {
        Value::Object(map) => map.is_empty(),
        Value::Null => true,
        _ => false,
    };
    if is_empty {
        return "Error: No metadata found in API response.".to_string();
    }

    let mut out = String::from("# Dataset Metadata\n\n");

    let title = text(metadata.get("title"))
        .or_else(|| text(metadata.get("schema:name")))
        .unwrap_or_else(|| "No title available".to_string());
    field(&mut out, "Title", &title);

    if let Some(doi) = text(metadata.get("@id")) {
        field(&mut out, "DOI", &doi);
    }

    let description = description(metadata);
    field(
        &mut out,
        "Description",
        &truncate_chars(&strip_html(&description), DESCRIPTION_CHARS, "..."),
    );

    let authors = people(
        metadata.get("author"),
        "citation:authorName",
        "citation:authorAffiliation",
    );
    if !authors.is_empty() {
        out.push_str("**Authors:**\n");
        for author in &authors {
            out.push_str(&format!("  - {}\n", author));
        }
        out.push('\n');
    }

    if let Some(date) = text(metadata.get("schema:datePublished"))
        .or_else(|| text(metadata.get("dateOfDeposit")))
    {
        field(&mut out, "Publication Date", &format_date(&date));
    }

    let keywords: Vec<String> = entries(metadata.get("citation:keyword"))
        .filter_map(|kw| match kw {
            Value::Object(_) => text(kw.get("citation:keywordValue")),
            other => text(Some(other)),
        })
        .collect();
    if !keywords.is_empty() {
        field(&mut out, "Keywords", &keywords.join(", "));
    }

    let subjects: Vec<String> = entries(metadata.get("subject"))
        .filter_map(|s| text(Some(s)))
        .collect();
    if !subjects.is_empty() {
        field(&mut out, "Subject", &subjects.join(", "));
    }

    if let Some(license) = text(metadata.get("schema:license")) {
        field(&mut out, "License", &license);
    }

    if let Some(alt) = text(metadata.get("alternativeURL"))
        .or_else(|| text(metadata.get("citation:alternativeURL")))
    {
        field(&mut out, "Alternative URL", &alt);
    }

    if let Some(collection) = metadata
        .get("schema:isPartOf")
        .and_then(|part| text(part.get("schema:name")))
    {
        field(&mut out, "Collection", &collection);
    }

    let contacts = people(
        metadata.get("citation:datasetContact"),
        "citation:datasetContactName",
        "citation:datasetContactAffiliation",
    );
    if !contacts.is_empty() {
        field(&mut out, "Contact", &contacts.join(", "));
    }

    if let Some(version) = text(metadata.get("schema:version")) {
        field(&mut out, "Version", &version);
    }

    if let Some(status) = text(metadata.get("schema:creativeWorkStatus")) {
        field(&mut out, "Status", &status);
    }

    out
}

/// Render a failed metadata lookup
pub fn render_error(id: &DatasetIdentifier, err: &DataverseError) -> String {
    if err.status() == Some(reqwest::StatusCode::NOT_FOUND) {
        return format!(
            "Dataset not found: {}\nPlease check the DOI or dataset ID and try again.",
            id
        );
    }
    common_error_text(err, "Unexpected error retrieving metadata")
}

fn field(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("**{}:** {}\n\n", label, value));
}

/// Scalar value as display text; blank strings count as absent
fn text(value: Option<&Value>) -> Option<String> {
    let rendered = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => return text(map.get("@value").or_else(|| map.get("schema:name"))),
        Value::Array(items) => return items.iter().find_map(|v| text(Some(v))),
        Value::Null => return None,
    };
    (!rendered.is_empty()).then_some(rendered)
}

/// Iterate a field that may hold one value or a list of them
fn entries(value: Option<&Value>) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Some(Value::Array(items)) => Box::new(items.iter()),
        Some(Value::Null) | None => Box::new(std::iter::empty()),
        Some(other) => Box::new(std::iter::once(other)),
    }
}

fn description(metadata: &Value) -> String {
    entries(metadata.get("citation:dsDescription"))
        .find_map(|d| match d {
            Value::Object(_) => text(d.get("citation:dsDescriptionValue")),
            other => text(Some(other)),
        })
        .or_else(|| text(metadata.get("schema:description")))
        .unwrap_or_else(|| "No description available".to_string())
}

/// `name (affiliation)` for each entry that has a name
fn people(value: Option<&Value>, name_key: &str, affiliation_key: &str) -> Vec<String> {
    entries(value)
        .filter_map(|person| {
            let name = text(person.get(name_key))?;
            Some(match text(person.get(affiliation_key)) {
                Some(affiliation) => format!("{} ({})", name, affiliation),
                None => name,
            })
        })
        .collect()
}
