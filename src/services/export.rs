//! CSV and JSON export of bookmarks together with their group names.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::types::bookmark::Bookmark;
use crate::types::group::Group;

const CSV_HEADERS: [&str; 6] = ["title", "url", "type", "color", "groupName", "createdAt"];

/// Group name used when a bookmark points at a group that is not known.
pub const UNKNOWN_GROUP: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}

/// One exported row, flattened for spreadsheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub title: String,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub color: Option<String>,
    pub group_name: String,
    /// ISO-8601, UTC.
    pub created_at: String,
}

impl ExportRow {
    fn field(&self, header: &str) -> &str {
        match header {
            "title" => &self.title,
            "url" => self.url.as_deref().unwrap_or(""),
            "type" => &self.kind,
            "color" => self.color.as_deref().unwrap_or(""),
            "groupName" => &self.group_name,
            "createdAt" => &self.created_at,
            _ => "",
        }
    }
}

fn iso_timestamp(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Joins bookmarks with the names of their groups.
pub fn prepare_rows(bookmarks: &[Bookmark], groups: &[Group]) -> Vec<ExportRow> {
    let names: HashMap<&str, &str> = groups
        .iter()
        .map(|g| (g.id.as_str(), g.name.as_str()))
        .collect();

    bookmarks
        .iter()
        .map(|b| ExportRow {
            title: b.title.clone(),
            url: b.url.clone(),
            kind: b.kind.as_str().to_string(),
            color: b.color.clone(),
            group_name: names
                .get(b.group_id.as_str())
                .copied()
                .unwrap_or(UNKNOWN_GROUP)
                .to_string(),
            created_at: iso_timestamp(b.created_at),
        })
        .collect()
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADERS.join(","));
    for row in rows {
        let cells: Vec<String> = CSV_HEADERS
            .iter()
            .map(|header| csv_escape(row.field(header)))
            .collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

pub fn to_json(rows: &[ExportRow]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(rows)
}

/// `minimal.so-<date>.<ext>`
pub fn export_filename(format: ExportFormat, date: NaiveDate) -> String {
    format!("minimal.so-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

pub fn export_filename_today(format: ExportFormat) -> String {
    export_filename(format, Utc::now().date_naive())
}
