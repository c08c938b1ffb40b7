//! Text rendering shared by the list and describe commands.

use crate::api::service::Version;
use chrono::{DateTime, Utc};
use prettytable::{format::FormatBuilder, Row, Table};
use serde::Serialize;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Renders rows as a borderless, left-aligned table.
pub fn table(header: Row, rows: Vec<Row>) -> String {
    let mut table = Table::new();
    table.set_titles(header);
    for row in rows {
        table.add_row(row);
    }

    let format = FormatBuilder::new()
        .column_separator(' ')
        .padding(0, 1)
        .build();
    table.set_format(format);

    table
        .to_string()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn optional_time(time: &Option<DateTime<Utc>>) -> String {
    time.as_ref().map(format_time).unwrap_or_default()
}

pub fn to_json<T: Serialize>(value: &T) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}

/// Accumulates `Key: value` lines with a fixed indent.
#[derive(Debug, Default)]
pub struct Block {
    lines: Vec<String>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, indent: usize, text: impl AsRef<str>) -> &mut Self {
        self.lines
            .push(format!("{}{}", "\t".repeat(indent), text.as_ref()));
        self
    }

    pub fn field(&mut self, indent: usize, key: &str, value: impl std::fmt::Display) -> &mut Self {
        self.line(indent, format!("{key}: {value}"))
    }

    pub fn time(&mut self, indent: usize, key: &str, time: &Option<DateTime<Utc>>) -> &mut Self {
        if let Some(time) = time {
            self.field(indent, key, format_time(time));
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn version(&mut self, indent: usize, version: &Version) -> &mut Self {
        self.field(indent, "Number", version.number);
        if !version.comment.is_empty() {
            self.field(indent, "Comment", &version.comment);
        }
        self.field(indent, "Service ID", &version.service_id)
            .field(indent, "Active", version.active)
            .field(indent, "Locked", version.locked)
            .field(indent, "Deployed", version.deployed)
            .field(indent, "Staging", version.staging)
            .field(indent, "Testing", version.testing)
            .time(indent, "Created (UTC)", &version.created_at)
            .time(indent, "Last edited (UTC)", &version.updated_at)
            .time(indent, "Deleted (UTC)", &version.deleted_at)
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use prettytable::row;

    #[test]
    fn test_table_aligns_columns_without_borders() {
        let rendered = table(
            row!["NAME", "CODE"],
            vec![row!["Amsterdam", "AMS"], row!["Tokyo", "TYO"]],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split_whitespace().collect::<Vec<_>>(), ["NAME", "CODE"]);
        assert_eq!(lines[1].find("AMS"), lines[0].find("CODE"));
        assert_eq!(lines[2].find("TYO"), lines[0].find("CODE"));
        assert!(!lines.iter().any(|l| l.contains('|') || l.ends_with(' ')));
    }

    #[test]
    fn test_version_block_skips_empty_fields() {
        let version = Version {
            number: 3,
            service_id: "abc".into(),
            active: true,
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            ..Default::default()
        };
        let rendered = Block::new().version(1, &version).render();
        assert_eq!(
            rendered,
            "\tNumber: 3\n\tService ID: abc\n\tActive: true\n\tLocked: false\n\tDeployed: false\n\tStaging: false\n\tTesting: false\n\tCreated (UTC): 2024-01-02 03:04"
        );
    }
}
