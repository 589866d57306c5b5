use derive_more::{AsRef, Deref, Display, From, Into};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From, Into, AsRef)]
pub struct EntryName(String);

crate::impl_string_newtype!(EntryName);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From, Into, AsRef)]
pub struct TicketNumber(String);

crate::impl_string_newtype!(TicketNumber);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: EntryName,
    pub ticket_number: Option<TicketNumber>,
    pub email: Option<String>,
}

// Spreadsheet exports disagree on header spelling. Candidates are tried in
// order against the first record and the winner is used for the whole file.
const NAME_ALIASES: &[&str] = &[
    "name",
    "Name",
    "NAME",
    "First Name",
    "first name",
    "firstName",
    "Full Name",
    "full_name",
];
const TICKET_ALIASES: &[&str] = &[
    "ticket_number",
    "Ticket Number",
    "ticket number",
    "ticketNumber",
    "ticket",
    "Ticket",
];
const EMAIL_ALIASES: &[&str] = &["email", "Email", "EMAIL", "E-mail", "e-mail"];

#[derive(Error, Debug)]
pub enum EntriesError {
    #[error("Failed to read entries file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid entries JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Entries JSON must be an array of records")]
    NotAnArray,
    #[error("No name-like column among {0:?}")]
    NoNameField(Vec<String>),
}

pub fn load_entries(path: &Path) -> Result<Vec<Entry>, EntriesError> {
    let raw = fs_err::read_to_string(path)?;
    parse_entries(&raw)
}

pub fn parse_entries(raw: &str) -> Result<Vec<Entry>, EntriesError> {
    let rows: Value = serde_json::from_str(raw)?;
    let Value::Array(rows) = rows else {
        return Err(EntriesError::NotAnArray);
    };
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let name_key = resolve_key(&rows, NAME_ALIASES)
        .ok_or_else(|| EntriesError::NoNameField(available_keys(&rows)))?;
    let ticket_key = resolve_key(&rows, TICKET_ALIASES);
    let email_key = resolve_key(&rows, EMAIL_ALIASES);

    let entries = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let name = field_text(row, &name_key).filter(|n| !n.is_empty());
            let Some(name) = name else {
                log::warn!("Skipping record {} without a usable name", i);
                return None;
            };
            Some(Entry {
                name: EntryName::new(name),
                ticket_number: ticket_key
                    .as_deref()
                    .and_then(|key| field_text(row, key))
                    .map(TicketNumber::new),
                email: email_key.as_deref().and_then(|key| field_text(row, key)),
            })
        })
        .collect();
    Ok(entries)
}

pub fn segments(entries: &[Entry]) -> Vec<rondel::Segment> {
    entries
        .iter()
        .map(|entry| rondel::Segment::new(entry.name.to_string()))
        .collect()
}

fn resolve_key(rows: &[Value], aliases: &[&str]) -> Option<String> {
    let first = rows.first()?.as_object()?;
    aliases
        .iter()
        .find(|alias| first.contains_key(**alias))
        .map(ToString::to_string)
}

fn available_keys(rows: &[Value]) -> Vec<String> {
    rows.first()
        .and_then(Value::as_object)
        .map(|record| record.keys().cloned().collect())
        .unwrap_or_default()
}

// numeric spreadsheet cells (ticket numbers) are stringified
fn field_text(row: &Value, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alias_resolution() {
        let raw = json!([
            {"First Name": "Ada Lovelace", "Ticket Number": 17, "Email": "ada@example.com"},
            {"First Name": "Alan Turing", "Ticket Number": 23}
        ])
        .to_string();

        let entries = parse_entries(&raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, EntryName::new("Ada Lovelace"));
        assert_eq!(entries[0].ticket_number, Some(TicketNumber::new("17")));
        assert_eq!(entries[0].email.as_deref(), Some("ada@example.com"));
        assert_eq!(entries[1].email, None);
    }

    #[test]
    fn test_lowercase_headers() {
        let raw = json!([{"name": "Grace Hopper", "ticket": "A-7"}]).to_string();
        let entries = parse_entries(&raw).unwrap();
        assert_eq!(entries[0].name, EntryName::new("Grace Hopper"));
        assert_eq!(entries[0].ticket_number, Some(TicketNumber::new("A-7")));
    }

    #[test]
    fn test_records_without_name_are_skipped() {
        let raw = json!([
            {"name": "Katherine Johnson"},
            {"name": ""},
            {"other": "field"}
        ])
        .to_string();

        let entries = parse_entries(&raw).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_no_name_column_is_an_error() {
        let raw = json!([{"ticket": 1, "email": "x@example.com"}]).to_string();
        assert!(matches!(
            parse_entries(&raw),
            Err(EntriesError::NoNameField(_))
        ));
    }

    #[test]
    fn test_non_array_rejected() {
        assert!(matches!(
            parse_entries("{\"name\": \"solo\"}"),
            Err(EntriesError::NotAnArray)
        ));
    }

    #[test]
    fn test_empty_array_is_fine() {
        assert!(parse_entries("[]").unwrap().is_empty());
    }

    #[test]
    fn test_segments_carry_names() {
        let entries = vec![Entry {
            name: EntryName::new("Marie Curie"),
            ticket_number: None,
            email: None,
        }];
        let segments = segments(&entries);
        assert_eq!(segments[0].label, "Marie Curie");
    }
}
