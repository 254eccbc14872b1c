use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::ContactsError;
use crate::models::Contact;

/// Load the two-column contacts export (`Phone Number/Email`, `Name`)
pub fn load_contacts(path: &Path) -> Result<Vec<Contact>, ContactsError> {
    if !path.exists() {
        return Err(ContactsError::Missing(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| ContactsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_contacts_csv(&content).map_err(|source| ContactsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse contacts CSV text. Columns are located by header name.
pub fn parse_contacts_csv(content: &str) -> Result<Vec<Contact>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    for required in ["Phone Number/Email", "Name"] {
        if !headers.iter().any(|h| h == required) {
            return Err(csv::Error::from(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("missing column {required:?}"),
            )));
        }
    }

    reader.deserialize().collect()
}

/// Parse a vCard export into contact rows.
///
/// `FN:` sets the name for the current card. Every line mentioning `TEL`
/// emits `+<digits>`, every line mentioning `EMAIL` emits the address, both
/// taken from after the last `:`. `END:VCARD` starts a new card.
pub fn parse_vcard(content: &str) -> Vec<Contact> {
    let mut contacts = Vec::new();
    let mut name = String::new();

    for line in content.lines().map(str::trim) {
        if let Some(full_name) = line.strip_prefix("FN:") {
            name = full_name.to_string();
        } else if line.contains("TEL") {
            let digits: String = value_after_colon(line)
                .chars()
                .filter(char::is_ascii_digit)
                .collect();
            if digits.is_empty() {
                continue;
            }
            contacts.push(Contact::new(name.clone(), format!("+{digits}")));
        } else if line.contains("EMAIL") {
            let email = value_after_colon(line);
            if email.is_empty() {
                continue;
            }
            contacts.push(Contact::new(name.clone(), email));
        } else if line == "END:VCARD" {
            name.clear();
        }
    }

    contacts
}

fn value_after_colon(line: &str) -> &str {
    line.rsplit(':').next().unwrap_or_default()
}

/// List `*.txt` transcripts in a directory, sorted by file name.
///
/// Files named like `exclude` are skipped so an output file living in the
/// same directory is never read back as input.
pub fn list_transcripts(dir: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let excluded_name = exclude.and_then(Path::file_name);

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {:?}", dir))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read directory entry in {:?}", dir))?
            .path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "txt") {
            continue;
        }
        if excluded_name.is_some() && path.file_name() == excluded_name {
            continue;
        }
        paths.push(path);
    }

    paths.sort();
    Ok(paths)
}

/// Read a transcript file
pub fn read_transcript(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
}
