use serde::{Deserialize, Serialize};

/// A single row of the contacts export.
///
/// Field order matches the CSV column order produced by the vCard exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Raw phone number (any formatting) or email address
    #[serde(rename = "Phone Number/Email", default)]
    pub contact: String,
    /// Display name substituted into transcripts
    #[serde(rename = "Name", default)]
    pub name: String,
}

impl Contact {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
        }
    }

    /// Whether the contact string is an email address rather than a phone number
    pub fn is_email(&self) -> bool {
        self.contact.contains('@')
    }

    /// Rows with an empty name or contact string are ignored by the lookup table
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.contact.is_empty()
    }
}
