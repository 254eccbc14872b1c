use std::collections::HashMap;
use std::collections::hash_map::Entry;

use clap::ValueEnum;
use tracing::debug;

use super::phone::{clean_phone, normalize_phone};
use crate::error::ContactsError;
use crate::models::Contact;

/// What to do when two contacts produce the same lookup key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ConflictPolicy {
    /// The contact processed later overwrites the earlier mapping
    #[default]
    LastWins,
    /// The first contact to claim a key keeps it
    KeepFirst,
    /// Fail the build when a key would map to two different names
    Reject,
}

/// Phone and email keys mapped to display names.
///
/// Built once per rewrite pass and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    phone: HashMap<String, String>,
    email: HashMap<String, String>,
}

impl LookupTable {
    /// Build the table from a contact list.
    ///
    /// Emails are keyed lower-cased. Phone numbers are keyed under every
    /// candidate form from [`normalize_phone`] plus their cleaned form, so an
    /// exact match still works for numbers that fail validation.
    pub fn build(contacts: &[Contact], policy: ConflictPolicy) -> Result<Self, ContactsError> {
        let mut table = Self::default();

        for contact in contacts.iter().filter(|c| c.is_complete()) {
            if contact.is_email() {
                insert(
                    &mut table.email,
                    contact.contact.to_lowercase(),
                    &contact.name,
                    policy,
                )?;
                continue;
            }

            for key in normalize_phone(&contact.contact) {
                insert(&mut table.phone, key, &contact.name, policy)?;
            }
            let cleaned = clean_phone(&contact.contact);
            if cleaned.is_empty() {
                debug!("Contact {:?} has no digits in {:?}", contact.name, contact.contact);
                continue;
            }
            insert(&mut table.phone, cleaned, &contact.name, policy)?;
        }

        Ok(table)
    }

    /// Resolve a phone-like string to a name.
    ///
    /// Candidate forms are tried in order and the first hit wins; the cleaned
    /// form of the input is tried last.
    pub fn resolve_phone(&self, raw: &str) -> Option<&str> {
        normalize_phone(raw)
            .iter()
            .find_map(|key| self.phone.get(key))
            .or_else(|| {
                let cleaned = clean_phone(raw);
                (!cleaned.is_empty())
                    .then(|| self.phone.get(&cleaned))
                    .flatten()
            })
            .map(String::as_str)
    }

    /// Resolve an email address, ignoring case
    pub fn resolve_email(&self, raw: &str) -> Option<&str> {
        self.email.get(&raw.to_lowercase()).map(String::as_str)
    }

    /// Explain how a phone-like string resolves against the table
    pub fn diagnose_phone(&self, raw: &str) -> PhoneDiagnosis {
        let candidates = normalize_phone(raw);
        let hits = candidates
            .iter()
            .filter_map(|key| self.phone.get(key).map(|name| (key.clone(), name.clone())))
            .collect();
        let cleaned = clean_phone(raw);
        let cleaned_hit = if cleaned.is_empty() {
            None
        } else {
            self.phone.get(&cleaned).cloned()
        };

        PhoneDiagnosis {
            candidates,
            hits,
            cleaned,
            cleaned_hit,
        }
    }

    /// Phone keys sorted for display
    pub fn phone_entries(&self) -> Vec<(&str, &str)> {
        sorted_entries(&self.phone)
    }

    /// Email keys sorted for display
    pub fn email_entries(&self) -> Vec<(&str, &str)> {
        sorted_entries(&self.email)
    }

    pub fn phone_key_count(&self) -> usize {
        self.phone.len()
    }

    pub fn email_key_count(&self) -> usize {
        self.email.len()
    }
}

/// Result of [`LookupTable::diagnose_phone`]
#[derive(Debug, Clone)]
pub struct PhoneDiagnosis {
    /// Candidate keys produced by the normalizer
    pub candidates: Vec<String>,
    /// Candidates present in the table, with their names
    pub hits: Vec<(String, String)>,
    /// Digit-and-plus-only form of the input
    pub cleaned: String,
    /// Name mapped to the cleaned form, if any
    pub cleaned_hit: Option<String>,
}

impl PhoneDiagnosis {
    pub fn is_match(&self) -> bool {
        !self.hits.is_empty() || self.cleaned_hit.is_some()
    }
}

fn insert(
    map: &mut HashMap<String, String>,
    key: String,
    name: &str,
    policy: ConflictPolicy,
) -> Result<(), ContactsError> {
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(name.to_string());
        }
        Entry::Occupied(mut slot) => {
            if slot.get() == name {
                return Ok(());
            }
            match policy {
                ConflictPolicy::LastWins => {
                    debug!("Key {:?}: {:?} replaced by {:?}", slot.key(), slot.get(), name);
                    slot.insert(name.to_string());
                }
                ConflictPolicy::KeepFirst => {
                    debug!("Key {:?}: keeping {:?} over {:?}", slot.key(), slot.get(), name);
                }
                ConflictPolicy::Reject => {
                    return Err(ContactsError::Conflict {
                        key: slot.key().clone(),
                        existing: slot.get().clone(),
                        incoming: name.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn sorted_entries(map: &HashMap<String, String>) -> Vec<(&str, &str)> {
    let mut entries: Vec<(&str, &str)> = map
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    entries.sort();
    entries
}
