use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::io::{parse_vcard, write_contacts_csv};

/// Result of Stage 0
#[derive(Debug)]
pub struct Stage0Result {
    /// Rows written to the contacts CSV
    pub contacts_written: usize,
    /// Rows without a display name (kept, but ignored by the lookup table)
    pub unnamed: usize,
}

/// Execute Stage 0: convert a vCard address book into the contacts CSV
pub fn execute_stage0(vcf_path: &Path, csv_path: &Path) -> Result<Stage0Result> {
    info!("Reading vCard export from {:?}", vcf_path);
    let content = std::fs::read_to_string(vcf_path)
        .with_context(|| format!("Failed to read file: {:?}", vcf_path))?;

    let contacts = parse_vcard(&content);
    for contact in &contacts {
        debug!("{:?} -> {:?}", contact.contact, contact.name);
    }

    write_contacts_csv(&contacts, csv_path)?;
    info!("Wrote {} contacts to {:?}", contacts.len(), csv_path);

    Ok(Stage0Result {
        contacts_written: contacts.len(),
        unnamed: contacts.iter().filter(|c| c.name.is_empty()).count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::load_contacts;
    use crate::models::Contact;

    #[test]
    fn test_vcard_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let vcf = dir.path().join("contacts.vcf");
        let csv = dir.path().join("contacts_reformatted.csv");
        std::fs::write(
            &vcf,
            "BEGIN:VCARD\nFN:Alice\nTEL;type=CELL:(555) 123-4567\nEND:VCARD\n\
             BEGIN:VCARD\nEMAIL:anon@example.com\nEND:VCARD\n",
        )
        .unwrap();

        let result = execute_stage0(&vcf, &csv).unwrap();

        assert_eq!(result.contacts_written, 2);
        assert_eq!(result.unnamed, 1);
        assert_eq!(
            load_contacts(&csv).unwrap(),
            vec![
                Contact::new("Alice", "+5551234567"),
                Contact::new("", "anon@example.com"),
            ]
        );
    }

    #[test]
    fn test_missing_vcard_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute_stage0(&dir.path().join("none.vcf"), &dir.path().join("out.csv"));
        assert!(result.is_err());
    }
}
