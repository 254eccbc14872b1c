use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::Contact;

/// Combined output of a rewrite pass.
///
/// The file is truncated on creation; each transcript is appended as a
/// section headed by its source.
pub struct ConvertedOutput {
    path: PathBuf,
    writer: BufWriter<File>,
    sections: usize,
}

impl ConvertedOutput {
    pub fn create(path: &Path) -> Result<Self> {
        let file =
            File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            sections: 0,
        })
    }

    /// Append one rewritten transcript under a `=== Content from … ===` header
    pub fn append_section(&mut self, source: &str, content: &str) -> Result<()> {
        write!(self.writer, "{}", format_section(source, content))
            .with_context(|| format!("Failed to write to {:?}", self.path))?;
        self.sections += 1;
        Ok(())
    }

    pub fn sections(&self) -> usize {
        self.sections
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {:?}", self.path))?;
        Ok(self.path)
    }
}

/// Render a section of the combined output
pub fn format_section(source: &str, content: &str) -> String {
    format!("\n=== Content from {} ===\n{}\n\n", source, content)
}

/// Write contacts as the two-column CSV read by [`crate::io::load_contacts`]
pub fn write_contacts_csv(contacts: &[Contact], path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    let mut writer = csv::Writer::from_writer(file);

    if contacts.is_empty() {
        writer.write_record(["Phone Number/Email", "Name"])?;
    }
    for contact in contacts {
        writer
            .serialize(contact)
            .with_context(|| format!("Failed to write contact {:?}", contact.name))?;
    }

    writer.flush().context("Failed to write CSV")?;
    Ok(())
}

/// Path of the summary file for a transcript: `<out_dir>/<stem>.summary.txt`
pub fn summary_path(out_dir: &Path, transcript: &Path) -> PathBuf {
    let stem = transcript
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "transcript".to_string());
    out_dir.join(format!("{stem}.summary.txt"))
}

/// Write a summary to disk
pub fn write_summary(path: &Path, summary: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    writeln!(file, "{}", summary.trim_end())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_contacts_csv;

    #[test]
    fn test_format_section() {
        assert_eq!(
            format_section("04_03/alice.txt", "hello"),
            "\n=== Content from 04_03/alice.txt ===\nhello\n\n"
        );
    }

    #[test]
    fn test_converted_output_appends_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("converted_messages.txt");
        std::fs::write(&path, "stale").unwrap();

        let mut output = ConvertedOutput::create(&path).unwrap();
        output.append_section("a/1.txt", "one").unwrap();
        output.append_section("a/2.txt", "two").unwrap();
        assert_eq!(output.sections(), 2);
        output.finish().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "\n=== Content from a/1.txt ===\none\n\n\n=== Content from a/2.txt ===\ntwo\n\n"
        );
    }

    #[test]
    fn test_contacts_csv_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.csv");
        let contacts = vec![
            Contact::new("Smith, Jo", "+15551234567"),
            Contact::new("Bob", "bob@example.com"),
        ];

        write_contacts_csv(&contacts, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Phone Number/Email,Name\n"));
        assert_eq!(parse_contacts_csv(&written).unwrap(), contacts);
    }

    #[test]
    fn test_summary_path() {
        assert_eq!(
            summary_path(Path::new("out"), Path::new("Assets/alice.txt")),
            PathBuf::from("out/alice.summary.txt")
        );
    }
}
