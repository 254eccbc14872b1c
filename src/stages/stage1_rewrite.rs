use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, TimeDelta};
use tracing::{debug, info};

use crate::io::{list_transcripts, load_contacts, read_transcript, ConvertedOutput};
use crate::matching::{rewrite_transcript, ConflictPolicy, LookupTable};

/// Default contacts export name inside the base directory
pub const CONTACTS_FILE_NAME: &str = "contacts_reformatted.csv";
/// Default combined output name inside the base directory
pub const OUTPUT_FILE_NAME: &str = "converted_messages.txt";

/// Configuration for Stage 1
#[derive(Debug, Clone)]
pub struct Stage1Config {
    /// Directory holding the contacts export and the combined output
    pub base_dir: PathBuf,
    /// Sub-directory of `base_dir` with the transcripts; `None` reads `base_dir`
    pub message_dir: Option<String>,
    /// Contacts CSV
    pub contacts_path: PathBuf,
    /// Combined output file (truncated at the start of the run)
    pub output_path: PathBuf,
    /// How to resolve keys claimed by more than one contact
    pub conflict_policy: ConflictPolicy,
}

impl Stage1Config {
    pub fn new(base_dir: impl Into<PathBuf>, message_dir: Option<String>) -> Self {
        let base_dir = base_dir.into();
        Self {
            contacts_path: base_dir.join(CONTACTS_FILE_NAME),
            output_path: base_dir.join(OUTPUT_FILE_NAME),
            base_dir,
            message_dir,
            conflict_policy: ConflictPolicy::default(),
        }
    }

    /// Directory scanned for `*.txt` transcripts
    pub fn transcripts_dir(&self) -> PathBuf {
        match &self.message_dir {
            Some(dir) => self.base_dir.join(dir),
            None => self.base_dir.clone(),
        }
    }

    /// Label used in section headers: `{label}/{file_name}`
    fn source_label(&self, path: &Path) -> String {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match &self.message_dir {
            Some(dir) => format!("{}/{}", dir, file_name),
            None => file_name,
        }
    }
}

impl Default for Stage1Config {
    fn default() -> Self {
        Self::new("Assets", Some(yesterday_message_dir()))
    }
}

/// Name of the per-day export directory for yesterday (`MM_DD`)
pub fn yesterday_message_dir() -> String {
    (Local::now() - TimeDelta::days(1)).format("%m_%d").to_string()
}

/// Result of Stage 1
#[derive(Debug, Default)]
pub struct Stage1Result {
    /// Transcripts rewritten into the combined output
    pub files_processed: usize,
    pub phones_replaced: usize,
    pub emails_replaced: usize,
    /// Phone-like substrings with no matching contact
    pub unmatched_phones: usize,
    /// Email addresses with no matching contact
    pub unmatched_emails: Vec<String>,
    /// Path of the combined output
    pub output_path: PathBuf,
}

/// Execute Stage 1: contact-name substitution
///
/// 1. Load the contacts export (missing file aborts the run)
/// 2. Build the lookup table
/// 3. Truncate the combined output
/// 4. Rewrite every transcript and append it under a source header
pub fn execute_stage1(config: &Stage1Config) -> Result<Stage1Result> {
    info!("Loading contacts from {:?}", config.contacts_path);
    let contacts = load_contacts(&config.contacts_path).context("Failed to load contacts")?;

    let table = LookupTable::build(&contacts, config.conflict_policy)
        .context("Failed to build contact lookup table")?;
    info!(
        "Loaded {} contacts ({} phone keys, {} email keys)",
        contacts.len(),
        table.phone_key_count(),
        table.email_key_count()
    );
    log_table(&table);

    let dir = config.transcripts_dir();
    info!("Processing files in {:?}", dir);
    let transcripts = list_transcripts(&dir, Some(config.output_path.as_path()))?;

    let mut output = ConvertedOutput::create(&config.output_path)?;
    let mut result = Stage1Result::default();

    for path in &transcripts {
        info!("Processing {:?}", path);
        let content = read_transcript(path)?;
        let rewrite = rewrite_transcript(&content, &table);

        debug!(
            "{:?}: {} phones, {} emails replaced",
            path, rewrite.phones_replaced, rewrite.emails_replaced
        );

        output.append_section(&config.source_label(path), &rewrite.text)?;

        result.files_processed += 1;
        result.phones_replaced += rewrite.phones_replaced;
        result.emails_replaced += rewrite.emails_replaced;
        result.unmatched_phones += rewrite.unmatched_phones.len();
        result.unmatched_emails.extend(rewrite.unmatched_emails);
    }

    result.output_path = output.finish()?;
    Ok(result)
}

fn log_table(table: &LookupTable) {
    debug!("Available phone number formats:");
    for (key, name) in table.phone_entries() {
        debug!("  '{}' -> '{}'", key, name);
    }
    debug!("Available email addresses:");
    for (key, name) in table.email_entries() {
        debug!("  '{}' -> '{}'", key, name);
    }
}
