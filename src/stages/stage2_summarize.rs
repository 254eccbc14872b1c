use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::io::{list_transcripts, read_transcript, summary_path, write_summary};
use crate::llm::{SummaryBackend, SUMMARY_SYSTEM_PROMPT};

/// Configuration for Stage 2
#[derive(Debug, Clone)]
pub struct Stage2Config {
    /// Directory with `*.txt` transcripts to summarize
    pub input_dir: PathBuf,
    /// Directory receiving `<stem>.summary.txt` files
    pub output_dir: PathBuf,
    /// System prompt sent with every transcript
    pub system_prompt: String,
}

impl Stage2Config {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        Self {
            output_dir: input_dir.join("summaries"),
            input_dir,
            system_prompt: SUMMARY_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Default for Stage2Config {
    fn default() -> Self {
        Self::new("Assets")
    }
}

/// Result of Stage 2
#[derive(Debug, Default)]
pub struct Stage2Result {
    /// Transcripts sent to the backend
    pub files_sent: usize,
    /// Summary files written
    pub summaries: Vec<PathBuf>,
    /// Transcripts whose request failed
    pub failures: usize,
}

/// Execute Stage 2: LLM summaries
///
/// Transcripts are sent one at a time. A failed request is logged and the
/// run continues with the next file.
pub async fn execute_stage2<B: SummaryBackend>(
    backend: &B,
    config: &Stage2Config,
) -> Result<Stage2Result> {
    let transcripts = list_transcripts(&config.input_dir, None)?;
    info!(
        "Stage 2: Sending {} transcripts to {}",
        transcripts.len(),
        backend.name()
    );

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create directory: {:?}", config.output_dir))?;

    let mut result = Stage2Result::default();

    for path in &transcripts {
        result.files_sent += 1;
        match summarize_file(backend, config, path).await {
            Ok(written) => {
                info!("Summary for {:?} written to {:?}", path, written);
                result.summaries.push(written);
            }
            Err(e) => {
                warn!("Error sending {:?}: {:#}", path, e);
                result.failures += 1;
            }
        }
    }

    Ok(result)
}

/// Summarize a single transcript, sent to the backend verbatim
async fn summarize_file<B: SummaryBackend>(
    backend: &B,
    config: &Stage2Config,
    path: &Path,
) -> Result<PathBuf> {
    info!("Sending {:?}...", path);
    let transcript = read_transcript(path)?;

    let summary = backend.summarize(&config.system_prompt, &transcript).await?;

    let out = summary_path(&config.output_dir, path);
    write_summary(&out, &summary)?;
    Ok(out)
}
