use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use chatdigest::llm::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_TIMEOUT_SECS};
use chatdigest::{
    execute_stage0, execute_stage1, execute_stage2, load_contacts, yesterday_message_dir,
    AnthropicClient, AnthropicConfig, BackendKind, ConflictPolicy, LlmBackend, LookupTable,
    OllamaClient, OllamaConfig, Stage1Config, Stage2Config,
};

#[derive(Parser)]
#[command(name = "chatdigest")]
#[command(author, version, about = "Message export pipeline: contact names and LLM summaries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a vCard address book into the contacts CSV
    Contacts {
        /// vCard export
        #[arg(long, default_value = "contacts.vcf")]
        vcf: PathBuf,

        /// Output CSV
        #[arg(short, long, default_value = "Assets/contacts_reformatted.csv")]
        output: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Replace phone numbers and emails in transcripts with contact names
    Rewrite {
        /// Base directory holding the contacts file and the output
        #[arg(short, long, default_value = "Assets")]
        dir: PathBuf,

        /// Sub-directory with transcripts (defaults to yesterday, MM_DD)
        #[arg(short, long)]
        message_dir: Option<String>,

        /// Read transcripts straight from the base directory
        #[arg(long, conflicts_with = "message_dir")]
        no_message_dir: bool,

        /// Contacts CSV (defaults to <dir>/contacts_reformatted.csv)
        #[arg(short, long)]
        contacts: Option<PathBuf>,

        /// Combined output (defaults to <dir>/converted_messages.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// How to resolve a number or email claimed by several contacts
        #[arg(long, value_enum, default_value_t = ConflictPolicy::LastWins)]
        on_conflict: ConflictPolicy,

        /// Verbose output (also dumps the lookup table)
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show how a single phone number resolves against the contacts
    Lookup {
        /// Phone number in any format
        number: String,

        /// Contacts CSV
        #[arg(short, long, default_value = "Assets/contacts_reformatted.csv")]
        contacts: PathBuf,

        /// How to resolve a number claimed by several contacts
        #[arg(long, value_enum, default_value_t = ConflictPolicy::LastWins)]
        on_conflict: ConflictPolicy,
    },

    /// Send transcripts to an LLM and write the summaries
    Summarize {
        /// Directory with transcripts
        #[arg(short, long, default_value = "Assets")]
        dir: PathBuf,

        /// Directory for summaries (defaults to <dir>/summaries)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// LLM backend
        #[arg(short, long, value_enum, default_value_t = BackendKind::Ollama)]
        backend: BackendKind,

        /// Model name (backend default if omitted)
        #[arg(long)]
        model: Option<String>,

        /// Ollama chat endpoint
        #[arg(long, default_value = DEFAULT_OLLAMA_URL)]
        url: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Contacts {
            vcf,
            output,
            verbose,
        } => {
            setup_logging(verbose);
            let result = execute_stage0(&vcf, &output)?;
            if result.unnamed > 0 {
                info!("{} contacts have no name and will be ignored", result.unnamed);
            }
            Ok(())
        }
        Commands::Rewrite {
            dir,
            message_dir,
            no_message_dir,
            contacts,
            output,
            on_conflict,
            verbose,
        } => {
            setup_logging(verbose);
            let message_dir = if no_message_dir {
                None
            } else {
                Some(message_dir.unwrap_or_else(yesterday_message_dir))
            };
            let mut config = Stage1Config::new(dir, message_dir);
            if let Some(contacts) = contacts {
                config.contacts_path = contacts;
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            config.conflict_policy = on_conflict;
            rewrite(&config)
        }
        Commands::Lookup {
            number,
            contacts,
            on_conflict,
        } => {
            setup_logging(false);
            lookup(&number, &contacts, on_conflict)
        }
        Commands::Summarize {
            dir,
            out_dir,
            backend,
            model,
            url,
            timeout_secs,
            verbose,
        } => {
            setup_logging(verbose);
            let mut config = Stage2Config::new(dir);
            if let Some(out_dir) = out_dir {
                config.output_dir = out_dir;
            }
            let timeout = Duration::from_secs(timeout_secs);
            let backend = build_backend(backend, model, url, timeout)?;
            summarize(&backend, &config).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn rewrite(config: &Stage1Config) -> Result<()> {
    let result = execute_stage1(config)?;

    info!(
        "Complete: {} files, {} phone numbers and {} emails replaced",
        result.files_processed, result.phones_replaced, result.emails_replaced
    );
    if result.unmatched_phones > 0 || !result.unmatched_emails.is_empty() {
        info!(
            "Left unchanged: {} phone numbers, {} emails",
            result.unmatched_phones,
            result.unmatched_emails.len()
        );
    }
    info!("Output written to {:?}", result.output_path);

    Ok(())
}

fn lookup(number: &str, contacts: &Path, policy: ConflictPolicy) -> Result<()> {
    let contacts = load_contacts(contacts).context("Failed to load contacts")?;
    let table = LookupTable::build(&contacts, policy)?;
    let diagnosis = table.diagnose_phone(number);

    println!("Testing conversion of: {}", number);
    println!("Standardized formats: {:?}", diagnosis.candidates);

    for (key, name) in &diagnosis.hits {
        println!("Match found! '{}' -> '{}'", key, name);
    }
    if let Some(name) = &diagnosis.cleaned_hit {
        println!(
            "Original format match found! '{}' -> '{}'",
            diagnosis.cleaned, name
        );
    }

    if !diagnosis.is_match() {
        println!("No match found for {} in any format", number);
        println!("Available keys in phone map:");
        for (key, _) in table.phone_entries() {
            println!("  '{}'", key);
        }
    }

    Ok(())
}

fn build_backend(
    kind: BackendKind,
    model: Option<String>,
    url: String,
    timeout: Duration,
) -> Result<LlmBackend> {
    match kind {
        BackendKind::Ollama => {
            let config = OllamaConfig {
                url,
                model: model.unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                timeout,
            };
            Ok(LlmBackend::Ollama(OllamaClient::new(config)?))
        }
        BackendKind::Anthropic => {
            let mut config = AnthropicConfig::from_env()?;
            if let Some(model) = model {
                config.model = model;
            }
            config.timeout = timeout;
            Ok(LlmBackend::Anthropic(AnthropicClient::new(config)?))
        }
    }
}

async fn summarize(backend: &LlmBackend, config: &Stage2Config) -> Result<()> {
    let result = execute_stage2(backend, config).await?;

    info!(
        "Complete: {} of {} transcripts summarized ({} failed)",
        result.summaries.len(),
        result.files_sent,
        result.failures
    );
    info!("Summaries written to {:?}", config.output_dir);

    Ok(())
}
