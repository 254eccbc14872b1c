pub mod error;
pub mod io;
pub mod llm;
pub mod matching;
pub mod models;
pub mod stages;

pub use error::ContactsError;
pub use io::{load_contacts, parse_contacts_csv, parse_vcard, ConvertedOutput};
pub use llm::{
    AnthropicClient, AnthropicConfig, BackendKind, LlmBackend, OllamaClient, OllamaConfig,
    SummaryBackend,
};
pub use matching::{
    clean_phone, normalize_phone, rewrite_transcript, scan_contacts, ConflictPolicy, LookupTable,
    Rewrite,
};
pub use models::Contact;
pub use stages::{
    execute_stage0, execute_stage1, execute_stage2, yesterday_message_dir, Stage1Config,
    Stage2Config,
};
