pub mod stage0_contacts;
pub mod stage1_rewrite;
pub mod stage2_summarize;

pub use stage0_contacts::*;
pub use stage1_rewrite::*;
pub use stage2_summarize::*;
