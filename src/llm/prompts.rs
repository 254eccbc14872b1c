/// System prompt for summarizing a chunk of an iMessage transcript
pub const SUMMARY_SYSTEM_PROMPT: &str = r#"You're helping me summarize a chunk of an iMessage conversation.

Below is a portion of the conversation, formatted like a human-readable transcript. Each message includes:
- A timestamp
- The sender's name (a message sent by me will be labeled "Me". Other people will be labeled accordingly.)
- The message text
- Occasionally: tapback reactions (e.g., "Loved by ...", "Laughed by ...")

A conversation could be a group conversation between 3 or more distinct senders.

When a message's sender is labeled "Me", that is a message that I sent.

Read the conversation and return:
1. A single sentence, in **first-person**, mentioning who the conversation was with and what this part of the conversation was about.
2. A **bulleted list**, also in first-person, capturing the main things that were said, asked, or shared. One bullet per distinct topic or idea.

Avoid summarizing the emotional tone of the conversation or interpreting feelings. Just focus on the actual content, using natural, casual first-person language as if I were recalling what was discussed.

Do not say "here's the summary", just provide the result. Do not refer to other people in second-person.

Here is the conversation:
"#;
