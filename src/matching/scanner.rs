use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use super::lookup::LookupTable;

/// Shapes of contact-like substrings recognized in a transcript.
///
/// Declaration order is the tie-break priority when two shapes match the
/// same span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContactShape {
    /// +15551234567
    NorthAmerican,
    /// +4915112345678 (eleven or more digits)
    InternationalLong,
    /// +5551234567
    PlusTenDigits,
    /// 5551234567
    BareTenDigits,
    /// (555) 123-4567
    Parenthesized,
    /// user@example.com
    Email,
}

impl ContactShape {
    pub const ALL: [ContactShape; 6] = [
        ContactShape::NorthAmerican,
        ContactShape::InternationalLong,
        ContactShape::PlusTenDigits,
        ContactShape::BareTenDigits,
        ContactShape::Parenthesized,
        ContactShape::Email,
    ];

    /// Returns the regex pattern for this shape.
    ///
    /// Phone shapes match ASCII digits only, the same digits `clean_phone` keeps.
    pub fn pattern(self) -> &'static str {
        match self {
            ContactShape::NorthAmerican => r"\+1[0-9]{10}\b",
            ContactShape::InternationalLong => r"\+[0-9]{11,}",
            ContactShape::PlusTenDigits => r"\+[0-9]{10}",
            ContactShape::BareTenDigits => r"\b[0-9]{10}\b",
            ContactShape::Parenthesized => r"\([0-9]{3}\)\s*[0-9]{3}[-\s]?[0-9]{4}",
            ContactShape::Email => r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
        }
    }

    pub fn is_email(self) -> bool {
        self == ContactShape::Email
    }
}

fn compiled() -> &'static [(ContactShape, Regex)] {
    static PATTERNS: OnceLock<Vec<(ContactShape, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        ContactShape::ALL
            .iter()
            .map(|&shape| {
                let regex = Regex::new(shape.pattern()).expect("contact shape pattern is valid");
                (shape, regex)
            })
            .collect()
    })
}

/// A contact-like substring found in a transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMatch<'t> {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    pub text: &'t str,
    pub shape: ContactShape,
}

impl ContactMatch<'_> {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Find non-overlapping contact-like substrings in a single pass.
///
/// Every shape is matched against the original text. Overlaps are resolved
/// by earliest start, then longest span, then shape priority.
pub fn scan_contacts(text: &str) -> Vec<ContactMatch<'_>> {
    let mut candidates: Vec<ContactMatch<'_>> = compiled()
        .iter()
        .flat_map(|(shape, regex)| {
            regex.find_iter(text).map(move |m| ContactMatch {
                start: m.start(),
                end: m.end(),
                text: m.as_str(),
                shape: *shape,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(b.len().cmp(&a.len()))
            .then(a.shape.cmp(&b.shape))
    });

    let mut selected: Vec<ContactMatch<'_>> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if selected.last().is_some_and(|last| candidate.start < last.end) {
            continue;
        }
        selected.push(candidate);
    }
    selected
}

/// Output of [`rewrite_transcript`]
#[derive(Debug, Clone, Default)]
pub struct Rewrite {
    /// Transcript with resolved contacts replaced by names
    pub text: String,
    pub phones_replaced: usize,
    pub emails_replaced: usize,
    /// Phone-like substrings left as-is
    pub unmatched_phones: Vec<String>,
    /// Email addresses left as-is (lower-cased)
    pub unmatched_emails: Vec<String>,
}

impl Rewrite {
    pub fn replacements(&self) -> usize {
        self.phones_replaced + self.emails_replaced
    }
}

/// Replace phone numbers and email addresses with contact names.
///
/// Unknown contacts are passed through verbatim; each unknown email address
/// is reported with a warning.
pub fn rewrite_transcript(text: &str, table: &LookupTable) -> Rewrite {
    let mut rewrite = Rewrite {
        text: String::with_capacity(text.len()),
        ..Default::default()
    };
    let mut cursor = 0;

    for found in scan_contacts(text) {
        rewrite.text.push_str(&text[cursor..found.start]);
        cursor = found.end;

        if found.shape.is_email() {
            match table.resolve_email(found.text) {
                Some(name) => {
                    rewrite.text.push_str(name);
                    rewrite.emails_replaced += 1;
                }
                None => {
                    let email = found.text.to_lowercase();
                    warn!("Email address '{}' not found in contacts", email);
                    rewrite.text.push_str(found.text);
                    rewrite.unmatched_emails.push(email);
                }
            }
            continue;
        }

        match table.resolve_phone(found.text) {
            Some(name) => {
                rewrite.text.push_str(name);
                rewrite.phones_replaced += 1;
            }
            None => {
                debug!("No contact for {:?} ({:?})", found.text, found.shape);
                rewrite.text.push_str(found.text);
                rewrite.unmatched_phones.push(found.text.to_string());
            }
        }
    }

    rewrite.text.push_str(&text[cursor..]);
    rewrite
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::ConflictPolicy;
    use crate::models::Contact;

    fn table() -> LookupTable {
        let contacts = vec![
            Contact::new("Alice", "+15551234567"),
            Contact::new("Bob", "bob@example.com"),
            Contact::new("Carol", "+44 20 7946 0958"),
        ];
        LookupTable::build(&contacts, ConflictPolicy::LastWins).unwrap()
    }

    fn shapes(text: &str) -> Vec<(ContactShape, &str)> {
        scan_contacts(text)
            .into_iter()
            .map(|m| (m.shape, m.text))
            .collect()
    }

    #[test]
    fn test_scan_each_shape() {
        assert_eq!(
            shapes("a +15551234567 b"),
            vec![(ContactShape::NorthAmerican, "+15551234567")]
        );
        assert_eq!(
            shapes("a +442079460958 b"),
            vec![(ContactShape::InternationalLong, "+442079460958")]
        );
        assert_eq!(
            shapes("a +5551234567 b"),
            vec![(ContactShape::PlusTenDigits, "+5551234567")]
        );
        assert_eq!(
            shapes("a 5551234567 b"),
            vec![(ContactShape::BareTenDigits, "5551234567")]
        );
        assert_eq!(
            shapes("a (555) 123-4567 b"),
            vec![(ContactShape::Parenthesized, "(555) 123-4567")]
        );
        assert_eq!(
            shapes("a bob@example.com b"),
            vec![(ContactShape::Email, "bob@example.com")]
        );
    }

    #[test]
    fn test_scan_prefers_longest_overlap() {
        // Digits inside the email address must not be taken as a phone number
        assert_eq!(
            shapes("5551234567@example.com"),
            vec![(ContactShape::Email, "5551234567@example.com")]
        );
        // +1 followed by ten digits is one number, not a bare ten-digit run
        assert_eq!(
            shapes("+15551234567"),
            vec![(ContactShape::NorthAmerican, "+15551234567")]
        );
    }

    #[test]
    fn test_scan_ignores_other_digit_runs() {
        assert!(scan_contacts("order 123456789 shipped 12345678901").is_empty());
        assert!(scan_contacts("").is_empty());
    }

    #[test]
    fn test_non_ascii_digits_pass_through() {
        let contacts = vec![
            Contact::new("Ghost", "N/A"),
            Contact::new("Alice", "+15551234567"),
        ];
        let table = LookupTable::build(&contacts, ConflictPolicy::LastWins).unwrap();
        let text = "from ١٢٣٤٥٦٧٨٩٠ hi";

        assert!(scan_contacts(text).is_empty());
        let rewrite = rewrite_transcript(text, &table);
        assert_eq!(rewrite.text, text);
        assert_eq!(rewrite.replacements(), 0);
    }

    #[test]
    fn test_rewrite_phone_formats() {
        let table = table();

        for input in ["5551234567", "+15551234567", "(555) 123-4567"] {
            let rewrite = rewrite_transcript(&format!("From {input}: hi"), &table);
            assert_eq!(rewrite.text, "From Alice: hi", "input {input}");
            assert_eq!(rewrite.phones_replaced, 1);
        }
    }

    #[test]
    fn test_rewrite_email_ignores_case() {
        let rewrite = rewrite_transcript("BOB@EXAMPLE.COM liked a message", &table());
        assert_eq!(rewrite.text, "Bob liked a message");
        assert_eq!(rewrite.emails_replaced, 1);
    }

    #[test]
    fn test_rewrite_leaves_unknown_contacts() {
        let text = "2125550199 and eve@example.org said hi";
        let rewrite = rewrite_transcript(text, &table());

        assert_eq!(rewrite.text, text);
        assert_eq!(rewrite.replacements(), 0);
        assert_eq!(rewrite.unmatched_phones, vec!["2125550199"]);
        assert_eq!(rewrite.unmatched_emails, vec!["eve@example.org"]);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let table = table();
        let text = "Apr 3, 2025 10:15:02 AM\n+15551234567\nLoved by bob@example.com\n\nMe\nsee you at 5\n";

        let once = rewrite_transcript(text, &table);
        let twice = rewrite_transcript(&once.text, &table);

        assert_eq!(once.text, "Apr 3, 2025 10:15:02 AM\nAlice\nLoved by Bob\n\nMe\nsee you at 5\n");
        assert_eq!(twice.text, once.text);
        assert_eq!(twice.replacements(), 0);
    }

    #[test]
    fn test_rewrite_preserves_surrounding_text() {
        let rewrite = rewrite_transcript("→ (555) 123-4567 ←, ok?", &table());
        assert_eq!(rewrite.text, "→ Alice ←, ok?");
    }
}
