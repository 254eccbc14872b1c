use std::collections::HashSet;

use phonenumber::Mode;

/// Strip everything except ASCII digits and `+`
pub fn clean_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Produce every textual form under which a phone number may appear.
///
/// The input is cleaned first. A valid number yields its E.164 form, the
/// E.164 form without `+`, the same with leading `1`s dropped, and the cleaned
/// input with and without `+`. Numbers that fail validation produce an empty
/// set, except in the two ambiguous-country-code branches below where the
/// cleaned input forms are always kept.
pub fn normalize_phone(raw: &str) -> Vec<String> {
    let phone = clean_phone(raw);

    // +1XXXXXXXXXX: also try the digits as if the country code were absent
    if phone.starts_with("+1") && phone.len() == 12 {
        let without_country = format!("+{}", &phone[2..]);

        let mut formats = validated_forms(&phone);
        formats.extend(validated_forms(&without_country));
        formats.extend([
            phone.clone(),
            phone[1..].to_string(),
            without_country[1..].to_string(),
            without_country,
        ]);
        return dedup(formats);
    }

    // +XXXXXXXXXX: also try it with a North American country code
    if phone.starts_with('+') && phone.len() == 11 {
        let with_country = format!("+1{}", &phone[1..]);

        let mut formats = validated_forms(&phone);
        formats.extend(validated_forms(&with_country));
        formats.extend([phone.clone(), phone[1..].to_string()]);
        return dedup(formats);
    }

    let mut phone = phone;
    if phone.starts_with('1') && phone.len() == 11 {
        phone = format!("+{phone}");
    }
    if !phone.starts_with('+') {
        phone = if phone.len() == 10 {
            format!("+1{phone}")
        } else {
            format!("+{}", phone.trim_start_matches('0'))
        };
    }

    dedup(validated_forms(&phone))
}

/// Candidate forms for one attempt, or nothing if the attempt is not a valid number
fn validated_forms(attempt: &str) -> Vec<String> {
    let Some(e164) = to_e164(attempt) else {
        return Vec::new();
    };

    let national = e164[1..].trim_start_matches('1').to_string();
    vec![
        e164.clone(),
        e164[1..].to_string(),
        national,
        attempt.trim_start_matches('+').to_string(),
        attempt.to_string(),
    ]
}

fn to_e164(attempt: &str) -> Option<String> {
    let number = phonenumber::parse(None, attempt).ok()?;
    if !phonenumber::is_valid(&number) {
        return None;
    }
    Some(number.format().mode(Mode::E164).to_string())
}

/// Drop duplicates and empty strings, keeping first-seen order
fn dedup(formats: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    formats
        .into_iter()
        .filter(|f| !f.is_empty() && seen.insert(f.clone()))
        .collect()
}
