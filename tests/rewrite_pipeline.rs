//! End-to-end tests for the contact-substitution pass

use std::fs;
use std::path::Path;

use chatdigest::{execute_stage1, ConflictPolicy, ContactsError, Stage1Config};

const CONTACTS: &str = "\
Phone Number/Email,Name
+15551234567,Alice
bob@example.com,Bob
+16502530000,Carol
,Nameless
";

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_rewrite_day_directory() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    write(&base.join("contacts_reformatted.csv"), CONTACTS);
    write(
        &base.join("04_03/alice.txt"),
        "Apr 03, 2025  9:12:44 AM\n+15551234567\nCoffee?\n\nApr 03, 2025  9:13:01 AM\nMe\nSure\n",
    );
    write(
        &base.join("04_03/group.txt"),
        "Apr 03, 2025  6:00:00 PM\nBOB@EXAMPLE.COM\nWho's in?\nLoved by (650) 253-0000\n\n2125550199\nme too\n",
    );
    write(&base.join("04_03/photo.jpg"), "not a transcript");
    write(&base.join("converted_messages.txt"), "previous run");

    let config = Stage1Config::new(base, Some("04_03".to_string()));
    let result = execute_stage1(&config).unwrap();

    assert_eq!(result.files_processed, 2);
    assert_eq!(result.phones_replaced, 2);
    assert_eq!(result.emails_replaced, 1);
    assert_eq!(result.unmatched_phones, 1);
    assert!(result.unmatched_emails.is_empty());

    let output = fs::read_to_string(base.join("converted_messages.txt")).unwrap();
    assert_eq!(
        output,
        "\n=== Content from 04_03/alice.txt ===\n\
         Apr 03, 2025  9:12:44 AM\nAlice\nCoffee?\n\nApr 03, 2025  9:13:01 AM\nMe\nSure\n\
         \n\n\
         \n=== Content from 04_03/group.txt ===\n\
         Apr 03, 2025  6:00:00 PM\nBob\nWho's in?\nLoved by Carol\n\n2125550199\nme too\n\
         \n\n"
    );
}

#[test]
fn test_rewrite_skips_own_output_in_base_directory() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    write(&base.join("contacts_reformatted.csv"), CONTACTS);
    write(&base.join("chat.txt"), "5551234567: hi");
    write(&base.join("converted_messages.txt"), "5551234567: stale");

    let config = Stage1Config::new(base, None);
    let result = execute_stage1(&config).unwrap();

    assert_eq!(result.files_processed, 1);
    let output = fs::read_to_string(base.join("converted_messages.txt")).unwrap();
    assert_eq!(output, "\n=== Content from chat.txt ===\nAlice: hi\n\n");
}

#[test]
fn test_rewrite_output_is_stable_when_rerun_on_itself() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    write(&base.join("contacts_reformatted.csv"), CONTACTS);
    write(&base.join("in/chat.txt"), "+15551234567 / bob@example.com");

    let first = Stage1Config::new(base, Some("in".to_string()));
    execute_stage1(&first).unwrap();
    let once = fs::read_to_string(&first.output_path).unwrap();

    // Feed the rewritten output back in as a transcript
    write(&base.join("again/chat.txt"), &once);
    let mut second = Stage1Config::new(base, Some("again".to_string()));
    second.output_path = base.join("second.txt");
    let result = execute_stage1(&second).unwrap();

    assert_eq!(result.phones_replaced + result.emails_replaced, 0);
    let twice = fs::read_to_string(&second.output_path).unwrap();
    assert_eq!(twice, format!("\n=== Content from again/chat.txt ===\n{once}\n\n"));
    assert!(once.contains("Alice / Bob"));
}

#[test]
fn test_missing_contacts_aborts() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("chat.txt"), "hi");

    let config = Stage1Config::new(dir.path(), None);
    let err = execute_stage1(&config).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ContactsError>(),
        Some(ContactsError::Missing(_))
    ));
    assert!(!dir.path().join("converted_messages.txt").exists());
}

#[test]
fn test_reject_policy_surfaces_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    write(
        &base.join("contacts_reformatted.csv"),
        "Phone Number/Email,Name\n+15551234567,Alice\n(555) 123-4567,Alicia\n",
    );
    write(&base.join("chat.txt"), "hi");

    let mut config = Stage1Config::new(base, None);
    config.conflict_policy = ConflictPolicy::Reject;
    let err = execute_stage1(&config).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ContactsError>(),
        Some(ContactsError::Conflict { .. })
    ));
}
