use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AnimError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(AnimError::encode("x").to_string().contains("encode error:"));
    assert!(
        AnimError::malformed_rle("x")
            .to_string()
            .contains("malformed rle stream:")
    );
    assert!(AnimError::fetch("x").to_string().contains("source fetch failed:"));
    assert!(AnimError::EmptyTimeline.to_string().contains("timeline is empty"));
}

#[test]
fn fetch_with_cause_keeps_message_and_cause() {
    let err = AnimError::fetch_with_cause("mask 'a.png'", "connection reset");
    assert_eq!(
        err.to_string(),
        "source fetch failed: mask 'a.png': connection reset"
    );
    let AnimError::SourceFetchFailed { cause, .. } = err else {
        panic!("expected fetch failure");
    };
    assert_eq!(cause.as_deref(), Some("connection reset"));
}

#[test]
fn only_rle_verification_errors_are_non_fatal() {
    assert!(AnimError::EmptyTimeline.is_fatal());
    assert!(AnimError::fetch("x").is_fatal());
    assert!(!AnimError::malformed_rle("x").is_fatal());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AnimError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
