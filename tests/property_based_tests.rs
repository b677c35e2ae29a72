mod common;

use chrono::{TimeZone, Utc};
use common::strategies::*;
use proptest::prelude::*;
use rebuild_core::activities::{LocatorIssuer, LocatorPermissions, TemplateLocatorIssuer};
use rebuild_core::cache::CacheEntry;
use rebuild_core::hashing::{hash_bytes, ContentHasher, InMemoryContentSource};
use rebuild_core::models::ProcessingOutcome;
use rebuild_core::orchestration::outcome_for_file_type;
use rebuild_core::resilience::{RetryOutcome, RetryPolicy};
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    /// Property: the error type ends processing with Error in any casing
    #[test]
    fn error_type_matches_in_any_case(declared in any_case_strategy("error")) {
        prop_assert_eq!(outcome_for_file_type(&declared), Some(ProcessingOutcome::Error));
    }

    /// Property: unmanaged and unknown types end processing as Unmanaged in any casing
    #[test]
    fn unmanaged_types_match_in_any_case(
        unmanaged in any_case_strategy("unmanaged"),
        unknown in any_case_strategy("unknown"),
    ) {
        prop_assert_eq!(outcome_for_file_type(&unmanaged), Some(ProcessingOutcome::Unmanaged));
        prop_assert_eq!(outcome_for_file_type(&unknown), Some(ProcessingOutcome::Unmanaged));
    }

    /// Property: every other type proceeds to rebuild
    #[test]
    fn managed_types_proceed_to_rebuild(declared in managed_file_type_strategy()) {
        prop_assert_eq!(outcome_for_file_type(&declared), None);
    }

    /// Property: a cache entry never hands back Unknown as a reusable outcome
    #[test]
    fn remembered_outcome_is_never_unknown(status in file_status_strategy()) {
        let entry = CacheEntry {
            namespace: "ns".to_string(),
            fingerprint: hash_bytes(status.as_bytes()),
            file_type: "Pdf".to_string(),
            file_status: status.clone(),
            last_written: Utc::now(),
        };
        let remembered = entry.remembered_outcome();
        prop_assert_ne!(remembered, Some(ProcessingOutcome::Unknown));
        if let Some(outcome) = remembered {
            prop_assert!(outcome.as_str().eq_ignore_ascii_case(status.trim()));
        }
    }

    /// Property: the locator expiry is exactly the requested instant, for every permission set
    #[test]
    fn locators_carry_requested_expiry(
        offset_secs in 0i64..10_000_000,
        read in any::<bool>(),
        blob in "[a-z0-9]{1,16}\\.[a-z]{3}",
    ) {
        let issuer = TemplateLocatorIssuer::new("https://files.example.test/");
        let expires = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(offset_secs);
        let permissions = if read { LocatorPermissions::READ } else { LocatorPermissions::WRITE };

        let locator = issuer.issue("rebuild-store", &blob, expires, permissions);

        let expected_prefix = format!("https://files.example.test/rebuild-store/{blob}?sp=");
        prop_assert!(locator.starts_with(&expected_prefix));
        let expected_suffix = format!("&se={}", expires.format("%Y-%m-%dT%H:%M:%SZ"));
        prop_assert!(locator.ends_with(&expected_suffix));
    }

    /// Property: distinct content yields distinct fingerprints
    #[test]
    fn distinct_content_has_distinct_fingerprints(
        a in prop::collection::vec(any::<u8>(), 0..512),
        b in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(hash_bytes(&a), hash_bytes(&b));
    }

    /// Property: streaming in any chunk size yields the one-shot digest
    #[test]
    fn streamed_fingerprint_matches_one_shot(
        content in prop::collection::vec(any::<u8>(), 0..8192),
        chunk_size in 1usize..1024,
    ) {
        let source = Arc::new(InMemoryContentSource::new());
        source.insert("blob", content.clone());
        let hasher = ContentHasher::new(source).with_chunk_size(chunk_size);

        let streamed = runtime().block_on(hasher.hash("blob")).unwrap();
        prop_assert_eq!(streamed, hash_bytes(&content));
    }

    /// Property: a call failing `failures` times is attempted min(failures + 1, max_retries + 1) times
    #[test]
    fn retry_attempts_are_bounded(failures in 0u32..12, max_retries in 0u32..8) {
        let policy = RetryPolicy::new("prop", max_retries);
        let outcome: RetryOutcome<u32, String> = runtime().block_on(policy.execute(
            |attempt| async move {
                if attempt <= failures { Err(format!("failure {attempt}")) } else { Ok(attempt) }
            },
            |_| true,
        ));

        prop_assert_eq!(outcome.attempts(), failures.min(max_retries) + 1);
        prop_assert_eq!(outcome.is_success(), failures <= max_retries);
    }
}
