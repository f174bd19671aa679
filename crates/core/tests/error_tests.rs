// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use allocation_tracker_core::errors::{CoreError, EntityKind};

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("float is NaN".into());
        assert_eq!(err.to_string(), "Serialization error: float is NaN");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("expected value at line 1".into());
        assert_eq!(
            err.to_string(),
            "Deserialization error: expected value at line 1"
        );
    }

    #[test]
    fn storage_names_the_store() {
        let err = CoreError::Storage {
            store: "file".into(),
            message: "read-only file system".into(),
        };
        assert_eq!(err.to_string(), "Storage error (file): read-only file system");
    }

    #[test]
    fn file_io() {
        let err = CoreError::FileIO("permission denied".into());
        assert_eq!(err.to_string(), "File I/O error: permission denied");
    }

    #[test]
    fn runtime() {
        let err = CoreError::Runtime("must be called from a Tokio runtime".into());
        assert_eq!(
            err.to_string(),
            "No async runtime available: must be called from a Tokio runtime"
        );
    }

    #[test]
    fn validation_error() {
        let err = CoreError::ValidationError("Tag name must not be empty".into());
        assert_eq!(
            err.to_string(),
            "Validation failed: Tag name must not be empty"
        );
    }

    #[test]
    fn not_found_per_kind() {
        assert_eq!(
            CoreError::not_found(EntityKind::Tag, "tag-x").to_string(),
            "Tag not found: tag-x"
        );
        assert_eq!(
            CoreError::not_found(EntityKind::Asset, "nvda").to_string(),
            "Asset not found: nvda"
        );
        assert_eq!(
            CoreError::not_found(EntityKind::Group, String::from("g-1")).to_string(),
            "Group not found: g-1"
        );
    }

    #[test]
    fn not_found_empty_id() {
        let err = CoreError::not_found(EntityKind::Asset, "");
        assert_eq!(err.to_string(), "Asset not found: ");
    }
}

// ── EntityKind ──────────────────────────────────────────────────────

mod entity_kind {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(EntityKind::Tag.to_string(), "Tag");
        assert_eq!(EntityKind::Asset.to_string(), "Asset");
        assert_eq!(EntityKind::Group.to_string(), "Group");
    }

    #[test]
    fn not_found_carries_kind_and_id() {
        match CoreError::not_found(EntityKind::Group, "res-group") {
            CoreError::NotFound { kind, id } => {
                assert_eq!(kind, EntityKind::Group);
                assert_eq!(id, "res-group");
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod from_impls {
    use super::*;

    #[test]
    fn from_io_error_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let core_err: CoreError = io_err.into();
        match &core_err {
            CoreError::FileIO(msg) => assert!(msg.contains("file not found")),
            other => panic!("Expected FileIO, got {:?}", other),
        }
    }

    #[test]
    fn from_io_error_preserves_message() {
        let msg = "snapshot dir vanished: ąść";
        let core_err: CoreError = std::io::Error::other(msg).into();
        match &core_err {
            CoreError::FileIO(m) => assert!(m.contains(msg)),
            other => panic!("Expected FileIO, got {:?}", other),
        }
    }

    #[test]
    fn from_serde_json_error() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{{invalid json");
        let core_err: CoreError = result.unwrap_err().into();
        match &core_err {
            CoreError::Deserialization(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Deserialization, got {:?}", other),
        }
    }

    #[test]
    fn from_serde_json_error_eof() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("");
        let core_err: CoreError = result.unwrap_err().into();
        match &core_err {
            CoreError::Deserialization(msg) => assert!(msg.contains("EOF")),
            other => panic!("Expected Deserialization, got {:?}", other),
        }
    }

    #[test]
    fn question_mark_converts() {
        fn parse(input: &str) -> Result<serde_json::Value, CoreError> {
            Ok(serde_json::from_str(input)?)
        }
        assert!(parse("[1, 2]").is_ok());
        assert!(matches!(parse("[1,"), Err(CoreError::Deserialization(_))));
    }
}

// ── Error is std::error::Error ──────────────────────────────────────

mod std_error {
    use super::*;

    #[test]
    fn core_error_implements_error_trait() {
        let err: Box<dyn std::error::Error> =
            Box::new(CoreError::ValidationError("test".into()));
        assert!(err.to_string().contains("test"));
    }

    #[test]
    fn core_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
    }
}

// ── Edge cases ──────────────────────────────────────────────────────

mod edge_cases {
    use super::*;

    #[test]
    fn very_long_error_message() {
        let long = "x".repeat(10_000);
        let err = CoreError::Deserialization(long.clone());
        assert!(err.to_string().ends_with(&long));
    }

    #[test]
    fn unicode_in_id() {
        let err = CoreError::not_found(EntityKind::Tag, "標籤-🚀");
        assert_eq!(err.to_string(), "Tag not found: 標籤-🚀");
    }
}
