use super::*;

#[test]
fn test_repo_target_numeric_is_id() {
    let target: RepoTarget = "42".parse().unwrap();
    assert_eq!(target, RepoTarget::Id(42));
    assert_eq!(target.as_path_segment(), "42");
    assert_eq!(target.to_string(), "#42");
}

#[test]
fn test_repo_target_name() {
    let target: RepoTarget = "my-repo".parse().unwrap();
    assert_eq!(target, RepoTarget::Name("my-repo".to_string()));
    assert_eq!(target.as_path_segment(), "my-repo");
}

#[test]
fn test_repo_target_trims_whitespace() {
    let target: RepoTarget = "  7 ".parse().unwrap();
    assert_eq!(target, RepoTarget::Id(7));
}

#[test]
fn test_repo_target_mixed_is_name() {
    let target: RepoTarget = "12abc".parse().unwrap();
    assert_eq!(target, RepoTarget::Name("12abc".to_string()));
}

#[test]
fn test_repo_target_empty_rejected() {
    let result: Result<RepoTarget, _> = "   ".parse();
    assert!(matches!(result, Err(ValidationError::Empty(_))));
}

#[test]
fn test_repo_target_overflowing_id_rejected() {
    let result: Result<RepoTarget, _> = "99999999999999999999999".parse();
    assert!(matches!(result, Err(ValidationError::InvalidTarget(_))));
}

#[test]
fn test_index_entry_from_chunk() {
    let chunk = Chunk {
        text: "hello world".to_string(),
        origin: ChunkOrigin {
            source_path: Arc::from("repo/a.txt"),
            document: 1,
            index: 3,
        },
    };

    let entry = IndexEntry::from_chunk(&chunk, vec![0.5, 0.25]);
    assert_eq!(entry.text, "hello world");
    assert_eq!(entry.vector, vec![0.5, 0.25]);
    assert_eq!(entry.source_path.as_deref(), Some("repo/a.txt"));
    assert_eq!(entry.chunk_index, 3);
}

#[test]
fn test_index_entry_serialization_defaults() {
    let json = r#"{"text":"x","vector":[1.0]}"#;
    let entry: IndexEntry = serde_json::from_str(json).unwrap();
    assert_eq!(entry.source_path, None);
    assert_eq!(entry.chunk_index, 0);
}

#[test]
fn test_index_report_serialization() {
    let report = IndexReport {
        target: "repo".to_string(),
        store_location: "/data/repo/vector_store".to_string(),
        backend: "local".to_string(),
        documents: 3,
        issue_documents: 1,
        skipped_files: 1,
        chunks_created: 3,
        entries_written: 3,
        duration_ms: 12,
    };

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"skipped_files\":1"));
    assert!(json.contains("\"entries_written\":3"));
}
