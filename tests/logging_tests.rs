use graphan_core::logging;

#[test]
fn test_file_logging_writes_under_log_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("ENABLE_FILE_LOGS", "true");
    std::env::set_var("LOG_DIR", dir.path());

    assert!(logging::file_logging_enabled());
    let guard = logging::init_tracing("info");
    assert!(guard.is_some());

    tracing::info!(target: "graphan_core", "file logging smoke test");
    drop(guard);

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("graphan.log"))
        .collect();
    assert_eq!(entries.len(), 1);
    let contents = std::fs::read_to_string(entries[0].path()).unwrap();
    assert!(contents.contains("file logging smoke test"));

    // A second install is ignored rather than panicking.
    std::env::set_var("ENABLE_FILE_LOGS", "false");
    assert!(!logging::file_logging_enabled());
    assert!(logging::init_tracing("debug").is_none());
}
