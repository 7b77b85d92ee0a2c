use rlist_logger::{LevelFilter, Logger};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn json_file_logging_writes_records() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("rlist-file-logging")
        .console(false)
        .directory(&log_dir)
        .json(true)
        .level(LevelFilter::INFO)
        .init()?;
    assert!(logger.writes_file());

    tracing::info!(uri = "https://relay.test", "relay added");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    let record = contents.lines().next().expect("at least one record");
    assert!(record.starts_with('{'), "records should be JSON: {record}");
    assert!(record.contains("relay added"));
    assert!(record.contains("https://relay.test"));

    Ok(())
}
