use anyhow::Result;
use serde_json::{json, Value};
use serial_test::serial;
use svclog::config::{ENV_LOG_LEVEL, ENV_LOG_OUTPUT};
use svclog::{Level, Logger};

fn read_records(path: &std::path::Path) -> Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(|l| serde_json::from_str(l).map_err(Into::into))
        .collect::<Result<_>>()?)
}

#[test]
#[serial]
fn env_configured_logger_writes_json_lines_to_a_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("svc.log");
    std::env::set_var(ENV_LOG_LEVEL, " DEBUG ");
    std::env::set_var(ENV_LOG_OUTPUT, path.to_str().unwrap());

    let logger = Logger::from_env()?;
    assert_eq!(logger.level(), Level::Debug);

    logger.debug("starting", &[], &[]);
    logger.info("stored", &["id", "shard"], &[json!(42), json!("eu-1")]);
    let err = std::io::Error::new(std::io::ErrorKind::Other, "index missing");
    logger.error("store failed", &err, &["id", "error"], &[json!(42)]);

    let records = read_records(&path)?;
    assert_eq!(records.len(), 3);

    assert_eq!(records[0]["level"], "debug");
    assert_eq!(records[0]["msg"], "starting");

    assert_eq!(records[1]["level"], "info");
    assert_eq!(records[1]["id"], 42);
    assert_eq!(records[1]["shard"], "eu-1");
    assert!(records[1]["caller"]
        .as_str()
        .unwrap()
        .starts_with("logger_integration.rs:"));
    assert!(chrono::DateTime::parse_from_rfc3339(records[1]["time"].as_str().unwrap()).is_ok());

    assert_eq!(records[2]["level"], "error");
    assert_eq!(records[2]["error"], "index missing");

    std::env::remove_var(ENV_LOG_LEVEL);
    std::env::remove_var(ENV_LOG_OUTPUT);
    Ok(())
}

#[test]
#[serial]
fn unwritable_output_is_fatal_at_construction() {
    std::env::set_var(ENV_LOG_OUTPUT, "/no/such/dir/svc.log");
    assert!(Logger::from_env().is_err());
    std::env::remove_var(ENV_LOG_OUTPUT);
}

#[test]
#[serial]
fn init_installs_the_first_configuration_and_stays_put() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let first = dir.path().join("first.log");
    std::env::set_var(ENV_LOG_OUTPUT, first.to_str().unwrap());
    let a = svclog::init()?;

    // a later init under a different environment returns the same instance
    let second = dir.path().join("second.log");
    std::env::set_var(ENV_LOG_OUTPUT, second.to_str().unwrap());
    let b = svclog::init()?;
    assert!(std::ptr::eq(a, b));
    assert!(std::ptr::eq(svclog::global(), a));
    assert!(std::ptr::eq(svclog::try_global().unwrap(), a));

    a.info("routed", &[], &[]);
    assert_eq!(read_records(&first)?.len(), 1);
    assert!(!second.exists());

    std::env::remove_var(ENV_LOG_OUTPUT);
    Ok(())
}

#[test]
#[serial]
fn concurrent_writers_produce_whole_records() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("concurrent.log");
    std::env::set_var(ENV_LOG_OUTPUT, path.to_str().unwrap());
    let logger = Logger::from_env()?;
    std::env::remove_var(ENV_LOG_OUTPUT);

    let threads: Vec<_> = (0..4)
        .map(|t| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    logger.info("tick", &["thread", "seq"], &[json!(t), json!(i)]);
                }
            })
        })
        .collect();
    for t in threads {
        t.join().map_err(|e| anyhow::anyhow!("writer panicked: {e:?}"))?;
    }

    let records = read_records(&path)?;
    assert_eq!(records.len(), 400);
    for record in &records {
        assert_eq!(record["msg"], "tick");
        assert!(record["thread"].is_i64() || record["thread"].is_u64());
        assert!(record["seq"].is_i64() || record["seq"].is_u64());
    }
    assert_eq!(logger.flush_failures(), 0);
    Ok(())
}
