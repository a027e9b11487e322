use std::fs;
use stratum_logging::{init_from_file, init_from_str, Error};
use tempfile::tempdir;

// The global subscriber can only be installed once per process, so the whole
// lifecycle lives in one test.
#[test]
fn installs_once_then_refuses() {
  // Validation happens before anything global is touched.
  let err = init_from_str("level: chatty").unwrap_err();
  assert!(matches!(err, Error::InvalidConfigValue { .. }));

  let dir = tempdir().unwrap();
  let path = dir.path().join("stratum_logging.yaml");
  fs::write(&path, "level: debug\nformat: json\nwith_thread_ids: true\n").unwrap();
  init_from_file(&path).expect("first initialization succeeds");

  tracing::info!(target: "stratum_logging::tests", "subscriber installed");
  log::info!("bridged through tracing-log");

  let second = init_from_str("level: info");
  assert!(matches!(
    second,
    Err(Error::LogBridgeInit(_)) | Err(Error::GlobalSubscriberSet(_))
  ));
}

#[test]
fn missing_file_is_a_read_error() {
  let dir = tempdir().unwrap();
  let err = init_from_file(&dir.path().join("absent.yaml")).unwrap_err();
  assert!(matches!(err, Error::ConfigRead(_)));
}
