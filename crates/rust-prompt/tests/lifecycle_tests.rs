//! Integration tests for opening and tearing down sessions.

#![cfg(unix)]

mod common;

use rust_prompt::session::STARTUP_COMMAND;
use rust_prompt::{
    ErrorKind, PromptError, RoundTrip, Session, SessionBuilder, SessionConfig, SpawnError,
    probe,
};

fn with_handshake(name: &str, body: &str) -> SessionConfig {
    let mut config = common::sh(name, body);
    config.await_startup_prompt = true;
    config.setup_commands = rust_prompt::config::DEFAULT_SETUP_COMMANDS
        .iter()
        .map(|cmd| (*cmd).to_string())
        .collect();
    config.timeout_secs = 5;
    config
}

#[tokio::test]
async fn open_runs_setup_commands() {
    let mut session = Session::open(with_handshake("open-echo", common::ECHO))
        .await
        .expect("open");

    assert_eq!(session.last_error(), ErrorKind::None);
    assert!(session.warnings().is_empty());
    let result = session.execute("ready").await;
    assert_eq!(result.output, "ready\n");
}

#[tokio::test]
async fn startup_eof_is_a_handshake_error() {
    let mut config = with_handshake("exit-now", "exit 0\n");
    config.timeout_secs = 5;

    let err = Session::open(config).await.expect_err("child exits");
    match err {
        PromptError::Handshake { command, kind, .. } => {
            assert_eq!(command, STARTUP_COMMAND);
            assert_eq!(kind, ErrorKind::Eof);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unanswered_setup_command_is_a_handshake_error() {
    let mut config = with_handshake("setup-silent", common::SILENT);
    config.timeout_secs = 1;

    let err = Session::open(config).await.expect_err("setup times out");
    assert!(err.is_handshake());
    match err {
        PromptError::Handshake { command, kind, .. } => {
            assert_eq!(command, "set confirm off");
            assert_eq!(kind, ErrorKind::Timeout);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn target_load_stderr_becomes_warning() {
    let body = r#"printf "> "
while read l; do
  case "$l" in
    file*) echo "No such file or directory." >&2 ;;
  esac
  printf "%s\n> " "$l"
done
"#;
    let config = with_handshake("load-warning", body).target("/nonexistent/prog");

    let mut session = Session::open(config).await.expect("open succeeds");
    assert_eq!(session.warnings().len(), 1);
    assert!(session.warnings()[0].contains("/nonexistent/prog"));
    assert!(session.warnings()[0].contains("No such file"));
    assert!(session.execute("still usable").await.is_ok());
}

#[tokio::test]
async fn target_load_timeout_becomes_warning() {
    let body = r#"printf "> "
while read l; do
  case "$l" in
    file*) ;;
    *) printf "%s\n> " "$l" ;;
  esac
done
"#;
    let mut config = with_handshake("load-timeout", body).target("/tmp/prog");
    config.load_timeout_secs = 1;

    let session = Session::open(config).await.expect("open succeeds");
    assert_eq!(session.warnings().len(), 1);
    assert!(session.warnings()[0].contains("TIMEOUT"));
}

#[tokio::test]
async fn missing_executable_is_a_spawn_error() {
    let config = SessionConfig::new("/nonexistent/debugger", "-q").no_handshake();
    let err = Session::open(config).await.expect_err("spawn fails");
    assert!(err.is_spawn());
    assert!(matches!(
        err,
        PromptError::Spawn(SpawnError::CommandNotFound { .. })
    ));
}

#[tokio::test]
async fn empty_executable_is_rejected() {
    let err = SessionBuilder::new()
        .executable("  ")
        .no_handshake()
        .spawn()
        .expect_err("empty executable");
    assert!(matches!(
        err,
        PromptError::Spawn(SpawnError::InvalidArgument { .. })
    ));
}

#[tokio::test]
async fn invalid_prompt_is_rejected() {
    let err = SessionBuilder::from_config(common::sh("bad-prompt", common::ECHO))
        .prompt("(unclosed")
        .spawn()
        .expect_err("invalid regex");
    assert!(matches!(err, PromptError::Regex(_)));
}

#[tokio::test]
async fn dispose_is_idempotent_and_latches_eof() {
    let mut session = Session::spawn(common::sh("dispose", common::ECHO)).expect("spawn");
    let pid = session.pid();
    assert!(probe(&pid));

    session.dispose();
    session.dispose();

    assert!(session.is_disposed());
    assert!(session.is_eof());
    assert!(!session.signal(0));
    let result = session.round_trip(RoundTrip::new("hello")).await;
    assert_eq!(result.error, ErrorKind::Eof);
}

#[tokio::test]
async fn dispose_after_child_exit() {
    let mut session = Session::spawn(common::sh("dispose-exited", "exit 0\n")).expect("spawn");
    let result = session.await_prompt(RoundTrip::clear().timeout_secs(5)).await;
    assert_eq!(result.error, ErrorKind::Eof);

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    session.dispose();
    assert!(session.is_disposed());
}

#[tokio::test]
async fn drop_disposes() {
    let session = Session::spawn(common::sh("drop", common::SILENT)).expect("spawn");
    let pid = session.pid();
    drop(session);
    // The killed child may linger as a zombie until reaped; it must no
    // longer be running its script.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    let status = std::fs::read_to_string(format!("/proc/{pid}/stat")).unwrap_or_default();
    assert!(status.is_empty() || status.contains(") Z"), "child still running: {status}");
}

#[tokio::test]
async fn interrupt_uses_signal_map() {
    let mut config = common::sh("interrupt", common::SILENT);
    config.signals.interrupt = 0;
    let session = Session::spawn(config).expect("spawn");
    assert!(session.interrupt());
}
