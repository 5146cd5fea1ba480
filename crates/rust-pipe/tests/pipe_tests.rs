//! Integration tests for spawning children over pipes.

#![cfg(unix)]

use std::time::Duration;

use rust_pipe::{
    DEFAULT_CHUNK_SIZE, PipeChild, PipeConfig, Readable, UnixPipeSystem, Writable, is_alive,
};

#[tokio::test]
async fn cat_echoes_stdin() {
    let mut pipes = UnixPipeSystem::spawn("cat", std::iter::empty::<&str>(), &PipeConfig::default())
        .expect("spawn cat");

    pipes.stdin.write_all(b"ping\n").await.expect("write");
    assert!(pipes.stdout.poll(Duration::from_secs(5)).await.expect("poll"));
    let (chunk, eof) = pipes.stdout.read_chunk(DEFAULT_CHUNK_SIZE).await.expect("read");
    assert_eq!(&chunk[..], b"ping\n");
    assert!(!eof);

    pipes.stdin.close().expect("close");
    let status = pipes.child.wait().await.expect("wait");
    assert!(status.success());
}

#[tokio::test]
async fn poll_times_out_on_silence() {
    let mut pipes = UnixPipeSystem::spawn("cat", std::iter::empty::<&str>(), &PipeConfig::default())
        .expect("spawn cat");

    assert!(!pipes.stdout.poll(Duration::from_millis(100)).await.expect("poll"));
    pipes.child.kill().expect("kill");
}

#[tokio::test]
async fn stderr_is_a_separate_stream() {
    let mut pipes = UnixPipeSystem::spawn(
        "/bin/sh",
        ["-c", "echo out; echo err >&2"],
        &PipeConfig::default(),
    )
    .expect("spawn sh");

    let _ = pipes.child.wait().await;
    let out = pipes.stdout.drain(10).await.expect("drain stdout");
    let err = pipes.stderr.drain(10).await.expect("drain stderr");
    assert_eq!(out, b"out\n");
    assert_eq!(err, b"err\n");
}

#[tokio::test]
async fn merged_stderr_goes_to_stdout() {
    let config = PipeConfig::builder().merge_stderr(true).build();
    let mut pipes = UnixPipeSystem::spawn("/bin/sh", ["-c", "echo err >&2"], &config)
        .expect("spawn sh");

    let _ = pipes.child.wait().await;
    let out = pipes.stdout.drain(10).await.expect("drain stdout");
    assert_eq!(out, b"err\n");
    assert!(pipes.stderr.drain(10).await.expect("drain stderr").is_empty());
}

#[tokio::test]
async fn eof_after_exit() {
    let mut pipes = UnixPipeSystem::spawn("/bin/sh", ["-c", "exit 3"], &PipeConfig::default())
        .expect("spawn sh");

    let status = pipes.child.wait().await.expect("wait");
    assert_eq!(status.code(), Some(3));

    assert!(pipes.stdout.poll(Duration::from_secs(1)).await.expect("poll"));
    let (chunk, eof) = pipes.stdout.read_chunk(DEFAULT_CHUNK_SIZE).await.expect("read");
    assert!(chunk.is_empty());
    assert!(eof);
    assert!(pipes.stdout.is_eof());
}

#[tokio::test]
async fn killed_child_is_not_alive() {
    let mut pipes = UnixPipeSystem::spawn("sleep", ["30"], &PipeConfig::default())
        .expect("spawn sleep");
    let pid = pipes.child.pid();
    assert!(is_alive(pid));

    pipes.child.kill().expect("kill");
    let _ = pipes.child.wait().await;
    assert!(!is_alive(pid));
}

#[tokio::test]
async fn environment_reaches_child() {
    let config = PipeConfig::builder().env("RUST_PIPE_PROBE", "42").build();
    let mut pipes = UnixPipeSystem::spawn("/bin/sh", ["-c", "echo $RUST_PIPE_PROBE"], &config)
        .expect("spawn sh");

    let _ = pipes.child.wait().await;
    let out = pipes.stdout.drain(10).await.expect("drain");
    assert_eq!(out, b"42\n");
}
