//! Integration tests for configuration layering.

use std::io::Write;

use proptest::prelude::*;
use rust_prompt::{ConfigOverrides, EnvConfig, PromptError, SessionBuilder, SessionConfig};

fn write_config(name: &str, content: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("rust-prompt-{}-{name}", std::process::id()));
    let mut file = std::fs::File::create(&path).expect("create config");
    file.write_all(content.as_bytes()).expect("write config");
    path
}

#[test]
fn toml_file_layer() {
    let path = write_config(
        "layer.toml",
        "executable = \"/opt/gdb/bin/gdb\"\nload_timeout_secs = 600\n",
    );
    let config = SessionBuilder::new()
        .config_file(&path)
        .expect("load")
        .build();
    assert_eq!(config.executable, "/opt/gdb/bin/gdb");
    assert_eq!(config.load_timeout_secs, 600);
    assert_eq!(config.args, "-q -nx -nw");
}

#[test]
fn json_file_layer() {
    let path = write_config("layer.json", r#"{"prompt": "\\(lldb\\)", "search_depth": 64}"#);
    let config = SessionBuilder::new()
        .config_file(&path)
        .expect("load")
        .build();
    assert_eq!(config.prompt, r"\(lldb\)");
    assert_eq!(config.search_depth, 64);
}

#[test]
fn env_beats_file_and_builder_beats_env() {
    let path = write_config("order.toml", "timeout_secs = 1\nargs = \"-q\"\nexecutable = \"a\"\n");
    let env = EnvConfig::from_vars(
        "RUST_PROMPT",
        [("RUST_PROMPT_TIMEOUT", "2"), ("RUST_PROMPT_ARGS", "-nx")],
    );

    let config = SessionBuilder::new()
        .timeout_secs(3)
        .with_env_config(&env)
        .expect("env")
        .config_file(&path)
        .expect("file")
        .build();

    assert_eq!(config.executable, "a");
    assert_eq!(config.args, "-nx");
    assert_eq!(config.timeout_secs, 3);
}

#[test]
fn malformed_file_is_a_config_error() {
    let path = write_config("broken.toml", "timeout_secs = \"never\"\n");
    let err = SessionBuilder::new().config_file(&path).expect_err("type mismatch");
    assert!(matches!(err, PromptError::Config { .. }), "unexpected error: {err}");
}

fn layer(timeout: Option<u64>) -> ConfigOverrides {
    ConfigOverrides {
        timeout_secs: timeout,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn highest_set_layer_wins(
        file in proptest::option::of(0u64..1_000),
        env in proptest::option::of(0u64..1_000),
        explicit in proptest::option::of(0u64..1_000),
    ) {
        let mut config = SessionConfig::default();
        for overrides in [layer(file), layer(env), layer(explicit)] {
            config.apply(&overrides);
        }
        let expected = explicit.or(env).or(file).unwrap_or(SessionConfig::default().timeout_secs);
        prop_assert_eq!(config.timeout_secs, expected);
    }

    #[test]
    fn merge_matches_sequential_apply(
        a in proptest::option::of(0u64..1_000),
        b in proptest::option::of(0u64..1_000),
    ) {
        let mut sequential = SessionConfig::default();
        sequential.apply(&layer(a));
        sequential.apply(&layer(b));

        let mut merged = SessionConfig::default();
        merged.apply(&layer(a).merge(layer(b)));

        prop_assert_eq!(sequential, merged);
    }
}
