//! Shared helpers: scripted `/bin/sh` children.

#![allow(dead_code)]

use std::path::PathBuf;

use rust_prompt::SessionConfig;

/// Echoes each line followed by a `"> "` prompt.
pub const ECHO: &str = r#"printf "> "
while read l; do printf "%s\n> " "$l"; done
"#;

/// Prints a prompt, then reads forever without answering.
pub const SILENT: &str = r#"printf "> "
while read l; do :; done
"#;

/// Answers one line, then exits.
pub const ONE_SHOT: &str = r#"printf "> "
read l
printf "%s\n> " "$l"
exit 0
"#;

/// Write `body` to a unique script file and return its path.
pub fn script(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "rust-prompt-{}-{name}.sh",
        std::process::id()
    ));
    std::fs::write(&path, body).expect("write test script");
    path
}

/// A handshake-free configuration running `body` under `/bin/sh`.
pub fn sh(name: &str, body: &str) -> SessionConfig {
    let path = script(name, body);
    SessionConfig::new("/bin/sh", path.to_string_lossy().into_owned()).no_handshake()
}
