use assert_cmd::Command;
use std::path::Path;

pub fn vanavar_cmd(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vanavar").unwrap();
    cmd.env_remove("VANAVAR_LOG_DIR");
    cmd.env_remove("VANAVAR_LOG_LEVEL");
    cmd.env("VANAVAR_DB", db);
    cmd
}
