use chrono::{DateTime, Local};
use std::{process::Command, time::SystemTime};

fn git_commit() -> anyhow::Result<String> {
    let output = Command::new("git")
        .args(["log", "-n", "1", "--pretty=format:%h"])
        .output()?;
    anyhow::ensure!(output.status.success(), "git log exited with {}", output.status);

    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

fn main() {
    let commit = git_commit().unwrap_or_else(|e| {
        println!("cargo:warning=no git commit in the version string: {e}");
        String::default()
    });

    let built = DateTime::<Local>::from(SystemTime::now()).format("%Y/%m/%d-%H:%M:%S:%Z");
    if commit.is_empty() {
        println!(
            "cargo:rustc-env=TRAPDOOR_VERSION_INFO={}-{built}",
            env!("CARGO_PKG_VERSION")
        );
    } else {
        println!(
            "cargo:rustc-env=TRAPDOOR_VERSION_INFO={}-{commit}-{built}",
            env!("CARGO_PKG_VERSION")
        );
    }
}
