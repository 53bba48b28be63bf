#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;
use url::Url;

/// An isolated HOME plus an empty file store.
pub struct TestEnv {
    temp: TempDir,
    pub store_url: String,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("home")).unwrap();
        let store_url = file_store_url(&temp.path().join("store"));
        Self { temp, store_url }
    }

    pub fn home(&self) -> PathBuf {
        self.temp.path().join("home")
    }

    pub fn store_path(&self) -> PathBuf {
        self.temp.path().join("store")
    }

    /// Write a JSON fixture into the temp dir and return its path.
    pub fn fixture(&self, name: &str, json: &serde_json::Value) -> String {
        let path = self.temp.path().join(name);
        std::fs::write(&path, serde_json::to_string(json).unwrap()).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_lumen"));
        cmd.args(args);
        cmd.env("HOME", self.home());
        cmd.env("XDG_DATA_HOME", self.home().join("data"));
        cmd.env_remove("LUMEN_STORE_URL");
        cmd.env_remove("LUMEN_API_KEY");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Run the CLI without pointing it at a store.
    pub fn run_bare(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("Failed to execute CLI")
    }

    /// Run the CLI against the test store.
    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .args(["--store", &self.store_url])
            .output()
            .expect("Failed to execute CLI")
    }

    /// Run the CLI against the test store and expect success.
    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert_success(args, &output);
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run the CLI against the test store, feeding `input` on stdin.
    pub fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .args(["--store", &self.store_url])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn CLI");
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
        child.wait_with_output().expect("Failed to wait for CLI")
    }
}

pub fn assert_success(args: &[&str], output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
}

pub fn file_store_url(path: &Path) -> String {
    Url::from_directory_path(path)
        .expect("Failed to convert path to file URL")
        .to_string()
}

/// Parse one JSON document per stdout line.
pub fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("stdout line is not JSON"))
        .collect()
}
