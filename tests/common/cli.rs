use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::process::ExitStatus;

use assert_cmd::Command;
use tempfile::TempDir;

use super::{CONTAINER_JSON, SHEET_JSON};

/// Isolated working directory with private data and config dirs.
pub struct GtmxWorkspace {
    _temp: TempDir,
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl GtmxWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path().join("work");
        let data_dir = temp.path().join("data");
        let config_dir = temp.path().join("config");
        fs::create_dir_all(&root).expect("work dir");
        Self {
            _temp: temp,
            root,
            data_dir,
            config_dir,
        }
    }

    /// Workspace with `container.json` and `sheet.json` fixtures.
    pub fn with_fixtures() -> Self {
        let ws = Self::new();
        ws.write("container.json", CONTAINER_JSON);
        ws.write("sheet.json", SHEET_JSON);
        ws
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn write(&self, name: &str, contents: &str) {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir");
        }
        fs::write(path, contents).expect("write fixture");
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("read file")
    }

    pub fn read_json(&self, name: &str) -> serde_json::Value {
        serde_json::from_str(&self.read(name)).expect("valid json")
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("gtmx").expect("gtmx binary");
        cmd.current_dir(&self.root)
            .env("GTMX_DATA_DIR", &self.data_dir)
            .env("GTMX_CONFIG_DIR", &self.config_dir)
            .env_remove("GTMX_FILE")
            .env_remove("GTMX_SHEET_ID")
            .env_remove("GTMX_SHEETS_API_KEY")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn data_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }
}

pub struct CmdOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", self.stdout))
    }
}

pub fn run_gtmx<I, S>(ws: &GtmxWorkspace, args: I, label: &str) -> CmdOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = ws.command().args(args).output().expect("run gtmx");
    let result = CmdOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    if !result.status.success() {
        eprintln!("[{label}] stderr:\n{}", result.stderr);
    }
    result
}
