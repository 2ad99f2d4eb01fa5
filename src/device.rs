//! File-backed device used by the CLI
//!
//! Show commands return the captured configuration. Pushed commands are
//! appended to a file, or kept in memory for printing when no file is given.

use anyhow::{Context as _, Result};
use rmtemplate::Connection;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct FileDevice {
    running: String,
    push: Option<PathBuf>,
    pushed: Vec<String>,
}

impl FileDevice {
    pub fn new(running: String) -> Self {
        Self {
            running,
            push: None,
            pushed: Vec::new(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let running = fs::read_to_string(path)
            .with_context(|| format!("Could not read running config {}", path.display()))?;
        Ok(Self::new(running))
    }

    pub fn with_push_file(mut self, path: PathBuf) -> Self {
        self.push = Some(path);
        self
    }

    pub fn pushed(&self) -> &[String] {
        &self.pushed
    }
}

impl Connection for FileDevice {
    fn get(&mut self, command: &str) -> Result<String> {
        log::debug!("serving '{command}' from captured config");
        Ok(self.running.clone())
    }

    fn edit_config(&mut self, commands: &[String]) -> Result<()> {
        if let Some(path) = &self.push {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Could not open {}", path.display()))?;
            for line in commands {
                writeln!(file, "{line}")
                    .with_context(|| format!("Could not write {}", path.display()))?;
            }
            log::info!("appended {} command(s) to {}", commands.len(), path.display());
        }
        self.pushed.extend_from_slice(commands);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_captured_config() {
        let mut device = FileDevice::new("hostname R1\n".to_string());
        assert_eq!(device.get("show running-config").unwrap(), "hostname R1\n");
    }

    #[test]
    fn test_edit_config_appends_to_push_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pushed.txt");
        let mut device = FileDevice::new(String::new()).with_push_file(path.clone());

        device.edit_config(&["hostname R2".to_string()]).unwrap();
        device
            .edit_config(&["no ip routing".to_string(), "ip routing".to_string()])
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "hostname R2\nno ip routing\nip routing\n"
        );
        assert_eq!(device.pushed().len(), 3);
    }
}
