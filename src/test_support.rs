use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SCRATCH_ID: AtomicU64 = AtomicU64::new(0);

/// Temporary directory removed, with its contents, on drop.
#[derive(Debug)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(label: &str) -> io::Result<Self> {
        let serial = NEXT_SCRATCH_ID.fetch_add(1, Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!(
            "overflow_list_{label}_{}_{serial}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// Pins every setting the CLI reads so a developer's `.env` or shell cannot
/// change test outcomes.
pub fn apply_cli_test_env(command: &mut Command, fixture_path: &Path, log_dir: &Path) {
    command.env("OVERFLOW_RESIZE_DEBOUNCE_MS", "20");
    command.env("OVERFLOW_LEGEND_BUFFER_PX", "56");
    command.env("OVERFLOW_LEGEND_GAP_PX", "12");
    command.env("OVERFLOW_FIXTURE_PATH", fixture_path.as_os_str());
    command.env("RUST_LOG", "error");
    command.env("OVERFLOW_FILE_LOG", "error");
    command.env("OVERFLOW_LOG_DIR", log_dir.as_os_str());
}
