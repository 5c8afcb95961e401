use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "chatfind.log";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

pub fn log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

/// Routes `tracing` output to `<log_dir>/chatfind.log`, rotating the previous
/// file once it grows past 1 MB. `RUST_LOG` overrides `default_level`.
pub fn init(log_dir: &Path, default_level: &str) -> Result<(), std::io::Error> {
    fs::create_dir_all(log_dir)?;
    let path = log_path(log_dir);
    rotate_if_needed(&path, log_dir)?;

    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init in the same process keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();

    install_panic_hook();
    Ok(())
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn rotate_if_needed(log_path: &Path, log_dir: &Path) -> Result<(), std::io::Error> {
    let meta = match fs::metadata(log_path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };

    if meta.len() < MAX_LOG_BYTES {
        return Ok(());
    }

    let archived = log_dir.join(format!("chatfind-{}.log", now_secs()));
    fs::rename(log_path, archived)?;
    prune_old_archives(log_dir)
}

fn prune_old_archives(log_dir: &Path) -> Result<(), std::io::Error> {
    let mut archives = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_archive(path))
        .collect::<Vec<_>>();

    archives.sort();
    let excess = archives.len().saturating_sub(MAX_ARCHIVES);
    for oldest in archives.drain(..excess) {
        let _ = fs::remove_file(oldest);
    }
    Ok(())
}

fn is_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("chatfind-") && n.ends_with(".log"))
        .unwrap_or(false)
}

fn install_panic_hook() {
    let _ = PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload unavailable".to_string());
            tracing::error!(%location, %payload, "panic");
            prior(panic_info);
        }));
    });
}
