//! Shared helpers for tests that touch process-global state.

use std::env as stdenv;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Serializes tests that read or change the current working directory or
/// spawn child processes that depend on it.
pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
}

/// Creates a uniquely named directory under the system temp dir.
pub(crate) fn make_unique_temp_dir(tag: &str) -> io::Result<PathBuf> {
    let mut p = stdenv::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    p.push(format!("msh_test_{}_{}_{}", tag, std::process::id(), nanos));
    fs::create_dir_all(&p)?;
    Ok(p)
}
