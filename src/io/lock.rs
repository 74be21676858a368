use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LOCK_FILE: &str = ".lock";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive advisory lock on the DevSync home directory.
///
/// Every command that rewrites `projects.json`, `session.toml` or
/// `config.toml` holds one until it returns. The `.lock` file is never
/// removed: waiters must all contend on the same inode. Closing the file
/// releases the flock.
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is held by another devsync process")]
    Timeout { path: PathBuf },
    #[error("lock error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FileLock {
    /// Wait up to `timeout` for the lock on `home`, creating the directory
    /// on first use.
    pub fn acquire(home: &Path, timeout: Duration) -> Result<Self, LockError> {
        fs::create_dir_all(home)?;
        let path = home.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::CreateError {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        while !try_lock(&file)? {
            if Instant::now() >= deadline {
                return Err(LockError::Timeout { path });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        tracing::debug!(path = %path.display(), "home locked");
        Ok(FileLock { _file: file, path })
    }

    /// Wait up to five seconds
    pub fn acquire_default(home: &Path) -> Result<Self, LockError> {
        Self::acquire(home, Duration::from_secs(5))
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        tracing::debug!(path = %self.path.display(), "home unlocked");
    }
}

/// Non-blocking exclusive flock. `Ok(false)` means someone else holds it.
#[cfg(unix)]
fn try_lock(file: &File) -> std::io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> std::io::Result<bool> {
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn lock_is_reusable_after_release() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("devsync");

        let first = FileLock::acquire_default(&home).unwrap();
        assert!(home.is_dir());
        drop(first);

        assert!(FileLock::acquire_default(&home).is_ok());
        assert!(home.join(LOCK_FILE).exists());
    }

    #[cfg(unix)]
    #[test]
    fn second_holder_times_out() {
        let tmp = TempDir::new().unwrap();
        let _held = FileLock::acquire_default(tmp.path()).unwrap();
        let second = FileLock::acquire(tmp.path(), Duration::from_millis(50));
        assert!(matches!(second, Err(LockError::Timeout { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn handoff_to_a_waiter_keeps_others_out() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().to_path_buf();

        let first = FileLock::acquire_default(&home).unwrap();

        let (acquired_tx, acquired_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let waiter_home = home.clone();
        let waiter = thread::spawn(move || {
            let lock = FileLock::acquire(&waiter_home, Duration::from_secs(5)).unwrap();
            acquired_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            drop(lock);
        });

        // Let the waiter start polling on the existing lock file
        thread::sleep(Duration::from_millis(50));
        drop(first);
        acquired_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let third = FileLock::acquire(&home, Duration::from_millis(200));
        assert!(matches!(third, Err(LockError::Timeout { .. })));

        release_tx.send(()).unwrap();
        waiter.join().unwrap();
        assert!(FileLock::acquire(&home, Duration::from_secs(1)).is_ok());
    }
}
