use crate::error::CacheError;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replaces the file at `path` with `bytes`.
///
/// The payload is written to a sibling temp file (`<name>.tmp.<pid>.<n>`), synced, and
/// renamed over `path`. Missing parent directories are created. The temp name never
/// ends in the destination's extension, so directory scans filtering by extension
/// don't pick up in-flight writes.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    atomic_write_with(path, |file| {
        file.write_all(bytes)?;
        Ok(())
    })
}

fn atomic_write_with(
    path: &Path,
    write: impl FnOnce(&mut fs::File) -> Result<(), CacheError>,
) -> Result<(), CacheError> {
    let Some(parent) = path.parent() else {
        return Err(io::Error::other("path has no parent").into());
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };

    fs::create_dir_all(parent)?;

    let (tmp_path, mut file) = open_unique_tmp_file(path, parent)?;
    let write_result = (|| -> Result<(), CacheError> {
        write(&mut file)?;
        file.sync_all()?;
        Ok(())
    })();
    if let Err(err) = write_result {
        drop(file);
        remove_tmp_file(&tmp_path, "failed to remove temporary file after write failure");
        return Err(err);
    }
    drop(file);

    if let Err(err) = rename_over(&tmp_path, path) {
        remove_tmp_file(&tmp_path, "failed to remove temporary file after rename failure");
        return Err(CacheError::from(err));
    }

    sync_dir_best_effort(parent);
    Ok(())
}

fn rename_over(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        // On Windows, `rename` doesn't overwrite an existing destination.
        Err(err) if cfg!(windows) && to.exists() => {
            match fs::remove_file(to) {
                Ok(()) => {}
                Err(remove_err) if remove_err.kind() == io::ErrorKind::NotFound => {}
                Err(_) => return Err(err),
            }
            fs::rename(from, to)
        }
        other => other,
    }
}

fn remove_tmp_file(tmp_path: &Path, message: &'static str) {
    if let Err(err) = fs::remove_file(tmp_path) {
        if err.kind() != io::ErrorKind::NotFound {
            tracing::debug!(
                target: "sage.cache",
                path = %tmp_path.display(),
                error = %err,
                "{message}"
            );
        }
    }
}

/// Removes `dir` and everything below it. A missing directory is not an error.
///
/// Returns `true` if something was removed.
pub fn remove_dir_if_exists(dir: &Path) -> Result<bool, CacheError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Persists the rename of a new entry. Failures are logged once and ignored.
fn sync_dir_best_effort(dir: &Path) {
    #[cfg(unix)]
    {
        static LOGGED: std::sync::OnceLock<()> = std::sync::OnceLock::new();
        if let Err(err) = fs::File::open(dir).and_then(|dir| dir.sync_all()) {
            if err.kind() != io::ErrorKind::NotFound && LOGGED.set(()).is_ok() {
                tracing::debug!(
                    target: "sage.cache",
                    dir = %dir.display(),
                    error = %err,
                    "failed to sync index directory"
                );
            }
        }
    }

    #[cfg(not(unix))]
    let _ = dir;
}

fn open_unique_tmp_file(dest: &Path, parent: &Path) -> io::Result<(PathBuf, fs::File)> {
    let file_name = dest
        .file_name()
        .ok_or_else(|| io::Error::other("destination path has no file name"))?;
    let pid = std::process::id();

    loop {
        let counter = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(format!(".tmp.{pid}.{counter}"));
        let tmp_path = parent.join(tmp_name);

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
        {
            Ok(file) => return Ok((tmp_path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }
}
