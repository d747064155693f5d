use std::{
    fs::{File, OpenOptions, TryLockError},
    io::{self, ErrorKind},
    path::Path,
};

/// Open a log file for writing and take an exclusive lock on it.
///
/// With `overwrite` an existing file is truncated, but only once the lock is
/// held, so a file owned by another session is never clobbered. Without it the
/// file must not exist yet.
pub fn open_exclusive(path: &Path, overwrite: bool) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(false);
    } else {
        options.create_new(true);
    }
    let file = options.open(path)?;
    match file.try_lock() {
        Ok(()) => {}
        Err(TryLockError::WouldBlock) => {
            return Err(io::Error::new(
                ErrorKind::WouldBlock,
                "file is locked by another log session",
            ));
        }
        Err(TryLockError::Error(e)) => return Err(e),
    }
    if overwrite {
        file.set_len(0)?;
    }
    Ok(file)
}
