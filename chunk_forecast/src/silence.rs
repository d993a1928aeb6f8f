//! Scoped suppression of the process's standard output and error streams.
//!
//! Model fitting code (especially anything wrapping a C or Fortran
//! optimizer) can write progress noise straight to file descriptors 1 and 2.
//! [`silenced`] points both descriptors at the null device for the duration
//! of a closure and puts the originals back afterwards.
//!
//! The descriptors are process-global, so the redirection is guarded by a
//! global mutex: concurrent callers serialize, and nested calls on the same
//! thread run their closure inside the scope that is already open. Worker
//! threads of a silenced parallel batch are marked as sharing the batch's
//! scope, so models calling [`silenced`] from there do not wait on the lock.
//! Restoration lives in [`Drop`], so it also happens when the closure
//! returns early, returns an error or panics.

use std::cell::Cell;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

static STREAM_LOCK: Mutex<()> = Mutex::new(());

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Run `f` with stdout and stderr redirected to the null device.
///
/// Returns an IO error, without running `f`, if the redirection cannot be
/// set up.
pub fn silenced<T, F>(f: F) -> io::Result<T>
where
    F: FnOnce() -> T,
{
    let _guard = SilenceGuard::acquire()?;
    Ok(f())
}

/// True while the current thread is inside a [`silenced`] scope
pub fn is_silenced() -> bool {
    DEPTH.with(|depth| depth.get() > 0)
}

/// Holds the redirection open; dropping it restores the original streams
pub struct SilenceGuard {
    // None for nested scopes, which leave the outer redirection alone
    inner: Option<(MutexGuard<'static, ()>, platform::SavedStreams)>,
}

impl SilenceGuard {
    /// Redirect stdout and stderr until the returned guard is dropped
    pub fn acquire() -> io::Result<Self> {
        if is_silenced() {
            DEPTH.with(|depth| depth.set(depth.get() + 1));
            return Ok(Self { inner: None });
        }

        // a fit that panicked while silenced poisons the lock but the guard
        // still restored the descriptors, so the lock is safe to reuse
        let lock = STREAM_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        flush_standard_streams();
        let saved = platform::redirect_to_null()?;

        DEPTH.with(|depth| depth.set(1));
        Ok(Self {
            inner: Some((lock, saved)),
        })
    }
}

/// Mark the current thread as working inside a scope that another thread
/// holds open, so `silenced` calls on this thread run without locking.
///
/// Only valid while that other thread keeps its guard alive, e.g. for the
/// worker tasks of a batch it is waiting on.
pub(crate) fn share_open_scope() -> SilenceGuard {
    DEPTH.with(|depth| depth.set(depth.get() + 1));
    SilenceGuard { inner: None }
}

impl Drop for SilenceGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));

        if let Some((lock, saved)) = self.inner.take() {
            flush_standard_streams();
            if let Err(err) = platform::restore(saved) {
                // stderr may still point at the null device, so this can be lost
                log::error!("Failed to restore standard streams: {}", err);
            }
            drop(lock);
        }
    }
}

fn flush_standard_streams() {
    // buffered Rust output belongs to whichever target was active when it was written
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
}

#[cfg(unix)]
mod platform {
    use std::fs::OpenOptions;
    use std::io;
    use std::os::fd::{AsRawFd, RawFd};

    const STDOUT: RawFd = libc::STDOUT_FILENO;
    const STDERR: RawFd = libc::STDERR_FILENO;

    /// Duplicates of the original stdout and stderr descriptors
    pub struct SavedStreams {
        stdout: RawFd,
        stderr: RawFd,
    }

    fn dup(fd: RawFd) -> io::Result<RawFd> {
        // SAFETY: dup has no memory-safety preconditions; the result is checked
        let copy = unsafe { libc::dup(fd) };
        if copy < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(copy)
    }

    fn dup2(from: RawFd, to: RawFd) -> io::Result<()> {
        // SAFETY: both descriptors are open for the duration of the call
        if unsafe { libc::dup2(from, to) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn close(fd: RawFd) {
        // SAFETY: fd is a duplicate owned exclusively by SavedStreams
        unsafe {
            libc::close(fd);
        }
    }

    pub fn redirect_to_null() -> io::Result<SavedStreams> {
        let null = OpenOptions::new().read(true).write(true).open("/dev/null")?;

        let stdout = dup(STDOUT)?;
        let stderr = match dup(STDERR) {
            Ok(fd) => fd,
            Err(err) => {
                close(stdout);
                return Err(err);
            }
        };
        let saved = SavedStreams { stdout, stderr };

        if let Err(err) = dup2(null.as_raw_fd(), STDOUT).and_then(|_| dup2(null.as_raw_fd(), STDERR)) {
            // put back whatever was already swapped
            let _ = restore(saved);
            return Err(err);
        }

        // `null` closes here; descriptors 1 and 2 keep their own references
        Ok(saved)
    }

    pub fn restore(saved: SavedStreams) -> io::Result<()> {
        let result = dup2(saved.stdout, STDOUT).and(dup2(saved.stderr, STDERR));
        close(saved.stdout);
        close(saved.stderr);
        result
    }
}

#[cfg(not(unix))]
mod platform {
    use std::io;

    pub struct SavedStreams;

    pub fn redirect_to_null() -> io::Result<SavedStreams> {
        log::debug!("Stream silencing is not supported on this platform; output passes through");
        Ok(SavedStreams)
    }

    pub fn restore(_saved: SavedStreams) -> io::Result<()> {
        Ok(())
    }
}
