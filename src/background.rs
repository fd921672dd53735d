use std::io;
use tracing::warn;

/// Which side of the fork this process ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fork {
    /// The original process; it should log and exit.
    Parent,
    /// The detached daemon; it carries on into the control loop.
    Child,
}

/// Fork into the background. The child releases its handle on the working
/// directory and closes stdio so nothing keeps the terminal alive.
///
/// Must be called before the control loop starts and while the process is
/// still single-threaded.
pub fn daemonize() -> io::Result<Fork> {
    let pid = unsafe { libc::fork() };
    match pid {
        -1 => Err(io::Error::last_os_error()),
        0 => {
            if unsafe { libc::chdir(b"/\0".as_ptr().cast()) } < 0 {
                warn!("chdir(\"/\") failed: {}", io::Error::last_os_error());
            }
            unsafe {
                libc::close(libc::STDIN_FILENO);
                libc::close(libc::STDOUT_FILENO);
                libc::close(libc::STDERR_FILENO);
            }
            Ok(Fork::Child)
        }
        _ => Ok(Fork::Parent),
    }
}
