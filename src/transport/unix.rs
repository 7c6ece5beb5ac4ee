//! POSIX transport: a persistent Unix domain stream socket, placed into
//! non-blocking mode immediately after connecting.

use std::io::{self, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use crate::error::DaemonClientError;
use crate::wire::NonBlockingWrite;

pub struct UnixTransport {
    stream: UnixStream,
    path: PathBuf,
}

impl UnixTransport {
    /// Connects to `path` and switches the socket to non-blocking mode. The
    /// connection is held for the process lifetime; there is no reconnect on
    /// a later failure.
    pub fn connect(path: &Path) -> Result<Self, DaemonClientError> {
        let stream = UnixStream::connect(path).map_err(|source| {
            log::warn!("daemon client could not connect to {}: {source}", path.display());
            DaemonClientError::TransportUnavailable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        stream.set_nonblocking(true).map_err(|source| {
            DaemonClientError::TransportUnavailable {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Ok(Self {
            stream,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NonBlockingWrite for UnixTransport {
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::os::unix::net::UnixListener;

    #[test]
    fn test_connect_fails_when_nothing_is_listening() {
        let path = std::env::temp_dir().join("daemon-client-test-nonexistent.sock");
        let _ = std::fs::remove_file(&path);
        assert!(UnixTransport::connect(&path).is_err());
    }

    #[test]
    fn test_connect_succeeds_against_a_listener() {
        let path = std::env::temp_dir().join(format!(
            "daemon-client-test-{}.sock",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).unwrap();

        let transport = UnixTransport::connect(&path).unwrap();
        assert_eq!(transport.path(), path.as_path());

        drop(listener);
        let _ = std::fs::remove_file(&path);
    }
}
