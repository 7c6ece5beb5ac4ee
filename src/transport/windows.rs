//! Windows transport: a named pipe opened for writing, driven through
//! overlapped (asynchronous) I/O so a single outstanding write can be
//! polled without blocking the caller, mirroring the POSIX non-blocking
//! socket's behavior.

use std::ffi::OsStr;
use std::io::{self, ErrorKind};
use std::os::windows::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr;

use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_IO_INCOMPLETE, ERROR_IO_PENDING, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, WriteFile, FILE_ATTRIBUTE_NORMAL, FILE_FLAG_OVERLAPPED, FILE_SHARE_READ,
    FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows_sys::Win32::System::IO::{GetOverlappedResult, OVERLAPPED};
use windows_sys::Win32::System::Threading::{CreateEventW, GENERIC_WRITE};

use crate::error::DaemonClientError;
use crate::wire::NonBlockingWrite;

fn to_wide(path: &Path) -> Vec<u16> {
    OsStr::new(path)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

pub struct WindowsTransport {
    handle: HANDLE,
    event: HANDLE,
    overlapped: Box<OVERLAPPED>,
    write_pending: bool,
    path: PathBuf,
}

// The handle and event are owned exclusively by this struct and all access
// goes through `&mut self`; nothing here is implicitly thread-safe, callers
// serialize access the same way the rest of the session does.
unsafe impl Send for WindowsTransport {}

impl WindowsTransport {
    pub fn connect(path: &Path) -> Result<Self, DaemonClientError> {
        let wide = to_wide(path);

        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                ptr::null(),
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL | FILE_FLAG_OVERLAPPED,
                0,
            )
        };

        if handle == INVALID_HANDLE_VALUE {
            let source = io::Error::last_os_error();
            log::warn!("daemon client could not open named pipe {}: {source}", path.display());
            return Err(DaemonClientError::TransportUnavailable {
                path: path.to_path_buf(),
                source,
            });
        }

        let event = unsafe { CreateEventW(ptr::null(), 1, 0, ptr::null()) };
        if event == 0 {
            unsafe { CloseHandle(handle) };
            return Err(DaemonClientError::TransportUnavailable {
                path: path.to_path_buf(),
                source: io::Error::last_os_error(),
            });
        }

        let mut overlapped: Box<OVERLAPPED> = Box::new(unsafe { std::mem::zeroed() });
        overlapped.hEvent = event;

        Ok(Self {
            handle,
            event,
            overlapped,
            write_pending: false,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn poll_pending(&mut self) -> io::Result<usize> {
        let mut transferred: u32 = 0;
        let ok = unsafe {
            GetOverlappedResult(self.handle, &*self.overlapped, &mut transferred, 0)
        };

        if ok != 0 {
            self.write_pending = false;
            return Ok(transferred as usize);
        }

        match unsafe { GetLastError() } {
            ERROR_IO_INCOMPLETE => Err(io::Error::from(ErrorKind::WouldBlock)),
            _ => {
                self.write_pending = false;
                Err(io::Error::last_os_error())
            }
        }
    }
}

impl NonBlockingWrite for WindowsTransport {
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.write_pending {
            return self.poll_pending();
        }

        let mut written: u32 = 0;
        let ok = unsafe {
            WriteFile(
                self.handle,
                buf.as_ptr(),
                buf.len() as u32,
                &mut written,
                &mut *self.overlapped,
            )
        };

        if ok != 0 {
            return Ok(written as usize);
        }

        match unsafe { GetLastError() } {
            ERROR_IO_PENDING => {
                self.write_pending = true;
                Err(io::Error::from(ErrorKind::WouldBlock))
            }
            _ => Err(io::Error::last_os_error()),
        }
    }
}

impl Drop for WindowsTransport {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.event);
            CloseHandle(self.handle);
        }
    }
}
