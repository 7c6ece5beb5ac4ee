//! Process and thread identity probes used to stamp outgoing frames.

/// The current process ID, as embedded in every frame's `PROCESS_ID` field.
pub fn process_id() -> u64 {
    std::process::id() as u64
}

/// The current OS thread ID, when the platform exposes one. `None` means
/// the host has no thread concept the client can surface; callers encode
/// that as `0` on the wire and report the thread-identity flag as `false`.
pub fn thread_id() -> Option<u64> {
    imp::thread_id()
}

#[cfg(target_os = "linux")]
mod imp {
    pub fn thread_id() -> Option<u64> {
        // SYS_gettid has no failure mode on Linux; it always returns a valid tid.
        Some(unsafe { libc::syscall(libc::SYS_gettid) } as u64)
    }
}

#[cfg(target_os = "macos")]
mod imp {
    pub fn thread_id() -> Option<u64> {
        let mut tid: u64 = 0;
        let rc = unsafe { libc::pthread_threadid_np(0, &mut tid) };
        if rc == 0 {
            Some(tid)
        } else {
            None
        }
    }
}

#[cfg(windows)]
mod imp {
    pub fn thread_id() -> Option<u64> {
        Some(unsafe { windows_sys::Win32::System::Threading::GetCurrentThreadId() } as u64)
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
mod imp {
    pub fn thread_id() -> Option<u64> {
        None
    }
}
