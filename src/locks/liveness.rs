//! OS process liveness probe.
//!
//! - **Unix**: `kill(pid, 0)`; `EPERM` counts as running.
//! - **Windows**: `OpenProcess` + `GetExitCodeProcess`; access denied counts
//!   as running.
//!
//! Either way, a process we may not inspect is reported as running: the probe
//! only has to avoid removing a live holder's lock.

#[cfg(not(any(unix, windows)))]
compile_error!("pipeline-serializer needs a process liveness probe for this target (unix or windows)");

/// Whether a process with id `pid` is currently running.
///
/// Ids outside the OS range (zero, negative, too large) are reported as not
/// running.
#[cfg(unix)]
pub fn is_process_alive(pid: i64) -> bool {
    let Ok(raw) = libc::pid_t::try_from(pid) else {
        return false;
    };
    // 0 and negatives address process groups, not a single process.
    if raw <= 0 {
        return false;
    }

    // SAFETY: signal 0 performs the existence and permission checks only.
    if unsafe { libc::kill(raw, 0) } == 0 {
        return true;
    }

    // ESRCH: no such process.
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(windows)]
pub fn is_process_alive(pid: i64) -> bool {
    match u32::try_from(pid) {
        // Pid 0 is the idle process, never a lock holder.
        Ok(raw) if raw > 0 => windows::is_process_alive(raw),
        _ => false,
    }
}

/// The process recorded as holder when this process takes a lock: the
/// orchestrating process that invoked us.
#[cfg(unix)]
pub fn default_holder_pid() -> u32 {
    std::os::unix::process::parent_id()
}

#[cfg(windows)]
pub fn default_holder_pid() -> u32 {
    windows::parent_pid(std::process::id()).unwrap_or_else(std::process::id)
}

#[cfg(windows)]
mod windows {
    use std::ffi::c_void;

    type Handle = *mut c_void;

    const PROCESS_QUERY_LIMITED_INFORMATION: u32 = 0x1000;
    const STILL_ACTIVE: u32 = 259;
    const ERROR_ACCESS_DENIED: u32 = 5;
    const TH32CS_SNAPPROCESS: u32 = 0x2;
    const MAX_PATH: usize = 260;

    #[repr(C)]
    struct ProcessEntry32W {
        dw_size: u32,
        cnt_usage: u32,
        th32_process_id: u32,
        th32_default_heap_id: usize,
        th32_module_id: u32,
        cnt_threads: u32,
        th32_parent_process_id: u32,
        pc_pri_class_base: i32,
        dw_flags: u32,
        sz_exe_file: [u16; MAX_PATH],
    }

    #[link(name = "kernel32")]
    unsafe extern "system" {
        fn OpenProcess(dwDesiredAccess: u32, bInheritHandle: i32, dwProcessId: u32) -> Handle;
        fn GetExitCodeProcess(hProcess: Handle, lpExitCode: *mut u32) -> i32;
        fn CloseHandle(hObject: Handle) -> i32;
        fn GetLastError() -> u32;
        fn CreateToolhelp32Snapshot(dwFlags: u32, th32ProcessID: u32) -> Handle;
        fn Process32FirstW(hSnapshot: Handle, lppe: *mut ProcessEntry32W) -> i32;
        fn Process32NextW(hSnapshot: Handle, lppe: *mut ProcessEntry32W) -> i32;
    }

    pub(super) fn is_process_alive(pid: u32) -> bool {
        // SAFETY: plain Win32 calls; the handle is closed on every path.
        unsafe {
            let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
            if handle.is_null() {
                // ERROR_INVALID_PARAMETER: no such process.
                return GetLastError() == ERROR_ACCESS_DENIED;
            }

            let mut code: u32 = 0;
            let queried = GetExitCodeProcess(handle, &mut code);
            CloseHandle(handle);

            // An exited process stays openable while anyone holds a handle.
            queried == 0 || code == STILL_ACTIVE
        }
    }

    /// Parent of `pid` from a toolhelp process snapshot.
    pub(super) fn parent_pid(pid: u32) -> Option<u32> {
        // SAFETY: the entry is sized as the API requires and the snapshot
        // handle is closed before returning.
        unsafe {
            let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0);
            if snapshot.is_null() || snapshot as isize == -1 {
                return None;
            }

            let mut entry: ProcessEntry32W = std::mem::zeroed();
            entry.dw_size = std::mem::size_of::<ProcessEntry32W>() as u32;

            let mut found = None;
            let mut ok = Process32FirstW(snapshot, &mut entry);
            while ok != 0 {
                if entry.th32_process_id == pid {
                    found = Some(entry.th32_parent_process_id);
                    break;
                }
                ok = Process32NextW(snapshot, &mut entry);
            }

            CloseHandle(snapshot);
            found
        }
    }
}
