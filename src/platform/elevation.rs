//! Privilege detection. Several sensor chips (Super I/O, some ECs) only
//! answer to an elevated process, so the snapshot reports it as `isAdmin`.

#[cfg(windows)]
pub fn is_elevated() -> bool {
    use std::mem::{size_of, zeroed};
    use std::ptr::null_mut;
    use winapi::ctypes::c_void;
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::{GetCurrentProcess, OpenProcessToken};
    use winapi::um::securitybaseapi::GetTokenInformation;
    use winapi::um::winnt::{TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY};

    // SAFETY: the token handle is only used while open and always closed;
    // TOKEN_ELEVATION is a plain C struct, valid when zeroed.
    unsafe {
        let mut token: *mut c_void = null_mut();
        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token) == 0 {
            return false;
        }

        let mut info: TOKEN_ELEVATION = zeroed();
        let mut len = 0u32;
        let queried = GetTokenInformation(
            token,
            TokenElevation,
            (&mut info as *mut TOKEN_ELEVATION).cast(),
            size_of::<TOKEN_ELEVATION>() as u32,
            &mut len,
        ) != 0;
        CloseHandle(token);

        queried && info.TokenIsElevated != 0
    }
}

#[cfg(not(windows))]
pub fn is_elevated() -> bool {
    // Effective uid 0 is the only elevation that matters for hwmon access.
    unsafe { libc::geteuid() == 0 }
}
