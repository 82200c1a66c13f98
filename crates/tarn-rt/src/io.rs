//! Descriptor-level I/O for the program's `native` module.
//!
//! Each operation works on raw byte buffers and reports failure by raising
//! `IOError` with the OS error code, or `EOFError` where end of input means there
//! is nothing to return.

use std::ffi::CString;

use libc::c_void;

use crate::attr::Attr;
use crate::raise::{self, RtResult};
use crate::runtime::Runtime;

fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// Zeroed buffer of `n` bytes; `MemoryError` when it cannot be reserved.
fn read_buffer(n: usize) -> RtResult<Vec<u8>> {
    let mut buf = Vec::new();
    if buf.try_reserve_exact(n).is_err() {
        return raise::memory_error();
    }
    buf.resize(n, 0);
    Ok(buf)
}

/// Opens `path` with `open(2)` flags; returns the descriptor.
pub fn open(rt: &Runtime, path: &[u8], flags: i32, mode: u32) -> RtResult<Attr> {
    let Ok(path) = CString::new(path) else {
        return raise::io_error(rt, libc::EINVAL);
    };
    let fd = unsafe { libc::open(path.as_ptr(), flags, mode as libc::c_uint) };
    if fd == -1 {
        return raise::io_error(rt, last_errno());
    }
    Ok(Attr::Int(fd.into()))
}

pub fn close(rt: &Runtime, fd: i32) -> RtResult<Attr> {
    if unsafe { libc::close(fd) } == -1 {
        return raise::io_error(rt, last_errno());
    }
    Ok(Attr::object(rt.builtins().none.clone()))
}

/// At most `n` bytes from `fd`; an empty string at end of input.
pub fn read(rt: &Runtime, fd: i32, n: usize) -> RtResult<Attr> {
    let mut buf = read_buffer(n)?;
    let got = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut c_void, n) };
    if got < 0 {
        return raise::io_error(rt, last_errno());
    }
    buf.truncate(got as usize);
    Ok(Attr::str(buf))
}

/// Reads until `n` bytes arrive or input ends.
///
/// Reaching end of input before anything was read raises `EOFError`; a short read
/// after some data returns what arrived.
pub fn read_stream(rt: &Runtime, fd: i32, n: usize) -> RtResult<Attr> {
    let mut buf = read_buffer(n)?;
    let mut have = 0;
    while have < n {
        let got = unsafe { libc::read(fd, buf[have..].as_mut_ptr() as *mut c_void, n - have) };
        if got < 0 {
            let code = last_errno();
            if code == libc::EINTR {
                continue;
            }
            return raise::io_error(rt, code);
        }
        if got == 0 {
            break;
        }
        have += got as usize;
    }
    if have == 0 && n > 0 {
        return raise::eof_error(rt);
    }
    buf.truncate(have);
    Ok(Attr::str(buf))
}

/// Writes `data` to `fd`; returns the number of bytes written.
pub fn write(rt: &Runtime, fd: i32, data: &[u8]) -> RtResult<Attr> {
    let wrote = unsafe { libc::write(fd, data.as_ptr() as *const c_void, data.len()) };
    if wrote < 0 {
        return raise::io_error(rt, last_errno());
    }
    Ok(Attr::Int(wrote as i64))
}
