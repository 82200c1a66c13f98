#![allow(non_camel_case_types)]
#![allow(clippy::missing_safety_doc)]

//! C ABI entry points for the string natives of generated programs.
//!
//! Input buffers cross the boundary as `tn_bytes`. A substring comes back as a
//! `tn_substr_result`: `status` is `TN_STATUS_OK` with `out` filled, or one of the
//! `UNICODE_ERR_*` codes with `out` empty. Output buffers are allocated by the
//! host through `tn_bytes_alloc`, which must return exactly the requested length
//! or the call traps.

use tarn_rt::unicode;
use tarn_rt::ExceptionKind;

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct tn_bytes {
    pub ptr: *mut u8,
    pub len: u32,
}

impl tn_bytes {
    const EMPTY: tn_bytes = tn_bytes {
        ptr: std::ptr::null_mut(),
        len: 0,
    };
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct tn_substr_result {
    pub status: u32,
    pub out: tn_bytes,
}

extern "C" {
    fn tn_bytes_alloc(len: u32) -> tn_bytes;
    fn tn_trap(code: i32) -> !;
}

const TN_TRAP_UNICODE_INTERNAL: i32 = 9700;

pub const TN_STATUS_OK: u32 = 0;
pub const UNICODE_ERR_ZERO_STEP_V1: u32 = 70101;
pub const UNICODE_ERR_OVERFLOW_V1: u32 = 70102;
pub const UNICODE_ERR_TOO_LARGE_V1: u32 = 70116;
pub const UNICODE_ERR_INTERNAL_V1: u32 = 70199;

impl tn_substr_result {
    fn failed(status: u32) -> Self {
        Self {
            status,
            out: tn_bytes::EMPTY,
        }
    }
}

fn status_for(kind: ExceptionKind) -> u32 {
    match kind {
        ExceptionKind::ZeroDivisionError => UNICODE_ERR_ZERO_STEP_V1,
        ExceptionKind::OverflowError => UNICODE_ERR_OVERFLOW_V1,
        _ => UNICODE_ERR_INTERNAL_V1,
    }
}

unsafe fn input<'a>(b: tn_bytes) -> &'a [u8] {
    if b.len == 0 || b.ptr.is_null() {
        return &[];
    }
    std::slice::from_raw_parts(b.ptr, b.len as usize)
}

/// Copies `v` into a buffer owned by the host.
unsafe fn to_host(v: &[u8]) -> tn_substr_result {
    let Ok(len) = u32::try_from(v.len()) else {
        return tn_substr_result::failed(UNICODE_ERR_TOO_LARGE_V1);
    };
    let out = tn_bytes_alloc(len);
    if out.len != len {
        tn_trap(TN_TRAP_UNICODE_INTERNAL);
    }
    if len != 0 {
        std::ptr::copy_nonoverlapping(v.as_ptr(), out.ptr, v.len());
    }
    tn_substr_result {
        status: TN_STATUS_OK,
        out,
    }
}

/// Code-point length of a UTF-8 buffer, or -1 if the count could not be taken.
#[no_mangle]
pub extern "C" fn tarn_unicode_len_v1(s: tn_bytes) -> i64 {
    std::panic::catch_unwind(|| unsafe { unicode::length(input(s)) as i64 }).unwrap_or(-1)
}

/// Code points `start, start+step, ...` before `end`, copied into a host buffer.
#[no_mangle]
pub extern "C" fn tarn_unicode_substr_v1(
    s: tn_bytes,
    start: i64,
    end: i64,
    step: i64,
) -> tn_substr_result {
    std::panic::catch_unwind(|| unsafe {
        match unicode::substring(input(s), start, end, step) {
            Ok(out) => to_host(&out),
            Err(raised) => tn_substr_result::failed(status_for(raised.kind)),
        }
    })
    .unwrap_or_else(|_| tn_substr_result::failed(UNICODE_ERR_INTERNAL_V1))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Host side of the allocation contract; buffers are leaked for the test's lifetime.
    #[no_mangle]
    extern "C" fn tn_bytes_alloc(len: u32) -> tn_bytes {
        let buf: &'static mut [u8] = Vec::leak(vec![0u8; len as usize]);
        tn_bytes {
            ptr: buf.as_mut_ptr(),
            len,
        }
    }

    #[no_mangle]
    extern "C" fn tn_trap(_code: i32) -> ! {
        std::process::abort()
    }

    fn bytes(s: &str) -> tn_bytes {
        tn_bytes {
            ptr: s.as_ptr() as *mut u8,
            len: s.len() as u32,
        }
    }

    fn output(r: tn_substr_result) -> &'static [u8] {
        assert_eq!(r.status, TN_STATUS_OK);
        unsafe { input(r.out) }
    }

    #[test]
    fn length_counts_code_points() {
        assert_eq!(tarn_unicode_len_v1(bytes("héllo")), 5);
        assert_eq!(tarn_unicode_len_v1(tn_bytes::EMPTY), 0);
    }

    #[test]
    fn substring_lands_in_a_host_buffer() {
        let r = tarn_unicode_substr_v1(bytes("héllo"), 4, -1, -2);
        assert_eq!(output(r), "olh".as_bytes());
        let r = tarn_unicode_substr_v1(bytes("héllo"), 1, 1, 2);
        assert!(output(r).is_empty());
    }

    #[test]
    fn raised_errors_become_status_codes() {
        let r = tarn_unicode_substr_v1(bytes("abc"), 0, 3, 0);
        assert_eq!(r.status, UNICODE_ERR_ZERO_STEP_V1);
        assert_eq!(r.out.len, 0);
        let r = tarn_unicode_substr_v1(bytes("abc"), i64::MIN, i64::MAX, 1);
        assert_eq!(r.status, UNICODE_ERR_OVERFLOW_V1);
    }
}
