use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::AsRawFd;

use tarn_caps::{BuildCaps, Profile};
use tarn_rt::io::{close, open, read, read_stream, write};
use tarn_rt::ExceptionKind;


fn io_runtime() -> tarn_rt::Runtime {
    rt_program::runtime(Profile::Io.caps())
}

#[test]
fn write_then_read_back_through_descriptors() {
    let rt = io_runtime();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data.bin");
    let path_bytes = path.as_os_str().as_bytes();

    let fd = open(&rt, path_bytes, libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC, 0o644)
        .expect("open for write")
        .as_int()
        .expect("fd") as i32;
    let wrote = write(&rt, fd, "héllo".as_bytes()).expect("write");
    assert_eq!(wrote.as_int(), Some(6));
    close(&rt, fd).expect("close");

    let fd = open(&rt, path_bytes, libc::O_RDONLY, 0)
        .expect("open for read")
        .as_int()
        .expect("fd") as i32;
    let first = read(&rt, fd, 3).expect("read");
    assert_eq!(first.as_bytes(), Some(&b"h\xc3\xa9"[..]));
    let rest = read_stream(&rt, fd, 10).expect("read_stream");
    assert_eq!(rest.as_bytes(), Some(&b"llo"[..]));
    let eof = read(&rt, fd, 4).expect("read at end");
    assert_eq!(eof.as_bytes(), Some(&b""[..]));
    close(&rt, fd).expect("close");
}

#[test]
fn stream_read_at_end_raises_eof() {
    let rt = io_runtime();
    let file = tempfile::NamedTempFile::new().expect("tempfile");
    let err = read_stream(&rt, file.as_file().as_raw_fd(), 8).unwrap_err();
    assert!(err.is(ExceptionKind::EofError));
}

#[test]
fn stream_read_returns_short_data() {
    let rt = io_runtime();
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(b"abc").expect("write");
    let reader = std::fs::File::open(file.path()).expect("reopen");
    let got = read_stream(&rt, reader.as_raw_fd(), 8).expect("read_stream");
    assert_eq!(got.as_bytes(), Some(&b"abc"[..]));
}

#[test]
fn os_failures_carry_the_error_code() {
    let rt = io_runtime();
    let err = close(&rt, -1).unwrap_err();
    assert!(err.is(ExceptionKind::IoError));
    assert_eq!(err.code(), Some(i64::from(libc::EBADF)));

    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing");
    let err = open(&rt, missing.as_os_str().as_bytes(), libc::O_RDONLY, 0).unwrap_err();
    assert_eq!(err.code(), Some(i64::from(libc::ENOENT)));

    let err = open(&rt, b"bad\0path", libc::O_RDONLY, 0).unwrap_err();
    assert_eq!(err.code(), Some(i64::from(libc::EINVAL)));
}

#[test]
fn io_profile_enables_only_io_kinds() {
    let caps: BuildCaps = "io".parse().expect("profile");
    assert!(ExceptionKind::IoError
        .capability()
        .is_some_and(|c| caps.has(c)));
    assert!(ExceptionKind::OsError
        .capability()
        .is_some_and(|c| !caps.has(c)));
}

#[test]
fn oversized_reads_raise_memory_error() {
    let rt = io_runtime();
    let file = tempfile::NamedTempFile::new().expect("tempfile");
    let fd = file.as_file().as_raw_fd();
    for n in [usize::MAX, isize::MAX as usize + 1] {
        let err = read(&rt, fd, n).unwrap_err();
        assert!(err.is(ExceptionKind::MemoryError), "{err}");
        let err = read_stream(&rt, fd, n).unwrap_err();
        assert!(err.is(ExceptionKind::MemoryError), "{err}");
    }
}
