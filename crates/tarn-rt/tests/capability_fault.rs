//! A build that lacks a capability must stop the process at the call site that needs it.
//!
//! Each case re-runs this test binary with `FAULT_CASE_ENV` set so that only
//! `fault_child` executes, then checks that the child aborted.

use std::process::{Command, Output};

use tarn_caps::BuildCaps;
use tarn_rt::instantiate::populate_mapping;
use tarn_rt::raise::{eof_error, io_error, os_error};
use tarn_rt::Attr;


const FAULT_CASE_ENV: &str = "TARN_RT_FAULT_CASE";

#[test]
fn fault_child() {
    let Ok(case) = std::env::var(FAULT_CASE_ENV) else {
        return;
    };
    let rt = rt_program::runtime(BuildCaps::none());
    let outcome = match case.as_str() {
        "mapping" => populate_mapping(&rt, Attr::Null, &[]).map(drop),
        "io-error" => io_error::<()>(&rt, libc::EBADF),
        "eof-error" => eof_error::<()>(&rt),
        "os-error" => os_error::<()>(&rt, libc::ENOENT, Attr::Null),
        other => panic!("unknown fault case {other:?}"),
    };
    println!("returned normally: {:?}", outcome.map_err(|e| e.to_string()));
}

fn run_fault_case(case: &str) -> Output {
    let exe = std::env::current_exe().expect("test binary path");
    Command::new(exe)
        .args(["fault_child", "--exact", "--nocapture", "--test-threads=1"])
        .env(FAULT_CASE_ENV, case)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn child test")
}

fn assert_aborted(case: &str) {
    let out = run_fault_case(case);
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(!out.status.success(), "{case}: child succeeded\n{stdout}");
    assert!(!stdout.contains("returned normally"), "{case}: {stdout}");
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(out.status.signal(), Some(libc::SIGABRT), "{case}: {:?}", out.status);
    }
    assert!(
        stderr.contains(&format!("does not include capability {case:?}")),
        "{case}: {stderr}"
    );
}

#[test]
fn mapping_literal_without_mapping_support_aborts() {
    assert_aborted("mapping");
}

#[test]
fn io_error_without_io_support_aborts() {
    assert_aborted("io-error");
}

#[test]
fn eof_error_without_eof_support_aborts() {
    assert_aborted("eof-error");
}

#[test]
fn os_error_without_os_support_aborts() {
    assert_aborted("os-error");
}
