//! Unit tests for setup and fetch errors.

use std::io;
use std::path::PathBuf;

use rstest::rstest;

use super::*;

#[rstest]
#[case::toolchain(
    SetupError::Toolchain {
        program: String::from("g++"),
        message: String::from("not found"),
    },
    "required tool 'g++' is not available: not found"
)]
#[case::compile(
    SetupError::CompileFailed {
        source_path: PathBuf::from("/tmp/shim.cpp"),
        stderr: String::from("error: expected ';'"),
    },
    "compiling '/tmp/shim.cpp' failed: error: expected ';'"
)]
#[case::download(
    SetupError::Download { artifact: String::from("gson-2.8.9.jar") },
    "failed to download 'gson-2.8.9.jar' from every mirror"
)]
#[case::checksum(
    SetupError::ChecksumMismatch {
        url: String::from("https://mirror.test/gson.jar"),
        expected: String::from("aa"),
        actual: String::from("bb"),
    },
    "checksum mismatch for 'https://mirror.test/gson.jar': expected aa, got bb"
)]
#[case::inherited(
    SetupError::Inherited { reason: String::from("required tool 'node' is not available") },
    "required tool 'node' is not available"
)]
fn setup_error_messages(#[case] error: SetupError, #[case] expected: &str) {
    assert_eq!(error.to_string(), expected);
}

#[test]
fn io_error_names_the_asset() {
    let error = SetupError::io(
        "/assets/OpenRegexCli.java",
        io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    );
    assert!(error.to_string().contains("/assets/OpenRegexCli.java"));
}

#[test]
fn unavailable_carries_engine_and_reason() {
    let setup = SetupError::Toolchain {
        program: String::from("node"),
        message: String::from("not found"),
    };
    let error = setup.unavailable("JavaScript");
    assert_eq!(
        error.to_string(),
        "engine 'JavaScript' is unavailable: required tool 'node' is not available: not found"
    );
}

#[test]
fn fetch_error_names_the_url() {
    let error = FetchError::Transport {
        url: String::from("https://mirror.test/a.jar"),
        message: String::from("status 404"),
    };
    assert_eq!(
        error.to_string(),
        "request to 'https://mirror.test/a.jar' failed: status 404"
    );
}
