//! Common test utilities and helpers.

pub mod test_utils;

/// Test payloads
pub mod test_data {
    /// Shell script exiting with status 7.
    pub const EXIT_7_SCRIPT: &[u8] = b"#!/bin/sh\nexit 7\n";

    /// Shell script echoing its arguments, space separated.
    pub const ECHO_ARGS_SCRIPT: &[u8] = b"#!/bin/sh\necho \"$@\"\n";

    /// Host binary used as a real ELF payload.
    pub const HOST_TRUE: &str = "/bin/true";
}
