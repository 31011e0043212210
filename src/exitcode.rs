//! Process exit codes
//!
//! Usage errors are fixed at 2 (clap's default). Handler failures use the
//! BSD sysexits.h classes.

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error (bad/missing arguments, unknown command)
pub const USAGE: i32 = 2;

/// Data format error (malformed input, e.g. invalid base64)
pub const DATAERR: i32 = 65;

/// Cannot open input (file or path not found)
pub const NOINPUT: i32 = 66;

/// Service unavailable (network unreachable, host not resolvable)
pub const UNAVAILABLE: i32 = 69;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;
