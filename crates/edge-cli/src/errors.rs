#![allow(dead_code)]
// Exit Codes as defined in https://man.freebsd.org/cgi/man.cgi?query=sysexits

pub type ExitCode = i32;

/// Successful exit
pub const OK: ExitCode = 0;

/// Catch-all for failures that have no more specific code.
pub const GENERAL: ExitCode = 1;

/// The command was used incorrectly, e.g., with the
/// wrong number of arguments, a bad flag, a bad syntax
/// in a parameter, etc.
pub const USAGE: ExitCode = 64;

/// The input data was incorrect in some way.  This
/// should only be used for user's data and not system
/// files.
pub const DATAERR: ExitCode = 65;

/// An input file (not a system file) did not exist or wasn't readable
pub const NOINPUT: ExitCode = 66;

/// The user specified did not exist. Eg. no API token could be found.
pub const NOUSER: ExitCode = 67;

/// A service is unavailable. For example the management API could not be
/// reached.
pub const UNAVAILABLE: ExitCode = 69;

/// An internal software error has been detected.
pub const SOFTWARE: ExitCode = 70;

/// An operating system error has been detected.
/// For example if the OS failed to return the current system time
pub const OSERR: ExitCode = 71;

/// A (user specified) output file cannot be created.
pub const CANTCREAT: ExitCode = 73;

/// An error occurred while doing I/O on some file.
pub const IOERR: ExitCode = 74;

/// Temporary failure, indicating something that is not
/// really an error. For example when the browser sign-in
/// is not completed before the timeout.
pub const TEMPFAIL: ExitCode = 75;

/// The remote system returned something that was
/// "not possible" during a protocol exchange.
pub const PROTOCOL: ExitCode = 76;

/// You did not have sufficient permission to perform
/// the operation.
pub const NOPERM: ExitCode = 77;

/// Something was found in an unconfigured or misconfigured state.
pub const CONFIG: ExitCode = 78;
