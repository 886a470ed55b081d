//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | CLI usage error (bad args, unknown subcommand)     |
//! | 3    | Schema error: a required column was not found      |
//! | 4    | Parse error: an input file is unreadable/malformed |
//! | 5    | Invalid config (TOML or validation)                |
//! | 6    | I/O error writing the report or JSON               |
//! | 7    | Discrepancies found (`run --strict` only)          |

use jeongsan_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments. clap exits with 2 on its own parse failures.
pub const EXIT_USAGE: u8 = 2;

/// A required canonical field resolved to no column.
pub const EXIT_SCHEMA: u8 = 3;

/// Input file unreadable, unsupported, or malformed.
pub const EXIT_PARSE: u8 = 4;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// Reading the config or writing an output file failed.
pub const EXIT_IO: u8 = 6;

/// Unmatched, overpaid or underpaid rows present and `--strict` was given.
pub const EXIT_DISCREPANCIES: u8 = 7;

/// Map an engine/IO error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::Schema { .. } => EXIT_SCHEMA,
        ReconError::Parse { .. } => EXIT_PARSE,
        ReconError::Io(_) | ReconError::Write(_) => EXIT_IO,
    }
}
