//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error (unspecified)                               |
//! | 2    | Usage error (bad args, no data source configured)         |
//! | 3    | Plan, card history or bale log not found                  |
//! | 4    | No plan band matches the requested view                   |
//! | 5    | Outstanding services remain (`--fail-on-outstanding`)     |
//! | 6    | Settings or vocabulary invalid                            |
//! | 7    | Source read/write error (unreadable workbook, bad CSV)    |

use millcard_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Plan sheet/file, card history or bale log is missing.
pub const EXIT_NOT_FOUND: u8 = 3;

/// The view selected no plan bands. The report is still printed.
pub const EXIT_NO_BANDS: u8 = 4;

/// At least one required service is not done and `--fail-on-outstanding` is set.
pub const EXIT_OUTSTANDING: u8 = 5;

/// Settings file or column vocabulary is invalid.
pub const EXIT_CONFIG: u8 = 6;

/// Underlying source could not be read or written.
pub const EXIT_SOURCE: u8 = 7;

pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::NotFound { .. } => EXIT_NOT_FOUND,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::Source(_) => EXIT_SOURCE,
    }
}
