// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

pub mod cli_parser;
pub mod config;
pub mod logging;
pub mod run;

pub use config::AppConfig;
pub use run::run;

/// `ExitStatus` represents the exit states that will be return to the OS after termination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// All fine; failed lookups of single hostnames are no reason to fail.
    Ok = 0,
    /// CLI argument parsing or validation failed, including an invalid DNS server address.
    CliParsingFailed = 1,
    /// An unrecoverable error occurred. This is worst case and should not happen.
    UnrecoverableError = 3,
}
