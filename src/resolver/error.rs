// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::ResolveError;
use thiserror::Error;
use tokio::task::JoinError;

/// Errors of forward and reverse lookups as well as of setting up a batch.
///
/// Only `InvalidAddress`, `UnsupportedMode`, and `EmptyInput` are meant to stop a batch; everything else is reported
/// for the affected hostname or address and the batch carries on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid ip address: {address}")]
    InvalidAddress { address: String },
    #[error("unsupported address family mode '{mode}'; expected ip, ip4, or ip6")]
    UnsupportedMode { mode: String },
    #[error("no hostnames to resolve")]
    EmptyInput,
    #[error("{detail}")]
    Dns { not_found: bool, detail: String },
    #[error("request timed out")]
    Timeout,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("query has been cancelled")]
    Cancelled,
    #[error("query execution panicked")]
    RuntimePanic,
}

impl Error {
    pub fn dns<S: Into<String>>(detail: S, not_found: bool) -> Error {
        Error::Dns {
            not_found,
            detail: detail.into(),
        }
    }

    /// `true` if the nameserver authoritatively said there is no such name or no such record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Dns { not_found: true, .. })
    }

    /// `true` if the lookup has been stopped by the batch deadline or an explicit cancellation.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::DeadlineExceeded | Error::Cancelled)
    }
}

impl From<ResolveError> for Error {
    fn from(error: ResolveError) -> Self {
        if error.is_nx_domain() || error.is_no_records_found() {
            return Error::dns(error.to_string(), true);
        }
        match error.proto().map(|x| x.kind()) {
            Some(ProtoErrorKind::Timeout) => Error::Timeout,
            _ => Error::dns(error.to_string(), false),
        }
    }
}

impl From<JoinError> for Error {
    fn from(error: JoinError) -> Self {
        if error.is_cancelled() {
            return Error::Cancelled;
        }
        Error::RuntimePanic
    }
}
