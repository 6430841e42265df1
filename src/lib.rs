// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Resolves a batch of hostnames concurrently and looks up all resulting addresses in reverse.
//!
//! All lookups of a batch share one [`resolver::Backend`] and one [`resolver::Deadline`]. Results are handed to a
//! [`report::Reporter`] line by line and are also returned as a [`batch::BatchSummary`].
//!
//! # Example
//! ```no_run
//! # use std::sync::Arc;
//! # use std::time::Duration;
//! # use resolve_hostname::{AddressFamilyMode, BatchCoordinator, ConsoleReporter, Deadline, ResolverFactory};
//! # #[tokio::main]
//! # async fn main() -> resolve_hostname::Result<()> {
//! let backend = ResolverFactory::default().build(Some("8.8.8.8"))?;
//! let coordinator = BatchCoordinator::new(Arc::new(backend), Arc::new(ConsoleReporter::new()));
//! let deadline = Deadline::after(Duration::from_millis(1000));
//!
//! let summary = coordinator
//!     .run(&deadline, AddressFamilyMode::IPv4Only, &["example.com", "example.org"])
//!     .await?;
//! println!("{} of {} hostnames resolved", summary.successes(), summary.hostnames.len());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod lookup;
pub mod report;
pub mod resolver;
pub mod utils;

#[cfg(feature = "app")]
pub mod app;

pub use batch::{BatchCoordinator, BatchSummary};
pub use lookup::{HostnameOutcome, HostnameResolver, ReverseResolver};
pub use report::{ConsoleReporter, MemoryReporter, Reporter};
pub use resolver::{AddressFamilyMode, Backend, Deadline, Error, ResolverFactory, ResolverOpts};

pub type Result<T> = std::result::Result<T, Error>;
