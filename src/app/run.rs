// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::convert::TryFrom;
use std::ffi::OsString;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::cli_parser::{create_parser, normalize_args};
use crate::app::logging::Logging;
use crate::app::{AppConfig, ExitStatus};
use crate::batch::BatchCoordinator;
use crate::report::{ConsoleReporter, Reporter};
use crate::resolver::{Backend, Deadline, ResolverFactory};

/// Parses `args`, sets up logging, and runs the batch.
pub async fn run<I, T>(args: I) -> Result<ExitStatus>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let reporter: Arc<dyn Reporter> = Arc::new(ConsoleReporter::new());

    let args = match create_parser().try_get_matches_from(normalize_args(args)) {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print().context("Failed to print help")?;
            return Ok(ExitStatus::Ok);
        }
        Err(e) => {
            e.print().context("Failed to print usage")?;
            return Ok(ExitStatus::CliParsingFailed);
        }
    };
    let config = match AppConfig::try_from(&args) {
        Ok(config) => config,
        Err(e) => {
            reporter.error(&format!("{:#}", e));
            eprintln!("{}", create_parser().render_usage());
            return Ok(ExitStatus::CliParsingFailed);
        }
    };

    Logging::new(
        config.verbosity,
        std::env::var_os("RUST_LOG"),
        config.color,
        config.debug,
    )
    .start()
    .context("Failed to set up logging")?;
    debug!("Parsed args and set up logging.");

    resolve(&config, reporter).await
}

/// Resolves all hostnames of `config`; an invalid DNS server is a usage error.
pub async fn resolve(config: &AppConfig, reporter: Arc<dyn Reporter>) -> Result<ExitStatus> {
    let factory = ResolverFactory::new(config.resolver_opts());
    let backend = match factory.build(config.dns_server.as_deref()) {
        Ok(backend) => backend,
        Err(e) => {
            reporter.error(&e.to_string());
            return Ok(ExitStatus::CliParsingFailed);
        }
    };
    info!("Created resolver backend {}.", backend.name());

    let token = CancellationToken::new();
    let ctrl_c = tokio::spawn(cancel_on_ctrl_c(token.clone()));
    let deadline = Deadline::with_token(config.timeout, token);

    let coordinator = BatchCoordinator::new(Arc::new(backend), reporter);
    let res = coordinator
        .run(&deadline, config.mode, &config.hostnames)
        .await
        .context("Failed to resolve hostnames");
    ctrl_c.abort();

    let summary = res?;
    info!(
        "Resolved {} of {} hostnames successfully.",
        summary.successes(),
        summary.hostnames.len()
    );

    Ok(ExitStatus::Ok)
}

async fn cancel_on_ctrl_c(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Received Ctrl-C, cancelling all lookups.");
        token.cancel();
    }
}
