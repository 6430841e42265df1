// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info_span, warn, Instrument};

use crate::lookup::{HostnameOutcome, HostnameResolver};
use crate::report::Reporter;
use crate::resolver::{AddressFamilyMode, Backend, Deadline, Error, ResolverResult};
use crate::utils::join;

/// Result of a whole batch.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub hostnames: Vec<String>,
    /// One outcome per hostname, in order of completion.
    pub outcomes: Vec<HostnameOutcome>,
    pub total: Duration,
    pub timeout: Duration,
}

impl BatchSummary {
    /// Compares the total run time to the configured timeout; this is independent of whether any lookup has actually
    /// been cancelled.
    pub fn deadline_exceeded(&self) -> bool {
        self.total >= self.timeout
    }

    pub fn prefix(&self) -> &'static str {
        if self.deadline_exceeded() {
            "Deadline exceeded"
        } else {
            "Total duration"
        }
    }

    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|x| x.is_ok()).count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.len() - self.successes()
    }

    pub fn outcome(&self, hostname: &str) -> Option<&HostnameOutcome> {
        self.outcomes.iter().find(|x| x.hostname == hostname)
    }

    fn summary_line(&self) -> String {
        format!(
            "{} for {} addresses {} ms: ({})",
            self.prefix(),
            self.hostnames.len(),
            self.total.as_millis(),
            join(&self.hostnames, ", ")
        )
    }
}

/// Resolves all hostnames of a batch concurrently, sharing one backend and one deadline.
#[derive(Clone)]
pub struct BatchCoordinator {
    backend: Arc<dyn Backend>,
    reporter: Arc<dyn Reporter>,
}

impl BatchCoordinator {
    pub fn new(backend: Arc<dyn Backend>, reporter: Arc<dyn Reporter>) -> Self {
        BatchCoordinator { backend, reporter }
    }

    /// Spawns one task per hostname and waits for every single one of them, no matter whether it succeeds, fails, or
    /// gets cancelled. There are no retries.
    pub async fn run<T: Into<String> + Clone>(
        &self,
        deadline: &Deadline,
        mode: AddressFamilyMode,
        hostnames: &[T],
    ) -> ResolverResult<BatchSummary> {
        if hostnames.is_empty() {
            return Err(Error::EmptyInput);
        }
        let hostnames: Vec<String> = hostnames.iter().cloned().map(Into::into).collect();

        let mut tasks = JoinSet::new();
        let mut running = HashMap::with_capacity(hostnames.len());
        for hostname in hostnames.iter().cloned() {
            let backend = self.backend.clone();
            let reporter = self.reporter.clone();
            let deadline = deadline.clone();
            let span = info_span!("resolve", %hostname);
            let task_hostname = hostname.clone();
            let handle = tasks.spawn(
                async move {
                    HostnameResolver::new(backend.as_ref(), reporter.as_ref(), &deadline, mode)
                        .resolve(&task_hostname)
                        .await
                }
                .instrument(span),
            );
            running.insert(handle.id(), hostname);
        }
        debug!("Spawned {} resolutions using {}.", tasks.len(), self.backend.name());

        let mut outcomes = Vec::with_capacity(hostnames.len());
        while let Some(res) = tasks.join_next_with_id().await {
            match res {
                Ok((_, outcome)) => outcomes.push(outcome),
                // A panicking lookup only fails its own hostname.
                Err(e) => {
                    let hostname = running.remove(&e.id()).unwrap_or_default();
                    let err = Error::from(e);
                    warn!("Resolution task for {} failed: {}", hostname, err);
                    self.reporter.error(&format!(
                        "Failed to resolve: {}: Error - '{}', was not found: {}",
                        hostname,
                        err,
                        err.is_not_found()
                    ));
                    outcomes.push(HostnameOutcome::failed(hostname, err, deadline.elapsed()));
                }
            }
        }

        let summary = BatchSummary {
            hostnames,
            outcomes,
            // Measured from the start of the deadline, so a fired deadline always shows as exceeded.
            total: deadline.elapsed(),
            timeout: deadline.timeout(),
        };
        self.reporter.info(&summary.summary_line());

        Ok(summary)
    }
}
