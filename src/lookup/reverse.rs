// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::net::IpAddr;

use tracing::{debug, trace};

use crate::lookup::{is_sentinel, ReverseOutcome, ReverseResult, SENTINEL_BLOCKED_ADDR};
use crate::report::Reporter;
use crate::resolver::{Backend, Deadline};

/// Looks up the names of all forward resolved addresses of one hostname, one after the other.
pub struct ReverseResolver<'a> {
    backend: &'a dyn Backend,
    reporter: &'a dyn Reporter,
    deadline: &'a Deadline,
}

impl<'a> ReverseResolver<'a> {
    pub fn new(backend: &'a dyn Backend, reporter: &'a dyn Reporter, deadline: &'a Deadline) -> Self {
        ReverseResolver {
            backend,
            reporter,
            deadline,
        }
    }

    /// Every address except the sentinel gets its own attempt; a failure never stops the remaining addresses.
    pub async fn resolve(&self, hostname: &str, ip_addrs: &[IpAddr]) -> Vec<ReverseOutcome> {
        let mut outcomes = Vec::with_capacity(ip_addrs.len());

        for ip_addr in ip_addrs {
            let result = if is_sentinel(ip_addr) {
                self.report_skipped(hostname, ip_addr, ip_addrs.len());
                ReverseResult::Skipped
            } else {
                self.lookup(hostname, *ip_addr).await
            };
            outcomes.push(ReverseOutcome {
                ip_addr: *ip_addr,
                result,
            });
        }

        outcomes
    }

    async fn lookup(&self, hostname: &str, ip_addr: IpAddr) -> ReverseResult {
        trace!("Reverse lookup for {} ({}).", ip_addr, hostname);
        match self.deadline.guard(self.backend.reverse_lookup(ip_addr)).await {
            Ok(names) => {
                self.reporter
                    .info(&format!("Reverse for {} ({}): {}", ip_addr, hostname, names.join(", ")));
                ReverseResult::Names(names)
            }
            Err(err) => {
                self.reporter.error(&format!(
                    "Error performing reverse lookup for {} ({}): Error - '{}', was not found: {}",
                    ip_addr,
                    hostname,
                    err,
                    err.is_not_found()
                ));
                ReverseResult::Failed(err)
            }
        }
    }

    fn report_skipped(&self, hostname: &str, ip_addr: &IpAddr, total: usize) {
        debug!("Skipping reverse lookup of sentinel address {} for {}.", ip_addr, hostname);
        let msg = if total == 1 {
            format!(
                "Ignoring attempt to resolve reverse for {} as it previously resolved to {}",
                hostname, SENTINEL_BLOCKED_ADDR
            )
        } else {
            format!(
                "Ignoring {} among {} addresses for {}: previously resolved to {}",
                ip_addr, total, hostname, SENTINEL_BLOCKED_ADDR
            )
        };
        self.reporter.info(&msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use spectral::prelude::*;
    use std::time::Duration;

    use crate::report::MemoryReporter;
    use crate::resolver::Error;
    use crate::utils::tests::backend::StaticBackend;
    use crate::utils::tests::logging;

    fn ip(str: &str) -> IpAddr {
        str.parse().unwrap()
    }

    #[tokio::test]
    async fn sole_sentinel_is_ignored() {
        logging::init();
        let backend = StaticBackend::new();
        let reporter = MemoryReporter::new();
        let deadline = Deadline::after(Duration::from_secs(1));

        let outcomes = ReverseResolver::new(&backend, &reporter, &deadline)
            .resolve("blocked.example.com", &[ip("0.0.0.0")])
            .await;

        asserting("no reverse lookup issued").that(&backend.reverse_queries()).is_equal_to(0);
        asserting("no error reported").that(&reporter.errors()).is_empty();
        asserting("ignored message reported").that(&reporter.infos()).is_equal_to(vec![
            "Ignoring attempt to resolve reverse for blocked.example.com as it previously resolved to 0.0.0.0"
                .to_string(),
        ]);
        asserting("sentinel is skipped")
            .that(&outcomes)
            .is_equal_to(vec![ReverseOutcome {
                ip_addr: ip("0.0.0.0"),
                result: ReverseResult::Skipped,
            }]);
    }

    #[tokio::test]
    async fn sentinel_among_others_is_ignored() {
        logging::init();
        let backend = StaticBackend::new().with_reverse("192.0.2.1", &["host.example.com."]);
        let reporter = MemoryReporter::new();
        let deadline = Deadline::after(Duration::from_secs(1));

        let outcomes = ReverseResolver::new(&backend, &reporter, &deadline)
            .resolve("example.com", &[ip("0.0.0.0"), ip("192.0.2.1")])
            .await;

        asserting("only the non sentinel address is looked up")
            .that(&backend.reverse_queries())
            .is_equal_to(1);
        asserting("no error reported").that(&reporter.errors()).is_empty();
        asserting("skip and reverse reported").that(&reporter.infos()).is_equal_to(vec![
            "Ignoring 0.0.0.0 among 2 addresses for example.com: previously resolved to 0.0.0.0".to_string(),
            "Reverse for 192.0.2.1 (example.com): host.example.com.".to_string(),
        ]);
        asserting("outcomes keep input order")
            .that(&outcomes.iter().map(|x| x.ip_addr).collect::<Vec<_>>())
            .is_equal_to(vec![ip("0.0.0.0"), ip("192.0.2.1")]);
    }

    #[tokio::test]
    async fn failure_does_not_stop_remaining_addresses() {
        logging::init();
        let backend = StaticBackend::new()
            .with_reverse_error("192.0.2.1", Error::dns("no record found", true))
            .with_reverse("192.0.2.2", &["a.example.com.", "b.example.com."]);
        let reporter = MemoryReporter::new();
        let deadline = Deadline::after(Duration::from_secs(1));

        let outcomes = ReverseResolver::new(&backend, &reporter, &deadline)
            .resolve("example.com", &[ip("192.0.2.1"), ip("192.0.2.2")])
            .await;

        asserting("both addresses are looked up").that(&backend.reverse_queries()).is_equal_to(2);
        asserting("failure reported with classification")
            .that(&reporter.errors())
            .is_equal_to(vec![
                "Error performing reverse lookup for 192.0.2.1 (example.com): Error - 'no record found', was not found: true"
                    .to_string(),
            ]);
        asserting("names are joined")
            .that(&reporter.infos())
            .is_equal_to(vec!["Reverse for 192.0.2.2 (example.com): a.example.com., b.example.com.".to_string()]);
        asserting("second lookup succeeded")
            .that(&outcomes[1].result)
            .is_equal_to(ReverseResult::Names(vec![
                "a.example.com.".to_string(),
                "b.example.com.".to_string(),
            ]));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fails_every_remaining_attempt() {
        logging::init();
        let backend = StaticBackend::new()
            .with_slow_reverse("192.0.2.1", Duration::from_secs(5), &["a.example.com."])
            .with_reverse("192.0.2.2", &["b.example.com."]);
        let reporter = MemoryReporter::new();
        let deadline = Deadline::after(Duration::from_millis(100));

        let outcomes = ReverseResolver::new(&backend, &reporter, &deadline)
            .resolve("example.com", &[ip("192.0.2.1"), ip("192.0.2.2")])
            .await;

        asserting("both attempts are reported as errors")
            .that(&reporter.errors())
            .has_length(2);
        asserting("both attempts hit the deadline")
            .that(&outcomes.iter().map(|x| x.result.clone()).collect::<Vec<_>>())
            .is_equal_to(vec![
                ReverseResult::Failed(Error::DeadlineExceeded),
                ReverseResult::Failed(Error::DeadlineExceeded),
            ]);
    }
}
