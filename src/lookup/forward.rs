// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use tokio::time::Instant;
use tracing::debug;

use crate::lookup::{HostnameOutcome, ReverseResolver};
use crate::report::Reporter;
use crate::resolver::{AddressFamilyMode, Backend, Deadline};
use crate::utils::format_addresses;

/// Resolves one hostname and then all of its addresses in reverse.
///
/// Failures are reported and returned as part of the outcome, but never propagated -- a failing hostname must not
/// abort its siblings.
pub struct HostnameResolver<'a> {
    backend: &'a dyn Backend,
    reporter: &'a dyn Reporter,
    deadline: &'a Deadline,
    mode: AddressFamilyMode,
}

impl<'a> HostnameResolver<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        reporter: &'a dyn Reporter,
        deadline: &'a Deadline,
        mode: AddressFamilyMode,
    ) -> Self {
        HostnameResolver {
            backend,
            reporter,
            deadline,
            mode,
        }
    }

    pub async fn resolve(&self, hostname: &str) -> HostnameOutcome {
        let start_time = Instant::now();

        debug!("Forward lookup for {} using {} and mode {}.", hostname, self.backend.name(), self.mode);
        let ip_addrs = match self
            .deadline
            .guard(self.backend.forward_lookup(self.mode, hostname))
            .await
        {
            Ok(ip_addrs) => ip_addrs,
            Err(err) => {
                self.reporter.error(&format!(
                    "Failed to resolve: {}: Error - '{}', was not found: {}",
                    hostname,
                    err,
                    err.is_not_found()
                ));
                return HostnameOutcome::failed(hostname.to_string(), err, start_time.elapsed());
            }
        };

        self.reporter
            .info(&format!("IP addresses for {}: {}", hostname, format_addresses(&ip_addrs)));

        let reverse = ReverseResolver::new(self.backend, self.reporter, self.deadline)
            .resolve(hostname, &ip_addrs)
            .await;

        let elapsed = start_time.elapsed();
        self.reporter
            .info(&format!("Duration for resolving {}: {} ms", hostname, elapsed.as_millis()));

        HostnameOutcome {
            hostname: hostname.to_string(),
            ip_addrs: Ok(ip_addrs),
            reverse,
            elapsed,
        }
    }
}
