// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::resolver::{Error, ResolverResult};

/// Deadline shared by all lookups of one batch.
///
/// Clones are cheap and observe the same instant and the same cancellation token. Every suspending lookup is run
/// through [`Deadline::guard`], so an elapsed deadline or a cancelled token stops it cooperatively.
#[derive(Debug, Clone)]
pub struct Deadline {
    started: Instant,
    at: Instant,
    timeout: Duration,
    token: CancellationToken,
}

impl Deadline {
    /// Starts a deadline that elapses `timeout` from now.
    pub fn after(timeout: Duration) -> Deadline {
        Deadline::with_token(timeout, CancellationToken::new())
    }

    /// Like `after`, but cancellation can also be triggered through `token`, e.g., by a signal handler.
    pub fn with_token(timeout: Duration, token: CancellationToken) -> Deadline {
        let started = Instant::now();
        Deadline {
            started,
            at: started + timeout,
            timeout,
            token,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn instant(&self) -> Instant {
        self.at
    }

    /// Time passed since the deadline has been started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_elapsed(&self) -> bool {
        Instant::now() >= self.at
    }

    pub fn cancel(&self) {
        self.token.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Runs `fut` until it completes, the deadline elapses, or the batch is cancelled -- whatever comes first.
    pub async fn guard<T, F>(&self, fut: F) -> ResolverResult<T>
    where
        F: Future<Output = ResolverResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                trace!("Lookup cancelled.");
                Err(Error::Cancelled)
            }
            _ = time::sleep_until(self.at) => {
                trace!("Lookup hit deadline.");
                Err(Error::DeadlineExceeded)
            }
            res = fut => res,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use spectral::prelude::*;

    #[tokio::test(start_paused = true)]
    async fn completes_before_deadline() {
        let deadline = Deadline::after(Duration::from_millis(100));

        let res = deadline
            .guard(async {
                time::sleep(Duration::from_millis(10)).await;
                Ok(42)
            })
            .await;

        asserting("fast future completes").that(&res).is_ok().is_equal_to(42);
    }

    #[tokio::test(start_paused = true)]
    async fn exceeds_deadline() {
        let deadline = Deadline::after(Duration::from_millis(100));

        let res: ResolverResult<()> = deadline
            .guard(async {
                time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;

        asserting("slow future hits deadline")
            .that(&res)
            .is_err()
            .is_equal_to(Error::DeadlineExceeded);
        asserting("deadline is elapsed").that(&deadline.is_elapsed()).is_true();
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_by_token() {
        let deadline = Deadline::after(Duration::from_secs(10));
        let clone = deadline.clone();
        clone.cancel();

        let res: ResolverResult<()> = deadline
            .guard(async {
                time::sleep(Duration::from_secs(1)).await;
                Ok(())
            })
            .await;

        asserting("cancellation is shared by clones")
            .that(&res)
            .is_err()
            .is_equal_to(Error::Cancelled);
    }
}
