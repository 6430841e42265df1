// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

pub mod logging {
    use std::sync::Once;

    use tracing::subscriber::set_global_default;
    use tracing_subscriber::fmt;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::EnvFilter;

    static LOGGING: Once = Once::new();

    pub fn init() {
        LOGGING.call_once(|| {
            let filter = if std::env::var_os("RUST_LOG").is_some() {
                // This is controlled by the env variable RUST_LOG
                EnvFilter::from_default_env()
            } else {
                // If RUST_LOG is not set
                EnvFilter::from(format!("{}=info", env!("CARGO_CRATE_NAME")))
            };

            let fmt = fmt::layer()
                .with_test_writer()
                .with_ansi(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_target(false);

            let registry = tracing_subscriber::registry().with(filter).with(fmt);
            set_global_default(registry).expect("failed to init tracing for testing");
        });
    }
}

pub mod backend {
    use std::collections::HashMap;
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::resolver::{AddressFamilyMode, Backend, Error, ResolverResult};

    /// Scripted backend: answers from fixed tables after a configurable delay and counts every query.
    #[derive(Debug, Default)]
    pub struct StaticBackend {
        forward: HashMap<String, (Duration, ResolverResult<Vec<IpAddr>>)>,
        reverse: HashMap<IpAddr, (Duration, ResolverResult<Vec<String>>)>,
        forward_queries: AtomicUsize,
        reverse_queries: AtomicUsize,
        panic_on: Option<String>,
    }

    impl StaticBackend {
        pub fn new() -> StaticBackend {
            StaticBackend::default()
        }

        pub fn with_forward(mut self, hostname: &str, ip_addrs: &[&str]) -> StaticBackend {
            let ip_addrs = ip_addrs.iter().map(|x| x.parse().unwrap()).collect();
            self.forward.insert(hostname.to_string(), (Duration::ZERO, Ok(ip_addrs)));
            self
        }

        pub fn with_slow_forward(mut self, hostname: &str, delay: Duration, ip_addrs: &[&str]) -> StaticBackend {
            let ip_addrs = ip_addrs.iter().map(|x| x.parse().unwrap()).collect();
            self.forward.insert(hostname.to_string(), (delay, Ok(ip_addrs)));
            self
        }

        pub fn with_forward_error(mut self, hostname: &str, error: Error) -> StaticBackend {
            self.forward.insert(hostname.to_string(), (Duration::ZERO, Err(error)));
            self
        }

        pub fn with_reverse(mut self, ip_addr: &str, names: &[&str]) -> StaticBackend {
            let names = names.iter().map(ToString::to_string).collect();
            self.reverse.insert(ip_addr.parse().unwrap(), (Duration::ZERO, Ok(names)));
            self
        }

        pub fn with_slow_reverse(mut self, ip_addr: &str, delay: Duration, names: &[&str]) -> StaticBackend {
            let names = names.iter().map(ToString::to_string).collect();
            self.reverse.insert(ip_addr.parse().unwrap(), (delay, Ok(names)));
            self
        }

        pub fn with_reverse_error(mut self, ip_addr: &str, error: Error) -> StaticBackend {
            self.reverse.insert(ip_addr.parse().unwrap(), (Duration::ZERO, Err(error)));
            self
        }

        pub fn with_panic_on(mut self, hostname: &str) -> StaticBackend {
            self.panic_on = Some(hostname.to_string());
            self
        }

        pub fn forward_queries(&self) -> usize {
            self.forward_queries.load(Ordering::SeqCst)
        }

        pub fn reverse_queries(&self) -> usize {
            self.reverse_queries.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Backend for StaticBackend {
        async fn forward_lookup(&self, _mode: AddressFamilyMode, hostname: &str) -> ResolverResult<Vec<IpAddr>> {
            self.forward_queries.fetch_add(1, Ordering::SeqCst);
            if self.panic_on.as_deref() == Some(hostname) {
                panic!("scripted panic for {}", hostname);
            }
            let (delay, res) = self
                .forward
                .get(hostname)
                .cloned()
                .unwrap_or_else(|| (Duration::ZERO, Err(Error::dns("no record found", true))));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            res
        }

        async fn reverse_lookup(&self, ip_addr: IpAddr) -> ResolverResult<Vec<String>> {
            self.reverse_queries.fetch_add(1, Ordering::SeqCst);
            let (delay, res) = self
                .reverse
                .get(&ip_addr)
                .cloned()
                .unwrap_or_else(|| (Duration::ZERO, Err(Error::dns("no record found", true))));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            res
        }

        fn name(&self) -> String {
            "static".to_string()
        }
    }
}
