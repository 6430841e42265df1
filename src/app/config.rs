// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::convert::TryFrom;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::ArgMatches;

use crate::resolver::{AddressFamilyMode, ResolverOpts};

#[derive(Debug)]
pub struct AppConfig {
    pub hostnames: Vec<String>,
    pub dns_server: Option<String>,
    pub timeout: Duration,
    pub mode: AddressFamilyMode,
    pub dial_timeout: Duration,
    pub verbosity: u8,
    pub color: bool,
    pub debug: bool,
}

impl AppConfig {
    pub fn resolver_opts(&self) -> ResolverOpts {
        ResolverOpts {
            dial_timeout: self.dial_timeout,
            ..Default::default()
        }
    }
}

impl TryFrom<&ArgMatches> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: &ArgMatches) -> std::result::Result<Self, Self::Error> {
        let timeout = args
            .get_one::<i64>("timeout")
            .copied()
            .context("No timeout specified")?;
        if timeout < 0 {
            return Err(anyhow!("Invalid value provided for timeout: {}", timeout));
        }
        let mode = args
            .get_one::<String>("iptype")
            .map(|x| AddressFamilyMode::from_str(x))
            .context("No ip type specified")??;

        let config = AppConfig {
            hostnames: args
                .get_many::<String>("hostnames")
                .context("No hostnames to resolve specified")?
                .cloned()
                .collect(),
            dns_server: args.get_one::<String>("dnsserver").cloned(),
            timeout: Duration::from_millis(timeout as u64),
            mode,
            dial_timeout: args
                .get_one::<u64>("dial-timeout")
                .copied()
                .map(Duration::from_millis)
                .context("No dial timeout specified")?,
            verbosity: args.get_count("v"),
            color: !args.get_flag("no-color"),
            debug: args.get_flag("debug"),
        };

        Ok(config)
    }
}
