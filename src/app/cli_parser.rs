// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! This file is used by the build script. Therefore all functions generating the app command line parser must be included
//! here and must depend on `clap` and `std` only.

use std::ffi::OsString;

use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, Command};

pub static SUPPORTED_IP_TYPES: &[&str] = &["ip", "ip4", "ip6"];

/// Long options that may also be given Go-style with a single dash, e.g., `-dnsserver 8.8.8.8`.
static SINGLE_DASH_LONG_OPTIONS: &[&str] = &[
    "dnsserver",
    "timeout",
    "iptype",
    "dial-timeout",
    "no-color",
    "debug",
    "help",
    "version",
];

pub fn create_parser() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new("dnsserver")
                .long("dnsserver")
                .value_name("IP ADDR")
                .help("Uses this DNS server instead of the system's resolver; only IP addresses allowed")
                .long_help(
                    "Uses this DNS server instead of the system's resolver. Only IPv4 or IPv6 addresses are allowed, \
                     queries are sent via UDP to port 53, e.g., 8.8.8.8 or 2001:4860:4860::8888.",
                ),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("MILLISECONDS")
                .default_value("1000")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i64))
                .help("Sets the deadline for the whole batch in milliseconds"),
        )
        .arg(
            Arg::new("iptype")
                .long("iptype")
                .value_name("TYPE")
                .default_value("ip4")
                .value_parser(PossibleValuesParser::new(SUPPORTED_IP_TYPES.iter().copied()))
                .help("Selects the address family to resolve: ip for both, ip4 for IPv4, ip6 for IPv6"),
        )
        .arg(
            Arg::new("dial-timeout")
                .long("dial-timeout")
                .value_name("MILLISECONDS")
                .default_value("1000")
                .value_parser(value_parser!(u64))
                .help("Sets the timeout of a single query to the DNS server given by --dnsserver"),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .action(ArgAction::SetTrue)
                .help("Disables colorful diagnostic output"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Uses debug formatting for diagnostic logging -- shows targets and span events"),
        )
        .arg(
            Arg::new("v")
                .short('v')
                .action(ArgAction::Count)
                .help("Sets the level of verbosity of diagnostic logging"),
        )
        .arg(
            Arg::new("hostnames")
                .index(1)
                .value_name("HOSTNAME")
                .required(true)
                .num_args(1..)
                .help("Hostnames to resolve"),
        )
}

/// Rewrites Go-style single dash long options to double dash ones; everything after `--` stays untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut options_done = false;
    args.into_iter()
        .map(|arg| {
            let arg: OsString = arg.into();
            if options_done {
                return arg;
            }
            let rewritten = match arg.to_str() {
                Some("--") => {
                    options_done = true;
                    None
                }
                Some(str) => str
                    .strip_prefix('-')
                    .filter(|rest| !rest.starts_with('-') && is_single_dash_long_option(rest))
                    .map(|_| OsString::from(format!("-{}", str))),
                None => None,
            };
            rewritten.unwrap_or(arg)
        })
        .collect()
}

fn is_single_dash_long_option(option: &str) -> bool {
    let name = option.split('=').next().unwrap_or(option);
    SINGLE_DASH_LONG_OPTIONS.contains(&name)
}
