// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fmt::Display;
use std::net::IpAddr;

#[cfg(test)]
pub(crate) mod tests;

/// Joins the `Display` representations of `items` with `separator`, without a trailing separator.
pub fn join<T, I>(items: I, separator: &str) -> String
where
    T: Display,
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Renders addresses for humans, e.g., `192.0.2.1, 2001:db8::1`.
pub fn format_addresses(ip_addrs: &[IpAddr]) -> String {
    join(ip_addrs, ", ")
}
