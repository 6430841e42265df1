// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use resolve_hostname::app::{self, ExitStatus};

#[tokio::main]
async fn main() {
    let status = match app::run(std::env::args_os()).await {
        Ok(status) => status,
        Err(e) => {
            eprintln!("Failed: {:#}", e);
            ExitStatus::UnrecoverableError
        }
    };

    std::process::exit(status as i32);
}
