// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Reports are the user facing results of a batch: one line per finding, info lines to stdout and error lines to
//! stderr. Diagnostics of the library itself go through `tracing` and are unrelated.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Local;

static TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

impl Level {
    fn prefix(&self) -> &'static str {
        match self {
            Level::Info => "INFO: ",
            Level::Error => "ERROR: ",
        }
    }
}

/// Sink for reports; shared by all concurrently running lookups, so every call must produce exactly one complete line.
pub trait Reporter: Send + Sync {
    fn info(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Formats a report line like `2021-03-04 17:02:11.042 INFO: msg`.
pub fn format_line(level: Level, msg: &str) -> String {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT);
    format!("{} {}{}\n", timestamp, level.prefix(), msg)
}

#[derive(Debug, Default)]
pub struct ConsoleReporter {}

impl ConsoleReporter {
    pub fn new() -> ConsoleReporter {
        ConsoleReporter {}
    }

    fn write<W: Write>(mut writer: W, level: Level, msg: &str) {
        let line = format_line(level, msg);
        // There's nobody left to report a failed write to.
        let _ = writer.write_all(line.as_bytes()).and_then(|_| writer.flush());
    }
}

impl Reporter for ConsoleReporter {
    fn info(&self, msg: &str) {
        ConsoleReporter::write(io::stdout().lock(), Level::Info, msg)
    }

    fn error(&self, msg: &str) {
        ConsoleReporter::write(io::stderr().lock(), Level::Error, msg)
    }
}

/// Keeps reports in memory in the order they have been made.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> MemoryReporter {
        MemoryReporter::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.lock().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.by_level(Level::Info)
    }

    pub fn errors(&self) -> Vec<String> {
        self.by_level(Level::Error)
    }

    fn by_level(&self, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    fn push(&self, level: Level, msg: &str) {
        self.lock().push((level, msg.to_string()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Level, String)>> {
        // A poisoned lock only means another reporting thread panicked; the entries are still intact.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, msg: &str) {
        self.push(Level::Info, msg)
    }

    fn error(&self, msg: &str) {
        self.push(Level::Error, msg)
    }
}
