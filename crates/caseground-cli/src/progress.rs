//! Progress reporting for long-running commands

use std::io::{self, Write};

/// Single-line progress reporter on stderr
pub struct ProgressReporter {
    total: usize,
}

impl ProgressReporter {
    pub fn new(total: usize) -> Self {
        Self { total }
    }

    pub fn update(&self, processed: usize, msg: &str) {
        eprint!("\r[{}/{}] {:<50}", processed, self.total, msg);
        io::stderr().flush().ok();
    }

    pub fn finish(&self) {
        eprintln!();
    }
}
