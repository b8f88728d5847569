//! Fan-out of one entry to several cores

use crate::core::{CheckedEntry, Core, LogEntry, LogLevel, LoggerError, Result};

/// Forwards every entry to each of its cores.
///
/// Each child decides independently during `check`, so a child with a
/// stricter threshold simply does not register itself.
pub struct Tee {
    cores: Vec<Box<dyn Core>>,
}

impl Tee {
    pub fn new(cores: Vec<Box<dyn Core>>) -> Self {
        Self { cores }
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    pub fn cores(&self) -> &[Box<dyn Core>] {
        &self.cores
    }
}

impl Core for Tee {
    fn enabled(&self, level: LogLevel) -> bool {
        self.cores.iter().any(|core| core.enabled(level))
    }

    fn check<'a>(&'a self, entry: &LogEntry, checked: &mut CheckedEntry<'a>) {
        for core in &self.cores {
            core.check(entry, checked);
        }
    }

    /// Writes to every child; failures are joined into one error
    fn write(&self, entry: &LogEntry) -> Result<()> {
        join_errors(self.cores.iter().map(|core| core.write(entry)))
    }

    fn sync(&self) -> Result<()> {
        join_errors(self.cores.iter().map(|core| core.sync()))
    }

    fn name(&self) -> &str {
        "tee"
    }
}

fn join_errors(results: impl Iterator<Item = Result<()>>) -> Result<()> {
    let messages: Vec<String> = results
        .filter_map(|result| result.err().map(|e| e.to_string()))
        .collect();
    if messages.is_empty() {
        Ok(())
    } else {
        Err(LoggerError::writer(messages.join("; ")))
    }
}
