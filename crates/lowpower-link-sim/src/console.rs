use log::debug;
use lowpower_link::config::ConsoleConfig;
use lowpower_link::hal::CharacterOutput;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Character-output stream captured into a shared line buffer.
///
/// Clones share the buffer, so a test or the runner can watch what the
/// board prints while the node thread owns the board.
#[derive(Debug, Clone, Default)]
pub struct SimConsole {
    name: &'static str,
    config: Option<ConsoleConfig>,
    lines: Arc<Mutex<Vec<String>>>,
}

impl SimConsole {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn config(&self) -> Option<ConsoleConfig> {
        self.config
    }

    pub fn lines(&self) -> Vec<String> {
        self.guard().clone()
    }

    /// Number of lines starting with `prefix`.
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.guard().iter().filter(|l| l.starts_with(prefix)).count()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CharacterOutput for SimConsole {
    fn configure_console(&mut self, config: &ConsoleConfig) {
        debug!("[{}] console at {} baud", self.name, config.baud_rate);
        self.config = Some(*config);
    }

    fn write_line(&mut self, line: fmt::Arguments<'_>) {
        let line = line.to_string();
        debug!("[{}] {}", self.name, line);
        self.guard().push(line);
    }
}
