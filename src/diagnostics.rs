//! Diagnostics accumulation for the whole pipeline.
//!
//! Every stage (lexer, parser, tables, semantic passes) reports through one
//! shared [`Logger`]. Messages are formatted at the call site with `format!`;
//! the logger only counts them and, for the console variant, forwards them to
//! the `log` crate prefixed with the input-file label.

use std::cell::RefCell;
use std::rc::Rc;

/// Where logged messages end up.
#[derive(Debug, Clone)]
enum Sink {
    /// Count only. Used by tests and by embedders that inspect the counters.
    Mock,
    /// Forward to the `log` crate, prefixed with the input label.
    Console { label: String },
}

/// Error/warning accumulator with success predicates.
#[derive(Debug, Clone)]
pub struct Logger {
    errors: usize,
    warnings: usize,
    sink: Sink,
}

impl Logger {
    /// A logger that only counts. Mainly used for testing purposes.
    pub fn mock() -> Logger {
        Logger {
            errors: 0,
            warnings: 0,
            sink: Sink::Mock,
        }
    }

    /// A logger that also prints each message, prefixed with `label`.
    pub fn console(label: impl Into<String>) -> Logger {
        Logger {
            errors: 0,
            warnings: 0,
            sink: Sink::Console {
                label: label.into(),
            },
        }
    }

    /// Reset the counters, e.g. when the lexer is fed fresh input.
    pub fn clear(&mut self) {
        self.errors = 0;
        self.warnings = 0;
    }

    pub fn error(&mut self, msg: impl AsRef<str>) {
        self.errors += 1;
        if let Sink::Console { label } = &self.sink {
            log::error!("{}: {}", label, msg.as_ref());
        }
    }

    pub fn warning(&mut self, msg: impl AsRef<str>) {
        self.warnings += 1;
        if let Sink::Console { label } = &self.sink {
            log::warn!("{}: {}", label, msg.as_ref());
        }
    }

    pub fn info(&mut self, msg: impl AsRef<str>) {
        if let Sink::Console { label } = &self.sink {
            log::info!("{}: {}", label, msg.as_ref());
        }
    }

    pub fn debug(&mut self, msg: impl AsRef<str>) {
        if let Sink::Console { label } = &self.sink {
            log::debug!("{}: {}", label, msg.as_ref());
        }
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// An operation succeeded iff zero errors were logged.
    pub fn success(&self) -> bool {
        self.errors == 0
    }

    /// Perfect success: zero errors and zero warnings.
    pub fn perfect_success(&self) -> bool {
        self.errors == 0 && self.warnings == 0
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::mock()
    }
}

/// The pipeline is single-threaded; all stages share one logger through a
/// cheaply clonable handle.
pub type SharedLogger = Rc<RefCell<Logger>>;

/// Wrap a [`Logger`] into a shareable handle.
pub fn shared(logger: Logger) -> SharedLogger {
    Rc::new(RefCell::new(logger))
}
