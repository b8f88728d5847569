//! Process-wide logger slot and context propagation

use crate::core::LogContext;
use crate::facade::LogHandle;
use parking_lot::RwLock;

/// Global logger instance
static LOGGER: RwLock<Option<LogHandle>> = parking_lot::const_rwlock(None);

/// Install the process-wide logger, replacing any previous one.
///
/// Returns the handle that was installed before, if any.
pub fn set_logger(handle: LogHandle) -> Option<LogHandle> {
    LOGGER.write().replace(handle)
}

/// The installed logger, or a discarding handle before installation
pub fn logger() -> LogHandle {
    LOGGER.read().clone().unwrap_or_else(LogHandle::discard)
}

/// Whether [`set_logger`] has been called
pub fn is_installed() -> bool {
    LOGGER.read().is_some()
}

/// Per-operation values handed down a call chain.
///
/// Carries an optional logger; code that only has the context reaches the
/// logger through [`from_context`].
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    logger: Option<LogHandle>,
}

impl OperationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying `handle`
    #[must_use]
    pub fn with_logger(mut self, handle: LogHandle) -> Self {
        self.logger = Some(handle);
        self
    }

    pub fn logger(&self) -> Option<&LogHandle> {
        self.logger.as_ref()
    }
}

/// Logger carried by `ctx`, falling back to the global one
pub fn from_context(ctx: &OperationContext) -> LogHandle {
    ctx.logger.clone().unwrap_or_else(logger)
}

/// [`from_context`] with `fields` attached
pub fn from_context_with(ctx: &OperationContext, fields: &LogContext) -> LogHandle {
    from_context(ctx).with_values(fields)
}
