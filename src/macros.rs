//! Logging macros for key/value fields.
//!
//! Fields are written `key => value` after the message; any value with a
//! `FieldValue` conversion is accepted.
//!
//! # Examples
//!
//! ```
//! use rust_tee_logger::prelude::*;
//! use rust_tee_logger::{error, info, v_info};
//!
//! let log = LogHandle::discard();
//!
//! info!(log, "starting manager");
//! info!(log, "sample", "key" => "value", "replicas" => 3);
//! v_info!(log, 2, "cache miss", "object" => "default/web");
//!
//! let err = LoggerError::other("connection refused");
//! error!(log, err, "unable to start manager", "attempt" => 1);
//! ```

/// Build a `LogContext` from `key => value` pairs.
///
/// ```
/// use rust_tee_logger::fields;
///
/// let ctx = fields!("namespace" => "default", "ready" => true);
/// assert_eq!(ctx.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::LogContext::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut context = $crate::LogContext::new();
        $(context.add_field($key, $value);)+
        context
    }};
}

/// Emit through a `Logger` at an explicit level.
///
/// ```
/// use rust_tee_logger::prelude::*;
/// use rust_tee_logger::log;
///
/// let logger = Logger::discard();
/// log!(logger, LogLevel::WARN, "slow reconcile", "seconds" => 12);
/// log!(logger, LogLevel::verbosity(3), "watch event");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $logger.log($level, $msg, &$crate::fields!($($key => $value),*))
    };
}

/// `info` on a `LogHandle`
#[macro_export]
macro_rules! info {
    ($handle:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $handle.info($msg, &$crate::fields!($($key => $value),*))
    };
}

/// `info` at verbosity `v` on a `LogHandle`
#[macro_export]
macro_rules! v_info {
    ($handle:expr, $v:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $handle.v($v).info($msg, &$crate::fields!($($key => $value),*))
    };
}

/// `error` on a `LogHandle`; the second argument is the error value
#[macro_export]
macro_rules! error {
    ($handle:expr, $err:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $handle.error(&$err, $msg, &$crate::fields!($($key => $value),*))
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogLevel, LoggerError, SharedBuffer};
    use crate::facade::LogHandle;
    use crate::options::{new_raw, Options};

    fn handle(buffer: &SharedBuffer) -> LogHandle {
        LogHandle::new(
            new_raw(Options::new().write_to(buffer.clone()).level(LogLevel::DEBUG)).unwrap(),
        )
    }

    #[test]
    fn test_fields_macro() {
        let empty = fields!();
        assert!(empty.is_empty());

        let ctx = fields!("a" => 1, "b" => "two", "c" => false,);
        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx.fields()[1].0, "b");
    }

    #[test]
    fn test_info_macros() {
        let buffer = SharedBuffer::new();
        let log = handle(&buffer);

        info!(log, "sample", "key" => "value");
        v_info!(log, 1, "debug detail");
        v_info!(log, 2, "too deep");

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""key":"value""#));
        assert!(lines[1].contains(r#""level":"debug""#));
    }

    #[test]
    fn test_error_macro() {
        let buffer = SharedBuffer::new();
        let log = handle(&buffer);
        let err = LoggerError::other("boom");

        error!(log, err, "failed", "retry" => true);

        let line = &buffer.lines()[0];
        assert!(line.contains(r#""error":"boom""#));
        assert!(line.contains(r#""retry":true"#));
    }

    #[test]
    fn test_log_macro() {
        let buffer = SharedBuffer::new();
        let logger = new_raw(Options::new().write_to(buffer.clone())).unwrap();

        log!(logger, LogLevel::WARN, "warned", "n" => 1);
        log!(logger, LogLevel::DEBUG, "dropped");

        assert_eq!(buffer.lines().len(), 1);
    }
}
