//! Panic hook integration.

use crate::logger::ErrorLogger;
use crate::sink::Sink;
use errlog_common::ThrowableRecord;
use std::sync::{Mutex, TryLockError};
use tracing::warn;

/// Report every panic through `logger`, then run the previously installed
/// hook.
///
/// A panic raised while a report is being written is not reported again.
pub fn install_panic_hook<S>(logger: ErrorLogger<S>)
where
    S: Sink + Send + 'static,
{
    let logger = Mutex::new(logger);
    let previous = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        let record = ThrowableRecord::from_panic(info);
        match logger.try_lock() {
            Ok(mut logger) => logger.log_error(&record),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().log_error(&record),
            Err(TryLockError::WouldBlock) => {
                warn!(message = %record.message, "panic while writing an error report, not reported");
            }
        }
        previous(info);
    }));
}
