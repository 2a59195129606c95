//! Host functions installed into the global frame

use crate::value::{NativeError, NativeFunction, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Every native the interpreter starts with
pub fn builtins() -> Vec<NativeFunction> {
    vec![
        NativeFunction::new("clock", 0, clock),
        NativeFunction::new("sleep", 1, sleep),
    ]
}

/// Seconds since the Unix epoch
fn clock(_args: &[Value]) -> Result<Value, NativeError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| NativeError::ValueError(format!("System clock is before the epoch: {}", e)))?;
    Ok(Value::Number(now.as_secs_f64()))
}

/// Block the thread for the given number of seconds
fn sleep(args: &[Value]) -> Result<Value, NativeError> {
    let seconds = match args.first() {
        Some(Value::Number(n)) => *n,
        Some(other) => {
            return Err(NativeError::TypeError(format!(
                "sleep() requires a number, got {}.",
                other.type_name()
            )))
        }
        None => {
            return Err(NativeError::TypeError(
                "sleep() requires a number.".to_string(),
            ))
        }
    };

    let duration = Duration::try_from_secs_f64(seconds).map_err(|_| {
        NativeError::ValueError(format!(
            "sleep() requires a non-negative duration, got {}.",
            Value::Number(seconds)
        ))
    })?;

    tracing::trace!(seconds, "sleeping");
    std::thread::sleep(duration);
    Ok(Value::Nil)
}
