//! Fatal-error reporting helpers.
//!
//! Fatal reports frame the message between separator lines and include a
//! truncated backtrace excerpt so the tail of a session log is readable
//! without a debugger attached.

use std::backtrace::Backtrace;

const SEPARATOR: &str = "****************************************";
const TRACE_FRAMES: usize = 6;

/// Log a fatal report: separator, message, truncated backtrace excerpt.
///
/// Emitted at error level (the highest the `log` facade offers); the
/// backtrace is capped at a handful of frames.
pub fn fatal(message: &str) {
    log::error!("{SEPARATOR}");
    log::error!("* {message}");
    let trace = Backtrace::force_capture().to_string();
    for (index, frame) in trace.lines().take(TRACE_FRAMES).enumerate() {
        let more = if index + 1 == TRACE_FRAMES { "..." } else { "" };
        log::error!("*  at {}{more}", frame.trim());
    }
    log::error!("{SEPARATOR}");
}

/// Best-effort extraction of a panic payload's message.
///
/// Panics carry `&str` or `String` payloads in practice; anything else is
/// reported as opaque.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_str() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
    }

    #[test]
    fn test_panic_message_string() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom".to_owned());
        assert_eq!(panic_message(payload.as_ref()), "boom");
    }

    #[test]
    fn test_panic_message_opaque() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
