//! Macros for the error handling patterns shared by the command handlers.

/// Write a line or bail out of the enclosing function with [`crate::exit_code::ERROR`].
///
/// ```ignore
/// write_or_exit!(err, "Error: {}", message);
/// ```
#[macro_export]
macro_rules! write_or_exit {
    ($dest:expr, $($arg:tt)*) => {
        if writeln!($dest, $($arg)*).is_err() {
            return $crate::exit_code::ERROR;
        }
    };
}

/// Parse one JSONL line, or report it on `$err` and `continue` the loop.
///
/// ```ignore
/// let line: LogLine = parse_json_or_continue!(text, err, format!("line {}", n));
/// ```
#[macro_export]
macro_rules! parse_json_or_continue {
    ($line:expr, $err:expr, $context:expr) => {
        match serde_json::from_str($line) {
            Ok(r) => r,
            Err(e) => {
                let _ =
                    $crate::ui::write_error($err, &format!("Failed to parse {}: {}", $context, e));
                continue;
            }
        }
    };
}
