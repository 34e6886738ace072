//! JSON output on stdout.

use crate::error::CliError;
use serde::Serialize;
use std::io::Write;

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<(), CliError> {
    let output = serde_json::to_string_pretty(value)?;
    writeln!(writer, "{}", output)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_write_json_pretty_with_newline() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &json!({"call_id": "c-1"})).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "{\n  \"call_id\": \"c-1\"\n}\n");
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let err = write_json(&mut ClosedPipe, &json!([1, 2])).unwrap_err();
        assert!(matches!(err, CliError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn test_encode_failure_is_output_error() {
        let mut keyed = std::collections::HashMap::new();
        keyed.insert((1, 2), "tuple keys are not JSON object keys");
        let mut buffer = Vec::new();
        let err = write_json(&mut buffer, &keyed).unwrap_err();
        assert!(matches!(err, CliError::Output(_)));
        assert!(buffer.is_empty());
    }
}
