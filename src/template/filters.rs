//! Custom filters for sidecar templates
//!
//! - `quote`: Emit a double-quoted, escaped scalar safe to embed in YAML
//! - `required`: Fail if value is undefined, none, or an empty string

use minijinja::{Error, ErrorKind, Value};

/// Quote filter
///
/// Usage: `{{ bpf_expr | quote }}`
pub fn quote(value: &str) -> Result<String, Error> {
    serde_json::to_string(value).map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot quote value: {}", e),
        )
    })
}

/// Required filter - fails if value is missing or blank
///
/// Usage: `{{ image | required }}`
pub fn required(value: Value) -> Result<Value, Error> {
    let blank = value.as_str().is_some_and(|s| s.trim().is_empty());
    if value.is_undefined() || value.is_none() || blank {
        Err(Error::new(
            ErrorKind::UndefinedError,
            "required value is missing or empty",
        ))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote("eth0").unwrap(), "\"eth0\"");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(
            quote(r#"host "a" and port 80"#).unwrap(),
            r#""host \"a\" and port 80""#
        );
    }

    #[test]
    fn test_required_passes_values_through() {
        let value = required(Value::from("sniffer:latest")).unwrap();
        assert_eq!(value.as_str(), Some("sniffer:latest"));
    }

    #[test]
    fn test_required_rejects_missing() {
        assert!(required(Value::UNDEFINED).is_err());
        assert!(required(Value::from(())).is_err());
        assert!(required(Value::from("")).is_err());
        assert!(required(Value::from("   ")).is_err());
    }
}
