use crate::parsing::{ParseResult, parse_markdown};

/// Input the engine cannot represent at all. Everything else degrades to a
/// warning.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Input is not valid UTF-8 text (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },
}

/// Checks that raw input is text.
pub fn decode(bytes: &[u8]) -> Result<&str, EngineError> {
    std::str::from_utf8(bytes).map_err(|e| EngineError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })
}

/// Parses raw bytes, rejecting anything that is not UTF-8 text.
pub fn parse_bytes(bytes: &[u8]) -> Result<ParseResult, EngineError> {
    Ok(parse_markdown(decode(bytes)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_input_is_rejected() {
        let err = parse_bytes(b"ok\xff\xfe").unwrap_err();
        assert_eq!(err, EngineError::InvalidUtf8 { valid_up_to: 2 });
        assert_eq!(
            err.to_string(),
            "Input is not valid UTF-8 text (valid up to byte 2)"
        );
    }

    #[test]
    fn text_bytes_parse() {
        let result = parse_bytes("# hi".as_bytes()).unwrap();
        assert_eq!(result.document.children.len(), 1);
    }
}
