use mongodb::error::{Error, ErrorKind, WriteFailure};

/// Server error code for a unique index violation
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// True when a write failed because it violated a unique index
pub fn is_duplicate_key_error(err: &Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_write_errors_are_not_duplicates() {
        let err = Error::custom("boom");
        assert!(!is_duplicate_key_error(&err));
    }
}
