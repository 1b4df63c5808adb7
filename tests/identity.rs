//! Property tests for structured error identity and the JSON contract.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use msgchain::structured::{is, ErrorCodec, SharedError, StructuredError};

fn wrap(err: anyhow::Error, depth: usize) -> anyhow::Error {
    (0..depth).fold(err, |err, level| err.context(format!("layer {}", level)))
}

fn plain(message: &str) -> SharedError {
    Arc::new(std::io::Error::other(message.to_string()))
}

proptest! {
    #[test]
    fn test_same_code_is_same_error(
        code in "[A-Z_]{1,16}",
        cause_a in ".*",
        cause_b in ".*",
    ) {
        let a = StructuredError::new(cause_a).with_code(code.clone());
        let b = StructuredError::new(cause_b).with_code(code);
        prop_assert!(a.is(&b));
    }

    #[test]
    fn test_different_code_is_different_error(
        code_a in "[A-Z_]{1,16}",
        code_b in "[A-Z_]{1,16}",
        cause in ".*",
    ) {
        prop_assume!(code_a != code_b);
        let a = StructuredError::new(cause.clone()).with_code(code_a);
        let b = StructuredError::new(cause).with_code(code_b);
        prop_assert!(!a.is(&b));
    }

    #[test]
    fn test_is_own_cause_through_wrapping(message in ".*", depth in 0usize..6) {
        let cause = plain(&message);
        let err = wrap(anyhow::Error::new(StructuredError::from_shared(cause.clone())), depth);
        prop_assert!(is(&*err, &*cause));
    }

    #[test]
    fn test_code_identity_with_both_sides_wrapped(
        code in "[a-z_]{1,16}",
        err_depth in 0usize..4,
        target_depth in 0usize..4,
    ) {
        let err = wrap(anyhow::Error::new(StructuredError::new("cause").with_code(code.clone())), err_depth);
        let target = wrap(anyhow::Error::new(StructuredError::identity(code)), target_depth);
        prop_assert!(is(&*err, &*target));
    }

    #[test]
    fn test_uncoded_errors_never_match_by_code(cause_a in ".*", cause_b in ".*") {
        let a = StructuredError::new(cause_a);
        let b = StructuredError::new(cause_b);
        prop_assert!(!a.is(&b));
    }

    #[test]
    fn test_codec_keeps_code_data_and_message(
        message in ".*",
        code in "[A-Z_]{1,16}",
        n in any::<i64>(),
    ) {
        let data = json!({"n": n});
        let err = StructuredError::new(message.clone())
            .with_code(code.clone())
            .with_data(data.clone());

        let decoded = ErrorCodec::decode(&ErrorCodec::encode(&err).unwrap()).unwrap();

        prop_assert_eq!(decoded.code().as_str(), code.as_str());
        prop_assert_eq!(decoded.data(), Some(&data));
        prop_assert_eq!(decoded.cause().map(|c| c.to_string()), Some(message));
    }
}
