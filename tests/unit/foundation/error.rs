use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MergeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(MergeError::decode("x").to_string().contains("decode error:"));
    assert!(
        MergeError::unsupported("x")
            .to_string()
            .contains("unsupported format:")
    );
    assert!(MergeError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn palette_overflow_reports_limit() {
    let err = MergeError::PaletteOverflow { limit: 256 };
    assert_eq!(
        err.to_string(),
        "palette overflow: more than 256 distinct colors"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MergeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
