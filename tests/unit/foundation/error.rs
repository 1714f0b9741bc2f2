use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SpriteError::tool_missing("x")
            .to_string()
            .contains("tool missing:")
    );
    assert!(
        SpriteError::probe_failed("x")
            .to_string()
            .contains("probe failed:")
    );
    assert!(
        SpriteError::extraction_failed("x")
            .to_string()
            .contains("extraction failed:")
    );
    assert!(
        SpriteError::no_frames("x")
            .to_string()
            .contains("no frames found:")
    );
    assert!(
        SpriteError::invalid_argument("x")
            .to_string()
            .contains("invalid argument:")
    );
    assert!(
        SpriteError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SpriteError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn stage_failure_names_stage_and_cause() {
    let err = SpriteError::extraction_failed("codec error").in_stage(Stage::Extracting);
    let msg = err.to_string();
    assert!(msg.contains("extracting"));
    assert!(msg.contains("codec error"));
    assert!(matches!(err.root_cause(), SpriteError::ExtractionFailed(_)));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SpriteError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
