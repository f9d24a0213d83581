use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FractalError::parameter("x")
            .to_string()
            .contains("parameter error:")
    );
    assert!(
        FractalError::format("x")
            .to_string()
            .contains("format error:")
    );
    assert!(
        FractalError::degenerate("x")
            .to_string()
            .contains("degenerate input:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FractalError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn io_errors_convert_with_question_mark() {
    fn read() -> FractalResult<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "short read",
        ))?;
        Ok(())
    }
    let err = read().unwrap_err();
    assert!(matches!(err, FractalError::Io(_)));
    assert!(err.to_string().contains("short read"));
}
