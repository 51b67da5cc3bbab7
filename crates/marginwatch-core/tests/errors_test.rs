use marginwatch_core::errors::*;

#[test]
fn client_errors_are_classified() {
    assert!(MarginWatchError::CardNotFound("x".into()).is_client_error());
    assert!(MarginWatchError::invalid("nope").is_client_error());
    assert!(!MarginWatchError::from(FeedError::Unauthorized).is_client_error());
}

#[test]
fn errors_render_context() {
    let err = MarginWatchError::from(AnalysisError::Timeout { after_secs: 30 });
    assert_eq!(err.to_string(), "analysis error: analysis call timed out after 30s");

    let err = MarginWatchError::from(FeedError::Status {
        status: 503,
        body: "down".into(),
    });
    assert!(err.to_string().contains("503"));
}
