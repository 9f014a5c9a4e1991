use super::*;
use crate::error::ErrorCode;

fn response(content: Vec<ContentBlock>) -> ChatResponse {
    ChatResponse { content, model: "m".into(), stop_reason: "end_turn".into(), input_tokens: 1, output_tokens: 1 }
}

// =============================================================================
// LlmError
// =============================================================================

#[test]
fn error_codes_are_distinct_per_variant() {
    assert_eq!(LlmError::ApiRequest("x".into()).error_code(), "E_API_REQUEST");
    assert_eq!(LlmError::ApiResponse { status: 500, body: String::new() }.error_code(), "E_API_RESPONSE");
    assert_eq!(LlmError::ApiParse("x".into()).error_code(), "E_API_PARSE");
    assert_eq!(LlmError::EmptyResponse.error_code(), "E_EMPTY_RESPONSE");
    assert_eq!(LlmError::ConfigParse("x".into()).error_code(), "E_CONFIG_PARSE");
    assert_eq!(LlmError::HttpClientBuild("x".into()).error_code(), "E_HTTP_CLIENT_BUILD");
}

#[test]
fn retryable_on_transport_and_server_errors() {
    assert!(LlmError::ApiRequest("conn refused".into()).retryable());
    assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(LlmError::ApiResponse { status: 503, body: String::new() }.retryable());
    assert!(!LlmError::ApiResponse { status: 401, body: String::new() }.retryable());
    assert!(!LlmError::ApiParse("bad".into()).retryable());
}

#[test]
fn upstream_message_extracts_nested_error_message() {
    let err = LlmError::ApiResponse {
        status: 401,
        body: r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#.into(),
    };
    assert_eq!(err.upstream_message(), "status 401: invalid x-api-key");
}

#[test]
fn upstream_message_accepts_bare_error_string() {
    let err = LlmError::ApiResponse { status: 400, body: r#"{"error":"bad request"}"#.into() };
    assert_eq!(err.upstream_message(), "status 400: bad request");
}

#[test]
fn upstream_message_falls_back_to_status() {
    let err = LlmError::ApiResponse { status: 502, body: "<html>gateway</html>".into() };
    assert_eq!(err.upstream_message(), "status 502");
}

#[test]
fn upstream_message_for_transport_error_is_display() {
    let err = LlmError::ApiRequest("timed out".into());
    assert_eq!(err.upstream_message(), "API request failed: timed out");
}

// =============================================================================
// ChatResponse::text
// =============================================================================

#[test]
fn text_joins_text_blocks_and_skips_thinking() {
    let resp = response(vec![
        ContentBlock::Thinking { thinking: "hmm".into() },
        ContentBlock::Text { text: "Hello".into() },
        ContentBlock::Text { text: "there".into() },
    ]);
    assert_eq!(resp.text().as_deref(), Some("Hello\nthere"));
}

#[test]
fn text_none_when_only_blank_or_non_text() {
    assert!(response(vec![]).text().is_none());
    assert!(response(vec![ContentBlock::Text { text: "  ".into() }]).text().is_none());
    assert!(response(vec![ContentBlock::Unknown]).text().is_none());
}

#[test]
fn message_constructors_set_roles() {
    assert_eq!(Message::user("a").role, "user");
    assert_eq!(Message::assistant("b").role, "assistant");
}
