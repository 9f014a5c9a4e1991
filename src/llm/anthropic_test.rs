use super::*;

fn make_response(content: serde_json::Value) -> String {
    serde_json::json!({
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "content": content,
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 100, "output_tokens": 50 }
    })
    .to_string()
}

#[test]
fn parse_text_response() {
    let json = make_response(serde_json::json!([
        { "type": "text", "text": "Halo! Ada yang bisa dibantu?" }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert_eq!(resp.text().as_deref(), Some("Halo! Ada yang bisa dibantu?"));
    assert_eq!(resp.model, "claude-sonnet-4-5-20250929");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 100);
    assert_eq!(resp.output_tokens, 50);
}

#[test]
fn parse_unknown_content_filtered() {
    let json = make_response(serde_json::json!([
        { "type": "text", "text": "hi" },
        { "type": "some_future_type", "data": {} }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { .. }));
}

#[test]
fn parse_thinking_blocks_are_filtered() {
    let json = make_response(serde_json::json!([
        { "type": "thinking", "thinking": "Let me think..." },
        { "type": "text", "text": "Here is my answer" }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Here is my answer"));
}

#[test]
fn parse_missing_stop_reason_defaults() {
    let json = serde_json::json!({
        "content": [{ "type": "text", "text": "ok" }],
        "model": "m",
        "usage": { "input_tokens": 1, "output_tokens": 1 }
    })
    .to_string();
    assert_eq!(parse_response(&json).unwrap().stop_reason, "end_turn");
}

#[test]
fn parse_invalid_json() {
    let err = parse_response("not json").unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

#[test]
fn default_request_sends_temperature_without_top_p() {
    let messages = vec![Message::user("hello")];
    let generation = GenerationSettings::default();
    let body = ApiRequest {
        model: "m",
        max_tokens: generation.max_tokens,
        temperature: generation.temperature,
        top_p: generation.top_p,
        top_k: generation.top_k,
        system: "be nice",
        messages: &messages,
    };
    let json = serde_json::to_value(&body).unwrap();
    let obj = json.as_object().unwrap();
    assert!(obj.contains_key("temperature"));
    assert!(!obj.contains_key("top_p"));
    assert!(!obj.contains_key("top_k"));
}

#[test]
fn request_serializes_generation_settings() {
    let messages = vec![Message::user("hello")];
    let body = ApiRequest {
        model: "m",
        max_tokens: 512,
        temperature: 0.5,
        top_p: Some(0.95),
        top_k: Some(40),
        system: "be nice",
        messages: &messages,
    };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["max_tokens"], 512);
    assert_eq!(json["top_k"], 40);
    assert_eq!(json["system"], "be nice");
    assert_eq!(json["messages"][0]["role"], "user");
    assert_eq!(json["messages"][0]["content"], "hello");
}
