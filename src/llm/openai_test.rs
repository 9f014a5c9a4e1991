use super::*;

#[test]
fn cc_parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "Hello!" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Hello!"));
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 5);
}

#[test]
fn cc_parse_length_finish_maps_to_max_tokens() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{ "message": { "content": "trunc" }, "finish_reason": "length" }]
    })
    .to_string();
    assert_eq!(parse_chat_completions_response(&json).unwrap().stop_reason, "max_tokens");
}

#[test]
fn cc_parse_null_content_is_empty() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{ "message": { "content": null }, "finish_reason": "stop" }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert!(resp.content.is_empty());
    assert!(resp.text().is_none());
}

#[test]
fn cc_parse_missing_choices() {
    let json = serde_json::json!({ "model": "gpt-4o", "choices": [] }).to_string();
    assert!(matches!(parse_chat_completions_response(&json), Err(LlmError::ApiParse(_))));
}

#[test]
fn system_prompt_leads_message_list() {
    let messages = vec![Message::user("hi"), Message::assistant("hello")];
    let built = build_chat_completions_messages("sys", &messages);
    let roles: Vec<&str> = built.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec!["system", "user", "assistant"]);
    assert_eq!(built[0].content, "sys");
}

#[test]
fn blank_system_prompt_is_omitted() {
    let messages = vec![Message::user("hi")];
    let built = build_chat_completions_messages("  ", &messages);
    assert_eq!(built.len(), 1);
    assert_eq!(built[0].role, "user");
}
