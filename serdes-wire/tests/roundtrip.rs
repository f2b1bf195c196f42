//! End-to-end behaviour of the codec across all three vendor formats.

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value as JsonValue};
use serdes_wire::prelude::*;

fn options() -> CodecOptions {
    CodecOptions::new().id_generator(IdGenerator::sequential("t"))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("serdes_wire=debug")
        .with_test_writer()
        .try_init();
}

#[rstest]
#[case::openai_text("openai", json!({"role": "user", "content": "What's the weather?"}))]
#[case::openai_developer("openai", json!({"role": "developer", "content": "Be terse."}))]
#[case::openai_calls("openai", json!({
    "role": "assistant",
    "content": "Checking.",
    "tool_calls": [
        {"id": "call_a", "type": "function", "function": {"name": "weather", "arguments": "{\"city\":\"Paris\"}"}},
        {"id": "call_b", "type": "function", "function": {"name": "time", "arguments": "{}"}}
    ]
}))]
#[case::openai_tool("openai", json!({"role": "tool", "tool_call_id": "call_a", "content": "18C"}))]
#[case::openai_image("openai", json!({"role": "user", "content": [
    {"type": "text", "text": "What is this?"},
    {"type": "image_url", "image_url": {"url": "https://example.com/cat.png"}}
]}))]
#[case::anthropic_text("anthropic", json!({"role": "user", "content": "Hello"}))]
#[case::anthropic_tool_use("anthropic", json!({"role": "assistant", "content": [
    {"type": "text", "text": "Let me look."},
    {"type": "tool_use", "id": "toolu_1", "name": "search", "input": {"q": "rust"}},
    {"type": "tool_use", "id": "toolu_2", "name": "search", "input": {"q": "serde"}}
]}))]
#[case::anthropic_results("anthropic", json!({"role": "user", "content": [
    {"type": "tool_result", "tool_use_id": "toolu_1", "content": "found 3"},
    {"type": "tool_result", "tool_use_id": "toolu_2", "content": "boom", "is_error": true}
]}))]
#[case::google_text("google", json!({"role": "user", "parts": [{"text": "Hi"}]}))]
#[case::google_calls("google", json!({"role": "model", "parts": [
    {"text": "Looking."},
    {"functionCall": {"name": "weather", "args": {"city": "Rome"}}}
]}))]
#[case::google_response("google", json!({"role": "function", "parts": [
    {"functionResponse": {"name": "weather", "response": {"temp": 21}}}
]}))]
#[case::openai_files("openai", json!({"role": "user", "content": [
    {"type": "file", "file": {"file_data": "data:application/pdf;base64,QQ==", "filename": "a.pdf"}},
    {"type": "file", "file": {"file_data": "data:application/pdf;base64,Qg==", "filename": "b.pdf"}}
]}))]
#[case::openai_empty_tool_calls("openai", json!({"role": "assistant", "content": "hi", "tool_calls": []}))]
#[case::anthropic_text_around_call("anthropic", json!({"role": "assistant", "content": [
    {"type": "text", "text": "a"},
    {"type": "tool_use", "id": "toolu_1", "name": "f", "input": {}},
    {"type": "text", "text": "b"}
]}))]
#[case::anthropic_text_before_result("anthropic", json!({"role": "user", "content": [
    {"type": "text", "text": "here"},
    {"type": "tool_result", "tool_use_id": "toolu_1", "content": "ok"}
]}))]
#[case::google_call_before_text("google", json!({"role": "model", "parts": [
    {"functionCall": {"name": "f", "args": {}}},
    {"text": "done"}
]}))]
fn round_trip_law(#[case] provider: &str, #[case] raw: JsonValue) {
    init_tracing();
    let codec = Codec::new();
    let messages = codec.to_internal(&raw, Some(provider), &options()).unwrap();
    let outcome = codec.from_internal(&messages, provider, &options()).unwrap();
    assert!(outcome.is_complete());
    assert_eq!(outcome.messages, vec![raw]);
}

#[rstest]
#[case::anthropic("anthropic", json!({"role": "assistant", "content": [
    {"type": "text", "text": "Two calls."},
    {"type": "tool_use", "id": "toolu_1", "name": "a", "input": {}},
    {"type": "tool_use", "id": "toolu_2", "name": "b", "input": {"x": 1}}
]}))]
#[case::openai("openai", json!({"role": "assistant", "content": "Two calls.", "tool_calls": [
    {"id": "call_1", "type": "function", "function": {"name": "a", "arguments": "{}"}},
    {"id": "call_2", "type": "function", "function": {"name": "b", "arguments": "{\"x\":1}"}}
]}))]
#[case::google("google", json!({"role": "model", "parts": [
    {"text": "Two calls."},
    {"functionCall": {"id": "fc_1", "name": "a", "args": {}}},
    {"functionCall": {"id": "fc_2", "name": "b", "args": {"x": 1}}}
]}))]
fn group_reconstruction(#[case] provider: &str, #[case] raw: JsonValue) {
    let codec = Codec::new();
    let messages = codec.to_internal(&raw, None, &options()).unwrap();

    assert_eq!(messages.len(), 3);
    let groups: Vec<&GroupInfo> = messages.iter().filter_map(InternalMessage::group).collect();
    assert_eq!(groups.len(), 3);
    assert!(groups.iter().all(|g| g.id == groups[0].id && g.total == 3));
    let positions: Vec<usize> = groups.iter().map(|g| g.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);

    // Member order in the input does not matter.
    let shuffled = vec![messages[2].clone(), messages[0].clone(), messages[1].clone()];
    let outcome = codec.from_internal(&shuffled, provider, &options()).unwrap();
    assert_eq!(outcome.messages, vec![raw]);
}

#[test]
fn tool_result_batching() {
    let messages = vec![
        InternalMessage::tool_result("call_1", "sunny").with_name("weather"),
        InternalMessage::tool_result("call_2", "noon").with_name("time"),
    ];
    let codec = Codec::new();

    let openai = codec.from_internal(&messages, "openai", &options()).unwrap();
    assert_eq!(
        openai.messages,
        vec![
            json!({"role": "tool", "tool_call_id": "call_1", "content": "sunny", "name": "weather"}),
            json!({"role": "tool", "tool_call_id": "call_2", "content": "noon", "name": "time"}),
        ]
    );

    let anthropic = codec.from_internal(&messages, "anthropic", &options()).unwrap();
    assert_eq!(anthropic.messages.len(), 1);
    assert_eq!(anthropic.messages[0]["content"].as_array().map(Vec::len), Some(2));

    let google = codec.from_internal(&messages, "google", &options()).unwrap();
    assert_eq!(google.messages.len(), 1);
    assert_eq!(google.messages[0]["parts"].as_array().map(Vec::len), Some(2));
}

#[rstest]
#[case("openai")]
#[case("anthropic")]
#[case("google")]
fn lenient_partial_failure(#[case] provider: &str) {
    init_tracing();
    let invalid = InternalMessage {
        function_call: Some(FunctionCall::new("broken", "{not json")),
        ..InternalMessage::new(Role::Assistant, vec![])
    };
    let messages = vec![InternalMessage::user("one"), invalid, InternalMessage::user("two")];
    let codec = Codec::new();

    let err = codec.from_internal(&messages, provider, &options()).unwrap_err();
    assert!(err.is_conversion());

    let outcome = codec
        .from_internal(&messages, provider, &options().strict(false))
        .unwrap();
    assert_eq!(outcome.messages.len(), 2);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].index, 1);
}

#[rstest]
#[case(json!({"role": "user", "content": [{"type": "text", "text": "Hello"}]}))]
#[case(json!({"role": "assistant", "content": [{"type": "document", "mediaType": "application/pdf", "source": {"type": "url", "url": "https://x/a.pdf"}}]}))]
#[case(json!({"role": "user", "content": "Hello"}))]
#[case(json!({"role": "model", "parts": [{"text": "Hi"}]}))]
#[case(json!({"role": "assistant", "content": [{"type": "tool_use", "id": "t", "name": "f", "input": {}}]}))]
fn needs_conversion_matches_passthrough(#[case] raw: JsonValue) {
    let options = CodecOptions::new().validate(false);
    let decoded = serdes_wire::to_internal(&raw, None, &options).unwrap();
    let passthrough = decoded.len() == 1 && serde_json::to_value(&decoded[0]).unwrap() == raw;
    assert_eq!(serdes_wire::needs_conversion(&raw), !passthrough);
}

#[test]
fn unknown_format_fallback() {
    let raw = json!({"role": "assistant", "content": "Hello"});
    assert_eq!(detect(&raw).provider_tag(), "unknown");
    let messages = serdes_wire::to_internal(&raw, None, &options()).unwrap();
    assert_eq!(messages, vec![InternalMessage::assistant("Hello")]);
}

#[rstest]
#[case(json!({"role": "user", "content": [{"type": "text", "text": "Hello"}]}), "anthropic", 0.95)]
#[case(json!({"role": "model", "text": "Hi"}), "google", 0.95)]
#[case(json!({"role": "tool-response", "content": "Result"}), "openai", 0.8)]
#[case(json!({}), "unknown", 0.0)]
fn detection_table(#[case] raw: JsonValue, #[case] provider: &str, #[case] confidence: f64) {
    let detection = serdes_wire::detect(&raw);
    assert_eq!(detection.provider_tag(), provider);
    assert_eq!(detection.confidence, confidence);
    assert!(!detection.reason.is_empty());
}

#[test]
fn translate_conversation() {
    let raws = vec![
        json!({"role": "user", "parts": [{"text": "Weather in Oslo?"}]}),
        json!({"role": "model", "parts": [{"functionCall": {"id": "fc_1", "name": "weather", "args": {"city": "Oslo"}}}]}),
        json!({"role": "function", "parts": [{"functionResponse": {"id": "fc_1", "name": "weather", "response": {"temp": -3}}}]}),
        json!({"role": "model", "parts": [{"text": "It is -3C."}]}),
    ];
    let outcome = Codec::new()
        .translate(&raws, Some("gemini"), "openai", &options())
        .unwrap();
    assert_eq!(
        outcome.messages,
        vec![
            json!({"role": "user", "content": "Weather in Oslo?"}),
            json!({"role": "assistant", "content": null, "tool_calls": [
                {"id": "fc_1", "type": "function", "function": {"name": "weather", "arguments": "{\"city\":\"Oslo\"}"}}
            ]}),
            json!({"role": "tool", "tool_call_id": "fc_1", "content": "{\"temp\":-3}", "name": "weather"}),
            json!({"role": "assistant", "content": "It is -3C."}),
        ]
    );
}

#[test]
fn system_messages_move_to_native_slot() {
    let messages = vec![
        InternalMessage::system("Be brief."),
        InternalMessage::system("Answer in English."),
        InternalMessage::user("Hi"),
    ];
    let codec = Codec::new();

    let anthropic = codec.from_internal(&messages, "claude", &options()).unwrap();
    assert_eq!(anthropic.system, Some(json!("Be brief.\n\nAnswer in English.")));
    assert_eq!(anthropic.messages.len(), 1);

    let openai = codec.from_internal(&messages, "openai", &options()).unwrap();
    assert_eq!(openai.system, None);
    assert_eq!(openai.messages.len(), 3);
}

#[test]
fn text_and_tool_call_views() {
    let raw = json!({"role": "assistant", "content": [
        {"type": "text", "text": "First."},
        {"type": "tool_use", "id": "toolu_9", "name": "f", "input": {}},
        {"type": "text", "text": "Second."}
    ]});
    assert_eq!(serdes_wire::extract_text_content(&raw), "First.\nSecond.");
    assert_eq!(serdes_wire::count_tool_calls(&raw), 1);
}
