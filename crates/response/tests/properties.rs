use indoc::indoc;
use insta::assert_snapshot;
use response::{
    ChatCompletionMessage, Choice, Completion, CompletionChunk, CompletionChunkChoice, FinishReason, FromJson, Literal,
    ParseError, Reason, StreamAssembler,
};
use serde_json::{Value, json};

const COMPLETION: &str = indoc! {r#"
    {
        "id": "as-fmbhnwzsh2",
        "object": "chat.completion",
        "created": 1709716601,
        "result": "legacy field, ignored",
        "model": "ernie-4.0",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "name": "weather_bot",
                    "content_type": "text",
                    "function_call": {
                        "name": "get_current_weather",
                        "parameters": "{\"location\": \"Shanghai\", \"unit\": \"celsius\"}"
                    }
                },
                "finish_reason": "function_call",
                "function_call": {
                    "name": "get_current_weather",
                    "parameters": {"location": "Shanghai", "unit": "celsius"}
                },
                "search_info": {
                    "is_beset": 1,
                    "rewrite_query": "Shanghai weather",
                    "search_results": [
                        {"index": 1, "url": "https://example.com/a", "title": "A", "datasource_id": "ds-1"},
                        {"index": 2, "url": "https://example.com/b", "title": "B", "datasource_id": "ds-1"}
                    ]
                },
                "need_clear_history": false,
                "ban_round": -1,
                "flag": 0,
                "tools_info": {"name": "weather", "arguments": {"city": "Shanghai"}}
            }
        ],
        "usage": {"prompt_tokens": 11, "completion_tokens": 20, "total_tokens": 31}
    }
"#};

#[test]
fn full_completion_round_trips() {
    let completion = Completion::from_json_str(COMPLETION).unwrap();

    let text = serde_json::to_string(&completion).unwrap();
    let reparsed = Completion::from_json_str(&text).unwrap();

    assert_eq!(completion, reparsed);

    let choice = &completion.choices()[0];
    assert_eq!(choice.ban_round(), Some(-1));
    assert_eq!(choice.finish_reason_kind(), Some(FinishReason::FunctionCall));
    assert_eq!(choice.message().content(), None);
    assert_eq!(choice.message().content_type(), Some("text"));
    assert_eq!(choice.message().name(), Some("weather_bot"));

    let results = choice.search_info().and_then(|info| info.search_results()).unwrap();
    let urls: Vec<_> = results.iter().map(|result| result.url()).collect();
    assert_eq!(urls, vec!["https://example.com/a", "https://example.com/b"]);
}

#[test]
fn both_function_call_forms_parse_to_the_same_arguments() {
    let completion = Completion::from_json_str(COMPLETION).unwrap();
    let choice = &completion.choices()[0];

    let from_message: Value = choice.message().function_call().unwrap().parse_parameters().unwrap();
    let from_choice: Value = choice.function_call().unwrap().parse_parameters().unwrap();

    assert_eq!(from_message, from_choice);
    assert_eq!(from_message["unit"], json!("celsius"));
}

#[test]
fn user_role_fails_with_invalid_literal() {
    let error = ChatCompletionMessage::from_value(&json!({"role": "user"})).unwrap_err();
    let kinds: Vec<_> = error.reasons_at("role").map(Reason::kind).collect();

    assert_eq!(kinds, vec!["invalid_literal"]);
}

#[test]
fn completion_without_choices_fails() {
    let mut payload: Value = serde_json::from_str(COMPLETION).unwrap();
    payload.as_object_mut().unwrap().remove("choices");

    let error = Completion::from_value(&payload).unwrap_err();

    assert_snapshot!(error.to_string(), @r#"
    invalid Completion: 1 violation
      choices: missing required field
    "#);
}

#[test]
fn chunk_finish_reason_outside_allowed_set() {
    let error = CompletionChunkChoice::from_value(&json!({
        "index": 0,
        "delta": {"content": ""},
        "finish_reason": "unknown_reason"
    }))
    .unwrap_err();

    let reason = error.reasons_at("finish_reason").next().unwrap();

    match reason {
        Reason::InvalidLiteral { allowed, received } => {
            assert_eq!(received, "unknown_reason");
            assert_eq!(*allowed, FinishReason::ALLOWED);
            assert_eq!(allowed.len(), 6);
        }
        other => unreachable!("expected an invalid literal, got {other:?}"),
    }
}

#[test]
fn chunks_share_identity_but_differ_in_content() {
    let first = CompletionChunk::from_json_str(indoc! {r#"
        {"id": "as-s1", "object": "chat.completion.chunk", "created": 1709716601, "model": "ernie-4.0",
         "choices": [{"index": 0, "delta": {"content": "Sun"}}]}
    "#})
    .unwrap();

    let second = CompletionChunk::from_json_str(indoc! {r#"
        {"id": "as-s1", "object": "chat.completion.chunk", "created": 1709716601, "model": "ernie-4.0",
         "choices": [{"index": 0, "delta": {"content": "ny"}, "finish_reason": "stop"}],
         "usage": {"prompt_tokens": 4, "completion_tokens": 2, "total_tokens": 6}}
    "#})
    .unwrap();

    assert_ne!(first, second);
    assert_eq!(
        (first.id(), first.created(), first.model()),
        (second.id(), second.created(), second.model())
    );

    let completion = StreamAssembler::assemble([first, second]).unwrap();

    assert_eq!(completion.choices()[0].message().content(), Some("Sunny"));
    assert_eq!(completion.usage().map(|usage| usage.total_tokens()), Some(6));
}

#[test]
fn malformed_parameters_pass_through_but_missing_message_fails() {
    let choice = Choice::from_value(&json!({
        "index": 0,
        "message": {"role": "assistant"},
        "function_call": {"name": "lookup", "parameters": "{\"q\": [1, 2"}
    }));

    assert!(choice.is_ok());

    let error = Choice::from_value(&json!({
        "index": 0,
        "function_call": {"name": "lookup", "parameters": "{\"q\": [1, 2"}
    }))
    .unwrap_err();

    let kinds: Vec<_> = error.reasons_at("message").map(Reason::kind).collect();
    assert_eq!(kinds, vec!["missing_required_field"]);
}

#[test]
fn syntax_errors_are_not_validation_errors() {
    let error = Completion::from_json_str("{\"id\": ").unwrap_err();

    assert!(matches!(error, ParseError::Syntax(_)));
}

fn completion_with_nested_tools_info(depth: usize) -> String {
    let tools_info = format!("{}{}", "[".repeat(depth), "]".repeat(depth));

    format!(
        r#"{{"id": "c-1", "object": "chat.completion", "created": 1, "model": "m", "choices": [{{"index": 0, "message": {{"role": "assistant"}}, "tools_info": {tools_info}}}]}}"#
    )
}

#[test]
fn moderately_nested_untyped_fields_are_accepted() {
    let completion = Completion::from_json_str(&completion_with_nested_tools_info(100)).unwrap();

    assert!(completion.choices()[0].tools_info().is_some());
}

#[test]
fn deeply_nested_text_is_rejected_without_overflowing() {
    for depth in [150, 5_000] {
        let text = completion_with_nested_tools_info(depth);

        let error = Completion::from_json_str(&text).unwrap_err();
        assert!(matches!(error, ParseError::Syntax(_)), "depth {depth}: {error}");
        assert!(error.to_string().contains("recursion limit exceeded"));

        let error = Completion::from_json_slice(text.as_bytes()).unwrap_err();
        assert!(matches!(error, ParseError::Syntax(_)), "depth {depth}: {error}");
    }
}

#[test]
fn records_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<Completion>();
    assert_send_sync::<CompletionChunk>();
    assert_send_sync::<StreamAssembler>();
    assert_send_sync::<response::ValidationError>();
}
