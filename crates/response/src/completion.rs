//! Records of a non-streamed chat completion.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    error::ParametersError,
    literal::{CompletionObject, FinishReason, Literal, Role},
    schema::{Cursor, FromJson, deserialize_via_schema},
};

/// A function the model asked the caller to invoke.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    name: String,
    parameters: Value,
}

impl FunctionCall {
    /// The name of the function to call.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The arguments exactly as generated by the model.
    ///
    /// The model does not always produce valid JSON and may invent arguments
    /// outside the function schema. Use [`FunctionCall::parse_parameters`] or
    /// validate this value before acting on it.
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    /// Interprets the parameters as `T`.
    ///
    /// A string value is parsed as JSON text first; any other value is
    /// deserialized directly.
    pub fn parse_parameters<T: DeserializeOwned>(&self) -> Result<T, ParametersError> {
        match &self.parameters {
            Value::Null => Err(ParametersError::Missing {
                name: self.name.clone(),
            }),
            Value::String(text) => {
                let value: Value = serde_json::from_str(text).map_err(|source| ParametersError::Malformed {
                    name: self.name.clone(),
                    source,
                })?;

                self.parameters_into(value)
            }
            value => self.parameters_into(value.clone()),
        }
    }

    fn parameters_into<T: DeserializeOwned>(&self, value: Value) -> Result<T, ParametersError> {
        serde_json::from_value(value).map_err(|source| ParametersError::Shape {
            name: self.name.clone(),
            source,
        })
    }
}

impl FromJson for FunctionCall {
    const TYPE_NAME: &'static str = "FunctionCall";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let map = cx.object(value)?;

        let name = cx.required(map, "name");
        let parameters = cx.optional::<Value>(map, "parameters");

        Some(Self {
            name: name?,
            parameters: parameters?.unwrap_or(Value::Null),
        })
    }
}

/// One entry of the search results a response was grounded on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    index: u32,
    url: String,
    title: String,
    datasource_id: String,
}

impl SearchResult {
    /// Position in the result list.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Address of the source document.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Title of the source document.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Identifier of the data source the result came from.
    pub fn datasource_id(&self) -> &str {
        &self.datasource_id
    }
}

impl FromJson for SearchResult {
    const TYPE_NAME: &'static str = "SearchResult";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let map = cx.object(value)?;

        let index = cx.required(map, "index");
        let url = cx.required(map, "url");
        let title = cx.required(map, "title");
        let datasource_id = cx.required(map, "datasource_id");

        Some(Self {
            index: index?,
            url: url?,
            title: title?,
            datasource_id: datasource_id?,
        })
    }
}

/// Search augmentation attached to a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchInfo {
    // The service spells this field `is_beset` on the wire.
    #[serde(rename = "is_beset", skip_serializing_if = "Option::is_none")]
    is_best: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rewrite_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_results: Option<Vec<SearchResult>>,
}

impl SearchInfo {
    /// Integer flag marking the best search outcome.
    pub fn is_best(&self) -> Option<i64> {
        self.is_best
    }

    /// The query after the service rewrote it for search.
    pub fn rewrite_query(&self) -> Option<&str> {
        self.rewrite_query.as_deref()
    }

    /// Search results in service order.
    pub fn search_results(&self) -> Option<&[SearchResult]> {
        self.search_results.as_deref()
    }
}

impl FromJson for SearchInfo {
    const TYPE_NAME: &'static str = "SearchInfo";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let map = cx.object(value)?;

        let is_best = cx.optional_aliased(map, "is_beset", "is_best");
        let rewrite_query = cx.optional(map, "rewrite_query");
        let search_results = cx.optional(map, "search_results");

        Some(Self {
            is_best: is_best?,
            rewrite_query: rewrite_query?,
            search_results: search_results?,
        })
    }
}

/// A message generated by the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionMessage {
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
}

impl ChatCompletionMessage {
    pub(crate) fn assistant(content: Option<String>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            name: None,
            content_type: None,
            function_call: None,
        }
    }

    /// Author of the message, always the assistant.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Text of the message. Absent on some function-call-only turns.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Optional author name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Media type of the content, when the service reports one.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Function the model wants to call.
    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.function_call.as_ref()
    }
}

impl FromJson for ChatCompletionMessage {
    const TYPE_NAME: &'static str = "ChatCompletionMessage";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let map = cx.object(value)?;

        let role = cx.required(map, "role");
        let content = cx.optional(map, "content");
        let name = cx.optional(map, "name");
        let content_type = cx.optional(map, "content_type");
        let function_call = cx.optional(map, "function_call");

        Some(Self {
            role: role?,
            content: content?,
            name: name?,
            content_type: content_type?,
            function_call: function_call?,
        })
    }
}

/// One candidate completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    index: u32,
    message: ChatCompletionMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_info: Option<SearchInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    need_clear_history: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ban_round: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flag: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools_info: Option<Value>,
}

impl Choice {
    pub(crate) fn assembled(index: u32, content: Option<String>, finish_reason: Option<FinishReason>) -> Self {
        Self {
            index,
            message: ChatCompletionMessage::assistant(content),
            finish_reason: finish_reason.map(|reason| reason.as_str().to_string()),
            function_call: None,
            search_info: None,
            need_clear_history: None,
            ban_round: None,
            flag: None,
            tools_info: None,
        }
    }

    /// Position of this choice in the list of choices.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generated message.
    pub fn message(&self) -> &ChatCompletionMessage {
        &self.message
    }

    /// Why generation stopped, exactly as reported by the service.
    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    /// The finish reason mapped onto the known set.
    ///
    /// Returns `None` when absent or when the service reported a reason
    /// outside the known set.
    pub fn finish_reason_kind(&self) -> Option<FinishReason> {
        let reported = self.finish_reason.as_deref()?;
        let reason = FinishReason::from_wire(reported);

        if reason.is_none() {
            log::debug!("Unknown finish reason in choice {}: {reported}", self.index);
        }

        reason
    }

    /// Function call repeated at choice level for compatibility.
    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.function_call.as_ref()
    }

    /// Search augmentation used for this choice.
    pub fn search_info(&self) -> Option<&SearchInfo> {
        self.search_info.as_ref()
    }

    /// Whether the service asks the caller to clear the conversation history.
    pub fn need_clear_history(&self) -> Option<bool> {
        self.need_clear_history
    }

    /// Round of the conversation that triggered a ban, if any.
    pub fn ban_round(&self) -> Option<i64> {
        self.ban_round
    }

    /// Service-defined status flag.
    pub fn flag(&self) -> Option<i64> {
        self.flag
    }

    /// Tool information, passed through verbatim.
    pub fn tools_info(&self) -> Option<&Value> {
        self.tools_info.as_ref()
    }
}

impl FromJson for Choice {
    const TYPE_NAME: &'static str = "Choice";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let map = cx.object(value)?;

        let index = cx.required(map, "index");
        let message = cx.required(map, "message");
        let finish_reason = cx.optional(map, "finish_reason");
        let function_call = cx.optional(map, "function_call");
        let search_info = cx.optional(map, "search_info");
        let need_clear_history = cx.optional(map, "need_clear_history");
        let ban_round = cx.optional(map, "ban_round");
        let flag = cx.optional(map, "flag");
        let tools_info = cx.optional(map, "tools_info");

        Some(Self {
            index: index?,
            message: message?,
            finish_reason: finish_reason?,
            function_call: function_call?,
            search_info: search_info?,
            need_clear_history: need_clear_history?,
            ban_round: ban_round?,
            flag: flag?,
            tools_info: tools_info?,
        })
    }
}

/// Token accounting for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

impl CompletionUsage {
    /// Number of tokens in the prompt.
    pub fn prompt_tokens(&self) -> u64 {
        self.prompt_tokens
    }

    /// Number of tokens in the generated completion.
    pub fn completion_tokens(&self) -> u64 {
        self.completion_tokens
    }

    /// Total number of tokens billed for the request.
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// Whether the total equals prompt plus completion tokens.
    ///
    /// The service owns this invariant; construction does not enforce it.
    pub fn is_consistent(&self) -> bool {
        self.prompt_tokens.checked_add(self.completion_tokens) == Some(self.total_tokens)
    }
}

impl FromJson for CompletionUsage {
    const TYPE_NAME: &'static str = "CompletionUsage";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let map = cx.object(value)?;

        let prompt_tokens = cx.required(map, "prompt_tokens");
        let completion_tokens = cx.required(map, "completion_tokens");
        let total_tokens = cx.required(map, "total_tokens");

        Some(Self {
            prompt_tokens: prompt_tokens?,
            completion_tokens: completion_tokens?,
            total_tokens: total_tokens?,
        })
    }
}

/// A complete, non-streamed chat completion response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    id: String,
    object: CompletionObject,
    created: u64,
    model: String,
    choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<CompletionUsage>,
}

impl Completion {
    pub(crate) fn assembled(
        id: String,
        created: u64,
        model: String,
        choices: Vec<Choice>,
        usage: Option<CompletionUsage>,
    ) -> Self {
        Self {
            id,
            object: CompletionObject::ChatCompletion,
            created,
            model,
            choices,
            usage,
        }
    }

    /// Unique identifier of the response.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Object tag, always `chat.completion`.
    pub fn object(&self) -> CompletionObject {
        self.object
    }

    /// Unix timestamp, in seconds, of when the response was created.
    pub fn created(&self) -> u64 {
        self.created
    }

    /// The model that produced the response.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Candidate completions in service order.
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Token accounting, when the service reported it.
    pub fn usage(&self) -> Option<&CompletionUsage> {
        self.usage.as_ref()
    }
}

impl FromJson for Completion {
    const TYPE_NAME: &'static str = "Completion";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let map = cx.object(value)?;

        let id = cx.required(map, "id");
        let object = cx.required(map, "object");
        let created = cx.required(map, "created");
        let model = cx.required(map, "model");
        let choices = cx.required(map, "choices");
        let usage = cx.optional(map, "usage");

        Some(Self {
            id: id?,
            object: object?,
            created: created?,
            model: model?,
            choices: choices?,
            usage: usage?,
        })
    }
}

deserialize_via_schema!(
    FunctionCall,
    SearchResult,
    SearchInfo,
    ChatCompletionMessage,
    Choice,
    CompletionUsage,
    Completion,
);
