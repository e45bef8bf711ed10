//! Records of a streamed chat completion, one per chunk.

use serde::Serialize;
use serde_json::Value;

use crate::{
    completion::CompletionUsage,
    literal::FinishReason,
    schema::{Cursor, FromJson, deserialize_via_schema},
};

/// Incremental fragment of a streamed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

impl ChoiceDelta {
    /// The text appended by this chunk.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

impl FromJson for ChoiceDelta {
    const TYPE_NAME: &'static str = "ChoiceDelta";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let map = cx.object(value)?;

        let content = cx.optional(map, "content");

        Some(Self { content: content? })
    }
}

/// One choice inside a streamed chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionChunkChoice {
    delta: ChoiceDelta,
    index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    finish_reason: Option<FinishReason>,
}

impl CompletionChunkChoice {
    /// The fragment carried by this chunk.
    pub fn delta(&self) -> &ChoiceDelta {
        &self.delta
    }

    /// Position of the choice this fragment belongs to.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Why generation stopped; set on the last fragment of a choice.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }
}

impl FromJson for CompletionChunkChoice {
    const TYPE_NAME: &'static str = "CompletionChunkChoice";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let map = cx.object(value)?;

        let delta = cx.required(map, "delta");
        let index = cx.required(map, "index");
        let finish_reason = cx.optional(map, "finish_reason");

        Some(Self {
            delta: delta?,
            index: index?,
            finish_reason: finish_reason?,
        })
    }
}

/// One chunk of a streamed chat completion.
///
/// Every chunk of the same response carries the same `id` and `created`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionChunk {
    id: String,
    object: String,
    created: u64,
    model: String,
    choices: Vec<CompletionChunkChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<CompletionUsage>,
}

impl CompletionChunk {
    /// Identifier shared by every chunk of the response.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Object tag as sent by the service.
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Unix timestamp, in seconds, shared by every chunk of the response.
    pub fn created(&self) -> u64 {
        self.created
    }

    /// The model generating the response.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Choice fragments in service order.
    pub fn choices(&self) -> &[CompletionChunkChoice] {
        &self.choices
    }

    /// Token accounting for the whole request.
    ///
    /// Only set on the last chunk, and only when the caller asked for usage
    /// in the stream.
    pub fn usage(&self) -> Option<&CompletionUsage> {
        self.usage.as_ref()
    }

    /// Whether both chunks belong to the same streamed response.
    pub fn same_response(&self, other: &CompletionChunk) -> bool {
        self.id == other.id && self.created == other.created
    }
}

impl FromJson for CompletionChunk {
    const TYPE_NAME: &'static str = "CompletionChunk";

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

deserialize_via_schema!(ChoiceDelta, CompletionChunkChoice, CompletionChunk);
