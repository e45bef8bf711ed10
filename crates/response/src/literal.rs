//! Fields whose valid values are a small fixed set of exact strings.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{
    error::Reason,
    schema::{Cursor, FromJson},
};

/// A closed set of wire strings, matched exactly.
pub trait Literal: Copy + 'static {
    /// Every variant, in declaration order.
    const VARIANTS: &'static [Self];

    /// The wire strings of [`Literal::VARIANTS`], in the same order.
    const ALLOWED: &'static [&'static str];

    /// The wire string of this variant.
    fn as_str(self) -> &'static str;

    /// Looks up the variant for an exact wire string.
    fn from_wire(s: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|variant| variant.as_str() == s)
    }
}

fn read_literal<L: Literal>(value: &Value, cx: &mut Cursor) -> Option<L> {
    let Value::String(received) = value else {
        cx.mismatch("string", value);
        return None;
    };

    let literal = L::from_wire(received);

    if literal.is_none() {
        cx.report(Reason::InvalidLiteral {
            allowed: L::ALLOWED,
            received: received.clone(),
        });
    }

    literal
}

macro_rules! literal_schema {
    ($($ty:ident),+ $(,)?) => {$(
        impl crate::schema::sealed::Sealed for $ty {}

        impl FromJson for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);

            fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
                read_literal(value, cx)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )+};
}

literal_schema!(Role, CompletionObject, ImageObject, FinishReason);

/// Author of a generated message. Responses only ever carry the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    /// The model.
    #[serde(rename = "assistant")]
    Assistant,
}

impl Literal for Role {
    const VARIANTS: &'static [Self] = &[Self::Assistant];
    const ALLOWED: &'static [&'static str] = &["assistant"];

    fn as_str(self) -> &'static str {
        match self {
            Self::Assistant => "assistant",
        }
    }
}

/// Object tag of a non-streamed chat completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompletionObject {
    /// `chat.completion`
    #[serde(rename = "chat.completion")]
    ChatCompletion,
}

impl Literal for CompletionObject {
    const VARIANTS: &'static [Self] = &[Self::ChatCompletion];
    const ALLOWED: &'static [&'static str] = &["chat.completion"];

    fn as_str(self) -> &'static str {
        match self {
            Self::ChatCompletion => "chat.completion",
        }
    }
}

/// Object tag of a text-to-image response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImageObject {
    /// `image`
    #[serde(rename = "image")]
    Image,
}

impl Literal for ImageObject {
    const VARIANTS: &'static [Self] = &[Self::Image];
    const ALLOWED: &'static [&'static str] = &["image"];

    fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
        }
    }
}

/// The reason the model stopped generating tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Generation ended normally.
    Normal,
    /// A stop sequence or natural stopping point was reached.
    Stop,
    /// The token limit was reached.
    Length,
    /// The model requested tool calls.
    ToolCalls,
    /// Output was withheld by the content filter.
    ContentFilter,
    /// The model requested a function call.
    FunctionCall,
}

impl Literal for FinishReason {
    const VARIANTS: &'static [Self] = &[
        Self::Normal,
        Self::Stop,
        Self::Length,
        Self::ToolCalls,
        Self::ContentFilter,
        Self::FunctionCall,
    ];

    const ALLOWED: &'static [&'static str] = &["normal", "stop", "length", "tool_calls", "content_filter", "function_call"];

    fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ToolCalls => "tool_calls",
            Self::ContentFilter => "content_filter",
            Self::FunctionCall => "function_call",
        }
    }
}
