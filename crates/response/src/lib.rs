//! Typed, validated records for chat-completion service responses.
//!
//! Every record is built once from an untyped JSON value by [`FromJson`] and is
//! read-only afterwards. Construction either yields a complete instance or a
//! single [`ValidationError`] listing every schema violation in the payload,
//! each located by its [`FieldPath`]. Unknown fields are ignored.
//!
//! ```
//! use response::{Completion, FromJson};
//!
//! let completion = Completion::from_json_str(
//!     r#"{
//!         "id": "as-1",
//!         "object": "chat.completion",
//!         "created": 1680167072,
//!         "model": "ernie-speed",
//!         "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi"}}]
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(completion.choices()[0].message().content(), Some("Hi"));
//! ```

#![deny(missing_docs)]

mod assemble;
mod chunk;
mod completion;
mod error;
mod image;
mod literal;
mod path;
mod schema;

pub use assemble::StreamAssembler;
pub use chunk::{ChoiceDelta, CompletionChunk, CompletionChunkChoice};
pub use completion::{ChatCompletionMessage, Choice, Completion, CompletionUsage, FunctionCall, SearchInfo, SearchResult};
pub use error::{AssembleError, ImageDecodeError, ParametersError, ParseError, Reason, ValidationError, Violation};
pub use image::{ImageData, ImageResponse, ImageUsage};
pub use literal::{CompletionObject, FinishReason, ImageObject, Literal, Role};
pub use path::{FieldPath, Segment};
pub use schema::{Cursor, FromJson};
