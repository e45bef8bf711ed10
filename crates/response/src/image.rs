//! Records of a text-to-image response.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::ImageDecodeError,
    literal::ImageObject,
    schema::{Cursor, FromJson, deserialize_via_schema},
};

/// One generated image, base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageData {
    #[serde(skip_serializing_if = "Option::is_none")]
    object: Option<String>,
    b64_image: String,
    index: u32,
}

impl ImageData {
    /// Object tag of the entry as sent by the service.
    pub fn object(&self) -> Option<&str> {
        self.object.as_deref()
    }

    /// The encoded image.
    pub fn b64_image(&self) -> &str {
        &self.b64_image
    }

    /// Position of the image in the response.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Decodes the image bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ImageDecodeError> {
        STANDARD.decode(&self.b64_image).map_err(|source| ImageDecodeError {
            index: self.index,
            source,
        })
    }
}

impl FromJson for ImageData {
    const TYPE_NAME: &'static str = "ImageData";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let map = cx.object(value)?;

        let object = cx.optional(map, "object");
        let b64_image = cx.required(map, "b64_image");
        let index = cx.required(map, "index");

        Some(Self {
            object: object?,
            b64_image: b64_image?,
            index: index?,
        })
    }
}

/// Token accounting of a text-to-image request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageUsage {
    prompt_tokens: u64,
    total_tokens: u64,
}

impl ImageUsage {
    /// Number of tokens in the prompt.
    pub fn prompt_tokens(&self) -> u64 {
        self.prompt_tokens
    }

    /// Total number of tokens billed for the request.
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }
}

impl FromJson for ImageUsage {
    const TYPE_NAME: &'static str = "ImageUsage";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let map = cx.object(value)?;

        let prompt_tokens = cx.required(map, "prompt_tokens");
        let total_tokens = cx.required(map, "total_tokens");

        Some(Self {
            prompt_tokens: prompt_tokens?,
            total_tokens: total_tokens?,
        })
    }
}

/// A complete text-to-image response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageResponse {
    id: String,
    object: ImageObject,
    created: u64,
    data: Vec<ImageData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<ImageUsage>,
}

impl ImageResponse {
    /// Unique identifier of the response.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Object tag, always `image`.
    pub fn object(&self) -> ImageObject {
        self.object
    }

    /// Unix timestamp, in seconds, of when the response was created.
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Generated images in service order.
    pub fn data(&self) -> &[ImageData] {
        &self.data
    }

    /// Token accounting, when the service reported it.
    pub fn usage(&self) -> Option<&ImageUsage> {
        self.usage.as_ref()
    }

    /// Decodes every image, failing on the first one that is not valid base64.
    pub fn decode_all(&self) -> Result<Vec<Vec<u8>>, ImageDecodeError> {
        self.data.iter().map(ImageData::decode).collect()
    }
}

impl FromJson for ImageResponse {
    const TYPE_NAME: &'static str = "ImageResponse";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let map = cx.object(value)?;

        let id = cx.required(map, "id");
        let object = cx.required(map, "object");
        let created = cx.required(map, "created");
        let data = cx.required(map, "data");
        let usage = cx.optional(map, "usage");

        Some(Self {
            id: id?,
            object: object?,
            created: created?,
            data: data?,
            usage: usage?,
        })
    }
}

deserialize_via_schema!(ImageData, ImageUsage, ImageResponse);
