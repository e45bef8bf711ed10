//! Turns raw input into the printed report for each payload kind.

use anyhow::Context;
use config::{Config, PayloadKind};
use response::{AssembleError, Completion, CompletionChunk, FromJson, ImageResponse, StreamAssembler};
use serde_json::json;

/// Validates `input` as the configured payload kind and renders the result as pretty JSON.
pub(crate) fn render(config: &Config, input: &str) -> anyhow::Result<String> {
    let rendered = match config.input.kind {
        PayloadKind::Completion => {
            let completion = Completion::from_json_str(input)?;

            log::info!(
                "Validated completion {} with {} choice(s)",
                completion.id(),
                completion.choices().len()
            );

            serde_json::to_string_pretty(&completion)?
        }
        PayloadKind::Image => render_image(config, input)?,
        PayloadKind::Chunk => render_chunks(config, input)?,
    };

    Ok(rendered)
}

fn render_image(config: &Config, input: &str) -> anyhow::Result<String> {
    let response = ImageResponse::from_json_str(input)?;

    log::info!("Validated image response {} with {} image(s)", response.id(), response.data().len());

    if !config.image.decode {
        return Ok(serde_json::to_string_pretty(&response)?);
    }

    let images = response
        .data()
        .iter()
        .map(|image| {
            let bytes = image.decode()?;
            Ok(json!({"index": image.index(), "bytes": bytes.len()}))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(serde_json::to_string_pretty(&json!({
        "id": response.id(),
        "created": response.created(),
        "images": images,
    }))?)
}

/// One chunk payload per line. Captured SSE lines are accepted too: a `data:`
/// prefix is stripped and the `[DONE]` marker is skipped.
fn chunk_payloads(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .map(|(position, line)| {
            let line = line.trim();
            let payload = line.strip_prefix("data:").map(str::trim_start).unwrap_or(line);

            (position + 1, payload)
        })
        .filter(|(_, payload)| !payload.is_empty() && *payload != "[DONE]")
}

fn render_chunks(config: &Config, input: &str) -> anyhow::Result<String> {
    let mut chunks = Vec::new();

    for (line, payload) in chunk_payloads(input) {
        let chunk = CompletionChunk::from_json_str(payload).with_context(|| format!("line {line}"))?;
        chunks.push((line, chunk));
    }

    log::info!("Validated {} chunk(s)", chunks.len());

    if !config.stream.assemble {
        let chunks: Vec<_> = chunks.into_iter().map(|(_, chunk)| chunk).collect();
        return Ok(serde_json::to_string_pretty(&chunks)?);
    }

    let mut assembler = StreamAssembler::new();

    for (line, chunk) in &chunks {
        match assembler.push(chunk) {
            Ok(()) => {}
            Err(error @ AssembleError::MismatchedChunk { .. }) if !config.stream.require_same_response => {
                log::warn!("Skipping line {line}: {error}");
            }
            Err(error) => return Err(error).with_context(|| format!("line {line}")),
        }
    }

    Ok(serde_json::to_string_pretty(&assembler.finish()?)?)
}
