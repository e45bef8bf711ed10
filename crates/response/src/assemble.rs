//! Folding the chunks of one streamed response into a full completion.

use std::collections::BTreeMap;

use crate::{
    chunk::CompletionChunk,
    completion::{Choice, Completion, CompletionUsage},
    error::AssembleError,
    literal::FinishReason,
};

/// Accumulates validated chunks of a single streamed response.
///
/// The first chunk fixes the response identity. Content fragments are
/// concatenated per choice index in arrival order, the last reported finish
/// reason of a choice wins, and usage is taken from the chunk that carries it.
#[derive(Debug, Default)]
pub struct StreamAssembler {
    identity: Option<Identity>,
    choices: BTreeMap<u32, PartialChoice>,
    usage: Option<CompletionUsage>,
    chunks: usize,
}

#[derive(Debug)]
struct Identity {
    id: String,
    created: u64,
    model: String,
}

#[derive(Debug, Default)]
struct PartialChoice {
    content: Option<String>,
    finish_reason: Option<FinishReason>,
}

impl StreamAssembler {
    /// Creates an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds all chunks of one response into a completion.
    pub fn assemble<I>(chunks: I) -> Result<Completion, AssembleError>
    where
        I: IntoIterator<Item = CompletionChunk>,
    {
        let mut assembler = Self::new();

        for chunk in chunks {
            assembler.push(&chunk)?;
        }

        assembler.finish()
    }

    /// Number of chunks applied so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Applies one chunk.
    ///
    /// A chunk whose `id` or `created` differs from the first chunk is
    /// rejected and leaves the assembler unchanged.
    pub fn push(&mut self, chunk: &CompletionChunk) -> Result<(), AssembleError> {
        if let Some(identity) = &self.identity {
            if identity.id != chunk.id() || identity.created != chunk.created() {
                log::warn!(
                    "Chunk {} ({}) does not belong to response {} ({})",
                    chunk.id(),
                    chunk.created(),
                    identity.id,
                    identity.created
                );

                return Err(AssembleError::MismatchedChunk {
                    expected_id: identity.id.clone(),
                    expected_created: identity.created,
                    found_id: chunk.id().to_string(),
                    found_created: chunk.created(),
                });
            }

            if identity.model != chunk.model() {
                log::debug!(
                    "Chunk of response {} reports model {}, keeping {}",
                    identity.id,
                    chunk.model(),
                    identity.model
                );
            }
        } else {
            self.identity = Some(Identity {
                id: chunk.id().to_string(),
                created: chunk.created(),
                model: chunk.model().to_string(),
            });
        }

        for fragment in chunk.choices() {
            let choice = self.choices.entry(fragment.index()).or_default();

            if let Some(text) = fragment.delta().content() {
                choice.content.get_or_insert_with(String::new).push_str(text);
            }

            if let Some(reason) = fragment.finish_reason() {
                choice.finish_reason = Some(reason);
            }
        }

        if let Some(usage) = chunk.usage() {
            self.usage = Some(*usage);
        }

        self.chunks += 1;

        Ok(())
    }

    /// Produces the completion assembled from every applied chunk.
    pub fn finish(self) -> Result<Completion, AssembleError> {
        let Some(identity) = self.identity else {
            return Err(AssembleError::Empty);
        };

        log::debug!(
            "Assembled response {} from {} chunk(s) with {} choice(s)",
            identity.id,
            self.chunks,
            self.choices.len()
        );

        let choices = self
            .choices
            .into_iter()
            .map(|(index, choice)| Choice::assembled(index, choice.content, choice.finish_reason))
            .collect();

        Ok(Completion::assembled(
            identity.id,
            identity.created,
            identity.model,
            choices,
            self.usage,
        ))
    }
}
