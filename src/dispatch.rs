//! Turns a job's response blocks into messages for the host

use std::collections::VecDeque;

use serde::Serialize;

use crate::api::Block;

/// Header emitted before the numbered citation list
pub const CITATIONS_HEADER: &str = "Citations:";

/// One message handed to the host for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolMessage {
    Text { text: String },
    Image { url: String },
    Error { message: String },
}

impl ToolMessage {
    pub fn text(text: impl Into<String>) -> Self {
        ToolMessage::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        ToolMessage::Image { url: url.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ToolMessage::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolMessage::Error { .. })
    }
}

/// Lazily maps blocks to messages in upstream order.
///
/// Citations are gathered while blocks are read and emitted only after the
/// last block, since the full list is not known before then.
#[derive(Debug)]
pub struct BlockDispatcher<I> {
    blocks: I,
    with_citation: bool,
    citations: Vec<String>,
    trailer: Option<VecDeque<ToolMessage>>,
}

impl<I> BlockDispatcher<I>
where
    I: Iterator<Item = Block>,
{
    pub fn new(blocks: impl IntoIterator<IntoIter = I>, with_citation: bool) -> Self {
        Self {
            blocks: blocks.into_iter(),
            with_citation,
            citations: Vec::new(),
            trailer: None,
        }
    }

    /// Message for a single block, or `None` if the block emits nothing now
    fn dispatch(&mut self, block: Block) -> Option<ToolMessage> {
        match block {
            Block::Message { content } => Some(ToolMessage::text(content.unwrap_or_default())),
            Block::Sources { sources } => {
                if self.with_citation {
                    self.citations.extend(sources.into_iter().flatten());
                }
                None
            }
            Block::Image { url } => url.map(ToolMessage::image),
            Block::Unknown { kind } => {
                log::debug!("Skipping unsupported block type: {}", kind);
                None
            }
        }
    }

    fn citation_trailer(&mut self) -> VecDeque<ToolMessage> {
        let citations = std::mem::take(&mut self.citations);
        if citations.is_empty() {
            return VecDeque::new();
        }

        std::iter::once(ToolMessage::text(CITATIONS_HEADER))
            .chain(
                citations
                    .into_iter()
                    .enumerate()
                    .map(|(i, source)| ToolMessage::text(format!("{}. {}", i + 1, source))),
            )
            .collect()
    }
}

impl<I> Iterator for BlockDispatcher<I>
where
    I: Iterator<Item = Block>,
{
    type Item = ToolMessage;

    fn next(&mut self) -> Option<ToolMessage> {
        if self.trailer.is_none() {
            while let Some(block) = self.blocks.next() {
                if let Some(message) = self.dispatch(block) {
                    return Some(message);
                }
            }
            self.trailer = Some(self.citation_trailer());
        }

        self.trailer.as_mut().and_then(VecDeque::pop_front)
    }
}
