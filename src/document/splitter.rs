//! Recursive character splitting with overlap.
//!
//! Text is cut on the coarsest separator that occurs (paragraph, line, word,
//! then single characters); pieces are merged back into chunks of at most
//! `chunk_size` characters, each repeating up to `chunk_overlap` characters
//! from the end of the previous one.

use super::{DocumentChunk, SourceDocument};
use std::collections::VecDeque;

const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1500,
            chunk_overlap: 200,
        }
    }
}

pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    pub fn new(config: SplitterConfig) -> Self {
        let chunk_size = config.chunk_size.max(1);
        Self {
            config: SplitterConfig {
                chunk_size,
                chunk_overlap: config.chunk_overlap.min(chunk_size - 1),
            },
        }
    }

    pub fn split(&self, document: &SourceDocument) -> Vec<DocumentChunk> {
        self.split_text(&document.content)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, content)| DocumentChunk {
                source: document.source.clone(),
                content,
                chunk_index,
            })
            .collect()
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // First separator present in the text; "" always matches.
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let finer = separators.get(position + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < self.config.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.trim().to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }

        chunks.retain(|c| !c.is_empty());
        chunks
    }

    /// Greedily pack pieces into chunks, carrying a tail of at most
    /// `chunk_overlap` characters forward.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            let len = char_len(piece);
            let joined_len = |window: &VecDeque<&str>, total: usize| {
                total + len + if window.is_empty() { 0 } else { sep_len }
            };

            if joined_len(&window, total) > self.config.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window, separator);

                while total > self.config.chunk_overlap
                    || (total > 0 && joined_len(&window, total) > self.config.chunk_size)
                {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(front) + if window.is_empty() { 0 } else { sep_len };
                }
            }

            total += len + if window.is_empty() { 0 } else { sep_len };
            window.push_back(piece);
        }

        push_joined(&mut chunks, &window, separator);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
