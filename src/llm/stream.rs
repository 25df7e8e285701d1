// ABOUTME: Line-buffering parser for newline-delimited JSON streaming responses
// ABOUTME: Handles partial lines across TCP boundaries and multiple lines per chunk
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

//! # NDJSON Stream Parser
//!
//! Ollama's generate endpoint emits one JSON object per line. TCP does not
//! guarantee alignment between network chunks and line boundaries, so a
//! naive per-chunk parse has two correctness problems:
//!
//! 1. **Multiple lines per TCP chunk**: when network buffers batch several
//!    JSON lines into a single `bytes_stream()` chunk, all of them must be
//!    emitted, not just the first.
//!
//! 2. **Partial JSON across TCP boundaries**: when a JSON payload is split
//!    across two chunks, the partial tail must be buffered until the rest
//!    arrives.
//!
//! [`LineBuffer`] solves both; [`create_line_stream`] wraps a `reqwest` byte
//! stream with it. The provider supplies a `parse_line` closure that turns a
//! raw JSON line into a [`GenerationChunk`].

use std::collections::VecDeque;
use std::mem;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::stream::unfold;
use futures_util::{Stream, StreamExt};

use super::{GenerationChunk, GenerationStream};
use crate::errors::AppError;

/// Line-buffering parser that handles partial lines across chunk boundaries
///
/// Complete lines (terminated by `\n`) are extracted and returned; any
/// trailing partial line stays buffered for the next `feed()` call.
#[derive(Debug, Default)]
pub struct LineBuffer {
    /// Accumulated bytes not yet terminated by a newline
    buffer: String,
}

impl LineBuffer {
    /// Create a new empty line buffer
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Feed raw bytes from a TCP chunk, returning any complete lines
    ///
    /// Returned lines are trimmed; empty lines are skipped.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let text = String::from_utf8_lossy(bytes);
        self.buffer.push_str(&text);

        let mut lines = Vec::new();

        while let Some(newline_pos) = self.buffer.find('\n') {
            let line = self.buffer[..newline_pos].trim_end_matches('\r').to_owned();
            self.buffer = self.buffer[newline_pos + 1..].to_owned();

            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_owned());
            }
        }

        lines
    }

    /// Flush any remaining buffered content as a final line
    ///
    /// Called when the byte stream ends: a final line without a trailing
    /// newline is still a complete payload.
    pub fn flush(&mut self) -> Option<String> {
        let remaining = mem::take(&mut self.buffer);
        let trimmed = remaining.trim();

        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    }
}

/// Internal state for the line stream unfold
struct LineStreamState {
    parser: LineBuffer,
    pending: VecDeque<Result<GenerationChunk, AppError>>,
    stream_ended: bool,
}

/// Create a properly-buffered chunk stream from a raw byte stream
///
/// Wraps a `reqwest` byte stream with line buffering. The `parse_line`
/// closure converts one JSON line into an optional chunk result; returning
/// `None` skips lines that produce no output (e.g. metadata-only payloads
/// or unparseable keep-alive noise).
///
/// Transport-level read errors terminate the stream with an error item.
pub fn create_line_stream<S, F>(
    byte_stream: S,
    parse_line: F,
    provider_name: &'static str,
) -> GenerationStream
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    F: Fn(&str) -> Option<Result<GenerationChunk, AppError>> + Send + 'static,
{
    let state = LineStreamState {
        parser: LineBuffer::new(),
        pending: VecDeque::new(),
        stream_ended: false,
    };

    // unfold keeps the parser state alive across async iterations. Each
    // iteration either drains a pending chunk or reads the next TCP chunk.
    let stream = unfold(
        (
            Box::pin(byte_stream)
                as Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
            state,
            parse_line,
            provider_name,
        ),
        |(mut byte_stream, mut state, parse_line, provider_name)| async move {
            loop {
                // Drain pending chunks first (multiple lines per TCP chunk)
                if let Some(item) = state.pending.pop_front() {
                    return Some((item, (byte_stream, state, parse_line, provider_name)));
                }

                if state.stream_ended {
                    return None;
                }

                match byte_stream.next().await {
                    Some(Ok(bytes)) => {
                        for line in state.parser.feed(&bytes) {
                            if let Some(result) = parse_line(&line) {
                                state.pending.push_back(result);
                            }
                        }
                        // Loop to drain pending chunks
                    }
                    Some(Err(e)) => {
                        state.stream_ended = true;
                        return Some((
                            Err(AppError::external_service(
                                provider_name,
                                format!("Stream read error: {e}"),
                            )),
                            (byte_stream, state, parse_line, provider_name),
                        ));
                    }
                    None => {
                        // Byte stream ended, flush any trailing partial line
                        state.stream_ended = true;
                        if let Some(line) = state.parser.flush() {
                            if let Some(result) = parse_line(&line) {
                                state.pending.push_back(result);
                            }
                        }
                        if let Some(item) = state.pending.pop_front() {
                            return Some((item, (byte_stream, state, parse_line, provider_name)));
                        }
                        return None;
                    }
                }
            }
        },
    );

    Box::pin(stream)
}
