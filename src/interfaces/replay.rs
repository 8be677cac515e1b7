//! File-driven transport: replays recorded bus traffic from JSON lines and
//! prints outbound events to stdout.
//!
//! Each input line is `{"topic": "<name>", "payload": <event object>}`.
//! Each output line is `<topic>\t<payload json>`.

use crate::domain::ports::{EventPublisher, EventSource, InboundMessage};
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use tracing::warn;

#[derive(Debug, Deserialize)]
struct RecordedMessage {
    topic: String,
    payload: Value,
}

pub struct ReplaySource<R: BufRead> {
    lines: io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(source: R) -> Self {
        Self {
            lines: source.lines(),
            line_number: 0,
        }
    }
}

#[async_trait]
impl<R: BufRead + Send> EventSource for ReplaySource<R> {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<RecordedMessage>(&line) {
                Ok(recorded) => {
                    let payload = serde_json::to_vec(&recorded.payload)
                        .map_err(|e| RelayError::InternalError(Box::new(e)))?;
                    return Ok(Some(InboundMessage {
                        topic: recorded.topic,
                        payload,
                    }));
                }
                Err(e) => {
                    warn!(line = self.line_number, error = %e, "Error reading recorded message");
                }
            }
        }
        Ok(None)
    }
}

/// Writes every published event to stdout. Delivery is acknowledged once the
/// line is flushed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePublisher;

#[async_trait]
impl EventPublisher for ConsolePublisher {
    async fn publish(&self, payload: &[u8], topic: &str, _key: Option<&str>) -> Result<()> {
        write_event(&mut io::stdout().lock(), payload, topic)
            .map_err(|e| RelayError::TransportError(e.to_string()))
    }
}

fn write_event<W: Write>(out: &mut W, payload: &[u8], topic: &str) -> io::Result<()> {
    out.write_all(topic.as_bytes())?;
    out.write_all(b"\t")?;
    out.write_all(payload)?;
    out.write_all(b"\n")?;
    out.flush()
}
