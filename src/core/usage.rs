use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::BufRead;
use std::sync::atomic::{AtomicU64, Ordering};

/// Token counts reported by one chat-completion response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Reads `usage.{prompt,completion,total}_tokens`, or flat `input_tokens`/`output_tokens`.
    /// Missing counts are 0; a missing total is the sum of the other two.
    pub fn from_response(response: &Value) -> Self {
        let count = |value: &Value, key: &str| value.get(key).and_then(Value::as_u64);

        let (prompt, completion, total) = match response.get("usage") {
            Some(usage) => (
                count(usage, "prompt_tokens"),
                count(usage, "completion_tokens"),
                count(usage, "total_tokens"),
            ),
            None => (
                count(response, "input_tokens"),
                count(response, "output_tokens"),
                None,
            ),
        };

        let prompt_tokens = prompt.unwrap_or(0);
        let completion_tokens = completion.unwrap_or(0);
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: total.unwrap_or(prompt_tokens + completion_tokens),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub request_count: u64,
}

/// Token totals shared by every request callback of a run.
#[derive(Debug, Default)]
pub struct UsageAccumulator {
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
    requests: AtomicU64,
}

impl UsageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, usage: &TokenUsage) {
        self.input_tokens
            .fetch_add(usage.prompt_tokens, Ordering::Relaxed);
        self.output_tokens
            .fetch_add(usage.completion_tokens, Ordering::Relaxed);
        self.requests.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            "Token usage - input: {}, output: {}, total: {}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            total_input_tokens: self.input_tokens.load(Ordering::Relaxed),
            total_output_tokens: self.output_tokens.load(Ordering::Relaxed),
            request_count: self.requests.load(Ordering::Relaxed),
        }
    }

    /// Records every non-blank line of a JSON-lines stream. Returns the number of lines recorded.
    pub fn record_lines<R: BufRead>(&self, reader: R) -> Result<usize> {
        let mut recorded = 0;
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let response: Value = serde_json::from_str(&line)?;
            self.record(&TokenUsage::from_response(&response));
            recorded += 1;
        }
        Ok(recorded)
    }
}
