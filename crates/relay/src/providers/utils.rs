use serde_json::Value;

/// Returned in place of an answer when the backend produced no usable text.
pub const NO_RESPONSE_FALLBACK: &str = "No response from model.";

/// Pull the `message.content` text out of one NDJSON record.
///
/// Blank lines, lines that are not JSON, and records without a string
/// `message.content` all yield `None`.
pub fn content_fragment(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let record: Value = serde_json::from_str(line).ok()?;
    record
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Lazily yield the content fragments of a newline-delimited JSON body in order.
pub fn content_fragments(body: &str) -> impl Iterator<Item = String> + '_ {
    body.lines().filter_map(content_fragment)
}

/// Concatenate every fragment of a streamed chat body into a single reply.
pub fn aggregate_ndjson(body: &str) -> String {
    let reply: String = content_fragments(body).collect();
    if reply.is_empty() {
        NO_RESPONSE_FALLBACK.to_string()
    } else {
        reply
    }
}
