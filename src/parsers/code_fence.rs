// Strip a model reply down to the code it was asked for

const PYTHON_FENCE: &str = "```python";
const FENCE: &str = "```";

/// Body of the first ```` ```python ```` fence, else of the first ```` ``` ````
/// fence, else the reply unchanged
///
/// A fence without a closing marker runs to the end of the reply. The
/// extracted body is trimmed; a bare fence keeps any language tag as text.
pub fn extract_code(reply: &str) -> String {
    if let Some((_, rest)) = reply.split_once(PYTHON_FENCE) {
        return body_until_fence(rest);
    }
    if let Some((_, rest)) = reply.split_once(FENCE) {
        return body_until_fence(rest);
    }
    reply.to_string()
}

fn body_until_fence(rest: &str) -> String {
    let body = match rest.split_once(FENCE) {
        Some((body, _)) => body,
        None => rest,
    };
    body.trim().to_string()
}
