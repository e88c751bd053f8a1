//! Supporting types for the injection pipeline (§4.6 steps 1, 3, 8).

use wopr_core::InjectionSource;
use wopr_security::ResolvedPolicy;

/// Senders whose prompt prefix would add nothing useful (§4.6 step 8).
const TRIVIAL_SENDERS: &[&str] = &["cli", "unknown"];

/// One image attached to a message, already decoded from whichever shape
/// the caller supplied it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Base64-encoded image data.
    pub data: String,
    /// MIME type, e.g. `image/png`.
    pub media_type: String,
}

/// A message payload after unifying the string and multimodal shapes a
/// caller may have sent (§4.6 step 3).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedMessage {
    /// The message text.
    pub text: String,
    /// Images carried alongside the text, in order.
    pub images: Vec<ImageAttachment>,
}

/// Unify `payload.message`'s string/object shape into a [`NormalizedMessage`].
///
/// Accepts a bare string, or an object of the form
/// `{"text": "...", "images": [{"data": "...", "media_type": "..."}]}`.
/// Any other shape degrades to its string rendering with no images,
/// rather than failing the injection outright.
#[must_use]
pub fn normalize_payload(message: &serde_json::Value) -> NormalizedMessage {
    match message {
        serde_json::Value::String(text) => NormalizedMessage {
            text: text.clone(),
            images: Vec::new(),
        },
        serde_json::Value::Null => NormalizedMessage::default(),
        serde_json::Value::Object(map) => {
            let text = map
                .get("text")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string();
            let images = map
                .get("images")
                .and_then(serde_json::Value::as_array)
                .map(|entries| entries.iter().filter_map(parse_image).collect())
                .unwrap_or_default();
            NormalizedMessage { text, images }
        }
        other => NormalizedMessage {
            text: other.to_string(),
            images: Vec::new(),
        },
    }
}

fn parse_image(value: &serde_json::Value) -> Option<ImageAttachment> {
    let data = value.get("data")?.as_str()?.to_string();
    let media_type = value.get("media_type")?.as_str()?.to_string();
    Some(ImageAttachment { data, media_type })
}

/// Append a bracketed reference for each attached image, for the
/// conversation log entry (§4.6 step 7).
#[must_use]
pub fn annotate_images(text: &str, images: &[ImageAttachment]) -> String {
    if images.is_empty() {
        return text.to_string();
    }
    let mut annotated = text.to_string();
    for (index, image) in images.iter().enumerate() {
        annotated.push_str(&format!("\n[image {}: {}]", index + 1, image.media_type));
    }
    annotated
}

/// Whether `from` is trivial enough that prefixing it onto the prompt
/// would add nothing (§4.6 step 8).
#[must_use]
pub fn is_trivial_sender(from: &str) -> bool {
    TRIVIAL_SENDERS.contains(&from)
}

/// Compose the final prompt sent to the provider (§4.6 step 8).
///
/// A message beginning with `/` after trimming is a slash command: the
/// context block is never prepended to it, so the command stays the
/// first line. Otherwise the context block (if any) is prepended. The
/// sender prefix is applied last, after either branch.
#[must_use]
pub fn compose_prompt(message: &str, context: &str, from: &str) -> String {
    let trimmed = message.trim_start();
    let body = if trimmed.starts_with('/') {
        message.to_string()
    } else if context.is_empty() {
        message.to_string()
    } else {
        format!("{context}\n\n{message}")
    };

    if is_trivial_sender(from) {
        body
    } else {
        format!("{from}: {body}")
    }
}

/// The resolved security state for one in-flight injection, held for the
/// duration of [`crate::InjectionExecutor::execute`] and visible via
/// [`crate::InjectionExecutor::active_security_context`] while it runs.
#[derive(Debug, Clone)]
pub struct SecurityContext {
    /// The session this injection targets.
    pub session: String,
    /// Where the injection came from.
    pub source: InjectionSource,
    /// The policy resolved for this source/session pair.
    pub policy: ResolvedPolicy,
}
