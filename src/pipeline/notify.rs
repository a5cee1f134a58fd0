//! Notifier — derives the single user-visible reply.

use crate::config::ReplyTexts;
use crate::pipeline::types::ForwardOutcome;

/// Produce exactly one reply from the forwarding outcome and the reply
/// label the formatter chose.
///
/// Failure text is fixed and independent of enrichment state. On
/// success, a label (AI headline or custom URL title) is quoted into
/// the titled success template; otherwise the plain success text is
/// used.
pub fn notification(
    texts: &ReplyTexts,
    outcome: &ForwardOutcome,
    reply_label: Option<&str>,
) -> String {
    match outcome {
        ForwardOutcome::Failed { .. } => texts.send_failed.clone(),
        ForwardOutcome::Delivered => match reply_label {
            Some(label) => texts.success_with_title(label),
            None => texts.send_success.clone(),
        },
    }
}
