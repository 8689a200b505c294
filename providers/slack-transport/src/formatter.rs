use crate::types::{SlackBlock, SlackMessage, SlackText};

/// Slack caps header text at 150 characters
const MAX_HEADER_LEN: usize = 150;

/// Format a subject and body as a Slack message for `channel`
///
/// The subject is the fallback text. A non-empty body adds a preformatted
/// section, headed by the subject when there is one, so multi-line error
/// output keeps its layout.
pub fn format_slack_message(channel: &str, subject: &str, body: &str) -> SlackMessage {
    let body = body.trim();

    let blocks = if body.is_empty() {
        None
    } else {
        let mut blocks = Vec::with_capacity(3);
        // Slack rejects header blocks with empty text
        if !subject.trim().is_empty() {
            blocks.push(SlackBlock::Header {
                text: SlackText::plain_text(truncate(subject, MAX_HEADER_LEN)),
            });
            blocks.push(SlackBlock::Divider);
        }
        blocks.push(SlackBlock::Section {
            text: SlackText::markdown(format!("```{}```", body)),
        });
        Some(blocks)
    };

    SlackMessage {
        text: subject.to_string(),
        channel: Some(channel.to_string()),
        blocks,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max_chars - 3).collect();
        short.push_str("...");
        short
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_subject_only_message() {
        let message = format_slack_message("#ops", "(node-1) ETH node connection error", "");

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "text": "(node-1) ETH node connection error",
                "channel": "#ops"
            })
        );
    }

    #[test]
    fn test_message_with_body() {
        let message = format_slack_message(
            "#ops",
            "(node-1) ETH node lagging behind",
            "(node-1) ETH node is behind REF by 15 blocks\n",
        );

        let blocks = message.blocks.unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[2],
            SlackBlock::Section {
                text: SlackText::markdown("```(node-1) ETH node is behind REF by 15 blocks```")
            }
        );
    }

    #[test]
    fn test_empty_subject_skips_header() {
        let message = format_slack_message("#ops", "", "node went away");

        assert_eq!(
            message.blocks.unwrap(),
            vec![SlackBlock::Section {
                text: SlackText::markdown("```node went away```")
            }]
        );
    }

    #[test]
    fn test_long_header_is_truncated() {
        let subject = "x".repeat(200);
        let message = format_slack_message("#ops", &subject, "body");

        match &message.blocks.unwrap()[0] {
            SlackBlock::Header { text } => {
                assert_eq!(text.text.chars().count(), MAX_HEADER_LEN);
                assert!(text.text.ends_with("..."));
            }
            other => panic!("Expected header block, got {:?}", other),
        }
        assert_eq!(message.text, subject);
    }
}
