// Prompt constants for coaching analysis. Each service that needs LLM calls
// defines its own prompts.rs alongside it.

use crate::transcript::{Role, TranscriptTurn};

pub const COACHING_SYSTEM: &str = "You are an expert sales coach observing a live training \
    conversation between a salesperson and a simulated buyer. You give terse, concrete, \
    immediately usable advice. Never mention that the buyer is simulated or that you are an AI.";

pub const COACHING_PROMPT: &str = "\
Below are the most recent turns of an ongoing sales conversation. The last message listed \
is the newest exchange.

Conversation:
{conversation}

Newest message ({newest_speaker}): {newest_content}

Coach the salesperson on what just happened. Cover:
1. Response quality: how well the salesperson handled the buyer's latest input
2. Opportunities: what was created or missed in these exchanges
3. Communication: clarity, persuasiveness and professionalism of the recent replies
4. Next actions: what to say or do next, given the buyer's latest responses

Keep each section to 20-30 words. Focus only on the messages shown above, not the wider \
conversation.";

pub fn speaker_label(role: Role) -> &'static str {
    match role {
        Role::User => "Salesperson",
        Role::Assistant => "Buyer",
    }
}

/// Fills `COACHING_PROMPT` with the trailing window and its newest turn.
pub fn render_coaching_prompt(recent: &[TranscriptTurn], newest: &TranscriptTurn) -> String {
    let conversation = recent
        .iter()
        .map(|t| format!("{}: {}", speaker_label(t.role), t.content))
        .collect::<Vec<_>>()
        .join("\n");

    COACHING_PROMPT
        .replace("{conversation}", &conversation)
        .replace("{newest_speaker}", speaker_label(newest.role))
        .replace("{newest_content}", &newest.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_labels_both_speakers() {
        let recent = vec![
            TranscriptTurn::new(Role::User, "Our line handles 200 units an hour."),
            TranscriptTurn::new(Role::Assistant, "What about changeover time?"),
        ];
        let prompt = render_coaching_prompt(&recent, &recent[1]);

        assert!(prompt.contains("Salesperson: Our line handles 200 units an hour."));
        assert!(prompt.contains("Buyer: What about changeover time?"));
        assert!(prompt.contains("Newest message (Buyer): What about changeover time?"));
        assert!(!prompt.contains("{conversation}"));
    }
}
