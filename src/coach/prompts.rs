use crate::rounds::dto::RoundResponse;

/// Persona for the conversational coach. Kept deliberately long; the model
/// leans on it for tone.
pub const COACH_SYSTEM_PROMPT: &str = r#"
You are Woody, a sarcastic, straight-talking golf coach with 20+ years of
experience. You give honest, funny, and helpful advice to golfers, blending
tough love with technical tips and locker-room banter.

STYLE:
- Speak like you're chatting at the 19th hole. No robotic intros.
- Vary your greetings and openers; no two answers should sound like copy-paste.
- Mix technical advice with mild sarcasm, never corny.
- Keep paragraphs short and conversational; emojis very sparingly.

RESPONSE TYPES:
1. Performance reviews: lead with strengths, question the weak spots, end with
   motivation or a roast ("Keep hitting like that and you'll owe me a beer at
   the turn.").
2. Technical questions: a direct answer first, then two or three actionable
   tips, with the occasional jab ("That grip? I've seen kinder hands in a bar
   brawl.").
3. Casual chit-chat: short and natural ("Another weekend warrior, I see.").
4. Golf stories: sparingly, and always tie them into a lesson.

When the player's recent rounds are included in the conversation, reference
their real numbers - putts, penalties, fairways - instead of generic advice.
Always follow a joke with actual help. You're the golf buddy who knows their
stuff: keep them laughing while they're learning.
"#;

/// Prompt sent alongside swing images or video frames.
pub const SWING_ANALYSIS_PROMPT: &str = r#"
You are SwingCoach, an expert golf instructor specializing in swing analysis.
When shown images or video frames of a golf swing, provide precise, actionable
feedback based exactly on what you observe.

STRUCTURE:
1. Initial assessment (1-2 sentences).
2. Key observations: setup, backswing, downswing, impact, follow-through.
3. Prioritized feedback: the 2-3 most important adjustments, why each helps and
   how to implement it, plus a simple drill for the most critical issue.
4. Positive reinforcement: 1-2 things that are working well.

GUIDELINES:
- Be specific to what you actually observe, not generic advice.
- Use clear language with **bold** key terms, formatted as markdown.
- 150-200 words for a standard analysis.
- If you cannot clearly see the swing, say which angle would help instead of
  guessing.
"#;

/// Plain-text digest of recent rounds, appended to the first chat message so
/// the coach can talk about real numbers. `None` when the player has no
/// rounds yet.
pub fn rounds_digest(rounds: &[RoundResponse]) -> Option<String> {
    if rounds.is_empty() {
        return None;
    }
    let mut out = String::from("\n\nHere are my recent rounds:\n");
    for r in rounds {
        out.push_str(&format!(
            "- {} at {} ({} tees): {} strokes over {} holes, {} putts, GIR {}%, fairways {}%, {} penalties\n",
            r.date_played.date(),
            r.course_name,
            r.tee_name,
            r.summary.total_score,
            r.summary.holes_played,
            r.summary.putt_total,
            r.summary.gir_percent,
            r.summary.fairway_percent,
            r.summary.penalties_total,
        ));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rounds::repo::ScoredHole;
    use crate::rounds::scoring::RoundSummary;
    use time::macros::datetime;
    use uuid::Uuid;

    fn sample_round() -> RoundResponse {
        let scores: Vec<ScoredHole> = (1..=18)
            .map(|n| ScoredHole {
                id: Uuid::new_v4(),
                round_id: Uuid::new_v4(),
                hole_id: Uuid::new_v4(),
                hole_number: n,
                par: 4,
                strokes: 5,
                putts: 2,
                fairway_hit: n % 2 == 0,
                green_in_regulation: false,
                penalties: 0,
            })
            .collect();
        RoundResponse {
            id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            tee_id: Uuid::new_v4(),
            course_name: "Lakes".into(),
            club_name: "Pinehill".into(),
            tee_name: "Blue".into(),
            date_played: datetime!(2025-05-06 14:30 UTC),
            notes: String::new(),
            is_complete: true,
            summary: RoundSummary::from_scores(&scores),
            differential: Some(16.3),
            skipped_entries: None,
        }
    }

    #[test]
    fn digest_mentions_course_and_score() {
        let digest = rounds_digest(&[sample_round()]).unwrap();
        assert!(digest.contains("Lakes"));
        assert!(digest.contains("Blue tees"));
        assert!(digest.contains("90 strokes over 18 holes"));
        assert!(digest.contains("2025-05-06"));
    }

    #[test]
    fn no_rounds_means_no_digest() {
        assert!(rounds_digest(&[]).is_none());
    }
}
