/*!
 * Prompt templates for supportive response generation.
 */

/// System prompt for the supportive assistant
pub const SUPPORT_SYSTEM_PROMPT: &str = r#"You are a compassionate AI mental health assistant specifically designed for university students.
Your responses should be:
- Warm, empathetic, and non-judgmental
- Evidence-based and therapeutically sound
- Practical with actionable coping strategies
- Culturally sensitive and inclusive
- Always encourage professional help when appropriate
- Never diagnose or replace professional therapy

Focus on validating emotions, providing coping strategies, and offering hope while maintaining appropriate boundaries."#;

/// Build the user prompt for a single journal entry
pub fn support_prompt(content: &str, emotions: &[String]) -> String {
    let emotion_context = if emotions.is_empty() {
        String::new()
    } else {
        format!("The student is experiencing: {}.", emotions.join(", "))
    };

    // user text is interpolated once, never re-scanned for placeholders
    format!(
        r#"A university student has shared the following in their mental health journal:

"{content}"

{emotion_context}

Please provide a compassionate, supportive response that:
1. Validates their feelings without minimizing them
2. Offers 2-3 practical coping strategies they can use immediately
3. Provides hope and perspective while being realistic
4. Suggests when professional support might be beneficial
5. Includes a gentle reminder of their strength and resilience

Format your response in a warm, conversational tone as if speaking directly to the student."#
    )
    .trim()
    .to_string()
}

/// Build the content of a follow-up entry that carries the previous exchange
pub fn follow_up_prompt(previous_content: &str, previous_suggestions: &[String], content: &str) -> String {
    let previous_suggestions = previous_suggestions.join(", ");

    format!(
        r#"Previous context: The student previously shared "{previous_content}"
and received support about {previous_suggestions}.

Now they're sharing: "{content}"

Please provide a follow-up response that acknowledges their previous sharing,
notices any progress or changes, and continues to offer supportive guidance."#
    )
}
