//! Prompt Builder: joins normalized lines chronologically, enforces the
//! character ceiling, and wraps the result in the instruction template.

/// Character ceiling for the conversation portion of the prompt. Oldest
/// content is dropped first when the joined text exceeds it.
pub const MAX_PROMPT_CHARS: usize = 20_000;

/// Built prompt plus whether the oldest content had to be dropped.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub text: String,
    pub truncated: bool,
}

/// Join lines (already oldest-first) with a blank line between messages,
/// keep only the trailing `MAX_PROMPT_CHARS` characters when the ceiling
/// is exceeded, and wrap the result in the summarization instructions.
/// Deterministic given the same input.
#[must_use]
pub fn build_prompt(lines: &[String]) -> BuiltPrompt {
    let mut conversation = lines.join("\n\n");

    let total_chars = conversation.chars().count();
    let truncated = total_chars > MAX_PROMPT_CHARS;
    if truncated {
        conversation = conversation
            .chars()
            .skip(total_chars - MAX_PROMPT_CHARS)
            .collect();
    }

    let text = format!(
        "Tu es un assistant intelligent chargé de résumer une conversation sur un canal communautaire.\n\n\
         Ta mission est de condenser les messages suivants en français, en extrayant les informations essentielles :\n\
         - Résume les échanges par **idée ou discussion**, pas par message.\n\
         - Identifie les **thèmes abordés** si possible (ex : plateformes, outils, critiques…)\n\
         - Ignore les blagues, emojis, réactions sans fond.\n\
         - Regroupe les propos similaires de différents membres.\n\
         - Utilise des bullet points clairs. Si plusieurs sujets, regroupe sous des titres en gras.\n\
         - Ne rédige pas plus de 8 à 10 bullet points. Regroupe ou coupe si nécessaire.\n\
         - Coupe proprement, ne laisse pas de phrases incomplètes.\n\
         - Ne donne ni intro ni conclusion.\n\n\
         Voici la conversation :\n\n{conversation}\n\nRésumé :"
    );

    BuiltPrompt { text, truncated }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_ceiling_is_not_truncated() {
        let line = "a".repeat(MAX_PROMPT_CHARS);
        let built = build_prompt(&[line]);
        assert!(!built.truncated);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        // Multi-byte characters: the kept tail must still be exactly
        // MAX_PROMPT_CHARS characters.
        let line = "é".repeat(MAX_PROMPT_CHARS + 10);
        let built = build_prompt(&[line]);
        assert!(built.truncated);
        let conversation = extract_conversation(&built.text);
        assert_eq!(conversation.chars().count(), MAX_PROMPT_CHARS);
    }

    fn extract_conversation(prompt: &str) -> &str {
        let start = prompt.find("Voici la conversation :\n\n").unwrap()
            + "Voici la conversation :\n\n".len();
        let end = prompt.rfind("\n\nRésumé :").unwrap();
        &prompt[start..end]
    }
}
