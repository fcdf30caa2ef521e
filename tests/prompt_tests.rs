use recap::core::prompt::{MAX_PROMPT_CHARS, build_prompt};

fn conversation_of(prompt: &str) -> &str {
    let marker = "Voici la conversation :\n\n";
    let start = prompt.find(marker).expect("conversation marker") + marker.len();
    let end = prompt.rfind("\n\nRésumé :").expect("trailing marker");
    &prompt[start..end]
}

#[test]
fn test_every_line_appears_verbatim_in_order() {
    let lines = vec![
        "[2024-03-01 10:00] alice: le déploiement est passé".to_string(),
        "[2024-03-01 10:05] bob: il reste un bug d'affichage".to_string(),
        "[2024-03-01 10:09] carol: je m'en occupe".to_string(),
    ];

    let built = build_prompt(&lines);
    assert!(!built.truncated);

    let mut last_pos = 0;
    for line in &lines {
        let pos = built.text.find(line.as_str()).expect("line present verbatim");
        assert!(pos > last_pos, "lines must keep their chronological order");
        last_pos = pos;
    }
}

#[test]
fn test_lines_are_joined_with_blank_line() {
    let lines = vec!["a".to_string(), "b".to_string()];
    let built = build_prompt(&lines);
    assert_eq!(conversation_of(&built.text), "a\n\nb");
}

#[test]
fn test_short_input_is_not_truncated() {
    let lines = vec!["x".repeat(MAX_PROMPT_CHARS - 100)];
    let built = build_prompt(&lines);
    assert!(!built.truncated);
    assert_eq!(
        conversation_of(&built.text).chars().count(),
        MAX_PROMPT_CHARS - 100
    );
}

#[test]
fn test_over_budget_input_keeps_exactly_the_ceiling_from_the_newest_end() {
    // Two lines: the old one pushes the total over the ceiling, so only
    // the tail survives.
    let old = format!("OLD-{}", "o".repeat(15_000));
    let new = format!("NEW-{}", "n".repeat(10_000));
    let built = build_prompt(&[old, new.clone()]);

    assert!(built.truncated);
    let conversation = conversation_of(&built.text);
    assert_eq!(conversation.chars().count(), MAX_PROMPT_CHARS);
    assert!(conversation.ends_with(&new[new.len() - 50..]));
    assert!(!conversation.contains("OLD-"));
}

#[test]
fn test_template_carries_the_summarization_instructions() {
    let built = build_prompt(&["bonjour".to_string()]);
    assert!(built.text.contains("en français"));
    assert!(built.text.contains("8 à 10 bullet points"));
    assert!(built.text.contains("Ignore les blagues"));
    assert!(built.text.ends_with("Résumé :"));
}

#[test]
fn test_build_is_deterministic() {
    let lines = vec!["même entrée".to_string()];
    assert_eq!(build_prompt(&lines).text, build_prompt(&lines).text);
}
