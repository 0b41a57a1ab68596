use corridor_core::types::{IndexEntry, Meta, ScoredEntry, META_PAGE, META_SOURCE};
use corridor_generate::prompt::context_block;
use corridor_generate::{assemble, strip_wrapper, FALLBACK_SENTENCE};

fn hit(text: &str, source: &str, page: Option<&str>, score: f32) -> ScoredEntry {
    let mut meta = Meta::new();
    meta.insert(META_SOURCE.to_string(), source.to_string());
    if let Some(p) = page {
        meta.insert(META_PAGE.to_string(), p.to_string());
    }
    ScoredEntry {
        entry: IndexEntry { id: format!("{source}:0"), vector: vec![], text: text.to_string(), source_metadata: meta, collection: "c".into() },
        score,
    }
}

#[test]
fn prompt_contains_query_context_and_contract() {
    let hits = vec![
        hit("The 2019 ruling upheld community title.", "docs/ruling.pdf", Some("3"), 0.9),
        hit("Elephants use the Kitengela corridor.", "docs/ecology.txt", None, 0.7),
    ];
    let prompt = assemble(&hits, "Who owns the corridor land?");

    assert!(prompt.contains("Who owns the corridor land?"));
    assert!(prompt.contains(FALLBACK_SENTENCE));
    assert!(prompt.contains("**Legal Precedent/Status**"));
    assert!(prompt.contains("**Ecological Summary**"));
    assert!(prompt.contains("**Historical Context**"));
    assert!(prompt.contains("use ONLY the provided context fragments"));
    assert!(prompt.contains("[1] docs/ruling.pdf, page 3\nThe 2019 ruling upheld community title."));
    assert!(prompt.contains("[2] docs/ecology.txt\nElephants use the Kitengela corridor."));
}

#[test]
fn fragments_keep_ranked_order() {
    let hits = vec![hit("first", "a", None, 0.9), hit("second", "b", None, 0.5)];
    let block = context_block(&hits);
    assert!(block.find("first").unwrap() < block.find("second").unwrap());
}

#[test]
fn empty_result_still_requests_the_fallback() {
    let prompt = assemble(&[], "plumbing permits");
    assert!(prompt.contains("--- CONTEXT FRAGMENTS ---\n\n\n--- USER QUERY ---\nplumbing permits"));
    assert!(prompt.contains(FALLBACK_SENTENCE));
    assert!(prompt.ends_with("--- BRIEFING DOCUMENT ---\n"));
}

#[test]
fn strip_wrapper_handles_fences_and_whitespace() {
    assert_eq!(strip_wrapper("  **Key Findings**\nNone.\n\n"), "**Key Findings**\nNone.");
    assert_eq!(strip_wrapper("```markdown\n**Key Findings**\n- a\n```"), "**Key Findings**\n- a");
    assert_eq!(strip_wrapper("```\nplain\n```"), "plain");
    assert_eq!(strip_wrapper("Use ``` sparingly"), "Use ``` sparingly");
    assert_eq!(strip_wrapper(""), "");
}
