//! Grounding prompt for briefing generation.

use corridor_core::types::ScoredEntry;

/// Sentence the model must answer with when the context is insufficient.
pub const FALLBACK_SENTENCE: &str = "The requested information is not available in the current knowledge base.";

const ROLE: &str = "You are the Kenyan Wildlife Corridor Defense Agent, a highly specialized expert in Kenyan land law, ecological data, and historical land tenure.";

const TASK: &str = "Synthesize the provided context fragments into a professional, coherent, and evidence-based briefing document to answer the user's query.";

/// Context fragments in ranked order, each headed by `[n] source, page p`.
pub fn context_block(result: &[ScoredEntry]) -> String {
    result
        .iter()
        .enumerate()
        .map(|(i, hit)| format!("[{}] {}\n{}", i + 1, hit.entry.source_ref(), hit.entry.text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn assemble(result: &[ScoredEntry], query: &str) -> String {
    let context = context_block(result);
    format!(
        "**ROLE:** {ROLE}\n\n\
         **TASK:** {TASK}\n\n\
         **INSTRUCTIONS:**\n\
         1. **Strictly** use ONLY the provided context fragments below to answer the user's query.\n\
         2. Structure your response with clear, relevant headings based on the information available (e.g., **Legal Precedent/Status**, **Ecological Summary**, **Historical Context**, **Key Findings**, etc.).\n\
         3. Cite specific details from the context when making claims, referring to fragments by their [n] source reference.\n\
         4. If the context does not contain sufficient information to answer the query, clearly state: \"{FALLBACK_SENTENCE}\"\n\
         5. Be concise but comprehensive. Focus on the most relevant information for the query.\n\n\
         --- CONTEXT FRAGMENTS ---\n\
         {context}\n\n\
         --- USER QUERY ---\n\
         {query}\n\n\
         --- BRIEFING DOCUMENT ---\n"
    )
}
