//! Prompt assembly. The system block and its five behavioral rules are a
//! fixed contract: downstream acceptance of generated text is instructional,
//! not filtered, so the wording here must stay stable.

/// Invariant system instruction block. The numbered rules are load-bearing;
/// tests assert on them verbatim.
pub const SYSTEM_INSTRUCTIONS: &str = "\
You are a financial decision support analyst. Your role is to provide \
structured, objective insights that help users understand investment \
characteristics and trade-offs, NOT to recommend specific actions.

CORE PRINCIPLES:
1. NEVER recommend \"buy\", \"sell\", or \"hold\"
2. EXPLAIN implications and trade-offs, don't make judgments
3. HIGHLIGHT alignments and misalignments with user preferences and rules
4. FRAME historical data as contextual evidence, not predictions
5. MAINTAIN exploratory tone: \"This suggests...\" not \"You should...\"

ANALYSIS STRUCTURE:
- Synthesize financial data with user preferences and constraints
- Identify key considerations relevant to the user's question
- Explain trade-offs between different characteristics
- Flag any conflicts between stock characteristics and stated rules
- Present information in a balanced, informative manner";

const CLOSING_INSTRUCTIONS: &str = "\
INSTRUCTIONS:
Provide a comprehensive analysis that:
1. Directly addresses the user's question
2. Interprets financial data through the lens of their preferences
3. Highlights alignment or misalignment with any stated rules
4. Explains relevant trade-offs and considerations
5. Avoids making recommendations or decisions

Your response should help the user understand the investment characteristics \
and how they relate to their stated preferences and constraints, while \
leaving the ultimate decision to them.

ANALYSIS:";

/// Compose the analysis prompt in fixed order: system block, preference
/// guidance, financial narrative, rules (omitted entirely when empty), user
/// question, closing instructions.
pub fn assemble(
    query: &str,
    financial_narrative: &str,
    rules_text: &str,
    preference_guidance: &str,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(SYSTEM_INSTRUCTIONS.to_string());
    parts.push(preference_guidance.to_string());
    parts.push(format!("FINANCIAL DATA:\n{financial_narrative}"));
    if !rules_text.trim().is_empty() {
        parts.push(format!("RELEVANT RULES AND CONSTRAINTS:\n{rules_text}"));
    }
    parts.push(format!("USER QUESTION:\n{query}"));
    parts.push(CLOSING_INSTRUCTIONS.to_string());

    parts.join("\n\n")
}

/// Context-stuffed QA prompt for the document-only path.
pub fn assemble_document_answer(query: &str, context: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end.\n\
         If you don't know the answer based on the context, just say that you \
         don't know, don't try to make up an answer.\n\
         Always provide a complete, well-structured answer based on the context.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {query}\n\
         \n\
         Answer: "
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_rules_are_present_verbatim() {
        let prompt = assemble("q", "data", "", "guidance");
        assert!(prompt.contains("1. NEVER recommend \"buy\", \"sell\", or \"hold\""));
        assert!(prompt.contains("2. EXPLAIN implications and trade-offs"));
        assert!(prompt.contains("3. HIGHLIGHT alignments and misalignments"));
        assert!(prompt.contains("4. FRAME historical data as contextual evidence"));
        assert!(prompt.contains("5. MAINTAIN exploratory tone"));
    }

    #[test]
    fn blocks_follow_fixed_order() {
        let prompt = assemble("the question", "the narrative", "the rules", "the guidance");
        let system = prompt.find("financial decision support analyst").unwrap();
        let guidance = prompt.find("the guidance").unwrap();
        let data = prompt.find("FINANCIAL DATA:").unwrap();
        let rules = prompt.find("RELEVANT RULES AND CONSTRAINTS:").unwrap();
        let question = prompt.find("USER QUESTION:").unwrap();
        let closing = prompt.find("INSTRUCTIONS:").unwrap();
        assert!(system < guidance && guidance < data && data < rules);
        assert!(rules < question && question < closing);
    }

    #[test]
    fn rules_block_is_omitted_when_empty() {
        let prompt = assemble("q", "data", "", "guidance");
        assert!(!prompt.contains("RELEVANT RULES AND CONSTRAINTS:"));

        let with_rules = assemble("q", "data", "[Rule 1] no leverage", "guidance");
        assert!(with_rules.contains("RELEVANT RULES AND CONSTRAINTS:\n[Rule 1] no leverage"));
    }

    #[test]
    fn document_prompt_embeds_context_and_question() {
        let prompt = assemble_document_answer("what applies?", "passage text");
        assert!(prompt.contains("Context:\npassage text"));
        assert!(prompt.contains("Question: what applies?"));
        assert!(prompt.ends_with("Answer: "));
    }
}
