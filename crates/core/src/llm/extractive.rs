//! Deterministic last-resort response: scan the assembled prompt for known
//! financial-fact lines and reassemble them into a fixed template. Crude by
//! intent, and coupled to the narrative only through the marker substrings
//! below; fixture-prompt tests guard that coupling.

pub const BACKEND_NAME: &str = "extractive";

const VOLATILITY_MARKER: &str = "Annualized Volatility:";
const RETURN_MARKER: &str = "Return";
const SECTOR_MARKER: &str = "Sector:";

/// Never fails and never returns an empty string.
pub fn fallback(prompt: &str) -> String {
    let mut parts: Vec<String> = vec![
        "DECISION SUPPORT ANALYSIS:".to_string(),
        String::new(),
        "Based on the provided financial data and your preferences, here are the key considerations:".to_string(),
        String::new(),
    ];

    let lines: Vec<&str> = prompt.lines().collect();

    for line in &lines {
        if line.contains(VOLATILITY_MARKER) {
            parts.push(format!("- {}", line.trim()));
        }
    }
    for line in &lines {
        if line.contains(RETURN_MARKER) && line.contains('%') {
            parts.push(format!("- {}", line.trim()));
        }
    }
    for line in &lines {
        if line.contains(SECTOR_MARKER) {
            parts.push(format!("- {}", line.trim()));
        }
    }

    parts.extend([
        String::new(),
        "This analysis is based on historical data and should be considered alongside your personal investment constraints and risk tolerance.".to_string(),
        String::new(),
        "For more detailed analysis, ensure a language model service is running and reachable.".to_string(),
    ]);

    parts.join("\n")
}

/// Degraded answer for the document-only path: excerpt the top passages
/// instead of mining the prompt for metric lines.
pub fn passage_excerpt(passages: &[crate::retrieval::ScoredPassage]) -> String {
    let context: Vec<String> = passages
        .iter()
        .take(3)
        .map(|p| {
            let text = p.text.trim();
            let cut = text
                .char_indices()
                .nth(300)
                .map(|(i, _)| i)
                .unwrap_or(text.len());
            text[..cut].to_string()
        })
        .collect();

    format!("Based on the documents: {}", context.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::ScoredPassage;

    const FIXTURE_PROMPT: &str = "\
FINANCIAL DATA:
=== STOCK PROFILE: AAPL ===

BASIC INFORMATION:
  Sector: Technology
  Current Price: $187.32

RISK CHARACTERISTICS:
  Annualized Volatility: 22.0% (Moderate risk)

HISTORICAL PERFORMANCE:
  1-Month Return: +2.10%
  1-Year Return: +15.80%

USER QUESTION:
Is this stable enough for me?";

    #[test]
    fn extracts_fact_lines_from_fixture_prompt() {
        let out = fallback(FIXTURE_PROMPT);
        assert!(out.contains("- Annualized Volatility: 22.0% (Moderate risk)"));
        assert!(out.contains("- 1-Month Return: +2.10%"));
        assert!(out.contains("- 1-Year Return: +15.80%"));
        assert!(out.contains("- Sector: Technology"));
    }

    #[test]
    fn never_empty_even_without_markers() {
        let out = fallback("no financial facts here");
        assert!(!out.trim().is_empty());
        assert!(out.starts_with("DECISION SUPPORT ANALYSIS:"));
        assert!(out.contains("historical data"));
    }

    #[test]
    fn fallback_is_deterministic() {
        assert_eq!(fallback(FIXTURE_PROMPT), fallback(FIXTURE_PROMPT));
    }

    #[test]
    fn passage_excerpt_truncates_long_passages() {
        let long = "x".repeat(500);
        let passages = vec![
            ScoredPassage {
                text: long,
                source: "a".to_string(),
            },
            ScoredPassage {
                text: "short".to_string(),
                source: "b".to_string(),
            },
        ];
        let out = passage_excerpt(&passages);
        assert!(out.starts_with("Based on the documents: "));
        assert!(out.contains(&"x".repeat(300)));
        assert!(!out.contains(&"x".repeat(301)));
        assert!(out.contains("short"));
    }
}
