// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_RULES: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Common instruction appended to every prompt that writes about the candidate.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Every claim about the candidate must come from the CANDIDATE PROFILE below. \
    Do NOT invent employers, titles, dates, degrees, certifications or metrics. \
    If the profile does not support a claim, omit it entirely.";

/// Fills `{name}` placeholders from `vars` in a single left-to-right pass.
///
/// Substituted values are copied verbatim and never rescanned, so a profile that
/// happens to contain `{job_description}` cannot pull other fields in twice.
/// Braces that do not name a known placeholder (JSON schema examples) are kept.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let substitution = tail[1..].find('}').and_then(|close| {
            let name = &tail[1..=close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close + 2))
        });
        match substitution {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_known_placeholders() {
        let out = render("Hi {name}, see {job}.", &[("name", "Sam"), ("job", "j1")]);
        assert_eq!(out, "Hi Sam, see j1.");
    }

    #[test]
    fn test_render_keeps_json_braces() {
        let template = r#"Schema: {"score": 8} for {name}"#;
        assert_eq!(
            render(template, &[("name", "Sam")]),
            r#"Schema: {"score": 8} for Sam"#
        );
    }

    #[test]
    fn test_render_does_not_expand_placeholders_inside_values() {
        let out = render(
            "P: {profile}\nD: {job_description}",
            &[("profile", "I love {job_description}"), ("job_description", "LONG")],
        );
        assert_eq!(out, "P: I love {job_description}\nD: LONG");
    }
}
