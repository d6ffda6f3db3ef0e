//! Prompt assembly.

/// Separator placed between the chunk text and the question.
pub const PROMPT_SEPARATOR: &str = "\n\n";

/// Compose the user prompt for one request: the content followed by a blank
/// line and the question. Neither part is trimmed or escaped.
pub fn build_prompt(content: &str, question: &str) -> String {
    let mut prompt = String::with_capacity(content.len() + PROMPT_SEPARATOR.len() + question.len());
    prompt.push_str(content);
    prompt.push_str(PROMPT_SEPARATOR);
    prompt.push_str(question);
    prompt
}
