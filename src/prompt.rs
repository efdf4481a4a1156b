//! Instruction text sent to the completion service

/// Fixed instruction placed in front of every product title
pub const NORMALIZE_INSTRUCTION: &str
  = "normalize to title case; keep case of MSRP, roman numerals; replace $ with USD: ";

/// Prompt used by the settings screen connection test
pub const PROBE_PROMPT: &str = "what model are you? ";

/// Build the normalization prompt for a product title.
///
/// The title is appended verbatim. Empty titles are not rejected here; the
/// service decides what to do with them.
pub fn build_prompt(title: &str) -> String
{   let mut prompt = String::with_capacity(
      NORMALIZE_INSTRUCTION.len() + title.len()
    );
    prompt.push_str(NORMALIZE_INSTRUCTION);
    prompt.push_str(title);
    prompt
}
