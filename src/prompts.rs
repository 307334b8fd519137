//! The extraction instruction sent to the model.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the extraction behaviour means
//!    editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the assembled prompt directly
//!    without a live model, making prompt regressions easy to catch.

/// Default prompt text offered to the user before they type their own.
pub const DEFAULT_USER_PROMPT: &str =
    "CODIGÓ VENTA, CODIGO, CANTIDAD, DESCRIPCIÓN, PRECIO, SUBTOTAL, TOTAL A PAGAR";

/// Assemble the full instruction payload for one extraction.
///
/// Embeds the verbatim user prompt and the full extracted PDF text, and
/// instructs the model to respond with a JSON array of uniform objects —
/// and nothing else. An empty array is the legal "no data found" answer.
pub fn build_extraction_prompt(user_prompt: &str, pdf_text: &str) -> String {
    format!(
        r#"You are an expert data extraction assistant.
Your task is to analyze the provided text content from a PDF document and extract the specific data requested by the user.
The user wants to extract the following information: "{user_prompt}".

Based on this request, extract the relevant data and format it as a JSON array of objects.
Each object in the array should represent a single record or item.
The keys of the objects should be descriptive column headers based on the user's request.
The values should be the extracted data points.

Here is the text from the PDF:
---
{pdf_text}
---

IMPORTANT: Only return a valid JSON array. Do not include any other text, explanations, or markdown formatting like ```json. Your entire response must be the JSON data itself. If no relevant data is found, return an empty array []."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_user_request_verbatim() {
        let p = build_extraction_prompt("invoice number, total", "some text");
        assert!(p.contains("\"invoice number, total\""));
        assert!(p.contains("some text"));
    }

    #[test]
    fn prompt_demands_bare_json_array() {
        let p = build_extraction_prompt("x", "y");
        assert!(p.contains("Only return a valid JSON array"));
        assert!(p.contains("return an empty array []"));
    }
}
