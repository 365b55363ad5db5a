//! Prompts sent to the relevance judge

use crate::types::{MAX_VERDICT_SCORE, MIN_VERDICT_SCORE};

/// Literal description of the expected output shape
pub const OUTPUT_SHAPE: &str = r#"{"score": <integer 1-10>, "reasoning": "<string>"}"#;

/// Initial prompt asking for a relevance verdict on one document
pub fn evaluation_prompt(query: &str, document: &str) -> String {
    format!(
        "You are evaluating the results of a search engine over movie reviews.\n\
         Rate how relevant the document below is to the search query on a scale \
         from {min} (completely irrelevant) to {max} (perfectly relevant), and \
         briefly explain why.\n\n\
         Search query:\n{query}\n\n\
         Document:\n{document}\n\n\
         Respond with a single JSON object and nothing else, exactly in this shape:\n\
         {shape}",
        min = MIN_VERDICT_SCORE,
        max = MAX_VERDICT_SCORE,
        query = query,
        document = document,
        shape = OUTPUT_SHAPE,
    )
}

/// Follow-up prompt asking the judge to fix a response that failed to parse.
///
/// Repeats the query alongside the rejected response.
pub fn repair_prompt(query: &str, previous_response: &str, error: &str) -> String {
    format!(
        "Your previous response could not be parsed.\n\n\
         Search query:\n{query}\n\n\
         Previous response:\n{previous}\n\n\
         Problem: {error}\n\n\
         Reply again with only the corrected JSON object, in exactly this shape:\n\
         {shape}",
        query = query,
        previous = previous_response,
        error = error,
        shape = OUTPUT_SHAPE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluation_prompt_embeds_inputs_and_shape() {
        let prompt = evaluation_prompt("films with great acting", "The acting was superb.");
        assert!(prompt.contains("films with great acting"));
        assert!(prompt.contains("The acting was superb."));
        assert!(prompt.contains(OUTPUT_SHAPE));
    }

    #[test]
    fn repair_prompt_quotes_previous_response_verbatim() {
        let previous = "Score: 7 because {reasons}";
        let prompt = repair_prompt("courtroom dramas", previous, "invalid JSON: expected value");
        assert!(prompt.starts_with("Your previous response"));
        assert!(prompt.contains("courtroom dramas"));
        assert!(prompt.contains(previous));
        assert!(prompt.contains("invalid JSON: expected value"));
        assert!(prompt.contains(OUTPUT_SHAPE));
    }
}
