//! LLM relevance judge with a bounded self-correction loop
//!
//! The judge asks a [`TextGenerator`] for a JSON verdict and, when the reply
//! cannot be parsed, feeds the reply and the parse error back in a repair
//! prompt. The loop is bounded by `JudgeConfig::max_attempts`, counting every
//! generation call.

mod parse;
mod prompt;

pub use parse::{parse_verdict, VerdictParseError};
pub use prompt::{evaluation_prompt, repair_prompt, OUTPUT_SHAPE};

use crate::config::JudgeConfig;
use crate::error::{Error, Result};
use crate::generation::{GenerationError, TextGenerator};
use crate::types::{Document, Verdict};
use crate::util::truncate_str;
use tracing::{debug, warn};

/// A verdict plus how many repair prompts it took to get it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgedVerdict {
    pub verdict: Verdict,
    /// Generation calls after the first one
    pub repair_rounds: usize,
}

/// Scores the relevance of a document to a query through a text generator
#[derive(Debug, Clone)]
pub struct RelevanceJudge {
    config: JudgeConfig,
}

impl RelevanceJudge {
    pub fn new(config: JudgeConfig) -> Result<Self> {
        if config.max_attempts == 0 {
            return Err(Error::invalid("judge max_attempts must be at least 1"));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    /// Verdict for `document` against `query`
    pub async fn evaluate(
        &self,
        query: &str,
        document: &Document,
        generator: &dyn TextGenerator,
    ) -> Result<Verdict> {
        Ok(self.evaluate_traced(query, document, generator).await?.verdict)
    }

    /// Like [`evaluate`](Self::evaluate), also reporting the repair rounds used.
    ///
    /// Fails with `JudgeUnparseable` once `max_attempts` calls have produced no
    /// valid verdict, and with `JudgeTimeout` as soon as one call overruns.
    pub async fn evaluate_traced(
        &self,
        query: &str,
        document: &Document,
        generator: &dyn TextGenerator,
    ) -> Result<JudgedVerdict> {
        let max_attempts = self.config.max_attempts;
        let mut prompt = evaluation_prompt(query, &document.text);
        let mut last_response = String::new();

        for attempt in 1..=max_attempts {
            debug!(
                "Judging row {} (attempt {}/{}) via {}",
                document.row,
                attempt,
                max_attempts,
                generator.name()
            );

            let response = match self.generate(generator, &prompt, attempt).await {
                Ok(response) => response,
                // An empty reply is malformed output like any other
                Err(Error::Generation(GenerationError::EmptyResponse)) => String::new(),
                Err(e) => return Err(e),
            };

            match parse_verdict(&response) {
                Ok(verdict) => {
                    debug!(
                        "Row {} scored {} after {} repair round(s)",
                        document.row,
                        verdict.score(),
                        attempt - 1
                    );
                    return Ok(JudgedVerdict {
                        verdict,
                        repair_rounds: attempt - 1,
                    });
                }
                Err(e) => {
                    warn!(
                        "Unparseable judge response for row {} (attempt {}/{}): {}; response: {:?}",
                        document.row,
                        attempt,
                        max_attempts,
                        e,
                        truncate_str(&response, 200)
                    );
                    prompt = repair_prompt(query, &response, &e.to_string());
                    last_response = response;
                }
            }
        }

        Err(Error::JudgeUnparseable {
            attempts: max_attempts,
            last_response,
        })
    }

    async fn generate(&self, generator: &dyn TextGenerator, prompt: &str, attempt: usize) -> Result<String> {
        match self.config.timeout() {
            Some(timeout) => tokio::time::timeout(timeout, generator.generate(prompt))
                .await
                .map_err(|_| {
                    warn!("Judge call timed out after {:?} (attempt {})", timeout, attempt);
                    Error::JudgeTimeout { attempt, timeout }
                })?
                .map_err(Error::from),
            None => Ok(generator.generate(prompt).await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationResult;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replays canned responses and records every prompt it receives
    struct ScriptedGenerator {
        responses: Mutex<VecDeque<GenerationResult<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<GenerationResult<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn replies(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        fn calls(&self) -> usize {
            self.prompts.lock().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> GenerationResult<String> {
            self.prompts.lock().push(prompt.to_string());
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok("no more scripted responses".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct StalledGenerator;

    #[async_trait]
    impl TextGenerator for StalledGenerator {
        async fn generate(&self, _prompt: &str) -> GenerationResult<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(r#"{"score": 5, "reasoning": "late"}"#.to_string())
        }

        fn name(&self) -> &str {
            "stalled"
        }
    }

    fn judge(max_attempts: usize) -> RelevanceJudge {
        RelevanceJudge::new(JudgeConfig {
            max_attempts,
            timeout_secs: Some(5),
        })
        .unwrap()
    }

    fn document() -> Document {
        Document::new(3, "A slow burn thriller with a stellar lead performance.")
    }

    #[tokio::test]
    async fn valid_first_response_needs_no_repair() {
        let generator = ScriptedGenerator::replies(&[r#"{"score": 9, "reasoning": "On topic."}"#]);
        let judged = judge(5)
            .evaluate_traced("thrillers with strong acting", &document(), &generator)
            .await
            .unwrap();

        assert_eq!(judged.verdict.score(), 9);
        assert_eq!(judged.repair_rounds, 0);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn two_malformed_responses_then_valid() {
        let generator = ScriptedGenerator::replies(&[
            "I think it's quite relevant!",
            r#"{"score": "high", "reasoning": "nope"}"#,
            "```json\n{\"score\": 6, \"reasoning\": \"Partly relevant.\"}\n```",
        ]);
        let judged = judge(5)
            .evaluate_traced("thrillers", &document(), &generator)
            .await
            .unwrap();

        assert_eq!(judged.verdict.score(), 6);
        assert_eq!(judged.repair_rounds, 2);
        assert_eq!(generator.calls(), 3);

        let prompts = generator.prompts.lock();
        assert!(prompts[0].contains("thrillers"));
        assert!(prompts[1].contains("I think it's quite relevant!"));
        assert!(prompts[2].contains(r#""score": "high""#));
    }

    #[tokio::test]
    async fn exhausting_attempts_reports_last_response() {
        let generator = ScriptedGenerator::replies(&["one", "two", "three", "four"]);
        let err = judge(3)
            .evaluate("thrillers", &document(), &generator)
            .await
            .unwrap_err();

        assert_eq!(generator.calls(), 3);
        match err {
            Error::JudgeUnparseable {
                attempts,
                last_response,
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_response, "three");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn out_of_range_score_triggers_repair() {
        let generator = ScriptedGenerator::replies(&[
            r#"{"score": 42, "reasoning": "very"}"#,
            r#"{"score": 10, "reasoning": "very"}"#,
        ]);
        let judged = judge(5)
            .evaluate_traced("thrillers", &document(), &generator)
            .await
            .unwrap();
        assert_eq!(judged.verdict.score(), 10);
        assert_eq!(judged.repair_rounds, 1);
        let prompts = generator.prompts.lock();
        assert!(prompts[1].contains("outside the range"));
        assert!(prompts[1].contains("thrillers"));
    }

    #[tokio::test]
    async fn empty_response_is_repaired() {
        let generator = ScriptedGenerator::new(vec![
            Err(GenerationError::EmptyResponse),
            Ok(r#"{"score": 4, "reasoning": "Tangential."}"#.to_string()),
        ]);
        let judged = judge(2)
            .evaluate_traced("thrillers", &document(), &generator)
            .await
            .unwrap();
        assert_eq!(judged.repair_rounds, 1);
    }

    #[tokio::test]
    async fn transport_errors_are_not_retried() {
        let generator = ScriptedGenerator::new(vec![Err(GenerationError::Api {
            status: 500,
            message: "boom".to_string(),
        })]);
        let err = judge(5)
            .evaluate("thrillers", &document(), &generator)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Generation(GenerationError::Api { status: 500, .. })));
        assert!(err.is_judge_failure());
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn slow_generator_times_out() {
        let judge = RelevanceJudge::new(JudgeConfig {
            max_attempts: 5,
            timeout_secs: Some(1),
        })
        .unwrap();
        let err = judge
            .evaluate("thrillers", &document(), &StalledGenerator)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::JudgeTimeout { attempt: 1, .. }));
        assert!(err.is_judge_failure());
    }

    #[test]
    fn zero_attempts_is_invalid() {
        let result = RelevanceJudge::new(JudgeConfig {
            max_attempts: 0,
            timeout_secs: None,
        });
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
