use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::state::{PipelineState, Stage, Trail};
use super::{AnalysisOutcome, PipelineError, SummaryAdvice};
use crate::config::{
    LlmConfig, PipelineOptions, DEFAULT_ANALYSIS_MAX_TOKENS, DEFAULT_SUMMARY_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};
use crate::extract::ResponseExtractor;
use crate::llm::{CompletionClient, TransportFailure};
use crate::news::NewsInput;
use crate::prompt::{analysis_prompt, summary_advice_prompt};
use crate::schema::{validate, AnalysisResult, SchemaTemplate, ANALYSIS_TEMPLATE};
use crate::{preview, TARGET_LLM_REQUEST, TARGET_PIPELINE};

/// Sampling parameters passed with each call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Generation {
    pub temperature: f32,
    pub analysis_max_tokens: u32,
    pub summary_max_tokens: u32,
}

impl Default for Generation {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            analysis_max_tokens: DEFAULT_ANALYSIS_MAX_TOKENS,
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
        }
    }
}

impl From<&LlmConfig> for Generation {
    fn from(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            analysis_max_tokens: config.analysis_max_tokens,
            summary_max_tokens: config.summary_max_tokens,
        }
    }
}

/// Drives one news item through prompt, primary call, extraction,
/// validation and the optional summary call.
///
/// Holds no per-run state, so a single orchestrator can serve any number
/// of runs, sequentially or concurrently.
pub struct Orchestrator<C> {
    client: C,
    template: &'static SchemaTemplate,
    extractor: ResponseExtractor,
    options: PipelineOptions,
    generation: Generation,
}

impl<C: CompletionClient> Orchestrator<C> {
    pub fn new(client: C, options: PipelineOptions) -> Self {
        Self {
            client,
            template: &ANALYSIS_TEMPLATE,
            extractor: ResponseExtractor::default(),
            options,
            generation: Generation::default(),
        }
    }

    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_template(mut self, template: &'static SchemaTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_extractor(mut self, extractor: ResponseExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub async fn analyze(&self, text: &str) -> Result<AnalysisOutcome, PipelineError> {
        self.analyze_with_cancel(text, None).await
    }

    /// Like [`Orchestrator::analyze`], abandoning the run once `cancel`
    /// flips to `true`. A dropped sender never cancels.
    pub async fn analyze_with_cancel(
        &self,
        text: &str,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let news = NewsInput::new(text).ok_or(PipelineError::EmptyInput)?;
        self.run(news, cancel).await
    }

    pub async fn run(
        &self,
        news: NewsInput,
        mut cancel: Option<watch::Receiver<bool>>,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let run_id = Uuid::new_v4();
        let mut trail = Trail::new(run_id);
        info!(target: TARGET_PIPELINE, "[run {}]: analyzing news: {}", run_id, preview(news.as_str(), 80));

        trail.advance(PipelineState::Prompting);
        let prompt = analysis_prompt(&news, self.template);
        debug!(target: TARGET_PIPELINE, "[run {}]: built prompt for template {} ({} chars)", run_id, self.template.version, prompt.chars().count());

        trail.advance(PipelineState::AwaitingPrimary);
        let raw = match self.primary_call(run_id, &prompt, &mut cancel).await {
            Ok(raw) => raw,
            Err(err) => {
                trail.fail();
                return Err(err);
            }
        };

        trail.advance(PipelineState::Extracting);
        let extraction = match self.extractor.extract(&raw) {
            Ok(extraction) => extraction,
            Err(failure) => {
                trail.fail();
                error!(target: TARGET_PIPELINE, "[run {}]: {}. Raw reply: {}", run_id, failure, preview(&failure.raw_text, 500));
                return Err(PipelineError::Extraction(failure));
            }
        };

        trail.advance(PipelineState::Validating);
        let validated = match validate(&extraction.candidate, self.template, self.options.validation) {
            Ok(validated) => validated,
            Err(failure) => {
                trail.fail();
                error!(target: TARGET_PIPELINE, "[run {}]: {}", run_id, failure);
                return Err(PipelineError::Validation(failure));
            }
        };
        if !validated.warnings.is_empty() {
            info!(target: TARGET_PIPELINE, "[run {}]: analysis valid with {} tolerated omission(s)", run_id, validated.warnings.len());
        }

        trail.advance(PipelineState::AwaitingSummary);
        let summary = if self.options.summarize {
            match self.summary_call(run_id, &news, &validated.result, &mut cancel).await {
                Ok(summary) => summary,
                Err(err) => {
                    trail.fail();
                    return Err(err);
                }
            }
        } else {
            SummaryAdvice::Absent {
                reason: "summary disabled".to_string(),
            }
        };

        trail.advance(PipelineState::Done);
        info!(target: TARGET_PIPELINE, "[run {}]: done", run_id);

        Ok(AnalysisOutcome {
            run_id,
            news,
            analysis: validated.result,
            warnings: validated.warnings,
            extraction_strategy: extraction.strategy,
            summary,
            trail: trail.into_states(),
        })
    }

    /// Primary call with optional retries. Only transport failures are
    /// retried; the backoff doubles after each attempt.
    async fn primary_call(
        &self,
        run_id: Uuid,
        prompt: &str,
        cancel: &mut Option<watch::Receiver<bool>>,
    ) -> Result<String, PipelineError> {
        let max_attempts = self.options.primary_attempts.max(1);
        let mut backoff = self.options.retry_backoff;
        let mut attempt = 1;

        loop {
            debug!(target: TARGET_LLM_REQUEST, "[run {}]: sending analysis request ({}/{})", run_id, attempt, max_attempts);
            match self
                .call(Stage::AwaitingPrimary, prompt, self.generation.analysis_max_tokens, cancel)
                .await
            {
                Ok(raw) => {
                    debug!(target: TARGET_LLM_REQUEST, "[run {}]: analysis reply received: {}", run_id, preview(&raw, 200));
                    return Ok(raw);
                }
                Err(PipelineError::Transport { failure, .. }) if attempt < max_attempts => {
                    warn!(target: TARGET_LLM_REQUEST, "[run {}]: analysis request failed: {}", run_id, failure);
                    debug!(target: TARGET_LLM_REQUEST, "[run {}]: backing off for {:?} before retry", run_id, backoff);
                    sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(err) => {
                    if let PipelineError::Transport { failure, .. } = &err {
                        error!(target: TARGET_LLM_REQUEST, "[run {}]: analysis request failed after {} attempt(s): {}", run_id, attempt, failure);
                    }
                    return Err(err);
                }
            }
        }
    }

    /// The summary leg absorbs transport failures; only cancellation escapes.
    async fn summary_call(
        &self,
        run_id: Uuid,
        news: &NewsInput,
        analysis: &AnalysisResult,
        cancel: &mut Option<watch::Receiver<bool>>,
    ) -> Result<SummaryAdvice, PipelineError> {
        let prompt = summary_advice_prompt(news, analysis);
        debug!(target: TARGET_LLM_REQUEST, "[run {}]: sending summary request", run_id);

        match self
            .call(Stage::AwaitingSummary, &prompt, self.generation.summary_max_tokens, cancel)
            .await
        {
            Ok(text) if text.trim().is_empty() => {
                warn!(target: TARGET_LLM_REQUEST, "[run {}]: summary reply was empty", run_id);
                Ok(SummaryAdvice::Absent {
                    reason: "empty summary reply".to_string(),
                })
            }
            Ok(text) => Ok(SummaryAdvice::Provided(text.trim().to_string())),
            Err(PipelineError::Transport { failure, .. }) => {
                warn!(target: TARGET_LLM_REQUEST, "[run {}]: summary unavailable: {}", run_id, failure);
                Ok(SummaryAdvice::Absent {
                    reason: failure.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// One bounded, cancellable call to the client.
    async fn call(
        &self,
        stage: Stage,
        prompt: &str,
        max_tokens: u32,
        cancel: &mut Option<watch::Receiver<bool>>,
    ) -> Result<String, PipelineError> {
        let limit = self.options.call_timeout;
        let request = timeout(
            limit,
            self.client
                .complete(prompt, max_tokens, self.generation.temperature),
        );

        let outcome = match cancel.as_mut() {
            Some(rx) => {
                let flagged = *rx.borrow();
                if flagged {
                    return Err(PipelineError::Cancelled { stage });
                }
                tokio::select! {
                    outcome = request => outcome,
                    _ = cancelled(rx) => {
                        warn!(target: TARGET_PIPELINE, "Cancelled while {}", stage);
                        return Err(PipelineError::Cancelled { stage });
                    }
                }
            }
            None => request.await,
        };

        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(failure)) => Err(PipelineError::Transport { stage, failure }),
            Err(_) => Err(PipelineError::Transport {
                stage,
                failure: TransportFailure::Timeout(limit),
            }),
        }
    }
}

/// Resolves once the flag is set. Pends forever if the sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    let closed = rx.wait_for(|flag| *flag).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationMode;
    use crate::report;
    use crate::schema::fixtures::{fenced_reply, sample_analysis};
    use crate::schema::ValidationFailure;
    use crate::scoring::score;
    use chrono::{Local, TimeZone};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use std::sync::Mutex;

    const NEWS: &str = "Company X reports 20% revenue growth amid strong chip demand";
    const ADVICE: &str = "建議逢低布局半導體，留意匯率風險。";

    /// Replays canned replies in order and records every request.
    struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String, TransportFailure>>>,
        calls: Mutex<Vec<(String, u32)>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<String, TransportFailure>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            prompt: &str,
            max_tokens: u32,
            _temperature: f32,
        ) -> Result<String, TransportFailure> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), max_tokens));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportFailure::Network("script exhausted".into())))
        }
    }

    /// Never answers within any reasonable test timeout.
    struct SlowClient;

    impl CompletionClient for SlowClient {
        async fn complete(
            &self,
            _prompt: &str,
            _max_tokens: u32,
            _temperature: f32,
        ) -> Result<String, TransportFailure> {
            sleep(Duration::from_secs(30)).await;
            Ok(String::new())
        }
    }

    /// Answers the analysis call, then stalls on the summary call.
    struct StallingClient {
        calls: AtomicUsize,
    }

    impl StallingClient {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl CompletionClient for StallingClient {
        async fn complete(
            &self,
            _prompt: &str,
            _max_tokens: u32,
            _temperature: f32,
        ) -> Result<String, TransportFailure> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(fenced_reply());
            }
            sleep(Duration::from_secs(30)).await;
            Ok(ADVICE.to_string())
        }
    }

    fn unavailable() -> TransportFailure {
        TransportFailure::Status {
            status_code: 503,
            body: "{\"error\":\"overloaded\"}".to_string(),
        }
    }

    fn orchestrator(replies: Vec<Result<String, TransportFailure>>) -> Orchestrator<ScriptedClient> {
        Orchestrator::new(ScriptedClient::new(replies), PipelineOptions::default())
    }

    #[tokio::test]
    async fn test_reaches_done_with_summary() {
        let orchestrator = orchestrator(vec![Ok(fenced_reply()), Ok(format!("  {}\n", ADVICE))]);
        let outcome = orchestrator.analyze(NEWS).await.unwrap();

        assert_eq!(
            outcome.trail,
            vec![
                PipelineState::Idle,
                PipelineState::Prompting,
                PipelineState::AwaitingPrimary,
                PipelineState::Extracting,
                PipelineState::Validating,
                PipelineState::AwaitingSummary,
                PipelineState::Done,
            ]
        );
        assert_eq!(outcome.summary, SummaryAdvice::Provided(ADVICE.to_string()));
        assert_eq!(outcome.extraction_strategy, "fenced-block");
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.analysis.market_impact.macro_economy.gdp.impact, "較大");
        assert_eq!(outcome.analysis.summary.key_points.len(), 2);

        let calls = orchestrator.client().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, DEFAULT_ANALYSIS_MAX_TOKENS);
        assert!(calls[0].0.contains(NEWS));
        assert_eq!(calls[1].1, DEFAULT_SUMMARY_MAX_TOKENS);
        // The summary prompt quotes the validated analysis.
        assert!(calls[1].0.contains("- GDP: 較大"));
    }

    #[tokio::test]
    async fn test_summary_failure_is_absorbed() {
        let orchestrator = orchestrator(vec![Ok(fenced_reply()), Err(unavailable())]);
        let outcome = orchestrator.analyze(NEWS).await.unwrap();

        assert_eq!(outcome.trail.last(), Some(&PipelineState::Done));
        match &outcome.summary {
            SummaryAdvice::Absent { reason } => assert!(reason.contains("503")),
            other => panic!("expected absent summary, got {:?}", other),
        }
        assert_eq!(outcome.analysis.market_impact.macro_economy.gdp.impact, "較大");
    }

    #[tokio::test]
    async fn test_empty_summary_reply_is_absent() {
        let orchestrator = orchestrator(vec![Ok(fenced_reply()), Ok("   ".to_string())]);
        let outcome = orchestrator.analyze(NEWS).await.unwrap();
        assert!(outcome.summary.text().is_none());
    }

    #[tokio::test]
    async fn test_summary_disabled_makes_one_call() {
        let options = PipelineOptions {
            summarize: false,
            ..PipelineOptions::default()
        };
        let orchestrator = Orchestrator::new(ScriptedClient::new(vec![Ok(fenced_reply())]), options);
        let outcome = orchestrator.analyze(NEWS).await.unwrap();

        assert_eq!(orchestrator.client().calls().len(), 1);
        assert!(matches!(outcome.summary, SummaryAdvice::Absent { .. }));
        assert_eq!(outcome.trail.last(), Some(&PipelineState::Done));
    }

    #[tokio::test]
    async fn test_primary_failure_is_fatal() {
        let orchestrator = orchestrator(vec![Err(TransportFailure::Status {
            status_code: 401,
            body: "{\"error\":\"invalid api key\"}".to_string(),
        })]);
        let err = orchestrator.analyze(NEWS).await.unwrap_err();

        assert_eq!(err.stage(), Some(Stage::AwaitingPrimary));
        assert_eq!(err.raw_payload(), Some("{\"error\":\"invalid api key\"}"));
        assert!(matches!(
            err,
            PipelineError::Transport {
                failure: TransportFailure::Status { status_code: 401, .. },
                ..
            }
        ));
        // No summary attempt after a primary failure.
        assert_eq!(orchestrator.client().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_extraction_failure_keeps_raw_text() {
        let options = PipelineOptions {
            primary_attempts: 3,
            retry_backoff: Duration::from_millis(1),
            ..PipelineOptions::default()
        };
        let reply = "I cannot help with that.";
        let orchestrator = Orchestrator::new(ScriptedClient::new(vec![Ok(reply.to_string())]), options);
        let err = orchestrator.analyze(NEWS).await.unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Extracting));
        assert_eq!(err.raw_payload(), Some(reply));
        // Extraction failures are never retried.
        assert_eq!(orchestrator.client().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_candidate() {
        let mut analysis = sample_analysis();
        analysis["market_impact"]["macro_economy"]["gdp"]
            .as_object_mut()
            .unwrap()
            .remove("impact");
        let candidate = analysis.to_string();
        let orchestrator = orchestrator(vec![Ok(format!("結果如下 {} 完畢", candidate))]);
        let err = orchestrator.analyze(NEWS).await.unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Validating));
        assert_eq!(err.raw_payload(), Some(candidate.as_str()));
        match err {
            PipelineError::Validation(ValidationFailure::SchemaMismatch { errors, .. }) => {
                assert_eq!(errors[0].path, "market_impact.macro_economy.gdp.impact");
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
        // The summary call is never issued before validation succeeds.
        assert_eq!(orchestrator.client().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_missing_list() {
        let mut analysis = sample_analysis();
        analysis["summary"]
            .as_object_mut()
            .unwrap()
            .remove("related_entities");
        let options = PipelineOptions {
            validation: ValidationMode::Strict,
            ..PipelineOptions::default()
        };
        let orchestrator = Orchestrator::new(
            ScriptedClient::new(vec![Ok(analysis.to_string())]),
            options,
        );
        let err = orchestrator.analyze(NEWS).await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Validating));
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_call() {
        let orchestrator = orchestrator(vec![Ok(fenced_reply())]);
        let err = orchestrator.analyze(" \n\t ").await.unwrap_err();

        assert!(matches!(err, PipelineError::EmptyInput));
        assert_eq!(err.stage(), None);
        assert!(orchestrator.client().calls().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_a_transport_failure() {
        let options = PipelineOptions {
            call_timeout: Duration::from_millis(50),
            ..PipelineOptions::default()
        };
        let orchestrator = Orchestrator::new(SlowClient, options);
        let err = orchestrator.analyze(NEWS).await.unwrap_err();

        match err {
            PipelineError::Transport {
                stage: Stage::AwaitingPrimary,
                failure: TransportFailure::Timeout(after),
            } => assert_eq!(after, Duration::from_millis(50)),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_summary_timeout_is_absorbed() {
        let options = PipelineOptions {
            call_timeout: Duration::from_millis(50),
            ..PipelineOptions::default()
        };
        let orchestrator = Orchestrator::new(StallingClient::new(), options);
        let outcome = orchestrator.analyze(NEWS).await.unwrap();

        assert_eq!(outcome.trail.last(), Some(&PipelineState::Done));
        assert_eq!(outcome.analysis.market_impact.macro_economy.gdp.impact, "較大");
        match &outcome.summary {
            SummaryAdvice::Absent { reason } => {
                assert_eq!(reason, &TransportFailure::Timeout(Duration::from_millis(50)).to_string());
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected absent summary, got {:?}", other),
        }
        assert_eq!(orchestrator.client().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancel_during_summary_call() {
        let (tx, rx) = watch::channel(false);
        let orchestrator = Orchestrator::new(StallingClient::new(), PipelineOptions::default());

        let canceller = async {
            sleep(Duration::from_millis(50)).await;
            tx.send(true).unwrap();
        };
        let (result, ()) = tokio::join!(orchestrator.analyze_with_cancel(NEWS, Some(rx)), canceller);

        match result {
            Err(err @ PipelineError::Cancelled { .. }) => {
                assert_eq!(err.stage(), Some(Stage::AwaitingSummary));
            }
            other => panic!("expected cancellation, got {:?}", other.map(|o| o.trail)),
        }
        assert_eq!(orchestrator.client().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retries_transport_failures() {
        let options = PipelineOptions {
            primary_attempts: 2,
            retry_backoff: Duration::from_millis(1),
            ..PipelineOptions::default()
        };
        let orchestrator = Orchestrator::new(
            ScriptedClient::new(vec![Err(unavailable()), Ok(fenced_reply()), Ok(ADVICE.to_string())]),
            options,
        );
        let outcome = orchestrator.analyze(NEWS).await.unwrap();

        assert_eq!(outcome.summary.text(), Some(ADVICE));
        assert_eq!(orchestrator.client().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_configured_attempts() {
        let options = PipelineOptions {
            primary_attempts: 2,
            retry_backoff: Duration::from_millis(1),
            ..PipelineOptions::default()
        };
        let orchestrator = Orchestrator::new(
            ScriptedClient::new(vec![Err(unavailable()), Err(unavailable())]),
            options,
        );
        let err = orchestrator.analyze(NEWS).await.unwrap_err();

        assert_eq!(err.stage(), Some(Stage::AwaitingPrimary));
        assert_eq!(orchestrator.client().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_primary_call() {
        let (_tx, rx) = watch::channel(true);
        let orchestrator = orchestrator(vec![Ok(fenced_reply())]);
        let err = orchestrator
            .analyze_with_cancel(NEWS, Some(rx))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Cancelled {
                stage: Stage::AwaitingPrimary
            }
        ));
        assert!(orchestrator.client().calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_abandons_call_in_flight() {
        let (tx, rx) = watch::channel(false);
        let orchestrator = Orchestrator::new(SlowClient, PipelineOptions::default());

        let canceller = async {
            sleep(Duration::from_millis(20)).await;
            tx.send(true).unwrap();
        };
        let (result, ()) = tokio::join!(orchestrator.analyze_with_cancel(NEWS, Some(rx)), canceller);

        assert!(matches!(
            result,
            Err(PipelineError::Cancelled {
                stage: Stage::AwaitingPrimary
            })
        ));
    }

    #[tokio::test]
    async fn test_dropped_sender_does_not_cancel() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let orchestrator = orchestrator(vec![Ok(fenced_reply()), Ok(ADVICE.to_string())]);
        let outcome = orchestrator
            .analyze_with_cancel(NEWS, Some(rx))
            .await
            .unwrap();
        assert_eq!(outcome.trail.last(), Some(&PipelineState::Done));
    }

    #[tokio::test]
    async fn test_rerun_is_independent() {
        let orchestrator = orchestrator(vec![
            Ok(fenced_reply()),
            Ok(ADVICE.to_string()),
            Ok(fenced_reply()),
            Ok(ADVICE.to_string()),
        ]);
        let first = orchestrator.analyze(NEWS).await.unwrap();
        let second = orchestrator.analyze(NEWS).await.unwrap();

        assert_eq!(first.analysis, second.analysis);
        assert_ne!(first.run_id, second.run_id);
        let calls = orchestrator.client().calls();
        assert_eq!(calls[0].0, calls[2].0);
    }

    #[tokio::test]
    async fn test_end_to_end_chip_demand() {
        let orchestrator = orchestrator(vec![Ok(fenced_reply()), Ok(ADVICE.to_string())]);
        let outcome = orchestrator.analyze(NEWS).await.unwrap();

        let gdp = &outcome.analysis.market_impact.macro_economy.gdp.impact;
        assert_eq!(gdp, "較大");
        assert_eq!(score(gdp), 0.75);

        let generated_at = Local.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        let text = report::render(&outcome.news, &outcome.analysis, &outcome.summary, generated_at);
        let heading = text.find("### 總體經濟影響").unwrap();
        let gdp_line = text.find("- GDP影響: 較大").unwrap();
        assert!(heading < gdp_line);
        assert!(text.contains(ADVICE));
    }
}
