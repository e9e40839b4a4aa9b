//! Bridges LLM calls onto the event bus.
//!
//! Each run is a spawned tokio task racing the provider against a
//! cancellation token and a deadline. Cancellation is a first-class
//! outcome, not an error: a superseded review reports `StreamCanceled`
//! and a superseded generation reports nothing at all, so stale results
//! can never overwrite a newer run's state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::event::AppEvent;
use crate::llm::{Llm, LlmError};

/// Reviews stream for a while; commit/PR generations are one round trip.
const REVIEW_TIMEOUT: Duration = Duration::from_secs(300);
const GENERATE_TIMEOUT: Duration = Duration::from_secs(180);

/// Starts a streaming review run.
///
/// Emits `StreamChunk` per chunk, then exactly one of `StreamComplete`,
/// `StreamCanceled`, or `StreamError`.
pub fn spawn_review_stream(
    llm: Arc<dyn Llm>,
    prompt: String,
    token: CancellationToken,
    event_tx: UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        let (chunk_tx, mut chunk_rx) = mpsc::unbounded_channel();
        let fut = async move { llm.stream(&prompt, chunk_tx).await };
        tokio::pin!(fut);

        let deadline = tokio::time::sleep(REVIEW_TIMEOUT);
        tokio::pin!(deadline);

        let mut stream_result: Option<Result<(), LlmError>> = None;
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    let _ = event_tx.send(AppEvent::StreamCanceled);
                    return;
                }
                _ = &mut deadline => {
                    let _ = event_tx.send(AppEvent::StreamError(LlmError::TimedOut(
                        REVIEW_TIMEOUT.as_secs(),
                    )));
                    return;
                }
                result = &mut fut, if stream_result.is_none() => {
                    // The chunk sender is dropped with the future, so the
                    // recv arm below drains the remainder and then ends
                    // the loop.
                    stream_result = Some(result);
                }
                chunk = chunk_rx.recv() => match chunk {
                    Some(text) => {
                        let _ = event_tx.send(AppEvent::StreamChunk(text));
                    }
                    None => break,
                },
            }
        }

        match stream_result {
            Some(Err(err)) => {
                let _ = event_tx.send(AppEvent::StreamError(err));
            }
            _ => {
                let _ = event_tx.send(AppEvent::StreamComplete);
            }
        }
    });
}

/// Starts a one-shot generation (commit message or PR description).
///
/// Emits `GenerateDone` on success, failure, or timeout. A canceled run
/// emits nothing — the orchestrator has already moved on.
pub fn spawn_generate(
    llm: Arc<dyn Llm>,
    prompt: String,
    token: CancellationToken,
    event_tx: UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        let fut = async move { llm.generate(&prompt).await };
        tokio::pin!(fut);

        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(GENERATE_TIMEOUT) => {
                let _ = event_tx.send(AppEvent::GenerateDone(Err(LlmError::TimedOut(
                    GENERATE_TIMEOUT.as_secs(),
                ))));
            }
            result = &mut fut => {
                let _ = event_tx.send(AppEvent::GenerateDone(result));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Emits fixed chunks, then finishes with the configured result.
    struct ScriptedLlm {
        chunks: Vec<&'static str>,
        outcome: Result<(), fn() -> LlmError>,
        hang: bool,
    }

    #[async_trait]
    impl Llm for ScriptedLlm {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            if self.hang {
                futures::future::pending::<()>().await;
            }
            match &self.outcome {
                Ok(()) => Ok(self.chunks.concat()),
                Err(make) => Err(make()),
            }
        }

        async fn stream(
            &self,
            _prompt: &str,
            chunks: mpsc::UnboundedSender<String>,
        ) -> Result<(), LlmError> {
            for chunk in &self.chunks {
                let _ = chunks.send((*chunk).to_owned());
                tokio::task::yield_now().await;
            }
            if self.hang {
                futures::future::pending::<()>().await;
            }
            match &self.outcome {
                Ok(()) => Ok(()),
                Err(make) => Err(make()),
            }
        }
    }

    async fn collect_events(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let terminal = matches!(
                event,
                AppEvent::StreamComplete
                    | AppEvent::StreamCanceled
                    | AppEvent::StreamError(_)
                    | AppEvent::GenerateDone(_)
            );
            events.push(event);
            if terminal {
                break;
            }
        }
        events
    }

    #[tokio::test]
    async fn stream_forwards_chunks_then_completes() {
        let llm = Arc::new(ScriptedLlm {
            chunks: vec!["Looks ", "good"],
            outcome: Ok(()),
            hang: false,
        });
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_review_stream(llm, "prompt".into(), CancellationToken::new(), tx);
        let events = collect_events(&mut rx).await;

        let texts: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StreamChunk(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, ["Looks ", "good"]);
        assert!(matches!(events.last(), Some(AppEvent::StreamComplete)));
    }

    #[tokio::test]
    async fn stream_failure_surfaces_after_partial_chunks() {
        let llm = Arc::new(ScriptedLlm {
            chunks: vec!["partial"],
            outcome: Err(|| LlmError::EmptyResponse),
            hang: false,
        });
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_review_stream(llm, "prompt".into(), CancellationToken::new(), tx);
        let events = collect_events(&mut rx).await;

        assert!(matches!(events.first(), Some(AppEvent::StreamChunk(t)) if t == "partial"));
        assert!(matches!(events.last(), Some(AppEvent::StreamError(_))));
    }

    #[tokio::test]
    async fn cancellation_is_not_an_error() {
        let llm = Arc::new(ScriptedLlm { chunks: vec![], outcome: Ok(()), hang: true });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        spawn_review_stream(llm, "prompt".into(), token.clone(), tx);
        token.cancel();

        let events = collect_events(&mut rx).await;
        assert!(matches!(events.last(), Some(AppEvent::StreamCanceled)));
        assert!(!events.iter().any(|e| matches!(e, AppEvent::StreamError(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn stream_times_out() {
        let llm = Arc::new(ScriptedLlm { chunks: vec![], outcome: Ok(()), hang: true });
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_review_stream(llm, "prompt".into(), CancellationToken::new(), tx);

        let events = collect_events(&mut rx).await;
        assert!(matches!(
            events.last(),
            Some(AppEvent::StreamError(LlmError::TimedOut(_)))
        ));
    }

    #[tokio::test]
    async fn generate_reports_result() {
        let llm = Arc::new(ScriptedLlm {
            chunks: vec!["feat: add parser"],
            outcome: Ok(()),
            hang: false,
        });
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_generate(llm, "prompt".into(), CancellationToken::new(), tx);
        let events = collect_events(&mut rx).await;

        assert!(matches!(
            events.last(),
            Some(AppEvent::GenerateDone(Ok(text))) if text == "feat: add parser"
        ));
    }

    #[tokio::test]
    async fn canceled_generate_emits_nothing() {
        let llm = Arc::new(ScriptedLlm { chunks: vec![], outcome: Ok(()), hang: true });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        spawn_generate(llm, "prompt".into(), token.clone(), tx);
        token.cancel();

        // The sender is dropped once the task exits without emitting.
        assert!(rx.recv().await.is_none());
    }
}
