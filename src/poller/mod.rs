//! Credit event polling module.
//!
//! Periodically fetches pending credit notification events from the backend
//! and drives the credits service. All retry, fail-stop, and
//! circuit-breaking policy for this data path lives here; the service only
//! ever sees deduplicated, well-formed events.

mod breaker;

pub use breaker::CircuitBreaker;

use crate::config::PollerConfig;
use crate::dedup::{ProcessedLog, LOG_HIGH_WATER, LOG_RETAIN};
use crate::gateway::{CreditsGateway, EventKind, GatewayError};
use crate::service::CreditsService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// What a single poll tick did. Skips are normal operation, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Fetch succeeded; this many events were dispatched to the service
    Completed { handled: usize },
    /// Fail-stop threshold reached; no network call was made
    Disabled,
    /// Production breaker is open and the recovery window has not elapsed
    BreakerOpen,
    /// The minimum interval since the last poll has not elapsed
    RateLimited,
    /// Another tick's fetch is still in flight
    Busy,
    /// Fetch failed (network, timeout, bad status, malformed body)
    Failed,
}

#[derive(Debug)]
struct PollerState {
    consecutive_errors: u32,
    last_poll: Option<Instant>,
    breaker: CircuitBreaker,
}

/// Background service that keeps the wallet in sync with backend credit
/// events.
pub struct CreditPoller {
    gateway: Arc<dyn CreditsGateway>,
    service: Arc<CreditsService>,
    config: PollerConfig,
    state: Mutex<PollerState>,
    /// In-flight flag: overlapping timer fires never issue concurrent
    /// requests.
    in_flight: AtomicBool,
    /// Event keys already dispatched this session
    seen: ProcessedLog,
}

impl CreditPoller {
    pub fn new(
        gateway: Arc<dyn CreditsGateway>,
        service: Arc<CreditsService>,
        config: PollerConfig,
    ) -> Self {
        let breaker = CircuitBreaker::new(
            config.breaker_failure_threshold,
            Duration::from_secs(config.breaker_recovery_seconds),
        );
        Self {
            gateway,
            service,
            config,
            state: Mutex::new(PollerState {
                consecutive_errors: 0,
                last_poll: None,
                breaker,
            }),
            in_flight: AtomicBool::new(false),
            seen: ProcessedLog::new(),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, PollerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one poll tick, honoring every guard.
    pub async fn poll_once(&self) -> PollOutcome {
        {
            let state = self.lock_state();

            // Terminal fail-stop: no recovery without a fresh session.
            if state.consecutive_errors >= self.config.max_consecutive_errors {
                return PollOutcome::Disabled;
            }

            if self.config.breaker_enabled && !state.breaker.should_attempt() {
                tracing::debug!("circuit open, skipping credit poll");
                return PollOutcome::BreakerOpen;
            }

            // Enforce the interval even if timers fire early.
            if let Some(last) = state.last_poll {
                if last.elapsed() < Duration::from_secs(self.config.interval_seconds) {
                    return PollOutcome::RateLimited;
                }
            }
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return PollOutcome::Busy;
        }

        let outcome = self.fetch_and_dispatch().await;
        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn fetch_and_dispatch(&self) -> PollOutcome {
        self.lock_state().last_poll = Some(Instant::now());

        let start = Instant::now();
        let result = self.gateway.credit_events().await;
        metrics::histogram!("souk_credit_poll_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        match result {
            Ok(events) => {
                self.record_success();
                let handled = self.dispatch(events).await;
                PollOutcome::Completed { handled }
            }
            Err(error) => {
                self.record_failure(&error);
                PollOutcome::Failed
            }
        }
    }

    /// Reset error accounting after any successfully parsed response, even
    /// an empty one.
    fn record_success(&self) {
        let mut state = self.lock_state();
        if state.consecutive_errors > 0 || state.breaker.is_open() {
            tracing::info!("credit poll recovered");
        }
        state.consecutive_errors = 0;
        state.breaker.record_success();
    }

    fn record_failure(&self, error: &GatewayError) {
        metrics::counter!("souk_credit_poll_failures_total").increment(1);

        let mut state = self.lock_state();
        state.consecutive_errors += 1;
        tracing::warn!(
            error = %error,
            consecutive_errors = state.consecutive_errors,
            "credit poll failed"
        );

        if self.config.breaker_enabled {
            let was_open = state.breaker.is_open();
            state.breaker.record_failure();
            if state.breaker.is_open() && !was_open {
                tracing::warn!(
                    fail_count = state.breaker.fail_count(),
                    recovery_seconds = self.config.breaker_recovery_seconds,
                    "credit poll circuit opened"
                );
            }
        }

        if state.consecutive_errors == self.config.max_consecutive_errors {
            tracing::error!("credit polling disabled for this session");
            self.service.report_sync_stalled();
        }
    }

    /// Dispatch fetched events in server order. Each event is marked in the
    /// processed log before its mutation so a concurrent duplicate cannot
    /// slip through between check and apply.
    async fn dispatch(&self, events: Vec<crate::gateway::CreditEvent>) -> usize {
        let mut handled = 0;

        for event in events {
            let Some(key) = event.dedup_key() else {
                tracing::debug!(event_id = event.id, "skipping credit event without request id");
                continue;
            };
            if !self.seen.insert(&key) {
                continue;
            }
            // request_id presence is implied by a non-None dedup key
            let Some(request_id) = event.request_id.as_deref() else {
                continue;
            };

            metrics::counter!("souk_credit_events_total", "kind" => event.kind.as_str())
                .increment(1);

            match event.kind {
                EventKind::CreditApproved => match event.amount {
                    Some(amount) if amount > rust_decimal::Decimal::ZERO => {
                        self.service.approve_credit_request(request_id, Some(amount));
                        self.acknowledge(event.id).await;
                        handled += 1;
                    }
                    _ => {
                        tracing::error!(
                            event_id = event.id,
                            request_id,
                            "dropping credit approval without a positive amount"
                        );
                    }
                },
                EventKind::CreditRejected => {
                    self.service.reject_credit_request(request_id);
                    self.acknowledge(event.id).await;
                    handled += 1;
                }
                EventKind::CreditPending => {
                    tracing::debug!(event_id = event.id, request_id, "credit request still pending");
                }
                EventKind::Unknown => {
                    tracing::warn!(
                        event_id = event.id,
                        request_id,
                        "unhandled credit event type"
                    );
                }
            }
        }

        handled
    }

    /// Best-effort acknowledgment. Failure is logged, never retried, and
    /// never rolls back local state.
    async fn acknowledge(&self, notification_id: i64) {
        if let Err(error) = self.gateway.acknowledge(notification_id).await {
            tracing::warn!(
                error = %error,
                notification_id,
                "failed to acknowledge credit event"
            );
        }
    }

    /// Trim both dedup layers to their retention bound.
    pub fn cleanup(&self) {
        self.seen.trim(LOG_HIGH_WATER, LOG_RETAIN);
        self.service.cleanup_processed_requests();
    }

    /// Forget all per-session polling state. Invoked on logout.
    pub fn reset(&self) {
        self.seen.clear();
        let mut state = self.lock_state();
        state.consecutive_errors = 0;
        state.last_poll = None;
        state.breaker = CircuitBreaker::new(
            self.config.breaker_failure_threshold,
            Duration::from_secs(self.config.breaker_recovery_seconds),
        );
    }

    /// Number of event keys currently in the processed log.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Start the polling background task.
    /// Returns a JoinHandle that resolves when the poller stops.
    pub fn start(self: Arc<Self>, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(
                interval_seconds = self.config.interval_seconds,
                breaker_enabled = self.config.breaker_enabled,
                "credit poller started"
            );

            // One-shot initial poll after a short settle delay.
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::info!("credit poller shutting down");
                    return;
                }
                _ = tokio::time::sleep(Duration::from_millis(self.config.initial_delay_ms)) => {}
            }
            let outcome = self.poll_once().await;
            tracing::debug!(?outcome, "initial credit poll completed");

            let mut poll_tick =
                tokio::time::interval(Duration::from_secs(self.config.interval_seconds));
            poll_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let mut cleanup_tick =
                tokio::time::interval(Duration::from_secs(self.config.cleanup_interval_seconds));
            cleanup_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("credit poller shutting down");
                        break;
                    }
                    _ = poll_tick.tick() => {
                        let outcome = self.poll_once().await;
                        tracing::debug!(?outcome, "credit poll tick completed");
                    }
                    _ = cleanup_tick.tick() => {
                        self.cleanup();
                    }
                }
            }
        })
    }
}
