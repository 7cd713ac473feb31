//! # Turnstile Runtime
//!
//! Runtime implementation for the Turnstile architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: owns aggregate state, serializes reducer execution, and
//!   executes effect descriptions on the Tokio runtime
//! - **Effect executor**: runs effects and feeds resulting actions back to
//!   the reducer (and to observers via a broadcast channel)
//! - **Retry**: bounded exponential backoff for transient failures
//! - **Dead letter queue**: bounded storage for operations that exhausted
//!   their retry budget
//!
//! ## Example
//!
//! ```ignore
//! use turnstile_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, watch};
use turnstile_core::{effect::Effect, reducer::Reducer};

/// Retry logic with exponential backoff
pub mod retry;

pub use error::StoreError;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// Returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        ///
        /// The action broadcast channel was closed, typically because the
        /// store is shutting down.
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

/// Health check status levels
///
/// Indicates the current health state of a component or system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    /// Component is fully operational
    Healthy,

    /// Component is operational but experiencing issues (e.g., high DLQ size)
    Degraded,

    /// Component is not operational
    Unhealthy,
}

impl HealthStatus {
    /// Check if status is healthy
    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Check if status is degraded
    #[must_use]
    pub const fn is_degraded(self) -> bool {
        matches!(self, Self::Degraded)
    }

    /// Check if status is unhealthy
    #[must_use]
    pub const fn is_unhealthy(self) -> bool {
        matches!(self, Self::Unhealthy)
    }

    /// Get the worst status between two statuses
    #[must_use]
    pub const fn worst(self, other: Self) -> Self {
        match (self, other) {
            (Self::Unhealthy, _) | (_, Self::Unhealthy) => Self::Unhealthy,
            (Self::Degraded, _) | (_, Self::Degraded) => Self::Degraded,
            _ => Self::Healthy,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check result for a component
#[derive(Debug, Clone)]
pub struct HealthCheck {
    /// Name of the component being checked
    pub component: String,

    /// Current health status
    pub status: HealthStatus,

    /// Optional message providing details
    pub message: Option<String>,

    /// Optional metadata (e.g., metrics, error counts)
    pub metadata: Vec<(String, String)>,
}

impl HealthCheck {
    /// Create a healthy check result
    #[must_use]
    pub fn healthy(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Healthy,
            message: None,
            metadata: Vec::new(),
        }
    }

    /// Create a degraded check result
    #[must_use]
    pub fn degraded(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Degraded,
            message: Some(message.into()),
            metadata: Vec::new(),
        }
    }

    /// Create an unhealthy check result
    #[must_use]
    pub fn unhealthy(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
            metadata: Vec::new(),
        }
    }

    /// Add metadata to the health check
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }
}

/// Aggregated health report
///
/// Combines multiple health checks into an overall system status.
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// Overall system status (worst of all checks)
    pub status: HealthStatus,

    /// Individual component checks
    pub checks: Vec<HealthCheck>,

    /// Timestamp when report was generated
    pub timestamp: turnstile_core::DateTime<turnstile_core::Utc>,
}

impl HealthReport {
    /// Create a new health report from checks
    #[must_use]
    pub fn new(checks: Vec<HealthCheck>) -> Self {
        let status = checks
            .iter()
            .map(|c| c.status)
            .fold(HealthStatus::Healthy, HealthStatus::worst);

        Self {
            status,
            checks,
            timestamp: turnstile_core::Utc::now(),
        }
    }

    /// Check if overall system is healthy
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }
}

/// Dead letter queue entry
///
/// Represents a failed operation with metadata about the failure.
#[derive(Debug, Clone)]
pub struct DeadLetter<T> {
    /// The failed operation payload
    pub payload: T,

    /// Number of times this operation was retried
    pub retry_count: usize,

    /// The error message from the last failure
    pub error_message: String,

    /// Timestamp when the entry was recorded (nanoseconds since epoch)
    pub failed_at: u64,
}

impl<T> DeadLetter<T> {
    /// Create a new dead letter entry
    fn new(payload: T, error_message: String, retry_count: usize) -> Self {
        // Note: Truncation acceptable for nanosecond timestamps (wraps every ~584 years)
        #[allow(clippy::cast_possible_truncation)]
        let now_nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_nanos() as u64;

        Self {
            payload,
            retry_count,
            error_message,
            failed_at: now_nanos,
        }
    }
}

/// Dead Letter Queue for storing failed operations
///
/// The DLQ stores operations that failed after exhausting retries.
/// These can be inspected, monitored, and potentially retried manually.
///
/// # Features
///
/// - Bounded queue with configurable max size
/// - FIFO ordering (oldest entries dropped when full)
/// - Thread-safe for concurrent access
/// - Metrics tracking for queue size and operations
///
/// # Example
///
/// ```
/// use turnstile_runtime::DeadLetterQueue;
///
/// let dlq = DeadLetterQueue::new(1000);
///
/// // Add a failed operation
/// dlq.push("operation_data".to_string(), "Connection timeout".to_string(), 5);
///
/// // Check queue size
/// assert_eq!(dlq.len(), 1);
///
/// // Drain and retry
/// for entry in dlq.drain() {
///     println!("Retry: {:?}", entry);
/// }
/// ```
#[derive(Debug)]
pub struct DeadLetterQueue<T> {
    /// The queue storage
    queue: Arc<Mutex<VecDeque<DeadLetter<T>>>>,

    /// Maximum queue size
    max_size: usize,
}

impl<T> DeadLetterQueue<T> {
    /// Create a new dead letter queue with the given max size
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            max_size,
        }
    }

    /// Push a failed operation onto the queue
    ///
    /// If the queue is full, the oldest entry is dropped.
    ///
    /// # Arguments
    ///
    /// - `payload`: The operation data
    /// - `error_message`: Description of the failure
    /// - `retry_count`: Number of times the operation was retried
    pub fn push(&self, payload: T, error_message: String, retry_count: usize) {
        let mut queue = self
            .queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        // Drop oldest if at capacity
        if queue.len() >= self.max_size {
            queue.pop_front();
            metrics::counter!("dlq.dropped").increment(1);
            tracing::warn!(
                max_size = self.max_size,
                "DLQ at capacity, dropping oldest entry"
            );
        }

        let entry = DeadLetter::new(payload, error_message, retry_count);
        queue.push_back(entry);

        // Queue sizes stay far below the f64-exact integer range
        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!("dlq.size").set(queue.len() as f64);
        metrics::counter!("dlq.pushed").increment(1);

        tracing::warn!(
            retry_count = retry_count,
            queue_size = queue.len(),
            "Operation added to dead letter queue"
        );
    }

    /// Get the current queue size
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Check if the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain all entries from the queue
    ///
    /// Returns all entries and empties the queue.
    pub fn drain(&self) -> Vec<DeadLetter<T>> {
        let mut queue = self
            .queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let entries: Vec<_> = queue.drain(..).collect();

        metrics::gauge!("dlq.size").set(0.0);
        metrics::counter!("dlq.drained").increment(entries.len() as u64);

        tracing::info!(count = entries.len(), "Drained dead letter queue");

        entries
    }

    /// Peek at the oldest entry without removing it
    #[must_use]
    pub fn peek(&self) -> Option<DeadLetter<T>>
    where
        T: Clone,
    {
        self.queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .front()
            .cloned()
    }

    /// Get the maximum queue size
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }
}

impl<T> Clone for DeadLetterQueue<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            max_size: self.max_size,
        }
    }
}

impl<T> Default for DeadLetterQueue<T> {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use turnstile_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_dlq_max_size(5000)
///     .with_broadcast_capacity(256);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum size of the dead letter queue
    pub dlq_max_size: usize,
    /// Capacity of the action broadcast channel
    pub broadcast_capacity: usize,
}

impl StoreConfig {
    /// Set the DLQ maximum size
    #[must_use]
    pub const fn with_dlq_max_size(mut self, max_size: usize) -> Self {
        self.dlq_max_size = max_size;
        self
    }

    /// Set the action broadcast channel capacity
    ///
    /// Default capacity is 16. Increase when many slow observers subscribe.
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dlq_max_size: 1000,
            broadcast_capacity: 16,
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects spawned
/// by one action to complete.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // All effects from Action::Start are now complete
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle with its tracking counterpart
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    ///
    /// Useful for initialization in loops where you need a `last_handle`.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Wait for all effects to complete
    ///
    /// Blocks until the effect counter reaches zero.
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            let _ = self.completion.changed().await;
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns `Err(())` if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), ()> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| ())
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Ensures the counter is always decremented, even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The Store - runtime coordinator for a reducer
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent access)
/// 2. Reducer (business logic)
/// 3. Environment (injected dependencies)
/// 4. Effect execution (with feedback loop)
///
/// # Concurrency
///
/// The reducer executes synchronously while holding the state write lock,
/// so all state transitions are serialized: two actions touching the same
/// record can never interleave mid-transition. Effects execute
/// asynchronously in spawned tasks and may complete in any order.
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    dlq: DeadLetterQueue<String>,
    shutdown: Arc<AtomicBool>,
    pending_effects: Arc<AtomicUsize>,
    /// Action broadcast channel for observing actions produced by effects.
    ///
    /// All actions produced by effects (e.g., from `Effect::Future`) are
    /// broadcast to observers. This enables request-response correlation
    /// and real-time event streaming.
    action_broadcast: broadcast::Sender<A>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Clone + Send + Sync + std::fmt::Debug + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// Uses the default [`StoreConfig`] (DLQ max size 1000, broadcast
    /// capacity 16).
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_config(initial_state, reducer, environment, StoreConfig::default())
    }

    /// Create a new Store with custom configuration
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = StoreConfig::default().with_broadcast_capacity(256);
    /// let store = Store::with_config(MyState::default(), MyReducer, my_env, config);
    /// ```
    #[must_use]
    pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
        let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            dlq: DeadLetterQueue::new(config.dlq_max_size),
            shutdown: Arc::new(AtomicBool::new(false)),
            pending_effects: Arc::new(AtomicUsize::new(0)),
            action_broadcast,
        }
    }

    /// Get access to the dead letter queue
    ///
    /// Returns a clone of the DLQ for inspecting undeliverable actions.
    #[must_use]
    pub fn dlq(&self) -> DeadLetterQueue<String> {
        self.dlq.clone()
    }

    /// Perform a health check on the Store
    ///
    /// Checks the dead letter queue level (degraded above 50% capacity,
    /// unhealthy when full) and reports pending effect count as metadata.
    #[must_use]
    pub fn health(&self) -> HealthCheck {
        let dlq_size = self.dlq.len();
        let dlq_capacity = self.dlq.max_size();
        // Queue sizes stay far below the f64-exact integer range
        #[allow(clippy::cast_precision_loss)]
        let dlq_usage = (dlq_size as f64 / dlq_capacity as f64) * 100.0;

        let mut check = if dlq_size >= dlq_capacity {
            HealthCheck::unhealthy("store", "Dead letter queue is full")
        } else if dlq_usage > 50.0 {
            // Truncation intentional for display percentage
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let usage_pct = dlq_usage as u32;
            HealthCheck::degraded("store", format!("Dead letter queue is {usage_pct}% full"))
        } else {
            HealthCheck::healthy("store")
        };

        check = check
            .with_metadata("dlq_size", dlq_size.to_string())
            .with_metadata("dlq_capacity", dlq_capacity.to_string())
            .with_metadata(
                "pending_effects",
                self.pending_effects.load(Ordering::Acquire).to_string(),
            );

        check
    }

    /// Initiate graceful shutdown of the store
    ///
    /// This method:
    /// 1. Sets the shutdown flag (rejecting new actions)
    /// 2. Waits for pending effects to complete (with timeout)
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before
    /// all pending effects complete.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Initiating graceful shutdown");
        metrics::counter!("store.shutdown.initiated").increment(1);

        // Set shutdown flag to reject new actions
        self.shutdown.store(true, Ordering::Release);

        // Wait for pending effects with timeout
        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(100);

        loop {
            let pending = self.pending_effects.load(Ordering::Acquire);

            if pending == 0 {
                tracing::info!("All effects completed, shutdown successful");
                metrics::counter!("store.shutdown.completed").increment(1);
                return Ok(());
            }

            if start.elapsed() >= timeout {
                tracing::error!(pending_effects = pending, "Shutdown timed out");
                metrics::counter!("store.shutdown.timeout").increment(1);
                return Err(StoreError::ShutdownTimeout(pending));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Send an action to the store
    ///
    /// This is the primary way to interact with the store:
    /// 1. Acquires the write lock on state
    /// 2. Calls the reducer with (state, action, environment)
    /// 3. Executes returned effects asynchronously
    /// 4. Effects may produce more actions (feedback loop)
    ///
    /// `send()` returns after starting effect execution, not completion;
    /// use the returned [`EffectHandle`] to wait for effects.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting
    /// down.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        // Check if store is shutting down
        if self.shutdown.load(Ordering::Acquire) {
            tracing::warn!("Rejected action: store is shutting down");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }

        metrics::counter!("store.actions.total").increment(1);

        // Create tracking for this action
        let (handle, tracking) = EffectHandle::new();

        let effects = {
            let mut state = self.state.write().await;

            let start = std::time::Instant::now();
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            metrics::histogram!("store.reducer.duration_seconds")
                .record(start.elapsed().as_secs_f64());

            effects
        };

        tracing::trace!("Executing {} effects", effects.len());
        for effect in effects {
            self.execute_effect(effect, tracking.clone());
        }

        Ok(handle)
    }

    /// Send an action and wait for a matching result action
    ///
    /// This method is designed for request-response patterns. It subscribes
    /// to the action broadcast, sends the initial action, then waits for an
    /// action matching the predicate.
    ///
    /// Subscription happens BEFORE sending to avoid a race with fast
    /// effects. Use a correlation field (e.g., the ticket id) in the
    /// predicate to distinguish concurrent requests.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: no matching action within `timeout`
    /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
    /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
    ///
    /// # Example
    ///
    /// ```ignore
    /// let result = store.send_and_wait_for(
    ///     LedgerAction::CheckInTicket { ticket_id, staff_id },
    ///     |a| a.ticket_id() == Some(ticket_id) && a.is_terminal(),
    ///     Duration::from_secs(10),
    /// ).await?;
    /// ```
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        // Subscribe BEFORE sending to avoid race condition
        let mut rx = self.action_broadcast.subscribe();

        // Send the initial action
        self.send(action).await?;

        // Wait for matching action with timeout
        tokio::time::timeout(timeout, async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {}, // Not the action we want, keep waiting
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Slow consumer, some actions were dropped; keep
                        // waiting - if the terminal action was dropped the
                        // timeout catches it
                        tracing::warn!(skipped, "Action observer lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Subscribe to all actions produced by effects on this store
    ///
    /// Returns a receiver that gets a clone of every action produced by
    /// effects. Initial actions sent via [`Store::send`] are not broadcast.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Read current state via a closure
    ///
    /// Access state through a closure to ensure the lock is released
    /// promptly:
    ///
    /// ```ignore
    /// let ticket_count = store.state(|s| s.tickets.len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Execute an effect with completion tracking
    ///
    /// `Effect::None` is a no-op and `Effect::Parallel` fans out without
    /// spawning; everything else runs in a spawned task guarded by
    /// [`DecrementGuard`] so the counter is decremented even on panic.
    fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
        match effect {
            Effect::None => {
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            },
            Effect::Parallel(effects) => {
                metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                for effect in effects {
                    self.execute_effect(effect, tracking.clone());
                }
            },
            effect => {
                tracking.increment();

                // Track global pending effects for shutdown
                self.pending_effects.fetch_add(1, Ordering::SeqCst);
                let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                let store = self.clone();
                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking);
                    let _pending_guard = pending_guard; // Decrement on drop

                    store.run_effect(effect).await;
                });
            },
        }
    }

    /// Run an effect to completion, feeding produced actions back
    ///
    /// Nested `Parallel`/`Sequential` effects are executed inline within
    /// the same task; the recursion is boxed to keep the future sized.
    fn run_effect(&self, effect: Effect<A>) -> futures::future::BoxFuture<'_, ()> {
        Box::pin(async move {
            match effect {
                Effect::None => {},
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    if let Some(action) = fut.await {
                        self.feedback(action).await;
                    }
                },
                Effect::Delay { duration, action } => {
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    tokio::time::sleep(duration).await;
                    self.feedback(*action).await;
                },
                Effect::Parallel(effects) => {
                    futures::future::join_all(effects.into_iter().map(|e| self.run_effect(e)))
                        .await;
                },
                Effect::Sequential(effects) => {
                    for effect in effects {
                        self.run_effect(effect).await;
                    }
                },
            }
        })
    }

    /// Deliver an effect-produced action: feed it back through the
    /// reducer, then broadcast to observers
    ///
    /// The reducer runs first so that state already reflects the action
    /// by the time an observer (e.g. `send_and_wait_for`) sees it.
    /// Actions that cannot be fed back (store shutting down) are recorded
    /// in the dead letter queue rather than silently dropped.
    async fn feedback(&self, action: A) {
        if let Err(error) = self.send(action.clone()).await {
            self.dlq.push(format!("{action:?}"), error.to_string(), 0);
        }

        let _ = self.action_broadcast.send(action);
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            dlq: self.dlq.clone(),
            shutdown: Arc::clone(&self.shutdown),
            pending_effects: Arc::clone(&self.pending_effects),
            action_broadcast: self.action_broadcast.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;
    use turnstile_core::{SmallVec, smallvec};

    #[derive(Debug, Clone, Default)]
    struct TallyState {
        count: i64,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum TallyAction {
        Bump,
        BumpLater,
        Bumped,
        Fail,
        Failed { error: String },
    }

    #[derive(Debug, Clone)]
    struct TallyEnv;

    #[derive(Debug, Clone)]
    struct TallyReducer;

    impl Reducer for TallyReducer {
        type State = TallyState;
        type Action = TallyAction;
        type Environment = TallyEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TallyAction::Bump => {
                    state.count += 1;
                    smallvec![Effect::None]
                },
                TallyAction::BumpLater => {
                    smallvec![Effect::Future(Box::pin(async {
                        Some(TallyAction::Bumped)
                    }))]
                },
                TallyAction::Bumped => {
                    state.count += 1;
                    smallvec![Effect::None]
                },
                TallyAction::Fail => {
                    smallvec![Effect::Future(Box::pin(async {
                        Some(TallyAction::Failed {
                            error: "boom".to_string(),
                        })
                    }))]
                },
                TallyAction::Failed { .. } => {
                    smallvec![Effect::None]
                },
            }
        }
    }

    fn test_store() -> Store<TallyState, TallyAction, TallyEnv, TallyReducer> {
        Store::new(TallyState::default(), TallyReducer, TallyEnv)
    }

    #[tokio::test]
    async fn send_runs_reducer_under_write_lock() {
        let store = test_store();

        tokio_test::assert_ok!(store.send(TallyAction::Bump).await);
        tokio_test::assert_ok!(store.send(TallyAction::Bump).await);

        assert_eq!(store.state(|s| s.count).await, 2);
    }

    #[tokio::test]
    async fn effect_produced_actions_feed_back() {
        let store = test_store();

        let mut handle = store.send(TallyAction::BumpLater).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        // Feedback awaits the reducer before the effect task resolves, so
        // the handle settling implies the state transition is visible.
        assert_eq!(store.state(|s| s.count).await, 1);
    }

    #[tokio::test]
    async fn send_and_wait_for_correlates_terminal_action() {
        let store = test_store();

        let result = store
            .send_and_wait_for(
                TallyAction::Fail,
                |a| matches!(a, TallyAction::Failed { .. }),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(
            result,
            TallyAction::Failed {
                error: "boom".to_string()
            }
        );
    }

    #[tokio::test]
    async fn send_and_wait_for_times_out_without_match() {
        let store = test_store();

        let result = store
            .send_and_wait_for(
                TallyAction::Bump,
                |a| matches!(a, TallyAction::Failed { .. }),
                Duration::from_millis(50),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Timeout)));
    }

    #[tokio::test]
    async fn shutdown_rejects_new_actions() {
        let store = test_store();

        store.shutdown(Duration::from_secs(1)).await.unwrap();

        let result = store.send(TallyAction::Bump).await;
        assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
    }

    #[tokio::test]
    async fn completed_handle_resolves_immediately() {
        let mut handle = EffectHandle::completed();
        handle.wait_with_timeout(Duration::from_millis(10)).await.unwrap();
    }

    #[test]
    fn dlq_is_bounded_fifo() {
        let dlq: DeadLetterQueue<String> = DeadLetterQueue::new(2);

        dlq.push("a".into(), "err".into(), 1);
        dlq.push("b".into(), "err".into(), 1);
        dlq.push("c".into(), "err".into(), 1);

        assert_eq!(dlq.len(), 2);
        assert_eq!(dlq.peek().unwrap().payload, "b");

        let drained = dlq.drain();
        assert_eq!(drained.len(), 2);
        assert!(dlq.is_empty());
    }

    #[test]
    fn health_reports_dlq_pressure() {
        let store = test_store();
        assert!(store.health().status.is_healthy());

        let dlq = store.dlq();
        for i in 0..600 {
            dlq.push(format!("op-{i}"), "err".into(), 1);
        }
        assert!(store.health().status.is_degraded());

        for i in 0..400 {
            dlq.push(format!("op2-{i}"), "err".into(), 1);
        }
        assert!(store.health().status.is_unhealthy());
    }

    #[test]
    fn health_status_worst_ordering() {
        assert_eq!(
            HealthStatus::Healthy.worst(HealthStatus::Degraded),
            HealthStatus::Degraded
        );
        assert_eq!(
            HealthStatus::Degraded.worst(HealthStatus::Unhealthy),
            HealthStatus::Unhealthy
        );
        let report = HealthReport::new(vec![
            HealthCheck::healthy("a"),
            HealthCheck::degraded("b", "queue filling"),
        ]);
        assert_eq!(report.status, HealthStatus::Degraded);
        assert!(!report.is_healthy());
    }
}
