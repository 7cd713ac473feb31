//! # Turnstile Core
//!
//! Core traits and types for the Turnstile check-in analytics service.
//!
//! This crate provides the fundamental abstractions the rest of the
//! workspace is built from:
//!
//! - **State**: domain state for an aggregate
//! - **Action**: all possible inputs to a reducer (commands and events)
//! - **Reducer**: pure function `(State, Action, Environment) → Effects`
//! - **Effect**: side-effect descriptions (values, not execution)
//! - **Environment**: injected dependencies behind traits
//! - **Projection**: read models built from domain events
//! - **Store collaborator**: the durable record/counter store traits
//!
//! ## Architecture Principles
//!
//! - Functional core, imperative shell
//! - Unidirectional data flow
//! - Explicit effects (no hidden I/O)
//! - Dependency injection via the environment
//!
//! ## Example
//!
//! ```ignore
//! use turnstile_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! impl Reducer for DoorReducer {
//!     type State = DoorState;
//!     type Action = DoorAction;
//!     type Environment = DoorEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut DoorState,
//!         action: DoorAction,
//!         env: &DoorEnvironment,
//!     ) -> SmallVec<[Effect<DoorAction>; 4]> {
//!         // Business logic goes here
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

pub mod projection;
pub mod store;

/// Reducer module - the core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → Effects`.
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for LedgerReducer {
    ///     type State = LedgerState;
    ///     type Action = LedgerAction;
    ///     type Environment = LedgerEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut LedgerState,
    ///         action: LedgerAction,
    ///         env: &LedgerEnvironment,
    ///     ) -> SmallVec<[Effect<LedgerAction>; 4]> {
    ///         match action {
    ///             LedgerAction::IssueTicket { .. } => {
    ///                 // Validate, mutate state, describe effects
    ///                 smallvec![Effect::None]
    ///             }
    ///             _ => smallvec![Effect::None],
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side-effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and compose via [`Effect::merge`]
/// and [`Effect::chain`].
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store
    /// runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for timeouts, retries)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after the delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if `Some`, the action is fed back
        /// into the reducer and broadcast to observers.
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }
    }
}

/// Environment module - dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter of a reducer.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use turnstile_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let now = clock.now();
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;

    #[test]
    fn merge_produces_parallel() {
        let effect: Effect<()> = Effect::merge(vec![Effect::None, Effect::None]);
        assert!(matches!(effect, Effect::Parallel(ref v) if v.len() == 2));
    }

    #[test]
    fn chain_produces_sequential() {
        let effect: Effect<()> = Effect::chain(vec![Effect::None]);
        assert!(matches!(effect, Effect::Sequential(ref v) if v.len() == 1));
    }

    #[test]
    fn debug_formats_without_future_internals() {
        let effect: Effect<u32> = Effect::Future(Box::pin(async { None }));
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
    }
}
