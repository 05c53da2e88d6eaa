//! Invocation (§4.6).
//!
//! The [`Invoker`] trait is the gateway's only dependency on the load
//! balancer/invoker subsystem that actually runs function code — out of
//! scope per §1, referenced here only by interface.
//!
//! Per the design notes (§9), a blocking invocation is modeled as a task
//! that waits on a bounded completion signal; timeout is a normal outcome,
//! not an exception. Implementations are expected to enforce `max_wait`
//! themselves (e.g. via `tokio::time::timeout` around their own queue wait)
//! rather than relying on the gateway to race them externally.

use async_trait::async_trait;
use gateway_kernel::gateway::{Action, Activation, ActivationStatus, Identity};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of a blocking invocation attempt, mirroring the `Sent →
/// (Completed | TimedOut | Failed)` state machine of §4.8. `TimedOut` and
/// `Completed` carrying no activation both collapse to the same `None`
/// branch in the trait's return type — the gateway treats them identically.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Invoke `action` on behalf of `owner_identity` with `payload`, blocking
    /// for at most `max_wait`.
    ///
    /// Returns `Ok((activation_id, Some(activation)))` if the activation
    /// completed in time, `Ok((activation_id, None))` if it did not (the
    /// caller must treat this as 202), or `Err` for any other invoker
    /// fault (the caller must treat this as 500).
    async fn invoke(
        &self,
        owner_identity: &Identity,
        action: &Action,
        payload: Value,
        max_wait: Duration,
    ) -> Result<(String, Option<Activation>), String>;
}

/// In-process invoker that executes the action synchronously in this task
/// and returns the merged payload as the activation result.
///
/// Has no external load balancer to talk to, so it never actually times
/// out; it exists to exercise the gateway's request pipeline end to end in
/// tests and local development. A production deployment replaces this with
/// a client for the real load balancer.
pub struct EchoInvoker;

#[async_trait]
impl Invoker for EchoInvoker {
    async fn invoke(
        &self,
        _owner_identity: &Identity,
        _action: &Action,
        payload: Value,
        max_wait: Duration,
    ) -> Result<(String, Option<Activation>), String> {
        let activation_id = Uuid::new_v4().to_string();

        let outcome = tokio::time::timeout(max_wait, async { payload }).await;
        match outcome {
            Ok(result) => Ok((
                activation_id.clone(),
                Some(Activation::new(activation_id, result, ActivationStatus::Success)),
            )),
            Err(_) => Ok((activation_id, None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_kernel::gateway::AuthKey;

    fn identity() -> Identity {
        Identity::new(
            "guest",
            "guest-subject",
            AuthKey {
                uuid: "u".to_string(),
                secret: "s".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn echo_invoker_returns_payload_as_result() {
        let invoker = EchoInvoker;
        let action = Action::new("guest", "default", "echo");
        let payload = serde_json::json!({"x": 1});
        let (id, activation) = invoker
            .invoke(&identity(), &action, payload.clone(), Duration::from_millis(100))
            .await
            .unwrap();
        assert!(!id.is_empty());
        let activation = activation.unwrap();
        assert_eq!(activation.result, payload);
        assert!(matches!(activation.status, ActivationStatus::Success));
    }
}
