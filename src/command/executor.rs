//! Command submission - runs one natural language command against the home

use crate::core::error::{HomeError, Result};
use crate::device::collection::DeviceCollection;
use crate::device::model::PartialUpdate;
use crate::llm::parser::interpret_command;
use crate::llm::service::GenerationService;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Default upper bound on one submission
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// What happened to a submitted command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Updates were merged into `count` devices
    Updated { count: usize },
    /// The model understood nothing actionable, or named no known device
    NothingToChange,
    /// The service call failed, timed out, or returned an unreadable answer
    Failed,
}

impl CommandOutcome {
    /// Message shown to the user
    pub fn message(&self) -> String {
        match self {
            CommandOutcome::Updated { count } => format!("Updated {} device(s).", count),
            CommandOutcome::NothingToChange => {
                "I couldn't understand that command or no devices needed changing.".to_string()
            }
            CommandOutcome::Failed => "Sorry, something went wrong.".to_string(),
        }
    }
}

/// Submits commands one at a time
///
/// While a submission is awaiting the service, further submissions are
/// rejected instead of queued.
pub struct CommandSession<S> {
    service: S,
    timeout: Duration,
    pending: AtomicBool,
}

impl<S: GenerationService> CommandSession<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            timeout: DEFAULT_COMMAND_TIMEOUT,
            pending: AtomicBool::new(false),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True while a submission is in flight
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Interpret `input` and merge the result into `home`
    ///
    /// Blank input and overlapping submissions are rejected with an error
    /// before the service is called. Everything after that resolves to a
    /// [`CommandOutcome`].
    pub async fn submit(&self, input: &str, home: &mut DeviceCollection) -> Result<CommandOutcome> {
        let command = input.trim();
        if command.is_empty() {
            return Err(HomeError::InvalidCommand("empty command".into()));
        }

        let _guard = PendingGuard::acquire(&self.pending).ok_or_else(|| {
            HomeError::InvalidCommand("a command is already in progress".into())
        })?;

        let interpreted = tokio::time::timeout(
            self.timeout,
            interpret_command(&self.service, command, home.devices()),
        )
        .await;

        let updates = match interpreted {
            Ok(Ok(updates)) => updates,
            Ok(Err(e)) => {
                warn!(error = %e, command, "Command failed");
                return Ok(CommandOutcome::Failed);
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, command, "Command timed out");
                return Ok(CommandOutcome::Failed);
            }
        };

        let actionable = actionable_count(&updates, home);
        if actionable == 0 {
            info!(command, returned = updates.len(), "Nothing to change");
            return Ok(CommandOutcome::NothingToChange);
        }

        let changed = home.apply(&updates);
        info!(command, devices = actionable, changed, "Command applied");
        Ok(CommandOutcome::Updated { count: actionable })
    }
}

/// Known devices whose winning update still carries a field once restricted
/// to the device's type
fn actionable_count(updates: &[PartialUpdate], home: &DeviceCollection) -> usize {
    let mut seen = HashSet::new();
    updates
        .iter()
        .filter(|u| seen.insert(&u.id))
        .filter(|u| {
            home.get(&u.id)
                .map_or(false, |d| !u.restricted_to(d.device_type).is_empty())
        })
        .count()
}

/// Holds the pending flag for the lifetime of one submission
struct PendingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DeviceId;
    use crate::llm::service::GenerationRequest;
    use async_trait::async_trait;

    struct Fixed(&'static str);

    #[async_trait]
    impl GenerationService for Fixed {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    #[async_trait]
    impl GenerationService for Broken {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            Err(HomeError::Llm("connection refused".into()))
        }
    }

    struct Slow;

    #[async_trait]
    impl GenerationService for Slow {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok("[]".into())
        }
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            CommandOutcome::Updated { count: 2 }.message(),
            "Updated 2 device(s)."
        );
        assert!(CommandOutcome::NothingToChange
            .message()
            .starts_with("I couldn't understand"));
        assert_eq!(CommandOutcome::Failed.message(), "Sorry, something went wrong.");
    }

    #[tokio::test]
    async fn test_submit_applies_updates() {
        let session = CommandSession::new(Fixed(r#"[{"id": "4", "isOn": true, "value": 60}]"#));
        let mut home = DeviceCollection::demo();

        let outcome = session.submit("kitchen lights to 60%", &mut home).await.unwrap();

        assert_eq!(outcome, CommandOutcome::Updated { count: 1 });
        let spots = home.get(&DeviceId::new("4")).unwrap();
        assert!(spots.is_on);
        assert_eq!(spots.value, Some(60.0));
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_input() {
        let session = CommandSession::new(Fixed("[]"));
        let mut home = DeviceCollection::demo();
        let result = session.submit("   ", &mut home).await;
        assert!(matches!(result, Err(HomeError::InvalidCommand(_))));
    }

    #[tokio::test]
    async fn test_submit_nothing_to_change() {
        let session = CommandSession::new(Fixed("[]"));
        let mut home = DeviceCollection::demo();
        let before = home.clone();

        let outcome = session.submit("open the garage", &mut home).await.unwrap();

        assert_eq!(outcome, CommandOutcome::NothingToChange);
        assert_eq!(home, before);
    }

    #[tokio::test]
    async fn test_submit_unknown_ids_only() {
        let session = CommandSession::new(Fixed(r#"[{"id": "garage", "isOn": true}]"#));
        let mut home = DeviceCollection::demo();
        let before = home.clone();

        let outcome = session.submit("open the garage", &mut home).await.unwrap();

        assert_eq!(outcome, CommandOutcome::NothingToChange);
        assert_eq!(home, before);
    }

    #[tokio::test]
    async fn test_submit_value_for_lock_changes_nothing() {
        let session = CommandSession::new(Fixed(r#"[{"id": "3", "value": 12}]"#));
        let mut home = DeviceCollection::demo();
        let before = home.clone();

        let outcome = session.submit("set the door to 12", &mut home).await.unwrap();

        assert_eq!(outcome, CommandOutcome::NothingToChange);
        assert_eq!(home, before);
    }

    #[tokio::test]
    async fn test_submit_counts_first_update_per_device() {
        let session = CommandSession::new(Fixed(
            r#"[{"id": "3", "value": 1}, {"id": "3", "status": "Locked"}, {"id": "1", "isOn": false}]"#,
        ));
        let mut home = DeviceCollection::demo();

        let outcome = session.submit("lock up", &mut home).await.unwrap();

        assert_eq!(outcome, CommandOutcome::Updated { count: 1 });
        assert_eq!(
            home.get(&DeviceId::new("3")).unwrap().status.as_deref(),
            Some("Unlocked")
        );
        assert!(!home.get(&DeviceId::new("1")).unwrap().is_on);
    }

    #[tokio::test]
    async fn test_submit_service_failure() {
        let session = CommandSession::new(Broken);
        let mut home = DeviceCollection::demo();
        let before = home.clone();

        let outcome = session.submit("lights off", &mut home).await.unwrap();

        assert_eq!(outcome, CommandOutcome::Failed);
        assert_eq!(home, before);
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn test_submit_times_out() {
        let session = CommandSession::new(Slow).with_timeout(Duration::from_millis(20));
        let mut home = DeviceCollection::demo();

        let outcome = session.submit("lights off", &mut home).await.unwrap();

        assert_eq!(outcome, CommandOutcome::Failed);
        assert!(!session.is_pending());
    }

    #[test]
    fn test_pending_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let first = PendingGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(PendingGuard::acquire(&flag).is_none());
        drop(first);
        assert!(PendingGuard::acquire(&flag).is_some());
    }
}
