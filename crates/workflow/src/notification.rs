//! Notifications fired when a workflow execution reaches a terminal phase.

use serde::{Deserialize, Serialize};
use skiff_core::{ExecutionPhase, Phase};

use crate::error::WorkflowError;

/// Delivery channel and its recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationTarget {
    /// Email.
    Email {
        /// Addresses.
        recipients: Vec<String>,
    },
    /// PagerDuty, addressed by integration email.
    PagerDuty {
        /// Addresses.
        recipients: Vec<String>,
    },
    /// Slack, addressed by channel email.
    Slack {
        /// Addresses.
        recipients: Vec<String>,
    },
}

impl NotificationTarget {
    /// The recipients, whatever the channel.
    #[must_use]
    pub fn recipients(&self) -> &[String] {
        match self {
            Self::Email { recipients }
            | Self::PagerDuty { recipients }
            | Self::Slack { recipients } => recipients,
        }
    }
}

/// A validated notification. Phases are non-empty and all terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    phases: Vec<ExecutionPhase>,
    target: NotificationTarget,
}

impl Notification {
    /// Create a notification, rejecting empty or non-terminal phase lists.
    pub fn new(
        phases: Vec<ExecutionPhase>,
        target: NotificationTarget,
    ) -> Result<Self, WorkflowError> {
        if phases.is_empty() {
            return Err(WorkflowError::NotificationWithoutPhases);
        }
        if let Some(&phase) = phases.iter().find(|phase| !phase.is_terminal()) {
            return Err(WorkflowError::NonTerminalNotificationPhase(phase));
        }
        Ok(Self { phases, target })
    }

    /// Email notification.
    pub fn email(
        phases: Vec<ExecutionPhase>,
        recipients: Vec<String>,
    ) -> Result<Self, WorkflowError> {
        Self::new(phases, NotificationTarget::Email { recipients })
    }

    /// PagerDuty notification.
    pub fn pager_duty(
        phases: Vec<ExecutionPhase>,
        recipients: Vec<String>,
    ) -> Result<Self, WorkflowError> {
        Self::new(phases, NotificationTarget::PagerDuty { recipients })
    }

    /// Slack notification.
    pub fn slack(
        phases: Vec<ExecutionPhase>,
        recipients: Vec<String>,
    ) -> Result<Self, WorkflowError> {
        Self::new(phases, NotificationTarget::Slack { recipients })
    }

    /// Phases that fire this notification, in the order given.
    #[must_use]
    pub fn phases(&self) -> &[ExecutionPhase] {
        &self.phases
    }

    /// Delivery target.
    #[must_use]
    pub fn target(&self) -> &NotificationTarget {
        &self.target
    }
}

/// Recipient list as transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecipientsRecord {
    /// Addresses.
    #[serde(default)]
    pub recipients_email: Vec<String>,
}

/// A notification as transmitted: phases plus at most one populated channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Phases.
    #[serde(default)]
    pub phases: Vec<ExecutionPhase>,
    /// Email channel.
    #[serde(default)]
    pub email: Option<RecipientsRecord>,
    /// PagerDuty channel.
    #[serde(default)]
    pub pager_duty: Option<RecipientsRecord>,
    /// Slack channel.
    #[serde(default)]
    pub slack: Option<RecipientsRecord>,
}

impl TryFrom<NotificationRecord> for Notification {
    type Error = WorkflowError;

    /// Email wins over PagerDuty, which wins over Slack.
    fn try_from(record: NotificationRecord) -> Result<Self, Self::Error> {
        let target = if let Some(email) = record.email {
            NotificationTarget::Email {
                recipients: email.recipients_email,
            }
        } else if let Some(pd) = record.pager_duty {
            NotificationTarget::PagerDuty {
                recipients: pd.recipients_email,
            }
        } else if let Some(slack) = record.slack {
            NotificationTarget::Slack {
                recipients: slack.recipients_email,
            }
        } else {
            return Err(WorkflowError::MissingNotificationTarget);
        };
        Self::new(record.phases, target)
    }
}

impl From<&Notification> for NotificationRecord {
    fn from(notification: &Notification) -> Self {
        let recipients = RecipientsRecord {
            recipients_email: notification.target.recipients().to_vec(),
        };
        let mut record = Self {
            phases: notification.phases.clone(),
            ..Self::default()
        };
        match notification.target {
            NotificationTarget::Email { .. } => record.email = Some(recipients),
            NotificationTarget::PagerDuty { .. } => record.pager_duty = Some(recipients),
            NotificationTarget::Slack { .. } => record.slack = Some(recipients),
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use skiff_core::FaultKind;

    use super::*;

    fn recipients() -> Vec<String> {
        vec!["ops@example.com".to_owned()]
    }

    #[test]
    fn empty_phases_rejected() {
        let err = Notification::email(Vec::new(), recipients()).unwrap_err();
        assert!(matches!(err, WorkflowError::NotificationWithoutPhases));
        assert_eq!(err.kind(), FaultKind::User);
    }

    #[rstest]
    #[case(ExecutionPhase::Running)]
    #[case(ExecutionPhase::Queued)]
    #[case(ExecutionPhase::Aborting)]
    #[case(ExecutionPhase::Undefined)]
    fn non_terminal_phase_rejected(#[case] phase: ExecutionPhase) {
        let err =
            Notification::slack(vec![ExecutionPhase::Succeeded, phase], recipients()).unwrap_err();
        assert!(matches!(err, WorkflowError::NonTerminalNotificationPhase(p) if p == phase));
        assert_eq!(err.kind(), FaultKind::User);
    }

    #[test]
    fn phases_survive_record_cycle() {
        let phases = vec![ExecutionPhase::Succeeded, ExecutionPhase::Failed];
        let original = Notification::pager_duty(phases.clone(), recipients()).unwrap();
        let record = NotificationRecord::from(&original);
        assert!(record.email.is_none());
        assert!(record.pager_duty.is_some());

        let rebuilt = Notification::try_from(record).unwrap();
        assert_eq!(rebuilt.phases(), phases.as_slice());
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn email_takes_precedence() {
        let record = NotificationRecord {
            phases: vec![ExecutionPhase::Aborted],
            email: Some(RecipientsRecord {
                recipients_email: vec!["a@example.com".into()],
            }),
            pager_duty: None,
            slack: Some(RecipientsRecord {
                recipients_email: vec!["b@example.com".into()],
            }),
        };
        let n = Notification::try_from(record).unwrap();
        assert!(matches!(n.target(), NotificationTarget::Email { .. }));
        assert_eq!(n.target().recipients(), &["a@example.com".to_owned()]);
    }

    #[test]
    fn record_without_channel_is_system_fault() {
        let record = NotificationRecord {
            phases: vec![ExecutionPhase::Succeeded],
            ..NotificationRecord::default()
        };
        let err = Notification::try_from(record).unwrap_err();
        assert_eq!(err.kind(), FaultKind::System);
    }

    #[test]
    fn record_with_bad_phase_is_rejected() {
        let record = NotificationRecord {
            phases: vec![ExecutionPhase::Running],
            slack: Some(RecipientsRecord::default()),
            ..NotificationRecord::default()
        };
        assert!(matches!(
            Notification::try_from(record),
            Err(WorkflowError::NonTerminalNotificationPhase(ExecutionPhase::Running))
        ));
    }
}
