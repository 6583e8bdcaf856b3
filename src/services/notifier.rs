//! Daily overdue-loan reminder job
//!
//! Gathers the late loans, collects the distinct customer emails and sends
//! one templated reminder to the whole list. A failed send is logged and
//! swallowed; the run always completes and the next tick happens regardless.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::config::LoansConfig;

use super::{email::ReminderMailer, loans::LoansService};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

pub struct OverdueNotifier {
    loans: LoansService,
    mailer: Arc<dyn ReminderMailer>,
    config: LoansConfig,
}

impl OverdueNotifier {
    pub fn new(loans: LoansService, mailer: Arc<dyn ReminderMailer>, config: LoansConfig) -> Self {
        Self {
            loans,
            mailer,
            config,
        }
    }

    /// Daily loop; runs until the task is dropped. Awaiting `run_once`
    /// before the next tick keeps invocations non-overlapping.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(DAY);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick of a tokio interval fires immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            self.run_once().await;
        }
    }

    /// One notifier run. Never fails: errors are logged and the run completes.
    pub async fn run_once(&self) {
        let late_loans = match self.loans.get_all_late_loans().await {
            Ok(loans) => loans,
            Err(e) => {
                tracing::error!("Failed to fetch late loans: {}", e);
                return;
            }
        };

        let recipients = distinct_emails(late_loans.iter().map(|l| l.customer_email.as_str()));
        if recipients.is_empty() {
            tracing::debug!("No late loans, skipping reminder run");
            return;
        }

        match self
            .mailer
            .send_reminder(
                &self.config.reminder_subject,
                &self.config.reminder_message,
                &recipients,
            )
            .await
        {
            Ok(()) => tracing::info!(
                "Sent late loan reminder to {} recipient(s)",
                recipients.len()
            ),
            Err(e) => tracing::error!("Failed to send late loan reminder: {}", e),
        }
    }
}

/// Distinct emails in first-seen order
fn distinct_emails<'a>(emails: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for email in emails {
        if !result.iter().any(|e| e == email) {
            result.push(email.to_string());
        }
    }
    result
}
