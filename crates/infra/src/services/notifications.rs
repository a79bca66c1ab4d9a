//! Client notifications and OTP-confirmed email changes.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use veridoc_access::OperatorAccount;
use veridoc_core::{EmailAddress, EngineError, EngineResult};
use veridoc_review::AuditEntry;

use crate::activity::ActivityLog;
use crate::providers::OtpProvider;
use crate::store::RecordStore;

pub struct NotificationService<P> {
    otp: P,
    operators: Arc<dyn RecordStore<OperatorAccount>>,
    activity: Arc<dyn ActivityLog>,
}

impl<P> NotificationService<P>
where
    P: OtpProvider,
{
    pub fn new(
        otp: P,
        operators: Arc<dyn RecordStore<OperatorAccount>>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            otp,
            operators,
            activity,
        }
    }

    /// Record a notification to a client in the client's activity log.
    /// Gated on the `send_notifications` permission. Delivery itself happens
    /// outside the engine; the log entry is the system of record.
    pub fn notify_client(
        &self,
        actor: &OperatorAccount,
        client: &EmailAddress,
        message: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        actor.require_permission("send_notifications")?;

        let message = message.trim();
        if message.is_empty() {
            return Err(EngineError::validation("notification message is empty"));
        }

        self.activity.append(
            client,
            AuditEntry {
                actor_name: actor.display_name.clone(),
                actor_role: actor.level.to_string(),
                action: "send_notification".to_string(),
                details: message.to_string(),
                timestamp_utc: now,
            },
        )?;
        Ok(())
    }

    /// Start an operator email change: a confirmation code goes to the new
    /// address. The account only changes once the code is confirmed.
    pub async fn request_email_change(
        &self,
        actor: &OperatorAccount,
        new_email: &EmailAddress,
    ) -> EngineResult<()> {
        if self.operators.get(new_email).is_some() {
            return Err(EngineError::validation(format!(
                "{} already belongs to an operator",
                new_email
            )));
        }
        self.otp.send_code(new_email.as_str()).await?;
        tracing::info!(operator = %actor.email, new_email = %new_email, "email change code sent");
        Ok(())
    }

    /// Complete an email change by confirming the code, rekeying the
    /// operator record under the new address.
    pub async fn confirm_email_change(
        &self,
        actor: &OperatorAccount,
        new_email: EmailAddress,
        code: &str,
    ) -> EngineResult<OperatorAccount> {
        let valid = self.otp.verify_code(new_email.as_str(), code).await?;
        if !valid {
            return Err(EngineError::validation("invalid confirmation code"));
        }

        let mut account = self
            .operators
            .get(&actor.email)
            .ok_or_else(EngineError::not_found)?;
        self.operators.delete(&actor.email);
        account.email = new_email.clone();
        self.operators.set(new_email, account.clone());
        Ok(account)
    }
}
