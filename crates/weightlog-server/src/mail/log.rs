// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use tracing::{debug, info};

use super::{MailError, Mailer, OutgoingEmail};

/// Writes messages to the log instead of delivering them.
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    #[must_use]
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    fn transport_tag(&self) -> &'static str {
        "log"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        info!(
            target: "weightlog_mail",
            from = %self.sender,
            to = %email.to,
            subject = %email.subject,
            "email not delivered: log transport"
        );
        debug!(target: "weightlog_mail", html = %email.html, "email body");
        Ok(())
    }
}
