// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{MailError, Mailer, OutgoingEmail};

/// Keeps sent messages in memory; can be switched to fail every send.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: AtomicBool,
}

impl MemoryMailer {
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|g| g.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn last_to(&self, to: &str) -> Option<OutgoingEmail> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    fn transport_tag(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(MailError::Transport("memory mailer set to fail".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| MailError::Transport("mailbox lock poisoned".to_string()))?
            .push(email.clone());
        Ok(())
    }
}
