// SPDX-License-Identifier: Apache-2.0

mod http;
mod log;
mod memory;
pub mod templates;

use async_trait::async_trait;
use serde::Serialize;

pub use self::http::{HttpMailer, RetryPolicy};
pub use self::log::LogMailer;
pub use self::memory::MemoryMailer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MailError {
    #[error("mail transport rejected message with status {status}")]
    Rejected { status: u16 },
    #[error("mail transport unavailable: {0}")]
    Transport(String),
    #[error("mail transport misconfigured: {0}")]
    Config(String),
}

/// Outbound email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    fn transport_tag(&self) -> &'static str;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}
