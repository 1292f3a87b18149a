// SPDX-License-Identifier: Apache-2.0

use weightlog_api::format_rate;

use super::OutgoingEmail;

#[must_use]
pub fn verification_email(app_url: &str, to: &str, token: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: "Verify Your Email".to_string(),
        html: format!(
            "<p>Please verify your email by clicking the link below:</p>\n\
             <a href=\"{app_url}/verify-email?token={token}\">Verify Email</a>"
        ),
    }
}

#[must_use]
pub fn password_reset_email(app_url: &str, to: &str, token: &str, ttl_hours: u64) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: "Reset Your Password".to_string(),
        html: format!(
            "<p>You requested a password reset. Click the link below to reset your password:</p>\n\
             <a href=\"{app_url}/reset-password?token={token}\">Reset Password</a>\n\
             <p>This link will expire in {ttl_hours} hours.</p>"
        ),
    }
}

#[must_use]
pub fn progress_email(to: &str, rate_kg_per_week: Option<f64>) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: "Weekly Weight Progress".to_string(),
        html: format!(
            "<p>Your weight change this week: {} kg/week</p>",
            format_rate(rate_kg_per_week)
        ),
    }
}
