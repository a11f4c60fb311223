/// Email bodies
///
/// User-supplied values are HTML-escaped before interpolation.

use super::EmailMessage;

const PRODUCT: &str = "Task Management System";

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Account verification code
pub fn otp_email(to: &str, first_name: &str, otp: &str, valid_minutes: i64) -> EmailMessage {
    let html = format!(
        "<h1>{PRODUCT}</h1>\
         <p>Hello {name},</p>\
         <p>Your OTP for account verification is:</p>\
         <h2>{otp}</h2>\
         <p>This OTP will expire in {valid_minutes} minutes.</p>\
         <p>If you did not request this OTP, please ignore this email.</p>\
         <p>Regards,<br>Task Management Team</p>",
        name = escape(first_name),
        otp = escape(otp),
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Account Verification OTP".to_string(),
        html,
    }
}

/// Password reset link
pub fn reset_email(to: &str, reset_url: &str) -> EmailMessage {
    let url = escape(reset_url);
    let html = format!(
        "<h1>{PRODUCT}</h1>\
         <p>You are receiving this email because you (or someone else) requested a password reset.</p>\
         <p>Please follow this link to choose a new password:</p>\
         <p><a href=\"{url}\">{url}</a></p>\
         <p>This link will expire in 10 minutes.</p>\
         <p>If you did not request this, please ignore this email.</p>"
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Password Reset Request".to_string(),
        html,
    }
}

/// Pulls the code out of an [`otp_email`] body
pub fn extract_otp(html: &str) -> Option<String> {
    let start = html.find("<h2>")? + "<h2>".len();
    let end = html[start..].find("</h2>")? + start;
    Some(html[start..end].to_string())
}

/// Pulls the reset token (last path segment of the link) out of a [`reset_email`] body
pub fn extract_reset_token(html: &str) -> Option<String> {
    let start = html.find("href=\"")? + "href=\"".len();
    let end = html[start..].find('"')? + start;
    html[start..end].rsplit('/').next().map(str::to_string)
}
