//! Email templates for one-time passcode notifications.

use askama::Template;
use lettre::message::Mailbox;

use crate::otp::{Purpose, OTP_VALIDITY_MINUTES};

/// An email template delivering a one-time passcode. The wording depends on its [`Purpose`].
#[derive(Template, Debug)]
#[template(path = "email/otp.html")]
pub struct OtpMessage<'a> {
    /// The application name shown in the header and the activation subject.
    pub app_name: &'a str,

    /// The passcode being delivered.
    pub code: &'a str,

    /// Why the passcode was issued.
    pub purpose: Purpose,

    /// How many minutes the passcode stays valid.
    pub validity_minutes: i64,
}

impl<'a> OtpMessage<'a> {
    /// Creates a message for `code` with the standard validity period.
    pub fn new(app_name: &'a str, code: &'a str, purpose: Purpose) -> Self {
        Self {
            app_name,
            code,
            purpose,
            validity_minutes: OTP_VALIDITY_MINUTES,
        }
    }
}

impl MessageTemplate for OtpMessage<'_> {
    fn subject(&self) -> String {
        match self.purpose {
            Purpose::Activation => format!("رمز التفعيل - {}", self.app_name),
            Purpose::Reset => "رمز إعادة تعيين كلمة المرور".into(),
        }
    }
}

/// A rendered email, independent of the provider that delivers it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OutgoingEmail {
    /// The sender.
    pub from: Mailbox,

    /// The recipient.
    pub to: Mailbox,

    /// The subject line.
    pub subject: String,

    /// The HTML body.
    pub html: String,

    /// The plain text alternative of the HTML body.
    pub text: String,
}

/// An HTML [`Template`] for an email message.
pub trait MessageTemplate: Template {
    /// Gets the message's subject line.
    fn subject(&self) -> String;

    /// Renders the template into an [`OutgoingEmail`] with both HTML and plain text bodies.
    fn to(&self, from: Mailbox, to: Mailbox) -> OutgoingEmail {
        let html = self.to_string();
        let text = html2text::from_read(html.as_bytes(), usize::MAX);

        OutgoingEmail {
            from,
            to,
            subject: self.subject(),
            html,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailboxes() -> anyhow::Result<(Mailbox, Mailbox)> {
        Ok((
            "Gold Nightmare <onboarding@resend.dev>".parse()?,
            "a@b.com".parse()?,
        ))
    }

    #[test]
    fn activation_message() -> anyhow::Result<()> {
        let (from, to) = mailboxes()?;
        let email = OtpMessage::new("Gold Nightmare App", "482913", Purpose::Activation)
            .to(from.clone(), to.clone());

        assert_eq!(email.from, from);
        assert_eq!(email.to, to);
        assert_eq!(email.subject, "رمز التفعيل - Gold Nightmare App");
        assert!(email.html.contains("482913"), "HTML should contain the code");
        assert!(email.html.contains("تفعيل الحساب"));
        assert!(email.html.contains("مرحباً بك!"));
        assert!(email.html.contains("صالح لمدة 5 دقائق فقط"));
        assert!(!email.html.contains("إعادة تعيين كلمة المرور"));
        assert!(email.text.contains("482913"), "plain text should contain the code");

        Ok(())
    }

    #[test]
    fn reset_message() -> anyhow::Result<()> {
        let (from, to) = mailboxes()?;
        let email = OtpMessage::new("Gold Nightmare App", "700001", Purpose::Reset).to(from, to);

        assert_eq!(email.subject, "رمز إعادة تعيين كلمة المرور");
        assert!(email.html.contains("700001"), "HTML should contain the code");
        assert!(email.html.contains("يرجى استخدام الرمز التالي لإعادة تعيين كلمة المرور:"));
        assert!(email.html.contains("صالح لمدة 5 دقائق فقط"));
        assert!(!email.html.contains("مرحباً بك!"));

        Ok(())
    }

    #[test]
    fn app_name_escaped() -> anyhow::Result<()> {
        let (from, to) = mailboxes()?;
        let email = OtpMessage::new("<b>App</b>", "123456", Purpose::Reset).to(from, to);

        assert!(!email.html.contains("<b>App</b>"), "app name should be HTML-escaped");

        Ok(())
    }

    #[test]
    fn message_debug_shows_fields() {
        let message = OtpMessage::new("Gold Nightmare App", "482913", Purpose::Reset);
        let debug = format!("{message:?}");

        assert!(debug.starts_with("OtpMessage"), "unexpected debug output: {debug}");
        assert!(debug.contains("Reset"), "unexpected debug output: {debug}");
    }
}
