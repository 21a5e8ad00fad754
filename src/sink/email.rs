//! Mail each post through an authenticated SMTP session.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport as _};
use tracing::{debug, info};

use super::ActionSink;
use crate::error::{ConfigurationError, SinkError};
use crate::source::Item;

pub const DEFAULT_FROM: &str = "postwatch@noanswer.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Everything needed to open the outbound mail session.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub host: String,
    pub port: u16,
    pub login: String,
    pub password: String,
    /// Sender address; [`DEFAULT_FROM`] when unset.
    pub from: Option<String>,
    /// Recipient address; the login when unset.
    pub to: Option<String>,
    /// Tag shown in the subject, usually the watched user or term.
    pub subject_tag: String,
}

/// Subject of every notification mail.
pub fn subject_line(tag: &str) -> String {
    format!("postwatch[ {tag} ]: New post !")
}

fn mailbox(address: &str) -> Result<Mailbox, ConfigurationError> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| ConfigurationError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

pub struct EmailSink {
    mailer: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
    subject_tag: String,
}

impl EmailSink {
    /// Open the session and authenticate.  Fails if the server is
    /// unreachable or rejects the login.
    pub fn connect(settings: EmailSettings) -> Result<Self, SinkError> {
        let sink = Self::new(settings)?;
        if !sink.mailer.test_connection()? {
            return Err(SinkError::Custom(
                "SMTP server did not accept the connection".into(),
            ));
        }
        info!(to = %sink.to, "mail session ready");
        Ok(sink)
    }

    /// Build the sink without touching the network.
    pub fn new(settings: EmailSettings) -> Result<Self, ConfigurationError> {
        let from = mailbox(settings.from.as_deref().unwrap_or(DEFAULT_FROM))?;
        let to = mailbox(settings.to.as_deref().unwrap_or(&settings.login))?;

        let mailer = SmtpTransport::starttls_relay(&settings.host)
            .map_err(|e| ConfigurationError::Invalid(format!("SMTP host {:?}: {e}", settings.host)))?
            .port(settings.port)
            .credentials(Credentials::new(settings.login, settings.password))
            .build();

        Ok(Self {
            mailer,
            from,
            to,
            subject_tag: settings.subject_tag,
        })
    }

    /// The mail sent for `item`.
    pub fn message(&self, item: &Item) -> Result<Message, SinkError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject_line(&self.subject_tag))
            .header(ContentType::TEXT_PLAIN)
            .body(item.to_string())?;
        Ok(message)
    }
}

impl ActionSink for EmailSink {
    fn send(&mut self, item: &Item) -> Result<(), SinkError> {
        let message = self.message(item)?;
        self.mailer.send(&message)?;
        debug!(permalink = item.permalink(), to = %self.to, "mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EmailSettings {
        EmailSettings {
            host: "smtp.example.com".into(),
            port: DEFAULT_SMTP_PORT,
            login: "bot@example.com".into(),
            password: "secret".into(),
            from: None,
            to: None,
            subject_tag: "milk chocolate".into(),
        }
    }

    #[test]
    fn message_carries_headers_and_rendered_item() {
        let sink = EmailSink::new(settings()).unwrap();
        let item = Item::new("so good", "alice", "9:00 AM", "https://x.test/alice/status/1");

        let raw = String::from_utf8(sink.message(&item).unwrap().formatted()).unwrap();

        assert!(raw.contains("From: postwatch@noanswer.com"));
        assert!(raw.contains("To: bot@example.com"));
        assert!(raw.contains("Subject: postwatch[ milk chocolate ]: New post !"));
        assert!(raw.contains("so good"));
        assert!(raw.contains("Author: alice"));
        assert!(raw.contains("Date: 9:00 AM"));
        assert!(raw.contains("Link: https://x.test/alice/status/1"));
    }

    #[test]
    fn explicit_addresses_override_defaults() {
        let sink = EmailSink::new(EmailSettings {
            from: Some("Watcher <watch@example.org>".into()),
            to: Some("me@example.org".into()),
            ..settings()
        })
        .unwrap();
        assert_eq!(sink.from.email.to_string(), "watch@example.org");
        assert_eq!(sink.to.email.to_string(), "me@example.org");
    }

    #[test]
    fn login_that_is_not_an_address_needs_explicit_recipient() {
        let err = EmailSink::new(EmailSettings {
            login: "bot".into(),
            ..settings()
        })
        .err()
        .unwrap();
        assert!(matches!(err, ConfigurationError::InvalidAddress { .. }));
    }

    #[test]
    fn subject_line_template() {
        assert_eq!(subject_line("alice"), "postwatch[ alice ]: New post !");
    }
}
