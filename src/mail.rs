use anyhow::Context;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use log::info;

use crate::config::MailEnv;

/// What the mail server said about one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    pub accepted: bool,
    pub response: String,
}

#[allow(async_fn_in_trait)]
pub trait Mailer {
    async fn send(&self, to: &Address, subject: &str, body: &str) -> anyhow::Result<SendReport>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(env: MailEnv) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&env.smtp_host)
            .with_context(|| format!("invalid SMTP host {:?}", env.smtp_host))?
            .credentials(Credentials::new(env.smtp_username, env.smtp_password));
        if let Some(port) = env.smtp_port {
            builder = builder.port(port);
        }
        let from = env
            .mail_from
            .parse()
            .with_context(|| format!("invalid MAIL_FROM {:?}", env.mail_from))?;
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, to: &Address, subject: &str, body: &str) -> anyhow::Result<SendReport> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(None, to.clone()))
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_owned())?;
        let response = self
            .transport
            .send(message)
            .await
            .with_context(|| format!("failed to send mail to {to}"))?;
        let text = response.message().collect::<Vec<_>>().join(" ");
        Ok(SendReport {
            accepted: response.is_positive(),
            response: format!("{} {text}", response.code()),
        })
    }
}

/// Logs what would have been sent.
pub struct DryRunMailer;

impl Mailer for DryRunMailer {
    async fn send(&self, to: &Address, subject: &str, body: &str) -> anyhow::Result<SendReport> {
        info!("      - (dry run) {to}: {subject}");
        for line in body.lines() {
            info!("        | {line}");
        }
        Ok(SendReport {
            accepted: true,
            response: "dry run".to_string(),
        })
    }
}
