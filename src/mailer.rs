//! Outgoing mail. Production uses SMTP through `lettre`, local runs log the mail instead.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::collections::HashMap;

use crate::{
    constants::*,
    models::OtpPurpose,
    utils::{env_or, replace_placeholders},
};

#[cfg(test)]
use mockall::automock;

const OTP_TEMPLATE: &str = "Hello {{name}},\n\n\
Your verification code for {{purpose}} is {{code}}.\n\
It expires in {{minutes}} minutes. If you did not request it you can ignore this mail.\n\n\
{{sender}}";

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    pub fn otp(
        to_email: &str,
        to_name: Option<&str>,
        purpose: OtpPurpose,
        code: &str,
        minutes: u64,
    ) -> anyhow::Result<Self> {
        let sender = env_or("MAIL_FROM_NAME", DEFAULT_MAIL_FROM_NAME.to_owned());
        let mut options = HashMap::new();
        options.insert("name", to_name.unwrap_or("there").to_owned());
        options.insert("purpose", purpose.describe().to_owned());
        options.insert("code", code.to_owned());
        options.insert("minutes", minutes.to_string());
        options.insert("sender", sender);
        let body = replace_placeholders(OTP_TEMPLATE, &options)?;
        Ok(Self {
            to_email: to_email.to_owned(),
            to_name: to_name.map(str::to_owned),
            subject: format!("Your {} code", purpose.describe()),
            body,
        })
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<()>;
}

/// Writes the mail to the log instead of delivering it
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<()> {
        tracing::debug!(
            "Send mail `{}` to {}:\n{}",
            mail.subject,
            mail.to_email,
            mail.body
        );
        Ok(())
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the SMTP relay from `SMTP_*` and `MAIL_FROM_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("SMTP_HOST")
            .map_err(|_| anyhow::anyhow!("SMTP_HOST not found in .env file"))?;
        let port = env_or("SMTP_PORT", DEFAULT_SMTP_PORT);
        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let password = std::env::var("SMTP_PASSWORD").unwrap_or_default();
        let use_tls = env_or("SMTP_USE_TLS", true);
        let builder = if use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)?
        } else {
            tracing::warn!("SMTP TLS is disabled");
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host)
        };
        let transport = builder
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();
        let from_email = env_or("MAIL_FROM_EMAIL", DEFAULT_MAIL_FROM_EMAIL.to_owned());
        let from_name = env_or("MAIL_FROM_NAME", DEFAULT_MAIL_FROM_NAME.to_owned());
        let from = format!("{from_name} <{from_email}>").parse::<Mailbox>()?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<()> {
        let to = match &mail.to_name {
            Some(name) => format!("{name} <{}>", mail.to_email),
            None => mail.to_email.clone(),
        };
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>()?)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)?;
        self.transport.send(message).await?;
        Ok(())
    }
}
