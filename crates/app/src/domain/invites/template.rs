//! Invitation email rendering.

use crate::{domain::users::records::Role, integrations::EmailMessage};

const INVITE_TEMPLATE: &str = include_str!("templates/invite.html");

/// Values substituted into the invitation email.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InviteEmail<'a> {
    pub recipient_email: &'a str,
    pub recipient_name: &'a str,
    pub role: Role,
    pub inviter_name: &'a str,
    pub school_name: &'a str,
    pub signup_url: &'a str,
    pub token: &'a str,
}

impl InviteEmail<'_> {
    pub(crate) fn render(&self) -> EmailMessage {
        let link = signup_link(self.signup_url, self.token);

        let html = INVITE_TEMPLATE
            .replace("{{name}}", &escape_html(self.recipient_name))
            .replace("{{role}}", self.role.as_str())
            .replace("{{inviter}}", &escape_html(self.inviter_name))
            .replace("{{school}}", &escape_html(self.school_name))
            .replace("{{link}}", &escape_html(&link));

        EmailMessage {
            to: self.recipient_email.to_string(),
            subject: format!("You have been invited to join {} on ScholarLink", self.school_name),
            html,
        }
    }
}

fn signup_link(signup_url: &str, token: &str) -> String {
    let separator = if signup_url.contains('?') { '&' } else { '?' };

    format!("{signup_url}{separator}token={token}")
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email<'a>(name: &'a str, signup_url: &'a str) -> InviteEmail<'a> {
        InviteEmail {
            recipient_email: "jane@x.com",
            recipient_name: name,
            role: Role::Student,
            inviter_name: "Admin A",
            school_name: "Green Hills",
            signup_url,
            token: "abc123",
        }
    }

    #[test]
    fn render_substitutes_every_placeholder() {
        let message = email("Jane Doe", "https://app.test/invite").render();

        assert_eq!(message.to, "jane@x.com");
        assert!(message.subject.contains("Green Hills"));
        assert!(message.html.contains("Jane Doe"));
        assert!(message.html.contains("student"));
        assert!(message.html.contains("Admin A"));
        assert!(message.html.contains("https://app.test/invite?token=abc123"));
        assert!(!message.html.contains("{{"), "unrendered placeholder left behind");
    }

    #[test]
    fn render_escapes_user_supplied_values() {
        let message = email("<script>x</script>", "https://app.test/invite?ref=mail").render();

        assert!(message.html.contains("&lt;script&gt;"));
        assert!(message.html.contains("https://app.test/invite?ref=mail&amp;token=abc123"));
    }
}
