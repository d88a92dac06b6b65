//! Support contact configuration.

/// Subject line used when composing a support email.
pub const DEFAULT_EMAIL_SUBJECT: &str = "Support Request";

/// Label lines pre-filled into the support email body, in order.
pub const DEFAULT_EMAIL_BODY_LINES: &[&str] = &[
    "Name:",
    "Company/Property:",
    "Best callback #:",
    "Issue Summary:",
];

/// Separator used to join the body lines.
pub const EMAIL_LINE_SEPARATOR: &str = "\n";

/// Who the user reaches when they tap "Call" or "Email".
///
/// Constant for the whole session. The digit-only phone string is derived
/// from the display string rather than configured separately, so the two
/// can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactTarget {
    phone_display: String,
    email: String,
    email_subject: String,
    email_body_lines: Vec<String>,
}

impl ContactTarget {
    /// Create a target with the default subject and body template.
    pub fn new(phone_display: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            phone_display: phone_display.into(),
            email: email.into(),
            email_subject: DEFAULT_EMAIL_SUBJECT.to_string(),
            email_body_lines: DEFAULT_EMAIL_BODY_LINES
                .iter()
                .map(|line| line.to_string())
                .collect(),
        }
    }

    /// Replace the subject and body template.
    pub fn with_email_template(
        mut self,
        subject: impl Into<String>,
        body_lines: Vec<String>,
    ) -> Self {
        self.email_subject = subject.into();
        self.email_body_lines = body_lines;
        self
    }

    pub fn phone_display(&self) -> &str {
        &self.phone_display
    }

    /// ASCII digits of the display string, order preserved.
    ///
    /// `"770-953-2500"` becomes `"7709532500"`.
    pub fn phone_digits(&self) -> String {
        self.phone_display
            .chars()
            .filter(char::is_ascii_digit)
            .collect()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn email_subject(&self) -> &str {
        &self.email_subject
    }

    pub fn email_body_lines(&self) -> &[String] {
        &self.email_body_lines
    }

    /// Body lines joined with [`EMAIL_LINE_SEPARATOR`].
    pub fn email_body(&self) -> String {
        self.email_body_lines.join(EMAIL_LINE_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_digits_strips_punctuation() {
        let target = ContactTarget::new("770-953-2500", "support@csatlanta.com");
        assert_eq!(target.phone_digits(), "7709532500");
    }

    #[test]
    fn test_phone_digits_keeps_order_with_mixed_formatting() {
        let target = ContactTarget::new("+1 (770) 953.2500 ext 9", "a@b.c");
        assert_eq!(target.phone_digits(), "177095325009");
    }

    #[test]
    fn test_phone_digits_empty_when_no_digits() {
        let target = ContactTarget::new("call us", "a@b.c");
        assert!(target.phone_digits().is_empty());
    }

    #[test]
    fn test_default_email_body() {
        let target = ContactTarget::new("1", "a@b.c");
        assert_eq!(
            target.email_body(),
            "Name:\nCompany/Property:\nBest callback #:\nIssue Summary:"
        );
        assert_eq!(target.email_subject(), "Support Request");
    }

    #[test]
    fn test_custom_email_template() {
        let target = ContactTarget::new("1", "a@b.c")
            .with_email_template("Help", vec!["Site:".to_string(), "Room:".to_string()]);
        assert_eq!(target.email_subject(), "Help");
        assert_eq!(target.email_body(), "Site:\nRoom:");
    }
}
