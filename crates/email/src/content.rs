//! Shared email content templates
//!
//! Canonical content generators for shop inbox notifications, used by both
//! production (SES) and mock email services. Every customer-supplied value
//! is escaped before it is placed into HTML.

use chrono::{DateTime, Utc};

/// Escape text for inclusion in an HTML body
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wrap pre-rendered sections in the common notification layout.
///
/// `sections_html` is inserted as-is; callers escape their own values.
pub fn notification_html(heading: &str, sections_html: &str, footer: &str) -> String {
    format!(
        r#"
            <html>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 700px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #2563eb; border-bottom: 2px solid #2563eb; padding-bottom: 10px;">{heading}</h2>
                    {sections_html}
                    <hr style="border: none; border-top: 1px solid #eee; margin: 30px 0;">
                    <p style="color: #6b7280; font-size: 12px;">{footer}</p>
                </div>
            </body>
            </html>
            "#,
        heading = escape_html(heading),
        sections_html = sections_html,
        footer = escape_html(footer),
    )
}

/// Generate plain-text body for a contact form message.
pub fn contact_message_text(
    name: &str,
    email: &str,
    phone: &str,
    message: &str,
    received_at: DateTime<Utc>,
) -> String {
    format!(
        "New contact message from the Planmart storefront\n\n\
        Name: {}\n\
        Email: {}\n\
        Phone: {}\n\n\
        Message:\n\
        {}\n\n\
        Received {}",
        name,
        email,
        phone,
        message,
        received_at.format("%Y-%m-%d %H:%M UTC")
    )
}

/// Generate styled HTML body for a contact form message.
pub fn contact_message_html(
    name: &str,
    email: &str,
    phone: &str,
    message: &str,
    received_at: DateTime<Utc>,
) -> String {
    let sections = format!(
        r#"
                    <div style="background-color: #f8fafc; padding: 20px; border-radius: 8px; margin: 20px 0;">
                        <h3 style="margin-top: 0;">Contact details</h3>
                        <p><strong>Name:</strong> {name}</p>
                        <p><strong>Email:</strong> <a href="mailto:{email}">{email}</a></p>
                        <p><strong>Phone:</strong> {phone}</p>
                    </div>
                    <div style="padding: 20px; border-left: 4px solid #2563eb; margin: 20px 0;">
                        <h3 style="margin-top: 0;">Message</h3>
                        <p style="white-space: pre-wrap;">{message}</p>
                    </div>
            "#,
        name = escape_html(name),
        email = escape_html(email),
        phone = escape_html(phone),
        message = escape_html(message),
    );

    notification_html(
        "New contact message",
        &sections,
        &format!(
            "Sent from the Planmart contact form on {}",
            received_at.format("%Y-%m-%d %H:%M UTC")
        ),
    )
}
