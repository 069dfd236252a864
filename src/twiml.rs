//! TwiML reply envelope.
//!
//! Twilio reads the webhook response body as TwiML. A single `<Message>`
//! inside `<Response>` is sent back to the WhatsApp sender as a chat reply.

use quick_xml::escape::escape;

/// Content type of TwiML responses.
pub const CONTENT_TYPE: &str = "application/xml";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Render a `<Response>` carrying one `<Message>` with `text`.
///
/// XML special characters in `text` are escaped.
pub fn render_message(text: &str) -> String {
    format!(
        "{}<Response><Message>{}</Message></Response>",
        XML_DECLARATION,
        escape(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain() {
        assert_eq!(
            render_message("We open at 8am."),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>We open at 8am.</Message></Response>"
        );
    }

    #[test]
    fn test_render_escapes_markup() {
        let xml = render_message("Tea & <coffee>");
        assert!(xml.contains("<Message>Tea &amp; &lt;coffee&gt;</Message>"));
        assert!(!xml.contains("<coffee>"));
    }

    #[test]
    fn test_render_empty() {
        assert!(render_message("").ends_with("<Response><Message></Message></Response>"));
    }
}
