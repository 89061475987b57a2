//! Common validation and sanitising utilities.

use validator::ValidationError;

/// Maximum length of an entity type or bundle machine name.
pub const MACHINE_NAME_MAX_LENGTH: usize = 32;

/// URL schemes considered safe in user supplied links.
pub const ALLOWED_PROTOCOLS: &[&str] = &[
    "ftp", "http", "https", "irc", "mailto", "news", "nntp", "rtsp", "sftp", "ssh", "tel",
    "telnet", "webcal",
];

lazy_static::lazy_static! {
    static ref MACHINE_NAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-z0-9_]+$").unwrap();
}

/// Validates a machine name such as `node`, `event` or `conference_2024`.
pub fn validate_machine_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.len() > MACHINE_NAME_MAX_LENGTH {
        let mut err = ValidationError::new("machine_name_length");
        err.message = Some(
            format!(
                "Machine name must be between 1 and {} characters",
                MACHINE_NAME_MAX_LENGTH
            )
            .into(),
        );
        return Err(err);
    }

    if !MACHINE_NAME_REGEX.is_match(name) {
        let mut err = ValidationError::new("machine_name_format");
        err.message =
            Some("Machine name must contain only lowercase letters, digits and underscores".into());
        return Err(err);
    }

    Ok(())
}

/// Removes dangerous protocols from a URI.
///
/// Repeats until stable so that nested prefixes like `javascript:javascript:`
/// are removed completely.
pub fn strip_dangerous_protocols(uri: &str) -> String {
    let mut current = uri.to_string();

    loop {
        let before = current.clone();

        if let Some(colon) = current.find(':') {
            let first_delimiter = current.find(['/', '?', '#']);
            let is_scheme = first_delimiter.map_or(true, |d| colon < d);

            if is_scheme {
                let protocol = current[..colon].to_ascii_lowercase();
                if !ALLOWED_PROTOCOLS.contains(&protocol.as_str()) {
                    current = current[colon + 1..].to_string();
                }
            }
        }

        if current == before {
            return current;
        }
    }
}

/// Determines whether a path is an external URL.
///
/// A URL is external when it carries a scheme (or is protocol relative) and
/// that scheme survives protocol stripping.
pub fn is_external_url(path: &str) -> bool {
    if path.starts_with("//") {
        return url::Url::parse(&format!("http:{}", path)).is_ok();
    }

    match url::Url::parse(path) {
        Ok(parsed) => {
            ALLOWED_PROTOCOLS.contains(&parsed.scheme()) && strip_dangerous_protocols(path) == path
        }
        Err(_) => false,
    }
}

/// Escapes text for safe inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_machine_name() {
        assert!(validate_machine_name("node").is_ok());
        assert!(validate_machine_name("commerce_product").is_ok());
        assert!(validate_machine_name("event2024").is_ok());
        assert!(validate_machine_name("").is_err());
        assert!(validate_machine_name("Event").is_err());
        assert!(validate_machine_name("my-type").is_err());
        assert!(validate_machine_name(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_machine_name_error_message() {
        let err = validate_machine_name("bad name").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Machine name must contain only lowercase letters, digits and underscores"
        );
    }

    #[test]
    fn test_strip_dangerous_protocols() {
        assert_eq!(strip_dangerous_protocols("javascript:alert(1)"), "alert(1)");
        assert_eq!(
            strip_dangerous_protocols("javascript:javascript:alert(1)"),
            "alert(1)"
        );
        assert_eq!(strip_dangerous_protocols("JavaScript:x"), "x");
        assert_eq!(
            strip_dangerous_protocols("https://example.com/a"),
            "https://example.com/a"
        );
        assert_eq!(strip_dangerous_protocols("/thanks"), "/thanks");
        assert_eq!(
            strip_dangerous_protocols("/search?q=a:b"),
            "/search?q=a:b"
        );
    }

    #[test]
    fn test_is_external_url() {
        assert!(is_external_url("https://example.com/thanks"));
        assert!(is_external_url("http://example.com"));
        assert!(is_external_url("//cdn.example.com/page"));
        assert!(!is_external_url("/node/5"));
        assert!(!is_external_url("thanks"));
        assert!(!is_external_url("javascript:alert(1)"));
        assert!(!is_external_url("data:text/html,hi"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
