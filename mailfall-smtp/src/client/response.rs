//! SMTP reply parsing.

use super::error::{ClientError, Result};

/// A complete SMTP reply, possibly spanning multiple lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The three-digit reply code.
    pub code: u16,
    /// The text of every line in the reply.
    pub lines: Vec<String>,
}

impl Response {
    #[must_use]
    pub const fn new(code: u16, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// The reply text with lines joined by newlines.
    #[must_use]
    pub fn message(&self) -> String {
        self.lines.join("\n")
    }

    /// `true` for a 2xx reply.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// `true` for a 3xx reply (e.g. 354 after DATA, 334 during AUTH).
    #[must_use]
    pub const fn is_intermediate(&self) -> bool {
        self.code >= 300 && self.code < 400
    }

    /// `true` for a 4xx or 5xx reply.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.code >= 400 && self.code < 600
    }

    /// `true` if the reply advertises the given ESMTP keyword
    /// (e.g. `STARTTLS`, `AUTH`). Matching is case-insensitive on the
    /// first word of each reply line.
    #[must_use]
    pub fn advertises(&self, keyword: &str) -> bool {
        self.lines
            .iter()
            .any(|line| line.split_whitespace().next().is_some_and(|word| word.eq_ignore_ascii_case(keyword)))
    }

    /// Parses one reply line into `(code, is_last, text)`.
    fn parse_line(line: &str) -> Result<(u16, bool, String)> {
        if line.len() < 3 {
            return Err(ClientError::Parse(format!("reply line too short: '{line}'")));
        }

        let code = line[..3]
            .parse::<u16>()
            .map_err(|_| ClientError::Parse(format!("invalid reply code in '{line}'")))?;

        let is_last = match line.as_bytes().get(3) {
            Some(b' ') | None => true,
            Some(b'-') => false,
            Some(_) => {
                return Err(ClientError::Parse(format!(
                    "invalid separator after reply code in '{line}'"
                )));
            }
        };

        let text = if line.len() > 4 {
            line[4..].to_string()
        } else {
            String::new()
        };

        Ok((code, is_last, text))
    }

    /// Parses a complete reply from the front of `buffer`.
    ///
    /// Returns the reply and the number of bytes consumed, or `None` when
    /// the buffer does not yet hold a complete reply.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` on malformed replies, including a code
    /// change in the middle of a multi-line reply.
    pub fn parse(buffer: &[u8]) -> Result<Option<(Self, usize)>> {
        let text = std::str::from_utf8(buffer)?;

        let mut lines = Vec::new();
        let mut consumed = 0;
        let mut reply_code = None;

        while let Some(end) = text[consumed..].find('\n') {
            let raw = &text[consumed..consumed + end];
            consumed += end + 1;

            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let (code, is_last, line_text) = Self::parse_line(line)?;

            match reply_code {
                None => reply_code = Some(code),
                Some(expected) if expected != code => {
                    return Err(ClientError::Parse(format!(
                        "reply code changed mid-reply: expected {expected}, got {code}"
                    )));
                }
                Some(_) => {}
            }

            lines.push(line_text);

            if is_last {
                return Ok(Some((Self::new(code, lines), consumed)));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_line_reply() {
        let (response, consumed) = Response::parse(b"250 OK\r\n").unwrap().unwrap();
        assert_eq!(response.code, 250);
        assert_eq!(response.lines, vec!["OK"]);
        assert_eq!(consumed, 8);
    }

    #[test]
    fn parses_multi_line_reply() {
        let data = b"250-mail.example.com\r\n250-STARTTLS\r\n250 AUTH PLAIN LOGIN\r\n";
        let (response, consumed) = Response::parse(data).unwrap().unwrap();
        assert_eq!(response.code, 250);
        assert_eq!(
            response.lines,
            vec!["mail.example.com", "STARTTLS", "AUTH PLAIN LOGIN"]
        );
        assert_eq!(consumed, data.len());
    }

    #[test]
    fn incomplete_reply_needs_more_data() {
        assert!(Response::parse(b"250-mail.example.com\r\n250-SIZ").unwrap().is_none());
        assert!(Response::parse(b"25").unwrap().is_none());
    }

    #[test]
    fn rejects_code_change_mid_reply() {
        let result = Response::parse(b"250-hello\r\n550 no\r\n");
        assert!(result.is_err());
    }

    #[test]
    fn classifies_codes() {
        assert!(Response::new(220, vec![]).is_success());
        assert!(Response::new(354, vec![]).is_intermediate());
        assert!(Response::new(454, vec![]).is_error());
        assert!(Response::new(535, vec![]).is_error());
    }

    #[test]
    fn finds_advertised_keywords() {
        let response = Response::new(
            250,
            vec![
                "mail.example.com".to_string(),
                "starttls".to_string(),
                "AUTH PLAIN LOGIN".to_string(),
            ],
        );
        assert!(response.advertises("STARTTLS"));
        assert!(response.advertises("auth"));
        assert!(!response.advertises("SIZE"));
    }
}
