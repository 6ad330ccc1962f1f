use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Digits with optional leading `+` and common separators.
    pub static ref PHONE_RE: Regex = Regex::new(r"^\+?\(?[0-9][0-9 ()\-]*[0-9]$").unwrap();
}

/// Trims in place and turns blank optionals into `None`.
pub fn trim(s: &mut String) {
    let t = s.trim();
    if t.len() != s.len() {
        *s = t.to_string();
    }
}

pub fn trim_opt(s: &mut Option<String>) {
    if let Some(v) = s.as_mut() {
        trim(v);
    }
    if s.as_deref().is_some_and(str::is_empty) {
        *s = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_pattern() {
        assert!(PHONE_RE.is_match("03001234567"));
        assert!(PHONE_RE.is_match("+92 300 1234567"));
        assert!(PHONE_RE.is_match("(051) 123-4567"));
        assert!(!PHONE_RE.is_match("call me maybe"));
        assert!(!PHONE_RE.is_match("0300-123456x"));
    }

    #[test]
    fn trimming() {
        let mut s = "  Lahore ".to_string();
        trim(&mut s);
        assert_eq!(s, "Lahore");

        let mut o = Some("   ".to_string());
        trim_opt(&mut o);
        assert!(o.is_none());

        let mut o = Some(" batch-12 ".to_string());
        trim_opt(&mut o);
        assert_eq!(o.as_deref(), Some("batch-12"));
    }
}
