//! `application/x-www-form-urlencoded` field sets.
//!
//! Both POST bodies and query strings decode into a [`FormData`]. Input
//! whose percent-decoded bytes are not UTF-8 is rejected with
//! [`MalformedForm`]; a stray `%` that is not followed by two hex digits is
//! kept literally.

use thiserror::Error;
use url::form_urlencoded;

/// The submitted fields do not decode to UTF-8.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("form data is not valid UTF-8")]
pub struct MalformedForm;

/// Decoded form fields in submission order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    /// Decodes a urlencoded byte string (`a=1&b=two+words`).
    pub fn parse(input: &[u8]) -> Result<Self, MalformedForm> {
        if !decodes_to_utf8(input) {
            return Err(MalformedForm);
        }
        let pairs = form_urlencoded::parse(input)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Ok(Self { pairs })
    }

    /// The first value submitted under `name`.
    ///
    /// Browsers never repeat a text input's name, so later duplicates are
    /// ignored instead of being merged.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encodes the fields back into a urlencoded string.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Percent-decodes the whole input and checks the bytes.
///
/// The `&`, `=` and `+` separators are ASCII and never part of a multi-byte
/// sequence, so checking the whole stream checks every key and value.
fn decodes_to_utf8(input: &[u8]) -> bool {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i] == b'%' && i + 2 < input.len() {
            let hi = (input[i + 1] as char).to_digit(16);
            let lo = (input[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push(((hi << 4) | lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(input[i]);
        i += 1;
    }
    std::str::from_utf8(&out).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plus_and_percent_escapes() {
        let form = FormData::parse(b"firstName=Ada&bio=likes+%3Cmath%3E").unwrap();
        assert_eq!(form.get("firstName"), Some("Ada"));
        assert_eq!(form.get("bio"), Some("likes <math>"));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn first_duplicate_wins() {
        let form = FormData::parse(b"mail=a%40b.io&mail=c%40d.io").unwrap();
        assert_eq!(form.get("mail"), Some("a@b.io"));
    }

    #[test]
    fn non_utf8_input_is_rejected() {
        assert_eq!(FormData::parse(b"username=%FF%FE"), Err(MalformedForm));
        assert_eq!(FormData::parse(b"bio=%E2%82&x=%AC"), Err(MalformedForm));
        assert_eq!(FormData::parse(b"raw=\xff"), Err(MalformedForm));
    }

    #[test]
    fn multibyte_and_stray_percent_are_accepted() {
        let form = FormData::parse(b"bio=caf%C3%A9+100%&x=%4").unwrap();
        assert_eq!(form.get("bio"), Some("caf\u{e9} 100%"));
        assert_eq!(form.get("x"), Some("%4"));
    }

    #[test]
    fn encode_inverts_parse_for_simple_fields() {
        let form: FormData = [("username", "Ada Lovelace"), ("mail", "")].into_iter().collect();
        assert_eq!(form.encode(), "username=Ada+Lovelace&mail=");
    }
}
