//! Inbound cXML parsing.

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use storefront_core::limits::MAX_CXML_BODY_BYTES;
use storefront_core::{Cxml, Error, InputErrorCode, Result};

/// A predefined entity, a numeric character reference, or a bare `&`.
static AMPERSAND_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:amp;|lt;|gt;|quot;|apos;|#[0-9]+;|#[xX][0-9A-Fa-f]+;)?")
        .expect("invalid ampersand pattern")
});

/// Escapes every `&` that does not start a valid reference.
///
/// Some buyer systems send unescaped ampersands in URLs and descriptions.
pub fn escape_bare_ampersands(raw: &str) -> Cow<'_, str> {
    AMPERSAND_REGEX.replace_all(raw, |caps: &Captures| {
        if &caps[0] == "&" {
            "&amp;".to_string()
        } else {
            caps[0].to_string()
        }
    })
}

/// Decodes and deserializes a raw request body.
pub fn parse_document(body: &[u8]) -> Result<Cxml> {
    if body.is_empty() {
        return Err(Error::input(InputErrorCode::Unparseable, "Empty cXML body"));
    }

    if body.len() > MAX_CXML_BODY_BYTES {
        return Err(Error::input(
            InputErrorCode::Unparseable,
            format!(
                "cXML body of {}KB exceeds {}KB limit",
                body.len() / 1024,
                MAX_CXML_BODY_BYTES / 1024
            ),
        ));
    }

    let text = std::str::from_utf8(body).map_err(|e| {
        Error::input(
            InputErrorCode::Unparseable,
            format!("cXML body is not valid UTF-8: {}", e),
        )
    })?;
    let text = text.trim_start_matches('\u{feff}');

    let escaped = escape_bare_ampersands(text);
    let mut doc: Cxml = quick_xml::de::from_str(&escaped).map_err(|e| {
        Error::input(
            InputErrorCode::Unparseable,
            format!("Could not deserialize cXML: {}", e),
        )
    })?;
    restore_sender_secrets(&mut doc, &escaped)?;
    Ok(doc)
}

const SENDER_CREDENTIAL: [&[u8]; 4] = [b"cXML", b"Header", b"Sender", b"Credential"];
const SENDER_SECRET: [&[u8]; 5] = [b"cXML", b"Header", b"Sender", b"Credential", b"SharedSecret"];

/// Puts back the exact `SharedSecret` text of each `Sender` credential.
///
/// The serde layer trims element text, and secrets are compared byte for byte.
fn restore_sender_secrets(doc: &mut Cxml, xml: &str) -> Result<()> {
    let Some(header) = doc.header.as_mut() else {
        return Ok(());
    };

    let raw = sender_secrets(xml)?;
    if raw.len() != header.sender.credentials.len() {
        return Err(Error::input(
            InputErrorCode::Unparseable,
            "Sender credentials could not be read unambiguously",
        ));
    }

    for (credential, secret) in header.sender.credentials.iter_mut().zip(raw) {
        if secret.is_some() {
            credential.shared_secret = secret;
        }
    }
    Ok(())
}

/// One entry per `Sender/Credential`, holding its untrimmed `SharedSecret`.
fn sender_secrets(xml: &str) -> Result<Vec<Option<String>>> {
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut credentials: Vec<Option<String>> = Vec::new();
    let mut in_secret = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::input(
                InputErrorCode::Unparseable,
                format!("Could not read cXML: {}", e),
            )
        })?;

        match event {
            Event::Start(e) => {
                path.push(e.local_name().as_ref().to_vec());
                if at(&path, &SENDER_CREDENTIAL) {
                    credentials.push(None);
                } else if at(&path, &SENDER_SECRET) {
                    in_secret = true;
                    if let Some(last) = credentials.last_mut() {
                        *last = Some(String::new());
                    }
                }
            }
            Event::Empty(e) => {
                path.push(e.local_name().as_ref().to_vec());
                if at(&path, &SENDER_CREDENTIAL) {
                    credentials.push(None);
                } else if at(&path, &SENDER_SECRET) {
                    if let Some(last) = credentials.last_mut() {
                        *last = Some(String::new());
                    }
                }
                path.pop();
            }
            Event::End(_) => {
                if at(&path, &SENDER_SECRET) {
                    in_secret = false;
                }
                path.pop();
            }
            Event::Text(t) if in_secret => {
                let text = t.unescape().map_err(|e| {
                    Error::input(
                        InputErrorCode::Unparseable,
                        format!("Could not read SharedSecret: {}", e),
                    )
                })?;
                if let Some(Some(secret)) = credentials.last_mut() {
                    secret.push_str(&text);
                }
            }
            Event::CData(c) if in_secret => {
                if let Some(Some(secret)) = credentials.last_mut() {
                    secret.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(credentials)
}

fn at(path: &[Vec<u8>], expected: &[&[u8]]) -> bool {
    path.len() == expected.len() && path.iter().zip(expected).all(|(a, b)| a.as_slice() == *b)
}
