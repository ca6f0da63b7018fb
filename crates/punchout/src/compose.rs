//! cXML response composition.
//!
//! Buyer procurement systems validate responses strictly, so the output is
//! fixed: UTF-8 declaration without BOM, a DOCTYPE right after the
//! declaration, a `version` attribute on the root, no namespaces, and no
//! indentation.

use chrono::{SecondsFormat, Utc};
use storefront_core::cxml::{PunchOutSetupResponse, Response, Status, UrlElement};
use storefront_core::limits::{CXML_DTD_URL, CXML_VERSION};
use storefront_core::{Cxml, Error, Result};
use tracing::error;
use url::Url;
use uuid::Uuid;

use crate::config::{AppSettings, AribaConfig};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const SUCCESS_TEXT: &str = "success";

/// Builds success and error envelopes.
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    start_page: Url,
    payload_host: String,
}

impl ResponseComposer {
    pub fn new(app: &AppSettings, ariba: &AribaConfig) -> Result<Self> {
        let mut base = Url::parse(app.storefront_url.trim()).map_err(|e| {
            Error::configuration(format!(
                "Invalid storefront URL '{}': {}",
                app.storefront_url, e
            ))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let start_page = base
            .join(ariba.start_page_path.trim_start_matches('/'))
            .map_err(|e| {
                Error::configuration(format!(
                    "Invalid start page path '{}': {}",
                    ariba.start_page_path, e
                ))
            })?;

        let payload_host = base.host_str().unwrap_or("localhost").to_string();

        Ok(Self {
            start_page,
            payload_host,
        })
    }

    /// Storefront login URL carrying `session_id`.
    pub fn start_page_url(&self, session_id: &str) -> String {
        let mut url = self.start_page.clone();
        url.query_pairs_mut().append_pair("sessionId", session_id);
        url.into()
    }

    /// Success envelope pointing the buyer at the storefront.
    pub fn success(&self, session_id: &str) -> Result<String> {
        let response = Response {
            status: Status::new(200, SUCCESS_TEXT),
            punch_out_setup_response: Some(PunchOutSetupResponse {
                start_page: UrlElement::new(self.start_page_url(session_id)),
            }),
        };
        serialize_document(&self.envelope(response))
    }

    /// Error envelope whose `Status` code matches the HTTP status.
    ///
    /// Never fails: if serialization breaks, a fixed template is used.
    pub fn error(&self, status: u16, text: &str) -> String {
        let response = Response {
            status: Status::new(status, text),
            punch_out_setup_response: None,
        };
        match serialize_document(&self.envelope(response)) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, status, "Falling back to static cXML error envelope");
                fallback_error(&self.payload_id(), &timestamp(), status, text)
            }
        }
    }

    fn envelope(&self, response: Response) -> Cxml {
        Cxml::response(
            self.payload_id(),
            timestamp(),
            Some(CXML_VERSION.to_string()),
            response,
        )
    }

    /// `<epoch millis>.<random>@<host>`, unique per response.
    fn payload_id(&self) -> String {
        format!(
            "{}.{}@{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            self.payload_host
        )
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Serializes a document in the strict wire format.
pub fn serialize_document(doc: &Cxml) -> Result<String> {
    let body = quick_xml::se::to_string_with_root("cXML", doc)
        .map_err(|e| Error::xml(format!("Failed to serialize cXML: {}", e)))?;
    let body = ensure_version_attribute(body);
    Ok(insert_doctype(format!("{}{}", XML_DECLARATION, body)))
}

/// Adds `version` to the root element if the serializer left it out.
pub fn ensure_version_attribute(body: String) -> String {
    let root_end = body.find('>').unwrap_or(body.len());
    if body[..root_end].contains(" version=") {
        return body;
    }
    body.replacen("<cXML", &format!(r#"<cXML version="{}""#, CXML_VERSION), 1)
}

/// Places the cXML DOCTYPE directly after the XML declaration.
pub fn insert_doctype(xml: String) -> String {
    let doctype = format!(r#"<!DOCTYPE cXML SYSTEM "{}">"#, CXML_DTD_URL);
    if xml.contains("<!DOCTYPE") {
        return xml;
    }
    match xml.find("?>") {
        Some(idx) if xml.starts_with("<?xml") => {
            let (decl, rest) = xml.split_at(idx + 2);
            format!("{}{}{}", decl, doctype, rest)
        }
        _ => format!("{}{}", doctype, xml),
    }
}

fn fallback_error(payload_id: &str, timestamp: &str, status: u16, text: &str) -> String {
    format!(
        r#"{}<!DOCTYPE cXML SYSTEM "{}"><cXML payloadID="{}" timestamp="{}" version="{}"><Response><Status code="{}" text="{}"/></Response></cXML>"#,
        XML_DECLARATION,
        CXML_DTD_URL,
        quick_xml::escape::escape(payload_id),
        quick_xml::escape::escape(timestamp),
        CXML_VERSION,
        status,
        quick_xml::escape::escape(text),
    )
}
