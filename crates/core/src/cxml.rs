//! cXML document model.
//!
//! Field names map onto the fixed cXML 1.2 vocabulary: `@name` fields are
//! attributes, `$text` fields are element text, everything else is a child
//! element. Only the subset used by the PunchOut setup exchange is modelled;
//! unknown elements and attributes are ignored on input.

use serde::{Deserialize, Serialize};

use crate::error::{Error, InputErrorCode, Result};

/// Root `<cXML>` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cxml {
    #[serde(rename = "@payloadID", default, skip_serializing_if = "Option::is_none")]
    pub payload_id: Option<String>,
    #[serde(rename = "@timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(rename = "@version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "Header", default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Header>,
    #[serde(rename = "Request", default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
    #[serde(rename = "Response", default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,
}

impl Cxml {
    /// Creates a response document.
    pub fn response(
        payload_id: impl Into<String>,
        timestamp: impl Into<String>,
        version: Option<String>,
        response: Response,
    ) -> Self {
        Self {
            payload_id: Some(payload_id.into()),
            timestamp: Some(timestamp.into()),
            version,
            header: None,
            request: None,
            response: Some(response),
        }
    }

    /// Returns the PunchOut setup request, if this is one.
    pub fn punch_out_setup_request(&self) -> Option<&PunchOutSetupRequest> {
        self.request
            .as_ref()
            .and_then(|r| r.punch_out_setup_request.as_ref())
    }
}

/// `<Header>` with the three parties of the exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "From", default)]
    pub from: Party,
    #[serde(rename = "To", default)]
    pub to: Party,
    #[serde(rename = "Sender", default)]
    pub sender: Sender,
}

/// `<From>` / `<To>` credential list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    #[serde(rename = "Credential", default)]
    pub credentials: Vec<Credential>,
}

/// `<Sender>`: the authenticating party.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    #[serde(rename = "Credential", default)]
    pub credentials: Vec<Credential>,
    #[serde(rename = "UserAgent", default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "@domain", default)]
    pub domain: String,
    #[serde(rename = "Identity", default)]
    pub identity: String,
    #[serde(rename = "SharedSecret", default, skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,
}

impl Credential {
    /// Case-insensitive domain check.
    pub fn has_domain(&self, domain: &str) -> bool {
        self.domain.trim().eq_ignore_ascii_case(domain)
    }

    /// Trimmed identity, `None` when blank.
    pub fn identity(&self) -> Option<&str> {
        non_blank(&self.identity)
    }

    /// Shared secret exactly as sent, `None` when absent or blank.
    pub fn shared_secret(&self) -> Option<&str> {
        self.shared_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

/// `<Request>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(rename = "@deploymentMode", default, skip_serializing_if = "Option::is_none")]
    pub deployment_mode: Option<String>,
    #[serde(
        rename = "PunchOutSetupRequest",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub punch_out_setup_request: Option<PunchOutSetupRequest>,
}

/// `<PunchOutSetupRequest>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PunchOutSetupRequest {
    #[serde(rename = "@operation", default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(rename = "BuyerCookie", default, skip_serializing_if = "Option::is_none")]
    pub buyer_cookie: Option<String>,
    #[serde(rename = "Extrinsic", default)]
    pub extrinsics: Vec<Extrinsic>,
    #[serde(rename = "BrowserFormPost", default, skip_serializing_if = "Option::is_none")]
    pub browser_form_post: Option<UrlElement>,
    #[serde(rename = "Contact", default)]
    pub contacts: Vec<Contact>,
    #[serde(rename = "SupplierSetup", default, skip_serializing_if = "Option::is_none")]
    pub supplier_setup: Option<UrlElement>,
    #[serde(rename = "ItemOut", default)]
    pub items: Vec<ItemOut>,
}

impl PunchOutSetupRequest {
    /// Looks up an `<Extrinsic name="...">` value (name match is case-insensitive).
    pub fn extrinsic(&self, name: &str) -> Option<&str> {
        self.extrinsics
            .iter()
            .find(|e| e.name.trim().eq_ignore_ascii_case(name))
            .and_then(|e| non_blank(&e.value))
    }

    pub fn buyer_cookie(&self) -> Option<&str> {
        self.buyer_cookie.as_deref().and_then(non_blank)
    }

    /// The buyer's order-submission endpoint.
    pub fn post_url(&self) -> Option<&str> {
        self.browser_form_post
            .as_ref()
            .and_then(|p| non_blank(&p.url))
    }

    /// Parses the `operation` attribute.
    pub fn operation(&self) -> Result<Operation> {
        Operation::parse(self.operation.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extrinsic {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// Element wrapping a single `<URL>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlElement {
    #[serde(rename = "URL", default)]
    pub url: String,
}

impl UrlElement {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "@role", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<TextElement>,
    #[serde(rename = "Email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<TextElement>,
}

/// Element carrying only text (attributes such as `xml:lang` are dropped).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// `<ItemOut>`: one externally supplied cart line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemOut {
    #[serde(rename = "@quantity", default)]
    pub quantity: String,
    #[serde(rename = "@lineNumber", default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<String>,
    #[serde(rename = "ItemID", default)]
    pub item_id: ItemId,
    #[serde(rename = "ItemDetail", default, skip_serializing_if = "Option::is_none")]
    pub item_detail: Option<ItemDetail>,
}

impl ItemOut {
    /// Customer stock number, `None` when blank.
    pub fn supplier_part_id(&self) -> Option<&str> {
        non_blank(&self.item_id.supplier_part_id)
    }

    /// Raw `<Money>` text of the unit price, if any.
    pub fn unit_price(&self) -> Option<&str> {
        self.item_detail
            .as_ref()
            .and_then(|d| d.unit_price.as_ref())
            .and_then(|p| non_blank(&p.money.value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemId {
    #[serde(rename = "SupplierPartID", default)]
    pub supplier_part_id: String,
    #[serde(
        rename = "SupplierPartAuxiliaryID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub supplier_part_auxiliary_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    #[serde(rename = "UnitPrice", default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<UnitPrice>,
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<TextElement>,
    #[serde(rename = "UnitOfMeasure", default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measure: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitPrice {
    #[serde(rename = "Money", default)]
    pub money: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Money {
    #[serde(rename = "@currency", default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// `<Response>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(
        rename = "PunchOutSetupResponse",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub punch_out_setup_response: Option<PunchOutSetupResponse>,
}

/// `<Status code="..." text="...">`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(rename = "@code")]
    pub code: String,
    #[serde(rename = "@text")]
    pub text: String,
    #[serde(rename = "$text", default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Status {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            text: text.into(),
            detail: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PunchOutSetupResponse {
    #[serde(rename = "StartPage")]
    pub start_page: UrlElement,
}

/// PunchOut setup operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Edit,
    Inspect,
}

impl Operation {
    /// Parses the `operation` attribute; a missing attribute means `create`.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::Create);
        };

        match raw.to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            "inspect" => Ok(Self::Inspect),
            other => Err(Error::input(
                InputErrorCode::InvalidRequest,
                format!("Unsupported PunchOut operation '{}'", other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Inspect => "inspect",
        }
    }

    /// Whether the buyer-supplied items replace the cart contents.
    ///
    /// `inspect` rewrites the cart exactly like `edit`.
    pub fn reconciles_cart(&self) -> bool {
        matches!(self, Self::Edit | Self::Inspect)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
