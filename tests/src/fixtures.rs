//! cXML request fixtures.

/// Shared secret configured in [`crate::setup::TestContext`].
pub const SHARED_SECRET: &str = "test-shared-secret";
pub const JWT_KEY: &str = "integration-test-signing-key";
pub const STOREFRONT_URL: &str = "https://shop.example";

pub const USER_EMAIL: &str = "jane.buyer@acme.example";
pub const ARIBA_USER_ID: &str = "jane.buyer@acme-ariba";
pub const SENDER_DUNS: &str = "123456789";

/// One `<ItemOut>` line.
#[derive(Debug, Clone)]
pub struct Line {
    pub part_id: String,
    pub quantity: String,
    pub unit_price: Option<String>,
}

impl Line {
    pub fn new(part_id: &str, quantity: &str) -> Self {
        Self {
            part_id: part_id.into(),
            quantity: quantity.into(),
            unit_price: None,
        }
    }

    pub fn priced(mut self, price: &str) -> Self {
        self.unit_price = Some(price.into());
        self
    }

    fn to_xml(&self, line_number: usize) -> String {
        let detail = self
            .unit_price
            .as_ref()
            .map(|p| {
                format!(
                    r#"<ItemDetail><UnitPrice><Money currency="USD">{}</Money></UnitPrice><Description xml:lang="en">Line {}</Description><UnitOfMeasure>EA</UnitOfMeasure></ItemDetail>"#,
                    p, line_number
                )
            })
            .unwrap_or_default();
        format!(
            r#"<ItemOut quantity="{}" lineNumber="{}"><ItemID><SupplierPartID>{}</SupplierPartID></ItemID>{}</ItemOut>"#,
            self.quantity, line_number, self.part_id, detail
        )
    }
}

/// Builds a PunchOutSetupRequest document.
#[derive(Debug, Clone)]
pub struct SetupRequest {
    pub operation: Option<String>,
    pub shared_secret: Option<String>,
    pub secret_domain: String,
    pub sender_domain: String,
    pub ariba_user_id: String,
    pub user_email: Option<String>,
    pub buyer_cookie: String,
    pub post_url: String,
    pub include_header: bool,
    pub lines: Vec<Line>,
}

impl Default for SetupRequest {
    fn default() -> Self {
        Self {
            operation: Some("create".into()),
            shared_secret: Some(SHARED_SECRET.into()),
            secret_domain: "NetworkId".into(),
            sender_domain: "DUNS".into(),
            ariba_user_id: ARIBA_USER_ID.into(),
            user_email: Some(USER_EMAIL.into()),
            buyer_cookie: "buyer-cookie-1".into(),
            post_url: "https://buyer.example/punchout/return?order=1&step=2".into(),
            include_header: true,
            lines: vec![],
        }
    }
}

impl SetupRequest {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn edit(lines: Vec<Line>) -> Self {
        Self {
            operation: Some("edit".into()),
            lines,
            ..Self::default()
        }
    }

    pub fn with_operation(mut self, operation: Option<&str>) -> Self {
        self.operation = operation.map(String::from);
        self
    }

    pub fn with_secret(mut self, secret: Option<&str>) -> Self {
        self.shared_secret = secret.map(String::from);
        self
    }

    pub fn with_secret_domain(mut self, domain: &str) -> Self {
        self.secret_domain = domain.into();
        self
    }

    pub fn with_sender_domain(mut self, domain: &str) -> Self {
        self.sender_domain = domain.into();
        self
    }

    pub fn with_ariba_user(mut self, id: &str) -> Self {
        self.ariba_user_id = id.into();
        self
    }

    pub fn with_email(mut self, email: Option<&str>) -> Self {
        self.user_email = email.map(String::from);
        self
    }

    pub fn without_header(mut self) -> Self {
        self.include_header = false;
        self
    }

    /// Renders the document. Ampersands in the post URL are left bare, as
    /// some buyer systems send them.
    pub fn to_xml(&self) -> String {
        let header = if self.include_header {
            let secret = self
                .shared_secret
                .as_ref()
                .map(|s| format!("<SharedSecret>{}</SharedSecret>", s))
                .unwrap_or_default();
            format!(
                r#"<Header><From><Credential domain="AribaNetworkUserId"><Identity>{ariba}</Identity></Credential><Credential domain="{sender_domain}"><Identity>{duns}</Identity></Credential></From><To><Credential domain="DUNS"><Identity>987654321</Identity></Credential></To><Sender><Credential domain="{secret_domain}"><Identity>AN01000000001</Identity>{secret}</Credential><UserAgent>Ariba Buyer 9r2</UserAgent></Sender></Header>"#,
                ariba = self.ariba_user_id,
                sender_domain = self.sender_domain,
                duns = SENDER_DUNS,
                secret_domain = self.secret_domain,
                secret = secret,
            )
        } else {
            String::new()
        };

        let operation = self
            .operation
            .as_ref()
            .map(|op| format!(r#" operation="{}""#, op))
            .unwrap_or_default();
        let email = self
            .user_email
            .as_ref()
            .map(|e| format!(r#"<Extrinsic name="UserEmail">{}</Extrinsic>"#, e))
            .unwrap_or_default();
        let lines: String = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, l)| l.to_xml(i + 1))
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE cXML SYSTEM "http://xml.cxml.org/schemas/cXML/1.2.014/cXML.dtd">
<cXML payloadID="1700000000000.4242@buyer.example" timestamp="2024-03-01T10:00:00-05:00" version="1.2.014">{header}<Request deploymentMode="test"><PunchOutSetupRequest{operation}><BuyerCookie>{cookie}</BuyerCookie>{email}<BrowserFormPost><URL>{post_url}</URL></BrowserFormPost><Contact role="endUser"><Name xml:lang="en">Jane Buyer</Name><Email>{contact}</Email></Contact><SupplierSetup><URL>{storefront}/punchout</URL></SupplierSetup>{lines}</PunchOutSetupRequest></Request></cXML>"#,
            header = header,
            operation = operation,
            cookie = self.buyer_cookie,
            email = email,
            post_url = self.post_url,
            contact = USER_EMAIL,
            storefront = STOREFRONT_URL,
            lines = lines,
        )
    }
}

/// Pulls the session id out of a success envelope's StartPage URL.
pub fn session_id_from(body: &str) -> Option<String> {
    let start = body.find("sessionId=")? + "sessionId=".len();
    let id: String = body[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    (!id.is_empty()).then_some(id)
}

/// Extracts `(code, text)` from a response `<Status>`.
pub fn status_of(body: &str) -> Option<(String, String)> {
    let doc: storefront_core::Cxml = quick_xml::de::from_str(body).ok()?;
    let status = doc.response?.status;
    Some((status.code, status.text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_from() {
        assert_eq!(
            session_id_from("<URL>https://shop.example/login/ariba?sessionId=12345678</URL>"),
            Some("12345678".to_string())
        );
        assert_eq!(session_id_from("<Status/>"), None);
    }
}
