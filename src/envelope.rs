//! SOAP 1.1 envelope encoding and decoding.
//!
//! Decoding runs in two passes over one parsed tree. Pass 1 builds a
//! [`GenericEnvelope`] (header tracking id, then either a fault or the payload
//! element). Pass 2, [`GenericEnvelope::into_typed`], decodes the payload into
//! the operation's response type. A fault always wins: the payload is never
//! looked at once a fault is found.

use crate::config::AuthConfig;
use crate::error::{ApiError, ClientError, FaultDetail, Result, SoapFault};
use crate::registry::SoapAction;
use crate::request::RequestBody;
use crate::response::{decode_fault_batch_error, lenient_number, SoapResponse};
use crate::schema::CAMPAIGN_MANAGEMENT_NS;
use crate::xml::{self, Element, XmlNode, SOAP_11_NS, XSI_NS};

/// Header block sent with every request. All fields are always emitted.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestHeader {
    pub action: SoapAction,
    pub must_understand: bool,
    pub authentication_token: String,
    pub customer_account_id: String,
    pub customer_id: String,
    pub developer_token: String,
}

impl RequestHeader {
    pub fn new(action: SoapAction, auth: &AuthConfig) -> Self {
        Self {
            action,
            must_understand: true,
            authentication_token: auth.authentication_token.clone(),
            customer_account_id: auth.customer_account_id.clone(),
            customer_id: auth.customer_id.clone(),
            developer_token: auth.developer_token.clone(),
        }
    }

    fn to_element(&self) -> Element {
        let mut action = Element::leaf("Action", self.action.as_str());
        if self.must_understand {
            action = action.attr("mustUnderstand", "1");
        }
        Element::new("s:Header")
            .attr("xmlns", CAMPAIGN_MANAGEMENT_NS)
            .child(action)
            .child(Element::leaf("AuthenticationToken", self.authentication_token.as_str()))
            .child(Element::leaf("CustomerAccountId", self.customer_account_id.as_str()))
            .child(Element::leaf("CustomerId", self.customer_id.as_str()))
            .child(Element::leaf("DeveloperToken", self.developer_token.as_str()))
    }
}

impl std::fmt::Debug for RequestHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHeader")
            .field("action", &self.action)
            .field("must_understand", &self.must_understand)
            .field("customer_account_id", &self.customer_account_id)
            .field("customer_id", &self.customer_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    pub header: RequestHeader,
    pub body: RequestBody,
}

impl RequestEnvelope {
    /// Wrap `body`; the header action follows the body's operation.
    pub fn new(body: RequestBody, auth: &AuthConfig) -> Self {
        Self {
            header: RequestHeader::new(body.action(), auth),
            body,
        }
    }
}

/// Write the envelope as UTF-8 bytes, declaration first.
pub fn encode_request(envelope: &RequestEnvelope) -> Result<Vec<u8>> {
    let root = Element::new("s:Envelope")
        .attr("xmlns:i", XSI_NS)
        .attr("xmlns:s", SOAP_11_NS)
        .child(envelope.header.to_element())
        .child(Element::new("s:Body").child(envelope.body.to_element()));
    xml::write_document(&root)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Empty when the service sent none
    pub tracking_id: String,
}

/// Pass 1 result: header, then a fault or the raw payload element.
#[derive(Debug, Clone, Default)]
pub struct GenericEnvelope {
    pub header: ResponseHeader,
    pub fault: Option<SoapFault>,
    /// `None` for an empty body
    pub payload: Option<XmlNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope<R> {
    pub header: ResponseHeader,
    /// `None` when the service returned an empty body
    pub body: Option<R>,
}

impl<R> ResponseEnvelope<R> {
    pub fn into_body(self) -> Result<R> {
        self.body
            .ok_or_else(|| ClientError::malformed("response body is empty"))
    }
}

impl GenericEnvelope {
    /// Pass 2: fault first, then the typed payload.
    pub fn into_typed<R: SoapResponse>(self) -> Result<ResponseEnvelope<R>> {
        if let Some(fault) = self.fault {
            return Err(ClientError::RemoteFault(Box::new(fault)));
        }
        let body = match self.payload {
            None => None,
            Some(node)
                if node.is(R::ACTION.response_element())
                    && node.namespace.as_deref() == Some(CAMPAIGN_MANAGEMENT_NS) =>
            {
                Some(R::from_node(&node)?)
            }
            Some(node) => {
                return Err(ClientError::malformed(format!(
                    "expected {} in {}, found {} in {}",
                    R::ACTION.response_element(),
                    CAMPAIGN_MANAGEMENT_NS,
                    node.local_name,
                    node.namespace.as_deref().unwrap_or("no namespace")
                )))
            }
        };
        Ok(ResponseEnvelope {
            header: self.header,
            body,
        })
    }
}

/// Pass 1: parse the envelope and locate the fault or payload.
pub fn decode_envelope(data: &[u8]) -> Result<GenericEnvelope> {
    let root = xml::parse_document(data)?;
    if !root.is("Envelope") {
        return Err(ClientError::malformed(format!(
            "expected Envelope, found {}",
            root.local_name
        )));
    }
    if root.namespace.as_deref() != Some(SOAP_11_NS) {
        return Err(ClientError::malformed(format!(
            "unsupported envelope namespace {:?}",
            root.namespace.as_deref().unwrap_or_default()
        )));
    }

    let header = ResponseHeader {
        tracking_id: root
            .child("Header")
            .and_then(|h| h.child_text("TrackingId"))
            .unwrap_or_default()
            .to_string(),
    };

    let mut body = root
        .children
        .into_iter()
        .find(|c| c.is("Body"))
        .ok_or_else(|| ClientError::malformed("envelope has no Body"))?;
    if body.children.len() > 1 {
        return Err(ClientError::malformed(format!(
            "Body holds {} elements, expected one",
            body.children.len()
        )));
    }

    match body.children.pop() {
        Some(node) if node.is("Fault") && node.namespace.as_deref() == Some(SOAP_11_NS) => {
            let fault = decode_fault(&node, &header);
            Ok(GenericEnvelope {
                header,
                fault: Some(fault),
                payload: None,
            })
        }
        payload => Ok(GenericEnvelope {
            header,
            fault: None,
            payload,
        }),
    }
}

/// Both passes. A fault becomes [`ClientError::RemoteFault`].
pub fn decode_response<R: SoapResponse>(data: &[u8]) -> Result<ResponseEnvelope<R>> {
    decode_envelope(data)?.into_typed()
}

fn decode_fault(node: &XmlNode, header: &ResponseHeader) -> SoapFault {
    let detail = node
        .child("detail")
        .and_then(|d| d.children.iter().find(|c| c.local_name.ends_with("FaultDetail")))
        .map(decode_fault_detail);

    let tracking_id = detail
        .as_ref()
        .map(|d| d.tracking_id.as_str())
        .filter(|id| !id.is_empty())
        .unwrap_or(header.tracking_id.as_str())
        .to_string();

    SoapFault {
        code: node.child_text("faultcode").unwrap_or_default().to_string(),
        message: node.child_text("faultstring").unwrap_or_default().to_string(),
        tracking_id,
        detail,
    }
}

// Infallible. Numbers that do not parse read as 0.
fn decode_fault_detail(node: &XmlNode) -> FaultDetail {
    let api_errors = |container: &str, item: &str| -> Vec<ApiError> {
        node.child(container)
            .map(|list| list.children_named(item).map(decode_api_error).collect())
            .unwrap_or_default()
    };

    FaultDetail {
        kind: node.local_name.clone(),
        tracking_id: node.child_text("TrackingId").unwrap_or_default().to_string(),
        errors: api_errors("Errors", "AdApiError"),
        operation_errors: api_errors("OperationErrors", "OperationError"),
        batch_errors: node
            .child("BatchErrors")
            .map(|list| {
                list.children_named("BatchError")
                    .map(decode_fault_batch_error)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn decode_api_error(node: &XmlNode) -> ApiError {
    ApiError {
        code: lenient_number(node, "Code"),
        error_code: node.child_text("ErrorCode").unwrap_or_default().to_string(),
        message: node.child_text("Message").unwrap_or_default().to_string(),
        details: node
            .child_text("Details")
            .filter(|d| !d.is_empty())
            .map(str::to_string),
    }
}
