//! XML request builders and response parsers
//!
//! Covers the two exchanges this crate performs: POX autodiscover and the
//! `CreateItem` SOAP call used to send a message.

use crate::error::{EwsError, EwsResult};
use crate::types::{AccessType, Mailbox};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const AUTODISCOVER_REQUEST_NS: &str =
    "http://schemas.microsoft.com/exchange/autodiscover/outlook/requestschema/2006";
const AUTODISCOVER_RESPONSE_SCHEMA: &str =
    "http://schemas.microsoft.com/exchange/autodiscover/outlook/responseschema/2006a";
const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const MESSAGES_NS: &str = "http://schemas.microsoft.com/exchange/services/2006/messages";
const TYPES_NS: &str = "http://schemas.microsoft.com/exchange/services/2006/types";

/// Server version requested in every SOAP header
pub const REQUEST_SERVER_VERSION: &str = "Exchange2010_SP2";

/// What an autodiscover server told us
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutodiscoverResponse {
    /// The EWS endpoint for the mailbox
    EwsUrl(String),
    /// Retry discovery for a different address
    RedirectAddr(String),
    /// Retry discovery against a different autodiscover URL
    RedirectUrl(String),
    /// The server returned an explicit error
    Error { code: String, message: String },
}

pub fn autodiscover_request(email: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<Autodiscover xmlns="{ns}">"#,
            "<Request>",
            "<EMailAddress>{email}</EMailAddress>",
            "<AcceptableResponseSchema>{schema}</AcceptableResponseSchema>",
            "</Request>",
            "</Autodiscover>"
        ),
        ns = AUTODISCOVER_REQUEST_NS,
        email = escape(email),
        schema = AUTODISCOVER_RESPONSE_SCHEMA,
    )
}

pub fn parse_autodiscover_response(xml: &str) -> EwsResult<AutodiscoverResponse> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut protocols: Vec<(String, String)> = Vec::new();
    let mut protocol_type = String::new();
    let mut ews_url = String::new();
    let mut action = String::new();
    let mut redirect_addr = String::new();
    let mut redirect_url = String::new();
    let mut error_code: Option<String> = None;
    let mut error_message = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                if name == "Protocol" {
                    protocol_type.clear();
                    ews_url.clear();
                }
                if name == "Error" {
                    error_code.get_or_insert_with(String::new);
                }
                stack.push(name);
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| EwsError::ParseError(e.to_string()))?
                    .to_string();
                let current = stack.last().map(String::as_str).unwrap_or_default();
                let in_protocol = stack.iter().any(|s| s == "Protocol");
                let in_error = stack.iter().any(|s| s == "Error");
                match current {
                    "Type" if in_protocol => protocol_type = text,
                    "EwsUrl" if in_protocol => ews_url = text,
                    "Action" => action = text,
                    "RedirectAddr" => redirect_addr = text,
                    "RedirectUrl" => redirect_url = text,
                    "ErrorCode" if in_error => error_code = Some(text),
                    "Message" if in_error => error_message = text,
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                if stack.pop().as_deref() == Some("Protocol") && !ews_url.is_empty() {
                    protocols.push((protocol_type.clone(), ews_url.clone()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(EwsError::ParseError(e.to_string())),
            _ => {}
        }
    }

    if let Some(code) = error_code {
        return Ok(AutodiscoverResponse::Error {
            code,
            message: error_message,
        });
    }
    match action.as_str() {
        "redirectAddr" if !redirect_addr.is_empty() => {
            return Ok(AutodiscoverResponse::RedirectAddr(redirect_addr));
        }
        "redirectUrl" if !redirect_url.is_empty() => {
            return Ok(AutodiscoverResponse::RedirectUrl(redirect_url));
        }
        _ => {}
    }

    ["EXPR", "EXCH"]
        .iter()
        .find_map(|wanted| protocols.iter().find(|(t, _)| t == wanted))
        .or_else(|| protocols.first())
        .map(|(_, url)| AutodiscoverResponse::EwsUrl(url.clone()))
        .ok_or_else(|| EwsError::ParseError("no EwsUrl in autodiscover response".to_string()))
}

/// Build a `CreateItem` request that sends a plain-text message
pub fn create_item_request(
    sender: &str,
    access_type: AccessType,
    subject: &str,
    body: &str,
    to_recipients: &[Mailbox],
    reply_to: &[Mailbox],
) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    xml.push_str(&format!(
        r#"<soap:Envelope xmlns:soap="{}" xmlns:m="{}" xmlns:t="{}">"#,
        SOAP_NS, MESSAGES_NS, TYPES_NS
    ));

    xml.push_str("<soap:Header>");
    xml.push_str(&format!(
        r#"<t:RequestServerVersion Version="{}"/>"#,
        REQUEST_SERVER_VERSION
    ));
    if access_type == AccessType::Impersonation {
        xml.push_str(&format!(
            "<t:ExchangeImpersonation><t:ConnectingSID><t:PrimarySmtpAddress>{}</t:PrimarySmtpAddress></t:ConnectingSID></t:ExchangeImpersonation>",
            escape(sender)
        ));
    }
    xml.push_str("</soap:Header>");

    xml.push_str("<soap:Body>");
    xml.push_str(r#"<m:CreateItem MessageDisposition="SendAndSaveCopy">"#);
    xml.push_str(&format!(
        r#"<m:SavedItemFolderId><t:DistinguishedFolderId Id="sentitems"><t:Mailbox><t:EmailAddress>{}</t:EmailAddress></t:Mailbox></t:DistinguishedFolderId></m:SavedItemFolderId>"#,
        escape(sender)
    ));
    xml.push_str("<m:Items><t:Message>");
    xml.push_str(&format!("<t:Subject>{}</t:Subject>", escape(subject)));
    xml.push_str(&format!(r#"<t:Body BodyType="Text">{}</t:Body>"#, escape(body)));
    push_mailboxes(&mut xml, "t:ToRecipients", to_recipients);
    push_mailboxes(&mut xml, "t:ReplyTo", reply_to);
    xml.push_str("</t:Message></m:Items>");
    xml.push_str("</m:CreateItem>");
    xml.push_str("</soap:Body>");
    xml.push_str("</soap:Envelope>");
    xml
}

fn push_mailboxes(xml: &mut String, element: &str, mailboxes: &[Mailbox]) {
    if mailboxes.is_empty() {
        return;
    }
    xml.push_str(&format!("<{}>", element));
    for mailbox in mailboxes {
        xml.push_str("<t:Mailbox>");
        if let Some(ref name) = mailbox.name {
            xml.push_str(&format!("<t:Name>{}</t:Name>", escape(name)));
        }
        xml.push_str(&format!(
            "<t:EmailAddress>{}</t:EmailAddress>",
            escape(&mailbox.email_address)
        ));
        xml.push_str("</t:Mailbox>");
    }
    xml.push_str(&format!("</{}>", element));
}

/// Check a `CreateItem` response for faults and per-item errors
pub fn parse_create_item_response(xml: &str) -> EwsResult<()> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut current = String::new();
    let mut fault: Option<String> = None;
    let mut response_class: Option<String> = None;
    let mut response_code = String::new();
    let mut message_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = local_name(&e);
                if current == "CreateItemResponseMessage" {
                    response_class = Some(response_class_of(&e)?);
                }
            }
            Ok(Event::Empty(e)) => {
                if local_name(&e) == "CreateItemResponseMessage" {
                    response_class = Some(response_class_of(&e)?);
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| EwsError::ParseError(e.to_string()))?
                    .to_string();
                match current.as_str() {
                    "faultstring" => fault = Some(text),
                    "ResponseCode" => response_code = text,
                    "MessageText" => message_text = text,
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current.clear(),
            Ok(Event::Eof) => break,
            Err(e) => return Err(EwsError::ParseError(e.to_string())),
            _ => {}
        }
    }

    if let Some(fault) = fault {
        return Err(EwsError::SoapFault(fault));
    }
    match response_class.as_deref() {
        Some("Success") => Ok(()),
        Some(_) => Err(EwsError::ResponseError {
            code: response_code,
            message: message_text,
        }),
        None => Err(EwsError::ParseError(
            "no CreateItemResponseMessage in response".to_string(),
        )),
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

fn response_class_of(e: &BytesStart<'_>) -> EwsResult<String> {
    let attr = e
        .try_get_attribute("ResponseClass")
        .map_err(|e| EwsError::ParseError(e.to_string()))?
        .ok_or_else(|| EwsError::ParseError("missing ResponseClass".to_string()))?;
    let value = attr
        .unescape_value()
        .map_err(|e| EwsError::ParseError(e.to_string()))?;
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTODISCOVER_OK: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Autodiscover xmlns="http://schemas.microsoft.com/exchange/autodiscover/responseschema/2006">
  <Response xmlns="http://schemas.microsoft.com/exchange/autodiscover/outlook/responseschema/2006a">
    <User><DisplayName>John Doe</DisplayName></User>
    <Account>
      <AccountType>email</AccountType>
      <Action>settings</Action>
      <Protocol>
        <Type>EXCH</Type>
        <EwsUrl>https://internal.example.com/EWS/Exchange.asmx</EwsUrl>
      </Protocol>
      <Protocol>
        <Type>EXPR</Type>
        <EwsUrl>https://mail.example.com/EWS/Exchange.asmx</EwsUrl>
      </Protocol>
    </Account>
  </Response>
</Autodiscover>"#;

    #[test]
    fn test_autodiscover_request_escapes() {
        let xml = autodiscover_request("a&b@example.com");
        assert!(xml.contains("<EMailAddress>a&amp;b@example.com</EMailAddress>"));
        assert!(xml.contains(AUTODISCOVER_RESPONSE_SCHEMA));
    }

    #[test]
    fn test_autodiscover_prefers_expr() {
        assert_eq!(
            parse_autodiscover_response(AUTODISCOVER_OK).unwrap(),
            AutodiscoverResponse::EwsUrl("https://mail.example.com/EWS/Exchange.asmx".to_string())
        );

        let only_exch = AUTODISCOVER_OK.replace("<Type>EXPR</Type>", "<Type>WEB</Type>");
        assert_eq!(
            parse_autodiscover_response(&only_exch).unwrap(),
            AutodiscoverResponse::EwsUrl(
                "https://internal.example.com/EWS/Exchange.asmx".to_string()
            )
        );
    }

    #[test]
    fn test_autodiscover_redirect_and_error() {
        let redirect = r#"<Autodiscover><Response><Account>
            <Action>redirectAddr</Action><RedirectAddr>john@other.example.com</RedirectAddr>
            </Account></Response></Autodiscover>"#;
        assert_eq!(
            parse_autodiscover_response(redirect).unwrap(),
            AutodiscoverResponse::RedirectAddr("john@other.example.com".to_string())
        );

        let error = r#"<Autodiscover><Response><Error Time="10:00:00" Id="1">
            <ErrorCode>500</ErrorCode><Message>The email address can't be found.</Message>
            </Error></Response></Autodiscover>"#;
        assert_eq!(
            parse_autodiscover_response(error).unwrap(),
            AutodiscoverResponse::Error {
                code: "500".to_string(),
                message: "The email address can't be found.".to_string()
            }
        );
    }

    #[test]
    fn test_autodiscover_without_url() {
        assert!(matches!(
            parse_autodiscover_response("<Autodiscover/>"),
            Err(EwsError::ParseError(_))
        ));
        assert!(parse_autodiscover_response("<html><body>Login</body></html>").is_err());
    }

    #[test]
    fn test_create_item_request() {
        let xml = create_item_request(
            "from@example.com",
            AccessType::Delegate,
            "Fish & Chips",
            "Test \n Body <b>",
            &[
                Mailbox::new("me@example.com"),
                Mailbox::new("you@example.com").with_name("You"),
            ],
            &[],
        );

        assert!(xml.contains(r#"MessageDisposition="SendAndSaveCopy""#));
        assert!(xml.contains("<t:Subject>Fish &amp; Chips</t:Subject>"));
        assert!(xml.contains("Test \n Body &lt;b&gt;"));
        assert!(xml.contains("<t:ToRecipients><t:Mailbox><t:EmailAddress>me@example.com"));
        assert!(xml.contains("<t:Name>You</t:Name><t:EmailAddress>you@example.com"));
        assert!(!xml.contains("ExchangeImpersonation"));
        assert!(!xml.contains("<t:ReplyTo>"));
    }

    #[test]
    fn test_create_item_request_impersonation() {
        let xml = create_item_request(
            "from@example.com",
            AccessType::Impersonation,
            "s",
            "b",
            &[Mailbox::new("me@example.com")],
            &[Mailbox::new("reply@example.com")],
        );
        assert!(xml.contains("<t:PrimarySmtpAddress>from@example.com</t:PrimarySmtpAddress>"));
        assert!(xml.contains("<t:ReplyTo><t:Mailbox><t:EmailAddress>reply@example.com"));
    }

    #[test]
    fn test_create_item_response() {
        let ok = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
            <m:CreateItemResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages">
            <m:ResponseMessages><m:CreateItemResponseMessage ResponseClass="Success">
            <m:ResponseCode>NoError</m:ResponseCode><m:Items/>
            </m:CreateItemResponseMessage></m:ResponseMessages></m:CreateItemResponse>
            </s:Body></s:Envelope>"#;
        assert!(parse_create_item_response(ok).is_ok());

        let failed = ok
            .replace(r#"ResponseClass="Success""#, r#"ResponseClass="Error""#)
            .replace(
                "<m:ResponseCode>NoError</m:ResponseCode>",
                "<m:MessageText>Bad recipient</m:MessageText><m:ResponseCode>ErrorInvalidRecipients</m:ResponseCode>",
            );
        match parse_create_item_response(&failed) {
            Err(EwsError::ResponseError { code, message }) => {
                assert_eq!(code, "ErrorInvalidRecipients");
                assert_eq!(message, "Bad recipient");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_create_item_soap_fault() {
        let fault = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
            <s:Fault><faultcode>a:ErrorSchemaValidation</faultcode>
            <faultstring>The request failed schema validation</faultstring></s:Fault>
            </s:Body></s:Envelope>"#;
        assert!(matches!(
            parse_create_item_response(fault),
            Err(EwsError::SoapFault(ref s)) if s == "The request failed schema validation"
        ));
    }
}
