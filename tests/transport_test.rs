//! HTTP transport tests against a local mock server.

use bingads_shared_lists::{
    AuthConfig, CampaignManagementClient, ClientConfig, ClientError, EntityScope, ErrorKind,
    HttpTransport, SharedEntityType, Transport,
};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHARED_ENTITIES_RESPONSE: &str = concat!(
    "<s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\">",
    "<s:Header><TrackingId xmlns=\"https://bingads.microsoft.com/CampaignManagement/v13\">t-1</TrackingId></s:Header>",
    "<s:Body><GetSharedEntitiesResponse xmlns=\"https://bingads.microsoft.com/CampaignManagement/v13\" xmlns:i=\"http://www.w3.org/2001/XMLSchema-instance\">",
    "<SharedEntities><SharedEntity i:type=\"NegativeKeywordList\">",
    "<AssociationCount>1</AssociationCount><Id>321</Id><Name>Shared negatives</Name><ItemCount>4</ItemCount>",
    "</SharedEntity></SharedEntities>",
    "</GetSharedEntitiesResponse></s:Body></s:Envelope>"
);

const FAULT_RESPONSE: &str = concat!(
    "<s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\"><s:Body><s:Fault>",
    "<faultcode>s:Client</faultcode><faultstring>Invalid client data. Check the SOAP fault details for more information.</faultstring>",
    "<detail><AdApiFaultDetail xmlns=\"https://adapi.microsoft.com\"><TrackingId>t-9</TrackingId>",
    "<Errors><AdApiError><Code>105</Code><ErrorCode>InvalidCredentials</ErrorCode>",
    "<Message>Authentication failed.</Message></AdApiError></Errors>",
    "</AdApiFaultDetail></detail></s:Fault></s:Body></s:Envelope>"
);

fn transport() -> HttpTransport {
    HttpTransport::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_post_sets_soap_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/svc"))
        .and(header("Content-Type", "text/xml; charset=utf-8"))
        .and(header("SOAPAction", "GetSharedEntities"))
        .and(body_string_contains("<Envelope/>"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<ok/>"))
        .expect(1)
        .mount(&server)
        .await;

    let body = transport()
        .post(
            &format!("{}/svc", server.uri()),
            "GetSharedEntities",
            b"<Envelope/>".to_vec(),
        )
        .await
        .unwrap();
    assert_eq!(body, b"<ok/>");
}

#[tokio::test]
async fn test_non_200_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string(FAULT_RESPONSE))
        .mount(&server)
        .await;

    let err = transport()
        .post(&server.uri(), "GetSharedEntities", Vec::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    match &err {
        ClientError::Transport { status, body, .. } => {
            assert_eq!(*status, Some(500));
            assert_eq!(body.as_deref(), Some(FAULT_RESPONSE.as_bytes()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let fault = err.transport_fault().unwrap();
    assert_eq!(fault.tracking_id, "t-9");
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_rate_limited_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = transport()
        .post(&server.uri(), "GetSharedEntities", Vec::new())
        .await
        .unwrap_err();
    assert!(err.is_rate_limited());
    assert!(err.transport_fault().is_none());
}

#[tokio::test]
async fn test_timeout_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let slow = HttpTransport::new(Duration::from_millis(50)).unwrap();
    let err = slow
        .post(&server.uri(), "GetSharedEntities", Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
}

#[tokio::test]
async fn test_client_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/CampaignManagementService.svc"))
        .and(header("SOAPAction", "GetSharedEntities"))
        .and(body_string_contains(
            "<SharedEntityType>NegativeKeywordList</SharedEntityType>",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHARED_ENTITIES_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = ClientConfig::new(AuthConfig::new("dev", "token", "1", "2"));
    config.api.endpoint = Some(format!("{}/CampaignManagementService.svc", server.uri()));
    config.api.debug = true;
    let client = CampaignManagementClient::new(config).unwrap();

    let entities = client
        .shared_lists()
        .get_shared_entities(SharedEntityType::NegativeKeywordList, EntityScope::Customer)
        .await
        .unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].id, 321);
    assert_eq!(entities[0].name, "Shared negatives");
    assert_eq!(entities[0].item_count, 4);
    assert_eq!(entities[0].entity_type, "NegativeKeywordList");
}
