//! Discovery Document Tests

use std::collections::HashMap;

use credibil_vci_issuer::well_known::PRE_AUTHORIZED_CODE_GRANT;
use credibil_vci_issuer::{ClientConfig, DiscoveryRequest};
use serde_json::json;
use test_utils::{Realm, keys};

// Should extend the base configuration and hide grouped types by default.
#[tokio::test]
async fn base_configuration() {
    let issuer = keys::issuer(keys::ED25519, None, false);
    let provider = Realm::new();

    let response = credibil_vci_issuer::handle(&issuer, DiscoveryRequest, &provider)
        .await
        .expect("should return discovery document");
    let doc = &response.0;

    assert_eq!(
        doc.grant_types_supported(),
        vec!["authorization_code", "refresh_token", "client_credentials", PRE_AUTHORIZED_CODE_GRANT]
    );
    assert_eq!(doc.credential_endpoint(), Some("http://localhost:8080/credential"));

    let json = serde_json::to_value(&response.body).expect("should serialize");
    assert_eq!(json["issuer"], "http://localhost:8080");
    assert_eq!(json["scopes_supported"], json!(["openid", "profile", "email"]));
    assert!(json.get("credentials_supported").is_none());
}

// Should group the types declared by every client, skipping malformed
// attributes.
#[tokio::test]
async fn credentials_supported() {
    let issuer = keys::issuer(keys::ED25519, None, true);
    let provider = Realm::new();

    let response = credibil_vci_issuer::handle(&issuer, DiscoveryRequest, &provider)
        .await
        .expect("should return discovery document");

    let json = serde_json::to_value(&response.body).expect("should serialize");
    assert_eq!(
        json["credentials_supported"],
        json!({
            "ldp_vc": { "types": ["DiplomaCredential"] },
            "jwt_vc": { "types": ["DiplomaCredential", "EmployeeIDCredential", "ProofOfAge"] }
        })
    );
}

// A base configuration without grant types gains exactly the pre-authorized
// code grant.
#[tokio::test]
async fn no_grant_types() {
    let issuer = keys::issuer(keys::ED25519, None, true);
    let provider = Realm::empty();

    let response = credibil_vci_issuer::handle(&issuer, DiscoveryRequest, &provider)
        .await
        .expect("should return discovery document");
    assert_eq!(response.0.grant_types_supported(), vec![PRE_AUTHORIZED_CODE_GRANT]);
    assert!(response.0.ldp_vc.types.is_empty());
    assert!(response.0.jwt_vc.types.is_empty());
}

// Clients added later are picked up on the next request.
#[tokio::test]
async fn recomputed() {
    let issuer = keys::issuer(keys::ED25519, None, true);
    let provider = Realm::empty();

    let before = credibil_vci_issuer::handle(&issuer, DiscoveryRequest, &provider).await.unwrap();
    assert!(before.0.jwt_vc.types.is_empty());

    provider.add_client(&ClientConfig {
        client_id: "late".into(),
        attributes: Some(HashMap::from([("vctypes.jwt_vc".into(), "Membership".into())])),
    });
    let after = credibil_vci_issuer::handle(&issuer, DiscoveryRequest, &provider).await.unwrap();
    assert_eq!(after.0.jwt_vc.types, vec!["Membership"]);
}
