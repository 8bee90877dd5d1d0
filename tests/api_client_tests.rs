//! REST client behavior against a mocked GeoTNB backend

use geotnb::api::{ApiError, ErrorKind, GeoTnbClient, MemoryTokenStore, ParcelFilter, TokenStore, UiReaction};
use geotnb::config::ApiConfig;
use geotnb::domain::{Role, ValidationState};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    }
}

fn client_with(server: &MockServer, tokens: Arc<dyn TokenStore>) -> GeoTnbClient {
    GeoTnbClient::new(&settings(server), tokens).unwrap()
}

fn parcel_json(id: u64, state: &str) -> Value {
    json!({
        "id": id,
        "reference_fonciere": format!("TF-{id}/R"),
        "surface_totale": 600.0,
        "surface_imposable": 500.0,
        "zonage": "R1",
        "montant_total_tnb": 5000.0,
        "etat_validation": state,
        "proprietaires": [
            {"proprietaire_id": 1, "nom": "Alaoui", "quote_part": 1.0, "est_actif": true}
        ],
        "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}
    })
}

#[tokio::test]
async fn login_persists_tokens_without_sending_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"username": "karim", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "user": {"id": 3, "username": "karim", "role": "AGENT_FISCAL"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::with_token("stale-token"));
    let client = client_with(&server, tokens.clone());
    client.auth.login("karim", "secret").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());

    let stored = tokens.load().unwrap();
    assert_eq!(stored.access_token, "access-1");
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(stored.current_user.unwrap().role, Role::TaxAgent);
}

#[tokio::test]
async fn resource_calls_carry_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/parcelles/7"))
        .and(header("authorization", "Bearer access-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(parcel_json(7, "Brouillon")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, Arc::new(MemoryTokenStore::with_token("access-7")));
    let parcel = client.parcels.get(7).await.unwrap();
    assert_eq!(parcel.reference, "TF-7/R");
    assert_eq!(parcel.validation_state, ValidationState::Draft);
}

#[tokio::test]
async fn unauthorized_maps_to_forced_logout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard/stats"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_with(&server, Arc::new(MemoryTokenStore::with_token("expired")));
    let err = client.dashboard.stats().await.unwrap_err();
    assert_eq!(err.status, 401);
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.ui_reaction(), UiReaction::ForceLogout);
}

#[tokio::test]
async fn validation_errors_keep_backend_message_and_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/parcelles"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Référence déjà utilisée",
            "errors": {"reference_fonciere": ["doit être unique"]}
        })))
        .mount(&server)
        .await;

    let client = client_with(&server, Arc::new(MemoryTokenStore::with_token("t")));
    let draft = serde_json::from_value(parcel_json(1, "Brouillon")).unwrap();
    let err: ApiError = client.parcels.create(&draft).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "Référence déjà utilisée");
    assert_eq!(err.field_errors["reference_fonciere"], vec!["doit être unique".to_string()]);
}

#[tokio::test]
async fn unreachable_backend_is_status_zero() {
    let client = GeoTnbClient::new(
        &ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..ApiConfig::default()
        },
        Arc::new(MemoryTokenStore::new()),
    )
    .unwrap();

    let err = client.parcels.get(1).await.unwrap_err();
    assert_eq!(err.status, 0);
    assert_eq!(err.kind, ErrorKind::Network);
}

#[tokio::test]
async fn writes_invalidate_cached_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/parcelles"))
        .and(query_param("etat_validation", "Valide"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [parcel_json(4, "Valide")],
            "total": 1, "page": 0, "size": 20
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/parcelles/4/publish"))
        .respond_with(ResponseTemplate::new(200).set_body_json(parcel_json(4, "Publie")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, Arc::new(MemoryTokenStore::with_token("t")));
    let filter = ParcelFilter {
        state: Some(ValidationState::Validated),
        ..ParcelFilter::default()
    };

    client.parcels.list(&filter).await.unwrap();
    // served from cache
    client.parcels.list(&filter).await.unwrap();

    let published = client.parcels.publish(4, Some("fin de contrôle".into())).await.unwrap();
    assert_eq!(published.validation_state, ValidationState::Published);

    // cache dropped by the write
    let page = client.parcels.list(&filter).await.unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn logout_clears_local_session_even_if_backend_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::with_token("t"));
    let client = client_with(&server, tokens.clone());
    client.auth.logout().await.unwrap();
    assert!(tokens.load().is_none());
    assert!(!client.auth.is_authenticated());
}

#[tokio::test]
async fn import_uploads_multipart_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/import/parcelles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "importes": 2,
            "erreurs": [{"ligne": 3, "message": "Zonage inconnu"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, Arc::new(MemoryTokenStore::with_token("t")));
    let report = client
        .imports
        .upload("parcelles", "parcelles.csv", b"reference_fonciere;zonage\n".to_vec())
        .await
        .unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.errors[0].line, 3);

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
}
