// SPDX-License-Identifier: MIT OR Apache-2.0
//! Integration tests against a mocked ADT backend.

use erpl_session::{AdtSession, SessionConfig};
use erpl_types::SapClient;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_for(server: &MockServer) -> AdtSession {
    let authority = server.uri().trim_start_matches("http://").to_string();
    let (host, port) = authority.split_once(':').unwrap();
    let config = SessionConfig::new(host.to_string(), port.parse().unwrap(), false, SapClient::parse("100").unwrap());
    AdtSession::new(config).unwrap()
}

async fn mock_discovery(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sap/bc/adt/discovery"))
        .and(header("x-csrf-token", "fetch"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-csrf-token", "tok123"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn discover_reports_capability_flags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sap/bc/adt/discovery"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<app:service xmlns:app="http://www.w3.org/2007/app">
                <app:workspace>
                  <app:collection href="/sap/bc/adt/abapgit/repos"><atom:title xmlns:atom="http://www.w3.org/2005/Atom">abapGit</atom:title></app:collection>
                  <app:collection href="/sap/bc/adt/packages"/>
                </app:workspace>
            </app:service>"#,
        ))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let result = erpl_core::discover(&session).await.unwrap();
    assert_eq!(result["abapgit_present"], true);
    assert_eq!(result["packages_present"], true);
}

#[tokio::test]
async fn search_returns_object_references() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sap/bc/adt/repository/informationsystem/search"))
        .and(query_param("query", "ZCL*"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<adtcore:objectReferences xmlns:adtcore="http://www.sap.com/adt/core">
                <adtcore:objectReference adtcore:uri="/sap/bc/adt/oo/classes/zcl_test" adtcore:type="CLAS/OC" adtcore:name="ZCL_TEST"/>
            </adtcore:objectReferences>"#,
        ))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let result = erpl_core::search(&session, "ZCL*").await.unwrap();
    let results = result["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "ZCL_TEST");
}

#[tokio::test]
async fn package_tree_recurses_into_sub_packages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sap/bc/adt/repository/nodestructure"))
        .and(query_param("parent_name", "ZROOT"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<tree><node OBJECT_TYPE="DEVC/K" OBJECT_NAME="ZSUB" OBJECT_URI="/sap/bc/adt/packages/zsub"/>
                     <node OBJECT_TYPE="CLAS/OC" OBJECT_NAME="ZCL_ROOT" OBJECT_URI="/sap/bc/adt/oo/classes/zcl_root"/></tree>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sap/bc/adt/repository/nodestructure"))
        .and(query_param("parent_name", "ZSUB"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<tree><node OBJECT_TYPE="CLAS/OC" OBJECT_NAME="ZCL_SUB" OBJECT_URI="/sap/bc/adt/oo/classes/zcl_sub"/></tree>"#,
        ))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let result = erpl_core::package_tree(&session, "ZROOT", None, None).await.unwrap();
    let objects = result["objects"].as_array().unwrap();
    let names: Vec<&str> = objects.iter().map(|o| o["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"ZCL_ROOT"));
    assert!(names.contains(&"ZCL_SUB"));
    assert_eq!(objects.len(), 2);
}

#[tokio::test]
async fn lock_then_write_source_with_explicit_handle() {
    let server = MockServer::start().await;
    mock_discovery(&server).await;

    Mock::given(method("POST"))
        .and(path("/sap/bc/adt/oo/classes/zcl_test"))
        .and(query_param("_action", "LOCK"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<DATA><LOCK_HANDLE>HANDLE123</LOCK_HANDLE></DATA>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/sap/bc/adt/oo/classes/zcl_test/source/main"))
        .and(query_param("lockHandle", "HANDLE123"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let lock_result = erpl_core::lock(&session, "/sap/bc/adt/oo/classes/zcl_test", None).await.unwrap();
    assert_eq!(lock_result["lock_handle"], "HANDLE123");

    let write_result = erpl_core::write_source(
        &session,
        "/sap/bc/adt/oo/classes/zcl_test",
        "CLASS zcl_test DEFINITION. ENDCLASS.",
        Some("HANDLE123"),
        None,
    )
    .await
    .unwrap();
    assert_eq!(write_result["written"], true);
}

#[tokio::test]
async fn session_file_handoff_lets_a_second_session_complete_unlock() {
    let server = MockServer::start().await;
    mock_discovery(&server).await;

    Mock::given(method("POST"))
        .and(path("/sap/bc/adt/oo/classes/zcl_test"))
        .and(query_param("_action", "LOCK"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<DATA><LOCK_HANDLE>HANDLE456</LOCK_HANDLE></DATA>"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sap/bc/adt/oo/classes/zcl_test"))
        .and(query_param("_action", "UNLOCK"))
        .and(query_param("lockHandle", "HANDLE456"))
        .and(header("x-csrf-token", "tok123"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    let locking_session = session_for(&server);
    let lock_result = erpl_core::lock(&locking_session, "/sap/bc/adt/oo/classes/zcl_test", Some(session_file.to_str().unwrap()))
        .await
        .unwrap();
    assert_eq!(lock_result["lock_handle"], "HANDLE456");
    assert!(session_file.exists());
    assert!(locking_session.is_stateful().await);

    // A fresh session, as a second CLI invocation would construct, restores
    // CSRF/cookies/stateful from the handed-off file rather than from its
    // own (empty) state.
    let unlocking_session = session_for(&server);
    let unlock_result = erpl_core::unlock(
        &unlocking_session,
        "/sap/bc/adt/oo/classes/zcl_test",
        "HANDLE456",
        Some(session_file.to_str().unwrap()),
    )
    .await
    .unwrap();
    assert_eq!(unlock_result["unlocked"], true);
    assert!(!session_file.exists());
    assert!(!unlocking_session.is_stateful().await);
}
