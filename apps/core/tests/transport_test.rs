use chatfind_core::config::HighlightConfig;
use chatfind_core::contract::{
    CoreRequest, CoreResponse, EventDto, SearchRequest, SearchResponse,
};
use chatfind_core::document::MemoryDocument;
use chatfind_core::service::SearchService;
use chatfind_core::transport::{handle_json, handle_request, ErrorCode, TransportResponse};

fn service_with_messages() -> SearchService {
    let mut doc = MemoryDocument::new();
    for text in ["merge request ready", "Merge conflict"] {
        let message = doc.append_element(None, "div", &["message-content"]);
        doc.append_text(message, text);
    }
    SearchService::new(doc, HighlightConfig::default())
}

#[test]
fn search_request_reports_match_count() {
    let mut service = service_with_messages();
    let response = handle_request(
        &mut service,
        CoreRequest::Search(SearchRequest {
            term: "merge".into(),
        }),
    );

    assert_eq!(
        response,
        TransportResponse::Ok {
            response: CoreResponse::Search(SearchResponse {
                match_count: Some(2),
                queued: false,
            }),
        }
    );
}

#[test]
fn json_search_then_settle_round_trip() {
    let mut service = service_with_messages();

    let searched = handle_json(
        &mut service,
        r#"{"kind":"Search","payload":{"term":"conflict"}}"#,
    );
    assert!(searched.contains("\"status\":\"ok\""));
    assert!(searched.contains("\"match_count\":1"));

    let settled = handle_json(&mut service, r#"{"kind":"Settle"}"#);
    let parsed: TransportResponse = serde_json::from_str(&settled).unwrap();
    match parsed {
        TransportResponse::Ok {
            response: CoreResponse::Events(events),
        } => {
            assert_eq!(events.now_ms, 2_100);
            assert!(events.events.contains(&EventDto::Marked { element: 1 }));
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn key_request_drives_search_box() {
    let mut service = service_with_messages();
    handle_json(&mut service, r#"{"kind":"Type","payload":{"text":"ready"}}"#);

    let response = handle_json(&mut service, r#"{"kind":"Key","payload":{"key":"enter"}}"#);

    assert!(response.contains("\"phase\":\"highlighting\""));
    assert!(response.contains("\"excerpt\":\"ready\""));
}

#[test]
fn invalid_json_returns_typed_error() {
    let mut service = service_with_messages();
    let response = handle_json(&mut service, "{not json");
    let parsed: TransportResponse = serde_json::from_str(&response).unwrap();

    match parsed {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::InvalidJson),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn oversized_advance_is_rejected() {
    let mut service = service_with_messages();
    let response = handle_json(
        &mut service,
        r#"{"kind":"Advance","payload":{"ms":99999999}}"#,
    );
    let parsed: TransportResponse = serde_json::from_str(&response).unwrap();

    match parsed {
        TransportResponse::Err { error } => {
            assert_eq!(error.code, ErrorCode::InvalidRequest);
            assert!(error.message.contains("advance"));
        }
        other => panic!("unexpected response: {other:?}"),
    }
}
