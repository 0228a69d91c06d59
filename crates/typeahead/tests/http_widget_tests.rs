//! End-to-end widget tests against a mock suggestion endpoint.

use std::time::Duration;

use serde_json::json;
use typeahead::{Autocomplete, TypeaheadSettings, attach_all};
use typeahead_core::{Document, ElementId};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn form_with_input(endpoint: &str, extra: &[(&str, &str)]) -> (Document, ElementId) {
    let doc = Document::new();
    let form = doc.create_element("form");
    let input = doc.create_element("input");
    doc.set_attribute(input, "data-autocomplete-url", endpoint).unwrap();
    doc.set_attribute(input, "data-autocomplete-delay", "20").unwrap();
    for (name, value) in extra {
        doc.set_attribute(input, name, *value).unwrap();
    }
    doc.append_child(doc.body(), form).unwrap();
    doc.append_child(form, input).unwrap();
    (doc, input)
}

fn settings_for(server: &MockServer) -> TypeaheadSettings {
    TypeaheadSettings::default().with_base_url(server.uri())
}

fn single_widget(doc: &Document, settings: &TypeaheadSettings) -> Autocomplete {
    let mut widgets = attach_all(doc, settings).expect("settings are valid");
    assert_eq!(widgets.len(), 1);
    widgets.remove(0)
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..300 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 3s");
}

async fn received(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

#[tokio::test]
async fn test_suggestions_rendered_from_endpoint() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alunos/autocomplete/"))
        .and(query_param("q", "jo"))
        .and(header("X-Requested-With", "fetch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": 7, "text": "Jo Silva"},
                {"id": "8", "nome": "Joana", "subtitle": "Turma B"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (doc, input) = form_with_input("/alunos/autocomplete/", &[]);
    let widget = single_widget(&doc, &settings_for(&server));

    doc.type_text(input, "jo").unwrap();
    wait_until(|| widget.is_panel_visible()).await;

    let html = widget.panel_html();
    assert!(html.contains("data-id=\"7\""));
    assert!(html.contains("<div class=\"suggest__title\">Jo Silva</div>"));
    assert!(html.contains("<div class=\"suggest__meta\">Turma B</div>"));
    assert!(!widget.has_active_request());
}

#[tokio::test]
async fn test_query_appended_to_existing_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busca/"))
        .and(query_param("ativos", "1"))
        .and(query_param("q", "joão silva"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1, "title": "João Silva"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (doc, input) = form_with_input("/busca/?ativos=1", &[]);
    let widget = single_widget(&doc, &settings_for(&server));

    doc.type_text(input, " joão silva ").unwrap();
    wait_until(|| widget.is_panel_visible()).await;
    assert!(widget.panel_html().contains("João Silva"));
}

#[tokio::test]
async fn test_server_error_hides_panel() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "jo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1, "text": "Joana"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "jos"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (doc, input) = form_with_input("/alunos/autocomplete/", &[]);
    let widget = single_widget(&doc, &settings_for(&server));

    doc.type_text(input, "jo").unwrap();
    wait_until(|| widget.is_panel_visible()).await;

    doc.type_text(input, "jos").unwrap();
    wait_until(|| !widget.is_panel_visible()).await;
    assert_eq!(widget.panel_html(), "");
    assert_eq!(received(&server).await, 2);
}

#[tokio::test]
async fn test_missing_results_field_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [{"id": 1}]})))
        .mount(&server)
        .await;

    let (doc, input) = form_with_input("/alunos/autocomplete/", &[]);
    let widget = single_widget(&doc, &settings_for(&server));

    doc.type_text(input, "jo").unwrap();
    wait_until(|| widget.last_submitted_query() == "jo" && !widget.has_active_request()).await;
    assert!(!widget.is_panel_visible());
}

#[tokio::test]
async fn test_malformed_json_is_silent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let (doc, input) = form_with_input("/alunos/autocomplete/", &[]);
    let widget = single_widget(&doc, &settings_for(&server));

    doc.type_text(input, "jo").unwrap();
    wait_until(|| widget.last_submitted_query() == "jo" && !widget.has_active_request()).await;
    assert!(!widget.is_panel_visible());
    assert_eq!(received(&server).await, 1);
}

#[tokio::test]
async fn test_out_of_order_responses() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "ab"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [{"id": 1, "text": "Stale result"}]}))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [{"id": 2, "text": "Fresh result"}]})),
        )
        .mount(&server)
        .await;

    let (doc, input) = form_with_input("/alunos/autocomplete/", &[]);
    let widget = single_widget(&doc, &settings_for(&server));

    doc.type_text(input, "ab").unwrap();
    wait_until(|| widget.has_active_request()).await;

    doc.type_text(input, "abc").unwrap();
    wait_until(|| widget.is_panel_visible()).await;
    assert!(widget.panel_html().contains("Fresh result"));

    tokio::time::sleep(Duration::from_millis(600)).await;
    let html = widget.panel_html();
    assert!(html.contains("Fresh result"));
    assert!(!html.contains("Stale result"));
}

#[tokio::test]
async fn test_unresolvable_endpoint_is_silent() {
    let (doc, input) = form_with_input("/alunos/autocomplete/", &[]);
    let widget = single_widget(&doc, &TypeaheadSettings::default());

    doc.type_text(input, "jo").unwrap();
    wait_until(|| widget.last_submitted_query() == "jo" && !widget.has_active_request()).await;
    assert!(!widget.is_panel_visible());
}

#[tokio::test]
async fn test_attach_all_skips_unconfigured_inputs() {
    let server = MockServer::start().await;
    let (doc, _) = form_with_input("/alunos/autocomplete/", &[]);

    let plain = doc.create_element("input");
    doc.append_child(doc.body(), plain).unwrap();
    let empty = doc.create_element("input");
    doc.set_attribute(empty, "data-autocomplete-url", "").unwrap();
    doc.append_child(doc.body(), empty).unwrap();
    let second = doc.create_element("input");
    doc.set_attribute(second, "data-autocomplete-url", "/turmas/").unwrap();
    doc.append_child(doc.body(), second).unwrap();

    let widgets = attach_all(&doc, &settings_for(&server)).unwrap();
    assert_eq!(widgets.len(), 2);
    assert_eq!(widgets[1].config().endpoint, "/turmas/");
}
