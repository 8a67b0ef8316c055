//! DOM tests for the annotation session. Run with
//! `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use abbrcore::{start_annotating, AnnotationSession};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const DICTIONARY: &str = r#"{
    "API": { "meaning": "Application Programming Interface", "description": "A contract between programs" },
    "HTML": "HyperText Markup Language"
}"#;

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn mount(markup: &str) -> Element {
    let container = document().create_element("div").unwrap();
    container.set_inner_html(markup);
    document().body().unwrap().append_child(&container).unwrap();
    container
}

async fn session() -> AnnotationSession {
    // no extension storage in a plain page: starts with an empty dictionary
    let session = start_annotating(JsValue::UNDEFINED).await.unwrap();
    session
        .reload(js_sys::JSON::parse(DICTIONARY).unwrap())
        .unwrap();
    session
}

async fn next_tick() {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

fn click(element: &Element) {
    element.dyn_ref::<HtmlElement>().unwrap().click();
}

fn popups() -> u32 {
    document()
        .query_selector_all(".abbreviation-popup")
        .unwrap()
        .length()
}

fn span(container: &Element, key: &str) -> Element {
    container
        .query_selector(&format!("span.abbreviation[data-key=\"{}\"]", key))
        .unwrap()
        .unwrap()
}

#[wasm_bindgen_test]
async fn test_annotates_page_text() {
    let container = mount("<p>Use the API today.</p><script>var API = 1;</script>");
    let mut session = session().await;

    let p = container.query_selector("p").unwrap().unwrap();
    let children = p.child_nodes();
    assert_eq!(children.length(), 3);
    assert_eq!(children.get(0).unwrap().text_content().unwrap(), "Use the ");
    assert_eq!(children.get(2).unwrap().text_content().unwrap(), " today.");

    let api = span(&container, "API");
    assert!(children.get(1).unwrap().is_same_node(Some(&*api)));
    assert_eq!(api.text_content().unwrap(), "API");
    assert_eq!(p.text_content().unwrap(), "Use the API today.");
    assert_eq!(container.query_selector_all("script span").unwrap().length(), 0);

    session.stop();
    container.remove();
}

#[wasm_bindgen_test]
async fn test_click_shows_single_popup() {
    let container = mount("<p>API and HTML</p>");
    let mut session = session().await;

    click(&span(&container, "API"));
    assert_eq!(popups(), 1);
    let popup = document().query_selector(".abbreviation-popup").unwrap().unwrap();
    let text = popup.text_content().unwrap();
    assert!(text.contains("API - Application Programming Interface"));
    assert!(text.contains("A contract between programs"));

    click(&span(&container, "HTML"));
    click(&span(&container, "HTML"));
    assert_eq!(popups(), 1);
    let popup = document().query_selector(".abbreviation-popup").unwrap().unwrap();
    assert!(popup.text_content().unwrap().contains("HTML - HyperText Markup Language"));

    session.stop();
    assert_eq!(popups(), 0);
    container.remove();
}

#[wasm_bindgen_test]
async fn test_outside_click_and_close_control_dismiss() {
    let container = mount("<p>API</p><p id=\"elsewhere\">nothing</p>");
    let mut session = session().await;

    click(&span(&container, "API"));
    assert_eq!(popups(), 1);

    // inside the popup: stays open
    let popup = document().query_selector(".abbreviation-popup").unwrap().unwrap();
    click(&popup.query_selector(".popup-header").unwrap().unwrap());
    assert_eq!(popups(), 1);

    click(&container.query_selector("#elsewhere").unwrap().unwrap());
    assert_eq!(popups(), 0);

    click(&span(&container, "API"));
    let close = document().query_selector(".popup-close").unwrap().unwrap();
    click(&close);
    assert_eq!(popups(), 0);

    session.stop();
    container.remove();
}

#[wasm_bindgen_test]
async fn test_inserted_content_is_annotated() {
    let container = mount("<p>Learn HTML first</p>");
    let mut session = session().await;
    let first = span(&container, "HTML");
    let before = session.annotated_count();

    let inserted = document().create_element("p").unwrap();
    inserted.set_text_content(Some("then call the API"));
    container.append_child(&inserted).unwrap();
    next_tick().await;

    assert_eq!(inserted.query_selector_all("span.abbreviation").unwrap().length(), 1);
    assert_eq!(session.annotated_count(), before + 1);
    assert!(span(&container, "HTML").is_same_node(Some(&*first)));

    session.stop();
    container.remove();
}

#[wasm_bindgen_test]
async fn test_stop_detaches_listeners_and_observer() {
    let container = mount("<p>API</p>");
    let mut session = session().await;
    session.stop();
    assert!(!session.is_watching());

    click(&span(&container, "API"));
    assert_eq!(popups(), 0);

    let inserted = document().create_element("p").unwrap();
    inserted.set_text_content(Some("more API"));
    container.append_child(&inserted).unwrap();
    next_tick().await;
    assert_eq!(inserted.query_selector_all("span").unwrap().length(), 0);

    container.remove();
}

#[wasm_bindgen_test]
async fn test_dropping_session_unhooks_spans() {
    let container = mount("<p>API</p>");
    let session = session().await;
    drop(session);

    // span still in the page, but its handlers are gone rather than dangling
    click(&span(&container, "API"));
    assert_eq!(popups(), 0);

    container.remove();
}

#[wasm_bindgen_test]
async fn test_popup_is_positioned_below_span() {
    let container = mount("<p>API</p>");
    let mut session = session().await;

    let api = span(&container, "API");
    click(&api);
    let popup = document()
        .query_selector(".abbreviation-popup")
        .unwrap()
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    let style = popup.style();
    assert!(style.get_property_value("left").unwrap().ends_with("px"));
    assert!(style.get_property_value("top").unwrap().ends_with("px"));

    let window = web_sys::window().unwrap();
    let anchor = api.get_bounding_client_rect();
    let top = popup.get_bounding_client_rect().top();
    let viewport_height = window.inner_height().unwrap().as_f64().unwrap();
    let popup_height = popup.get_bounding_client_rect().height();
    if anchor.bottom() + 5.0 + popup_height <= viewport_height {
        assert!((top - (anchor.bottom() + 5.0)).abs() < 1.0);
    }

    session.stop();
    container.remove();
}
