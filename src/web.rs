//! Browser adapters (`hydrate` feature): `localStorage`, `fetch`, the DOM and
//! `window.confirm`/`window.alert`.
//!
//! SYSTEM CONTEXT
//! ==============
//! The host page provides `#monitor-form`, `#submit-button`, `#monitors-list`
//! and optionally `#loading-message`. [`start`] wires them to a
//! [`MonitorClient`] once the document is ready.
//!
//! CONCURRENCY
//! ===========
//! The client sits behind an async mutex. Clicks and submits each spawn a local
//! task that waits for the lock, so overlapping events run one after another
//! in arrival order. The submit handler claims the client's submit gate and
//! disables the button before spawning; submits arriving while one is queued
//! or in flight are dropped.
//!
//! Delete clicks are handled by one listener on `#monitors-list` that reads
//! `data-id` from the nearest `.delete-btn`, so cards carry no closures.

use std::rc::{Rc, Weak};

use futures::lock::Mutex;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, FormData, HtmlButtonElement, HtmlElement, HtmlFormElement, Storage};

use crate::api::types::{parse_created_response, parse_list_response};
use crate::api::{self, ApiError, CreatedMonitor, Monitor, MonitorApi, MonitorId, NewMonitor};
use crate::client::{MonitorClient, MonitorFields, SubmitGate};
use crate::config::{DEFAULT_API_URL, normalize_api_url};
use crate::identity::{UserKey, get_or_create_user_key};
use crate::prompt::Interaction;
use crate::storage::{KeyValueStore, StorageError};
use crate::view::{self, Card, EMPTY_MESSAGE, SubmitState, ViewPatch, ViewSink};

type BrowserClient = MonitorClient<FetchMonitorApi, DomView, BrowserPrompt>;

fn js_text(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

// =============================================================================
// STORAGE
// =============================================================================

/// `window.localStorage`.
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the page has no local storage
    /// (e.g. disabled by privacy settings).
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| StorageError::Unavailable("localStorage is not available".to_owned()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(js_text(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Unavailable(js_text(&e)))
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Monitor API over `fetch` (`gloo-net`).
pub struct FetchMonitorApi {
    base_url: String,
}

impl FetchMonitorApi {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

async fn read_body(response: gloo_net::http::Response) -> Result<String, ApiError> {
    let status = response.status();
    if !api::is_success(status) {
        let text = response.text().await.unwrap_or_default();
        return Err(ApiError::from_status(status, &text));
    }
    response
        .text()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))
}

#[async_trait::async_trait(?Send)]
impl MonitorApi for FetchMonitorApi {
    async fn list(&self, user_key: &UserKey) -> Result<Vec<Monitor>, ApiError> {
        let url = api::list_url(&self.base_url, user_key)?;
        let response = gloo_net::http::Request::get(url.as_str())
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let text = read_body(response).await?;
        parse_list_response(&text)
    }

    async fn create(&self, monitor: &NewMonitor) -> Result<CreatedMonitor, ApiError> {
        let url = api::create_url(&self.base_url)?;
        let response = gloo_net::http::Request::post(url.as_str())
            .json(monitor)
            .map_err(|e| ApiError::Request(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let text = read_body(response).await?;
        parse_created_response(&text)
    }

    async fn delete(&self, id: &MonitorId, user_key: &UserKey) -> Result<(), ApiError> {
        let url = api::delete_url(&self.base_url, id, user_key)?;
        let response = gloo_net::http::Request::delete(url.as_str())
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        read_body(response).await.map(|_| ())
    }
}

// =============================================================================
// DIALOGS
// =============================================================================

/// `window.confirm` / `window.alert`.
pub struct BrowserPrompt;

impl Interaction for BrowserPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    fn report_failure(&mut self, message: &str) {
        if let Some(w) = web_sys::window() {
            let _ = w.alert_with_message(message);
        }
    }
}

// =============================================================================
// DOM
// =============================================================================

/// Applies list patches to `#monitors-list`. All text goes in through
/// `textContent`, never as markup.
pub struct DomView {
    document: Document,
    list: Element,
    loading: Option<HtmlElement>,
    form: HtmlFormElement,
    submit: HtmlButtonElement,
}

fn show_submit_state(button: &HtmlButtonElement, state: SubmitState) {
    button.set_disabled(state.disabled());
    button.set_text_content(Some(state.label()));
}

impl DomView {
    fn set_loading_visible(&self, visible: bool) {
        if let Some(loading) = &self.loading {
            loading.set_hidden(!visible);
        }
    }

    fn clear_list(&self) {
        self.set_loading_visible(false);
        self.list.set_text_content(None);
    }

    fn show_message(&self, text: &str, class: &str) {
        self.clear_list();
        match self.document.create_element("p") {
            Ok(p) => {
                p.set_class_name(class);
                p.set_text_content(Some(text));
                let _ = self.list.append_child(&p);
            }
            Err(e) => tracing::error!(error = %js_text(&e), "failed to create placeholder"),
        }
    }

    fn build_card(&self, card: &Card) -> Result<Element, JsValue> {
        let el = self.document.create_element("div")?;
        el.set_class_name("monitor-card");
        el.set_id(&card.element_id);

        let button = self.document.create_element("button")?;
        button.set_class_name("delete-btn");
        button.set_attribute("data-id", card.monitor_id.as_str())?;
        button.set_attribute("title", "Delete this monitor")?;
        button.set_text_content(Some("×"));
        el.append_child(&button)?;

        for (class, text) in [
            ("monitor-url", &card.url),
            ("monitor-selector", &card.css_selector),
            ("monitor-email", &card.user_email),
        ] {
            let p = self.document.create_element("p")?;
            p.set_class_name(class);
            p.set_text_content(Some(text.as_str()));
            el.append_child(&p)?;
        }
        Ok(el)
    }

    fn append_card(&self, card: &Card) {
        let appended = self
            .build_card(card)
            .and_then(|el| self.list.append_child(&el).map(|_| ()));
        if let Err(e) = appended {
            tracing::error!(error = %js_text(&e), element_id = %card.element_id, "failed to render card");
        }
    }
}

impl ViewSink for DomView {
    fn apply(&mut self, patches: &[ViewPatch]) {
        for patch in patches {
            match patch {
                ViewPatch::ShowLoading => {
                    self.list.set_text_content(None);
                    self.set_loading_visible(true);
                }
                ViewPatch::ShowEmpty => self.show_message(EMPTY_MESSAGE, "monitors-list__empty"),
                ViewPatch::ShowError(message) => self.show_message(message, "monitors-list__error"),
                ViewPatch::ClearPlaceholder => self.clear_list(),
                ViewPatch::AppendCard(card) => self.append_card(card),
                ViewPatch::RemoveCard(element_id) => {
                    if let Some(el) = self.document.get_element_by_id(element_id) {
                        el.remove();
                    }
                }
                ViewPatch::ReplaceCards(cards) => {
                    self.clear_list();
                    for card in cards {
                        self.append_card(card);
                    }
                }
            }
        }
    }

    fn set_submit_state(&mut self, state: SubmitState) {
        show_submit_state(&self.submit, state);
    }

    fn reset_form(&mut self) {
        self.form.reset();
    }
}

// =============================================================================
// STARTUP
// =============================================================================

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{id} has an unexpected element type")))
}

fn read_fields(form: &HtmlFormElement) -> MonitorFields {
    let data = FormData::new_with_form(form).ok();
    let field = |name: &str| {
        data.as_ref()
            .and_then(|d| d.get(name).as_string())
            .unwrap_or_default()
    };
    MonitorFields { url: field("url"), css_selector: field("css_selector"), user_email: field("user_email") }
}

/// Start against the default API.
///
/// # Errors
///
/// See [`start_with_api_url`].
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    start_with_api_url(DEFAULT_API_URL)
}

/// Install logging, then run the startup sequence when the document is ready.
///
/// # Errors
///
/// Returns an error for an invalid API URL or when the page has no document.
#[wasm_bindgen(js_name = startWithApiUrl)]
pub fn start_with_api_url(api_url: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let api_url = normalize_api_url(api_url).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() == "loading" {
        let ready_document = document.clone();
        let on_ready = Closure::once_into_js(move || {
            if let Err(e) = mount(&ready_document, api_url) {
                tracing::error!(error = %js_text(&e), "monitor client failed to start");
            }
        });
        document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
        Ok(())
    } else {
        mount(&document, api_url)
    }
}

fn mount(document: &Document, api_url: String) -> Result<(), JsValue> {
    let form: HtmlFormElement = element_by_id(document, "monitor-form")?;
    let submit: HtmlButtonElement = element_by_id(document, "submit-button")?;
    let list: Element = element_by_id(document, "monitors-list")?;
    let loading = document
        .get_element_by_id("loading-message")
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());

    let user_key = LocalStore::open()
        .and_then(|mut store| get_or_create_user_key(&mut store))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let view = DomView {
        document: document.clone(),
        list: list.clone(),
        loading,
        form: form.clone(),
        submit: submit.clone(),
    };
    let core = MonitorClient::new(FetchMonitorApi::new(api_url), user_key, view, BrowserPrompt);
    let gate = core.submit_gate();
    let client = Rc::new(Mutex::new(core));

    let loader = Rc::clone(&client);
    wasm_bindgen_futures::spawn_local(async move {
        loader.lock().await.startup().await;
    });

    attach_delete_listener(&list, Rc::downgrade(&client))?;
    attach_submit_listener(&form, submit, gate, client)
}

fn attach_delete_listener(list: &Element, client: Weak<Mutex<BrowserClient>>) -> Result<(), JsValue> {
    let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(button) = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .and_then(|el| el.closest(".delete-btn").ok().flatten())
        else {
            return;
        };
        let Some(id) = view::delete_target(button.get_attribute("data-id").as_deref()) else {
            return;
        };
        let Some(client) = client.upgrade() else {
            return;
        };
        wasm_bindgen_futures::spawn_local(async move {
            client.lock().await.handle_delete(&id).await;
        });
    });
    list.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}

fn attach_submit_listener(
    form: &HtmlFormElement,
    submit: HtmlButtonElement,
    gate: SubmitGate,
    client: Rc<Mutex<BrowserClient>>,
) -> Result<(), JsValue> {
    let fields_form = form.clone();
    let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        event.prevent_default();
        let Some(ticket) = gate.try_begin() else {
            tracing::debug!("submit already pending, ignoring");
            return;
        };
        // The client may be busy loading; lock the control out right away.
        show_submit_state(&submit, SubmitState::Pending);
        let fields = read_fields(&fields_form);
        let client = Rc::clone(&client);
        wasm_bindgen_futures::spawn_local(async move {
            client.lock().await.submit_with(ticket, fields).await;
        });
    });
    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();
    Ok(())
}
