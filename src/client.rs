//! Monitor client context: keeps the rendered list in step with the API.
//!
//! SYSTEM CONTEXT
//! ==============
//! One client exists per page (or CLI invocation). It owns the user key and
//! the last known [`ListState`]; every operation updates that state, renders
//! it, and hands the resulting patches to the [`ViewSink`].
//!
//! ERROR HANDLING
//! ==============
//! Remote failures never escape an operation. A failed list degrades the
//! list region to an inline error; failed create/delete calls are reported
//! through [`Interaction::report_failure`] and leave state untouched. All
//! failures are logged. Nothing is retried.
//!
//! CONCURRENCY
//! ===========
//! Operations take `&mut self`, so one client runs one operation at a time.
//! There is no periodic reconciliation; out-of-band server changes show up on
//! the next full load.
//!
//! A host that queues operations behind a lock claims the [`SubmitGate`]
//! synchronously when the form is submitted. A second submit is dropped
//! while the first one waits for the lock or its request is in flight.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::cell::Cell;
use std::rc::Rc;

use crate::api::{Monitor, MonitorApi, MonitorId, NewMonitor};
use crate::identity::UserKey;
use crate::prompt::{self, Interaction};
use crate::view::{self, ListState, ListView, SubmitState, ViewSink};

/// Raw create-form input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonitorFields {
    pub url: String,
    pub css_selector: String,
    pub user_email: String,
}

/// Result of [`MonitorClient::handle_form_submit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(MonitorId),
    Failed,
    /// Another submission was already pending; no request was sent.
    Busy,
}

/// Result of [`MonitorClient::handle_delete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation; no request was sent.
    Declined,
    Failed,
}

// =============================================================================
// SUBMIT GATE
// =============================================================================

/// Single-flight flag for the create form, shared by clone.
#[derive(Clone, Debug, Default)]
pub struct SubmitGate {
    pending: Rc<Cell<bool>>,
}

impl SubmitGate {
    /// Claim the gate. Returns `None` while another ticket is alive.
    #[must_use]
    pub fn try_begin(&self) -> Option<SubmitTicket> {
        if self.pending.replace(true) {
            return None;
        }
        Some(SubmitTicket { pending: Rc::clone(&self.pending) })
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }
}

/// Proof of a claimed [`SubmitGate`]; releases it on drop.
#[derive(Debug)]
pub struct SubmitTicket {
    pending: Rc<Cell<bool>>,
}

impl Drop for SubmitTicket {
    fn drop(&mut self) {
        self.pending.set(false);
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct MonitorClient<A, V, P> {
    api: A,
    user_key: UserKey,
    state: ListState,
    rendered: ListView,
    submit: SubmitState,
    gate: SubmitGate,
    view: V,
    prompt: P,
}

impl<A, V, P> MonitorClient<A, V, P>
where
    A: MonitorApi,
    V: ViewSink,
    P: Interaction,
{
    /// The view is assumed to start out showing the loading placeholder.
    pub fn new(api: A, user_key: UserKey, view: V, prompt: P) -> Self {
        Self {
            api,
            user_key,
            state: ListState::Loading,
            rendered: ListView::Loading,
            submit: SubmitState::Idle,
            gate: SubmitGate::default(),
            view,
            prompt,
        }
    }

    #[must_use]
    pub fn user_key(&self) -> &UserKey {
        &self.user_key
    }

    #[must_use]
    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// The view as last handed to the sink.
    #[must_use]
    pub fn rendered(&self) -> &ListView {
        &self.rendered
    }

    #[must_use]
    pub fn submit_state(&self) -> SubmitState {
        self.submit
    }

    /// Handle on this client's submit gate, for claiming it outside the
    /// client (e.g. in an event handler that runs before the client is free).
    #[must_use]
    pub fn submit_gate(&self) -> SubmitGate {
        self.gate.clone()
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    #[must_use]
    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Page-ready entry point: load the list. Form handling needs no setup on
    /// the core side, so submissions may race this load.
    pub async fn startup(&mut self) {
        tracing::debug!(user_key = %self.user_key, "monitor client starting");
        self.load_monitors().await;
    }

    /// Replace the whole list with the server's current set.
    pub async fn load_monitors(&mut self) {
        let result = self.api.list(&self.user_key).await;
        match result {
            Ok(monitors) => {
                tracing::debug!(count = monitors.len(), "loaded monitors");
                self.state = ListState::Loaded(monitors);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load monitors");
                self.state = ListState::Failed;
            }
        }
        self.sync_view();
    }

    /// Add one monitor to the rendered list.
    ///
    /// A monitor whose id is already listed replaces that entry instead of
    /// producing a second card with the same element id.
    pub fn render_monitor(&mut self, monitor: Monitor) {
        match &mut self.state {
            ListState::Loaded(monitors) => {
                if let Some(existing) = monitors.iter_mut().find(|m| m.id == monitor.id) {
                    tracing::warn!(monitor_id = %monitor.id, "monitor already rendered, replacing");
                    *existing = monitor;
                } else {
                    monitors.push(monitor);
                }
            }
            // A placeholder (loading, empty or error) gives way to the card.
            state => *state = ListState::Loaded(vec![monitor]),
        }
        self.sync_view();
    }

    /// Submit the create form.
    ///
    /// Returns [`SubmitOutcome::Busy`] without sending anything when the
    /// submit gate is already claimed.
    pub async fn handle_form_submit(&mut self, fields: MonitorFields) -> SubmitOutcome {
        let Some(ticket) = self.gate.try_begin() else {
            tracing::debug!("submit already pending, ignoring");
            return SubmitOutcome::Busy;
        };
        self.submit_with(ticket, fields).await
    }

    /// Submit the create form under a ticket claimed from [`Self::submit_gate`].
    ///
    /// The submit control is `Pending` for the duration of the request and is
    /// always restored to `Idle` afterwards, whatever the outcome. The gate is
    /// released once the control is back to `Idle`.
    pub async fn submit_with(&mut self, ticket: SubmitTicket, fields: MonitorFields) -> SubmitOutcome {
        self.set_submit(SubmitState::Pending);

        let request = NewMonitor {
            url: fields.url,
            css_selector: fields.css_selector,
            user_email: fields.user_email,
            user_key: self.user_key.clone(),
        };

        let result = self.api.create(&request).await;
        let outcome = match result {
            Ok(created) => {
                tracing::info!(monitor_id = %created.id, url = %request.url, "monitor created");
                let id = created.id.clone();
                self.render_monitor(request.into_monitor(created.id));
                self.view.reset_form();
                SubmitOutcome::Created(id)
            }
            Err(e) => {
                tracing::error!(error = %e, url = %request.url, "failed to add monitor");
                self.prompt.report_failure(&prompt::add_failed_message(&e.user_detail()));
                SubmitOutcome::Failed
            }
        };

        self.set_submit(SubmitState::Idle);
        drop(ticket);
        outcome
    }

    /// Delete a monitor after the user confirms.
    pub async fn handle_delete(&mut self, id: &MonitorId) -> DeleteOutcome {
        if !self.prompt.confirm(prompt::DELETE_CONFIRMATION) {
            tracing::debug!(monitor_id = %id, "delete declined");
            return DeleteOutcome::Declined;
        }

        let result = self.api.delete(id, &self.user_key).await;
        if let Err(e) = result {
            tracing::error!(error = %e, monitor_id = %id, "failed to delete monitor");
            self.prompt.report_failure(prompt::DELETE_FAILED_MESSAGE);
            return DeleteOutcome::Failed;
        }

        tracing::info!(monitor_id = %id, "monitor deleted");
        if let ListState::Loaded(monitors) = &mut self.state {
            monitors.retain(|m| &m.id != id);
        }
        self.sync_view();
        DeleteOutcome::Deleted
    }

    fn set_submit(&mut self, state: SubmitState) {
        self.submit = state;
        self.view.set_submit_state(state);
    }

    fn sync_view(&mut self) {
        let next = view::render(&self.state);
        let patches = view::diff(&self.rendered, &next);
        if !patches.is_empty() {
            self.view.apply(&patches);
        }
        self.rendered = next;
    }
}
