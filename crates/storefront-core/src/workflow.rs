// Submission workflow: the controller shared by the buy and sell pages.
//
// One task owns the workflow and feeds it `PageEvent`s. User input arrives on
// one channel; the outbound call and the delay timers run as spawned tasks
// that report back on a second channel. Nothing else mutates the state, so
// the transition to `Submitting` is what keeps a second call from starting.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::MarketApi;
use crate::config::{Config, ContextSource};
use crate::context::LoadError;
use crate::executor::{self, Delivery, SubmitError, Submission, TransportKind};
use crate::host::{HostBridge, ImpactStyle, NotificationType};
use crate::listing::{self, ListingForm, ListingLimits};
use crate::page::{
    buy, sell, PageContext, PageKind, PageProfile, BRIDGE_SUCCESS_MESSAGE, ERROR_TITLE,
    FETCH_FAILED_NOTICE, SUCCESS_TITLE,
};
use crate::theme;
use crate::view::{ActionView, Modal, UiUpdate, View};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    AwaitingConfirmation,
    Submitting,
    Succeeded,
    Failed(String),
}

/// Whether the page can act at all. A blocked page never leaves `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Ready,
    Blocked(String),
}

/// Editable sell-form inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    Price,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The primary action control was pressed.
    ActionActivated,
    ConfirmAccepted,
    ConfirmCancelled,
    FieldChanged { field: FormField, value: String },
    /// The host reports new theme parameters.
    ThemeChanged,
    /// OK on the success modal.
    SuccessAcknowledged,
    ErrorDismissed,
    SubmissionFinished(Result<Delivery, SubmitError>),
    /// The post-handoff delay on the host bridge ran out.
    BridgeSettled,
    CloseTimerElapsed,
    Quit,
}

/// What the event loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSettings {
    pub transport: TransportKind,
    pub context_source: ContextSource,
    pub bridge_success_delay: Duration,
    pub close_delay: Duration,
    pub limits: ListingLimits,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        WorkflowSettings {
            transport: TransportKind::HostBridge,
            context_source: ContextSource::Query,
            bridge_success_delay: Duration::from_millis(500),
            close_delay: Duration::from_millis(2000),
            limits: ListingLimits::default(),
        }
    }
}

impl WorkflowSettings {
    pub fn from_config(config: &Config) -> Self {
        WorkflowSettings {
            transport: config.transport,
            context_source: config.context_source,
            bridge_success_delay: Duration::from_millis(config.timing.bridge_success_delay_ms),
            close_delay: Duration::from_millis(config.timing.close_delay_ms),
            limits: config.listing,
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

pub struct Workflow<V: View> {
    profile: PageProfile,
    settings: WorkflowSettings,
    context: Option<PageContext>,
    availability: Availability,
    state: SubmissionState,
    form: ListingForm,
    host: Arc<dyn HostBridge>,
    api: Arc<dyn MarketApi>,
    view: V,
    task_tx: mpsc::Sender<PageEvent>,
    outbound_calls: usize,
    close_scheduled: bool,
    closed: bool,
}

impl<V: View> Workflow<V> {
    /// `task_tx` is where spawned calls and timers report back; the caller
    /// feeds its receiver into the same loop as user events.
    pub fn new(
        kind: PageKind,
        context: Result<PageContext, LoadError>,
        settings: WorkflowSettings,
        host: Arc<dyn HostBridge>,
        api: Arc<dyn MarketApi>,
        view: V,
        task_tx: mpsc::Sender<PageEvent>,
    ) -> Self {
        let profile = kind.profile();
        let (context, availability) = match context {
            Ok(context) => (Some(context), Availability::Ready),
            Err(e) => {
                warn!(page = kind.name(), error = %e, "page context unavailable, action blocked");
                (None, Availability::Blocked(e.to_string()))
            }
        };

        Workflow {
            profile,
            settings,
            context,
            availability,
            state: SubmissionState::Idle,
            form: ListingForm::default(),
            host,
            api,
            view,
            task_tx,
            outbound_calls: 0,
            close_scheduled: false,
            closed: false,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn context(&self) -> Option<&PageContext> {
        self.context.as_ref()
    }

    pub fn form(&self) -> &ListingForm {
        &self.form
    }

    /// Outbound calls started so far (bridge handoffs and HTTP posts).
    pub fn outbound_calls(&self) -> usize {
        self.outbound_calls
    }

    /// Page load: greet the host, mirror its theme, render the context.
    pub async fn start(&mut self) {
        info!(page = self.profile.kind.name(), "page loading");
        self.host.ready();
        self.host.expand();
        theme::mirror(self.host.as_ref(), &mut self.view);

        match self.context.clone() {
            None => {
                self.view.apply(UiUpdate::Action(ActionView {
                    enabled: false,
                    label: self.profile.blocked_label.to_string(),
                }));
                self.view.apply(UiUpdate::Notice(Some(
                    self.profile.blocked_notice.to_string(),
                )));
            }
            Some(PageContext::Item(mut item)) => {
                if self.settings.context_source == ContextSource::Api {
                    match buy::enrich(item.clone(), self.api.as_ref()).await {
                        Ok(enriched) => item = enriched,
                        Err(e) => {
                            warn!(item_id = %item.id, error = %e, "item fetch failed, using link data");
                            self.view
                                .apply(UiUpdate::Notice(Some(FETCH_FAILED_NOTICE.to_string())));
                        }
                    }
                    self.context = Some(PageContext::Item(item.clone()));
                }
                buy::render(&item, &mut self.view);
                self.show_action(true);
            }
            Some(PageContext::Listing(seed)) => {
                sell::render(&seed, &self.settings.limits, &mut self.view);
                self.show_action(true);
            }
        }

        self.view.apply(UiUpdate::LoadingFinished);
        info!(
            page = self.profile.kind.name(),
            availability = ?self.availability,
            "page ready"
        );
    }

    /// Apply one event. Events that make no sense in the current state are
    /// ignored.
    pub fn handle(&mut self, event: PageEvent) -> Flow {
        debug!(?event, state = ?self.state, "page event");
        match event {
            PageEvent::ActionActivated => self.on_action(),
            PageEvent::ConfirmAccepted => self.on_confirm(),
            PageEvent::ConfirmCancelled => self.on_cancel(),
            PageEvent::FieldChanged { field, value } => self.on_field_changed(field, value),
            PageEvent::ThemeChanged => theme::mirror(self.host.as_ref(), &mut self.view),
            PageEvent::SubmissionFinished(result) => self.on_finished(result),
            PageEvent::BridgeSettled => {
                if self.state == SubmissionState::Submitting {
                    self.succeed(BRIDGE_SUCCESS_MESSAGE.to_string());
                }
            }
            PageEvent::SuccessAcknowledged => {
                if self.state == SubmissionState::Succeeded {
                    self.host.impact_occurred(ImpactStyle::Light);
                    return self.close_host();
                }
            }
            PageEvent::CloseTimerElapsed => {
                if self.state == SubmissionState::Succeeded {
                    return self.close_host();
                }
            }
            PageEvent::ErrorDismissed => {
                if matches!(self.state, SubmissionState::Failed(_)) {
                    self.view.apply(UiUpdate::Modal(None));
                    self.set_state(SubmissionState::Idle);
                }
            }
            PageEvent::Quit => {
                info!("quit requested");
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    // -- Event handlers --

    fn on_action(&mut self) {
        if let Availability::Blocked(reason) = &self.availability {
            debug!(%reason, "action ignored, page blocked");
            return;
        }
        match self.state {
            SubmissionState::Idle => {}
            SubmissionState::Failed(_) => {
                self.view.apply(UiUpdate::Modal(None));
                self.set_state(SubmissionState::Idle);
            }
            _ => {
                debug!(state = ?self.state, "action ignored");
                return;
            }
        }

        match self.profile.kind {
            PageKind::Buy => {
                self.host.impact_occurred(ImpactStyle::Medium);
                self.set_state(SubmissionState::AwaitingConfirmation);
                self.view.apply(UiUpdate::Modal(Some(Modal::Confirmation)));
            }
            PageKind::Sell => {
                let validated = match &self.context {
                    Some(PageContext::Listing(seed)) => {
                        listing::validate(seed, &self.form, &self.settings.limits)
                    }
                    _ => return,
                };
                match validated {
                    Ok(draft) => {
                        self.host.impact_occurred(ImpactStyle::Medium);
                        self.submit(Submission::Listing(draft));
                    }
                    Err(e) => {
                        info!(error = %e, "listing rejected by validation");
                        self.host.notification_occurred(NotificationType::Error);
                        self.host.show_alert(&e.to_string());
                    }
                }
            }
        }
    }

    fn on_confirm(&mut self) {
        if self.state != SubmissionState::AwaitingConfirmation {
            return;
        }
        let Some(PageContext::Item(item)) = &self.context else {
            return;
        };
        let submission = Submission::Purchase {
            item_id: item.id.clone(),
        };
        self.host.impact_occurred(ImpactStyle::Heavy);
        self.submit(submission);
    }

    fn on_cancel(&mut self) {
        if self.state != SubmissionState::AwaitingConfirmation {
            return;
        }
        self.host.impact_occurred(ImpactStyle::Light);
        self.view.apply(UiUpdate::Modal(None));
        self.set_state(SubmissionState::Idle);
    }

    fn on_field_changed(&mut self, field: FormField, value: String) {
        match field {
            FormField::Name => self.form.name = value,
            FormField::Price => self.form.price = value,
            FormField::Description => {
                self.view
                    .apply(sell::counter_update(&value, &self.settings.limits));
                self.form.description = value;
            }
        }
    }

    fn on_finished(&mut self, result: Result<Delivery, SubmitError>) {
        if self.state != SubmissionState::Submitting {
            debug!(state = ?self.state, "late submission result ignored");
            return;
        }
        match result {
            Ok(Delivery::Confirmed { message }) => {
                let message = message.unwrap_or_else(|| self.profile.success_fallback.to_string());
                self.succeed(message);
            }
            Ok(Delivery::Handed) => self.succeed(BRIDGE_SUCCESS_MESSAGE.to_string()),
            Err(e) => self.fail(e),
        }
    }

    // -- Transitions --

    /// Enter `Submitting` and start the one outbound call.
    fn submit(&mut self, submission: Submission) {
        self.set_state(SubmissionState::Submitting);
        self.view.apply(UiUpdate::Modal(None));
        self.view.apply(UiUpdate::Action(ActionView {
            enabled: false,
            label: self.profile.busy_label.to_string(),
        }));
        self.outbound_calls += 1;

        let fallback = self.profile.failure_fallback;
        match self.settings.transport {
            TransportKind::HostBridge => {
                match executor::send_via_bridge(&submission, self.host.as_ref(), fallback) {
                    Ok(_) => self.schedule(self.settings.bridge_success_delay, PageEvent::BridgeSettled),
                    Err(e) => self.fail(e),
                }
            }
            TransportKind::Http => {
                let api = Arc::clone(&self.api);
                let init_data = self.host.init_data();
                let tx = self.task_tx.clone();
                tokio::spawn(async move {
                    let result =
                        executor::send_via_http(&submission, api.as_ref(), &init_data, fallback)
                            .await;
                    if tx.send(PageEvent::SubmissionFinished(result)).await.is_err() {
                        debug!("page closed before the submission finished");
                    }
                });
            }
        }
    }

    fn succeed(&mut self, message: String) {
        info!(page = self.profile.kind.name(), %message, "submission succeeded");
        self.set_state(SubmissionState::Succeeded);
        self.view.apply(UiUpdate::Modal(Some(Modal::Success {
            title: SUCCESS_TITLE.to_string(),
            message,
        })));
        self.host.notification_occurred(NotificationType::Success);

        if !self.close_scheduled {
            self.close_scheduled = true;
            self.schedule(self.settings.close_delay, PageEvent::CloseTimerElapsed);
        }
    }

    fn fail(&mut self, error: SubmitError) {
        warn!(page = self.profile.kind.name(), error = %error, "submission failed");
        let message = error.user_message().to_string();
        self.set_state(SubmissionState::Failed(message.clone()));
        self.show_action(true);
        self.view.apply(UiUpdate::Modal(Some(Modal::Error {
            title: ERROR_TITLE.to_string(),
            message,
        })));
        self.host.notification_occurred(NotificationType::Error);
    }

    /// Close the host surface. Only the first call reaches the host.
    fn close_host(&mut self) -> Flow {
        if !self.closed {
            self.closed = true;
            info!("closing mini app");
            self.host.close();
        }
        Flow::Exit
    }

    fn show_action(&mut self, enabled: bool) {
        self.view.apply(UiUpdate::Action(ActionView {
            enabled,
            label: self.profile.action_label.to_string(),
        }));
    }

    fn set_state(&mut self, next: SubmissionState) {
        debug!(from = ?self.state, to = ?next, "submission state");
        self.state = next;
    }

    /// Deliver `event` on the task channel after `delay`.
    fn schedule(&self, delay: Duration, event: PageEvent) {
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event).await;
        });
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run a page until it closes or the user quits.
///
/// Listens on two channels using `tokio::select!`:
/// 1. User events from the front-end
/// 2. Results and timer expiries from tasks the workflow spawned
pub async fn run<V: View>(
    mut events_rx: mpsc::Receiver<PageEvent>,
    mut task_rx: mpsc::Receiver<PageEvent>,
    mut workflow: Workflow<V>,
) -> anyhow::Result<()> {
    info!("page event loop started");
    workflow.start().await;

    loop {
        let event = tokio::select! {
            event = events_rx.recv() => match event {
                Some(event) => event,
                None => {
                    info!("front-end channel closed, shutting down");
                    break;
                }
            },
            Some(event) = task_rx.recv() => event,
        };
        if workflow.handle(event) == Flow::Exit {
            break;
        }
    }

    info!("page event loop exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
