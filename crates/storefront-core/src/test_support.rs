// Recording fakes for the host bridge and the market API, shared by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiError, ApiReply, ApiResponse, Endpoint, MarketApi};
use crate::context::ItemRecord;
use crate::host::{HostBridge, ImpactStyle, NotificationType, ThemeParams};

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Ready,
    Expand,
    SendData(String),
    Impact(ImpactStyle),
    Notification(NotificationType),
    Alert(String),
    Close,
}

#[derive(Default)]
pub struct FakeHost {
    calls: Mutex<Vec<HostCall>>,
    theme: Mutex<ThemeParams>,
    init_data: String,
}

impl FakeHost {
    pub fn with_init_data(init_data: &str) -> Self {
        FakeHost {
            init_data: init_data.to_string(),
            ..Default::default()
        }
    }

    pub fn set_theme(&self, params: ThemeParams) {
        *self.theme.lock().unwrap() = params;
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent_data(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::SendData(data) => Some(data),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &HostCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl HostBridge for FakeHost {
    fn ready(&self) {
        self.record(HostCall::Ready);
    }

    fn expand(&self) {
        self.record(HostCall::Expand);
    }

    fn theme_params(&self) -> ThemeParams {
        self.theme.lock().unwrap().clone()
    }

    fn send_data(&self, data: &str) {
        self.record(HostCall::SendData(data.to_string()));
    }

    fn init_data(&self) -> String {
        self.init_data.clone()
    }

    fn impact_occurred(&self, style: ImpactStyle) {
        self.record(HostCall::Impact(style));
    }

    fn notification_occurred(&self, kind: NotificationType) {
        self.record(HostCall::Notification(kind));
    }

    fn show_alert(&self, message: &str) {
        self.record(HostCall::Alert(message.to_string()));
    }

    fn close(&self) {
        self.record(HostCall::Close);
    }
}

/// Scripted market API. Every POST gets the same answer.
pub struct FakeApi {
    posts: Mutex<Vec<(Endpoint, Value)>>,
    response: Option<ApiResponse>,
    item: Option<ItemRecord>,
}

impl FakeApi {
    /// Answers every POST with `status` and `body` (parsed as a reply if it can be).
    pub fn replying(status: u16, body: &str) -> Self {
        FakeApi {
            posts: Mutex::new(Vec::new()),
            response: Some(ApiResponse {
                status,
                reply: ApiReply::from_body(body),
            }),
            item: None,
        }
    }

    /// Every POST fails before a response arrives.
    pub fn failing() -> Self {
        FakeApi {
            posts: Mutex::new(Vec::new()),
            response: None,
            item: None,
        }
    }

    pub fn with_item(mut self, item: ItemRecord) -> Self {
        self.item = Some(item);
        self
    }

    pub fn posts(&self) -> Vec<(Endpoint, Value)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketApi for FakeApi {
    async fn post(&self, endpoint: Endpoint, body: Value) -> Result<ApiResponse, ApiError> {
        self.posts.lock().unwrap().push((endpoint, body));
        self.response
            .clone()
            .ok_or(ApiError::Status { status: 503 })
    }

    async fn fetch_item(&self, _item_id: &str) -> Result<ItemRecord, ApiError> {
        self.item.clone().ok_or(ApiError::Status { status: 404 })
    }
}
