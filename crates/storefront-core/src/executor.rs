// Submission executor: performs the single outbound call for a page.
//
// Two transports exist. The host bridge hands a message to the bot through
// the Mini App host and gets nothing back. HTTP posts to the backend and
// classifies the reply. Either way the caller gets a `Delivery` or a
// `SubmitError` carrying a message fit to show the user.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiResponse, Endpoint, MarketApi};
use crate::host::{HostBridge, SEND_DATA_LIMIT};
use crate::listing::ListingDraft;

const OK_SENTINEL: &str = "ok";

/// Shown when a bridge message is over the host's size limit.
pub const BRIDGE_TOO_LARGE_MESSAGE: &str = "Слишком много данных для отправки. Сократите описание.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Transport A: `sendData` through the host, no acknowledgement.
    HostBridge,
    /// Transport B: direct POST to the backend.
    Http,
}

/// What a page asks the backend to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Purchase { item_id: String },
    Listing(ListingDraft),
}

/// Message handed to the bot over the host bridge. The `type` tag is what the
/// bot's `web_app_data` handlers dispatch on.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BridgeMessage<'a> {
    PurchaseItem {
        #[serde(rename = "itemId")]
        item_id: &'a str,
    },
    CreateItem(&'a ListingDraft),
}

impl Submission {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Submission::Purchase { .. } => Endpoint::Purchase,
            Submission::Listing(_) => Endpoint::Sell,
        }
    }

    /// JSON for the host bridge.
    pub fn bridge_payload(&self) -> Result<String, serde_json::Error> {
        let message = match self {
            Submission::Purchase { item_id } => BridgeMessage::PurchaseItem { item_id },
            Submission::Listing(draft) => BridgeMessage::CreateItem(draft),
        };
        serde_json::to_string(&message)
    }

    /// JSON body for the HTTP endpoint, carrying the host's session string.
    pub fn http_body(&self, init_data: &str) -> Value {
        match self {
            Submission::Purchase { item_id } => json!({
                "itemId": item_id,
                "initData": init_data,
            }),
            Submission::Listing(draft) => json!({
                "itemData": draft,
                "initData": init_data,
            }),
        }
    }
}

/// Outcome of a call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Message handed to the host bridge. Nothing confirms the bot acted on it.
    Handed,
    /// Backend answered `status: "ok"`, optionally with a message.
    Confirmed { message: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Well-formed error reply from the backend; message shown verbatim.
    #[error("{message}")]
    BackendRejection { status: u16, message: String },

    /// Network failure, unreadable reply, or a message the host cannot carry.
    #[error("{message}")]
    TransportFailure { message: String },
}

impl SubmitError {
    pub fn user_message(&self) -> &str {
        match self {
            SubmitError::BackendRejection { message, .. } => message,
            SubmitError::TransportFailure { message } => message,
        }
    }
}

// ---------------------------------------------------------------------------
// Transport A
// ---------------------------------------------------------------------------

/// Serialize and hand the submission to the host. Returns once the host has
/// taken it; there is nothing further to wait for.
pub fn send_via_bridge(
    submission: &Submission,
    host: &dyn HostBridge,
    fallback: &str,
) -> Result<Delivery, SubmitError> {
    let payload = submission.bridge_payload().map_err(|e| {
        warn!(error = %e, "failed to serialize bridge message");
        SubmitError::TransportFailure {
            message: fallback.to_string(),
        }
    })?;

    if payload.len() > SEND_DATA_LIMIT {
        warn!(
            bytes = payload.len(),
            limit = SEND_DATA_LIMIT,
            "bridge message exceeds host limit, not sending"
        );
        return Err(SubmitError::TransportFailure {
            message: BRIDGE_TOO_LARGE_MESSAGE.to_string(),
        });
    }

    debug!(bytes = payload.len(), "handing message to host bridge");
    host.send_data(&payload);
    info!(endpoint = submission.endpoint().path(), "bridge message handed to host");
    Ok(Delivery::Handed)
}

// ---------------------------------------------------------------------------
// Transport B
// ---------------------------------------------------------------------------

/// POST the submission and classify the reply.
pub async fn send_via_http(
    submission: &Submission,
    api: &dyn MarketApi,
    init_data: &str,
    fallback: &str,
) -> Result<Delivery, SubmitError> {
    let endpoint = submission.endpoint();
    match api.post(endpoint, submission.http_body(init_data)).await {
        Ok(response) => classify(&response, fallback),
        Err(e) => {
            warn!(endpoint = endpoint.path(), error = %e, "submission request failed");
            Err(SubmitError::TransportFailure {
                message: fallback.to_string(),
            })
        }
    }
}

/// Success needs both a 2xx status and `status == "ok"` in the reply.
pub fn classify(response: &ApiResponse, fallback: &str) -> Result<Delivery, SubmitError> {
    let Some(reply) = &response.reply else {
        return Err(SubmitError::TransportFailure {
            message: fallback.to_string(),
        });
    };

    let message = reply.message.clone().filter(|m| !m.is_empty());
    if response.is_http_success() && reply.status.as_deref() == Some(OK_SENTINEL) {
        return Ok(Delivery::Confirmed { message });
    }

    Err(SubmitError::BackendRejection {
        status: response.status,
        message: message.unwrap_or_else(|| fallback.to_string()),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiReply;
    use crate::test_support::{FakeApi, FakeHost, HostCall};

    const FALLBACK: &str = "Произошла неизвестная ошибка.";

    fn draft() -> ListingDraft {
        ListingDraft {
            game_id: "3".into(),
            server: None,
            name: "Меч".into(),
            description: "Острый".into(),
            price: 100.0,
        }
    }

    fn response(status: u16, reply: Option<(&str, Option<&str>)>) -> ApiResponse {
        ApiResponse {
            status,
            reply: reply.map(|(s, m)| ApiReply {
                status: Some(s.to_string()),
                message: m.map(str::to_string),
            }),
        }
    }

    // -- Payload shapes --

    #[test]
    fn purchase_bridge_payload_shape() {
        let payload = Submission::Purchase { item_id: "42".into() }
            .bridge_payload()
            .unwrap();
        let v: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(v, json!({"type": "purchase_item", "itemId": "42"}));
    }

    #[test]
    fn listing_bridge_payload_shape() {
        let payload = Submission::Listing(draft()).bridge_payload().unwrap();
        let v: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(
            v,
            json!({
                "type": "create_item",
                "gameId": "3",
                "server": null,
                "name": "Меч",
                "description": "Острый",
                "price": 100.0
            })
        );
    }

    #[test]
    fn http_bodies_carry_init_data() {
        let purchase = Submission::Purchase { item_id: "42".into() }.http_body("sig");
        assert_eq!(purchase, json!({"itemId": "42", "initData": "sig"}));

        let sell = Submission::Listing(draft()).http_body("sig");
        assert_eq!(sell["initData"], "sig");
        assert_eq!(sell["itemData"]["gameId"], "3");
        assert_eq!(sell["itemData"]["name"], "Меч");
    }

    #[test]
    fn endpoints_per_submission() {
        assert_eq!(
            Submission::Purchase { item_id: "1".into() }.endpoint(),
            Endpoint::Purchase
        );
        assert_eq!(Submission::Listing(draft()).endpoint(), Endpoint::Sell);
    }

    // -- Classification --

    #[test]
    fn ok_status_and_ok_sentinel_is_success() {
        let result = classify(&response(200, Some(("ok", Some("Готово")))), FALLBACK);
        assert_eq!(
            result,
            Ok(Delivery::Confirmed {
                message: Some("Готово".into())
            })
        );
    }

    #[test]
    fn ok_without_message_is_success_without_message() {
        let result = classify(&response(200, Some(("ok", None))), FALLBACK);
        assert_eq!(result, Ok(Delivery::Confirmed { message: None }));
    }

    #[test]
    fn ok_sentinel_with_error_status_is_rejection() {
        let result = classify(&response(500, Some(("ok", Some("странно")))), FALLBACK);
        assert_eq!(
            result,
            Err(SubmitError::BackendRejection {
                status: 500,
                message: "странно".into()
            })
        );
    }

    #[test]
    fn error_sentinel_uses_server_message() {
        let err = classify(
            &response(400, Some(("error", Some("Недостаточно средств")))),
            FALLBACK,
        )
        .unwrap_err();
        assert_eq!(err.user_message(), "Недостаточно средств");
    }

    #[test]
    fn error_without_message_uses_fallback() {
        let err = classify(&response(200, Some(("error", None))), FALLBACK).unwrap_err();
        assert_eq!(err.user_message(), FALLBACK);
    }

    #[test]
    fn non_string_fields_do_not_discard_the_reply() {
        let rejected = ApiResponse {
            status: 400,
            reply: ApiReply::from_body(r#"{"status":400,"message":"Недостаточно средств"}"#),
        };
        assert_eq!(
            classify(&rejected, FALLBACK),
            Err(SubmitError::BackendRejection {
                status: 400,
                message: "Недостаточно средств".into()
            })
        );

        let confirmed = ApiResponse {
            status: 200,
            reply: ApiReply::from_body(r#"{"status":"ok","message":42}"#),
        };
        assert_eq!(
            classify(&confirmed, FALLBACK),
            Ok(Delivery::Confirmed { message: None })
        );
    }

    #[test]
    fn unparseable_reply_is_transport_failure() {
        let err = classify(&response(200, None), FALLBACK).unwrap_err();
        assert_eq!(
            err,
            SubmitError::TransportFailure {
                message: FALLBACK.into()
            }
        );
    }

    // -- Transports --

    #[test]
    fn bridge_hands_payload_to_host() {
        let host = FakeHost::default();
        let result = send_via_bridge(&Submission::Purchase { item_id: "5".into() }, &host, FALLBACK);
        assert_eq!(result, Ok(Delivery::Handed));
        assert_eq!(
            host.sent_data(),
            vec![r#"{"type":"purchase_item","itemId":"5"}"#.to_string()]
        );
    }

    #[test]
    fn bridge_refuses_oversized_payload() {
        let host = FakeHost::default();
        let mut big = draft();
        big.description = "я".repeat(SEND_DATA_LIMIT);
        let err = send_via_bridge(&Submission::Listing(big), &host, FALLBACK).unwrap_err();
        assert_eq!(err.user_message(), BRIDGE_TOO_LARGE_MESSAGE);
        assert!(!host.calls().iter().any(|c| matches!(c, HostCall::SendData(_))));
    }

    #[tokio::test]
    async fn http_network_error_uses_fallback() {
        let api = FakeApi::failing();
        let err = send_via_http(
            &Submission::Purchase { item_id: "1".into() },
            &api,
            "sig",
            FALLBACK,
        )
        .await
        .unwrap_err();
        assert_eq!(
            err,
            SubmitError::TransportFailure {
                message: FALLBACK.into()
            }
        );
        assert_eq!(api.posts().len(), 1);
    }

    #[tokio::test]
    async fn http_success_posts_body_to_endpoint() {
        let api = FakeApi::replying(200, r#"{"status":"ok","message":"Товар выставлен"}"#);
        let result = send_via_http(&Submission::Listing(draft()), &api, "sig", FALLBACK).await;
        assert_eq!(
            result,
            Ok(Delivery::Confirmed {
                message: Some("Товар выставлен".into())
            })
        );
        let posts = api.posts();
        assert_eq!(posts[0].0, Endpoint::Sell);
        assert_eq!(posts[0].1["initData"], "sig");
    }
}
