//! Payment webhook handler.
//!
//! The gateway notifies this endpoint at-least-once per payment event. The
//! body is only trusted for the payment id; full details are re-fetched
//! before acting. Whatever happens internally, the handler acknowledges with
//! 200 `{"received": true}` so the gateway never retry-storms us - at the
//! cost of some emails silently failing.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sabia_core::PaymentStatus;

use crate::services::{OrderEmail, OrderEmailKind, Payment};
use crate::state::AppState;

/// Incoming gateway notification. Anything that does not look like a
/// payment event is acknowledged and ignored.
#[derive(Debug, Deserialize)]
pub struct WebhookNotification {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: Option<WebhookData>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    /// Payment id; the gateway sends this as either a number or a string.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

/// Acknowledgement body; always returned, regardless of internal outcome.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Handle a gateway payment notification.
#[instrument(skip_all, fields(kind = request.kind.as_deref().unwrap_or("-")))]
pub async fn notify(
    State(state): State<AppState>,
    Json(request): Json<WebhookNotification>,
) -> Json<WebhookAck> {
    if request.kind.as_deref() == Some("payment") {
        process_payment_notification(&state, &request).await;
    }

    Json(WebhookAck { received: true })
}

/// Fetch the payment, branch on its status, and resolve the email.
async fn process_payment_notification(state: &AppState, request: &WebhookNotification) {
    let Some(payment_id) = request.data.as_ref().and_then(payment_id) else {
        tracing::warn!("Payment notification without a usable payment id");
        return;
    };

    let payment = match state.gateway().get_payment(payment_id).await {
        Ok(payment) => payment,
        Err(e) => {
            tracing::error!(payment_id, error = %e, "Failed to fetch payment details");
            return;
        }
    };

    let kind = match &payment.status {
        PaymentStatus::Approved => OrderEmailKind::Confirmation,
        PaymentStatus::Pending => OrderEmailKind::Pending,
        PaymentStatus::Rejected => OrderEmailKind::Rejected,
        PaymentStatus::Other(raw) => {
            tracing::info!(payment_id, status = %raw, "Ignoring payment status");
            return;
        }
    };

    send_status_email(state, kind, payment).await;
}

/// Look up the stash and send the status email.
///
/// Terminal statuses take the entry out of the stash, so a repeated webhook
/// finds nothing and no-ops the email step while still acknowledging.
async fn send_status_email(state: &AppState, kind: OrderEmailKind, payment: Payment) {
    let Some(reference) = payment.external_reference.clone() else {
        tracing::warn!(
            payment_id = payment.id,
            "Payment carries no external reference; skipping email"
        );
        return;
    };

    let entry = if payment.status.is_terminal() {
        state.stash().take(&reference)
    } else {
        state.stash().get(&reference)
    };

    let Some(entry) = entry else {
        tracing::warn!(
            payment_id = payment.id,
            external_reference = %reference,
            "No stashed checkout for reference; skipping email"
        );
        return;
    };

    let order = OrderEmail {
        reference,
        customer: entry.customer,
        cart: entry.cart,
        totals: entry.totals,
        payment,
    };

    if let Err(e) = state.mailer().send_order_status(kind, &order).await {
        tracing::error!(
            external_reference = %order.reference,
            error = %e,
            "Failed to send order status email"
        );
    }
}

/// The gateway sends the payment id as a number or a numeric string.
fn payment_id(data: &WebhookData) -> Option<i64> {
    match data.id.as_ref()? {
        serde_json::Value::Number(number) => number.as_i64(),
        serde_json::Value::String(raw) => raw.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn payment_id_accepts_number_and_string() {
        let number = WebhookData {
            id: Some(serde_json::json!(123)),
        };
        assert_eq!(payment_id(&number), Some(123));

        let string = WebhookData {
            id: Some(serde_json::json!("456")),
        };
        assert_eq!(payment_id(&string), Some(456));

        let garbage = WebhookData {
            id: Some(serde_json::json!({"nested": true})),
        };
        assert_eq!(payment_id(&garbage), None);

        let missing = WebhookData { id: None };
        assert_eq!(payment_id(&missing), None);
    }

    #[test]
    fn notification_parses_without_data() {
        let parsed: WebhookNotification =
            serde_json::from_str("{\"type\":\"test\"}").unwrap();
        assert_eq!(parsed.kind.as_deref(), Some("test"));
        assert!(parsed.data.is_none());
    }
}
