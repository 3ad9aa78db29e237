//! Transactional order email service.
//!
//! Sends the three payment-outcome emails (confirmed, pending, rejected)
//! over SMTP via lettre, rendered from Askama HTML + plain-text templates.
//! The [`Mailer`] trait is the seam the webhook flow is written against.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use thiserror::Error;

use sabia_core::{Cart, CustomerData, OrderReference};

use crate::checkout::pricing::CheckoutTotals;
use crate::config::EmailConfig;
use crate::services::gateway::Payment;

/// Which payment outcome the email reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEmailKind {
    /// Payment approved - order confirmation.
    Confirmation,
    /// Payment still processing.
    Pending,
    /// Payment rejected.
    Rejected,
}

/// Everything an order email is rendered from: the stashed checkout data
/// merged with the live payment details.
#[derive(Debug, Clone)]
pub struct OrderEmail {
    pub reference: OrderReference,
    pub customer: CustomerData,
    pub cart: Cart,
    pub totals: CheckoutTotals,
    pub payment: Payment,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// The email operations the webhook flow depends on.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the order status email for the given outcome.
    ///
    /// # Errors
    ///
    /// Returns error if rendering or delivery fails. Callers on the webhook
    /// path log and swallow this - delivery failure never reaches the
    /// gateway.
    async fn send_order_status(
        &self,
        kind: OrderEmailKind,
        order: &OrderEmail,
    ) -> Result<(), EmailError>;
}

// =============================================================================
// Template Views
// =============================================================================

/// Flattened, preformatted order data for the templates.
struct OrderEmailView {
    customer_name: String,
    reference: String,
    lines: Vec<OrderLineView>,
    subtotal: String,
    shipping: String,
    discount: String,
    total: String,
    payment_id: i64,
}

struct OrderLineView {
    name: String,
    quantity: u32,
    line_total: String,
}

/// Format a BRL amount for display.
fn format_brl(amount: Decimal) -> String {
    format!("R$ {amount:.2}")
}

impl OrderEmailView {
    fn from_order(order: &OrderEmail) -> Self {
        Self {
            customer_name: order.customer.name.clone(),
            reference: order.reference.to_string(),
            lines: order
                .cart
                .items()
                .iter()
                .map(|item| OrderLineView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    line_total: format_brl(item.line_total()),
                })
                .collect(),
            subtotal: format_brl(order.totals.subtotal),
            shipping: format_brl(order.totals.shipping),
            discount: format_brl(order.totals.discount),
            total: format_brl(order.totals.total),
            payment_id: order.payment.id,
        }
    }
}

#[derive(Template)]
#[template(path = "email/order_approved.html")]
struct OrderApprovedHtml<'a> {
    order: &'a OrderEmailView,
}

#[derive(Template)]
#[template(path = "email/order_approved.txt")]
struct OrderApprovedText<'a> {
    order: &'a OrderEmailView,
}

#[derive(Template)]
#[template(path = "email/order_pending.html")]
struct OrderPendingHtml<'a> {
    order: &'a OrderEmailView,
}

#[derive(Template)]
#[template(path = "email/order_pending.txt")]
struct OrderPendingText<'a> {
    order: &'a OrderEmailView,
}

#[derive(Template)]
#[template(path = "email/order_rejected.html")]
struct OrderRejectedHtml<'a> {
    order: &'a OrderEmailView,
}

#[derive(Template)]
#[template(path = "email/order_rejected.txt")]
struct OrderRejectedText<'a> {
    order: &'a OrderEmailView,
}

// =============================================================================
// SMTP Mailer
// =============================================================================

/// SMTP implementation of [`Mailer`].
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_order_status(
        &self,
        kind: OrderEmailKind,
        order: &OrderEmail,
    ) -> Result<(), EmailError> {
        let view = OrderEmailView::from_order(order);

        let (subject, text, html) = match kind {
            OrderEmailKind::Confirmation => (
                format!("Pedido confirmado - {}", view.reference),
                OrderApprovedText { order: &view }.render()?,
                OrderApprovedHtml { order: &view }.render()?,
            ),
            OrderEmailKind::Pending => (
                format!("Pagamento em análise - {}", view.reference),
                OrderPendingText { order: &view }.render()?,
                OrderPendingHtml { order: &view }.render()?,
            ),
            OrderEmailKind::Rejected => (
                format!("Pagamento recusado - {}", view.reference),
                OrderRejectedText { order: &view }.render()?,
                OrderRejectedHtml { order: &view }.render()?,
            ),
        };

        self.send_multipart_email(&order.customer.email, &subject, &text, &html)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sabia_core::{Address, NewCartItem, PaymentStatus, Phone};

    use super::*;

    fn sample_order() -> OrderEmail {
        let mut cart = Cart::new();
        cart.add(NewCartItem {
            id: "p1".to_string(),
            name: "Caneca Sabiá".to_string(),
            price: "59.90".parse().unwrap(),
            image: "https://cdn.example.com/caneca.jpg".to_string(),
            slug: "caneca-sabia".to_string(),
            stock: 10,
        });
        cart.set_quantity("p1", 2);
        let totals = CheckoutTotals::compute(&cart, None);

        OrderEmail {
            reference: OrderReference::new("SB-1-abc"),
            customer: CustomerData {
                email: "maria@example.com".to_string(),
                name: "Maria Silva".to_string(),
                phone: Phone {
                    area_code: "11".to_string(),
                    number: "987654321".to_string(),
                },
                address: Address {
                    zip_code: "01310-100".to_string(),
                    street_name: "Avenida Paulista".to_string(),
                    street_number: "1000".to_string(),
                    city: "São Paulo".to_string(),
                    state: "SP".to_string(),
                    neighborhood: None,
                    complement: None,
                },
            },
            cart,
            totals,
            payment: Payment {
                id: 123_456,
                status: PaymentStatus::Approved,
                status_detail: Some("accredited".to_string()),
                external_reference: Some(OrderReference::new("SB-1-abc")),
                transaction_amount: Some("159.80".parse().unwrap()),
                payer_email: Some("maria@example.com".to_string()),
            },
        }
    }

    #[test]
    fn view_flattens_and_formats_amounts() {
        let order = sample_order();
        let view = OrderEmailView::from_order(&order);

        assert_eq!(view.customer_name, "Maria Silva");
        assert_eq!(view.reference, "SB-1-abc");
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].quantity, 2);
        assert_eq!(view.lines[0].line_total, "R$ 119.80");
        assert_eq!(view.subtotal, "R$ 119.80");
        assert_eq!(view.shipping, "R$ 0.00");
        assert_eq!(view.total, "R$ 119.80");
    }

    #[test]
    fn approved_templates_render() {
        let order = sample_order();
        let view = OrderEmailView::from_order(&order);

        let html = OrderApprovedHtml { order: &view }.render().unwrap();
        let text = OrderApprovedText { order: &view }.render().unwrap();

        assert!(html.contains("SB-1-abc"));
        assert!(html.contains("Caneca Sabiá"));
        assert!(text.contains("R$ 119.80"));
    }

    #[test]
    fn rejected_template_mentions_rejection() {
        let order = sample_order();
        let view = OrderEmailView::from_order(&order);

        let text = OrderRejectedText { order: &view }.render().unwrap();
        assert!(text.contains("recusado"));
    }
}
