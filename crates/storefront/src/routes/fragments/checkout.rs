//! Payment form and order confirmation fragments.
//!
//! The form carries one input group per payment method. Only the selected
//! group is visible; switching the method re-requests the form with the
//! typed address preserved. On submit, only the selected group's fields are
//! read. Invalid input re-renders the form with an error notification and
//! never reaches the order service.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use greengrocer_core::api::{CheckoutRequest, CheckoutResponse};
use greengrocer_core::{
    OrderId, PaymentFields, PaymentMethod, SUPPORTED_BANKS, SUPPORTED_WALLETS, UserId,
};

use super::cart::CartCountTemplate;
use super::{CART_UPDATED, FragmentResult, Notification, trigger, with_notification};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::services::{CartService, CheckoutService};
use crate::state::AppState;

/// A radio button or select option.
#[derive(Debug, Clone)]
pub struct ChoiceView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn choices(options: &[(&'static str, &'static str)], selected: &str) -> Vec<ChoiceView> {
    options
        .iter()
        .map(|&(value, label)| ChoiceView {
            value,
            label,
            selected: value == selected,
        })
        .collect()
}

/// Query of `GET /fragments/checkout`.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutFormQuery {
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    #[serde(default)]
    pub delivery_address: Option<String>,
}

/// Body of `POST /fragments/checkout`: every group's inputs, flat.
#[derive(Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_holder: String,
    #[serde(default)]
    pub expiry: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub upi_id: String,
    #[serde(default)]
    pub bank: String,
    #[serde(default)]
    pub wallet_provider: String,
    #[serde(default)]
    pub wallet_mobile: String,
}

impl CheckoutForm {
    fn method(&self) -> PaymentMethod {
        self.method.unwrap_or(PaymentMethod::Card)
    }

    /// Build the checkout request from the selected group only.
    fn to_request(&self) -> CheckoutRequest {
        let fields = PaymentFields {
            card_number: self.card_number.clone(),
            card_holder: self.card_holder.clone(),
            expiry: self.expiry.clone(),
            cvv: self.cvv.clone(),
            upi_id: self.upi_id.clone(),
            bank: self.bank.clone(),
            wallet_provider: self.wallet_provider.clone(),
            wallet_mobile: self.wallet_mobile.clone(),
        };
        CheckoutRequest {
            delivery_address: self.delivery_address.clone(),
            payment: fields.into_details(self.method()),
        }
    }
}

/// Payment form fragment template.
///
/// Card number and CVV are never echoed back into the form.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/checkout.html")]
pub struct CheckoutFormTemplate {
    pub active: &'static str,
    pub methods: Vec<ChoiceView>,
    pub banks: Vec<ChoiceView>,
    pub wallets: Vec<ChoiceView>,
    pub total: Decimal,
    pub delivery_address: String,
    pub card_holder: String,
    pub expiry: String,
    pub upi_id: String,
    pub wallet_mobile: String,
}

impl CheckoutFormTemplate {
    fn new(method: PaymentMethod, total: Decimal) -> Self {
        let methods: Vec<(&'static str, &'static str)> = PaymentMethod::ALL
            .iter()
            .map(|m| (m.as_str(), m.label()))
            .collect();
        Self {
            active: method.as_str(),
            methods: choices(&methods, method.as_str()),
            banks: choices(SUPPORTED_BANKS, ""),
            wallets: choices(SUPPORTED_WALLETS, ""),
            total,
            delivery_address: String::new(),
            card_holder: String::new(),
            expiry: String::new(),
            upi_id: String::new(),
            wallet_mobile: String::new(),
        }
    }

    fn refill(form: &CheckoutForm, total: Decimal) -> Self {
        Self {
            banks: choices(SUPPORTED_BANKS, &form.bank),
            wallets: choices(SUPPORTED_WALLETS, &form.wallet_provider),
            delivery_address: form.delivery_address.clone(),
            card_holder: form.card_holder.clone(),
            expiry: form.expiry.clone(),
            upi_id: form.upi_id.clone(),
            wallet_mobile: form.wallet_mobile.clone(),
            ..Self::new(form.method(), total)
        }
    }
}

/// Order confirmation fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/order_confirmation.html")]
pub struct OrderConfirmationTemplate {
    pub order_id: OrderId,
    pub total: Decimal,
    pub status: String,
    pub payment_status: String,
    pub method: &'static str,
    pub delivery_address: String,
    pub count: CartCountTemplate,
}

impl OrderConfirmationTemplate {
    fn new(placed: &CheckoutResponse, method: PaymentMethod, delivery_address: &str) -> Self {
        Self {
            order_id: placed.order_id,
            total: placed.total,
            status: placed.status.to_string(),
            payment_status: placed.payment_status.to_string(),
            method: method.label(),
            delivery_address: delivery_address.trim().to_string(),
            count: CartCountTemplate::out_of_band(0),
        }
    }
}

async fn cart_total(state: &AppState, user_id: UserId) -> FragmentResult<Decimal> {
    let cart = CartService::new(state.pool()).get(user_id).await?;
    Ok(cart.total().rounded())
}

/// Render the payment form with the requested method selected.
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<CheckoutFormQuery>,
) -> FragmentResult<CheckoutFormTemplate> {
    let total = cart_total(&state, user.id).await?;
    let mut template = CheckoutFormTemplate::new(query.method.unwrap_or_default(), total);
    if let Some(address) = query.delivery_address {
        template.delivery_address = address;
    }
    Ok(template)
}

/// Validate the form and place the order.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> FragmentResult {
    let today = Utc::now().date_naive();
    let request = form.to_request();

    if let Err(e) = request.validate(today) {
        tracing::debug!(error = %e, "Checkout form rejected");
        let total = cart_total(&state, user.id).await?;
        let body = with_notification(
            &CheckoutFormTemplate::refill(&form, total),
            &Notification::error(e.to_string()),
        )?;
        return Ok((StatusCode::BAD_REQUEST, body).into_response());
    }

    let placed = CheckoutService::new(state.pool())
        .place_order(user.id, &request, today)
        .await?;
    state.catalog().invalidate_all().await;

    let body = with_notification(
        &OrderConfirmationTemplate::new(&placed, form.method(), &form.delivery_address),
        &Notification::success("Order placed successfully!"),
    )?;
    Ok((StatusCode::CREATED, trigger(CART_UPDATED), body).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use greengrocer_core::{OrderStatus, PaymentDetails, PaymentStatus};

    use super::*;

    fn hidden_groups(html: &str) -> usize {
        html.matches("class=\"payment-group\" hidden").count()
    }

    #[test]
    fn test_default_method_is_card() {
        let html = CheckoutFormTemplate::new(PaymentMethod::default(), Decimal::new(5, 0))
            .render()
            .unwrap();
        assert!(html.contains(r#"data-method="card" class="payment-group">"#));
        assert_eq!(hidden_groups(&html), 4);
        assert!(html.contains("Total: $5.00"));
    }

    #[test]
    fn test_switching_method_shows_only_that_group() {
        let html = CheckoutFormTemplate::new(PaymentMethod::Upi, Decimal::new(5, 0))
            .render()
            .unwrap();
        assert!(html.contains(r#"data-method="upi" class="payment-group">"#));
        assert!(html.contains(r#"data-method="card" class="payment-group" hidden"#));
        assert_eq!(hidden_groups(&html), 4);
    }

    #[test]
    fn test_cash_on_delivery_has_no_inputs_visible() {
        let html = CheckoutFormTemplate::new(PaymentMethod::CashOnDelivery, Decimal::new(5, 0))
            .render()
            .unwrap();
        assert!(html.contains(r#"data-method="cash_on_delivery" class="payment-group">"#));
        assert_eq!(hidden_groups(&html), 4);
    }

    #[test]
    fn test_form_reads_only_selected_group() {
        let form = CheckoutForm {
            delivery_address: "12 Market Road".into(),
            method: Some(PaymentMethod::Upi),
            card_number: "garbage".into(),
            upi_id: "shopper@okbank".into(),
            ..CheckoutForm::default()
        };
        let request = form.to_request();
        assert_eq!(
            request.payment,
            PaymentDetails::Upi {
                upi_id: "shopper@okbank".into()
            }
        );
        let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert!(request.validate(today).is_ok());
    }

    #[test]
    fn test_refill_never_echoes_card_secrets() {
        let form = CheckoutForm {
            delivery_address: "12 Market Road".into(),
            method: Some(PaymentMethod::Card),
            card_number: "4111 1111 1111 1111".into(),
            card_holder: "A Shopper".into(),
            cvv: "123".into(),
            ..CheckoutForm::default()
        };
        let html = CheckoutFormTemplate::refill(&form, Decimal::ONE)
            .render()
            .unwrap();
        assert!(html.contains("12 Market Road"));
        assert!(html.contains("A Shopper"));
        assert!(!html.contains("4111"));
        assert!(!html.contains(r#"value="123""#));
    }

    #[test]
    fn test_confirmation_resets_badge() {
        let placed = CheckoutResponse {
            order_id: OrderId::new(42),
            total: Decimal::new(1645, 2),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
        };
        let html =
            OrderConfirmationTemplate::new(&placed, PaymentMethod::CashOnDelivery, " 12 Market Road ")
                .render()
                .unwrap();
        assert!(html.contains("#42"));
        assert!(html.contains("$16.45"));
        assert!(html.contains("Cash on Delivery"));
        assert!(html.contains(r#"<span id="cart-count" class="cart-count" hx-swap-oob="true">0</span>"#));
    }
}
