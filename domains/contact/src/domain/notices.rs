//! Order notification rendering

use rust_decimal::Decimal;

use planmart_email::content::{escape_html, notification_html};
use planmart_email::InboxNotice;

use crate::domain::entities::{Order, OrderItem, PostalAddress};

/// `email_type` recorded on order notifications
pub const ORDER_NOTICE_KIND: &str = "order_notification";

pub fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// Human label for a checkout payment method key
pub fn payment_method_label(method: &str) -> String {
    match method.trim().to_lowercase().as_str() {
        "transfer" | "bank_transfer" => "Bank transfer".to_string(),
        "cash" | "cash_on_delivery" => "Cash on delivery".to_string(),
        "nequi" => "Nequi".to_string(),
        _ => method.trim().to_string(),
    }
}

fn shipping_cost_label(cost: Decimal) -> String {
    if cost.is_zero() {
        "Subject to carrier".to_string()
    } else {
        format_amount(cost)
    }
}

fn item_kind(item: &OrderItem) -> &'static str {
    if item.is_digital() {
        "digital"
    } else {
        "physical"
    }
}

fn address_text(address: &PostalAddress) -> String {
    format!(
        "{}\n{}\n{}\n{}, {}{}\n{}",
        address.full_name(),
        address.email,
        address.phone,
        address.street,
        address.city,
        address
            .postal_code
            .as_deref()
            .map(|code| format!(" {}", code))
            .unwrap_or_default(),
        address.country
    )
}

fn address_html(heading: &str, address: &PostalAddress) -> String {
    format!(
        r#"
                    <div style="background-color: #f1f5f9; padding: 20px; border-radius: 8px; margin: 20px 0;">
                        <h3 style="margin-top: 0;">{heading}</h3>
                        <p>{lines}</p>
                    </div>"#,
        heading = escape_html(heading),
        lines = escape_html(&address_text(address)).replace('\n', "<br>"),
    )
}

/// Plain-text order summary
pub fn order_text(order: &Order, shipping: &PostalAddress) -> String {
    let mut text = format!(
        "New order #{} placed {}\n\nItems:\n",
        order.id,
        order.placed_at.format("%Y-%m-%d %H:%M UTC")
    );
    for item in &order.items {
        text.push_str(&format!(
            "- {} x{} @ {} = {} ({})\n",
            item.name,
            item.quantity,
            format_amount(item.unit_price),
            format_amount(item.line_total()),
            item_kind(item)
        ));
    }
    text.push_str(&format!(
        "\nSubtotal: {}\nShipping: {}\nTotal: {}\n\nPayment: {}\n\nBilling:\n{}\n\nShip to:\n{}\n",
        format_amount(order.subtotal),
        shipping_cost_label(order.shipping_cost),
        format_amount(order.total),
        payment_method_label(&order.payment_method),
        address_text(&order.billing),
        address_text(shipping),
    ));
    if let Some(notes) = order.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        text.push_str(&format!("\nNotes:\n{}\n", notes));
    }
    text
}

/// Styled HTML order summary
pub fn order_html(order: &Order, shipping: &PostalAddress) -> String {
    let rows: String = order
        .items
        .iter()
        .map(|item| {
            format!(
                r#"
                            <tr>
                                <td style="padding: 12px;">{name}<br><small style="color: #6b7280;">{category} &middot; {kind}</small></td>
                                <td style="padding: 12px; text-align: center;">{quantity}</td>
                                <td style="padding: 12px; text-align: right;">{unit}</td>
                                <td style="padding: 12px; text-align: right;">{line}</td>
                            </tr>"#,
                name = escape_html(&item.name),
                category = escape_html(item.category.as_deref().unwrap_or("Product")),
                kind = item_kind(item),
                quantity = item.quantity,
                unit = format_amount(item.unit_price),
                line = format_amount(item.line_total()),
            )
        })
        .collect();

    let notes = order
        .notes
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(|notes| {
            format!(
                r#"
                    <div style="background-color: #fef3c7; padding: 20px; border-left: 4px solid #f59e0b; margin: 20px 0;">
                        <h3 style="margin-top: 0;">Notes</h3>
                        <p style="white-space: pre-wrap;">{}</p>
                    </div>"#,
                escape_html(notes)
            )
        })
        .unwrap_or_default();

    let sections = format!(
        r#"
                    <table style="width: 100%; border-collapse: collapse; border: 1px solid #e5e7eb;">
                        <thead>
                            <tr><th>Item</th><th>Qty</th><th>Unit price</th><th>Line total</th></tr>
                        </thead>
                        <tbody>{rows}
                        </tbody>
                    </table>
                    <div style="padding: 20px; margin: 20px 0;">
                        <p><strong>Subtotal:</strong> {subtotal}</p>
                        <p><strong>Shipping:</strong> {shipping_cost}</p>
                        <p><strong>Total:</strong> {total}</p>
                        <p><strong>Payment:</strong> {payment}</p>
                    </div>{billing}{ship_to}{notes}"#,
        rows = rows,
        subtotal = format_amount(order.subtotal),
        shipping_cost = escape_html(&shipping_cost_label(order.shipping_cost)),
        total = format_amount(order.total),
        payment = escape_html(&payment_method_label(&order.payment_method)),
        billing = address_html("Billing", &order.billing),
        ship_to = address_html("Ship to", shipping),
        notes = notes,
    );

    notification_html(
        &format!("New order #{}", order.id),
        &sections,
        &format!(
            "Order placed {}. Contact the customer to confirm payment and delivery.",
            order.placed_at.format("%Y-%m-%d %H:%M UTC")
        ),
    )
}

/// Build the inbox notice for an order
pub fn order_notice(order: &Order, shipping: &PostalAddress) -> InboxNotice {
    InboxNotice {
        kind: ORDER_NOTICE_KIND,
        subject: format!("New order #{} - {}", order.id, order.billing.full_name()),
        body_text: order_text(order, shipping),
        body_html: order_html(order, shipping),
        reply_to: Some(order.billing.email.clone()),
    }
}
