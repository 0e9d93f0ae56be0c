//! Email rendering for booking notifications.
//!
//! Each message is rendered as multipart HTML + plain text. The admin
//! alert carries the full booking detail; the cart digest is a compact
//! internal summary; the user confirmation is the friendly one.

use crate::db::{CallSchedule, EventRequest, MarketplaceService};

/// A composed message ready for a transport.
#[derive(Debug, Clone)]
pub struct RenderedMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Group services by category, preserving the incoming (category-sorted)
/// order.
fn by_category(services: &[MarketplaceService]) -> Vec<(&str, Vec<&MarketplaceService>)> {
    let mut groups: Vec<(&str, Vec<&MarketplaceService>)> = Vec::new();
    for service in services {
        match groups.last_mut() {
            Some((category, members)) if *category == service.category => members.push(service),
            _ => groups.push((service.category.as_str(), vec![service])),
        }
    }
    groups
}

/// Admin alert: full booking detail plus the services-by-category
/// breakdown when the lookup succeeded.
pub fn admin_alert(
    request: &EventRequest,
    schedule: &CallSchedule,
    event_name: &str,
    breakdown: Option<&[MarketplaceService]>,
    base_url: &str,
) -> RenderedMessage {
    let subject = format!("New consultation call booked: {}", event_name);
    let package = request
        .selected_package
        .clone()
        .unwrap_or_else(|| "not selected".to_string());
    let contact = schedule
        .user_email
        .clone()
        .or_else(|| schedule.user_whatsapp.clone())
        .unwrap_or_else(|| "not provided".to_string());
    let request_url = format!("{}/admin/event-requests/{}", base_url, request.id);

    let breakdown_html = breakdown
        .map(|services| {
            let rows: String = by_category(services)
                .into_iter()
                .map(|(category, members)| {
                    let items: String = members
                        .iter()
                        .map(|s| {
                            format!(
                                "<li>{} ({})</li>",
                                html_escape(&s.name),
                                s.price
                            )
                        })
                        .collect();
                    format!(
                        "<p><strong>{}</strong></p><ul>{}</ul>",
                        html_escape(category),
                        items
                    )
                })
                .collect();
            format!("<h3>Selected services</h3>{}", rows)
        })
        .unwrap_or_default();

    let breakdown_text = breakdown
        .map(|services| {
            let mut out = String::from("\nSelected services:\n");
            for (category, members) in by_category(services) {
                out.push_str(&format!("  {}:\n", category));
                for s in members {
                    out.push_str(&format!("    - {} ({})\n", s.name, s.price));
                }
            }
            out
        })
        .unwrap_or_default();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; }}
        .container {{ max-width: 600px; margin: 0 auto; background-color: #ffffff; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        .header {{ background-color: #7c3aed; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 20px; }}
        .field {{ margin-bottom: 12px; }}
        .field-label {{ font-weight: bold; color: #666; }}
        .footer {{ padding: 15px; text-align: center; color: #888; font-size: 12px; border-top: 1px solid #eee; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header"><h1>New Consultation Call</h1></div>
        <div class="content">
            <div class="field"><span class="field-label">Event:</span> {event_name}</div>
            <div class="field"><span class="field-label">Location:</span> {location}</div>
            <div class="field"><span class="field-label">Date:</span> {date_time}</div>
            <div class="field"><span class="field-label">Budget:</span> {budget}</div>
            <div class="field"><span class="field-label">Guests:</span> {guest_count}</div>
            <div class="field"><span class="field-label">Package:</span> {package}</div>
            <div class="field"><span class="field-label">Call scheduled for:</span> {scheduled_time}</div>
            <div class="field"><span class="field-label">Customer contact:</span> {contact}</div>
            {breakdown}
            <p><a href="{request_url}">Open the request</a></p>
        </div>
        <div class="footer">Planora booking engine</div>
    </div>
</body>
</html>"#,
        event_name = html_escape(event_name),
        location = html_escape(&request.location),
        date_time = html_escape(&request.date_time),
        budget = request.budget,
        guest_count = request.guest_count,
        package = html_escape(&package),
        scheduled_time = html_escape(&schedule.scheduled_time),
        contact = html_escape(&contact),
        breakdown = breakdown_html,
        request_url = request_url,
    );

    let text = format!(
        "New consultation call booked\n\n\
         Event: {event_name}\n\
         Location: {location}\n\
         Date: {date_time}\n\
         Budget: {budget}\n\
         Guests: {guest_count}\n\
         Package: {package}\n\
         Call scheduled for: {scheduled_time}\n\
         Customer contact: {contact}\n\
         {breakdown}\n\
         Open the request: {request_url}\n",
        event_name = event_name,
        location = request.location,
        date_time = request.date_time,
        budget = request.budget,
        guest_count = request.guest_count,
        package = package,
        scheduled_time = schedule.scheduled_time,
        contact = contact,
        breakdown = breakdown_text,
        request_url = request_url,
    );

    RenderedMessage { subject, html, text }
}

/// Internal cart digest for the fixed desk recipient.
pub fn cart_digest(
    request: &EventRequest,
    breakdown: Option<&[MarketplaceService]>,
) -> RenderedMessage {
    let subject = format!("Cart digest for event request {}", request.id);

    let (summary_html, summary_text, total) = match breakdown {
        Some(services) if !services.is_empty() => {
            let total: i64 = services.iter().map(|s| s.price).sum();
            let rows: String = services
                .iter()
                .map(|s| {
                    format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                        html_escape(&s.name),
                        html_escape(&s.category),
                        s.price
                    )
                })
                .collect();
            let text: String = services
                .iter()
                .map(|s| format!("  - {} [{}] {}\n", s.name, s.category, s.price))
                .collect();
            (
                format!(
                    "<table border=\"1\" cellpadding=\"6\"><tr><th>Service</th><th>Category</th><th>Price</th></tr>{}</table>",
                    rows
                ),
                text,
                total,
            )
        }
        _ => (
            "<p>No marketplace services in the cart.</p>".to_string(),
            "  (no marketplace services in the cart)\n".to_string(),
            0,
        ),
    };

    let html = format!(
        r#"<html><body>
<h2>Cart digest</h2>
<p>Event request <strong>{id}</strong> ({location}, {guest_count} guests, budget {budget})</p>
{summary}
<p>Cart total: {total}</p>
</body></html>"#,
        id = html_escape(&request.id),
        location = html_escape(&request.location),
        guest_count = request.guest_count,
        budget = request.budget,
        summary = summary_html,
        total = total,
    );

    let text = format!(
        "Cart digest\n\nEvent request {} ({}, {} guests, budget {})\n{}\nCart total: {}\n",
        request.id, request.location, request.guest_count, request.budget, summary_text, total,
    );

    RenderedMessage { subject, html, text }
}

/// Confirmation for the customer who booked the call.
pub fn user_confirmation(
    request: &EventRequest,
    schedule: &CallSchedule,
    event_name: &str,
    base_url: &str,
) -> RenderedMessage {
    let subject = "Your consultation call is booked".to_string();
    let package = request
        .selected_package
        .clone()
        .unwrap_or_else(|| "to be discussed".to_string());

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; }}
        .container {{ max-width: 560px; margin: 0 auto; background-color: #ffffff; border-radius: 8px; padding: 24px; }}
        .highlight {{ background-color: #f3f4f6; border-radius: 6px; padding: 16px; margin: 16px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>You're booked!</h1>
        <p>Thanks for planning your {event_name} with us. Our planner will call you at the scheduled time below.</p>
        <div class="highlight">
            <p><strong>Call time:</strong> {scheduled_time}</p>
            <p><strong>Location:</strong> {location}</p>
            <p><strong>Package:</strong> {package}</p>
        </div>
        <p>Need to make changes? Visit <a href="{base_url}">{base_url}</a>.</p>
    </div>
</body>
</html>"#,
        event_name = html_escape(event_name),
        scheduled_time = html_escape(&schedule.scheduled_time),
        location = html_escape(&request.location),
        package = html_escape(&package),
        base_url = base_url,
    );

    let text = format!(
        "You're booked!\n\n\
         Thanks for planning your {} with us. Our planner will call you at the scheduled time below.\n\n\
         Call time: {}\n\
         Location: {}\n\
         Package: {}\n\n\
         Need to make changes? Visit {}\n",
        event_name, schedule.scheduled_time, request.location, package, base_url,
    );

    RenderedMessage { subject, html, text }
}

/// Escape HTML special characters
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
