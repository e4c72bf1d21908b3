//! Receipt and kitchen ticket layout.
//!
//! A [`Ticket`] is a device-independent list of lines; it is turned into
//! ESC/POS bytes for a printer or into plain text for `--preview`.

use crate::models::order::{Order, OrderItem};
use crate::models::settings::Settings;
use crate::printing::escpos::{EscPosBuilder, pad_lr};

#[derive(Debug, Clone, PartialEq)]
pub enum TicketLine {
    /// Centered, bold and double size
    Title(String),
    /// Centered plain text
    Centered(String),
    Text(String),
    LeftRight(String, String),
    /// Bold left/right line
    Emphasis(String, String),
    Separator,
    Blank,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ticket {
    pub lines: Vec<TicketLine>,
    /// Pulse the cash drawer after printing
    pub open_drawer: bool,
}

impl Ticket {
    fn push(&mut self, line: TicketLine) {
        self.lines.push(line);
    }

    pub fn to_escpos(&self, width: usize) -> Vec<u8> {
        let mut b = EscPosBuilder::new(width);

        for line in &self.lines {
            match line {
                TicketLine::Title(s) => {
                    b.center().bold().double_size().line(s).reset_size().bold_off().left();
                }
                TicketLine::Centered(s) => {
                    b.center().line(s).left();
                }
                TicketLine::Text(s) => {
                    b.line(s);
                }
                TicketLine::LeftRight(l, r) => {
                    b.line_lr(l, r);
                }
                TicketLine::Emphasis(l, r) => {
                    b.bold().line_lr(l, r).bold_off();
                }
                TicketLine::Separator => {
                    b.sep_single();
                }
                TicketLine::Blank => {
                    b.newline();
                }
            }
        }

        if self.open_drawer {
            b.open_drawer();
        }
        b.cut_feed(4);
        b.into_bytes()
    }

    pub fn to_plain(&self, width: usize) -> String {
        let mut out = String::new();
        for line in &self.lines {
            let text = match line {
                TicketLine::Title(s) | TicketLine::Centered(s) => center(s, width),
                TicketLine::Text(s) => s.clone(),
                TicketLine::LeftRight(l, r) | TicketLine::Emphasis(l, r) => pad_lr(l, r, width),
                TicketLine::Separator => "-".repeat(width),
                TicketLine::Blank => String::new(),
            };
            out.push_str(text.trim_end());
            out.push('\n');
        }
        out
    }
}

fn center(s: &str, width: usize) -> String {
    let w = unicode_width::UnicodeWidthStr::width(s);
    if w >= width {
        s.to_string()
    } else {
        format!("{}{s}", " ".repeat((width - w) / 2))
    }
}

pub fn money(amount: f64, currency: &str) -> String {
    format!("{amount:.2} {currency}")
}

/// Customer receipt for a whole order.
pub fn customer_receipt(
    settings: &Settings,
    order: &Order,
    items: &[OrderItem],
) -> Ticket {
    let cur = settings.currency_symbol.as_str();
    let mut t = Ticket::default();

    t.push(TicketLine::Title(settings.restaurant_name.clone()));
    for extra in [&settings.address, &settings.phone] {
        if !extra.trim().is_empty() {
            t.push(TicketLine::Centered(extra.clone()));
        }
    }
    t.push(TicketLine::Blank);

    if let Some(n) = order.table_number {
        t.push(TicketLine::Centered(format!("*** Table {n} ***")));
    }
    t.push(TicketLine::Text(format!("Order #{}", order.id)));
    t.push(TicketLine::Text(format!("Date: {}", order.created_at)));
    if let Some(user) = &order.username {
        t.push(TicketLine::Text(format!("Served by: {user}")));
    }
    t.push(TicketLine::Separator);

    for item in items {
        t.push(TicketLine::LeftRight(
            format!("{} x{}", item.product_name, item.quantity),
            money(item.line_total(), cur),
        ));
    }
    t.push(TicketLine::Separator);

    // menu prices include VAT; the receipt only breaks out its share
    let vat = settings.vat_percentage;
    if vat > 0.0 {
        let tax = order.total * vat / (100.0 + vat);
        t.push(TicketLine::LeftRight("Net:".into(), money(order.total - tax, cur)));
        t.push(TicketLine::LeftRight(format!("incl. VAT {vat}%:"), money(tax, cur)));
    }
    t.push(TicketLine::Emphasis("TOTAL:".into(), money(order.total, cur)));

    if !order.payment_type.is_empty() {
        t.push(TicketLine::Text(format!("Payment: {}", order.payment_type)));
    }
    t.push(TicketLine::Blank);
    t.push(TicketLine::Centered("*** THANK YOU ***".into()));

    t.open_drawer = order.payment_type.eq_ignore_ascii_case("cash");
    t
}

/// Kitchen ticket for the lines of one category.
pub fn kitchen_ticket(
    category: &str,
    order_id: i64,
    table_number: Option<i64>,
    time: &str,
    items: &[OrderItem],
) -> Ticket {
    let mut t = Ticket::default();

    t.push(TicketLine::Title(category.to_uppercase()));
    let table = table_number
        .map(|n| format!("Table {n}"))
        .unwrap_or_else(|| "Takeaway".to_string());
    t.push(TicketLine::LeftRight(table, format!("Order #{order_id}")));
    t.push(TicketLine::Text(time.to_string()));
    t.push(TicketLine::Separator);
    for item in items {
        t.push(TicketLine::Text(format!("{} x{}", item.product_name, item.quantity)));
    }
    t.push(TicketLine::Separator);
    t
}

/// Page printed by `printer test`.
pub fn test_page(printer_name: &str, settings: &Settings, time: &str) -> Ticket {
    let mut t = Ticket::default();
    t.push(TicketLine::Title("TEST PRINT".into()));
    t.push(TicketLine::Centered(settings.restaurant_name.clone()));
    t.push(TicketLine::Separator);
    t.push(TicketLine::LeftRight("Printer:".into(), printer_name.to_string()));
    t.push(TicketLine::LeftRight("Time:".into(), time.to_string()));
    t.push(TicketLine::Separator);
    t.push(TicketLine::Centered("If you can read this, printing works.".into()));
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderStatus;

    fn order(payment: &str) -> Order {
        Order {
            id: 12,
            table_id: Some(3),
            table_number: Some(3),
            user_id: None,
            username: Some("sara".into()),
            total: 1750.0,
            payment_type: payment.into(),
            status: OrderStatus::Pending,
            created_at: "2025-03-01 20:15:00".into(),
        }
    }

    fn item(name: &str, qty: i64, price: f64) -> OrderItem {
        OrderItem {
            id: 1,
            order_id: 12,
            product_id: 1,
            product_name: name.into(),
            category_name: Some("Pizza".into()),
            quantity: qty,
            price,
        }
    }

    #[test]
    fn receipt_lists_items_and_total() {
        let s = Settings::default();
        let t = customer_receipt(&s, &order("cash"), &[item("Margherita", 2, 800.0), item("Cola", 1, 150.0)]);
        let text = t.to_plain(32);

        assert!(text.contains("*** Table 3 ***"));
        assert!(text.contains("Order #12"));
        assert!(text.contains("Margherita x2"));
        assert!(text.contains("1600.00 DZD"));
        assert!(text.contains("TOTAL:"));
        assert!(text.contains("1750.00 DZD"));
        assert!(text.contains("*** THANK YOU ***"));
        assert!(!text.contains("VAT"));
        assert!(t.open_drawer);
    }

    #[test]
    fn vat_is_shown_as_included_share_of_the_total() {
        let s = Settings {
            vat_percentage: 10.0,
            ..Settings::default()
        };
        let mut o = order("card");
        o.total = 110.0;
        let text = customer_receipt(&s, &o, &[item("Tea", 1, 110.0)]).to_plain(40);

        assert!(text.contains("Net:"));
        assert!(text.contains("100.00 DZD"));
        assert!(text.contains("incl. VAT 10%:"));
        assert!(text.contains("10.00 DZD"));
        let total_line = text.lines().find(|l| l.contains("TOTAL:")).unwrap();
        assert!(total_line.contains("110.00 DZD"));
    }

    #[test]
    fn kitchen_ticket_shows_category_and_lines() {
        let t = kitchen_ticket("Pizza", 7, Some(4), "20:15", &[item("Margherita", 2, 800.0)]);
        let text = t.to_plain(32);
        assert!(text.contains("PIZZA"));
        assert!(text.contains("Table 4"));
        assert!(text.contains("Order #7"));
        assert!(text.contains("Margherita x2"));
        assert!(!text.contains("800"));
    }

    #[test]
    fn escpos_output_ends_with_feed_cut() {
        let bytes = kitchen_ticket("Bar", 1, None, "now", &[]).to_escpos(32);
        assert_eq!(&bytes[bytes.len() - 4..], &[0x1D, 0x56, 0x42, 4]);
    }
}
