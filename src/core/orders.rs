//! Order lifecycle: submit a cart to a table, settle it, cancel it.

use crate::core::cart::Cart;
use crate::db::log::audit_quiet;
use crate::db::{ingredients, orders, settings, tables};
use crate::errors::{AppError, AppResult};
use crate::models::ingredient::Ingredient;
use crate::models::order::{Order, OrderItem, OrderStatus, PaymentType};
use crate::models::printer::Printer;
use crate::models::table::TableStatus;
use crate::printing::receipt::{Ticket, customer_receipt};
use crate::printing::{PrintOptions, print_ticket};
use rusqlite::Connection;

/// Outcome of [`OrderLogic::submit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub order_id: i64,
    pub table_number: i64,
    /// Ids of the lines written by this submission, to be routed to printers
    pub item_ids: Vec<i64>,
    /// True when lines were added to an order already open on the table
    pub appended: bool,
    pub total: f64,
}

/// Where a receipt goes.
pub enum ReceiptTarget<'a> {
    Printer(&'a Printer, PrintOptions),
    /// Rendered as text at the given width and returned to the caller
    Preview(usize),
}

#[derive(Debug, Clone)]
pub struct Settlement {
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Plain-text receipt when previewing
    pub preview: Option<String>,
}

pub struct OrderLogic;

impl OrderLogic {
    /// Send the cart to the kitchen for `table_number`.
    pub fn submit(
        conn: &mut Connection,
        table_number: i64,
        user_id: Option<i64>,
        cart: &Cart,
        payment: PaymentType,
    ) -> AppResult<Submission> {
        let table = tables::get_by_number(conn, table_number)?;
        if cart.is_empty() {
            return Err(AppError::EmptyCart);
        }
        let items = cart.to_items();

        let (order_id, item_ids, appended) = match orders::pending_for_table(conn, table.id)? {
            Some(open) => {
                let ids = orders::append(conn, open.id, &items)?;
                (open.id, ids, true)
            }
            None => {
                let (id, ids) = orders::create(conn, table.id, user_id, payment.as_str(), &items)?;
                (id, ids, false)
            }
        };

        let total = orders::get(conn, order_id)?.total;

        audit_quiet(
            conn,
            if appended { "order_append" } else { "order_add" },
            &format!("order #{order_id}"),
            &format!("Table {table_number}: {} line(s), total {total:.2}", items.len()),
        );

        Ok(Submission {
            order_id,
            table_number,
            item_ids,
            appended,
            total,
        })
    }

    /// Pending order of a table with its lines.
    pub fn pending_for_table(
        conn: &Connection,
        table_number: i64,
    ) -> AppResult<Option<(Order, Vec<OrderItem>)>> {
        let table = tables::get_by_number(conn, table_number)?;
        match orders::pending_for_table(conn, table.id)? {
            Some(order) => {
                let items = orders::items(conn, order.id)?;
                Ok(Some((order, items)))
            }
            None => Ok(None),
        }
    }

    /// Print the customer receipt for the latest order of the table, mark it
    /// paid and free the table. Nothing changes when printing fails.
    pub fn settle(
        conn: &Connection,
        table_number: i64,
        payment: Option<PaymentType>,
        target: ReceiptTarget,
    ) -> AppResult<Settlement> {
        let table = tables::get_by_number(conn, table_number)?;

        let order = match orders::pending_for_table(conn, table.id)? {
            Some(o) => o,
            None => orders::latest_for_table(conn, table.id)?
                .filter(|o| o.status != OrderStatus::Cancelled)
                .ok_or(AppError::NoOrderForTable(table_number))?,
        };

        let mut paid = order.clone();
        if let Some(p) = payment {
            paid.payment_type = p.as_str().to_string();
        }
        paid.status = OrderStatus::Paid;

        let items = orders::items(conn, order.id)?;
        let preview = Self::emit(conn, &paid, &items, target)?;

        let tx = conn.unchecked_transaction()?;
        orders::mark_paid(&tx, order.id, &paid.payment_type)?;
        tables::set_status(&tx, table.id, TableStatus::Free)?;
        tx.commit()?;
        audit_quiet(
            conn,
            "order_paid",
            &format!("order #{}", order.id),
            &format!("Table {table_number}: {:.2} ({})", paid.total, paid.payment_type),
        );

        Ok(Settlement {
            order: paid,
            items,
            preview,
        })
    }

    /// Reprint the receipt of any order.
    pub fn receipt(
        conn: &Connection,
        order_id: i64,
        target: ReceiptTarget,
    ) -> AppResult<Option<String>> {
        let order = orders::get(conn, order_id)?;
        let items = orders::items(conn, order_id)?;
        Self::emit(conn, &order, &items, target)
    }

    pub fn render_receipt(conn: &Connection, order: &Order, items: &[OrderItem]) -> AppResult<Ticket> {
        let s = settings::get(conn)?;
        Ok(customer_receipt(&s, order, items))
    }

    fn emit(
        conn: &Connection,
        order: &Order,
        items: &[OrderItem],
        target: ReceiptTarget,
    ) -> AppResult<Option<String>> {
        let ticket = Self::render_receipt(conn, order, items)?;
        match target {
            ReceiptTarget::Preview(width) => Ok(Some(ticket.to_plain(width))),
            ReceiptTarget::Printer(printer, opts) => {
                print_ticket(printer, &ticket, opts)?;
                Ok(None)
            }
        }
    }

    /// Cancel a pending order. The table is freed when nothing else is open on it.
    pub fn cancel(conn: &Connection, order_id: i64) -> AppResult<Order> {
        let order = orders::get(conn, order_id)?;
        if order.status != OrderStatus::Pending {
            return Err(AppError::Invalid(format!(
                "Order #{order_id} is {} and cannot be cancelled",
                order.status.to_db_str()
            )));
        }

        let tx = conn.unchecked_transaction()?;
        orders::set_status(&tx, order_id, OrderStatus::Cancelled)?;
        if let Some(table_id) = order.table_id
            && orders::count_pending_for_table(&tx, table_id)? == 0
        {
            tables::set_status(&tx, table_id, TableStatus::Free)?;
        }
        tx.commit()?;

        audit_quiet(conn, "order_cancel", &format!("order #{order_id}"), "Order cancelled");
        orders::get(conn, order_id)
    }

    /// Low-stock ingredients linked to the products of an order.
    pub fn low_stock_for_order(conn: &Connection, order_id: i64) -> AppResult<Vec<Ingredient>> {
        if !settings::is_inventory_enabled(conn)? {
            return Ok(Vec::new());
        }
        let products: Vec<i64> = orders::items(conn, order_id)?
            .iter()
            .map(|i| i.product_id)
            .collect();

        Ok(ingredients::low_stock(conn)?
            .into_iter()
            .filter(|i| i.product_id.is_some_and(|p| products.contains(&p)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cart::cart_from_specs;
    use crate::db::testing::memory_pool;

    fn seed(conn: &mut Connection) {
        conn.execute_batch(
            "INSERT INTO categories (id, name) VALUES (1, 'Pizza');
             INSERT INTO products (id, name, category_id, price, cost) VALUES
                (1, 'Margherita', 1, 800, 300), (2, 'Cola', NULL, 150, 50);",
        )
        .unwrap();
        tables::generate(conn, 3, false).unwrap();
    }

    fn cart(conn: &Connection, specs: &[&str]) -> Cart {
        let specs: Vec<String> = specs.iter().map(|s| s.to_string()).collect();
        cart_from_specs(conn, &specs).unwrap()
    }

    #[test]
    fn submit_creates_order_and_occupies_table() {
        let mut pool = memory_pool();
        seed(&mut pool.conn);
        let c = cart(&pool.conn, &["1x2", "2"]);

        let sub = OrderLogic::submit(&mut pool.conn, 2, None, &c, PaymentType::Cash).unwrap();
        assert!(!sub.appended);
        assert_eq!(sub.total, 1750.0);
        assert_eq!(sub.item_ids.len(), 2);

        let table = tables::get_by_number(&pool.conn, 2).unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
    }

    #[test]
    fn second_submit_appends_to_open_order() {
        let mut pool = memory_pool();
        seed(&mut pool.conn);

        let c = cart(&pool.conn, &["1"]);
        let first = OrderLogic::submit(&mut pool.conn, 1, None, &c, PaymentType::Cash).unwrap();
        let c = cart(&pool.conn, &["2x2"]);
        let second = OrderLogic::submit(&mut pool.conn, 1, None, &c, PaymentType::Cash).unwrap();

        assert!(second.appended);
        assert_eq!(second.order_id, first.order_id);
        assert_eq!(second.total, 1100.0);
        assert_eq!(second.item_ids.len(), 1);
    }

    #[test]
    fn submit_validates_table_and_cart() {
        let mut pool = memory_pool();
        seed(&mut pool.conn);

        let c = cart(&pool.conn, &["1"]);
        assert!(matches!(
            OrderLogic::submit(&mut pool.conn, 9, None, &c, PaymentType::Cash),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            OrderLogic::submit(&mut pool.conn, 1, None, &Cart::new(), PaymentType::Cash),
            Err(AppError::EmptyCart)
        ));
    }

    #[test]
    fn settle_with_preview_marks_paid_and_frees_table() {
        let mut pool = memory_pool();
        seed(&mut pool.conn);
        let c = cart(&pool.conn, &["1"]);
        let sub = OrderLogic::submit(&mut pool.conn, 3, None, &c, PaymentType::Cash).unwrap();

        let st = OrderLogic::settle(&pool.conn, 3, Some(PaymentType::Card), ReceiptTarget::Preview(32)).unwrap();
        assert_eq!(st.order.id, sub.order_id);
        assert!(st.preview.unwrap().contains("Margherita x1"));

        let order = orders::get(&pool.conn, sub.order_id).unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.payment_type, "card");
        assert_eq!(tables::get_by_number(&pool.conn, 3).unwrap().status, TableStatus::Free);
    }

    #[test]
    fn receipt_total_matches_stored_total_when_vat_is_set() {
        let mut pool = memory_pool();
        seed(&mut pool.conn);
        settings::update(
            &pool.conn,
            &crate::models::settings::SettingsPatch {
                vat_percentage: Some(19.0),
                ..Default::default()
            },
        )
        .unwrap();
        let c = cart(&pool.conn, &["1"]);
        let sub = OrderLogic::submit(&mut pool.conn, 2, None, &c, PaymentType::Cash).unwrap();

        let st = OrderLogic::settle(&pool.conn, 2, None, ReceiptTarget::Preview(40)).unwrap();
        let stored = orders::get(&pool.conn, sub.order_id).unwrap().total;
        assert_eq!(stored, 800.0);

        let text = st.preview.unwrap();
        let total_line = text.lines().find(|l| l.contains("TOTAL:")).unwrap();
        assert!(total_line.contains(&format!("{stored:.2}")));
        assert!(text.contains("incl. VAT 19%:"));
        assert!(!text.contains("952.00"));
    }

    #[test]
    fn settle_without_any_order_fails() {
        let mut pool = memory_pool();
        seed(&mut pool.conn);
        assert!(matches!(
            OrderLogic::settle(&pool.conn, 1, None, ReceiptTarget::Preview(32)),
            Err(AppError::NoOrderForTable(1))
        ));
    }

    #[test]
    fn cancel_frees_the_table() {
        let mut pool = memory_pool();
        seed(&mut pool.conn);
        let c = cart(&pool.conn, &["2"]);
        let sub = OrderLogic::submit(&mut pool.conn, 1, None, &c, PaymentType::Cash).unwrap();

        let o = OrderLogic::cancel(&pool.conn, sub.order_id).unwrap();
        assert_eq!(o.status, OrderStatus::Cancelled);
        assert_eq!(tables::get_by_number(&pool.conn, 1).unwrap().status, TableStatus::Free);
        assert!(OrderLogic::cancel(&pool.conn, sub.order_id).is_err());
    }
}
