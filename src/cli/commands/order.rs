use crate::cli::commands::open;
use crate::cli::parser::OrderCmd;
use crate::config::Config;
use crate::core::auth;
use crate::core::cart::cart_from_specs;
use crate::core::orders::{OrderLogic, ReceiptTarget};
use crate::core::routing::spawn_dispatch;
use crate::db::orders::{self, OrderFilter};
use crate::db::settings;
use crate::errors::{AppError, AppResult};
use crate::models::order::{Order, OrderItem};
use crate::models::role::Area;
use crate::printing::receipt::money;
use crate::printing::{PrintOptions, receipt_printer};
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors;
use crate::utils::date::parse_optional_range;
use crate::utils::table::{Column, Table};
use rusqlite::Connection;

pub fn handle(cmd: &OrderCmd, cfg: &Config) -> AppResult<()> {
    let mut pool = open(cfg)?;
    let opts = PrintOptions::from_config(cfg);

    match cmd {
        OrderCmd::Add {
            table,
            items,
            payment,
        } => {
            let user = auth::require(&pool.conn, cfg, Area::Pos)?;
            let cart = cart_from_specs(&pool.conn, items)?;
            let currency = settings::get(&pool.conn)?.currency_symbol;

            let sub = OrderLogic::submit(&mut pool.conn, *table, Some(user.id), &cart, *payment)?;
            if sub.appended {
                success(format!(
                    "Added {} line(s) to order #{} on table {} (total {})",
                    sub.item_ids.len(),
                    sub.order_id,
                    sub.table_number,
                    money(sub.total, &currency)
                ));
            } else {
                success(format!(
                    "Order #{} sent for table {} (total {})",
                    sub.order_id,
                    sub.table_number,
                    money(sub.total, &currency)
                ));
            }
            if let Some(profit) = cart.profit() {
                info(format!("Estimated profit: {}", money(profit, &currency)));
            }

            // kitchen tickets; joined so the process does not exit before they are sent
            let worker = spawn_dispatch(cfg.database.clone(), sub.order_id, sub.item_ids.clone(), opts);
            let report = worker.join().unwrap_or_default();
            if report.sent > 0 {
                info(format!("{} kitchen ticket(s) printed", report.sent));
            }
            if report.failed > 0 {
                warning(format!(
                    "{} kitchen ticket(s) could not be printed (see `fastpos log --print`)",
                    report.failed
                ));
            }

            if cfg.low_stock_warning {
                for ing in OrderLogic::low_stock_for_order(&pool.conn, sub.order_id)? {
                    warning(format!(
                        "Low stock: {} ({:.2} {} left, minimum {:.2})",
                        ing.name, ing.quantity, ing.unit, ing.min_quantity
                    ));
                }
            }
        }
        OrderCmd::Show { table } => {
            auth::require(&pool.conn, cfg, Area::Pos)?;
            match OrderLogic::pending_for_table(&pool.conn, *table)? {
                Some((order, items)) => print_order(&pool.conn, &order, &items)?,
                None => info(format!("Table {table} has no pending order.")),
            }
        }
        OrderCmd::Pay {
            table,
            payment,
            preview,
        } => {
            auth::require(&pool.conn, cfg, Area::Pos)?;
            let currency = settings::get(&pool.conn)?.currency_symbol;

            let settled = if *preview {
                OrderLogic::settle(&pool.conn, *table, *payment, ReceiptTarget::Preview(opts.width))?
            } else {
                let printer = receipt_printer(&pool.conn, cfg)?;
                OrderLogic::settle(&pool.conn, *table, *payment, ReceiptTarget::Printer(&printer, opts))?
            };

            if let Some(text) = &settled.preview {
                println!("{text}");
            }
            success(format!(
                "Order #{} paid ({}, {}); table {table} is free",
                settled.order.id,
                money(settled.order.total, &currency),
                settled.order.payment_type
            ));
        }
        OrderCmd::Receipt { id, preview } => {
            auth::require(&pool.conn, cfg, Area::Pos)?;
            if *preview {
                if let Some(text) = OrderLogic::receipt(&pool.conn, *id, ReceiptTarget::Preview(opts.width))? {
                    println!("{text}");
                }
            } else {
                let printer = receipt_printer(&pool.conn, cfg)?;
                OrderLogic::receipt(&pool.conn, *id, ReceiptTarget::Printer(&printer, opts))?;
                success(format!("Receipt for order #{id} sent to '{}'", printer.name));
            }
        }
        OrderCmd::Cancel { id } => {
            auth::require(&pool.conn, cfg, Area::Pos)?;
            let order = OrderLogic::cancel(&pool.conn, *id)?;
            success(format!("Order #{} cancelled", order.id));
        }
        OrderCmd::List {
            range,
            payment,
            status,
        } => {
            auth::require(&pool.conn, cfg, Area::Kitchen)?;
            let filter = OrderFilter {
                range: parse_optional_range(range.as_deref())?,
                payment_type: payment.clone(),
                status: status.map(Into::into),
            };
            let list = orders::filter(&pool.conn, &filter)?;
            if list.is_empty() {
                info("No orders found.");
                return Ok(());
            }

            let currency = settings::get(&pool.conn)?.currency_symbol;
            header("🧾 Orders");
            let mut t = Table::new(vec![
                Column::right("ID"),
                Column::left("Date"),
                Column::right("Table"),
                Column::left("User"),
                Column::left("Payment"),
                Column::left("Status"),
                Column::right("Total"),
            ]);
            for o in list {
                t.add_row(vec![
                    o.id.to_string(),
                    o.created_at,
                    o.table_number.map(|n| n.to_string()).unwrap_or_else(|| "-".into()),
                    colors::or_dash(o.username.as_deref()),
                    o.payment_type,
                    colors::order_status(o.status),
                    money(o.total, &currency),
                ]);
            }
            t.print();
        }
        OrderCmd::Items { id } => {
            auth::require(&pool.conn, cfg, Area::Kitchen)?;
            let order = orders::get(&pool.conn, *id)?;
            let items = orders::items(&pool.conn, *id)?;
            print_order(&pool.conn, &order, &items)?;
        }
        OrderCmd::Stats { days } => {
            auth::require(&pool.conn, cfg, Area::Reports)?;
            if *days == 0 {
                return Err(AppError::Invalid("--days must be at least 1".into()));
            }
            let currency = settings::get(&pool.conn)?.currency_symbol;
            let rows = orders::daily_revenue(&pool.conn, *days)?;
            if rows.is_empty() {
                info("No sales yet.");
                return Ok(());
            }

            header(format!("📈 Revenue, last {} active day(s)", rows.len()));
            let mut t = Table::new(vec![Column::left("Day"), Column::right("Revenue")]);
            for r in rows {
                t.add_row(vec![r.day, money(r.revenue, &currency)]);
            }
            t.print();
        }
    }
    Ok(())
}

fn print_order(conn: &Connection, order: &Order, items: &[OrderItem]) -> AppResult<()> {
    let currency = settings::get(conn)?.currency_symbol;
    let table = order
        .table_number
        .map(|n| format!("table {n}"))
        .unwrap_or_else(|| "no table".into());

    header(format!("🧾 Order #{} ({table})", order.id));
    println!(
        "Status: {}   Created: {}   Payment: {}",
        colors::order_status(order.status),
        order.created_at,
        order.payment_type
    );

    let mut t = Table::new(vec![
        Column::left("Product"),
        Column::left("Category"),
        Column::right("Qty"),
        Column::right("Price"),
        Column::right("Amount"),
    ]);
    for item in items {
        t.add_row(vec![
            item.product_name.clone(),
            colors::or_dash(item.category_name.as_deref()),
            item.quantity.to_string(),
            money(item.price, &currency),
            money(item.line_total(), &currency),
        ]);
    }
    t.print();
    println!("TOTAL: {}", money(order.total, &currency));
    Ok(())
}
