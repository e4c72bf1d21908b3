use crate::cli::commands::open;
use crate::cli::parser::ReportCmd;
use crate::config::Config;
use crate::core::{auth, reports};
use crate::db::settings;
use crate::errors::AppResult;
use crate::models::role::Area;
use crate::printing::receipt::money;
use crate::ui::messages::{header, info};
use crate::utils::date::{DateRange, parse_optional_range};
use crate::utils::table::{Column, Table};

fn period(range: Option<&DateRange>) -> String {
    range.map(DateRange::label).unwrap_or_else(|| "all dates".into())
}

pub fn handle(cmd: &ReportCmd, cfg: &Config) -> AppResult<()> {
    let pool = open(cfg)?;
    let conn = &pool.conn;
    auth::require(conn, cfg, Area::Reports)?;
    let cur = settings::get(conn)?.currency_symbol;

    match cmd {
        ReportCmd::Summary { range } => {
            let range = parse_optional_range(range.as_deref())?;
            let o = reports::overview(conn, range.as_ref())?;

            header(format!("📊 Sales summary ({})", period(range.as_ref())));
            println!("{:<16} {}", "Orders:", o.orders);
            println!("{:<16} {}", "Revenue:", money(o.revenue, &cur));
            println!("{:<16} {}", "Cost:", money(o.cost, &cur));
            println!("{:<16} {}", "Profit:", money(o.profit, &cur));
            println!("{:<16} {}", "Average order:", money(o.average_order, &cur));
        }
        ReportCmd::Daily { range } => {
            let range = parse_optional_range(range.as_deref())?;
            let rows = reports::daily(conn, range.as_ref())?;
            if rows.is_empty() {
                info("No sales in this period.");
                return Ok(());
            }

            header(format!("📅 Daily sales ({})", period(range.as_ref())));
            let mut t = Table::new(vec![
                Column::left("Date"),
                Column::right("Orders"),
                Column::right("Revenue"),
                Column::right("Cost"),
                Column::right("Profit"),
            ]);
            for r in rows {
                t.add_row(vec![
                    r.date,
                    r.orders.to_string(),
                    money(r.revenue, &cur),
                    money(r.cost, &cur),
                    money(r.profit, &cur),
                ]);
            }
            t.print();
        }
        ReportCmd::Categories { range } => {
            let range = parse_optional_range(range.as_deref())?;
            let rows = reports::category_sales(conn, range.as_ref())?;
            if rows.is_empty() {
                info("No sales in this period.");
                return Ok(());
            }

            header(format!("🗂  Sales by category ({})", period(range.as_ref())));
            let mut t = Table::new(vec![Column::left("Category"), Column::right("Total")]);
            for r in rows {
                t.add_row(vec![r.category, money(r.total, &cur)]);
            }
            t.print();
        }
    }
    Ok(())
}
