//! Sales reports. Cancelled orders never count.

use crate::errors::AppResult;
use crate::utils::date::DateRange;
use rusqlite::{Connection, params_from_iter};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    pub date: String,
    pub orders: i64,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    pub orders: i64,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub average_order: f64,
}

/// `AND DATE(o.created_at) BETWEEN ..` plus its arguments.
fn range_clause(range: Option<&DateRange>) -> (String, Vec<String>) {
    match range {
        Some(r) => (
            " AND DATE(o.created_at) BETWEEN ?1 AND ?2".to_string(),
            vec![r.start_str(), r.end_str()],
        ),
        None => (String::new(), Vec::new()),
    }
}

pub fn sales_summary(conn: &Connection, range: Option<&DateRange>) -> AppResult<f64> {
    let (clause, args) = range_clause(range);
    let sql = format!(
        "SELECT COALESCE(SUM(o.total), 0) FROM orders o WHERE o.status <> 'cancelled'{clause}"
    );
    Ok(conn.query_row(&sql, params_from_iter(args), |r| r.get(0))?)
}

pub fn category_sales(conn: &Connection, range: Option<&DateRange>) -> AppResult<Vec<CategorySales>> {
    let (clause, args) = range_clause(range);
    let sql = format!(
        "SELECT COALESCE(c.name, 'Uncategorized') AS category,
                SUM(oi.quantity * oi.price) AS total
         FROM order_items oi
         JOIN orders o ON oi.order_id = o.id
         LEFT JOIN products p ON oi.product_id = p.id
         LEFT JOIN categories c ON p.category_id = c.id
         WHERE o.status <> 'cancelled'{clause}
         GROUP BY category
         ORDER BY total DESC, category ASC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args), |r| {
        Ok(CategorySales {
            category: r.get(0)?,
            total: r.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Orders, revenue, cost and profit per day, oldest first.
pub fn daily(conn: &Connection, range: Option<&DateRange>) -> AppResult<Vec<DailyReport>> {
    let (clause, args) = range_clause(range);
    // revenue from the order totals, cost from current product costs
    let sql = format!(
        "SELECT DATE(o.created_at) AS day,
                COUNT(*) AS orders,
                COALESCE(SUM(o.total), 0) AS revenue,
                COALESCE(SUM((
                    SELECT SUM(oi.quantity * COALESCE(p.cost, 0))
                    FROM order_items oi
                    LEFT JOIN products p ON oi.product_id = p.id
                    WHERE oi.order_id = o.id
                )), 0) AS cost
         FROM orders o
         WHERE o.status <> 'cancelled'{clause}
         GROUP BY day
         ORDER BY day ASC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args), |r| {
        let revenue: f64 = r.get(2)?;
        let cost: f64 = r.get(3)?;
        Ok(DailyReport {
            date: r.get(0)?,
            orders: r.get(1)?,
            revenue,
            cost,
            profit: revenue - cost,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn overview(conn: &Connection, range: Option<&DateRange>) -> AppResult<Overview> {
    let days = daily(conn, range)?;

    let mut o = Overview::default();
    for d in &days {
        o.orders += d.orders;
        o.revenue += d.revenue;
        o.cost += d.cost;
    }
    o.profit = o.revenue - o.cost;
    if o.orders > 0 {
        o.average_order = o.revenue / o.orders as f64;
    }
    Ok(o)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::memory_pool;
    use crate::utils::date::parse_range;

    fn seed(conn: &Connection) {
        conn.execute_batch(
            "INSERT INTO categories (id, name) VALUES (1, 'Pizza'), (2, 'Drinks');
             INSERT INTO products (id, name, category_id, price, cost) VALUES
                (1, 'Margherita', 1, 800, 300),
                (2, 'Cola', 2, 150, 50),
                (3, 'Bread', NULL, 50, 0);
             INSERT INTO orders (id, total, status, created_at) VALUES
                (1, 1750, 'paid', '2025-01-10 12:00:00'),
                (2, 300, 'paid', '2025-01-10 19:00:00'),
                (3, 800, 'cancelled', '2025-01-11 12:00:00'),
                (4, 850, 'pending', '2025-02-01 12:00:00');
             INSERT INTO order_items (order_id, product_id, quantity, price) VALUES
                (1, 1, 2, 800), (1, 2, 1, 150),
                (2, 2, 2, 150),
                (3, 1, 1, 800),
                (4, 1, 1, 800), (4, 3, 1, 50);",
        )
        .unwrap();
    }

    #[test]
    fn summary_skips_cancelled_and_honours_range() {
        let pool = memory_pool();
        seed(&pool.conn);

        assert_eq!(sales_summary(&pool.conn, None).unwrap(), 2900.0);
        let jan = parse_range("2025-01").unwrap();
        assert_eq!(sales_summary(&pool.conn, Some(&jan)).unwrap(), 2050.0);
    }

    #[test]
    fn category_totals_use_line_prices() {
        let pool = memory_pool();
        seed(&pool.conn);

        let cats = category_sales(&pool.conn, None).unwrap();
        assert_eq!(
            cats,
            vec![
                CategorySales { category: "Pizza".into(), total: 2400.0 },
                CategorySales { category: "Drinks".into(), total: 450.0 },
                CategorySales { category: "Uncategorized".into(), total: 50.0 },
            ]
        );
    }

    #[test]
    fn daily_rows_carry_cost_and_profit() {
        let pool = memory_pool();
        seed(&pool.conn);

        let days = daily(&pool.conn, None).unwrap();
        assert_eq!(days.len(), 2);

        let d = &days[0];
        assert_eq!(d.date, "2025-01-10");
        assert_eq!(d.orders, 2);
        assert_eq!(d.revenue, 2050.0);
        // 2*300 + 1*50 + 2*50
        assert_eq!(d.cost, 750.0);
        assert_eq!(d.profit, 1300.0);
    }

    #[test]
    fn overview_totals_and_average() {
        let pool = memory_pool();
        seed(&pool.conn);

        let o = overview(&pool.conn, None).unwrap();
        assert_eq!(o.orders, 3);
        assert_eq!(o.revenue, 2900.0);
        assert_eq!(o.cost, 1050.0);
        assert_eq!(o.profit, 1850.0);
        assert!((o.average_order - 966.666).abs() < 0.01);

        let empty = overview(&pool.conn, Some(&parse_range("2030").unwrap())).unwrap();
        assert_eq!(empty, Overview::default());
    }
}
