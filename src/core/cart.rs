//! In-memory order entry cart.

use crate::db::orders::NewItem;
use crate::db::products;
use crate::errors::{AppError, AppResult};
use crate::models::product::Product;
use rusqlite::Connection;

pub const MAX_QTY: i64 = 999;

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub cost: f64,
    pub qty: i64,
}

impl CartLine {
    pub fn total(&self) -> f64 {
        self.price * self.qty as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `product`, merging with an existing line.
    pub fn add(&mut self, product: &Product) -> AppResult<()> {
        self.add_qty(product, 1)
    }

    /// Add `qty` units; a merged line may not exceed the per-line maximum.
    pub fn add_qty(&mut self, product: &Product, qty: i64) -> AppResult<()> {
        let existing = self
            .lines
            .iter()
            .position(|l| l.product_id == product.id);
        let merged = existing.map_or(0, |i| self.lines[i].qty) + qty;
        if !(1..=MAX_QTY).contains(&merged) {
            return Err(AppError::Invalid(format!(
                "Quantity of '{}' must be between 1 and {MAX_QTY} (got {merged})",
                product.name
            )));
        }

        match existing {
            Some(i) => self.lines[i].qty = merged,
            None => self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                cost: product.cost,
                qty: merged,
            }),
        }
        Ok(())
    }

    /// `+`/`-` buttons: a line reaching zero is removed.
    pub fn change_qty(&mut self, idx: usize, delta: i64) -> AppResult<()> {
        let line = self
            .lines
            .get_mut(idx)
            .ok_or_else(|| AppError::NotFound(format!("Cart line {}", idx + 1)))?;

        line.qty += delta;
        if line.qty <= 0 {
            self.lines.remove(idx);
        } else if line.qty > MAX_QTY {
            line.qty = MAX_QTY;
        }
        Ok(())
    }

    pub fn set_qty(&mut self, idx: usize, qty: i64) -> AppResult<()> {
        if !(1..=MAX_QTY).contains(&qty) {
            return Err(AppError::Invalid(format!("Quantity must be between 1 and {MAX_QTY}")));
        }
        let line = self
            .lines
            .get_mut(idx)
            .ok_or_else(|| AppError::NotFound(format!("Cart line {}", idx + 1)))?;
        line.qty = qty;
        Ok(())
    }

    pub fn remove(&mut self, idx: usize) -> AppResult<CartLine> {
        if idx >= self.lines.len() {
            return Err(AppError::NotFound(format!("Cart line {}", idx + 1)));
        }
        Ok(self.lines.remove(idx))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::total).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.lines.iter().map(|l| l.cost * l.qty as f64).sum()
    }

    /// Profit, only when at least one line has a known cost.
    pub fn profit(&self) -> Option<f64> {
        self.lines
            .iter()
            .any(|l| l.cost > 0.0)
            .then(|| self.total() - self.total_cost())
    }

    pub fn to_items(&self) -> Vec<NewItem> {
        self.lines
            .iter()
            .map(|l| NewItem {
                product_id: l.product_id,
                quantity: l.qty,
                price: l.price,
            })
            .collect()
    }
}

/// Parse an item spec `PRODUCT_ID[xQTY]`, e.g. `7` or `5x2`.
pub fn parse_item_spec(spec: &str) -> AppResult<(i64, i64)> {
    let bad = || AppError::InvalidItem(spec.to_string());
    let s = spec.trim().to_lowercase();

    let (id, qty) = match s.split_once(['x', '*']) {
        Some((id, qty)) => (id.trim(), qty.trim()),
        None => (s.as_str(), "1"),
    };

    let id: i64 = id.parse().map_err(|_| bad())?;
    let qty: i64 = qty.parse().map_err(|_| bad())?;
    if id < 1 || !(1..=MAX_QTY).contains(&qty) {
        return Err(bad());
    }
    Ok((id, qty))
}

/// Build a cart from item specs, loading prices from the catalog.
/// Unavailable products are refused.
pub fn cart_from_specs(conn: &Connection, specs: &[String]) -> AppResult<Cart> {
    let mut cart = Cart::new();
    for spec in specs {
        let (id, qty) = parse_item_spec(spec)?;
        let product = products::get(conn, id)?;
        if !product.is_available() {
            return Err(AppError::Invalid(format!(
                "Product '{}' is currently unavailable",
                product.name
            )));
        }
        cart.add_qty(&product, qty)?;
    }
    Ok(cart)
}
