use crate::cli::commands::open;
use crate::cli::parser::{IngredientFields, InventoryCmd};
use crate::config::Config;
use crate::core::auth;
use crate::db::log::audit_quiet;
use crate::db::{ingredients, products, settings};
use crate::errors::AppResult;
use crate::models::ingredient::IngredientPatch;
use crate::models::role::Area;
use crate::printing::receipt::money;
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors;
use crate::utils::table::{Column, Table};

impl From<&IngredientFields> for IngredientPatch {
    fn from(f: &IngredientFields) -> Self {
        IngredientPatch {
            name: f.name.clone(),
            quantity: f.quantity,
            unit: f.unit.clone(),
            min_quantity: f.min_quantity,
            cost: f.cost,
            product_id: f.product,
        }
    }
}

pub fn handle(cmd: &InventoryCmd, cfg: &Config) -> AppResult<()> {
    let pool = open(cfg)?;
    let conn = &pool.conn;
    auth::require(conn, cfg, Area::Inventory)?;
    settings::require_inventory(conn)?;

    match cmd {
        InventoryCmd::List { low } => {
            let list = if *low {
                ingredients::low_stock(conn)?
            } else {
                ingredients::all(conn)?
            };
            if list.is_empty() {
                info(if *low { "No ingredient is low on stock." } else { "No ingredients yet." });
                return Ok(());
            }

            let currency = settings::get(conn)?.currency_symbol;
            header("📦 Inventory");
            let mut t = Table::new(vec![
                Column::right("ID"),
                Column::left("Name"),
                Column::right("Quantity"),
                Column::left("Unit"),
                Column::right("Minimum"),
                Column::right("Cost"),
                Column::left("Product"),
            ]);
            for i in list {
                t.add_row(vec![
                    i.id.to_string(),
                    i.name,
                    colors::stock_level(i.quantity, i.min_quantity),
                    i.unit,
                    format!("{:.2}", i.min_quantity),
                    money(i.cost, &currency),
                    colors::or_dash(i.product_name.as_deref()),
                ]);
            }
            t.print();
        }
        InventoryCmd::Add { fields } => {
            if let Some(pid) = fields.product {
                products::get(conn, pid)?;
            }
            let id = ingredients::create(conn, &IngredientPatch::from(fields))?;
            let ing = ingredients::get(conn, id)?;
            audit_quiet(conn, "ingredient_add", &ing.name, &format!("Ingredient #{id} created"));
            success(format!("Ingredient '{}' added (id {id})", ing.name));
        }
        InventoryCmd::Update { id, fields } => {
            if let Some(pid) = fields.product {
                products::get(conn, pid)?;
            }
            let ing = ingredients::update(conn, *id, &IngredientPatch::from(fields))?;
            audit_quiet(conn, "ingredient_update", &ing.name, &format!("Ingredient #{id} updated"));
            success(format!("Ingredient '{}' updated", ing.name));
        }
        InventoryCmd::Adjust { id, delta } => {
            let ing = ingredients::adjust(conn, *id, *delta)?;
            audit_quiet(
                conn,
                "ingredient_update",
                &ing.name,
                &format!("Stock adjusted by {delta:+.2} to {:.2}", ing.quantity),
            );
            success(format!("{}: {:.2} {}", ing.name, ing.quantity, ing.unit));
            if ing.is_low() {
                warning(format!("{} is low on stock (minimum {:.2})", ing.name, ing.min_quantity));
            }
        }
        InventoryCmd::Delete { id } => {
            let ing = ingredients::get(conn, *id)?;
            ingredients::delete(conn, *id)?;
            audit_quiet(conn, "ingredient_delete", &ing.name, &format!("Ingredient #{id} deleted"));
            success(format!("Ingredient '{}' deleted", ing.name));
        }
    }
    Ok(())
}
