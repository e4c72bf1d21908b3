use crate::cli::commands::open;
use crate::cli::parser::{ProductCmd, ProductFields};
use crate::config::Config;
use crate::core::auth;
use crate::db::log::audit_quiet;
use crate::db::products::{self, ProductFilter};
use crate::db::settings;
use crate::errors::AppResult;
use crate::models::product::{ProductPatch, ProductStatus};
use crate::models::role::Area;
use crate::printing::receipt::money;
use crate::ui::messages::{header, info, success};
use crate::utils::colors::{GREY, or_dash, paint};
use crate::utils::table::{Column, Table};

impl From<&ProductFields> for ProductPatch {
    fn from(f: &ProductFields) -> Self {
        ProductPatch {
            name: f.name.clone(),
            category_id: f.category,
            price: f.price,
            cost: f.cost,
            image: f.image.clone(),
            status: f.status,
        }
    }
}

pub fn handle(cmd: &ProductCmd, cfg: &Config) -> AppResult<()> {
    let pool = open(cfg)?;
    let conn = &pool.conn;

    match cmd {
        ProductCmd::List {
            category,
            search,
            available,
        } => {
            auth::require(conn, cfg, Area::Browse)?;
            let filter = ProductFilter {
                category_id: *category,
                search: search.clone(),
                available_only: *available,
            };
            let list = products::list(conn, &filter)?;
            if list.is_empty() {
                info("No products found.");
                return Ok(());
            }

            let currency = settings::get(conn)?.currency_symbol;
            header("🍕 Products");
            let mut t = Table::new(vec![
                Column::right("ID"),
                Column::left("Name"),
                Column::left("Category"),
                Column::right("Price"),
                Column::right("Cost"),
                Column::left("Status"),
            ]);
            for p in list {
                let status = match p.status {
                    ProductStatus::Available => p.status.to_db_str().to_string(),
                    ProductStatus::Unavailable => paint(p.status.to_db_str(), GREY),
                };
                t.add_row(vec![
                    p.id.to_string(),
                    p.name,
                    or_dash(p.category_name.as_deref()),
                    money(p.price, &currency),
                    money(p.cost, &currency),
                    status,
                ]);
            }
            t.print();
        }
        ProductCmd::Add { fields } => {
            auth::require(conn, cfg, Area::Catalog)?;
            let id = products::create(conn, &ProductPatch::from(fields))?;
            let p = products::get(conn, id)?;
            audit_quiet(conn, "product_add", &p.name, &format!("Product #{id} at {:.2}", p.price));
            success(format!("Product '{}' added (id {id})", p.name));
        }
        ProductCmd::Update { id, fields } => {
            auth::require(conn, cfg, Area::Catalog)?;
            let p = products::update(conn, *id, &ProductPatch::from(fields))?;
            audit_quiet(conn, "product_update", &p.name, &format!("Product #{id} updated"));
            success(format!("Product '{}' updated", p.name));
        }
        ProductCmd::Delete { id } => {
            auth::require(conn, cfg, Area::Catalog)?;
            let p = products::get(conn, *id)?;
            products::delete(conn, *id)?;
            audit_quiet(conn, "product_delete", &p.name, &format!("Product #{id} deleted"));
            success(format!("Product '{}' deleted", p.name));
        }
    }
    Ok(())
}
