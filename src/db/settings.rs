use crate::errors::{AppError, AppResult};
use crate::models::settings::{Settings, SettingsPatch};
use rusqlite::{Connection, OptionalExtension, params};

/// Load the singleton settings row; defaults when it is missing.
pub fn get(conn: &Connection) -> AppResult<Settings> {
    let defaults = Settings::default();

    let row = conn
        .query_row(
            "SELECT restaurant_name, address, phone, logo_path, vat_percentage,
                    currency_symbol, inventory_enabled
             FROM settings ORDER BY id LIMIT 1",
            [],
            |r| {
                Ok(Settings {
                    restaurant_name: r.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    address: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    phone: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    logo_path: r.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    vat_percentage: r.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
                    currency_symbol: r
                        .get::<_, Option<String>>(5)?
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| defaults.currency_symbol.clone()),
                    inventory_enabled: r.get::<_, Option<i64>>(6)?.unwrap_or(0) != 0,
                })
            },
        )
        .optional()?;

    Ok(row.unwrap_or(defaults))
}

/// Apply the fields present in `patch`.
pub fn update(conn: &Connection, patch: &SettingsPatch) -> AppResult<Settings> {
    let mut s = get(conn)?;

    if let Some(v) = &patch.restaurant_name {
        s.restaurant_name = v.trim().to_string();
    }
    if let Some(v) = &patch.address {
        s.address = v.trim().to_string();
    }
    if let Some(v) = &patch.phone {
        s.phone = v.trim().to_string();
    }
    if let Some(v) = &patch.logo_path {
        s.logo_path = v.trim().to_string();
    }
    if let Some(vat) = patch.vat_percentage {
        if !(0.0..=100.0).contains(&vat) {
            return Err(AppError::Invalid("VAT must be between 0 and 100".into()));
        }
        s.vat_percentage = vat;
    }
    if let Some(cur) = &patch.currency_symbol {
        let cur = cur.trim();
        if cur.is_empty() {
            return Err(AppError::Invalid("Currency symbol cannot be empty".into()));
        }
        s.currency_symbol = cur.to_string();
    }
    if let Some(on) = patch.inventory_enabled {
        s.inventory_enabled = on;
    }

    let changed = conn.execute(
        "UPDATE settings
         SET restaurant_name = ?1, address = ?2, phone = ?3, logo_path = ?4,
             vat_percentage = ?5, currency_symbol = ?6, inventory_enabled = ?7
         WHERE id = (SELECT MIN(id) FROM settings)",
        params![
            s.restaurant_name,
            s.address,
            s.phone,
            s.logo_path,
            s.vat_percentage,
            s.currency_symbol,
            s.inventory_enabled as i64
        ],
    )?;
    if changed == 0 {
        conn.execute(
            "INSERT INTO settings (restaurant_name, address, phone, logo_path, vat_percentage,
                                   currency_symbol, inventory_enabled)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                s.restaurant_name,
                s.address,
                s.phone,
                s.logo_path,
                s.vat_percentage,
                s.currency_symbol,
                s.inventory_enabled as i64
            ],
        )?;
    }

    Ok(s)
}

pub fn set_inventory_enabled(conn: &Connection, on: bool) -> AppResult<()> {
    update(
        conn,
        &SettingsPatch {
            inventory_enabled: Some(on),
            ..Default::default()
        },
    )?;
    Ok(())
}

pub fn is_inventory_enabled(conn: &Connection) -> AppResult<bool> {
    Ok(get(conn)?.inventory_enabled)
}

/// Gate for every inventory command.
pub fn require_inventory(conn: &Connection) -> AppResult<()> {
    if is_inventory_enabled(conn)? {
        Ok(())
    } else {
        Err(AppError::InventoryDisabled)
    }
}
