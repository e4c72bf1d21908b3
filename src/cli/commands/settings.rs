use crate::cli::commands::open;
use crate::cli::parser::{SettingsCmd, Toggle};
use crate::config::Config;
use crate::core::auth;
use crate::db::log::audit_quiet;
use crate::db::settings;
use crate::errors::AppResult;
use crate::models::role::Area;
use crate::models::settings::{Settings, SettingsPatch};
use crate::ui::messages::{header, info, success};

pub fn handle(cmd: &SettingsCmd, cfg: &Config) -> AppResult<()> {
    let pool = open(cfg)?;
    let conn = &pool.conn;
    auth::require(conn, cfg, Area::Settings)?;

    match cmd {
        SettingsCmd::Show => print_settings(&settings::get(conn)?),
        SettingsCmd::Set {
            name,
            address,
            phone,
            logo,
            vat,
            currency,
            inventory,
        } => {
            let patch = SettingsPatch {
                restaurant_name: name.clone(),
                address: address.clone(),
                phone: phone.clone(),
                logo_path: logo.clone(),
                vat_percentage: *vat,
                currency_symbol: currency.clone(),
                inventory_enabled: inventory.map(|t| t == Toggle::On),
            };
            if patch.is_empty() {
                info("Nothing to change.");
                return Ok(());
            }

            let s = settings::update(conn, &patch)?;
            audit_quiet(conn, "settings_update", "", "Settings updated");
            success("Settings saved.");
            print_settings(&s);
        }
    }
    Ok(())
}

fn print_settings(s: &Settings) {
    header("⚙️  Settings");
    println!("{:<18} {}", "Restaurant:", s.restaurant_name);
    println!("{:<18} {}", "Address:", s.address);
    println!("{:<18} {}", "Phone:", s.phone);
    println!("{:<18} {}", "Logo:", s.logo_path);
    println!("{:<18} {}%", "VAT:", s.vat_percentage);
    println!("{:<18} {}", "Currency:", s.currency_symbol);
    println!(
        "{:<18} {}",
        "Inventory:",
        if s.inventory_enabled { "on" } else { "off" }
    );
}
