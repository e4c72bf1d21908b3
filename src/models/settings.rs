use serde::Serialize;

/// The singleton settings row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub restaurant_name: String,
    pub address: String,
    pub phone: String,
    pub logo_path: String,
    pub vat_percentage: f64,
    pub currency_symbol: String,
    pub inventory_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            restaurant_name: "My Restaurant".to_string(),
            address: "123 Main St".to_string(),
            phone: "0550 000 000".to_string(),
            logo_path: String::new(),
            vat_percentage: 0.0,
            currency_symbol: "DZD".to_string(),
            inventory_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub restaurant_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub logo_path: Option<String>,
    pub vat_percentage: Option<f64>,
    pub currency_symbol: Option<String>,
    pub inventory_enabled: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.restaurant_name.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.logo_path.is_none()
            && self.vat_percentage.is_none()
            && self.currency_symbol.is_none()
            && self.inventory_enabled.is_none()
    }
}
