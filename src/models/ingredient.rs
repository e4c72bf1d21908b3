use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub min_quantity: f64,
    pub cost: f64,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
}

impl Ingredient {
    pub fn is_low(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngredientPatch {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub min_quantity: Option<f64>,
    pub cost: Option<f64>,
    pub product_id: Option<i64>,
}
