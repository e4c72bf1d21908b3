pub mod category;
pub mod ingredient;
pub mod order;
pub mod printer;
pub mod product;
pub mod role;
pub mod settings;
pub mod table;
pub mod user;
