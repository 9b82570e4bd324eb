//! SeaORM entities backing the medicine lookup service.

pub mod inventory_item;
pub mod patient;
pub mod pharmacy;
pub mod saved_medicine;
