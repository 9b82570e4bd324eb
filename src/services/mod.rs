pub mod accounts;
pub mod inventory;
pub mod patients;
pub mod pharmacies;
pub mod ranking;
pub mod search;
