pub mod accounts;
pub mod wastes;
