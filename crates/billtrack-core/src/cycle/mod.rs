pub mod date;
pub mod tracker;
