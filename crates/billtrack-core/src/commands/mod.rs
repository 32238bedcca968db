pub mod bills;
pub mod common;
pub mod matches;
pub mod payday;
pub mod reconcile;
