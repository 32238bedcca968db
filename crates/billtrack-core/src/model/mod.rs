pub mod bill;
pub mod schedule;
pub mod transaction;

pub use bill::{Bill, BillStatus, PaymentRecord, PaymentSource};
pub use schedule::{IntervalSchedule, MonthlySchedule, PaySchedules};
pub use transaction::Transaction;
