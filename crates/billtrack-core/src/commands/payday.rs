use std::path::Path;

use chrono::NaiveDate;

use crate::CoreResult;
use crate::commands::common::{load_engine, payday_data};
use crate::contracts::envelope::{SuccessEnvelope, success};

#[derive(Debug)]
pub struct PaydayRunOptions<'a> {
    pub today: NaiveDate,
    pub home_override: Option<&'a Path>,
}

pub fn run(today: NaiveDate) -> CoreResult<SuccessEnvelope> {
    run_with_options(PaydayRunOptions {
        today,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: PaydayRunOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let engine = load_engine(options.home_override)?;
    let payday = engine.next_payday(options.today)?;
    success("payday", payday_data(&payday))
}
