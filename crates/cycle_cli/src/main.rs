//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `cycle_core` linkage without any host application.
//! - Print a deterministic demo summary computed against an in-memory store.

use chrono::NaiveDate;
use cycle_core::db::open_db_in_memory;
use cycle_core::{
    CycleService, FixedClock, FlowIntensity, PredictionConfig, SqliteCycleRepository, SubjectId,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("cycle_core ping={}", cycle_core::ping());
    println!("cycle_core version={}", cycle_core::core_version());

    let conn = open_db_in_memory()?;
    let repo = SqliteCycleRepository::try_new(&conn)?;
    let today = demo_date(2024, 2, 5)?;
    let service = CycleService::with_clock(repo, FixedClock(today), PredictionConfig::default());

    let subject = SubjectId::parse("smoke")?;
    service.log_flow(&subject, demo_date(2024, 1, 1)?, FlowIntensity::Medium)?;
    service.log_flow(&subject, demo_date(2024, 1, 29)?, FlowIntensity::Heavy)?;
    service.record_period_run(&subject, demo_date(2024, 1, 29)?, demo_date(2024, 2, 2)?)?;

    let summary = service.summary(&subject)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn demo_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("invalid demo date {year}-{month}-{day}").into())
}
