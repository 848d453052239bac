use focusflow_core::{AnalyticsRecord, Config, StoreExt, StoreKey};

use super::{open_store, CmdResult};

const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const BAR_WIDTH: f64 = 30.0;

pub fn run(config: &Config, json: bool) -> CmdResult {
    let store = open_store(config)?;
    let record: AnalyticsRecord = store.load_or_default(StoreKey::Analytics)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let hours = record.display_hours();
    let heights = record.bar_heights_pct();
    for (i, day) in DAYS.iter().enumerate() {
        let bar = "#".repeat((heights[i] / 100.0 * BAR_WIDTH).round() as usize);
        println!("{day} {:>5.1}h {bar}", hours[i]);
    }
    println!();
    println!("Total focus:      {:.1}h", record.total_hours());
    println!("Sessions:         {}", record.tasks_completed);
    println!("Average session:  {:.0} min", record.average_session_length);
    println!("Most productive:  {}", record.productive_time_of_day);
    if let Some(at) = record.last_reset {
        println!("Last reset:       {}", at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}
