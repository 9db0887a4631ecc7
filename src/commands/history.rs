use stockcast_client::controller::ControllerState;
use stockcast_client::models::{HistoryView, PredictionHistoryEntry};
use stockcast_client::ViewController;

use super::{format_metric, format_price, print_submission, render_state};
use stockcast_client::utils::Table;

pub async fn execute(controller: &ViewController) -> Result<(), String> {
    print_submission("history", &controller.load_history().await);
    show(&controller.snapshot());
    Ok(())
}

/// Print the history view, or the history error if the last load failed
pub fn show(state: &ControllerState) {
    match &state.history_view {
        HistoryView::NotLoaded => {
            if let Some(text) = render_state("history", &state.history) {
                println!("{}", text);
            }
        }
        HistoryView::Empty => println!("No predictions yet. Make your first prediction with `predict <TICKER>`!"),
        HistoryView::Entries(entries) => println!("{}", render_table(entries)),
    }
}

pub fn render_table(entries: &[PredictionHistoryEntry]) -> String {
    let mut table = Table::new(&["Ticker", "Date", "Predicted", "MSE", "RMSE", "R²"]);
    for entry in entries {
        table.add_row(vec![
            entry.ticker.clone(),
            entry.created_at.format("%b %-d, %Y").to_string(),
            format_price(entry.next_day_price),
            format_metric(entry.mse),
            format_metric(entry.rmse),
            format_metric(entry.r2),
        ]);
    }
    table.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_table_rows_keep_server_order() {
        let entries = vec![
            PredictionHistoryEntry {
                ticker: "MSFT".into(),
                created_at: Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap(),
                next_day_price: Some(401.2),
                mse: Some(3.1),
                rmse: None,
                r2: Some(0.88),
            },
            PredictionHistoryEntry {
                ticker: "AAPL".into(),
                created_at: Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap(),
                next_day_price: None,
                mse: None,
                rmse: None,
                r2: None,
            },
        ];

        let rendered = render_table(&entries);
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[2].starts_with("MSFT"));
        assert!(lines[2].contains("Mar 4, 2025"));
        assert!(lines[2].contains("$401.20"));
        assert!(lines[3].starts_with("AAPL"));
        assert!(lines[3].contains("--"));
    }
}
