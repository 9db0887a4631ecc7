use stockcast_client::models::{PredictionResult, Submission, UiState};
use stockcast_client::ViewController;

use super::{format_metric, format_price, history, print_submission};

pub async fn execute(controller: &ViewController, args: &[&str]) -> Result<(), String> {
    if args.len() > 1 {
        return Err("Usage: `predict <TICKER>`".to_string());
    }
    let ticker = args.first().copied().unwrap_or("");

    let submission = controller.submit_predict(ticker).await;
    print_submission("predict", &submission);

    if let Submission::Finished(UiState::Success(_)) = submission {
        if let Some(result) = controller.snapshot().result {
            println!("{}", render_result(&result));
        }

        // The refresh was started by the prediction; show it once it lands
        controller.wait_for_history_refresh().await;
        history::show(&controller.snapshot());
    }

    Ok(())
}

pub fn render_result(result: &PredictionResult) -> String {
    let mut lines = vec![
        format!("📈 {} - Next Day Prediction: {}", result.ticker, format_price(result.next_day_price)),
        format!(
            "   MSE {}   RMSE {}   R² {}",
            format_metric(result.metrics.mse),
            format_metric(result.metrics.rmse),
            format_metric(result.metrics.r2)
        ),
    ];

    match &result.plot_urls {
        Some([history_chart, prediction_chart]) => {
            lines.push(format!("   History chart:    {}", history_chart));
            lines.push(format!("   Prediction chart: {}", prediction_chart));
        }
        None => lines.push("   No charts available".to_string()),
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockcast_client::models::Metrics;

    #[test]
    fn test_render_result_with_missing_metrics() {
        let result = PredictionResult {
            ticker: "AAPL".into(),
            next_day_price: Some(150.5),
            metrics: Metrics { mse: Some(0.0), rmse: None, r2: None },
            plot_urls: None,
        };

        let rendered = render_result(&result);
        assert!(rendered.contains("AAPL - Next Day Prediction: $150.50"));
        assert!(rendered.contains("MSE 0.0000"));
        assert!(rendered.contains("RMSE --"));
        assert!(rendered.contains("No charts available"));
    }
}
