use super::filter::FilteredView;
use serde::Serialize;

/// Headline metrics for a filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
}

impl PriceSummary {
    /// Aggregates whatever predicted prices the view holds; callers round first.
    pub fn compute(view: &FilteredView) -> Self {
        let mut prices: Vec<f64> = view.predicted_prices().collect();
        prices.sort_by(f64::total_cmp);

        let count = prices.len();
        let mean = prices.iter().sum::<f64>() / count as f64;
        let middle = count / 2;
        let median = if count % 2 == 0 {
            (prices[middle - 1] + prices[middle]) / 2.0
        } else {
            prices[middle]
        };

        Self {
            count,
            mean,
            median,
        }
    }

    pub fn mean_label(&self) -> String {
        format!("{:.2}", self.mean)
    }

    pub fn median_label(&self) -> String {
        format!("{:.2}", self.median)
    }
}
