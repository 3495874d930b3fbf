//! Projection of the metrics table into aligned chart series

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use super::table::{Cell, Table};
use super::MetricsError;
use crate::net::AssetSource;

/// Column holding the epoch number; rows without one are dropped
pub const EPOCH: &str = "epoch";
pub const ACCURACY_TOP1: &str = "metrics/accuracy_top1";
pub const ACCURACY_TOP5: &str = "metrics/accuracy_top5";
pub const TRAIN_LOSS: &str = "train/loss";
pub const VAL_LOSS: &str = "val/loss";
pub const LEARNING_RATE: &str = "lr/pg0";

/// Every metric column projected into a series
pub const METRIC_COLUMNS: [&str; 5] = [ACCURACY_TOP1, ACCURACY_TOP5, TRAIN_LOSS, VAL_LOSS, LEARNING_RATE];

/// Chart-ready metrics: one epoch axis, one value per epoch in every series
///
/// A value is `None` when the cell was empty or not numeric, or when the
/// column is missing from the table altogether.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsSeries {
    pub epochs: Vec<f64>,
    pub series: BTreeMap<String, Vec<Option<f64>>>,
}

impl MetricsSeries {
    /// Keep rows with a numeric epoch and project the metric columns
    pub fn from_table(table: &Table) -> Self {
        let rows: Vec<(f64, &Vec<Cell>)> = table
            .rows()
            .iter()
            .filter_map(|row| {
                table
                    .get(row, EPOCH)
                    .and_then(Cell::as_number)
                    .map(|epoch| (epoch, row))
            })
            .collect();

        let epochs = rows.iter().map(|(epoch, _)| *epoch).collect();
        let series = METRIC_COLUMNS
            .iter()
            .map(|&name| {
                let values = rows
                    .iter()
                    .map(|(_, row)| table.get(row, name).and_then(Cell::as_number))
                    .collect();
                (name.to_string(), values)
            })
            .collect();

        MetricsSeries { epochs, series }
    }

    /// Values of one metric; empty if the metric was never projected
    pub fn values(&self, name: &str) -> &[Option<f64>] {
        self.series.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }
}

/// Fetch and ingest the metrics table at `path` on the asset host
pub async fn load<A: AssetSource>(assets: Arc<A>, path: String) -> Result<MetricsSeries, MetricsError> {
    let fetched = assets.fetch(&path).await?;
    let text = String::from_utf8_lossy(&fetched.body);
    let table = Table::parse(&text)?;
    let metrics = MetricsSeries::from_table(&table);
    info!(
        "📈 Loaded {} epochs of training metrics ({} rows in table)",
        metrics.len(),
        table.len()
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::fake::FakeService;

    const RESULTS: &str = "\
epoch,train/loss,metrics/accuracy_top1,metrics/accuracy_top5,val/loss,lr/pg0
1,1.20,0.61,0.95,1.10,0.00066
2,0.80,0.74,0.98,0.85,0.00131
,0.70,0.77,0.99,0.80,0.00130
3,0.55,0.82,1.0,0.62,0.00128
,,,,,
4,0.41,0.86,1.0,0.58,0.00125
";

    #[test]
    fn test_rows_without_epoch_are_dropped() {
        let table = Table::parse(RESULTS).unwrap();
        assert_eq!(table.len(), 6);

        let metrics = MetricsSeries::from_table(&table);
        assert_eq!(metrics.epochs, vec![1.0, 2.0, 3.0, 4.0]);
        for name in METRIC_COLUMNS {
            assert_eq!(metrics.values(name).len(), 4, "{name}");
        }
        assert_eq!(
            metrics.values(TRAIN_LOSS),
            [Some(1.20), Some(0.80), Some(0.55), Some(0.41)]
        );
        assert_eq!(metrics.values(LEARNING_RATE)[0], Some(0.00066));
    }

    #[test]
    fn test_missing_column_degrades_to_empty_values() {
        let table = Table::parse("epoch,train/loss\n1,0.5\n2,0.4\n").unwrap();
        let metrics = MetricsSeries::from_table(&table);

        assert_eq!(metrics.values(TRAIN_LOSS), [Some(0.5), Some(0.4)]);
        assert_eq!(metrics.values(VAL_LOSS), [None::<f64>, None]);
    }

    #[test]
    fn test_epoch_zero_is_kept() {
        let table = Table::parse("epoch,val/loss\n0,0.9\n1,0.8\n").unwrap();
        let metrics = MetricsSeries::from_table(&table);
        assert_eq!(metrics.epochs, vec![0.0, 1.0]);
    }

    #[test]
    fn test_rows_with_non_numeric_epoch_are_dropped() {
        let table = Table::parse("epoch,val/loss\nwarmup,0.9\ntrue,0.85\n1,0.8\n").unwrap();
        let metrics = MetricsSeries::from_table(&table);

        assert_eq!(metrics.epochs, vec![1.0]);
        assert_eq!(metrics.values(VAL_LOSS), [Some(0.8)]);
    }

    #[test]
    fn test_non_numeric_cells_become_gaps() {
        let table = Table::parse("epoch,val/loss\n1,n/a\n2,0.8\n").unwrap();
        let metrics = MetricsSeries::from_table(&table);
        assert_eq!(metrics.values(VAL_LOSS), [None::<f64>, Some(0.8)]);
    }

    #[test]
    fn test_table_without_epoch_column_is_empty() {
        let table = Table::parse("step,val/loss\n1,0.8\n").unwrap();
        let metrics = MetricsSeries::from_table(&table);
        assert!(metrics.is_empty());
        assert!(metrics.values(VAL_LOSS).is_empty());
    }

    #[tokio::test]
    async fn test_load_from_asset_host() {
        let assets = Arc::new(FakeService::answering("Normal", 0.5).with_asset(
            "/assets/results.csv",
            RESULTS.as_bytes(),
            Some("text/csv"),
        ));

        let metrics = load(assets, "/assets/results.csv".to_string()).await.unwrap();
        assert_eq!(metrics.len(), 4);
    }

    #[tokio::test]
    async fn test_load_failure_is_reported() {
        let assets = Arc::new(FakeService::answering("Normal", 0.5));
        let err = load(assets, "/assets/results.csv".to_string()).await.unwrap_err();
        assert!(matches!(err, MetricsError::Fetch(_)));
    }
}
