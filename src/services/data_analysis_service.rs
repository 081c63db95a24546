use serde_json::{json, Map, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::data_analysis_queries;
use crate::errors::AppError;
use crate::models::{AnalysisOutcome, AnalysisType, ChartSpec, CreateDataAnalysis, DataAnalysisResult};
use crate::services::charts;
use crate::services::clustering;
use crate::services::request_tracker::{RequestTracker, DATA_ANALYSIS_SERVICE};
use crate::services::tabular::{self, number, Column, DataTable};

const HIGH_CORRELATION_THRESHOLD: f64 = 0.7;
const MAX_CORRELATION_INSIGHTS: usize = 3;

/// Run one analysis over `data` without touching the database.
pub fn run_analysis(data: &Value, analysis_type: AnalysisType) -> Result<AnalysisOutcome, AppError> {
    let table = DataTable::from_json(data)?;

    match analysis_type {
        AnalysisType::Descriptive => Ok(descriptive(&table)),
        AnalysisType::Correlation => Ok(correlation(&table)),
        AnalysisType::Trend => Ok(trend(&table)),
        AnalysisType::Clustering => clustering_analysis(&table),
    }
}

fn column_map<F>(columns: &[&Column], f: F) -> Value
where
    F: Fn(&Column) -> Value,
{
    let mut map = Map::new();
    for col in columns {
        map.insert(col.name.clone(), f(col));
    }
    Value::Object(map)
}

fn numeric_describe(col: &Column) -> Value {
    let v = col.present_values();
    json!({
        "count": v.len(),
        "mean": number(tabular::mean(&v)),
        "std": number(tabular::sample_std(&v)),
        "min": number(tabular::min(&v)),
        "25%": number(tabular::quantile(&v, 0.25)),
        "50%": number(tabular::quantile(&v, 0.5)),
        "75%": number(tabular::quantile(&v, 0.75)),
        "max": number(tabular::max(&v)),
    })
}

fn cell_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// count / unique / top / freq over present cells.
fn categorical_describe(col: &Column) -> Value {
    let mut counts: Vec<(String, &Value, usize)> = Vec::new();
    for cell in col.cells.iter().filter(|c| !c.is_null()) {
        let key = cell_key(cell);
        match counts.iter_mut().find(|(k, _, _)| *k == key) {
            Some(entry) => entry.2 += 1,
            None => counts.push((key, cell, 1)),
        }
    }

    // First-seen value wins ties.
    let top = counts
        .iter()
        .fold(None::<&(String, &Value, usize)>, |best, entry| match best {
            Some(b) if b.2 >= entry.2 => Some(b),
            _ => Some(entry),
        });

    json!({
        "count": counts.iter().map(|(_, _, n)| n).sum::<usize>(),
        "unique": counts.len(),
        "top": top.map(|(_, v, _)| (*v).clone()).unwrap_or(Value::Null),
        "freq": top.map(|(_, _, n)| *n),
    })
}

fn descriptive(table: &DataTable) -> AnalysisOutcome {
    let all: Vec<&Column> = table.columns.iter().collect();
    let numeric = table.numeric_columns();
    let (rows, cols) = table.shape();

    let summary = if numeric.is_empty() {
        column_map(&all, categorical_describe)
    } else {
        column_map(&numeric, numeric_describe)
    };

    let mut results = Map::new();
    results.insert("summary".into(), summary);
    results.insert("missing_values".into(), column_map(&all, |c| json!(c.missing())));
    results.insert("data_types".into(), column_map(&all, |c| json!(c.dtype.as_str())));
    results.insert("shape".into(), json!([rows, cols]));
    results.insert(
        "columns".into(),
        json!(table.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()),
    );

    let mut insights = Vec::new();
    if !numeric.is_empty() {
        let stat = |f: fn(&[f64]) -> f64| column_map(&numeric, move |c| number(f(&c.present_values())));
        results.insert(
            "numeric_summary".into(),
            json!({
                "mean": stat(tabular::mean),
                "median": stat(tabular::median),
                "std": stat(tabular::sample_std),
                "min": stat(tabular::min),
                "max": stat(tabular::max),
            }),
        );

        for col in &numeric {
            insights.push(format!("Average {}: {:.2}", col.name, tabular::mean(&col.present_values())));
        }
    }

    let visualizations = numeric
        .iter()
        .take(charts::MAX_HISTOGRAMS)
        .map(|c| charts::histogram(&c.name, &c.values()))
        .collect();

    AnalysisOutcome {
        results: Value::Object(results),
        visualizations,
        insights,
    }
}

struct HighCorrelation {
    var1: String,
    var2: String,
    correlation: f64,
}

fn correlation(table: &DataTable) -> AnalysisOutcome {
    let numeric = table.numeric_columns();
    if numeric.len() < 2 {
        return AnalysisOutcome {
            results: json!({ "error": "Need at least 2 numeric columns for correlation analysis" }),
            visualizations: Vec::new(),
            insights: Vec::new(),
        };
    }

    let names: Vec<String> = numeric.iter().map(|c| c.name.clone()).collect();
    let values: Vec<Vec<f64>> = numeric.iter().map(|c| c.values()).collect();

    let matrix: Vec<Vec<f64>> = values
        .iter()
        .map(|x| values.iter().map(|y| tabular::pearson_correlation(x, y)).collect())
        .collect();

    let mut high = Vec::new();
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            let r = matrix[i][j];
            if r.abs() > HIGH_CORRELATION_THRESHOLD {
                high.push(HighCorrelation {
                    var1: names[i].clone(),
                    var2: names[j].clone(),
                    correlation: r,
                });
            }
        }
    }

    let mut correlation_matrix = Map::new();
    for (i, name) in names.iter().enumerate() {
        let mut row = Map::new();
        for (j, other) in names.iter().enumerate() {
            row.insert(other.clone(), number(matrix[i][j]));
        }
        correlation_matrix.insert(name.clone(), Value::Object(row));
    }

    let insights = high
        .iter()
        .take(MAX_CORRELATION_INSIGHTS)
        .map(|h| format!("Strong correlation ({:.2}) between {} and {}", h.correlation, h.var1, h.var2))
        .collect();

    let high_correlations: Vec<Value> = high
        .iter()
        .map(|h| json!({ "var1": h.var1, "var2": h.var2, "correlation": number(h.correlation) }))
        .collect();

    AnalysisOutcome {
        results: json!({
            "correlation_matrix": correlation_matrix,
            "high_correlations": high_correlations,
        }),
        visualizations: vec![charts::correlation_heatmap(&names, &matrix)],
        insights,
    }
}

fn trend_label(slope: f64) -> &'static str {
    if slope > 0.0 {
        "increasing"
    } else if slope < 0.0 {
        "decreasing"
    } else {
        "stable"
    }
}

fn trend(table: &DataTable) -> AnalysisOutcome {
    let numeric = table.numeric_columns();
    let mut trends = Map::new();
    let mut insights = Vec::new();

    for col in &numeric {
        let values = col.present_values();
        if values.len() < 2 {
            continue;
        }

        let slope = tabular::linear_slope(&values);
        let mean = tabular::mean(&values);
        let change_rate = if mean != 0.0 { slope / mean } else { 0.0 };
        let label = trend_label(slope);

        insights.push(format!("{} shows a {} trend (slope: {:.3})", col.name, label, slope));
        trends.insert(
            col.name.clone(),
            json!({
                "slope": number(slope),
                "trend": label,
                "change_rate": number(change_rate),
            }),
        );
    }

    let visualizations = numeric
        .iter()
        .take(charts::MAX_TREND_LINES)
        .map(|c| charts::trend_line(&c.name, &c.values()))
        .collect();

    AnalysisOutcome {
        results: json!({ "trends": trends }),
        visualizations,
        insights,
    }
}

fn clustering_analysis(table: &DataTable) -> Result<AnalysisOutcome, AppError> {
    let numeric = table.numeric_columns();
    if numeric.len() < 2 {
        return Ok(AnalysisOutcome {
            results: json!({ "error": "Need at least 2 numeric columns for clustering" }),
            visualizations: Vec::new(),
            insights: Vec::new(),
        });
    }

    let named: Vec<(String, Vec<f64>)> = numeric.iter().map(|c| (c.name.clone(), c.values())).collect();
    let normalized = clustering::standardize(&named)?;
    let result = clustering::kmeans(&normalized)?;

    let chart = cluster_chart(&named, &result.cluster_labels)?;

    let insights = vec![
        format!("Data grouped into {} clusters", result.n_clusters),
        format!("Clustering quality (inertia): {:.2}", result.inertia),
    ];

    Ok(AnalysisOutcome {
        results: json!({
            "n_clusters": result.n_clusters,
            "cluster_centers": result
                .cluster_centers
                .iter()
                .map(|row| row.iter().map(|v| number(*v)).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
            "cluster_labels": result.cluster_labels,
            "inertia": number(result.inertia),
        }),
        visualizations: vec![chart],
        insights,
    })
}

/// Scatter of the first two columns, or of the first two principal
/// components of the raw values when there are more than two columns.
fn cluster_chart(named: &[(String, Vec<f64>)], labels: &[usize]) -> Result<ChartSpec, AppError> {
    if named.len() > 2 {
        let raw: Vec<Vec<f64>> = named.iter().map(|(_, v)| v.clone()).collect();
        let pcs = clustering::principal_components(&clustering::to_matrix(&raw)?, 2);
        let pc1 = pcs.column(0).to_vec();
        let pc2 = pcs.column(1).to_vec();
        return Ok(charts::cluster_scatter("PC1", "PC2", &pc1, &pc2, labels));
    }

    let (x_name, x) = &named[0];
    let (y_name, y) = &named[1];
    Ok(charts::cluster_scatter(x_name, y_name, x, y, labels))
}

pub struct DataAnalysisService<'a> {
    pool: &'a PgPool,
}

impl<'a> DataAnalysisService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn analyze(
        &self,
        data: &Value,
        analysis_type: AnalysisType,
        user_id: Option<Uuid>,
    ) -> Result<DataAnalysisResult, AppError> {
        let tracker = RequestTracker::for_service(self.pool, DATA_ANALYSIS_SERVICE).await?;
        let input = serde_json::to_string(data)?;

        tracker
            .track(user_id, &input, async {
                let outcome = run_analysis(data, analysis_type)?;
                info!(
                    "{} produced {} charts and {} insights",
                    analysis_type.record_name(),
                    outcome.visualizations.len(),
                    outcome.insights.len()
                );

                let stored = data_analysis_queries::insert(
                    self.pool,
                    CreateDataAnalysis {
                        analysis_type,
                        input_data: data.clone(),
                        results: outcome.results.clone(),
                        visualizations: outcome.visualizations.clone(),
                        insights: outcome.insights.clone(),
                    },
                )
                .await?;

                Ok::<_, AppError>(DataAnalysisResult {
                    analysis_type,
                    results: outcome.results,
                    visualizations: outcome.visualizations,
                    insights: outcome.insights,
                    analysis_id: stored.id,
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy() -> Value {
        json!([{"x": 1, "y": 2}, {"x": 2, "y": 4}, {"x": 3, "y": 6}])
    }

    #[test]
    fn test_trend_doubling_series() {
        let outcome = run_analysis(&xy(), AnalysisType::Trend).unwrap();
        let y = &outcome.results["trends"]["y"];
        assert!((y["slope"].as_f64().unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(y["trend"], "increasing");
        assert!((y["change_rate"].as_f64().unwrap() - 0.5).abs() < 1e-9);
        assert!(outcome.insights.contains(&"y shows a increasing trend (slope: 2.000)".to_string()));
        assert_eq!(outcome.visualizations.len(), 2);
        assert_eq!(outcome.visualizations[1].title, "Trend of y");
    }

    #[test]
    fn test_trend_strictly_increasing_with_gaps() {
        let data = json!([{"v": 1.0}, {"v": null}, {"v": 3.5}, {"v": 10.0}, {"other": 1}]);
        let outcome = run_analysis(&data, AnalysisType::Trend).unwrap();
        let v = &outcome.results["trends"]["v"];
        assert!(v["slope"].as_f64().unwrap() > 0.0);
        assert_eq!(v["trend"], "increasing");
        // A single present value is not a trend.
        assert!(outcome.results["trends"].get("other").is_none());
    }

    #[test]
    fn test_trend_stable_and_zero_mean() {
        let data = json!([{"a": 3, "b": -1}, {"a": 3, "b": 0}, {"a": 3, "b": 1}]);
        let outcome = run_analysis(&data, AnalysisType::Trend).unwrap();
        assert_eq!(outcome.results["trends"]["a"]["trend"], "stable");
        assert_eq!(outcome.results["trends"]["b"]["change_rate"], json!(0.0));
    }

    #[test]
    fn test_descriptive_shape_and_summary() {
        let data = json!([
            {"x": 1, "y": 2.5, "name": "a"},
            {"x": 2, "y": null, "name": "b"},
            {"x": 3, "y": 4.5, "name": "a"}
        ]);
        let outcome = run_analysis(&data, AnalysisType::Descriptive).unwrap();
        let r = &outcome.results;
        assert_eq!(r["shape"], json!([3, 3]));
        assert_eq!(r["columns"], json!(["x", "y", "name"]));
        assert_eq!(r["data_types"]["x"], "int64");
        assert_eq!(r["data_types"]["y"], "float64");
        assert_eq!(r["data_types"]["name"], "object");
        assert_eq!(r["missing_values"]["y"], 1);
        assert_eq!(r["summary"]["x"]["count"], 3);
        assert_eq!(r["summary"]["x"]["std"], json!(1.0));
        assert_eq!(r["summary"]["y"]["count"], 2);
        assert!(r["summary"].get("name").is_none());
        assert_eq!(r["numeric_summary"]["mean"]["y"], json!(3.5));
        assert_eq!(r["numeric_summary"]["median"]["x"], json!(2.0));
        assert_eq!(outcome.insights, vec!["Average x: 2.00", "Average y: 3.50"]);
        assert_eq!(outcome.visualizations.len(), 2);
        assert_eq!(outcome.visualizations[0].title, "Distribution of x");
    }

    #[test]
    fn test_descriptive_without_numeric_columns() {
        let data = json!([{"c": "red"}, {"c": "blue"}, {"c": "red"}]);
        let outcome = run_analysis(&data, AnalysisType::Descriptive).unwrap();
        let c = &outcome.results["summary"]["c"];
        assert_eq!(c["count"], 3);
        assert_eq!(c["unique"], 2);
        assert_eq!(c["top"], "red");
        assert_eq!(c["freq"], 2);
        assert!(outcome.results.get("numeric_summary").is_none());
        assert!(outcome.insights.is_empty());
        assert!(outcome.visualizations.is_empty());
    }

    #[test]
    fn test_histograms_capped_at_five() {
        let row: Map<String, Value> = (0..7).map(|i| (format!("c{}", i), json!(i))).collect();
        let data = Value::Array(vec![Value::Object(row.clone()), Value::Object(row)]);
        let outcome = run_analysis(&data, AnalysisType::Descriptive).unwrap();
        assert_eq!(outcome.visualizations.len(), 5);
    }

    #[test]
    fn test_correlation_needs_two_numeric_columns() {
        let data = json!([{"x": 1, "s": "a"}, {"x": 2, "s": "b"}]);
        let outcome = run_analysis(&data, AnalysisType::Correlation).unwrap();
        assert_eq!(
            outcome.results,
            json!({"error": "Need at least 2 numeric columns for correlation analysis"})
        );
        assert!(outcome.visualizations.is_empty());
        assert!(outcome.insights.is_empty());
    }

    #[test]
    fn test_correlation_matrix_and_high_pairs() {
        let data = json!([
            {"x": 1, "y": 2, "z": 5},
            {"x": 2, "y": 4, "z": 1},
            {"x": 3, "y": 6, "z": 4},
            {"x": 4, "y": 8, "z": 2}
        ]);
        let outcome = run_analysis(&data, AnalysisType::Correlation).unwrap();
        let m = &outcome.results["correlation_matrix"];
        assert!((m["x"]["y"].as_f64().unwrap() - 1.0).abs() < 1e-9);
        assert!((m["x"]["x"].as_f64().unwrap() - 1.0).abs() < 1e-9);

        let high = outcome.results["high_correlations"].as_array().unwrap();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0]["var1"], "x");
        assert_eq!(high[0]["var2"], "y");
        assert_eq!(outcome.insights, vec!["Strong correlation (1.00) between x and y"]);
        assert_eq!(outcome.visualizations[0].title, "Correlation Heatmap");
    }

    #[test]
    fn test_clustering_needs_two_numeric_columns() {
        let outcome = run_analysis(&json!([{"x": 1}, {"x": 2}]), AnalysisType::Clustering).unwrap();
        assert_eq!(
            outcome.results,
            json!({"error": "Need at least 2 numeric columns for clustering"})
        );
        assert!(outcome.visualizations.is_empty());
    }

    #[test]
    fn test_clustering_results() {
        let data = json!([
            {"a": 1.0, "b": 1.0}, {"a": 1.2, "b": 0.8},
            {"a": 5.0, "b": 5.1}, {"a": 5.2, "b": 4.9},
            {"a": 9.0, "b": 9.2}, {"a": 9.1, "b": 8.9}
        ]);
        let outcome = run_analysis(&data, AnalysisType::Clustering).unwrap();
        assert_eq!(outcome.results["n_clusters"], 3);
        assert_eq!(outcome.results["cluster_labels"].as_array().unwrap().len(), 6);
        assert_eq!(outcome.results["cluster_centers"].as_array().unwrap().len(), 3);
        assert_eq!(outcome.insights[0], "Data grouped into 3 clusters");
        assert!(outcome.insights[1].starts_with("Clustering quality (inertia): "));
        assert_eq!(outcome.visualizations[0].title, "Clustering Results");
        assert_eq!(outcome.visualizations[0].data["layout"]["xaxis"]["title"]["text"], "a");
    }

    #[test]
    fn test_clustering_uses_principal_components_above_two_columns() {
        let data = json!([
            {"a": 1, "b": 2, "c": 3}, {"a": 2, "b": 1, "c": 5},
            {"a": 8, "b": 9, "c": 7}, {"a": 9, "b": 7, "c": 8}
        ]);
        let outcome = run_analysis(&data, AnalysisType::Clustering).unwrap();
        assert_eq!(outcome.visualizations[0].data["layout"]["xaxis"]["title"]["text"], "PC1");
    }

    #[test]
    fn test_clustering_fails_on_constant_column() {
        let data = json!([{"a": 1, "b": 5}, {"a": 2, "b": 5}, {"a": 3, "b": 5}]);
        assert!(matches!(
            run_analysis(&data, AnalysisType::Clustering),
            Err(AppError::Analysis(_))
        ));
    }

    #[test]
    fn test_single_record_input() {
        let outcome = run_analysis(&json!({"x": 4, "y": 9}), AnalysisType::Descriptive).unwrap();
        assert_eq!(outcome.results["shape"], json!([1, 2]));
        // Sample std of a single value is undefined.
        assert_eq!(outcome.results["summary"]["x"]["std"], Value::Null);
    }
}
