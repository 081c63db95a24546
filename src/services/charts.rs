//! Plotly figures (`data` traces + `layout`) for analysis results.

use serde_json::{json, Value};

use crate::models::{ChartSpec, ChartType};
use crate::services::tabular::number;

pub const MAX_HISTOGRAMS: usize = 5;
pub const MAX_TREND_LINES: usize = 3;

fn numbers(values: &[f64]) -> Vec<Value> {
    values.iter().map(|v| number(*v)).collect()
}

fn layout(title: &str, x_title: &str, y_title: &str) -> Value {
    json!({
        "title": { "text": title },
        "xaxis": { "title": { "text": x_title } },
        "yaxis": { "title": { "text": y_title } },
        "template": "plotly_white"
    })
}

fn figure(traces: Vec<Value>, layout: Value) -> Value {
    json!({ "data": traces, "layout": layout })
}

pub fn histogram(column: &str, values: &[f64]) -> ChartSpec {
    let title = format!("Distribution of {}", column);
    let trace = json!({
        "type": "histogram",
        "name": column,
        "x": numbers(values),
    });

    ChartSpec {
        chart_type: ChartType::Histogram,
        data: figure(vec![trace], layout(&title, column, "count")),
        title,
    }
}

/// `matrix[i][j]` is the correlation between `columns[i]` and `columns[j]`.
pub fn correlation_heatmap(columns: &[String], matrix: &[Vec<f64>]) -> ChartSpec {
    let title = "Correlation Heatmap".to_string();
    let z: Vec<Vec<Value>> = matrix.iter().map(|row| numbers(row)).collect();
    let trace = json!({
        "type": "heatmap",
        "x": columns,
        "y": columns,
        "z": z,
        "colorscale": "RdBu",
        "zmin": -1.0,
        "zmax": 1.0,
    });

    let mut layout = layout(&title, "", "");
    layout["yaxis"]["autorange"] = json!("reversed");

    ChartSpec {
        chart_type: ChartType::Heatmap,
        data: figure(vec![trace], layout),
        title,
    }
}

/// Values against their row index. Missing values are gaps in the line.
pub fn trend_line(column: &str, values: &[f64]) -> ChartSpec {
    let title = format!("Trend of {}", column);
    let index: Vec<usize> = (0..values.len()).collect();
    let trace = json!({
        "type": "scatter",
        "mode": "lines",
        "name": column,
        "x": index,
        "y": numbers(values),
    });

    ChartSpec {
        chart_type: ChartType::Line,
        data: figure(vec![trace], layout(&title, "index", column)),
        title,
    }
}

/// Points coloured by cluster label.
pub fn cluster_scatter(
    x_title: &str,
    y_title: &str,
    x: &[f64],
    y: &[f64],
    labels: &[usize],
) -> ChartSpec {
    let title = "Clustering Results".to_string();
    let trace = json!({
        "type": "scatter",
        "mode": "markers",
        "x": numbers(x),
        "y": numbers(y),
        "text": labels.iter().map(|l| format!("cluster {}", l)).collect::<Vec<_>>(),
        "marker": {
            "color": labels,
            "colorscale": "Viridis",
            "showscale": true,
            "colorbar": { "title": { "text": "cluster" } }
        },
    });

    ChartSpec {
        chart_type: ChartType::Scatter,
        data: figure(vec![trace], layout(&title, x_title, y_title)),
        title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_figure() {
        let chart = histogram("age", &[21.0, 35.0, f64::NAN]);
        assert_eq!(chart.title, "Distribution of age");
        assert_eq!(chart.chart_type, ChartType::Histogram);
        assert_eq!(chart.data["data"][0]["type"], "histogram");
        assert_eq!(chart.data["data"][0]["x"], json!([21.0, 35.0, null]));
        assert_eq!(chart.data["layout"]["title"]["text"], "Distribution of age");
    }

    #[test]
    fn test_heatmap_figure() {
        let cols = vec!["a".to_string(), "b".to_string()];
        let chart = correlation_heatmap(&cols, &[vec![1.0, 0.5], vec![0.5, 1.0]]);
        assert_eq!(chart.title, "Correlation Heatmap");
        let trace = &chart.data["data"][0];
        assert_eq!(trace["colorscale"], "RdBu");
        assert_eq!(trace["z"][0][1], json!(0.5));
        assert_eq!(trace["x"], json!(["a", "b"]));
    }

    #[test]
    fn test_trend_line_uses_row_index() {
        let chart = trend_line("y", &[2.0, 4.0, 6.0]);
        assert_eq!(chart.title, "Trend of y");
        assert_eq!(chart.data["data"][0]["x"], json!([0, 1, 2]));
        assert_eq!(chart.data["data"][0]["mode"], "lines");
    }

    #[test]
    fn test_scatter_is_coloured_by_cluster() {
        let chart = cluster_scatter("PC1", "PC2", &[0.0, 1.0], &[1.0, 0.0], &[0, 1]);
        assert_eq!(chart.title, "Clustering Results");
        assert_eq!(chart.data["data"][0]["marker"]["color"], json!([0, 1]));
        assert_eq!(chart.data["layout"]["xaxis"]["title"]["text"], "PC1");
    }
}
