//! Column-oriented view of JSON records plus the statistics the analyses use.
//!
//! Missing cells are `Value::Null` in the raw column and `NaN` in the numeric
//! view. All statistics helpers skip `NaN`.

use serde_json::{Map, Value};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Int64,
    Float64,
    Bool,
    Object,
}

impl DType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Bool => "bool",
            DType::Object => "object",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DType::Int64 | DType::Float64)
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub dtype: DType,
    pub cells: Vec<Value>,
}

impl Column {
    fn new(name: String, cells: Vec<Value>) -> Self {
        let dtype = infer_dtype(&cells);
        Self { name, dtype, cells }
    }

    /// Numeric view with `NaN` for missing cells. Empty for non-numeric columns.
    pub fn values(&self) -> Vec<f64> {
        if !self.dtype.is_numeric() {
            return Vec::new();
        }
        self.cells
            .iter()
            .map(|v| v.as_f64().unwrap_or(f64::NAN))
            .collect()
    }

    /// Present numeric values only.
    pub fn present_values(&self) -> Vec<f64> {
        self.values().into_iter().filter(|v| !v.is_nan()).collect()
    }

    pub fn missing(&self) -> usize {
        self.cells.iter().filter(|v| v.is_null()).count()
    }
}

fn infer_dtype(cells: &[Value]) -> DType {
    let present: Vec<&Value> = cells.iter().filter(|v| !v.is_null()).collect();
    if present.is_empty() {
        return DType::Object;
    }
    let has_missing = present.len() < cells.len();

    if present.iter().all(|v| v.is_boolean()) {
        return if has_missing { DType::Object } else { DType::Bool };
    }
    if present.iter().all(|v| v.is_number()) {
        let all_integral = present.iter().all(|v| v.is_i64() || v.is_u64());
        return if all_integral && !has_missing {
            DType::Int64
        } else {
            DType::Float64
        };
    }
    DType::Object
}

/// Records coerced into named columns.
#[derive(Debug, Clone)]
pub struct DataTable {
    pub columns: Vec<Column>,
    pub n_rows: usize,
}

impl DataTable {
    /// Build a table from a list of records or a single record.
    ///
    /// Object records contribute their keys as columns (first-seen order),
    /// array records contribute positional columns `"0"`, `"1"`, ... and
    /// scalars land in column `"0"`.
    pub fn from_json(data: &Value) -> Result<Self, AppError> {
        let rows: Vec<&Value> = match data {
            Value::Array(items) => items.iter().collect(),
            Value::Object(_) => vec![data],
            _ => {
                return Err(AppError::Validation(
                    "Data must be a list of records or a single record".to_string(),
                ))
            }
        };

        let records: Vec<Map<String, Value>> = rows.into_iter().map(row_to_record).collect();

        let mut names: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let cells = records
                    .iter()
                    .map(|r| r.get(&name).cloned().unwrap_or(Value::Null))
                    .collect();
                Column::new(name, cells)
            })
            .collect();

        Ok(Self {
            columns,
            n_rows: records.len(),
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.dtype.is_numeric()).collect()
    }
}

fn row_to_record(row: &Value) -> Map<String, Value> {
    match row {
        Value::Object(map) => map.clone(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        scalar => {
            let mut map = Map::new();
            map.insert("0".to_string(), scalar.clone());
            map
        }
    }
}

/// JSON number, or `null` for NaN and infinities.
pub fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1).
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::max)
}

/// Linear-interpolated quantile, `q` in [0, 1].
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Pearson correlation over the rows where both inputs are present.
///
/// NaN when fewer than two complete pairs exist or either side is constant.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(a, b)| (*a, *b))
        .unzip();

    if xs.len() < 2 {
        return f64::NAN;
    }

    let mean_x = mean(&xs);
    let mean_y = mean(&ys);

    let mut numerator = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;

    for (a, b) in xs.iter().zip(ys.iter()) {
        let diff_x = a - mean_x;
        let diff_y = b - mean_y;
        numerator += diff_x * diff_y;
        sum_sq_x += diff_x * diff_x;
        sum_sq_y += diff_y * diff_y;
    }

    if sum_sq_x == 0.0 || sum_sq_y == 0.0 {
        return f64::NAN;
    }

    numerator / (sum_sq_x.sqrt() * sum_sq_y.sqrt())
}

/// Least-squares slope of `values` against their position 0..n.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return f64::NAN;
    }

    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values);

    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean) * (x - x_mean);
    }

    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_columns_keep_first_seen_order() {
        let table = DataTable::from_json(&json!([
            {"b": 1, "a": 2},
            {"a": 3, "c": "x"}
        ]))
        .unwrap();
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(table.shape(), (2, 3));
    }

    #[test]
    fn test_dtype_inference() {
        let table = DataTable::from_json(&json!([
            {"i": 1, "f": 1.5, "gap": 1, "flag": true, "name": "a", "mixed": 1},
            {"i": 2, "f": 2, "flag": false, "name": "b", "mixed": "two"}
        ]))
        .unwrap();
        let dtypes: Vec<&str> = table.columns.iter().map(|c| c.dtype.as_str()).collect();
        assert_eq!(dtypes, vec!["int64", "float64", "float64", "bool", "object", "object"]);
        assert_eq!(table.numeric_columns().len(), 3);

        let gap = &table.columns[2];
        assert_eq!(gap.missing(), 1);
        assert!(gap.values()[1].is_nan());
        assert_eq!(gap.present_values(), vec![1.0]);
    }

    #[test]
    fn test_single_object_is_one_row() {
        let table = DataTable::from_json(&json!({"x": 1, "y": 2})).unwrap();
        assert_eq!(table.shape(), (1, 2));
    }

    #[test]
    fn test_array_rows_and_scalars() {
        let table = DataTable::from_json(&json!([[1, 2], [3, 4]])).unwrap();
        assert_eq!(table.columns[1].name, "1");
        assert_eq!(table.columns[1].values(), vec![2.0, 4.0]);

        let table = DataTable::from_json(&json!([5, 6, 7])).unwrap();
        assert_eq!(table.shape(), (3, 1));
        assert_eq!(table.columns[0].name, "0");
    }

    #[test]
    fn test_scalar_data_is_rejected() {
        assert!(matches!(
            DataTable::from_json(&json!("hello")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_basic_stats() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(mean(&v), 2.5);
        assert_eq!(median(&v), 2.5);
        assert_eq!(quantile(&v, 0.25), 1.75);
        assert_eq!(quantile(&v, 0.75), 3.25);
        assert_eq!(min(&v), 1.0);
        assert_eq!(max(&v), 4.0);
        assert!((sample_std(&v) - 1.2909944487358056).abs() < 1e-12);
        assert!(sample_std(&[1.0]).is_nan());
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_pearson() {
        assert!((pearson_correlation(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-12);
        assert!((pearson_correlation(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
        assert!(pearson_correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        // Incomplete pairs are dropped.
        let r = pearson_correlation(&[1.0, f64::NAN, 3.0, 4.0], &[1.0, 9.0, 3.0, 4.0]);
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_slope() {
        assert!((linear_slope(&[2.0, 4.0, 6.0]) - 2.0).abs() < 1e-12);
        assert!(linear_slope(&[5.0, 3.0, 1.0]) < 0.0);
        assert_eq!(linear_slope(&[7.0, 7.0, 7.0]), 0.0);
        assert!(linear_slope(&[1.0]).is_nan());
    }

    #[test]
    fn test_number_maps_nan_to_null() {
        assert_eq!(number(f64::NAN), Value::Null);
        assert_eq!(number(1.5), json!(1.5));
    }
}
