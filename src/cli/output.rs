//! Output formatting for CLI commands.

use serde::Serialize;

use crate::cli::args::{HamsieveArgs, OutputFormat};
use crate::corpus::Label;
use crate::error::Result;
use crate::evaluate::{CrossValidation, Evaluation};
use crate::pipeline::PipelineParams;

/// Result structure for training.
#[derive(Debug, Serialize)]
pub struct TrainingResult {
    pub model_path: String,
    pub best_params: PipelineParams,
    pub best_cv_accuracy: f64,
    pub combinations_evaluated: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub vocabulary_size: usize,
    pub holdout: Evaluation,
    pub full_dataset_cv: CrossValidation,
    pub duration_ms: u64,
}

/// Result structure for evaluating a saved model.
#[derive(Debug, Serialize)]
pub struct EvaluationResult {
    pub model_path: String,
    pub rows: usize,
    pub evaluation: Evaluation,
    pub duration_ms: u64,
}

/// Result structure for cross-validation.
#[derive(Debug, Serialize)]
pub struct CrossValidationResult {
    pub params: PipelineParams,
    pub folds: usize,
    pub rows: usize,
    pub cross_validation: CrossValidation,
    pub duration_ms: u64,
}

/// Result structure for one-shot prediction.
#[derive(Debug, Serialize)]
pub struct PredictionResult {
    pub prediction: Label,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spam_probability: Option<f64>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &HamsieveArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &HamsieveArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    // Convert to JSON value for easier manipulation
    let value = serde_json::to_value(result)?;

    match result {
        _ if std::any::type_name::<T>().contains("TrainingResult") => {
            output_training_human(&value)
        }
        _ if std::any::type_name::<T>().contains("EvaluationResult") => {
            output_evaluation_human(&value)
        }
        _ if std::any::type_name::<T>().contains("CrossValidationResult") => {
            output_cross_validation_human(&value)
        }
        _ => output_generic_human(&value),
    }
}

fn output_training_human(value: &serde_json::Value) -> Result<()> {
    if let Some(obj) = value.as_object() {
        println!("Training Summary:");
        println!("════════════════");

        if let Some(params) = obj.get("best_params") {
            let formatted = format_params(params);
            println!("Best hyperparameters: {formatted}");
        }
        if let Some(acc) = obj.get("best_cv_accuracy").and_then(|a| a.as_f64()) {
            println!("Best CV accuracy: {acc:.4}");
        }
        if let Some(n) = obj.get("combinations_evaluated").and_then(|n| n.as_u64()) {
            println!("Combinations evaluated: {n}");
        }
        if let Some(train) = obj.get("train_rows").and_then(|n| n.as_u64()) {
            let test = obj.get("test_rows").and_then(|n| n.as_u64()).unwrap_or(0);
            println!("Rows: {train} train / {test} test");
        }
        if let Some(vocab) = obj.get("vocabulary_size").and_then(|n| n.as_u64()) {
            println!("Vocabulary size: {vocab}");
        }

        if let Some(holdout) = obj.get("holdout") {
            println!();
            println!("Held-out Evaluation:");
            println!("───────────────────");
            print_evaluation(holdout);
        }

        if let Some(cv) = obj.get("full_dataset_cv").and_then(|c| c.as_object()) {
            println!();
            println!("Full-dataset Cross-validation:");
            println!("─────────────────────────────");
            print_cross_validation(cv);
        }

        if let Some(path) = obj.get("model_path").and_then(|p| p.as_str()) {
            println!();
            println!("Model saved to: {path}");
        }
        if let Some(duration) = obj.get("duration_ms").and_then(|d| d.as_u64()) {
            println!("Training time: {duration}ms");
        }
    }
    Ok(())
}

fn output_evaluation_human(value: &serde_json::Value) -> Result<()> {
    if let Some(obj) = value.as_object() {
        println!("Evaluation:");
        println!("══════════");

        if let Some(rows) = obj.get("rows").and_then(|n| n.as_u64()) {
            println!("Rows: {rows}");
        }
        if let Some(evaluation) = obj.get("evaluation") {
            print_evaluation(evaluation);
        }
        if let Some(duration) = obj.get("duration_ms").and_then(|d| d.as_u64()) {
            println!();
            println!("Evaluation time: {duration}ms");
        }
    }
    Ok(())
}

fn output_cross_validation_human(value: &serde_json::Value) -> Result<()> {
    if let Some(obj) = value.as_object() {
        println!("Cross-validation:");
        println!("════════════════");

        if let Some(params) = obj.get("params") {
            let formatted = format_params(params);
            println!("Hyperparameters: {formatted}");
        }
        if let Some(rows) = obj.get("rows").and_then(|n| n.as_u64()) {
            println!("Rows: {rows}");
        }
        if let Some(cv) = obj.get("cross_validation").and_then(|c| c.as_object()) {
            print_cross_validation(cv);
        }
        if let Some(duration) = obj.get("duration_ms").and_then(|d| d.as_u64()) {
            println!();
            println!("Cross-validation time: {duration}ms");
        }
    }
    Ok(())
}

/// Print an `Evaluation` value: accuracy, confusion matrix, per-class report.
fn print_evaluation(value: &serde_json::Value) {
    let Some(obj) = value.as_object() else {
        return;
    };

    if let Some(acc) = obj.get("accuracy").and_then(|a| a.as_f64()) {
        println!("Accuracy: {acc:.4}");
    }

    if let Some(confusion) = obj.get("confusion").and_then(|c| c.as_array()) {
        println!();
        println!("Confusion matrix (rows = truth, columns = prediction):");
        println!("              ham   spam");
        for (label, row) in ["ham ", "spam"].iter().zip(confusion.iter()) {
            if let Some(cells) = row.as_array() {
                let ham = cells.first().and_then(|c| c.as_u64()).unwrap_or(0);
                let spam = cells.get(1).and_then(|c| c.as_u64()).unwrap_or(0);
                println!("  true {label} {ham:>5}  {spam:>5}");
            }
        }
    }

    if let Some(report) = obj.get("report").and_then(|r| r.as_object()) {
        println!();
        println!("Class      Precision  Recall     F1         Support");
        for class in ["ham", "spam"] {
            if let Some(metrics) = report.get(class).and_then(|m| m.as_object()) {
                let precision = metrics.get("precision").and_then(|v| v.as_f64()).unwrap_or(0.0);
                let recall = metrics.get("recall").and_then(|v| v.as_f64()).unwrap_or(0.0);
                let f1 = metrics.get("f1").and_then(|v| v.as_f64()).unwrap_or(0.0);
                let support = metrics.get("support").and_then(|v| v.as_u64()).unwrap_or(0);
                println!("{class:<10} {precision:<10.4} {recall:<10.4} {f1:<10.4} {support}");
            }
        }
    }
}

/// Print a `CrossValidation` value: per-fold accuracies, mean, std.
fn print_cross_validation(obj: &serde_json::Map<String, serde_json::Value>) {
    if let Some(folds) = obj.get("fold_accuracies").and_then(|f| f.as_array()) {
        for (i, fold) in folds.iter().enumerate() {
            if let Some(acc) = fold.as_f64() {
                println!("Fold {}: {acc:.4}", i + 1);
            }
        }
    }
    if let Some(mean) = obj.get("mean").and_then(|m| m.as_f64()) {
        println!("Mean accuracy: {mean:.4}");
    }
    if let Some(std) = obj.get("std").and_then(|s| s.as_f64()) {
        println!("Std deviation: {std:.4}");
    }
}

/// Format a serialized `PipelineParams` value on one line.
fn format_params(value: &serde_json::Value) -> String {
    let Some(obj) = value.as_object() else {
        return value.to_string();
    };

    let ngram = obj
        .get("ngram_range")
        .and_then(|r| r.as_object())
        .map(|r| {
            let min_n = r.get("min_n").and_then(|n| n.as_u64()).unwrap_or(1);
            let max_n = r.get("max_n").and_then(|n| n.as_u64()).unwrap_or(1);
            format!("({min_n}, {max_n})")
        })
        .unwrap_or_else(|| "?".to_string());
    let min_df = obj.get("min_df").and_then(|n| n.as_u64()).unwrap_or(1);
    let c = obj.get("c").and_then(|c| c.as_f64()).unwrap_or(1.0);
    let penalty = obj
        .get("penalty")
        .and_then(|p| p.as_str())
        .unwrap_or("l2")
        .to_string();

    format!("ngram_range={ngram} min_df={min_df} C={c} penalty={penalty}")
}

/// Output generic data in human format.
fn output_generic_human(value: &serde_json::Value) -> Result<()> {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let formatted_val = format_value(val);
                println!("{key}: {formatted_val}");
            }
        }
        _ => {
            let formatted_value = format_value(value);
            println!("{formatted_value}");
        }
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &HamsieveArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "null".to_string(),
    }
}
