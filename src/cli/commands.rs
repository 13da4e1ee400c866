//! Command implementations for the Hamsieve CLI.

use std::time::Instant;

use crate::analysis::Normalizer;
use crate::artifact::{self, ModelMetadata};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::corpus::{Dataset, train_test_split};
use crate::error::Result;
use crate::evaluate::{cross_validate, evaluate};
use crate::features::NgramRange;
use crate::model_selection::{GridSearch, ParamGrid};
use crate::pipeline::PipelineParams;

/// Execute a CLI command.
pub fn execute_command(args: HamsieveArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Evaluate(evaluate_args) => evaluate_model(evaluate_args.clone(), &args),
        Command::CrossValidate(cv_args) => run_cross_validation(cv_args.clone(), &args),
        Command::Predict(predict_args) => predict(predict_args.clone(), &args),
    }
}

/// Train a model: split, grid search, refit, evaluate, save.
fn train(args: TrainArgs, cli_args: &HamsieveArgs) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!("Loading dataset from: {}", args.dataset.display());
    }

    let start_time = Instant::now();
    let dataset = Dataset::load_tsv(&args.dataset)?;
    if cli_args.verbosity() > 1 {
        let [ham, spam] = dataset.class_counts();
        println!("Loaded {} rows ({ham} ham, {spam} spam)", dataset.len());
    }

    let (train_set, test_set) = train_test_split(&dataset, args.test_ratio, args.seed)?;
    let (train_texts, train_labels) = train_set.texts_and_labels();
    let (test_texts, test_labels) = test_set.texts_and_labels();

    let search = GridSearch::new(ParamGrid::default())
        .with_folds(args.folds)
        .with_seed(args.seed);
    let outcome = search.run(&train_texts, &train_labels)?;

    if cli_args.verbosity() > 1 {
        for score in &outcome.scores {
            match &score.error {
                Some(error) => println!("  {} -> failed: {error}", score.params),
                None => println!("  {} -> {:.4}", score.params, score.mean_accuracy),
            }
        }
    }

    let holdout = evaluate(&outcome.classifier, &test_texts, &test_labels)?;

    // K-fold accuracy over the whole dataset with the winning combination;
    // an optimistic estimate, reported alongside the held-out figures.
    let (all_texts, all_labels) = dataset.texts_and_labels();
    let full_dataset_cv = cross_validate(
        &outcome.best_params,
        outcome.classifier.normalizer(),
        &all_texts,
        &all_labels,
        args.folds,
        args.seed,
    )?;

    let metadata = ModelMetadata::for_classifier(&outcome.classifier);
    artifact::save(&args.model_path, &outcome.classifier, &metadata)?;

    let duration = start_time.elapsed();

    output_result(
        "Model trained successfully",
        &TrainingResult {
            model_path: args.model_path.to_string_lossy().to_string(),
            best_params: outcome.best_params,
            best_cv_accuracy: outcome.best_score,
            combinations_evaluated: outcome.scores.len(),
            train_rows: train_set.len(),
            test_rows: test_set.len(),
            vocabulary_size: outcome.classifier.vocabulary_size(),
            holdout,
            full_dataset_cv,
            duration_ms: duration.as_millis() as u64,
        },
        cli_args,
    )?;

    Ok(())
}

/// Evaluate a saved model on a labeled dataset.
fn evaluate_model(args: EvaluateArgs, cli_args: &HamsieveArgs) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!("Loading model from: {}", args.model_path.display());
    }

    let start_time = Instant::now();
    let (classifier, _) = artifact::load(&args.model_path)?;
    let dataset = Dataset::load_tsv(&args.dataset)?;
    let (texts, labels) = dataset.texts_and_labels();

    let evaluation = evaluate(&classifier, &texts, &labels)?;
    let duration = start_time.elapsed();

    output_result(
        "Evaluation complete",
        &EvaluationResult {
            model_path: args.model_path.to_string_lossy().to_string(),
            rows: dataset.len(),
            evaluation,
            duration_ms: duration.as_millis() as u64,
        },
        cli_args,
    )?;

    Ok(())
}

/// Cross-validate one hyperparameter combination over a whole dataset.
fn run_cross_validation(args: CrossValidateArgs, cli_args: &HamsieveArgs) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!("Loading dataset from: {}", args.dataset.display());
    }

    let start_time = Instant::now();
    let dataset = Dataset::load_tsv(&args.dataset)?;
    let (texts, labels) = dataset.texts_and_labels();

    let params = PipelineParams {
        ngram_range: NgramRange::new(args.min_n, args.max_n)?,
        min_df: args.min_df,
        c: args.c,
        penalty: args.penalty.into(),
    };

    let cv = cross_validate(
        &params,
        &Normalizer::english(),
        &texts,
        &labels,
        args.folds,
        args.seed,
    )?;
    let duration = start_time.elapsed();

    output_result(
        "Cross-validation complete",
        &CrossValidationResult {
            params,
            folds: args.folds,
            rows: dataset.len(),
            cross_validation: cv,
            duration_ms: duration.as_millis() as u64,
        },
        cli_args,
    )?;

    Ok(())
}

/// Classify one message with a saved model.
fn predict(args: PredictArgs, cli_args: &HamsieveArgs) -> Result<()> {
    let (classifier, metadata) = artifact::load(&args.model_path)?;
    if cli_args.verbosity() > 1 {
        println!(
            "Model trained {} on {} messages ({})",
            metadata.trained_at, metadata.training_messages, metadata.params
        );
    }

    let prediction = classifier.predict(&args.message)?;
    let spam_probability = if args.probability {
        Some(classifier.predict_proba(&args.message)?)
    } else {
        None
    };

    output_result(
        "Prediction",
        &PredictionResult {
            prediction,
            spam_probability,
        },
        cli_args,
    )?;

    Ok(())
}
