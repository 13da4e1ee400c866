//! End-to-end training scenarios: dataset loading, splitting, grid search
//! and evaluation.

use std::io::Write;

use hamsieve::classifier::Penalty;
use hamsieve::corpus::{Dataset, Label, train_test_split};
use hamsieve::error::Result;
use hamsieve::evaluate::{cross_validate, evaluate};
use hamsieve::features::NgramRange;
use hamsieve::model_selection::{GridSearch, ParamGrid};
use hamsieve::analysis::Normalizer;

const HAM_TEMPLATES: [&str; 5] = [
    "I'll call you later tonight",
    "are we still meeting for dinner tomorrow",
    "call me when you get home from work",
    "can you pick up some milk on the way",
    "running late see you at home soon",
];

const SPAM_TEMPLATES: [&str; 5] = [
    "WIN a FREE prize now!!! Call 090xxx",
    "congratulations you won free cash claim now",
    "FREE entry win a guaranteed prize text WIN now",
    "urgent claim your free cash prize today",
    "you have won a cash prize call now to claim",
];

/// A balanced corpus where every template repeats, so even `min_df = 2`
/// keeps a usable vocabulary in every fold.
fn corpus(repeats: usize) -> (Vec<String>, Vec<Label>) {
    let mut texts = Vec::new();
    let mut labels = Vec::new();
    for _ in 0..repeats {
        for t in HAM_TEMPLATES {
            texts.push(t.to_string());
            labels.push(Label::Ham);
        }
        for t in SPAM_TEMPLATES {
            texts.push(t.to_string());
            labels.push(Label::Spam);
        }
    }
    (texts, labels)
}

fn write_tsv(texts: &[String], labels: &[Label]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for (text, label) in texts.iter().zip(labels.iter()) {
        writeln!(file, "{label}\t{text}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_default_grid_accounting() -> Result<()> {
    let (texts, labels) = corpus(4);
    let search = GridSearch::new(ParamGrid::default());
    let outcome = search.run(&texts, &labels)?;

    // 2 n-gram ranges x 2 min_df x 3 C x 2 penalties.
    assert_eq!(outcome.scores.len(), 24);

    // Every combination fits on this corpus, 5 folds each: 120 fold fits.
    let total_folds: usize = outcome.scores.iter().map(|s| s.fold_accuracies.len()).sum();
    assert_eq!(total_folds, 120);
    assert!(outcome.scores.iter().all(|s| s.error.is_none()));

    // The winner is the best-scoring combination.
    let max_mean = outcome
        .scores
        .iter()
        .map(|s| s.mean_accuracy)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(outcome.best_score, max_mean);
    assert!(outcome.scores.iter().any(|s| s.params == outcome.best_params));

    // The refit winner separates the two template families.
    assert_eq!(
        outcome.classifier.predict("free cash prize win now")?,
        Label::Spam
    );
    assert_eq!(
        outcome.classifier.predict("call me later about dinner")?,
        Label::Ham
    );

    Ok(())
}

#[test]
fn test_grid_search_is_reproducible() -> Result<()> {
    let (texts, labels) = corpus(3);

    let a = GridSearch::new(ParamGrid::default()).run(&texts, &labels)?;
    let b = GridSearch::new(ParamGrid::default()).run(&texts, &labels)?;

    assert_eq!(a.best_params, b.best_params);
    assert_eq!(a.best_score, b.best_score);
    for (sa, sb) in a.scores.iter().zip(b.scores.iter()) {
        assert_eq!(sa.fold_accuracies, sb.fold_accuracies);
    }

    Ok(())
}

#[test]
fn test_failed_combination_is_isolated() -> Result<()> {
    let (texts, labels) = corpus(2);

    // min_df = 1000 prunes every term; that combination fails, the rest of
    // the search proceeds.
    let grid = ParamGrid {
        ngram_ranges: vec![NgramRange::unigrams()],
        min_dfs: vec![1, 1000],
        cs: vec![1.0],
        penalties: vec![Penalty::L2],
    };
    let outcome = GridSearch::new(grid).run(&texts, &labels)?;

    assert_eq!(outcome.scores.len(), 2);

    let failed = outcome.scores.iter().find(|s| s.params.min_df == 1000).unwrap();
    assert!(failed.error.is_some());
    assert_eq!(failed.mean_accuracy, f64::NEG_INFINITY);
    assert!(failed.fold_accuracies.is_empty());

    assert_eq!(outcome.best_params.min_df, 1);

    Ok(())
}

#[test]
fn test_all_combinations_failing_is_an_error() {
    let (texts, labels) = corpus(2);

    let grid = ParamGrid {
        ngram_ranges: vec![NgramRange::unigrams()],
        min_dfs: vec![1000],
        cs: vec![1.0],
        penalties: vec![Penalty::L2],
    };
    let result = GridSearch::new(grid).run(&texts, &labels);
    assert!(result.is_err());
}

#[test]
fn test_train_from_tsv_end_to_end() -> Result<()> {
    let (texts, labels) = corpus(4);
    let file = write_tsv(&texts, &labels);

    let dataset = Dataset::load_tsv(file.path())?;
    assert_eq!(dataset.len(), 40);
    assert_eq!(dataset.class_counts(), [20, 20]);

    let (train_set, test_set) = train_test_split(&dataset, 0.2, 42)?;
    assert_eq!(train_set.len(), 32);
    assert_eq!(test_set.len(), 8);
    // Stratification holds exactly on this balanced corpus.
    assert_eq!(test_set.class_counts(), [4, 4]);

    let (train_texts, train_labels) = train_set.texts_and_labels();
    let outcome = GridSearch::new(ParamGrid::default()).run(&train_texts, &train_labels)?;

    let (test_texts, test_labels) = test_set.texts_and_labels();
    let evaluation = evaluate(&outcome.classifier, &test_texts, &test_labels)?;

    // Template families are near-trivially separable.
    assert!(evaluation.accuracy >= 0.75);
    assert_eq!(evaluation.report.ham.support, 4);
    assert_eq!(evaluation.report.spam.support, 4);

    let (all_texts, all_labels) = dataset.texts_and_labels();
    let cv = cross_validate(
        &outcome.best_params,
        &Normalizer::english(),
        &all_texts,
        &all_labels,
        5,
        42,
    )?;
    assert_eq!(cv.fold_accuracies.len(), 5);
    assert!(cv.mean >= 0.8);

    Ok(())
}

#[test]
fn test_canonical_rows_classify_both_ways() -> Result<()> {
    // The two canonical rows, surrounded by enough context to train on.
    let (texts, labels) = corpus(3);
    let outcome = GridSearch::new(ParamGrid::default()).run(&texts, &labels)?;

    assert_eq!(outcome.classifier.predict("I'll call you later")?, Label::Ham);
    assert_eq!(
        outcome
            .classifier
            .predict("WIN a FREE prize now!!! Call 090xxx")?,
        Label::Spam
    );

    Ok(())
}
