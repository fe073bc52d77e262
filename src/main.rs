//! bayes-filter CLI: train and evaluate a Bayesian SMS spam filter.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};

use bayes_filter::classifier::{Classifier, ComplementNaiveClassifier, NaiveClassifier};
use bayes_filter::config::ClassifierConfig;
use bayes_filter::sms::{self, Prediction, SpamFilter};

#[derive(Parser)]
#[command(name = "bayes-filter", version, about = "Naive Bayes text classification")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a labelled SMS collection and classify every message in it.
    Evaluate {
        #[command(flatten)]
        training: TrainingArgs,

        /// Print every misclassified message.
        #[arg(long)]
        show_mispredictions: bool,
    },

    /// Train on a labelled SMS collection and classify a single message.
    Classify {
        #[command(flatten)]
        training: TrainingArgs,

        /// Message text.
        text: String,
    },
}

#[derive(Args)]
struct TrainingArgs {
    /// Tab-separated `label<TAB>text` file (ham|spam).
    #[arg(long)]
    data: PathBuf,

    /// Classifier configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of most frequent tokens to drop as stop words.
    #[arg(long, default_value = "20")]
    stop_words: usize,

    /// Smoothing alpha override.
    #[arg(long)]
    alpha: Option<f64>,

    /// Use the complement naive Bayes estimator.
    #[arg(long)]
    complement: bool,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            training,
            show_mispredictions,
        } => {
            let (filter, messages, config) = train(&training)?;
            let report = if training.complement {
                let classifier =
                    ComplementNaiveClassifier::with_config(filter.training_set().clone(), &config)?;
                filter.evaluate(&classifier, &messages, training.alpha)?
            } else {
                let classifier =
                    NaiveClassifier::with_config(filter.training_set().clone(), &config)?;
                filter.evaluate(&classifier, &messages, training.alpha)?
            };

            println!();
            println!("Ham messages:  {}", filter.message_count(sms::MessageType::Ham));
            println!("Spam messages: {}", filter.message_count(sms::MessageType::Spam));
            if report.skipped > 0 {
                println!("Skipped:       {} (no tokens left)", report.skipped);
            }
            println!();
            println!(
                "Correct predictions: {}/{} ({:.2}%)",
                report.correct,
                report.total(),
                report.accuracy() * 100.0
            );
            println!(
                "Mispredictions:      {}/{} ({:.2}%)",
                report.wrong(),
                report.total(),
                (1.0 - report.accuracy()) * 100.0
            );

            if show_mispredictions {
                println!();
                println!("False positives (ham classified as spam):");
                for prediction in report.false_positives() {
                    print_prediction(prediction);
                }
                println!();
                println!("False negatives (spam classified as ham):");
                for prediction in report.false_negatives() {
                    print_prediction(prediction);
                }
            }
        }

        Commands::Classify { training, text } => {
            let (filter, _, config) = train(&training)?;
            let tokens: Vec<String> = sms::tokenize(&text)
                .into_iter()
                .filter(|token| !filter.stop_words().contains(token))
                .collect();

            let probabilities = if training.complement {
                ComplementNaiveClassifier::with_config(filter.training_set().clone(), &config)?
                    .calculate_document_probabilities(&tokens, training.alpha)?
            } else {
                NaiveClassifier::with_config(filter.training_set().clone(), &config)?
                    .calculate_document_probabilities(&tokens, training.alpha)?
            };

            if probabilities.is_empty() {
                println!("No usable tokens in message.");
            }
            for combined in &probabilities {
                println!("{combined}");
                for cp in combined.token_probabilities() {
                    println!("  {cp} (seen {}x)", cp.occurrence());
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ClassifierConfig> {
    match path {
        Some(path) => Ok(ClassifierConfig::load(path)?),
        None => Ok(ClassifierConfig::default()),
    }
}

/// Read, de-duplicate and train on the collection in `args.data`.
fn train(args: &TrainingArgs) -> Result<(SpamFilter, Vec<sms::Sms>, ClassifierConfig)> {
    let config = load_config(args.config.as_deref())?;

    println!("Reading data file ...");
    let content = std::fs::read_to_string(&args.data)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", args.data.display()))?;
    let messages = sms::deduplicate(sms::parse_collection(&content)?);

    println!("Training Bayes filter ...");
    let mut filter = SpamFilter::new()?;
    filter.train(&messages);

    if args.stop_words > 0 {
        println!("Removing {} highest frequency tokens ...", args.stop_words);
        for tc in filter.remove_stop_words(args.stop_words) {
            println!("- {} ({})", tc.token, tc.count);
        }
    }

    println!("Adjusting class base probabilities ...");
    filter.adjust_priors()?;
    for kind in [sms::MessageType::Ham, sms::MessageType::Spam] {
        println!(
            "- {kind} base probability: {:.2}%",
            filter.data_set(kind).class().probability() * 100.0
        );
    }

    Ok((filter, messages, config))
}

fn print_prediction(prediction: &Prediction) {
    println!(
        "- [{:<4} - {:>7.2}% {}] {}",
        prediction.message.kind,
        prediction.probability * 100.0,
        prediction.estimated,
        prediction.message.content
    );
}
