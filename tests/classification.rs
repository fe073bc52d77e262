//! End-to-end classification tests.
//!
//! These exercise the public API from data set construction through
//! training-set registration, configuration and document classification.

use std::sync::Arc;

use bayes_filter::class::Class;
use bayes_filter::classifier::{Classifier, ComplementNaiveClassifier, NaiveClassifier};
use bayes_filter::config::ClassifierConfig;
use bayes_filter::dataset::DataSet;
use bayes_filter::error::ClassifierError;
use bayes_filter::training::{ClassProbabilities, TrainingSet};

const SPAM: [&str; 7] = ["rolex", "watches", "viagra", "prince", "money", "send", "xyzzy"];
const HAM: [&str; 7] = ["love", "flowers", "unicorn", "friendship", "money", "send", "send"];

struct Scenario {
    training: TrainingSet<&'static str>,
    spam: Class,
    ham: Class,
    spam_set: Arc<DataSet<&'static str>>,
    ham_set: Arc<DataSet<&'static str>>,
}

fn scenario() -> Scenario {
    let spam = Class::new("spam", 0.5).unwrap();
    let ham = Class::new("ham", 0.5).unwrap();

    let spam_set = Arc::new(DataSet::new(spam.clone()));
    spam_set.add_tokens(SPAM);
    let ham_set = Arc::new(DataSet::new(ham.clone()));
    ham_set.add_tokens(HAM);

    let training = TrainingSet::new();
    training
        .add_all([Arc::clone(&spam_set), Arc::clone(&ham_set)])
        .unwrap();

    Scenario {
        training,
        spam,
        ham,
        spam_set,
        ham_set,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn spam_ham_scenario() {
    let s = scenario();
    assert_eq!(s.spam_set.set_size(), 7);
    assert_eq!(s.ham_set.set_size(), 7);

    let classifier = NaiveClassifier::new(s.training.clone());
    let alpha = Some(0.0);

    assert!(close(classifier.calculate_probability(&s.spam, &"rolex", alpha).unwrap(), 1.0));
    assert!(close(classifier.calculate_probability(&s.ham, &"unicorn", alpha).unwrap(), 1.0));

    for cp in classifier.calculate_probabilities(&"money", alpha).unwrap() {
        assert!(close(cp.probability(), 0.5), "{cp}");
    }

    let send = classifier.calculate_probabilities(&"send", alpha).unwrap();
    assert_eq!(send.len(), 2);
    for cp in &send {
        let expected = if *cp.class() == s.spam { 1.0 / 3.0 } else { 2.0 / 3.0 };
        assert!(close(cp.probability(), expected), "{cp}");
    }
}

#[test]
fn probabilities_are_bounded_and_normalized() {
    let s = scenario();
    let naive = NaiveClassifier::new(s.training.clone());
    let complement = ComplementNaiveClassifier::new(s.training.clone());

    let tokens = SPAM.iter().chain(HAM.iter()).copied().chain(["unseen"]);
    for token in tokens {
        for alpha in [0.001, 0.01, 0.5, 1.0, 10.0] {
            for cps in [
                naive.calculate_probabilities(&token, Some(alpha)).unwrap(),
                complement.calculate_probabilities(&token, Some(alpha)).unwrap(),
            ] {
                let sum: f64 = cps.iter().map(|cp| cp.probability()).sum();
                assert!((sum - 1.0).abs() < 1e-6, "{token} at {alpha}: {sum}");
                for cp in &cps {
                    assert!((0.0..=1.0 + 1e-6).contains(&cp.probability()), "{cp}");
                }
            }
        }
    }
}

#[test]
fn training_updates_are_visible_to_classifiers() {
    let s = scenario();
    let classifier = NaiveClassifier::new(s.training.clone());

    // spam 1/7 against ham 1/6 after removing one "send" from ham
    assert!(s.ham_set.remove_token_once(&"send"));
    let p = classifier.calculate_probability(&s.spam, &"send", Some(0.0)).unwrap();
    assert!(close(p, 6.0 / 13.0), "{p}");

    s.spam_set.purge_token(&"money");
    let p = classifier.calculate_probability(&s.ham, &"money", Some(0.0)).unwrap();
    assert!(close(p, 1.0));
}

#[test]
fn registration_rules() {
    let s = scenario();

    let again = Arc::new(DataSet::new(s.spam.clone()));
    assert!(matches!(
        s.training.add(again),
        Err(ClassifierError::DuplicateClass { .. })
    ));

    let other = TrainingSet::new();
    assert!(matches!(
        other.add(Arc::clone(&s.spam_set)),
        Err(ClassifierError::AlreadyAttached { .. })
    ));

    let eggs = Class::new("eggs", 0.1).unwrap();
    assert!(matches!(
        s.training.get_set_for_class(&eggs),
        Err(ClassifierError::UnknownClass { .. })
    ));
    let names: Vec<_> = s.training.classes().iter().map(|c| c.name().to_string()).collect();
    assert_eq!(names, ["ham", "spam"]);
}

#[test]
fn automatic_priors_follow_vocabulary() {
    let s = scenario();
    s.training
        .set_class_probabilities(ClassProbabilities::Automatic, 1.0)
        .unwrap();
    assert!(close(s.spam.probability(), 7.0 / 13.0));
    assert!(close(s.ham.probability(), 6.0 / 13.0));

    s.training
        .set_class_probabilities(ClassProbabilities::EqualDistributed, 1.0)
        .unwrap();
    assert!(close(s.spam.probability(), 0.5));
    assert!(close(s.ham.probability(), 0.5));
}

#[test]
fn documents_are_classified() {
    let s = scenario();
    let classifier = NaiveClassifier::new(s.training.clone());

    let spammy = classifier.classify(&["rolex", "prince", "money"], None).unwrap().unwrap();
    assert_eq!(spammy.class(), &s.spam);
    assert_eq!(spammy.token_probabilities().len(), 3);

    let hammy = classifier.classify(&["love", "flowers", "send"], None).unwrap().unwrap();
    assert_eq!(hammy.class(), &s.ham);

    assert!(classifier.classify(&[], None).unwrap().is_none());
    assert!(classifier.calculate_document_probabilities(&[], None).unwrap().is_empty());
}

#[test]
fn configuration_file_drives_the_classifier() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("classifier.toml");
    std::fs::write(
        &path,
        "smoothing_alpha = 0.0\n\n[correction]\nkind = \"beta\"\nbackground_information_strength = 3.0\n",
    )
    .unwrap();
    let config = ClassifierConfig::load(&path).unwrap();

    let s = scenario();
    let classifier = NaiveClassifier::with_config(s.training.clone(), &config).unwrap();
    // (3 * 0.5 + 1 * 1.0) / (3 + 1)
    let p = classifier.calculate_probability(&s.spam, &"rolex", None).unwrap();
    assert!(close(p, 0.625), "{p}");
}

#[test]
fn occurrence_threshold_from_configuration() {
    let config = ClassifierConfig::from_toml_str("occurrence_threshold = 1\nsmoothing_alpha = 0.0").unwrap();
    let s = scenario();
    let classifier = NaiveClassifier::with_config(s.training.clone(), &config).unwrap();
    assert_eq!(s.training.occurrence_threshold(), 1);

    // spam's single "send" no longer counts, ham's two do
    let p = classifier.calculate_probability(&s.ham, &"send", None).unwrap();
    assert!(close(p, 1.0));
    let send = classifier.calculate_probabilities(&"send", None).unwrap();
    let spam = send.iter().find(|cp| *cp.class() == s.spam).unwrap();
    assert_eq!(spam.occurrence(), 0);
}

#[test]
fn complement_classifier_on_three_classes() {
    let s = scenario();
    let eggs = Class::new("eggs", 0.5).unwrap();
    s.training
        .create_data_set(eggs.clone())
        .unwrap()
        .add_tokens(["bacon", "toast", "beans", "send"]);
    s.training
        .set_class_probabilities(ClassProbabilities::EqualDistributed, 1.0)
        .unwrap();

    let classifier = ComplementNaiveClassifier::new(s.training.clone());
    let best = classifier
        .classify(&["bacon", "toast", "beans"], Some(1.0))
        .unwrap()
        .unwrap();
    assert_eq!(best.class(), &eggs);

    let p = classifier.calculate_probability(&eggs, &"bacon", None).unwrap();
    assert!((0.0..=1.0).contains(&p));
}
