mod common;

use std::sync::Arc;

use common::{cost, revenue, scenario, TestHome};
use rust_decimal_macros::dec;
use scenario_core::currency::FormatSettings;
use scenario_core::engine::{ComparisonResult, ScenarioComparator};
use scenario_core::narrative::{
    parse_template_response, BriefNarrator, NarrativeCollaborator, NarrativeError,
};
use scenario_core::storage::{JsonScenarioStore, ScenarioSource};
use scenario_core::EngineError;

struct FailingNarrator;

impl NarrativeCollaborator for FailingNarrator {
    fn narrate_comparison(&self, _comparison: &ComparisonResult) -> Result<String, NarrativeError> {
        Err(NarrativeError::Collaborator("quota exceeded".into()))
    }

    fn draft_scenario(&self, _description: &str) -> Result<String, NarrativeError> {
        Err(NarrativeError::Collaborator("quota exceeded".into()))
    }
}

#[test]
fn stored_scenarios_compare_like_in_memory_ones() {
    let home = TestHome::new();
    let store = JsonScenarioStore::new(home.path().join("scenarios")).unwrap();
    let lean = scenario("Lean", Some(dec!(300000)), [cost("Engineer", dec!(150000), 1)]);
    let bold = scenario(
        "Bold",
        Some(dec!(300000)),
        [
            cost("Engineer", dec!(150000), 1),
            cost("Designer", dec!(110000), 4),
            revenue("MRR", dec!(90000), 3),
        ],
    );
    store.save_snapshot(&lean, "lean").unwrap();
    store.save_snapshot(&bold, "bold").unwrap();
    assert_eq!(store.list_keys().unwrap(), vec!["bold", "lean"]);

    let comparator = ScenarioComparator::new();
    let from_disk = comparator
        .compare(
            &store.load_snapshot("lean").unwrap(),
            &store.load_snapshot("bold").unwrap(),
        )
        .unwrap();
    let in_memory = comparator.compare(&lean, &bold).unwrap();
    assert_eq!(from_disk.left.metrics, in_memory.left.metrics);
    assert_eq!(from_disk.right.metrics, in_memory.right.metrics);
    assert_eq!(from_disk.delta, in_memory.delta);
}

#[test]
fn documents_written_by_hand_are_validated() {
    let home = TestHome::new();
    let path = home.write_file(
        "plan.json",
        r#"{
            "name": "Hand written",
            "funding": "200000",
            "costs": [{"title": "Rent", "value": "24000", "starts_at": 1, "freq": "monthly"}],
            "revenues": [{"title": "Pilot", "value": "12000", "starts_at": 6, "end_at": 9}]
        }"#,
    );
    let store = JsonScenarioStore::new(home.path().join("scenarios")).unwrap();
    let snapshot = store.load_snapshot_from_path(&path).unwrap();
    assert_eq!(snapshot.costs()[0].category(), "Other");
    assert_eq!(snapshot.revenues()[0].end_at(), Some(9));

    let inverted = home.write_file(
        "bad.json",
        r#"{"name": "Bad", "costs": [{"title": "Rent", "value": "1", "starts_at": 6, "end_at": 2}]}"#,
    );
    assert!(matches!(
        store.load_snapshot_from_path(&inverted),
        Err(EngineError::Serde(_))
    ));
}

#[test]
fn collaborator_failures_surface_unchanged() {
    let lean = scenario("Lean", None, [cost("Engineer", dec!(150000), 1)]);
    let err = ScenarioComparator::new()
        .with_narrator(Arc::new(FailingNarrator))
        .compare_and_narrate(&lean, &lean)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Narrative(NarrativeError::Collaborator(ref reason)) if reason == "quota exceeded"
    ));
}

#[test]
fn brief_narrator_describes_the_comparison() {
    let lean = scenario("Lean", Some(dec!(90000)), [cost("Engineer", dec!(120000), 1)]);
    let narrated = ScenarioComparator::new()
        .with_narrator(Arc::new(BriefNarrator::new(FormatSettings::default())))
        .compare_and_narrate(&lean, &lean)
        .unwrap();
    assert!(narrated.narrative.contains("Runway: 9 months"));
    assert!(narrated.narrative.contains("Differences (B minus A):"));
    assert!(BriefNarrator::default().draft_scenario("two engineers").is_err());
}

#[test]
fn drafted_template_round_trips_through_the_store() {
    let reply = "```json\n{\"scenario\":{\"name\":\"Drafted\",\"funding\":0},\"costs\":[{\"title\":\"Engineer\",\"value\":\"150000\",\"category\":\"Engineering\",\"starts_at\":\"1\",\"end_at\":\"\",\"freq\":\"annual\"}],\"revenues\":[]}\n```";
    let snapshot = parse_template_response(reply)
        .unwrap()
        .into_snapshot()
        .unwrap();

    let home = TestHome::new();
    let store = JsonScenarioStore::new(home.path()).unwrap();
    let key = store.save_snapshot(&snapshot, "Drafted").unwrap();
    let loaded = store.load_snapshot(&key).unwrap();
    assert_eq!(loaded.identity(), snapshot.identity());
    assert_eq!(loaded.costs(), snapshot.costs());
    assert_eq!(loaded.funding(), Some(dec!(0)));
}
