use mts_ai::SearchConfig;
use mts_simulator::scenario::Status;
use mts_tools::{run_match, Archetype, MatchSettings};
use test_log::test;

fn quick_settings() -> MatchSettings {
    MatchSettings {
        search: SearchConfig {
            iteration_budget: 20,
            ..Default::default()
        },
        max_ticks: 90,
        ..Default::default()
    }
}

#[test]
fn test_match_is_reproducible() {
    let settings = quick_settings();
    let a = run_match(2, &settings).unwrap();
    let b = run_match(2, &settings).unwrap();
    assert_eq!(a, b);
    assert!(a.ticks <= settings.max_ticks);
    assert_ne!(a.status, Status::Running);
}

#[test]
fn test_threaded_matches_inline() {
    let inline = quick_settings();
    let threaded = MatchSettings {
        threaded: true,
        ..quick_settings()
    };
    assert_eq!(
        run_match(5, &inline).unwrap(),
        run_match(5, &threaded).unwrap()
    );
}

#[test]
fn test_mixed_archetypes() {
    let settings = MatchSettings {
        opponent: Archetype::Hover,
        ..quick_settings()
    };
    let result = run_match(9, &settings).unwrap();
    assert!(result.ticks > 0);
}
