// tests/property_edges.rs

use std::time::Duration;

use castwatch::probe::LiveStatus;
use castwatch::types::ChannelSlot;
use castwatch::watch::{ChannelWatch, WatchEventKind};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Outcome {
    Live,
    Offline,
    OfflineDiagnostic,
    Error,
}

fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Live),
        Just(Outcome::Offline),
        Just(Outcome::OfflineDiagnostic),
        Just(Outcome::Error),
    ]
}

fn status(outcome: &Outcome) -> LiveStatus {
    match outcome {
        Outcome::Live => LiveStatus::live(None),
        Outcome::Offline => LiveStatus::offline(),
        Outcome::OfflineDiagnostic => LiveStatus::failed("ERROR: foo is not currently live"),
        Outcome::Error => LiveStatus::failed("exit code 1"),
    }
}

/// Liveness as far as authoritative answers go; errors carry the previous value.
fn authoritative(outcome: &Outcome, prev: bool) -> bool {
    match outcome {
        Outcome::Live => true,
        Outcome::Offline | Outcome::OfflineDiagnostic => false,
        Outcome::Error => prev,
    }
}

proptest! {
    #[test]
    fn edges_match_changes_in_authoritative_liveness(
        outcomes in proptest::collection::vec(outcome(), 0..40)
    ) {
        let mut watch = ChannelWatch::new(ChannelSlot::new(1).unwrap(), Duration::from_secs(60));
        watch.begin("foo").unwrap();

        let mut live = false;
        for o in &outcomes {
            let next = authoritative(o, live);
            let kind = watch.observe(&status(o));
            match (live, next) {
                (false, true) => prop_assert!(
                    matches!(kind, WatchEventKind::WentLive { .. }),
                    "expected WentLive, got {:?}",
                    kind
                ),
                (true, false) => prop_assert_eq!(kind, WatchEventKind::WentOffline),
                _ => prop_assert!(!kind.is_edge(), "unexpected edge {:?}", kind),
            }
            live = next;
            prop_assert_eq!(watch.was_live(), live);
        }
    }

    #[test]
    fn edges_alternate_starting_with_live(
        outcomes in proptest::collection::vec(outcome(), 0..40)
    ) {
        let mut watch = ChannelWatch::new(ChannelSlot::new(3).unwrap(), Duration::from_secs(60));
        watch.begin("foo").unwrap();

        let edges: Vec<_> = outcomes
            .iter()
            .map(|o| watch.observe(&status(o)))
            .filter(WatchEventKind::is_edge)
            .collect();

        for (i, edge) in edges.iter().enumerate() {
            if i % 2 == 0 {
                prop_assert!(
                    matches!(edge, WatchEventKind::WentLive { .. }),
                    "edge {} should be WentLive, got {:?}",
                    i,
                    edge
                );
            } else {
                prop_assert_eq!(edge, &WatchEventKind::WentOffline);
            }
        }
    }
}
