use std::collections::HashMap;

use chrono::{Duration, TimeZone, Utc};
use marginwatch_alerts::registry::RegistryState;
use marginwatch_core::config::NotificationConfig;
use marginwatch_core::models::{AccountSnapshot, CardStatus};
use proptest::prelude::*;

const LPS: [&str; 3] = ["LP-A", "LP-B", "LP-C"];

#[derive(Debug, Clone)]
enum Op {
    Snapshot(usize, f64),
    Advance(i64),
    Sweep,
    Ignore(usize, i64),
    Override(usize, CardStatus),
}

fn op() -> impl Strategy<Value = Op> {
    let status = prop::sample::select(CardStatus::ALL.to_vec());
    prop_oneof![
        6 => (0..LPS.len(), 0.0f64..60.0).prop_map(|(lp, m)| Op::Snapshot(lp, m)),
        2 => (1i64..1200).prop_map(Op::Advance),
        2 => Just(Op::Sweep),
        1 => (0usize..8, 1i64..30).prop_map(|(pick, mins)| Op::Ignore(pick, mins)),
        1 => (0usize..8, status).prop_map(|(pick, s)| Op::Override(pick, s)),
    ]
}

fn pick_card(state: &RegistryState, pick: usize) -> Option<String> {
    let mut ids: Vec<String> = state.cards().map(|c| c.id.clone()).collect();
    ids.sort();
    if ids.is_empty() {
        None
    } else {
        Some(ids[pick % ids.len()].clone())
    }
}

proptest! {
    #[test]
    fn at_most_one_active_card_per_lp(ops in prop::collection::vec(op(), 1..80)) {
        let mut state = RegistryState::new(30.0, 25.0);
        let config = NotificationConfig::default();
        let mut now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        for op in ops {
            match op {
                Op::Snapshot(lp, margin) => {
                    state.apply_batch(&[AccountSnapshot::new(LPS[lp], margin)], now);
                }
                Op::Advance(secs) => now += Duration::seconds(secs),
                Op::Sweep => {
                    state.sweep_notifications(&config, now);
                }
                Op::Ignore(pick, mins) => {
                    if let Some(id) = pick_card(&state, pick) {
                        let _ = state.ignore(&id, now + Duration::minutes(mins), now);
                    }
                }
                Op::Override(pick, status) => {
                    if let Some(id) = pick_card(&state, pick) {
                        let _ = state.override_status(&id, status, None, now);
                    }
                }
            }

            for lp in LPS {
                let active = state.active_count_for(lp);
                prop_assert!(active <= 1, "{} has {} active cards", lp, active);
                prop_assert_eq!(state.active_card_for(lp).is_some(), active == 1);
            }
        }
    }

    #[test]
    fn automated_paths_never_touch_terminal_cards(
        margins in prop::collection::vec((0..LPS.len(), 0.0f64..60.0, 0i64..600), 1..60)
    ) {
        let mut state = RegistryState::new(30.0, 25.0);
        let config = NotificationConfig::default();
        let mut now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut closed: HashMap<String, usize> = HashMap::new();

        for (lp, margin, advance) in margins {
            now += Duration::seconds(advance);
            state.apply_batch(&[AccountSnapshot::new(LPS[lp], margin)], now);
            state.sweep_notifications(&config, now);

            for card in state.cards() {
                if let Some(len) = closed.get(&card.id) {
                    prop_assert_eq!(*len, card.history.len(), "closed card {} changed", card.id);
                } else if card.status.is_terminal() {
                    closed.insert(card.id.clone(), card.history.len());
                }
            }
        }
    }

    #[test]
    fn hysteresis_band_never_opens_or_closes(margins in prop::collection::vec(25.01f64..29.99, 1..40)) {
        let mut state = RegistryState::new(30.0, 25.0);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        // No card is ever opened from inside the band.
        for m in &margins {
            let outcome = state.apply_batch(&[AccountSnapshot::new("LP-A", *m)], now);
            prop_assert!(outcome.created.is_empty());
        }

        // An open card is never resolved from inside the band.
        state.apply_batch(&[AccountSnapshot::new("LP-A", 31.0)], now);
        for m in &margins {
            let outcome = state.apply_batch(&[AccountSnapshot::new("LP-A", *m)], now);
            prop_assert!(outcome.resolved.is_empty());
        }
        prop_assert_eq!(state.active_count_for("LP-A"), 1);
        prop_assert_eq!(state.len(), 1);
    }
}
