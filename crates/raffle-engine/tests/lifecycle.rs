//! End-to-end raffle lifecycle through the service facade.

mod common;

use std::sync::Arc;

use proptest::prelude::*;

use raffle_engine::{FixedEntropy, RaffleError, SeededEntropy};
use raffle_state::RaffleStatus;
use raffle_store::{NewParticipation, ParticipationRepository, RaffleConfiguration, UserRole};

use common::Harness;

#[test]
fn create_activate_enter_select() {
    let h = Harness::new(Arc::new(SeededEntropy::new(1)));
    let raffle = h.raffle(RaffleConfiguration::random());
    assert_eq!(raffle.status, RaffleStatus::Draft);

    let active = h.service.activate_raffle(raffle.id).unwrap();
    assert_eq!(active.status, RaffleStatus::Active);

    let user = h.user("entrant@example.com", UserRole::Client);
    h.service.participate(raffle.id, user, None).unwrap();

    let done = h.service.select_winner(raffle.id).unwrap();
    assert_eq!(done.status, RaffleStatus::Completed);
    assert_eq!(done.winner_id, Some(user));
    assert_eq!(h.service.list_participants(raffle.id).unwrap().len(), 1);

    let log: Vec<_> = done
        .transition_log
        .iter()
        .map(|t| (t.from_state, t.to_state))
        .collect();
    assert_eq!(
        log,
        vec![
            (RaffleStatus::Draft, RaffleStatus::Active),
            (RaffleStatus::Active, RaffleStatus::Completed),
        ]
    );
}

#[test]
fn entropy_index_one_picks_second_entry() {
    let h = Harness::new(Arc::new(FixedEntropy(1)));
    let raffle = h.active_raffle(RaffleConfiguration::random());
    let u1 = h.user("u1@example.com", UserRole::Client);
    let u2 = h.user("u2@example.com", UserRole::Client);
    // Admission discards numbers on random raffles; seed the rows directly.
    for (user, number) in [(u1, "001"), (u2, "002")] {
        h.store
            .insert_unique(NewParticipation {
                raffle_id: raffle.id,
                user_id: user,
                selected_number: Some(number.to_string()),
            })
            .unwrap();
    }

    let done = h.service.select_winner(raffle.id).unwrap();
    assert_eq!(done.winner_id, Some(u2));
    assert_eq!(done.winner_number.as_deref(), Some("002"));
    assert_eq!(done.status, RaffleStatus::Completed);
}

#[test]
fn entries_refused_outside_active() {
    let h = Harness::new(Arc::new(FixedEntropy(0)));
    let user = h.user("late@example.com", UserRole::Client);

    let draft = h.raffle(RaffleConfiguration::random());
    let cancelled = h.raffle(RaffleConfiguration::random());
    h.service.cancel_raffle(cancelled.id, None).unwrap();
    let completed = h.active_raffle(RaffleConfiguration::random());
    let early = h.user("early@example.com", UserRole::Client);
    h.service.participate(completed.id, early, None).unwrap();
    h.service.select_winner(completed.id).unwrap();

    for (raffle, status) in [
        (draft.id, RaffleStatus::Draft),
        (cancelled.id, RaffleStatus::Cancelled),
        (completed.id, RaffleStatus::Completed),
    ] {
        assert_eq!(
            h.service.participate(raffle, user, None).unwrap_err(),
            RaffleError::RaffleNotActive { status }
        );
    }
}

#[test]
fn repeated_selection_leaves_winner_untouched() {
    let h = Harness::new(Arc::new(SeededEntropy::new(9)));
    let raffle = h.active_raffle(RaffleConfiguration::random());
    for i in 0..3 {
        let user = h.user(&format!("u{i}@example.com"), UserRole::Client);
        h.service.participate(raffle.id, user, None).unwrap();
    }
    let first = h.service.select_winner(raffle.id).unwrap();
    assert_eq!(
        h.service.select_winner(raffle.id).unwrap_err(),
        RaffleError::WinnerAlreadySelected
    );
    assert_eq!(
        h.service.cancel_raffle(raffle.id, None).unwrap_err().code(),
        "InvalidTransition"
    );
    let after = h.service.get_raffle(raffle.id).unwrap();
    assert_eq!(after.winner_id, first.winner_id);
    assert_eq!(after.winner_number, first.winner_number);
    assert_eq!(after.status, RaffleStatus::Completed);
}

#[test]
fn numbered_raffle_end_to_end() {
    let h = Harness::new(Arc::new(FixedEntropy(0)));
    let raffle = h.active_raffle(RaffleConfiguration::selection_number(500, Some(3), false));
    let a = h.user("a@example.com", UserRole::Client);
    let b = h.user("b@example.com", UserRole::Client);
    h.service.participate(raffle.id, a, Some("7")).unwrap();
    h.service.participate(raffle.id, b, Some("250")).unwrap();

    assert_eq!(
        h.service.select_winner(raffle.id).unwrap_err(),
        RaffleError::WinningNumberUnavailable
    );
    let done = h.service.select_winner_with_number(raffle.id, "007").unwrap();
    assert_eq!(done.winner_id, Some(a));
    assert_eq!(done.winner_number.as_deref(), Some("007"));
}

#[derive(Debug, Clone)]
enum Op {
    Activate,
    Cancel,
    Enter(usize),
    Select,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Activate),
        Just(Op::Cancel),
        (0usize..4).prop_map(Op::Enter),
        Just(Op::Select),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any sequence of operations keeps the raffle invariants: legal status
    /// path, winner iff completed, one entry per user, and no entries after
    /// the raffle closes.
    #[test]
    fn operation_sequences_keep_invariants(ops in prop::collection::vec(op(), 0..24), seed in any::<u64>()) {
        let h = Harness::new(Arc::new(SeededEntropy::new(seed)));
        let raffle = h.raffle(RaffleConfiguration::random());
        let users: Vec<_> = (0..4)
            .map(|i| h.user(&format!("p{i}@example.com"), UserRole::Client))
            .collect();

        let mut winner = None;
        for op in ops {
            let before = h.service.get_raffle(raffle.id).unwrap();
            let entries_before = h.service.list_participants(raffle.id).unwrap().len();
            match op {
                Op::Activate => { let _ = h.service.activate_raffle(raffle.id); }
                Op::Cancel => { let _ = h.service.cancel_raffle(raffle.id, None); }
                Op::Enter(i) => { let _ = h.service.participate(raffle.id, users[i], None); }
                Op::Select => { let _ = h.service.select_winner(raffle.id); }
            }
            let after = h.service.get_raffle(raffle.id).unwrap();
            let entries_after = h.service.list_participants(raffle.id).unwrap();

            prop_assert!(after.status == before.status || before.status.can_transition_to(after.status));
            prop_assert_eq!(after.winner_id.is_some(), after.status == RaffleStatus::Completed);
            if let Some(w) = winner {
                prop_assert_eq!(after.winner_id, Some(w));
            }
            winner = after.winner_id;
            if before.status != RaffleStatus::Active {
                prop_assert_eq!(entries_after.len(), entries_before);
            }
            let mut seen: Vec<_> = entries_after.iter().map(|p| p.user_id).collect();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), entries_after.len());
        }
    }
}
