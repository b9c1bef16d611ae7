// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end delivery behaviour: host callbacks driven by the in-memory
// service through the public `GameCenter` surface.

use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use chrono::Utc;
use kitbridge_bridge::entity::{AchievementDescription, Player, SavedGame};
use kitbridge_bridge::memory::{Fault, InMemoryGameKit, StoredGame};
use kitbridge_bridge::native::*;
use kitbridge_bridge::{Bridge, Callable, CallbackShape, GameCenter, HostQueue, Operation};
use kitbridge_core::marshal::{FromVariant, ToVariant};
use kitbridge_core::{BridgeConfig, BridgeError, NativeError, PackedBytes, Variant};

struct Host {
    queue: HostQueue,
    service: Arc<InMemoryGameKit>,
    center: GameCenter,
    calls: Arc<Mutex<Vec<(ThreadId, Vec<Variant>)>>>,
}

impl Host {
    fn new() -> Self {
        let config = BridgeConfig {
            simulated_latency_ms: 2,
            ..Default::default()
        };
        let queue = HostQueue::new();
        let service = Arc::new(InMemoryGameKit::with_sample_data(&config).expect("service"));
        let center = GameCenter::new(service.clone(), Bridge::new(queue.handle(), &config));
        Self {
            queue,
            service,
            center,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn callback(&self) -> Callable {
        let sink = Arc::clone(&self.calls);
        Callable::new(move |args| {
            sink.lock()
                .expect("lock")
                .push((thread::current().id(), args))
        })
    }

    /// Pump until one callback ran, then give stragglers a chance to show up.
    fn settle(&self) -> Vec<Vec<Variant>> {
        self.queue
            .pump_for(1, Duration::from_secs(5))
            .expect("pump");
        thread::sleep(Duration::from_millis(30));
        self.queue.pump().expect("pump");
        let calls = std::mem::take(&mut *self.calls.lock().expect("lock"));
        let host = thread::current().id();
        assert!(calls.iter().all(|(id, _)| *id == host), "callback ran off the host thread");
        calls.into_iter().map(|(_, args)| args).collect()
    }

    fn seed_saved_game(&self) -> SavedGame {
        let meta = SavedGameHandle::new(SavedGameRecord {
            name: "slot".into(),
            device_name: "test".into(),
            modification_date: Utc::now(),
        });
        self.service.with_state(|s| {
            s.saved_games.push(StoredGame {
                meta: meta.clone(),
                data: vec![1, 2, 3],
            })
        });
        SavedGame::wrap(meta)
    }

    fn invoke(&self, operation: Operation) {
        let cb = self.callback();
        let c = &self.center;
        match operation {
            Operation::ReportAchievements => {
                let a = c
                    .new_achievement(&Variant::String("x".into()), &Variant::Nil)
                    .expect("achievement");
                c.report_achievements(&[Variant::object(a)], cb)
            }
            Operation::ResetAchievements => c.reset_achievements(cb),
            Operation::LoadAchievements => c.load_achievements(cb),
            Operation::LoadAchievementDescriptions => c.load_achievement_descriptions(cb),
            Operation::LoadAchievementImage => {
                let desc = self.service.with_state(|s| s.descriptions[0].clone()).expect("desc");
                c.load_image(&AchievementDescription::wrap(desc), cb)
            }
            Operation::LoadFriends => c.load_friends(cb),
            Operation::LoadChallengeableFriends => c.load_challengeable_friends(cb),
            Operation::LoadRecentPlayers => c.load_recent_players(cb),
            Operation::FetchIdentityVerificationItems => {
                c.fetch_items_for_identity_verification_signature(cb)
            }
            Operation::LoadLeaderboards => c.load_leaderboards(&Variant::Nil, cb).expect("ids"),
            Operation::LoadLeaderboardSets => c.load_leaderboard_sets(cb),
            Operation::SubmitScore => c.submit_score(10, 0, &["high_score".into()], cb),
            Operation::FetchSavedGames => c.fetch_saved_games(cb),
            Operation::LoadSavedGameData => c.load_data(&self.seed_saved_game(), cb),
            Operation::SaveGameData => c.save_game_data(&PackedBytes::copy_from(b"s"), "slot", cb),
            Operation::DeleteSavedGames => c.delete_saved_games("slot", cb),
        }
    }
}

fn assert_shape(operation: Operation, args: &[Variant]) {
    let shape = operation.shape();
    assert_eq!(args.len(), shape.arity(), "{}", operation.name());
    let error = args.last().expect("error slot");
    match error {
        Variant::Nil => {
            if let Some(payload) = args.first().filter(|_| shape.arity() == 2) {
                assert!(shape.accepts(payload), "{} success payload {payload:?}", operation.name());
            }
        }
        Variant::String(message) => {
            assert!(!message.is_empty(), "{}", operation.name());
            if let Some(empty) = shape.empty_payload() {
                assert_eq!(args[0], empty, "{}", operation.name());
            }
        }
        other => panic!("{}: error slot holds {other:?}", operation.name()),
    }
}

/// A success carrying no native payload must not invent values: lists are
/// empty and every mapping entry is nil.
fn assert_nothing_invented(operation: Operation, args: &[Variant]) {
    if args.last() != Some(&Variant::Nil) || args.len() < 2 {
        return;
    }
    match &args[0] {
        Variant::Array(items) => assert!(items.is_empty(), "{}", operation.name()),
        Variant::Dictionary(mapping) => {
            for (key, value) in mapping.iter() {
                assert_eq!(value, &Variant::Nil, "{}: {key}", operation.name());
            }
        }
        other => panic!("{}: invented {other:?}", operation.name()),
    }
}

fn boom() -> NativeError {
    NativeError::new("GKErrorDomain", 3).with_description("boom")
}

#[test]
fn every_operation_calls_back_exactly_once_with_its_shape() {
    let outcomes: Vec<Option<Fault>> = vec![
        None,
        Some(Fault::Fail(boom())),
        Some(Fault::FailWithPayload(boom())),
        Some(Fault::Empty),
        Some(Fault::Drop),
        Some(Fault::FireTwice),
    ];
    for operation in Operation::ALL {
        for outcome in &outcomes {
            let host = Host::new();
            if let Some(fault) = outcome {
                host.service.inject_fault(operation, fault.clone());
            }
            host.invoke(operation);
            let calls = host.settle();
            assert_eq!(calls.len(), 1, "{} with {outcome:?}", operation.name());
            assert_shape(operation, &calls[0]);
            if matches!(outcome, Some(Fault::Fail(_) | Fault::FailWithPayload(_))) {
                assert_eq!(calls[0].last(), Some(&Variant::String("boom".into())));
            }
            if matches!(outcome, Some(Fault::Empty)) {
                assert_nothing_invented(operation, &calls[0]);
            }
        }
    }
}

#[test]
fn error_wins_over_payload() {
    let host = Host::new();
    host.service
        .inject_fault(Operation::LoadFriends, Fault::FailWithPayload(boom()));
    host.center.load_friends(host.callback());
    assert_eq!(
        host.settle(),
        vec![vec![Variant::Array(Vec::new()), Variant::String("boom".into())]]
    );
}

#[test]
fn list_loads_keep_non_null_entries_in_order() {
    let host = Host::new();
    let names = ["a", "b", "c", "d"];
    host.service.with_state(|s| {
        s.recent_players = vec![
            None,
            Some(PlayerHandle::new(PlayerRecord::new("1", names[0]))),
            Some(PlayerHandle::new(PlayerRecord::new("2", names[1]))),
            None,
            None,
            Some(PlayerHandle::new(PlayerRecord::new("3", names[2]))),
            Some(PlayerHandle::new(PlayerRecord::new("4", names[3]))),
        ]
    });
    host.center.load_recent_players(host.callback());
    let calls = host.settle();
    let aliases: Vec<String> = calls[0][0]
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v.downcast::<Player>().expect("player").alias())
        .collect();
    assert_eq!(aliases, names);
}

#[test]
fn bytes_survive_the_host_buffer() {
    let samples: Vec<Vec<u8>> = vec![
        Vec::new(),
        vec![0],
        vec![0xFF; 3],
        (0..=255).collect(),
        b"\0embedded\0nul".to_vec(),
    ];
    for bytes in samples {
        let variant = bytes.as_slice().to_variant();
        let back = PackedBytes::from_variant(&variant).expect("bytes");
        assert_eq!(back.as_slice(), bytes.as_slice());

        let host = Host::new();
        host.center
            .save_game_data(&PackedBytes::copy_from(&bytes), "slot", host.callback());
        let saved = host.settle()[0][0].downcast::<SavedGame>().expect("saved game");
        host.center.load_data(&saved, host.callback());
        let calls = host.settle();
        let mapping = calls[0][0].as_dictionary().expect("mapping");
        assert_eq!(
            mapping.get("data").and_then(Variant::as_bytes),
            Some(bytes.as_slice())
        );
    }
}

#[test]
fn scenario_bulk_load_of_three_entities() {
    let host = Host::new();
    host.service.with_state(|s| {
        s.friends = (0..3)
            .map(|i| Some(PlayerHandle::new(PlayerRecord::new(i.to_string(), format!("p{i}")))))
            .collect()
    });
    host.center.load_friends(host.callback());
    let calls = host.settle();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 2);
    let list = calls[0][0].as_array().expect("array");
    assert_eq!(list.len(), 3);
    assert!(list.iter().all(|v| v.downcast::<Player>().is_some()));
    assert_eq!(calls[0][1], Variant::Nil);
}

#[test]
fn scenario_bulk_load_failure_delivers_empty_list() {
    let host = Host::new();
    host.service.inject_fault(
        Operation::LoadAchievements,
        Fault::Fail(NativeError::new("NSURLErrorDomain", -1009).with_description("network unavailable")),
    );
    host.center.load_achievements(host.callback());
    assert_eq!(
        host.settle(),
        vec![vec![
            Variant::Array(Vec::new()),
            Variant::String("network unavailable".into())
        ]]
    );
}

#[test]
fn scenario_identity_items_with_missing_salt() {
    let host = Host::new();
    host.service.with_state(|s| {
        s.identity = Some(IdentityVerificationItems {
            public_key_url: Some("https://example.com/key.cer".into()),
            signature: Some(vec![1, 2, 3]),
            salt: None,
            timestamp: Some(123_456),
        })
    });
    host.center
        .fetch_items_for_identity_verification_signature(host.callback());
    let calls = host.settle();
    assert_eq!(calls[0][1], Variant::Nil);
    let json = serde_json::to_value(&calls[0][0]).expect("json");
    assert_eq!(
        json,
        serde_json::json!({
            "url": "https://example.com/key.cer",
            "data": [1, 2, 3],
            "salt": null,
            "timestamp": 123456
        })
    );
}

#[test]
fn scenario_identity_items_failure() {
    let host = Host::new();
    host.service
        .inject_fault(Operation::FetchIdentityVerificationItems, Fault::Fail(boom()));
    host.center
        .fetch_items_for_identity_verification_signature(host.callback());
    let calls = host.settle();
    assert_eq!(calls[0][0].as_dictionary().map(|d| d.len()), Some(0));
    assert!(calls[0][1].as_str().is_some_and(|s| !s.is_empty()));
}

#[test]
fn scenario_missing_identifier_is_rejected_before_any_callback() {
    let host = Host::new();
    let err = host
        .center
        .new_achievement(&Variant::Nil, &Variant::Nil)
        .expect_err("identifier is required");
    assert!(matches!(err, BridgeError::MissingField("identifier")));
    assert_eq!(host.queue.pending(), 0);
    assert!(host.calls.lock().expect("lock").is_empty());
}

#[test]
fn pumping_from_another_thread_is_refused() {
    let host = Host::new();
    host.center.reset_achievements(host.callback());
    let queue = host.queue;
    let result = thread::scope(|scope| {
        scope
            .spawn(|| queue.pump_for(1, Duration::from_millis(10)))
            .join()
            .expect("join")
    });
    assert!(matches!(result, Err(BridgeError::WrongThread)));
}

#[test]
fn error_only_shape_has_a_single_argument() {
    assert_eq!(Operation::SubmitScore.shape(), CallbackShape::ErrorOnly);
    let host = Host::new();
    host.center
        .submit_score(5, 0, &["high_score".into()], host.callback());
    assert_eq!(host.settle(), vec![vec![Variant::Nil]]);
}
