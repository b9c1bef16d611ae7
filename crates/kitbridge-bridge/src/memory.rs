// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory native game service.
//
// Behaves like the platform service from the bridge's point of view:
// completions fire later, on worker threads of a private tokio runtime that
// stands in for the platform's callback queues. Faults can be injected per
// operation to exercise the bridge's failure handling.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use kitbridge_core::error::Result;
use kitbridge_core::{BridgeConfig, LeaderboardKind, NativeError};
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, info, instrument};

use crate::completion::Completion;
use crate::native::*;
use crate::operation::Operation;
use crate::traits::*;

/// Error domain used by the in-memory service.
pub const MEMORY_ERROR_DOMAIN: &str = "KitbridgeMemory";

/// A scripted misbehaviour for one operation.
#[derive(Debug, Clone)]
pub enum Fault {
    /// Complete with this error and no payload.
    Fail(NativeError),
    /// Complete with the normal payload *and* this error.
    FailWithPayload(NativeError),
    /// Complete successfully with neither payload nor error.
    Empty,
    /// Release the completion handler without firing it.
    Drop,
    /// Fire the completion handler twice.
    FireTwice,
}

/// A score accepted by `submit_score`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedScore {
    pub leaderboard_id: String,
    pub score: i64,
    pub context: u64,
    pub game_player_id: String,
}

/// Saved game metadata together with its bytes.
#[derive(Debug, Clone)]
pub struct StoredGame {
    pub meta: SavedGameHandle,
    pub data: Vec<u8>,
}

/// Everything the in-memory service knows. Sequences may hold `None` to
/// mimic platforms that hand back sparse arrays.
#[derive(Debug, Default)]
pub struct GameKitState {
    pub achievements: Vec<Option<AchievementHandle>>,
    pub descriptions: Vec<Option<AchievementDescriptionHandle>>,
    /// Artwork keyed by achievement description identifier.
    pub images: HashMap<String, NativeImage>,
    pub friends: Vec<Option<PlayerHandle>>,
    pub challengeable_friends: Vec<Option<PlayerHandle>>,
    pub recent_players: Vec<Option<PlayerHandle>>,
    pub identity: Option<IdentityVerificationItems>,
    pub leaderboards: Vec<Option<LeaderboardHandle>>,
    pub leaderboard_sets: Vec<Option<LeaderboardSetHandle>>,
    pub scores: Vec<SubmittedScore>,
    pub saved_games: Vec<StoredGame>,
}

/// Scriptable stand-in for the platform game service.
pub struct InMemoryGameKit {
    runtime: Option<Runtime>,
    spawner: Handle,
    latency: Duration,
    local: LocalPlayerHandle,
    device_name: String,
    state: Mutex<GameKitState>,
    faults: Mutex<HashMap<Operation, Fault>>,
}

impl InMemoryGameKit {
    /// Create an empty service for `local`.
    #[instrument(skip_all, fields(workers = config.native_worker_threads))]
    pub fn new(config: &BridgeConfig, local: LocalPlayerHandle) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.native_worker_threads.max(1))
            .thread_name("kitbridge-native")
            .enable_time()
            .build()?;
        info!(
            workers = config.native_worker_threads.max(1),
            latency_ms = config.simulated_latency_ms,
            "in-memory game service started"
        );
        Ok(Self {
            spawner: runtime.handle().clone(),
            runtime: Some(runtime),
            latency: Duration::from_millis(config.simulated_latency_ms),
            local,
            device_name: "kitbridge-memory".into(),
            state: Mutex::new(GameKitState::default()),
            faults: Mutex::new(HashMap::new()),
        })
    }

    /// A service pre-populated with a signed-in player and some content.
    pub fn with_sample_data(config: &BridgeConfig) -> Result<Self> {
        let local = LocalPlayerHandle::new(
            PlayerRecord::new("ada", "Ada"),
            LocalPlayerStatus {
                is_authenticated: true,
                ..Default::default()
            },
        );
        let service = Self::new(config, local.clone())?;
        service.with_state(|state| {
            state.achievements = vec![Some(AchievementHandle::new(AchievementRecord {
                percent_complete: 40.0,
                last_reported_date: Some(Utc::now()),
                ..AchievementRecord::new("first_steps", Some(local.player.clone()))
            }))];
            state.descriptions = vec![
                Some(AchievementDescriptionHandle::new(AchievementDescriptionRecord {
                    identifier: "first_steps".into(),
                    title: "First Steps".into(),
                    unachieved_description: "Finish the tutorial".into(),
                    achieved_description: "You finished the tutorial".into(),
                    maximum_points: 10,
                    rarity_percent: Some(87.5),
                    ..Default::default()
                })),
                None,
                Some(AchievementDescriptionHandle::new(AchievementDescriptionRecord {
                    identifier: "secret_room".into(),
                    title: "???".into(),
                    maximum_points: 50,
                    is_hidden: true,
                    ..Default::default()
                })),
            ];
            state.images.insert(
                "first_steps".into(),
                NativeImage {
                    width: 1,
                    height: 1,
                    png: vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A],
                },
            );
            state.friends = vec![
                Some(PlayerHandle::new(PlayerRecord::new("grace", "Grace"))),
                None,
                Some(PlayerHandle::new(PlayerRecord::new("linus", "Linus"))),
            ];
            state.identity = Some(IdentityVerificationItems {
                public_key_url: Some("https://static.gc.example.com/public-key/gc-prod-10.cer".into()),
                signature: Some(vec![0xDE, 0xAD, 0xBE, 0xEF]),
                salt: None,
                timestamp: Some(1_700_000_000_000),
            });
            state.leaderboards = vec![Some(LeaderboardHandle::new(LeaderboardRecord {
                base_leaderboard_id: "high_score".into(),
                title: "High Score".into(),
                kind: LeaderboardKind::Classic,
                group_identifier: None,
            }))];
            state.leaderboard_sets = vec![Some(LeaderboardSetHandle::new(LeaderboardSetRecord {
                identifier: "main".into(),
                title: "Main".into(),
                group_identifier: None,
            }))];
        });
        Ok(service)
    }

    /// Inspect or change the service's state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut GameKitState) -> R) -> R {
        let mut state = self.state.lock().expect("game state lock poisoned");
        f(&mut state)
    }

    /// Make every future call of `operation` misbehave as `fault`.
    pub fn inject_fault(&self, operation: Operation, fault: Fault) {
        debug!(operation = operation.name(), ?fault, "fault injected");
        self.faults
            .lock()
            .expect("fault lock poisoned")
            .insert(operation, fault);
    }

    pub fn clear_fault(&self, operation: Operation) {
        self.faults
            .lock()
            .expect("fault lock poisoned")
            .remove(&operation);
    }

    fn fault(&self, operation: Operation) -> Option<Fault> {
        self.faults
            .lock()
            .expect("fault lock poisoned")
            .get(&operation)
            .cloned()
    }

    /// Whether `operation` is scripted to report an error or never answer,
    /// in which case state-changing calls leave the state alone.
    fn will_fail(&self, operation: Operation) -> bool {
        matches!(
            self.fault(operation),
            Some(Fault::Fail(_) | Fault::FailWithPayload(_) | Fault::Drop)
        )
    }

    /// Fire `completion` on a worker thread after the configured latency,
    /// applying any fault scripted for `operation`.
    fn settle<T: Send + 'static>(
        &self,
        operation: Operation,
        completion: Completion<T>,
        payload: Option<T>,
        error: Option<NativeError>,
    ) {
        let fault = self.fault(operation);
        let latency = self.latency;
        self.spawner.spawn(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            match fault {
                None => completion.complete(payload, error),
                Some(Fault::Fail(e)) => completion.complete(None, Some(e)),
                Some(Fault::FailWithPayload(e)) => completion.complete(payload, Some(e)),
                Some(Fault::Empty) => completion.complete(None, None),
                Some(Fault::Drop) => drop(completion),
                Some(Fault::FireTwice) => {
                    let shared = completion.into_shared();
                    shared.fire(payload, error);
                    shared.fire(None, Some(NativeError::new(MEMORY_ERROR_DOMAIN, 99)));
                }
            }
        });
    }

    fn not_found(what: &str) -> NativeError {
        NativeError::new(MEMORY_ERROR_DOMAIN, 404).with_description(format!("{what} not found"))
    }
}

impl Drop for InMemoryGameKit {
    fn drop(&mut self) {
        // The last reference may be released on one of the runtime's own
        // workers, where a blocking shutdown would panic. Pending completions
        // are dropped and settle as such.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl GameKitService for InMemoryGameKit {
    fn platform_name(&self) -> &str {
        "In-memory"
    }
}

impl NativeAchievements for InMemoryGameKit {
    fn report_achievements(&self, achievements: Vec<AchievementHandle>, completion: Completion<()>) {
        if !self.will_fail(Operation::ReportAchievements) {
            let now = Utc::now();
            self.with_state(|state| {
                for reported in &achievements {
                    reported.write(|r| r.last_reported_date = Some(now));
                    let id = reported.read(|r| r.identifier.clone());
                    let existing = state
                        .achievements
                        .iter_mut()
                        .flatten()
                        .find(|a| a.read(|r| r.identifier == id));
                    match existing {
                        Some(slot) => *slot = reported.clone(),
                        None => state.achievements.push(Some(reported.clone())),
                    }
                }
            });
        }
        self.settle(Operation::ReportAchievements, completion, Some(()), None);
    }

    fn reset_achievements(&self, completion: Completion<()>) {
        if !self.will_fail(Operation::ResetAchievements) {
            self.with_state(|state| state.achievements.clear());
        }
        self.settle(Operation::ResetAchievements, completion, Some(()), None);
    }

    fn load_achievements(&self, completion: Completion<Vec<Option<AchievementHandle>>>) {
        let list = self.with_state(|state| state.achievements.clone());
        self.settle(Operation::LoadAchievements, completion, Some(list), None);
    }
}

impl NativeAchievementDescriptions for InMemoryGameKit {
    fn load_achievement_descriptions(
        &self,
        completion: Completion<Vec<Option<AchievementDescriptionHandle>>>,
    ) {
        let list = self.with_state(|state| state.descriptions.clone());
        self.settle(Operation::LoadAchievementDescriptions, completion, Some(list), None);
    }

    fn load_description_image(
        &self,
        description: &AchievementDescriptionHandle,
        completion: Completion<NativeImage>,
    ) {
        let id = description.read(|r| r.identifier.clone());
        let image = self.with_state(|state| state.images.get(&id).cloned());
        self.settle(Operation::LoadAchievementImage, completion, image, None);
    }
}

impl NativeLocalPlayer for InMemoryGameKit {
    fn local_player(&self) -> LocalPlayerHandle {
        self.local.clone()
    }

    fn load_friends(&self, completion: Completion<Vec<Option<PlayerHandle>>>) {
        let list = self.with_state(|state| state.friends.clone());
        self.settle(Operation::LoadFriends, completion, Some(list), None);
    }

    fn load_challengeable_friends(&self, completion: Completion<Vec<Option<PlayerHandle>>>) {
        let list = self.with_state(|state| state.challengeable_friends.clone());
        self.settle(Operation::LoadChallengeableFriends, completion, Some(list), None);
    }

    fn load_recent_players(&self, completion: Completion<Vec<Option<PlayerHandle>>>) {
        let list = self.with_state(|state| state.recent_players.clone());
        self.settle(Operation::LoadRecentPlayers, completion, Some(list), None);
    }

    fn fetch_identity_verification_items(&self, completion: Completion<IdentityVerificationItems>) {
        let items = self.with_state(|state| state.identity.clone());
        let error = match (&items, self.local.status.read(|s| s.is_authenticated)) {
            (_, false) => Some(
                NativeError::new(MEMORY_ERROR_DOMAIN, 6)
                    .with_description("the local player is not authenticated"),
            ),
            (None, true) => Some(Self::not_found("identity verification signature")),
            (Some(_), true) => None,
        };
        let items = if error.is_some() { None } else { items };
        self.settle(Operation::FetchIdentityVerificationItems, completion, items, error);
    }
}

impl NativeLeaderboards for InMemoryGameKit {
    fn load_leaderboards(
        &self,
        ids: Option<Vec<String>>,
        completion: Completion<Vec<Option<LeaderboardHandle>>>,
    ) {
        let list = self.with_state(|state| match &ids {
            None => state.leaderboards.clone(),
            Some(ids) => state
                .leaderboards
                .iter()
                .filter(|slot| match slot {
                    Some(board) => board.read(|r| ids.contains(&r.base_leaderboard_id)),
                    None => false,
                })
                .cloned()
                .collect(),
        });
        self.settle(Operation::LoadLeaderboards, completion, Some(list), None);
    }

    fn load_leaderboard_sets(&self, completion: Completion<Vec<Option<LeaderboardSetHandle>>>) {
        let list = self.with_state(|state| state.leaderboard_sets.clone());
        self.settle(Operation::LoadLeaderboardSets, completion, Some(list), None);
    }

    fn submit_score(
        &self,
        score: i64,
        context: u64,
        player: PlayerHandle,
        leaderboard_ids: Vec<String>,
        completion: Completion<()>,
    ) {
        if !self.will_fail(Operation::SubmitScore) {
            let game_player_id = player.read(|r| r.game_player_id.clone());
            self.with_state(|state| {
                for leaderboard_id in leaderboard_ids {
                    state.scores.push(SubmittedScore {
                        leaderboard_id,
                        score,
                        context,
                        game_player_id: game_player_id.clone(),
                    });
                }
            });
        }
        self.settle(Operation::SubmitScore, completion, Some(()), None);
    }
}

impl NativeSavedGames for InMemoryGameKit {
    fn fetch_saved_games(&self, completion: Completion<Vec<Option<SavedGameHandle>>>) {
        let list = self.with_state(|state| {
            state
                .saved_games
                .iter()
                .map(|game| Some(game.meta.clone()))
                .collect()
        });
        self.settle(Operation::FetchSavedGames, completion, Some(list), None);
    }

    fn load_saved_game_data(&self, saved_game: &SavedGameHandle, completion: Completion<Vec<u8>>) {
        let data = self.with_state(|state| {
            state
                .saved_games
                .iter()
                .find(|game| game.meta.same_object(saved_game))
                .map(|game| game.data.clone())
        });
        let error = data.is_none().then(|| Self::not_found("saved game"));
        self.settle(Operation::LoadSavedGameData, completion, data, error);
    }

    fn save_game_data(&self, data: Vec<u8>, name: String, completion: Completion<SavedGameHandle>) {
        let mut saved = None;
        if !self.will_fail(Operation::SaveGameData) {
            let now = Utc::now();
            saved = Some(self.with_state(|state| {
                let existing = state
                    .saved_games
                    .iter_mut()
                    .find(|game| game.meta.read(|r| r.name == name));
                match existing {
                    Some(game) => {
                        game.meta.write(|r| r.modification_date = now);
                        game.data = data;
                        game.meta.clone()
                    }
                    None => {
                        let meta = SavedGameHandle::new(SavedGameRecord {
                            name,
                            device_name: self.device_name.clone(),
                            modification_date: now,
                        });
                        state.saved_games.push(StoredGame {
                            meta: meta.clone(),
                            data,
                        });
                        meta
                    }
                }
            }));
        }
        self.settle(Operation::SaveGameData, completion, saved, None);
    }

    fn delete_saved_games(&self, name: String, completion: Completion<()>) {
        if !self.will_fail(Operation::DeleteSavedGames) {
            self.with_state(|state| {
                state.saved_games.retain(|game| game.meta.read(|r| r.name != name));
            });
        }
        self.settle(Operation::DeleteSavedGames, completion, Some(()), None);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::completion::Settlement;

    fn service() -> InMemoryGameKit {
        let config = BridgeConfig {
            simulated_latency_ms: 0,
            native_worker_threads: 1,
            ..Default::default()
        };
        InMemoryGameKit::with_sample_data(&config).expect("service")
    }

    fn recorder<T: Send + 'static>() -> (Completion<T>, mpsc::Receiver<Settlement<T>>) {
        let (tx, rx) = mpsc::channel();
        let completion = Completion::new(move |s| {
            let _ = tx.send(s);
        });
        (completion, rx)
    }

    fn settled<T>(rx: &mpsc::Receiver<Settlement<T>>) -> Settlement<T> {
        rx.recv_timeout(Duration::from_secs(2)).expect("settlement")
    }

    #[test]
    fn completes_off_the_calling_thread() {
        let kit = service();
        let caller = std::thread::current().id();
        let (tx, rx) = mpsc::channel();
        kit.load_friends(Completion::new(move |_| {
            let _ = tx.send(std::thread::current().id());
        }));
        let worker = rx.recv_timeout(Duration::from_secs(2)).expect("fired");
        assert_ne!(worker, caller);
    }

    #[test]
    fn drop_fault_settles_as_dropped() {
        let kit = service();
        kit.inject_fault(Operation::ResetAchievements, Fault::Drop);
        let (completion, rx) = recorder();
        kit.reset_achievements(completion);
        assert!(matches!(settled(&rx), Settlement::Dropped));
        assert_eq!(kit.with_state(|s| s.achievements.len()), 1);
    }

    #[test]
    fn drop_fault_leaves_saved_games_alone() {
        let kit = service();
        kit.inject_fault(Operation::SaveGameData, Fault::Drop);
        let (completion, rx) = recorder();
        kit.save_game_data(vec![1, 2], "slot".into(), completion);
        assert!(matches!(settled(&rx), Settlement::Dropped));
        assert!(kit.with_state(|s| s.saved_games.is_empty()));

        kit.with_state(|s| {
            s.saved_games.push(StoredGame {
                meta: SavedGameHandle::new(SavedGameRecord {
                    name: "keep".into(),
                    device_name: String::new(),
                    modification_date: Utc::now(),
                }),
                data: vec![7],
            })
        });
        kit.inject_fault(Operation::DeleteSavedGames, Fault::Drop);
        let (completion, rx) = recorder();
        kit.delete_saved_games("keep".into(), completion);
        assert!(matches!(settled(&rx), Settlement::Dropped));
        assert_eq!(kit.with_state(|s| s.saved_games.len()), 1);
    }

    #[test]
    fn empty_fault_completes_without_payload_or_error() {
        let kit = service();
        kit.inject_fault(Operation::FetchIdentityVerificationItems, Fault::Empty);
        let (completion, rx) = recorder();
        kit.fetch_identity_verification_items(completion);
        assert!(matches!(
            settled(&rx),
            Settlement::Completed { payload: None, error: None }
        ));
    }

    #[test]
    fn fire_twice_settles_once() {
        let kit = service();
        kit.inject_fault(Operation::LoadLeaderboardSets, Fault::FireTwice);
        let (completion, rx) = recorder();
        kit.load_leaderboard_sets(completion);
        assert!(matches!(
            settled(&rx),
            Settlement::Completed { payload: Some(_), error: None }
        ));
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn cleared_fault_restores_normal_completion() {
        let kit = service();
        kit.inject_fault(Operation::LoadFriends, Fault::Fail(NativeError::new("X", 1)));
        kit.clear_fault(Operation::LoadFriends);
        let (completion, rx) = recorder();
        kit.load_friends(completion);
        match settled(&rx) {
            Settlement::Completed { payload, error } => {
                assert_eq!(payload.map(|p| p.len()), Some(3));
                assert!(error.is_none());
            }
            Settlement::Dropped => panic!("dropped"),
        }
    }

    #[test]
    fn unknown_saved_game_reports_not_found() {
        let kit = service();
        let stray = SavedGameHandle::new(SavedGameRecord {
            name: "ghost".into(),
            device_name: String::new(),
            modification_date: Utc::now(),
        });
        let (completion, rx) = recorder();
        kit.load_saved_game_data(&stray, completion);
        match settled(&rx) {
            Settlement::Completed { payload, error } => {
                assert!(payload.is_none());
                assert_eq!(error.map(|e| e.code), Some(404));
            }
            Settlement::Dropped => panic!("dropped"),
        }
    }
}
