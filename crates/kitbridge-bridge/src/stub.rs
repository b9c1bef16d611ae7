// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub service for platforms without a native game service.
//
// Every asynchronous call fails immediately with an "unavailable" error, so
// host scripts still get exactly one callback per call. The real
// implementation lives in the `ios` module.

use kitbridge_core::NativeError;

use crate::completion::Completion;
use crate::native::*;
use crate::traits::*;

/// Error domain reported by the stub.
pub const STUB_ERROR_DOMAIN: &str = "KitbridgeStub";

const UNAVAILABLE: &str = "Game Center is not available on this platform";

/// Service returned on platforms without Game Center.
#[derive(Debug)]
pub struct StubService {
    local: LocalPlayerHandle,
}

impl StubService {
    pub fn new() -> Self {
        Self {
            local: LocalPlayerHandle::new(PlayerRecord::default(), LocalPlayerStatus::default()),
        }
    }
}

impl Default for StubService {
    fn default() -> Self {
        Self::new()
    }
}

fn unavailable<T>(call: &str, completion: Completion<T>) {
    tracing::warn!(call, "game service call on stub platform");
    completion.fail(NativeError::new(STUB_ERROR_DOMAIN, 1).with_description(UNAVAILABLE));
}

impl GameKitService for StubService {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl NativeAchievements for StubService {
    fn report_achievements(&self, _achievements: Vec<AchievementHandle>, completion: Completion<()>) {
        unavailable("report_achievements", completion);
    }

    fn reset_achievements(&self, completion: Completion<()>) {
        unavailable("reset_achievements", completion);
    }

    fn load_achievements(&self, completion: Completion<Vec<Option<AchievementHandle>>>) {
        unavailable("load_achievements", completion);
    }
}

impl NativeAchievementDescriptions for StubService {
    fn load_achievement_descriptions(
        &self,
        completion: Completion<Vec<Option<AchievementDescriptionHandle>>>,
    ) {
        unavailable("load_achievement_descriptions", completion);
    }

    fn load_description_image(
        &self,
        _description: &AchievementDescriptionHandle,
        completion: Completion<NativeImage>,
    ) {
        unavailable("load_description_image", completion);
    }
}

impl NativeLocalPlayer for StubService {
    fn local_player(&self) -> LocalPlayerHandle {
        self.local.clone()
    }

    fn load_friends(&self, completion: Completion<Vec<Option<PlayerHandle>>>) {
        unavailable("load_friends", completion);
    }

    fn load_challengeable_friends(&self, completion: Completion<Vec<Option<PlayerHandle>>>) {
        unavailable("load_challengeable_friends", completion);
    }

    fn load_recent_players(&self, completion: Completion<Vec<Option<PlayerHandle>>>) {
        unavailable("load_recent_players", completion);
    }

    fn fetch_identity_verification_items(&self, completion: Completion<IdentityVerificationItems>) {
        unavailable("fetch_identity_verification_items", completion);
    }
}

impl NativeLeaderboards for StubService {
    fn load_leaderboards(
        &self,
        _ids: Option<Vec<String>>,
        completion: Completion<Vec<Option<LeaderboardHandle>>>,
    ) {
        unavailable("load_leaderboards", completion);
    }

    fn load_leaderboard_sets(&self, completion: Completion<Vec<Option<LeaderboardSetHandle>>>) {
        unavailable("load_leaderboard_sets", completion);
    }

    fn submit_score(
        &self,
        _score: i64,
        _context: u64,
        _player: PlayerHandle,
        _leaderboard_ids: Vec<String>,
        completion: Completion<()>,
    ) {
        unavailable("submit_score", completion);
    }
}

impl NativeSavedGames for StubService {
    fn fetch_saved_games(&self, completion: Completion<Vec<Option<SavedGameHandle>>>) {
        unavailable("fetch_saved_games", completion);
    }

    fn load_saved_game_data(&self, _saved_game: &SavedGameHandle, completion: Completion<Vec<u8>>) {
        unavailable("load_saved_game_data", completion);
    }

    fn save_game_data(&self, _data: Vec<u8>, _name: String, completion: Completion<SavedGameHandle>) {
        unavailable("save_game_data", completion);
    }

    fn delete_saved_games(&self, _name: String, completion: Completion<()>) {
        unavailable("delete_saved_games", completion);
    }
}
