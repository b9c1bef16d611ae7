// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native game service.
//
// Each method mirrors one platform call with a completion block: the
// implementation performs the call and eventually settles the `Completion`
// it was given, on whatever thread the platform chooses.

use crate::completion::Completion;
use crate::native::*;

/// Unified native game service: every capability the bridge exposes.
pub trait GameKitService:
    NativeAchievements
    + NativeAchievementDescriptions
    + NativeLocalPlayer
    + NativeLeaderboards
    + NativeSavedGames
    + Send
    + Sync
{
    /// Human-readable platform name (e.g. "iOS", "Desktop (stub)").
    fn platform_name(&self) -> &str;
}

/// Achievement progress for the local player.
pub trait NativeAchievements {
    /// Report progress for every achievement in `achievements`.
    fn report_achievements(&self, achievements: Vec<AchievementHandle>, completion: Completion<()>);

    /// Reset all achievement progress for the local player.
    fn reset_achievements(&self, completion: Completion<()>);

    /// Load the local player's achievement progress.
    fn load_achievements(&self, completion: Completion<Vec<Option<AchievementHandle>>>);
}

/// Static achievement metadata configured for the game.
pub trait NativeAchievementDescriptions {
    fn load_achievement_descriptions(
        &self,
        completion: Completion<Vec<Option<AchievementDescriptionHandle>>>,
    );

    /// Load the artwork for one achievement description.
    fn load_description_image(
        &self,
        description: &AchievementDescriptionHandle,
        completion: Completion<NativeImage>,
    );
}

/// The signed-in player and their social graph.
pub trait NativeLocalPlayer {
    /// The process-wide local player. Cheap; no I/O.
    fn local_player(&self) -> LocalPlayerHandle;

    fn load_friends(&self, completion: Completion<Vec<Option<PlayerHandle>>>);

    fn load_challengeable_friends(&self, completion: Completion<Vec<Option<PlayerHandle>>>);

    fn load_recent_players(&self, completion: Completion<Vec<Option<PlayerHandle>>>);

    /// Signature material for third-party server authentication.
    fn fetch_identity_verification_items(&self, completion: Completion<IdentityVerificationItems>);
}

/// Leaderboards and score submission.
pub trait NativeLeaderboards {
    /// Load leaderboards by id, or every leaderboard when `ids` is `None`.
    fn load_leaderboards(
        &self,
        ids: Option<Vec<String>>,
        completion: Completion<Vec<Option<LeaderboardHandle>>>,
    );

    fn load_leaderboard_sets(&self, completion: Completion<Vec<Option<LeaderboardSetHandle>>>);

    /// Submit `score` for `player` to each leaderboard in `leaderboard_ids`.
    fn submit_score(
        &self,
        score: i64,
        context: u64,
        player: PlayerHandle,
        leaderboard_ids: Vec<String>,
        completion: Completion<()>,
    );
}

/// Cloud saved games.
pub trait NativeSavedGames {
    fn fetch_saved_games(&self, completion: Completion<Vec<Option<SavedGameHandle>>>);

    /// Load the stored bytes of one saved game.
    fn load_saved_game_data(&self, saved_game: &SavedGameHandle, completion: Completion<Vec<u8>>);

    /// Store `data` under `name`, creating or replacing the saved game.
    fn save_game_data(&self, data: Vec<u8>, name: String, completion: Completion<SavedGameHandle>);

    /// Delete every saved game called `name`.
    fn delete_saved_games(&self, name: String, completion: Completion<()>);
}
