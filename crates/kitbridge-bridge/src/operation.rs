// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridged operation descriptors and their callback argument contracts.

use kitbridge_core::Variant;
use kitbridge_core::normalize::bridged_error_variant;

/// Argument layout of a host callback. Result first, error last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackShape {
    /// `(error)`: nil on success.
    ErrorOnly,
    /// `(array, error)`: empty array on failure.
    ListThenError,
    /// `(dictionary, error)`: empty dictionary on failure.
    MappingThenError,
    /// `(object, error)`: nil on failure.
    ResourceThenError,
}

impl CallbackShape {
    /// Number of arguments the callback always receives.
    pub fn arity(self) -> usize {
        match self {
            Self::ErrorOnly => 1,
            _ => 2,
        }
    }

    /// The payload slot's value on the failure path.
    pub fn empty_payload(self) -> Option<Variant> {
        match self {
            Self::ErrorOnly => None,
            Self::ListThenError => Some(Variant::Array(Vec::new())),
            Self::MappingThenError => Some(Variant::Dictionary(Default::default())),
            Self::ResourceThenError => Some(Variant::Nil),
        }
    }

    /// Whether `payload` is a structurally valid success value for this shape.
    pub fn accepts(self, payload: &Variant) -> bool {
        match self {
            Self::ErrorOnly => true,
            Self::ListThenError => matches!(payload, Variant::Array(_)),
            Self::MappingThenError => matches!(payload, Variant::Dictionary(_)),
            Self::ResourceThenError => matches!(payload, Variant::Object(_)),
        }
    }

    pub fn success_args(self, payload: Variant) -> Vec<Variant> {
        match self {
            Self::ErrorOnly => vec![Variant::Nil],
            _ => vec![payload, Variant::Nil],
        }
    }

    pub fn failure_args(self, error: String) -> Vec<Variant> {
        let error = bridged_error_variant(Some(error));
        match self.empty_payload() {
            Some(empty) => vec![empty, error],
            None => vec![error],
        }
    }
}

/// Every asynchronous operation the bridge exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ReportAchievements,
    ResetAchievements,
    LoadAchievements,
    LoadAchievementDescriptions,
    LoadAchievementImage,
    LoadFriends,
    LoadChallengeableFriends,
    LoadRecentPlayers,
    FetchIdentityVerificationItems,
    LoadLeaderboards,
    LoadLeaderboardSets,
    SubmitScore,
    FetchSavedGames,
    LoadSavedGameData,
    SaveGameData,
    DeleteSavedGames,
}

impl Operation {
    pub const ALL: [Operation; 16] = [
        Self::ReportAchievements,
        Self::ResetAchievements,
        Self::LoadAchievements,
        Self::LoadAchievementDescriptions,
        Self::LoadAchievementImage,
        Self::LoadFriends,
        Self::LoadChallengeableFriends,
        Self::LoadRecentPlayers,
        Self::FetchIdentityVerificationItems,
        Self::LoadLeaderboards,
        Self::LoadLeaderboardSets,
        Self::SubmitScore,
        Self::FetchSavedGames,
        Self::LoadSavedGameData,
        Self::SaveGameData,
        Self::DeleteSavedGames,
    ];

    /// Method name as seen by host scripts.
    pub fn name(self) -> &'static str {
        match self {
            Self::ReportAchievements => "report_achievements",
            Self::ResetAchievements => "reset_achievements",
            Self::LoadAchievements => "load_achievements",
            Self::LoadAchievementDescriptions => "load_achievement_descriptions",
            Self::LoadAchievementImage => "load_image",
            Self::LoadFriends => "load_friends",
            Self::LoadChallengeableFriends => "load_challengeable_friends",
            Self::LoadRecentPlayers => "load_recent_players",
            Self::FetchIdentityVerificationItems => {
                "fetch_items_for_identity_verification_signature"
            }
            Self::LoadLeaderboards => "load_leaderboards",
            Self::LoadLeaderboardSets => "load_leaderboard_sets",
            Self::SubmitScore => "submit_score",
            Self::FetchSavedGames => "fetch_saved_games",
            Self::LoadSavedGameData => "load_data",
            Self::SaveGameData => "save_game_data",
            Self::DeleteSavedGames => "delete_saved_games",
        }
    }

    pub fn shape(self) -> CallbackShape {
        match self {
            Self::ReportAchievements
            | Self::ResetAchievements
            | Self::SubmitScore
            | Self::DeleteSavedGames => CallbackShape::ErrorOnly,

            Self::LoadAchievements
            | Self::LoadAchievementDescriptions
            | Self::LoadFriends
            | Self::LoadChallengeableFriends
            | Self::LoadRecentPlayers
            | Self::LoadLeaderboards
            | Self::LoadLeaderboardSets
            | Self::FetchSavedGames => CallbackShape::ListThenError,

            Self::FetchIdentityVerificationItems | Self::LoadSavedGameData => {
                CallbackShape::MappingThenError
            }

            Self::LoadAchievementImage | Self::SaveGameData => CallbackShape::ResourceThenError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_and_success_have_the_same_arity() {
        for op in Operation::ALL {
            let shape = op.shape();
            let ok = shape.success_args(shape.empty_payload().unwrap_or_default());
            let err = shape.failure_args("boom".into());
            assert_eq!(ok.len(), shape.arity(), "{}", op.name());
            assert_eq!(err.len(), shape.arity(), "{}", op.name());
        }
    }

    #[test]
    fn error_is_always_the_last_argument() {
        for op in Operation::ALL {
            let shape = op.shape();
            let err = shape.failure_args("boom".into());
            assert_eq!(err.last(), Some(&Variant::String("boom".into())));
            let ok = shape.success_args(shape.empty_payload().unwrap_or_default());
            assert_eq!(ok.last(), Some(&Variant::Nil));
        }
    }

    #[test]
    fn failure_payloads_are_typed_empties() {
        assert_eq!(
            CallbackShape::ListThenError.failure_args("e".into())[0],
            Variant::Array(Vec::new())
        );
        assert_eq!(
            CallbackShape::MappingThenError.failure_args("e".into())[0],
            Variant::Dictionary(Default::default())
        );
        assert_eq!(
            CallbackShape::ResourceThenError.failure_args("e".into())[0],
            Variant::Nil
        );
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = Operation::ALL.iter().map(|op| op.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Operation::ALL.len());
    }
}
