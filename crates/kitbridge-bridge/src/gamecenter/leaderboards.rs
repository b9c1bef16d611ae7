// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use kitbridge_core::error::Result;
use kitbridge_core::marshal::{FromVariant, ListPolicy, marshal_list};
use kitbridge_core::Variant;

use super::GameCenter;
use crate::entity::{Leaderboard, LeaderboardSet};
use crate::host::Callable;
use crate::operation::Operation;

impl GameCenter {
    /// Load the leaderboards named in `ids`, or all of them when `ids` is
    /// nil. Callback: `(leaderboards, error)`.
    ///
    /// Fails synchronously, without calling back, when `ids` is neither nil
    /// nor an array of strings.
    pub fn load_leaderboards(&self, ids: &Variant, callback: Callable) -> Result<()> {
        let ids = Option::<Vec<String>>::from_variant(ids)?;
        self.bridge.call(
            Operation::LoadLeaderboards,
            callback,
            |c| self.service.load_leaderboards(ids, c),
            |list| {
                Ok(marshal_list(list, ListPolicy::SkipNulls, |h| {
                    Variant::object(Leaderboard::wrap(h))
                }))
            },
        );
        Ok(())
    }

    /// Callback: `(sets, error)`.
    pub fn load_leaderboard_sets(&self, callback: Callable) {
        self.bridge.call(
            Operation::LoadLeaderboardSets,
            callback,
            |c| self.service.load_leaderboard_sets(c),
            |list| {
                Ok(marshal_list(list, ListPolicy::SkipNulls, |h| {
                    Variant::object(LeaderboardSet::wrap(h))
                }))
            },
        );
    }

    /// Submit `score` for the local player to each leaderboard in
    /// `leaderboard_ids`. Callback: `(error)`.
    pub fn submit_score(
        &self,
        score: i64,
        context: u64,
        leaderboard_ids: &[String],
        callback: Callable,
    ) {
        let player = self.local.native().player.clone();
        let ids = leaderboard_ids.to_vec();
        self.bridge.call(
            Operation::SubmitScore,
            callback,
            |c| self.service.submit_score(score, context, player, ids, c),
            |_| Ok(Variant::Nil),
        );
    }
}
