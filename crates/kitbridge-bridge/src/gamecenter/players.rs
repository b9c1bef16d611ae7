// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use kitbridge_core::marshal::{ListPolicy, ToVariant, marshal_list};
use kitbridge_core::{Dictionary, PackedBytes, Variant};

use super::GameCenter;
use crate::bridge::Marshaled;
use crate::completion::Completion;
use crate::entity::Player;
use crate::host::Callable;
use crate::native::{IdentityVerificationItems, PlayerHandle};
use crate::operation::Operation;

type PlayerList = Vec<Option<PlayerHandle>>;

impl GameCenter {
    /// Callback: `(players, error)`.
    pub fn load_friends(&self, callback: Callable) {
        self.player_list(Operation::LoadFriends, callback, |c| {
            self.service.load_friends(c)
        });
    }

    /// Callback: `(players, error)`.
    pub fn load_challengeable_friends(&self, callback: Callable) {
        self.player_list(Operation::LoadChallengeableFriends, callback, |c| {
            self.service.load_challengeable_friends(c)
        });
    }

    /// Callback: `(players, error)`.
    pub fn load_recent_players(&self, callback: Callable) {
        self.player_list(Operation::LoadRecentPlayers, callback, |c| {
            self.service.load_recent_players(c)
        });
    }

    /// Signature material for verifying the local player on a third-party
    /// server. Callback: `(mapping, error)`.
    ///
    /// On success the mapping always has the keys `url`, `data`, `salt` and
    /// `timestamp`; a datum the platform did not supply is nil.
    pub fn fetch_items_for_identity_verification_signature(&self, callback: Callable) {
        self.bridge.call(
            Operation::FetchIdentityVerificationItems,
            callback,
            |c| self.service.fetch_identity_verification_items(c),
            identity_mapping,
        );
    }

    fn player_list(
        &self,
        operation: Operation,
        callback: Callable,
        issue: impl FnOnce(Completion<PlayerList>),
    ) {
        self.bridge.call(operation, callback, issue, |list: Option<PlayerList>| {
            Ok(marshal_list(list, ListPolicy::SkipNulls, |h| {
                Variant::object(Player::wrap(h))
            }))
        });
    }
}

fn identity_mapping(items: Option<IdentityVerificationItems>) -> Marshaled {
    let items = items.unwrap_or_default();
    let bytes = |b: Option<Vec<u8>>| {
        b.map(PackedBytes::from)
            .map_or(Variant::Nil, Variant::Bytes)
    };
    let mut mapping = Dictionary::new();
    mapping.insert("url", items.public_key_url.to_variant());
    mapping.insert("data", bytes(items.signature));
    mapping.insert("salt", bytes(items.salt));
    mapping.insert("timestamp", items.timestamp.to_variant());
    Ok(Variant::Dictionary(mapping))
}
