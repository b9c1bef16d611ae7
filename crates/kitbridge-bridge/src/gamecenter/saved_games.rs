// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use kitbridge_core::marshal::{ListPolicy, ToVariant, marshal_list};
use kitbridge_core::{Dictionary, PackedBytes, Variant};

use super::GameCenter;
use crate::entity::SavedGame;
use crate::host::Callable;
use crate::native::SavedGameHandle;
use crate::operation::Operation;

impl GameCenter {
    /// Callback: `(saved_games, error)`.
    pub fn fetch_saved_games(&self, callback: Callable) {
        self.bridge.call(
            Operation::FetchSavedGames,
            callback,
            |c| self.service.fetch_saved_games(c),
            |list| {
                Ok(marshal_list(list, ListPolicy::SkipNulls, |h| {
                    Variant::object(SavedGame::wrap(h))
                }))
            },
        );
    }

    /// Load the bytes stored in `saved_game`. Callback: `({"data": bytes}, error)`.
    pub fn load_data(&self, saved_game: &SavedGame, callback: Callable) {
        self.bridge.call(
            Operation::LoadSavedGameData,
            callback,
            |c| self.service.load_saved_game_data(saved_game.native(), c),
            |data: Option<Vec<u8>>| {
                let mut mapping = Dictionary::new();
                mapping.insert("data", data.map(PackedBytes::from).to_variant());
                Ok(Variant::Dictionary(mapping))
            },
        );
    }

    /// Store `data` under `name`. Callback: `(saved_game, error)`.
    pub fn save_game_data(&self, data: &PackedBytes, name: &str, callback: Callable) {
        let data = data.as_slice().to_vec();
        let name = name.to_owned();
        self.bridge.call(
            Operation::SaveGameData,
            callback,
            |c| self.service.save_game_data(data, name, c),
            |saved: Option<SavedGameHandle>| {
                saved
                    .map(|h| Variant::object(SavedGame::wrap(h)))
                    .ok_or_else(|| "native service returned no saved game".to_owned())
            },
        );
    }

    /// Delete every saved game called `name`. Callback: `(error)`.
    pub fn delete_saved_games(&self, name: &str, callback: Callable) {
        let name = name.to_owned();
        self.bridge.call(
            Operation::DeleteSavedGames,
            callback,
            |c| self.service.delete_saved_games(name, c),
            |_| Ok(Variant::Nil),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;
    use crate::memory::Fault;
    use kitbridge_core::NativeError;

    fn save(f: &Fixture, name: &str, bytes: &[u8]) -> SavedGame {
        f.center
            .save_game_data(&PackedBytes::copy_from(bytes), name, f.callback());
        let calls = f.wait(1);
        assert_eq!(calls[0][1], Variant::Nil);
        calls[0][0].downcast::<SavedGame>().expect("saved game")
    }

    #[test]
    fn saved_bytes_load_back_unchanged() {
        let f = Fixture::new();
        let game = save(&f, "slot1", &[0, 1, 2, 255]);
        assert_eq!(game.name(), "slot1");

        f.center.load_data(&game, f.callback());
        let calls = f.wait(1);
        let mapping = calls[0][0].as_dictionary().expect("mapping");
        assert_eq!(
            mapping.get("data").and_then(Variant::as_bytes),
            Some(&[0, 1, 2, 255][..])
        );
    }

    #[test]
    fn saving_twice_replaces_the_slot() {
        let f = Fixture::new();
        let first = save(&f, "slot1", b"a");
        let second = save(&f, "slot1", b"b");
        assert_eq!(first, second);

        f.center.fetch_saved_games(f.callback());
        let calls = f.wait(1);
        assert_eq!(calls[0][0].as_array().expect("array").len(), 1);
    }

    #[test]
    fn delete_removes_by_name() {
        let f = Fixture::new();
        let game = save(&f, "slot1", b"a");
        save(&f, "slot2", b"b");

        f.center.delete_saved_games("slot1", f.callback());
        assert_eq!(f.wait(1), vec![vec![Variant::Nil]]);

        f.center.load_data(&game, f.callback());
        let calls = f.wait(1);
        assert_eq!(calls[0][0], Variant::Dictionary(Dictionary::new()));
        assert!(calls[0][1].as_str().is_some_and(|s| s.contains("not found")));
    }

    #[test]
    fn failed_save_delivers_nil_resource() {
        let f = Fixture::new();
        f.service.inject_fault(
            Operation::SaveGameData,
            Fault::Fail(NativeError::new("GKErrorDomain", 27).with_description("no iCloud")),
        );
        f.center
            .save_game_data(&PackedBytes::copy_from(b"x"), "slot", f.callback());
        assert_eq!(
            f.wait(1),
            vec![vec![Variant::Nil, Variant::String("no iCloud".into())]]
        );
        assert!(f.service.with_state(|s| s.saved_games.is_empty()));
    }
}
