// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native object model.
//
// Platform service objects are shared, mutable reference types. Each one is
// held behind a `NativeHandle`, an internally synchronized shared owner, so
// every wrapper of the same object sees every write immediately. A backend
// may attach the platform object a record was read from; it is released
// together with the last handle.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use kitbridge_core::LeaderboardKind;

type PlatformObject = Arc<dyn Any + Send + Sync>;

/// Shared, synchronized owner of one native object.
pub struct NativeHandle<T> {
    record: Arc<RwLock<T>>,
    platform: Option<PlatformObject>,
}

impl<T> NativeHandle<T> {
    pub fn new(record: T) -> Self {
        Self {
            record: Arc::new(RwLock::new(record)),
            platform: None,
        }
    }

    /// A handle that also keeps `object`, the platform's own instance, alive.
    pub fn with_platform(record: T, object: impl Any + Send + Sync) -> Self {
        Self {
            record: Arc::new(RwLock::new(record)),
            platform: Some(Arc::new(object)),
        }
    }

    /// The attached platform object, if it is an `O`.
    pub fn platform<O: Any>(&self) -> Option<&O> {
        self.platform.as_deref()?.downcast_ref()
    }

    /// Run `f` with shared access to the native object.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.record.read().expect("native handle lock poisoned");
        f(&guard)
    }

    /// Run `f` with exclusive access to the native object.
    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.record.write().expect("native handle lock poisoned");
        f(&mut guard)
    }

    /// Whether both handles refer to the very same native object.
    pub fn same_object(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }
}

impl<T: Clone> NativeHandle<T> {
    /// Copy of the current field values.
    pub fn snapshot(&self) -> T {
        self.read(T::clone)
    }
}

impl<T> Clone for NativeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            record: Arc::clone(&self.record),
            platform: self.platform.clone(),
        }
    }
}

/// Handles compare by observable state, not by address.
impl<T: PartialEq> PartialEq for NativeHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.same_object(other) {
            return true;
        }
        self.read(|a| other.read(|b| a == b))
    }
}

impl<T: fmt::Debug> fmt::Debug for NativeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read(|record| record.fmt(f))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub game_player_id: String,
    pub team_player_id: String,
    pub alias: String,
    pub display_name: String,
}

impl PlayerRecord {
    pub fn new(id: impl Into<String>, alias: impl Into<String>) -> Self {
        let id = id.into();
        let alias = alias.into();
        Self {
            game_player_id: format!("G:{id}"),
            team_player_id: format!("T:{id}"),
            display_name: alias.clone(),
            alias,
        }
    }
}

/// Flags only the local (signed-in) player carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalPlayerStatus {
    pub is_authenticated: bool,
    pub is_underage: bool,
    pub is_multiplayer_gaming_restricted: bool,
    pub is_personalized_communication_restricted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AchievementRecord {
    pub identifier: String,
    pub player: Option<PlayerHandle>,
    pub percent_complete: f64,
    pub shows_completion_banner: bool,
    pub last_reported_date: Option<DateTime<Utc>>,
}

impl AchievementRecord {
    pub fn new(identifier: impl Into<String>, player: Option<PlayerHandle>) -> Self {
        Self {
            identifier: identifier.into(),
            player,
            percent_complete: 0.0,
            shows_completion_banner: false,
            last_reported_date: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.percent_complete >= 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AchievementDescriptionRecord {
    pub identifier: String,
    pub title: String,
    pub unachieved_description: String,
    pub achieved_description: String,
    pub maximum_points: i64,
    pub is_hidden: bool,
    pub is_replayable: bool,
    pub group_identifier: Option<String>,
    pub rarity_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRecord {
    pub base_leaderboard_id: String,
    pub title: String,
    pub kind: LeaderboardKind,
    pub group_identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardSetRecord {
    pub identifier: String,
    pub title: String,
    pub group_identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedGameRecord {
    pub name: String,
    pub device_name: String,
    pub modification_date: DateTime<Utc>,
}

/// Template for a game activity the player can start from the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameActivityDefinitionRecord {
    pub title: String,
    pub details: String,
    pub default_properties: BTreeMap<String, String>,
}

/// Decoded image as delivered by the platform, already PNG-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl NativeImage {
    /// Wrap PNG bytes, taking the dimensions from the IHDR chunk.
    ///
    /// Bytes that are not a PNG yield a 0x0 image; the bytes are kept as-is.
    pub fn from_png(png: Vec<u8>) -> Self {
        const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let dimension = |at: usize| {
            png.get(at..at + 4)
                .and_then(|b| <[u8; 4]>::try_from(b).ok())
                .map(u32::from_be_bytes)
        };
        let (width, height) = match (png.starts_with(&SIGNATURE), png.get(12..16)) {
            (true, Some(b"IHDR")) => (dimension(16).unwrap_or(0), dimension(20).unwrap_or(0)),
            _ => (0, 0),
        };
        Self { width, height, png }
    }
}

/// Items needed by a game server to verify the local player's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityVerificationItems {
    pub public_key_url: Option<String>,
    pub signature: Option<Vec<u8>>,
    pub salt: Option<Vec<u8>>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: Option<u64>,
}

pub type PlayerHandle = NativeHandle<PlayerRecord>;
pub type AchievementHandle = NativeHandle<AchievementRecord>;
pub type AchievementDescriptionHandle = NativeHandle<AchievementDescriptionRecord>;
pub type LeaderboardHandle = NativeHandle<LeaderboardRecord>;
pub type LeaderboardSetHandle = NativeHandle<LeaderboardSetRecord>;
pub type SavedGameHandle = NativeHandle<SavedGameRecord>;
pub type GameActivityDefinitionHandle = NativeHandle<GameActivityDefinitionRecord>;

/// The process-wide local player: a player plus its sign-in status.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPlayerHandle {
    pub player: PlayerHandle,
    pub status: NativeHandle<LocalPlayerStatus>,
}

impl LocalPlayerHandle {
    pub fn new(player: PlayerRecord, status: LocalPlayerStatus) -> Self {
        Self {
            player: NativeHandle::new(player),
            status: NativeHandle::new(status),
        }
    }
}
