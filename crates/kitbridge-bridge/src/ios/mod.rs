// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS game service via GameKit and objc2.
//
// Requires compilation with the iOS SDK (Xcode). GameKit reports results
// through Objective-C blocks that it may invoke on any queue; each block
// wraps a `SharedCompletion`, so a block GameKit calls twice still settles
// the bridged call once.
//
// GameKit objects stay on the Objective-C side. The bridge works with
// record snapshots; each handle carries the retained object it was read
// from, for calls that need it back (description images, saved game data,
// score and achievement players), and releases it with the last wrapper.
//
// ## Unsafe code
//
// 1. **ObjC message sends** (msg_send!): selectors and signatures follow the
//    GameKit SDK headers.
// 2. **Block arguments**: GameKit passes nullable object pointers; they are
//    only dereferenced after a null check and never outlive the block call.
// 3. **UIKit C FFI** (UIImagePNGRepresentation).

#![cfg(target_os = "ios")]

use block2::RcBlock;
use chrono::{DateTime, Utc};
use objc2::rc::Retained;
use objc2::runtime::{AnyObject, Bool};
use objc2::{Message, class, msg_send};
use objc2_foundation::{NSArray, NSData, NSDate, NSError, NSNumber, NSString, NSURL};

use kitbridge_core::{LeaderboardKind, NativeError};

use crate::completion::{Completion, SharedCompletion};
use crate::native::*;
use crate::traits::*;

unsafe extern "C" {
    /// ```c
    /// NSData * _Nullable UIImagePNGRepresentation(UIImage *image);
    /// ```
    fn UIImagePNGRepresentation(image: *const AnyObject) -> *mut NSData;
}

// ---------------------------------------------------------------------------
// Platform objects
// ---------------------------------------------------------------------------

/// A retained GameKit object that may be moved between threads.
struct GameKitObject(Retained<AnyObject>);

// SAFETY: the attached GameKit model objects (GKPlayer, GKAchievementDescription,
// GKSavedGame) are immutable snapshots; GameKit documents them as safe to
// message from any thread.
unsafe impl Send for GameKitObject {}
unsafe impl Sync for GameKitObject {}

/// The GameKit object behind `handle`, when it came from GameKit.
fn gamekit_object<T>(handle: &NativeHandle<T>) -> Option<Retained<AnyObject>> {
    handle.platform::<GameKitObject>().map(|o| o.0.clone())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn local_player_object() -> Retained<AnyObject> {
    // SAFETY: +[GKLocalPlayer localPlayer] always returns the shared instance.
    unsafe { msg_send![class!(GKLocalPlayer), localPlayer] }
}

fn string_property(object: &AnyObject, read: impl FnOnce(&AnyObject) -> Option<Retained<NSString>>) -> String {
    read(object).map(|s| s.to_string()).unwrap_or_default()
}

fn optional_string(value: Option<Retained<NSString>>) -> Option<String> {
    value.map(|s| s.to_string())
}

fn date(value: Option<Retained<NSDate>>) -> Option<DateTime<Utc>> {
    let seconds = value?.timeIntervalSince1970();
    DateTime::from_timestamp(seconds.trunc() as i64, (seconds.fract() * 1e9) as u32)
}

/// Convert the `NSError *` a block received.
///
/// # Safety
/// `error` must be null or point to a live `NSError`.
unsafe fn native_error(error: *mut NSError) -> Option<NativeError> {
    // SAFETY: guaranteed by the caller.
    let error = unsafe { error.as_ref() }?;
    Some(
        NativeError::new(error.domain().to_string(), error.code() as i64)
            .with_description(error.localizedDescription().to_string()),
    )
}

/// Objects of a nullable `NSArray *` a block received.
///
/// # Safety
/// `array` must be null or point to a live `NSArray`.
unsafe fn array_objects(array: *mut NSArray<AnyObject>) -> Option<Vec<Retained<AnyObject>>> {
    // SAFETY: guaranteed by the caller.
    unsafe { array.as_ref() }.map(|a| a.to_vec())
}

/// # Safety
/// `data` must be null or point to a live `NSData`.
unsafe fn data_bytes(data: *mut NSData) -> Option<Vec<u8>> {
    // SAFETY: guaranteed by the caller.
    unsafe { data.as_ref() }.map(|d| d.to_vec())
}

type ListBlock = RcBlock<dyn Fn(*mut NSArray<AnyObject>, *mut NSError)>;
type ErrorBlock = RcBlock<dyn Fn(*mut NSError)>;

/// Block for GameKit calls that report only an error.
fn error_block(completion: Completion<()>) -> ErrorBlock {
    let shared = completion.into_shared();
    RcBlock::new(move |error: *mut NSError| {
        // SAFETY: GameKit passes a valid or null NSError.
        let error = unsafe { native_error(error) };
        shared.fire(Some(()), error);
    })
}

/// Block for GameKit calls that report `(NSArray *, NSError *)`, converting
/// each element with `convert`.
fn list_block<R: 'static>(
    completion: Completion<Vec<Option<NativeHandle<R>>>>,
    convert: fn(&AnyObject) -> NativeHandle<R>,
) -> ListBlock {
    let shared: SharedCompletion<_> = completion.into_shared();
    RcBlock::new(move |array: *mut NSArray<AnyObject>, error: *mut NSError| {
        // SAFETY: GameKit passes valid or null pointers for the block's duration.
        let (objects, error) = unsafe { (array_objects(array), native_error(error)) };
        let list = objects.map(|objects| {
            objects
                .iter()
                .map(|o| Some(convert(o)))
                .collect()
        });
        shared.fire(list, error);
    })
}

// ---------------------------------------------------------------------------
// Record conversion
// ---------------------------------------------------------------------------

fn player_handle(object: &AnyObject) -> PlayerHandle {
    // SAFETY: GKPlayer string properties; all nullable in older SDKs.
    let record = unsafe {
        PlayerRecord {
            game_player_id: string_property(object, |o| msg_send![o, gamePlayerID]),
            team_player_id: string_property(object, |o| msg_send![o, teamPlayerID]),
            alias: string_property(object, |o| msg_send![o, alias]),
            display_name: string_property(object, |o| msg_send![o, displayName]),
        }
    };
    PlayerHandle::with_platform(record, GameKitObject(object.retain()))
}

fn achievement_handle(object: &AnyObject) -> AchievementHandle {
    // SAFETY: GKAchievement properties per GKAchievement.h.
    unsafe {
        let player: Option<Retained<AnyObject>> = msg_send![object, player];
        let banner: Bool = msg_send![object, showsCompletionBanner];
        AchievementHandle::new(AchievementRecord {
            identifier: string_property(object, |o| msg_send![o, identifier]),
            player: player.map(|p| player_handle(&p)),
            percent_complete: msg_send![object, percentComplete],
            shows_completion_banner: banner.as_bool(),
            last_reported_date: date(msg_send![object, lastReportedDate]),
        })
    }
}

fn description_handle(object: &AnyObject) -> AchievementDescriptionHandle {
    // SAFETY: GKAchievementDescription properties per GKAchievementDescription.h.
    let record = unsafe {
        let hidden: Bool = msg_send![object, isHidden];
        let replayable: Bool = msg_send![object, isReplayable];
        let points: isize = msg_send![object, maximumPoints];
        let rarity: Option<Retained<NSNumber>> = msg_send![object, rarityPercent];
        AchievementDescriptionRecord {
            identifier: string_property(object, |o| msg_send![o, identifier]),
            title: string_property(object, |o| msg_send![o, title]),
            unachieved_description: string_property(object, |o| msg_send![o, unachievedDescription]),
            achieved_description: string_property(object, |o| msg_send![o, achievedDescription]),
            maximum_points: points as i64,
            is_hidden: hidden.as_bool(),
            is_replayable: replayable.as_bool(),
            group_identifier: optional_string(msg_send![object, groupIdentifier]),
            rarity_percent: rarity.map(|n| n.doubleValue()),
        }
    };
    AchievementDescriptionHandle::with_platform(record, GameKitObject(object.retain()))
}

fn leaderboard_handle(object: &AnyObject) -> LeaderboardHandle {
    // SAFETY: GKLeaderboard properties per GKLeaderboard.h (iOS 14+).
    unsafe {
        let kind: isize = msg_send![object, type];
        LeaderboardHandle::new(LeaderboardRecord {
            base_leaderboard_id: string_property(object, |o| msg_send![o, baseLeaderboardID]),
            title: string_property(object, |o| msg_send![o, title]),
            kind: LeaderboardKind::from_host_value(kind as i64).unwrap_or(LeaderboardKind::Classic),
            group_identifier: optional_string(msg_send![object, groupIdentifier]),
        })
    }
}

fn leaderboard_set_handle(object: &AnyObject) -> LeaderboardSetHandle {
    // SAFETY: GKLeaderboardSet properties per GKLeaderboardSet.h.
    unsafe {
        LeaderboardSetHandle::new(LeaderboardSetRecord {
            identifier: string_property(object, |o| msg_send![o, identifier]),
            title: string_property(object, |o| msg_send![o, title]),
            group_identifier: optional_string(msg_send![object, groupIdentifier]),
        })
    }
}

fn saved_game_handle(object: &AnyObject) -> SavedGameHandle {
    // SAFETY: GKSavedGame properties per GKSavedGame.h.
    let record = unsafe {
        SavedGameRecord {
            name: string_property(object, |o| msg_send![o, name]),
            device_name: string_property(object, |o| msg_send![o, deviceName]),
            modification_date: date(msg_send![object, modificationDate]).unwrap_or_default(),
        }
    };
    SavedGameHandle::with_platform(record, GameKitObject(object.retain()))
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// GameKit-backed game service.
pub struct IosService {
    local: LocalPlayerHandle,
}

impl IosService {
    pub fn new() -> Self {
        let object = local_player_object();
        let local = LocalPlayerHandle {
            player: player_handle(&object),
            status: NativeHandle::new(local_status(&object)),
        };
        Self { local }
    }

    /// The GKPlayer object behind `player`, falling back to the local player.
    fn player_object(&self, player: &PlayerHandle) -> Retained<AnyObject> {
        gamekit_object(player).unwrap_or_else(local_player_object)
    }
}

impl Default for IosService {
    fn default() -> Self {
        Self::new()
    }
}

fn local_status(object: &AnyObject) -> LocalPlayerStatus {
    // SAFETY: GKLocalPlayer BOOL properties.
    unsafe {
        let authenticated: Bool = msg_send![object, isAuthenticated];
        let underage: Bool = msg_send![object, isUnderage];
        let multiplayer: Bool = msg_send![object, isMultiplayerGamingRestricted];
        let communication: Bool = msg_send![object, isPersonalizedCommunicationRestricted];
        LocalPlayerStatus {
            is_authenticated: authenticated.as_bool(),
            is_underage: underage.as_bool(),
            is_multiplayer_gaming_restricted: multiplayer.as_bool(),
            is_personalized_communication_restricted: communication.as_bool(),
        }
    }
}

impl GameKitService for IosService {
    fn platform_name(&self) -> &str {
        "iOS"
    }
}

impl NativeAchievements for IosService {
    fn report_achievements(&self, achievements: Vec<AchievementHandle>, completion: Completion<()>) {
        let objects: Vec<Retained<AnyObject>> = achievements
            .iter()
            .map(|handle| {
                let record = handle.snapshot();
                let player = record.player.as_ref().map(|p| self.player_object(p));
                let identifier = NSString::from_str(&record.identifier);
                // SAFETY: -[GKAchievement initWithIdentifier:(player:)] and
                // property setters per GKAchievement.h.
                unsafe {
                    let alloc: Retained<AnyObject> = msg_send![class!(GKAchievement), alloc];
                    let achievement: Retained<AnyObject> = match player {
                        Some(player) => {
                            msg_send![alloc, initWithIdentifier: &*identifier, player: &*player]
                        }
                        None => msg_send![alloc, initWithIdentifier: &*identifier],
                    };
                    let _: () = msg_send![&achievement, setPercentComplete: record.percent_complete];
                    let _: () = msg_send![
                        &achievement,
                        setShowsCompletionBanner: Bool::new(record.shows_completion_banner)
                    ];
                    achievement
                }
            })
            .collect();
        let array = NSArray::from_retained_slice(&objects);
        let block = error_block(completion);
        // SAFETY: +[GKAchievement reportAchievements:withCompletionHandler:].
        unsafe {
            let _: () = msg_send![
                class!(GKAchievement),
                reportAchievements: &*array,
                withCompletionHandler: &*block
            ];
        }
    }

    fn reset_achievements(&self, completion: Completion<()>) {
        let block = error_block(completion);
        // SAFETY: +[GKAchievement resetAchievementsWithCompletionHandler:].
        unsafe {
            let _: () = msg_send![class!(GKAchievement), resetAchievementsWithCompletionHandler: &*block];
        }
    }

    fn load_achievements(&self, completion: Completion<Vec<Option<AchievementHandle>>>) {
        let block = list_block(completion, achievement_handle);
        // SAFETY: +[GKAchievement loadAchievementsWithCompletionHandler:].
        unsafe {
            let _: () = msg_send![class!(GKAchievement), loadAchievementsWithCompletionHandler: &*block];
        }
    }
}

impl NativeAchievementDescriptions for IosService {
    fn load_achievement_descriptions(
        &self,
        completion: Completion<Vec<Option<AchievementDescriptionHandle>>>,
    ) {
        let block = list_block(completion, description_handle);
        // SAFETY: +[GKAchievementDescription loadAchievementDescriptionsWithCompletionHandler:].
        unsafe {
            let _: () = msg_send![
                class!(GKAchievementDescription),
                loadAchievementDescriptionsWithCompletionHandler: &*block
            ];
        }
    }

    fn load_description_image(
        &self,
        description: &AchievementDescriptionHandle,
        completion: Completion<NativeImage>,
    ) {
        let Some(object) = gamekit_object(description) else {
            let id = description.read(|r| r.identifier.clone());
            completion.fail(
                NativeError::new("KitbridgeIOS", 1)
                    .with_description(format!("achievement description {id} was not loaded")),
            );
            return;
        };
        let shared = completion.into_shared();
        let block = RcBlock::new(move |image: *mut AnyObject, error: *mut NSError| {
            // SAFETY: GameKit passes a valid or null UIImage and NSError.
            let (png, error) = unsafe {
                let png = if image.is_null() {
                    None
                } else {
                    data_bytes(UIImagePNGRepresentation(image))
                };
                (png, native_error(error))
            };
            shared.fire(png.map(NativeImage::from_png), error);
        });
        // SAFETY: -[GKAchievementDescription loadImageWithCompletionHandler:].
        unsafe {
            let _: () = msg_send![&object, loadImageWithCompletionHandler: &*block];
        }
    }
}

impl NativeLocalPlayer for IosService {
    fn local_player(&self) -> LocalPlayerHandle {
        let status = local_status(&local_player_object());
        self.local.status.write(|s| *s = status);
        self.local.clone()
    }

    fn load_friends(&self, completion: Completion<Vec<Option<PlayerHandle>>>) {
        let block = list_block(completion, player_handle);
        // SAFETY: -[GKLocalPlayer loadFriends:] (iOS 14.5+).
        unsafe {
            let _: () = msg_send![&local_player_object(), loadFriends: &*block];
        }
    }

    fn load_challengeable_friends(&self, completion: Completion<Vec<Option<PlayerHandle>>>) {
        let block = list_block(completion, player_handle);
        // SAFETY: -[GKLocalPlayer loadChallengableFriendsWithCompletionHandler:]
        // (selector spelling is GameKit's).
        unsafe {
            let _: () = msg_send![
                &local_player_object(),
                loadChallengableFriendsWithCompletionHandler: &*block
            ];
        }
    }

    fn load_recent_players(&self, completion: Completion<Vec<Option<PlayerHandle>>>) {
        let block = list_block(completion, player_handle);
        // SAFETY: -[GKLocalPlayer loadRecentPlayersWithCompletionHandler:].
        unsafe {
            let _: () = msg_send![&local_player_object(), loadRecentPlayersWithCompletionHandler: &*block];
        }
    }

    fn fetch_identity_verification_items(&self, completion: Completion<IdentityVerificationItems>) {
        let shared = completion.into_shared();
        let block = RcBlock::new(
            move |url: *mut NSURL,
                  signature: *mut NSData,
                  salt: *mut NSData,
                  timestamp: u64,
                  error: *mut NSError| {
                // SAFETY: GameKit passes valid or null pointers for the block's duration.
                let (items, error) = unsafe {
                    let url = url.as_ref().and_then(|u| u.absoluteString()).map(|s| s.to_string());
                    let items = IdentityVerificationItems {
                        public_key_url: url,
                        signature: data_bytes(signature),
                        salt: data_bytes(salt),
                        timestamp: Some(timestamp),
                    };
                    (items, native_error(error))
                };
                shared.fire(Some(items), error);
            },
        );
        // SAFETY: -[GKLocalPlayer fetchItemsForIdentityVerificationSignature:] (iOS 13.5+).
        unsafe {
            let _: () = msg_send![
                &local_player_object(),
                fetchItemsForIdentityVerificationSignature: &*block
            ];
        }
    }
}

impl NativeLeaderboards for IosService {
    fn load_leaderboards(
        &self,
        ids: Option<Vec<String>>,
        completion: Completion<Vec<Option<LeaderboardHandle>>>,
    ) {
        let ids = ids.map(|ids| {
            let strings: Vec<Retained<NSString>> = ids.iter().map(|id| NSString::from_str(id)).collect();
            NSArray::from_retained_slice(&strings)
        });
        let block = list_block(completion, leaderboard_handle);
        // SAFETY: +[GKLeaderboard loadLeaderboardsWithIDs:completionHandler:]; nil ids
        // loads every leaderboard.
        unsafe {
            let _: () = msg_send![
                class!(GKLeaderboard),
                loadLeaderboardsWithIDs: ids.as_deref(),
                completionHandler: &*block
            ];
        }
    }

    fn load_leaderboard_sets(&self, completion: Completion<Vec<Option<LeaderboardSetHandle>>>) {
        let block = list_block(completion, leaderboard_set_handle);
        // SAFETY: +[GKLeaderboardSet loadLeaderboardSetsWithCompletionHandler:].
        unsafe {
            let _: () = msg_send![
                class!(GKLeaderboardSet),
                loadLeaderboardSetsWithCompletionHandler: &*block
            ];
        }
    }

    fn submit_score(
        &self,
        score: i64,
        context: u64,
        player: PlayerHandle,
        leaderboard_ids: Vec<String>,
        completion: Completion<()>,
    ) {
        let player = self.player_object(&player);
        let ids: Vec<Retained<NSString>> = leaderboard_ids.iter().map(|id| NSString::from_str(id)).collect();
        let ids = NSArray::from_retained_slice(&ids);
        let block = error_block(completion);
        // SAFETY: +[GKLeaderboard submitScore:context:player:leaderboardIDs:completionHandler:].
        unsafe {
            let _: () = msg_send![
                class!(GKLeaderboard),
                submitScore: score as isize,
                context: context as usize,
                player: &*player,
                leaderboardIDs: &*ids,
                completionHandler: &*block
            ];
        }
    }
}

impl NativeSavedGames for IosService {
    fn fetch_saved_games(&self, completion: Completion<Vec<Option<SavedGameHandle>>>) {
        let block = list_block(completion, saved_game_handle);
        // SAFETY: -[GKLocalPlayer fetchSavedGamesWithCompletionHandler:].
        unsafe {
            let _: () = msg_send![&local_player_object(), fetchSavedGamesWithCompletionHandler: &*block];
        }
    }

    fn load_saved_game_data(&self, saved_game: &SavedGameHandle, completion: Completion<Vec<u8>>) {
        let Some(object) = gamekit_object(saved_game) else {
            let name = saved_game.read(|r| r.name.clone());
            completion.fail(
                NativeError::new("KitbridgeIOS", 2)
                    .with_description(format!("saved game {name} was not fetched")),
            );
            return;
        };
        let shared = completion.into_shared();
        let block = RcBlock::new(move |data: *mut NSData, error: *mut NSError| {
            // SAFETY: GameKit passes valid or null pointers for the block's duration.
            let (data, error) = unsafe { (data_bytes(data), native_error(error)) };
            shared.fire(data, error);
        });
        // SAFETY: -[GKSavedGame loadDataWithCompletionHandler:].
        unsafe {
            let _: () = msg_send![&object, loadDataWithCompletionHandler: &*block];
        }
    }

    fn save_game_data(&self, data: Vec<u8>, name: String, completion: Completion<SavedGameHandle>) {
        let bytes = NSData::with_bytes(&data);
        let ns_name = NSString::from_str(&name);
        let shared = completion.into_shared();
        let block = RcBlock::new(move |saved: *mut AnyObject, error: *mut NSError| {
            // SAFETY: GameKit passes a valid or null GKSavedGame and NSError.
            let (saved, error) = unsafe { (saved.as_ref(), native_error(error)) };
            let saved = saved.map(saved_game_handle);
            shared.fire(saved, error);
        });
        // SAFETY: -[GKLocalPlayer saveGameData:withName:completionHandler:].
        unsafe {
            let _: () = msg_send![
                &local_player_object(),
                saveGameData: &*bytes,
                withName: &*ns_name,
                completionHandler: &*block
            ];
        }
    }

    fn delete_saved_games(&self, name: String, completion: Completion<()>) {
        let ns_name = NSString::from_str(&name);
        let block = error_block(completion);
        // SAFETY: -[GKLocalPlayer deleteSavedGamesWithName:completionHandler:].
        unsafe {
            let _: () = msg_send![
                &local_player_object(),
                deleteSavedGamesWithName: &*ns_name,
                completionHandler: &*block
            ];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_platform_strings_stay_present() {
        assert_eq!(optional_string(Some(NSString::from_str(""))), Some(String::new()));
        assert_eq!(optional_string(None), None);
    }
}
