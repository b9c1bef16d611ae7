// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use kitbridge_core::error::Result;
use kitbridge_core::marshal::{ListPolicy, marshal_list};
use kitbridge_core::Variant;
use tracing::debug;

use super::GameCenter;
use crate::entity::{Achievement, AchievementDescription, Image};
use crate::host::Callable;
use crate::native::{AchievementHandle, NativeImage};
use crate::operation::Operation;

impl GameCenter {
    /// Create an achievement for `player`, or for the local player when
    /// `player` is nil.
    pub fn new_achievement(&self, identifier: &Variant, player: &Variant) -> Result<Achievement> {
        Achievement::from_host_args(identifier, player, &self.local)
    }

    /// Report progress for every achievement in `achievements`.
    ///
    /// Elements that are not achievement objects are skipped. Callback:
    /// `(error)`.
    pub fn report_achievements(&self, achievements: &[Variant], callback: Callable) {
        let natives: Vec<AchievementHandle> = achievements
            .iter()
            .filter_map(|v| v.downcast::<Achievement>())
            .map(|a| a.native().clone())
            .collect();
        let skipped = achievements.len() - natives.len();
        if skipped > 0 {
            debug!(skipped, "ignoring non-achievement elements");
        }
        self.bridge.call(
            Operation::ReportAchievements,
            callback,
            |c| self.service.report_achievements(natives, c),
            |_| Ok(Variant::Nil),
        );
    }

    /// Callback: `(error)`.
    pub fn reset_achievements(&self, callback: Callable) {
        self.bridge.call(
            Operation::ResetAchievements,
            callback,
            |c| self.service.reset_achievements(c),
            |_| Ok(Variant::Nil),
        );
    }

    /// Callback: `(achievements, error)`.
    pub fn load_achievements(&self, callback: Callable) {
        self.bridge.call(
            Operation::LoadAchievements,
            callback,
            |c| self.service.load_achievements(c),
            |list| {
                Ok(marshal_list(list, ListPolicy::SkipNulls, |h| {
                    Variant::object(Achievement::wrap(h))
                }))
            },
        );
    }

    /// Callback: `(descriptions, error)`.
    pub fn load_achievement_descriptions(&self, callback: Callable) {
        self.bridge.call(
            Operation::LoadAchievementDescriptions,
            callback,
            |c| self.service.load_achievement_descriptions(c),
            |list| {
                Ok(marshal_list(list, ListPolicy::SkipNulls, |h| {
                    Variant::object(AchievementDescription::wrap(h))
                }))
            },
        );
    }

    /// Load the artwork of `description`. Callback: `(image, error)`.
    ///
    /// A platform that reports neither an image nor an error is treated as a
    /// failure, so the host never sees `(nil, nil)`.
    pub fn load_image(&self, description: &AchievementDescription, callback: Callable) {
        let unavailable = self.bridge.image_unavailable_message().to_owned();
        self.bridge.call(
            Operation::LoadAchievementImage,
            callback,
            |c| self.service.load_description_image(description.native(), c),
            move |image: Option<NativeImage>| {
                image
                    .map(|image| Variant::object(Image::from_native(&image)))
                    .ok_or(unavailable)
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;
    use crate::memory::Fault;
    use kitbridge_core::NativeError;

    fn new_achievement(f: &Fixture, id: &str, percent: f64) -> Variant {
        let a = f
            .center
            .new_achievement(&Variant::String(id.into()), &Variant::Nil)
            .expect("achievement");
        a.set_percent_complete(percent);
        Variant::object(a)
    }

    #[test]
    fn report_skips_foreign_elements_and_stores_progress() {
        let f = Fixture::new();
        let list = vec![
            new_achievement(&f, "speedrun", 100.0),
            Variant::Nil,
            Variant::Int(7),
        ];
        f.center.report_achievements(&list, f.callback());
        assert_eq!(f.wait(1), vec![vec![Variant::Nil]]);

        let stored = f.service.with_state(|s| {
            s.achievements
                .iter()
                .flatten()
                .map(|a| a.read(|r| (r.identifier.clone(), r.percent_complete)))
                .collect::<Vec<_>>()
        });
        assert!(stored.contains(&("speedrun".to_owned(), 100.0)));
    }

    #[test]
    fn report_failure_delivers_message() {
        let f = Fixture::new();
        f.service.inject_fault(
            Operation::ReportAchievements,
            Fault::Fail(NativeError::new("GKErrorDomain", 3).with_description("offline")),
        );
        f.center
            .report_achievements(&[new_achievement(&f, "x", 1.0)], f.callback());
        assert_eq!(f.wait(1), vec![vec![Variant::String("offline".into())]]);
    }

    #[test]
    fn load_achievements_wraps_native_objects() {
        let f = Fixture::new();
        f.center.load_achievements(f.callback());
        let calls = f.wait(1);
        let list = calls[0][0].as_array().expect("array");
        assert_eq!(list.len(), 1);
        let first = list[0].downcast::<Achievement>().expect("achievement");
        assert_eq!(first.identifier(), "first_steps");
        assert_eq!(calls[0][1], Variant::Nil);
    }

    #[test]
    fn descriptions_skip_null_entries() {
        let f = Fixture::new();
        f.center.load_achievement_descriptions(f.callback());
        let calls = f.wait(1);
        let ids: Vec<String> = calls[0][0]
            .as_array()
            .expect("array")
            .iter()
            .map(|v| v.downcast::<AchievementDescription>().expect("desc").identifier())
            .collect();
        assert_eq!(ids, vec!["first_steps", "secret_room"]);
    }

    #[test]
    fn reset_clears_progress() {
        let f = Fixture::new();
        f.center.reset_achievements(f.callback());
        assert_eq!(f.wait(1), vec![vec![Variant::Nil]]);
        f.center.load_achievements(f.callback());
        assert_eq!(
            f.wait(1),
            vec![vec![Variant::Array(Vec::new()), Variant::Nil]]
        );
    }

    fn description(f: &Fixture, id: &str) -> AchievementDescription {
        f.center.load_achievement_descriptions(f.callback());
        f.wait(1)[0][0]
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|v| v.downcast::<AchievementDescription>())
            .find(|d| d.identifier() == id)
            .expect("description")
    }

    #[test]
    fn load_image_delivers_png_resource() {
        let f = Fixture::new();
        let desc = description(&f, "first_steps");
        f.center.load_image(&desc, f.callback());
        let calls = f.wait(1);
        let image = calls[0][0].downcast::<Image>().expect("image");
        assert_eq!(image.width(), 1);
        assert!(image.data().as_slice().starts_with(&[0x89, b'P']));
        assert_eq!(calls[0][1], Variant::Nil);
    }

    #[test]
    fn load_image_without_artwork_fails_with_message() {
        let f = Fixture::new();
        let desc = description(&f, "secret_room");
        f.center.load_image(&desc, f.callback());
        assert_eq!(
            f.wait(1),
            vec![vec![
                Variant::Nil,
                Variant::String("could not load image".into())
            ]]
        );
    }
}
