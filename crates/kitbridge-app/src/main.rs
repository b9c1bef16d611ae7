// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kitbridge demo host.
//
// Plays the part of a single-threaded scripting runtime: issues every
// bridged call, pumps the host queue and prints each callback's arguments
// as JSON. Some callbacks issue follow-up calls, the way scripts chain them.
//
// Usage: kitbridge [--platform] [CONFIG.json]
//
// Without `--platform` the in-memory service with sample data is used.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use kitbridge_bridge::entity::{AchievementDescription, SavedGame};
use kitbridge_bridge::memory::InMemoryGameKit;
use kitbridge_bridge::traits::GameKitService;
use kitbridge_bridge::{Bridge, Callable, GameCenter, HostQueue, platform_service};
use kitbridge_core::error::Result;
use kitbridge_core::{BridgeConfig, PackedBytes, Variant};

const SESSION_TIMEOUT: Duration = Duration::from_secs(10);

fn main() {
    let mut use_platform = false;
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--platform" => use_platform = true,
            path => config_path = Some(path.to_owned()),
        }
    }
    let config = match &config_path {
        Some(path) => BridgeConfig::load_or_default(Path::new(path)),
        None => BridgeConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!(config = ?config_path, "kitbridge starting");

    if let Err(e) = run(&config, use_platform) {
        tracing::error!(error = %e, "session failed");
        std::process::exit(1);
    }
}

fn run(config: &BridgeConfig, use_platform: bool) -> Result<()> {
    let service: Arc<dyn GameKitService> = if use_platform {
        platform_service()
    } else {
        Arc::new(InMemoryGameKit::with_sample_data(config)?)
    };
    let queue = HostQueue::new();
    let center = GameCenter::new(service, Bridge::new(queue.handle(), config));
    let session = Session {
        center: center.clone(),
        outstanding: Arc::new(AtomicUsize::new(0)),
    };

    print_value("local_player", &Variant::object(center.local_player().clone()));

    match center.new_achievement(&Variant::String("first_steps".into()), &Variant::Nil) {
        Ok(achievement) => {
            achievement.set_percent_complete(100.0);
            center.report_achievements(
                &[Variant::object(achievement), Variant::Nil],
                session.printer("report_achievements"),
            );
        }
        Err(e) => tracing::warn!(error = %e, "could not create achievement"),
    }
    center.load_achievements(session.printer("load_achievements"));
    center.load_achievement_descriptions(session.then("load_achievement_descriptions", |s, args| {
        let first = args
            .first()
            .and_then(Variant::as_array)
            .and_then(|list| list.iter().find_map(|v| v.downcast::<AchievementDescription>()));
        if let Some(description) = first {
            s.center.load_image(&description, s.printer("load_image"));
        }
    }));
    center.load_friends(session.printer("load_friends"));
    center.load_challengeable_friends(session.printer("load_challengeable_friends"));
    center.load_recent_players(session.printer("load_recent_players"));
    center.fetch_items_for_identity_verification_signature(
        session.printer("fetch_items_for_identity_verification_signature"),
    );
    center.load_leaderboards(&Variant::Nil, session.printer("load_leaderboards"))?;
    center.load_leaderboard_sets(session.printer("load_leaderboard_sets"));
    center.submit_score(4200, 0, &["high_score".to_owned()], session.printer("submit_score"));
    center.save_game_data(
        &PackedBytes::copy_from(b"{\"level\":3}"),
        "autosave",
        session.then("save_game_data", |s, args| {
            if let Some(saved) = args.first().and_then(|v| v.downcast::<SavedGame>()) {
                s.center.load_data(&saved, s.printer("load_data"));
                s.center.fetch_saved_games(s.then("fetch_saved_games", |s, _| {
                    s.center.delete_saved_games("autosave", s.printer("delete_saved_games"));
                }));
            }
        }),
    );

    let deadline = Instant::now() + SESSION_TIMEOUT;
    while session.outstanding.load(Ordering::SeqCst) > 0 {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            tracing::warn!(
                outstanding = session.outstanding.load(Ordering::SeqCst),
                "session timed out with calls outstanding"
            );
            break;
        }
        queue.pump_for(1, remaining)?;
    }
    tracing::info!("session complete");
    Ok(())
}

/// Host-side bookkeeping: the facade plus a count of calls awaiting their
/// callback.
#[derive(Clone)]
struct Session {
    center: GameCenter,
    outstanding: Arc<AtomicUsize>,
}

impl Session {
    /// Callback that prints its arguments.
    fn printer(&self, name: &'static str) -> Callable {
        self.then(name, |_, _| {})
    }

    /// Callback that prints its arguments, then runs `next` on the host thread.
    fn then(
        &self,
        name: &'static str,
        next: impl FnOnce(&Session, &[Variant]) + Send + 'static,
    ) -> Callable {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        let session = self.clone();
        Callable::new(move |args| {
            print_value(name, &Variant::Array(args.clone()));
            next(&session, &args);
            session.outstanding.fetch_sub(1, Ordering::SeqCst);
        })
    }
}

fn print_value(name: &str, value: &Variant) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{name}: {json}"),
        Err(e) => tracing::warn!(error = %e, name, "could not render callback arguments"),
    }
}
