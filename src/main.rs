use bevy::prelude::*;

use rampart::game::grid::GridMap;
use rampart::game::scenario::{ScenarioGoal, ScenarioPlugin};
use rampart::game::simulation::SimPosition;
use rampart::game::unit::Unit;
use rampart::game::GamePlugin;

use std::fs;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn setup_file_logging() -> String {
    // Create logs directory if it doesn't exist
    let log_dir = PathBuf::from("logs");
    if !log_dir.exists() {
        fs::create_dir_all(&log_dir).expect("Failed to create logs directory");
    }

    // Clean up old log files, keeping only the last 25
    cleanup_old_logs(&log_dir, 25);

    // Generate timestamped filename
    let now = chrono::Local::now();
    let log_filename = format!("rampart_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_file_path = log_dir.join(&log_filename);
    let log_path_str = log_file_path.to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(
        Rotation::NEVER, // Don't rotate during a single run
        &log_dir,
        &log_filename,
    );

    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);

    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bevy_ecs=info,rampart=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path_str
}

fn cleanup_old_logs(log_dir: &PathBuf, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("rampart") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Sort by modified time (oldest first)
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

fn main() {
    let log_file = setup_file_logging();

    println!("Rampart headless demo - logging to {}", log_file);

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(GamePlugin);
    app.add_plugins(ScenarioPlugin);

    // Run Startup and the first frame, then step the fixed schedule
    // directly so the demo is not throttled by wall-clock time.
    app.update();

    let ticks = app
        .world()
        .resource::<rampart::game::config::InitialConfig>()
        .demo_tick_count;

    for _ in 0..ticks {
        app.world_mut().run_schedule(First);
        app.world_mut().run_schedule(FixedUpdate);
        app.world_mut().run_schedule(Update);
        app.world_mut().run_schedule(Last);
    }

    // Summary: how much of the wave reached the stronghold.
    let goal = app.world().resource::<ScenarioGoal>().0;
    let goal_center = app.world().resource::<GridMap>().center_point_for(goal);

    let mut arrived = 0;
    let mut total = 0;
    let mut query = app.world_mut().query_filtered::<&SimPosition, With<Unit>>();
    for pos in query.iter(app.world()) {
        total += 1;
        if (goal_center - pos.0).length() <= rampart::game::fixed_math::FixedNum::from_num(2.0) {
            arrived += 1;
        }
    }

    info!("Demo finished after {} ticks: {}/{} agents reached the stronghold", ticks, arrived, total);
}
