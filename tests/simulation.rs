//! End-to-end flights through the animation loop, chart and graph store

use glam::DVec2;
use motion_sim::persistence::{FileStorage, Storage};
use motion_sim::renderer::PointKind;
use motion_sim::sim::{
    AnimationLoop, Gravity, LaunchInput, Planet, SimPhase, SimulationParameters, TickEvent,
    TrajectoryEngine,
};
use motion_sim::{SavedGraphs, Settings, SimError};

fn input(velocity: &str, angle: &str, gravity: &str) -> LaunchInput {
    LaunchInput {
        velocity: velocity.to_string(),
        angle: angle.to_string(),
        gravity: gravity.to_string(),
        custom_gravity: String::new(),
    }
}

fn fly(anim: &mut AnimationLoop) -> (usize, TickEvent) {
    let mut plotted = 0;
    loop {
        match anim.tick() {
            TickEvent::Plotted(_) => plotted += 1,
            other => return (plotted, other),
        }
    }
}

#[test]
fn reference_flight_lands_where_the_formulas_say() {
    let mut anim = AnimationLoop::new(&Settings::default());
    anim.launch_from_input(&input("50", "45", "earth")).unwrap();

    let (plotted, event) = fly(&mut anim);
    let TickEvent::Landed { range, flight_time } = event else {
        panic!("expected landing, got {event:?}");
    };
    assert!((range - 255.10).abs() < 0.01, "range {range}");
    assert!((flight_time - 7.215).abs() < 0.001, "flight time {flight_time}");
    // 30 fps: one plotted point per frame until the frame that lands
    assert_eq!(plotted, 216);
    assert_eq!(anim.phase(), SimPhase::Landed);

    // Range outgrew the default viewport (plus 10% headroom), height did not
    let bounds = anim.mapper().bounds();
    assert!((bounds.x - 255.10 * 1.1).abs() < 0.05);
    assert_eq!(bounds.y, 100.0);

    // Landing replaced the live points with the full walk from the origin
    let live = anim.mapper().live_points();
    assert_eq!(live[0].pos(), DVec2::ZERO);
    assert!(live.iter().all(|p| p.y >= 0.0));
}

#[test]
fn pause_freezes_time_until_resumed() {
    let mut anim = AnimationLoop::new(&Settings::default());
    anim.launch_from_input(&input("30", "60", "mars")).unwrap();
    for _ in 0..10 {
        anim.tick();
    }
    let time = anim.stats().time;

    anim.toggle_pause().unwrap();
    for _ in 0..10 {
        assert_eq!(anim.tick(), TickEvent::Idle);
    }
    assert_eq!(anim.stats().time, time);

    anim.toggle_pause().unwrap();
    anim.tick();
    assert!(anim.stats().time > time);
}

#[test]
fn launch_rejected_mid_flight() {
    let mut anim = AnimationLoop::new(&Settings::default());
    anim.launch_from_input(&input("20", "30", "moon")).unwrap();
    let err = anim.launch_from_input(&input("20", "30", "moon")).unwrap_err();
    assert!(matches!(
        err,
        SimError::InvalidTransition {
            phase: SimPhase::Running,
            ..
        }
    ));
}

#[test]
fn invalid_input_leaves_loop_idle() {
    let mut anim = AnimationLoop::new(&Settings::default());
    for bad in [
        input("abc", "45", "earth"),
        input("50", "91", "earth"),
        input("201", "45", "earth"),
        input("50", "45", "jupiter"),
    ] {
        assert!(anim.launch_from_input(&bad).is_err(), "{bad:?}");
        assert_eq!(anim.phase(), SimPhase::Idle);
    }

    let custom = LaunchInput {
        custom_gravity: "-3".to_string(),
        ..input("50", "45", "custom")
    };
    assert!(anim.launch_from_input(&custom).is_err());
}

#[test]
fn zero_velocity_lands_on_first_frame() {
    let mut anim = AnimationLoop::new(&Settings::default());
    anim.launch_from_input(&input("0", "45", "earth")).unwrap();
    let (plotted, event) = fly(&mut anim);
    assert_eq!(plotted, 0);
    assert!(matches!(event, TickEvent::Landed { range, .. } if range == 0.0));
}

#[test]
fn horizontal_launch_never_climbs() {
    let engine = TrajectoryEngine::new(40.0, 0.0, 9.8, 30).unwrap();
    assert_eq!(engine.max_height(), 0.0);
    assert_eq!(engine.range(), 0.0);
    assert!(engine.has_landed(engine.time_step()));
}

#[test]
fn zero_fps_is_rejected() {
    assert!(TrajectoryEngine::new(50.0, 45.0, 9.8, 0).is_err());
    assert!(SimulationParameters::new(50.0, 45.0, Gravity::Preset(Planet::Earth), 0).is_err());
}

#[test]
fn bounds_only_grow_until_reset() {
    let mut anim = AnimationLoop::new(&Settings::default());
    let mapper = anim.mapper_mut();
    mapper.set_bounds(50.0, 50.0);
    assert_eq!(mapper.bounds(), DVec2::splat(100.0));
    mapper.set_bounds(200.0, 10.0);
    assert!((mapper.bounds().x - 220.0).abs() < 1e-9);
    assert_eq!(mapper.bounds().y, 100.0);
    mapper.set_bounds(10.0, 10.0);
    assert!((mapper.bounds().x - 220.0).abs() < 1e-9);

    anim.reset();
    assert_eq!(anim.mapper().bounds(), DVec2::splat(100.0));
}

#[test]
fn saved_graphs_survive_restart_and_keep_newest_five() {
    let tmp = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(tmp.path().join("data"));
    let mut graphs = SavedGraphs::load(&storage).unwrap();
    assert!(graphs.is_empty());

    let mut anim = AnimationLoop::new(&Settings::default());
    for v in [10, 20, 30, 40, 50, 60] {
        anim.launch_from_input(&input(&v.to_string(), "45", "moon")).unwrap();
        fly(&mut anim);
        let graph = anim.current_graph().expect("landed flight is saveable");
        graphs.save_graph(graph, &storage).unwrap();
        anim.reset();
    }

    let reloaded = SavedGraphs::load(&storage).unwrap();
    assert_eq!(reloaded, graphs);
    let velocities: Vec<f64> = reloaded.iter().map(|g| g.initial_velocity).collect();
    assert_eq!(velocities, vec![20.0, 30.0, 40.0, 50.0, 60.0]);
    assert!(storage.path_for(SavedGraphs::STORAGE_KEY).exists());
}

#[test]
fn loaded_graph_is_drawn_in_its_own_color() {
    let mut anim = AnimationLoop::new(&Settings::default());
    anim.launch_from_input(&input("25", "70", "earth")).unwrap();
    fly(&mut anim);
    let graph = anim.current_graph().unwrap();
    anim.reset();

    anim.show_graph(&graph).unwrap();
    assert_eq!(anim.phase(), SimPhase::Idle);
    assert_eq!(anim.mapper().points().len(), graph.points.len());
    assert!(
        anim.mapper()
            .points()
            .iter()
            .all(|p| p.kind == PointKind::Loaded)
    );
    assert!(anim.current_graph().is_none());

    // No overlays while a flight is in progress
    anim.launch_from_input(&input("25", "70", "earth")).unwrap();
    assert!(anim.show_graph(&graph).is_err());
}

#[test]
fn corrupt_graph_file_is_backed_up() {
    let tmp = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(tmp.path());
    storage.write(SavedGraphs::STORAGE_KEY, "{not json").unwrap();

    let graphs = SavedGraphs::load(&storage).unwrap();
    assert!(graphs.is_empty());
    assert_eq!(
        storage.read("graphs.bak").unwrap().as_deref(),
        Some("{not json")
    );
}

#[test]
fn settings_persist_and_drive_the_loop() {
    let tmp = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(tmp.path());
    let mut settings = Settings::load(&storage);
    settings.toggle_fps();
    settings.show_grid = false;
    settings.save(&storage).unwrap();

    let settings = Settings::load(&storage);
    let anim = AnimationLoop::new(&settings);
    assert_eq!(anim.fps(), 60);
    assert!(!anim.mapper().show_grid());
}

#[test]
fn long_moon_flight_lands_after_the_walk_cap() {
    let mut anim = AnimationLoop::new(&Settings::default());
    anim.launch_from_input(&input("150", "90", "moon")).unwrap();

    let (plotted, event) = fly(&mut anim);
    assert!(matches!(event, TickEvent::Landed { flight_time, .. } if flight_time > 100.0));
    assert_eq!(anim.phase(), SimPhase::Landed);
    assert!(plotted > 5600);

    let graph = anim.current_graph().expect("landed flight is saveable");
    let last = graph.points.last().unwrap();
    assert!(last.time > 187.0, "last sample at {}", last.time);
    assert!(last.y < 10.0, "last sample {} m up", last.y);
}
