mod common;

use wildfire_sim_core::wildfire::{
    BurnOut, BurnState, Clock, Flammability, IgnitionSet, Material, NoIgnition, Regrowth,
    SpreadModel, TerrainConfig, TreeStage, WildfireAutomaton, WildfireCell, WildfireConfig,
    WildfireGrid, WindDirection,
};

const DT: f32 = 0.1;

fn run(
    automaton: &WildfireAutomaton,
    grid: &mut WildfireGrid,
    ticks: u64,
    mut on_tick: impl FnMut(&WildfireGrid),
) {
    let mut clock = Clock::default();
    for _ in 0..ticks {
        automaton.step(grid, clock, &NoIgnition).unwrap();
        on_tick(grid);
        clock = clock.next(DT);
    }
}

fn everything_burns() -> WildfireConfig {
    WildfireConfig {
        flammability: Flammability::uniform(1.0),
        ..WildfireConfig::spread_only()
    }
}

#[test]
fn test_calm_fire_reaches_every_neighbour_before_burning_out() {
    let config = WildfireConfig {
        burn_out: BurnOut::Stochastic { probability: 0.0 },
        ..everything_burns()
    };
    let automaton = WildfireAutomaton::new(config).unwrap();
    let mut grid = WildfireGrid::new(3, 3, WildfireCell::new(Material::Grass)).unwrap();
    grid.ignite(1, 1);

    let mut ticks_to_full = None;
    let mut tick = 0;
    run(&automaton, &mut grid, 400, |g| {
        tick += 1;
        assert!(g.get(1, 1).unwrap().is_burning(), "source went out");
        if ticks_to_full.is_none() && g.count_by_state(BurnState::OnFire) == 9 {
            ticks_to_full = Some(tick);
        }
    });
    assert!(ticks_to_full.is_some(), "{}", grid.render_ascii());
}

#[test]
fn test_moore_spread_grows_one_ring_per_tick() {
    let config = WildfireConfig {
        spread: SpreadModel::Moore,
        burn_out: BurnOut::Stochastic { probability: 0.0 },
        ..everything_burns()
    };
    let automaton = WildfireAutomaton::new(config).unwrap();
    let mut grid = WildfireGrid::new(9, 9, WildfireCell::default()).unwrap();
    grid.ignite(4, 4);

    let mut rings = Vec::new();
    run(&automaton, &mut grid, 4, |g| {
        rings.push(g.count_by_state(BurnState::OnFire));
    });
    assert_eq!(rings, vec![9, 25, 49, 81]);
}

#[test]
fn test_wind_offsets_never_carry_fire_upwind() {
    let config = WildfireConfig {
        spread: SpreadModel::WindOffsets,
        wind: WindDirection::North,
        burn_out: BurnOut::Stochastic { probability: 0.0 },
        ..everything_burns()
    };
    let automaton = WildfireAutomaton::new(config).unwrap();
    let mut grid = WildfireGrid::new(11, 11, WildfireCell::default()).unwrap();
    grid.ignite(5, 5);
    run(&automaton, &mut grid, 5, |_| {});

    for y in 0..5 {
        for x in 0..11 {
            assert_eq!(grid.get(x, y).unwrap().state, BurnState::NotOnFire);
        }
    }
    // Crosswind: the source row fills sideways
    for x in 0..11 {
        assert!(grid.get(x, 5).unwrap().is_burning());
    }
    assert!(grid.get(5, 10).unwrap().is_burning());
}

#[test]
fn test_weighted_spread_favours_downwind() {
    // West wind blows towards +x
    let config = WildfireConfig {
        wind: WindDirection::West,
        burn_out: BurnOut::Stochastic { probability: 0.1 },
        ..everything_burns()
    };
    let automaton = WildfireAutomaton::new(config).unwrap();
    let mut grid = WildfireGrid::new(41, 41, WildfireCell::default()).unwrap();
    grid.ignite(20, 20);
    run(&automaton, &mut grid, 30, |_| {});

    let touched = |x: u32, y: u32| grid.get(x, y).unwrap().state != BurnState::NotOnFire;
    let mut east = 0;
    let mut west = 0;
    for y in 0..41 {
        for x in 0..41 {
            if touched(x, y) {
                if x > 20 {
                    east += 1;
                } else if x < 20 {
                    west += 1;
                }
            }
        }
    }
    assert!(east > 0);
    assert!(east > west, "east {east} vs west {west}");
}

#[test]
fn test_burnt_ground_regrows() {
    let config = WildfireConfig {
        spread: SpreadModel::Moore,
        regrowth: Regrowth {
            grass: 0.3,
            ..Regrowth::none()
        },
        ..everything_burns()
    };
    let automaton = WildfireAutomaton::new(config).unwrap();
    let mut grid = WildfireGrid::new(8, 8, WildfireCell::default()).unwrap();
    grid.ignite(0, 0);

    let mut regrown = 0;
    let mut clock = Clock::default();
    for _ in 0..60 {
        regrown += automaton.step(&mut grid, clock, &NoIgnition).unwrap().regrown;
        clock = clock.next(DT);
    }
    assert!(regrown > 0);
    assert!(grid
        .cells()
        .iter()
        .filter(|c| c.state == BurnState::NotOnFire)
        .all(|c| c.material == Material::Grass));
}

#[test]
fn test_trees_grow_up() {
    let config = WildfireConfig {
        regrowth: Regrowth {
            tree_growth: 0.5,
            ..Regrowth::none()
        },
        ..WildfireConfig::spread_only()
    };
    let automaton = WildfireAutomaton::new(config).unwrap();
    let sapling = WildfireCell::new(Material::Tree(TreeStage::Sapling));
    let mut grid = WildfireGrid::new(6, 6, sapling).unwrap();
    run(&automaton, &mut grid, 40, |_| {});
    let mature = Material::Tree(TreeStage::Mature);
    assert!(grid.cells().iter().all(|c| c.material == mature));
}

#[test]
fn test_external_ignition_sources() {
    let automaton = WildfireAutomaton::new(everything_burns()).unwrap();
    let mut grid = WildfireGrid::new(5, 5, WildfireCell::default()).unwrap();

    let strike = |x: u32, y: u32, clock: Clock| (x, y) == (2, 2) && clock.frame == 3;
    for frame in 0..3 {
        automaton
            .step(&mut grid, Clock::new(frame as f32, frame), &strike)
            .unwrap();
        assert_eq!(grid.count_by_state(BurnState::OnFire), 0);
    }
    let counts = automaton.step(&mut grid, Clock::new(3.0, 3), &strike).unwrap();
    assert_eq!(counts.ignited, 1);
    assert!(grid.get(2, 2).unwrap().is_burning());

    let mut set = IgnitionSet::new();
    set.insert(4, 0);
    let mut grid = WildfireGrid::new(5, 5, WildfireCell::default()).unwrap();
    automaton.step(&mut grid, Clock::default(), &set).unwrap();
    assert!(grid.get(4, 0).unwrap().is_burning());
}

#[test]
fn test_runs_are_reproducible() {
    let terrain = TerrainConfig {
        seed: 9,
        ..TerrainConfig::default()
    };
    let simulate = |seed: u32| {
        let automaton = WildfireAutomaton::new(WildfireConfig {
            seed,
            ambient_ignition: 0.02,
            ..WildfireConfig::default()
        })
        .unwrap();
        let mut grid = WildfireGrid::generate(48, 32, &terrain).unwrap();
        run(&automaton, &mut grid, 50, |_| {});
        grid
    };

    let a = simulate(3);
    let b = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| simulate(3));
    assert_eq!(a, b);

    let c = simulate(4);
    assert_ne!(a.cells(), c.cells());
}

#[test]
fn test_water_never_burns_by_default() {
    let automaton = WildfireAutomaton::new(WildfireConfig {
        spread: SpreadModel::Moore,
        ..WildfireConfig::spread_only()
    })
    .unwrap();
    let mut grid = WildfireGrid::new(5, 5, WildfireCell::new(Material::Water)).unwrap();
    grid.set(2, 2, WildfireCell::new(Material::Grass));
    grid.ignite(2, 2);
    run(&automaton, &mut grid, 20, |_| {});
    assert_eq!(grid.count_by_state(BurnState::Destroyed), 1);
    assert_eq!(grid.count_by_state(BurnState::NotOnFire), 24);
}
