mod common;

use wildfire_sim_core::wildfire::{Flammability, Regrowth};
use wildfire_sim_core::{
    BurnState, Clock, FireSimulation, GridSize, QualityPreset, SimulationConfig, WildfireConfig,
    WindDirection,
};

fn small(seed: u64) -> SimulationConfig {
    SimulationConfig {
        fluid_size: GridSize::cube(12).unwrap(),
        wildfire_width: 24,
        wildfire_height: 16,
        ..QualityPreset::Low.config().unwrap()
    }
    .with_seed(seed)
}

#[test]
fn test_ticks_share_one_clock() {
    let mut sim = FireSimulation::new(small(1)).unwrap();
    let mut expected = Clock::default();
    for _ in 0..12 {
        let report = sim.tick(0.25).unwrap();
        assert_eq!(report.clock, expected);
        assert_eq!(
            report.states.not_on_fire + report.states.on_fire + report.states.destroyed,
            24 * 16
        );
        expected = expected.next(0.25);
    }
    assert_eq!(sim.clock(), expected);
    assert_eq!(sim.fluid_solver().steps(), 12);
    assert!(sim.frame_timer().average_ms() >= 0.0);
}

#[test]
fn test_emitter_heats_the_fluid() {
    let mut sim = FireSimulation::new(small(2)).unwrap();
    let mut report = sim.tick(0.1).unwrap();
    for _ in 0..9 {
        report = sim.tick(0.1).unwrap();
    }
    assert!(report.fluid.max_temperature > 0.0);
    assert!(report.fluid.max_reaction > 0.0);
    assert!(report.fluid.max_speed.is_finite());
}

#[test]
fn test_persistent_ignition_source() {
    let mut config = small(3);
    config.wildfire = WildfireConfig {
        regrowth: Regrowth {
            grass: 1.0,
            ..Regrowth::none()
        },
        flammability: Flammability::uniform(1.0),
        ..WildfireConfig::spread_only()
    };
    let mut sim = FireSimulation::new(config).unwrap();
    sim.ignition_sources_mut().insert(5, 5);
    sim.set_wind(WindDirection::East);

    // Burning → destroyed → regrown → reignited, every three ticks
    let mut burning_ticks = 0;
    for _ in 0..9 {
        sim.tick(0.1).unwrap();
        if sim.wildfire_grid().get(5, 5).unwrap().state == BurnState::OnFire {
            burning_ticks += 1;
        }
    }
    assert_eq!(burning_ticks, 3);
    assert_eq!(sim.automaton().config().wind, WindDirection::East);
}

#[test]
fn test_same_seed_same_history() {
    let mut a = FireSimulation::new(small(7)).unwrap();
    let mut b = FireSimulation::new(small(7)).unwrap();
    for _ in 0..15 {
        let ra = a.tick(0.1).unwrap();
        let rb = b.tick(0.1).unwrap();
        assert_eq!(ra.fluid, rb.fluid);
        assert_eq!(ra.wildfire, rb.wildfire);
        assert_eq!(ra.states, rb.states);
    }
    assert_eq!(a.wildfire_grid(), b.wildfire_grid());
    assert_eq!(a.fluid_grid().velocity(), b.fluid_grid().velocity());
}
