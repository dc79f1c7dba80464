// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! End-to-end scenarios over the public facade.

use std::f64::consts::FRAC_PI_2;

use float_eq::assert_float_eq;

use algol::bodies::system::CharacteristicRadii;
use algol::prelude::*;
use algol::roche::{critical_potential, lagrangian_points};

fn star(mass: f64, potential: f64, synchronicity: f64) -> Star {
    Star::new(
        mass,
        potential,
        synchronicity,
        5000.0,
        1.0,
        0.6,
        0.0,
        10f64.to_radians(),
    )
    .unwrap()
}

fn orbital(period_days: f64, eccentricity: f64) -> OrbitalParams {
    OrbitalParams {
        period: period_days * 86_400.0,
        eccentricity,
        inclination: FRAC_PI_2,
        argument_of_periastron: FRAC_PI_2,
        primary_minimum_time: 0.0,
        phase_shift: 0.0,
        gamma: 0.0,
    }
}

fn spherical_control() -> BinarySystem {
    BinarySystem::new(star(2.0, 100.0, 1.0), star(1.0, 100.0, 1.0), orbital(2.0, 0.0)).unwrap()
}

#[test]
fn scenario_spherical_detached_control() {
    let system = spherical_control();
    assert_eq!(system.morphology(), Morphology::Detached);

    let CharacteristicRadii { polar, side, .. } = system
        .characteristic_radii(Component::Primary, 1.0)
        .unwrap();
    // compact components are spherical to five decimal places
    assert_float_eq!(polar, 0.01005, abs <= 5e-6);
    assert_float_eq!(side, polar, abs <= 1e-5);

    let atlas = PlanckAtlas::default();
    let ld = ConstantLd::default();
    let bands = [Passband::bolometric()];
    let config = CurveConfig {
        reflection_effect: false,
        ..Default::default()
    };
    let engine = CurveEngine::new(&system, &atlas, &ld, &bands, config).unwrap();
    let curves = engine.light_curves(&[0.0, 0.25, 0.5, 0.75]).unwrap();
    assert_eq!(curves.mode, CurveMode::CircularSynchronous);

    let flux = curves.band("bolometric").unwrap();
    // mirror symmetry around phase 0.5
    assert_float_eq!(flux[1], flux[3], rel <= 1e-6);
    // equal-temperature components eclipse at both conjunctions; the
    // primary minimum is deeper because the small companion transits the
    // limb-brightened disc centre
    assert!(flux[0] < flux[1]);
    assert!(flux[2] < flux[1]);
    assert!(flux[0] < flux[2]);
}

#[test]
fn scenario_eccentric_asynchronous_detached() {
    let system = BinarySystem::new(
        star(2.0, 4.8, 1.5),
        star(1.0, 4.0, 1.2),
        orbital(1.0, 0.3),
    )
    .unwrap();
    assert_eq!(system.morphology(), Morphology::Detached);

    // the forward radius swells from periastron to apastron
    let peri = system
        .characteristic_radii(Component::Primary, 0.7)
        .unwrap();
    let apo = system
        .characteristic_radii(Component::Primary, 1.3)
        .unwrap();
    assert!(apo.forward.unwrap() > peri.forward.unwrap());

    let surface = build_surface(&system, Component::Primary, 0.7).unwrap();
    let faces = surface.mesh.faces.len();
    // closed four-fold symmetric triangulation at alpha = 10 degrees
    assert_eq!(surface.mesh.euler_characteristic(), 2);
    assert_eq!(faces % 4, 0);
    assert!((600..1200).contains(&faces), "face count {faces}");
}

#[test]
fn scenario_over_contact() {
    let system = BinarySystem::new(star(2.0, 2.7, 1.0), star(1.0, 2.7, 1.0), orbital(0.5, 0.0))
        .unwrap();
    assert_eq!(system.morphology(), Morphology::OverContact);

    let solver_p = system.solver(Component::Primary);
    let solver_s = system.solver(Component::Secondary);
    let neck = algol::roche::neck_position(&solver_p, &solver_s).unwrap();
    // narrowest place of the shared envelope for q = 0.5, Omega = 2.7
    assert_float_eq!(neck, 0.584, abs <= 0.02);

    let primary = build_surface(&system, Component::Primary, 1.0).unwrap();
    let secondary = build_surface(&system, Component::Secondary, 1.0).unwrap();
    for surface in [&primary, &secondary] {
        let faces = surface.mesh.faces.len();
        assert_eq!(faces % 2, 0);
        assert!((300..1400).contains(&faces), "face count {faces}");
    }

    // the envelope still produces a sane light curve
    let atlas = PlanckAtlas::default();
    let ld = ConstantLd::default();
    let bands = [Passband::bolometric()];
    let config = CurveConfig {
        reflection_effect: false,
        ..Default::default()
    };
    let engine = CurveEngine::new(&system, &atlas, &ld, &bands, config).unwrap();
    let curves = engine.light_curves(&[0.0, 0.25, 0.5, 0.75]).unwrap();
    let flux = curves.band("bolometric").unwrap();
    assert!(flux.iter().all(|&f| f > 0.0));
    assert!(flux[0] < flux[1]);
}

#[test]
fn scenario_semi_detached() {
    let system = BinarySystem::new(
        star(2.0, 2.875844632141054, 1.0),
        star(1.0, 2.875844632141054, 1.0),
        orbital(2.0, 0.0),
    )
    .unwrap();
    assert_eq!(system.morphology(), Morphology::SemiDetached);
}

#[test]
fn scenario_critical_potentials() {
    // q = 0.5, F1 = 1.5, F2 = 1.2 at the periastron of e = 0.3
    let system = BinarySystem::new(
        star(2.0, 4.8, 1.5),
        star(1.0, 4.0, 1.2),
        orbital(1.0, 0.3),
    )
    .unwrap();
    let d = system.orbit().periastron_distance();
    assert_float_eq!(
        critical_potential(system.potential(Component::Primary), d).unwrap(),
        4.027577786,
        abs <= 1e-8
    );
    assert_float_eq!(
        critical_potential(system.potential(Component::Secondary), d).unwrap(),
        3.898140727,
        abs <= 1e-8
    );
    // and the classical synchronous Lagrange points for q = 0.5
    let points = lagrangian_points(0.5, 1.0).unwrap();
    assert_float_eq!(points.l1, 0.5707515715, abs <= 1e-8);
}

#[test]
fn scenario_spot_survival_and_replacement() {
    let spot = |radius_deg: f64, factor: f64| Spot {
        longitude: FRAC_PI_2,
        latitude: 58f64.to_radians(),
        angular_radius: radius_deg.to_radians(),
        temperature_factor: factor,
        discretization_factor: None,
    };

    // a single spot survives insertion
    let one = star(2.0, 100.0, 1.0).with_spots(vec![spot(17.0, 0.9)]).unwrap();
    let system = BinarySystem::new(one, star(1.0, 100.0, 1.0), orbital(2.0, 0.0)).unwrap();
    let surface = build_surface(&system, Component::Primary, 1.0).unwrap();
    assert!(surface.face_spot.iter().any(|l| *l == Some(0)));

    // a second co-centred wider spot replaces it entirely
    let two = star(2.0, 100.0, 1.0)
        .with_spots(vec![spot(17.0, 0.9), spot(25.0, 0.8)])
        .unwrap();
    let system = BinarySystem::new(two, star(1.0, 100.0, 1.0), orbital(2.0, 0.0)).unwrap();
    let surface = build_surface(&system, Component::Primary, 1.0).unwrap();
    assert!(surface.face_spot.iter().all(|l| *l != Some(0)));
    assert!(surface.face_spot.iter().any(|l| *l == Some(1)));
    // spot insertion preserves the closed-surface topology
    assert_eq!(surface.mesh.euler_characteristic(), 2);
}

#[test]
fn scenario_eccentric_curve_modes() {
    let system = BinarySystem::new(
        star(2.0, 4.8, 1.5),
        star(1.0, 4.0, 1.2),
        orbital(1.0, 0.3),
    )
    .unwrap();
    let atlas = PlanckAtlas::default();
    let ld = ConstantLd::default();
    let bands = [Passband::bolometric()];
    let config = CurveConfig {
        reflection_effect: false,
        ..Default::default()
    };
    let engine = CurveEngine::new(&system, &atlas, &ld, &bands, config).unwrap();

    let phases: Vec<f64> = (0..10).map(|i| i as f64 / 10.0).collect();
    let curves = engine.light_curves(&phases).unwrap();
    assert_eq!(curves.mode, CurveMode::ApsidalMirror);
    assert!(curves.band("bolometric").unwrap().iter().all(|&f| f > 0.0));

    // a narrow phase window falls back to similarity reuse
    let narrow: Vec<f64> = (0..5).map(|i| 0.3 + 0.02 * i as f64).collect();
    let curves = engine.light_curves(&narrow).unwrap();
    assert_eq!(curves.mode, CurveMode::SimilarityReuse);
}

#[test]
fn scenario_radial_velocities_integrate_to_gamma() {
    let mut params = orbital(2.0, 0.3);
    params.gamma = 5_000.0;
    let system = BinarySystem::new(star(2.0, 100.0, 1.5), star(1.0, 100.0, 1.2), params).unwrap();
    let atlas = PlanckAtlas::default();
    let ld = ConstantLd::default();
    let bands = [Passband::bolometric()];
    let engine =
        CurveEngine::new(&system, &atlas, &ld, &bands, CurveConfig::default()).unwrap();
    let phases: Vec<f64> = (0..256).map(|i| i as f64 / 256.0).collect();
    let rv = engine.radial_velocity_curves(&phases).unwrap();
    let mean: f64 = rv.primary.iter().sum::<f64>() / rv.primary.len() as f64;
    assert_float_eq!(mean, 5_000.0, abs <= 60.0);
    let mean_s: f64 = rv.secondary.iter().sum::<f64>() / rv.secondary.len() as f64;
    assert_float_eq!(mean_s, 5_000.0, abs <= 120.0);
}

#[test]
fn scenario_community_record_equivalence() {
    // the community (q, a sin i) record reproduces the standard system
    let component = |mass: Option<f64>| ComponentRecord {
        mass,
        surface_potential: 100.0,
        synchronicity: 1.0,
        t_eff: 5000.0,
        gravity_darkening: 1.0,
        albedo: 0.6,
        metallicity: 0.0,
        discretization_factor: 10f64.to_radians(),
        spots: vec![],
        pulsations: vec![],
    };
    let standard = SystemRecord {
        primary: component(Some(2.0)),
        secondary: component(Some(1.0)),
        period: 2.0 * 86_400.0,
        eccentricity: 0.0,
        inclination: FRAC_PI_2,
        argument_of_periastron: FRAC_PI_2,
        primary_minimum_time: 0.0,
        phase_shift: 0.0,
        gamma: 0.0,
        mass_ratio: None,
        asini: None,
    };
    let system = standard.assemble().unwrap();

    let community = SystemRecord {
        primary: component(None),
        secondary: component(None),
        mass_ratio: Some(0.5),
        asini: Some(system.semi_major_axis()),
        ..standard.clone()
    };
    let equivalent = community.assemble().unwrap();
    assert_float_eq!(
        equivalent.semi_major_axis(),
        system.semi_major_axis(),
        rel <= 1e-9
    );
    assert_float_eq!(equivalent.mass_ratio(), 0.5, rel <= 1e-9);
}
