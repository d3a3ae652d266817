use super::*;
use gist_core::constants::DEBYE_EA;
use gist_core::frame::Box3;
use gist_core::system::TopologyBuilder;

#[test]
fn single_water_populates_exactly_one_voxel() {
    let top = water_topology(1);
    let out = run_gist(
        unit_grid_config(),
        &top,
        vec![water_coords([0.5, 0.5, 0.5])],
        Box3::None,
    );
    assert_eq!(out.n_waters[0], 1);
    assert_eq!(out.n_waters.iter().sum::<u32>(), 1);
    for v in 1..8 {
        assert_eq!(out.n_waters[v], 0);
    }
}

#[test]
fn two_identical_frames_accumulate_counts_and_dipole() {
    let top = water_topology(1);
    let frame = water_coords([0.5, 0.5, 0.5]);
    let out = run_gist(
        unit_grid_config(),
        &top,
        vec![frame.clone(), frame],
        Box3::None,
    );
    assert_eq!(out.n_waters[0], 2);
    assert_eq!(out.summary.n_frames, 2);
    // Single water, no solute: no pair interactions anywhere.
    for v in 0..8 {
        assert!(out.esw_dens[v].abs() < 1e-12);
        assert!(out.eww_dens[v].abs() < 1e-12);
    }
    // The water dipole is q_H * (d_H1 + d_H2) since the charges sum to zero;
    // the frame-count scaling cancels, leaving one dipole per voxel volume.
    let expected = Q_H * (H1_OFF[1] + H2_OFF[1]) / DEBYE_EA;
    assert!((out.dipole_dens[0] - expected).abs() < 1e-9);
    assert!(out.dipole_x_dens[0].abs() < 1e-9);
    assert!(out.dipole_z_dens[0].abs() < 1e-9);
}

#[test]
fn water_count_matches_on_grid_centers_across_frames() {
    let top = water_topology(3);
    let mut frame = water_coords([0.5, 0.5, 0.5]);
    frame.extend(water_coords([1.5, 1.5, 0.5]));
    frame.extend(water_coords([7.0, 7.0, 7.0])); // far off grid
    let out = run_gist(
        unit_grid_config(),
        &top,
        vec![frame.clone(), frame],
        Box3::None,
    );
    assert_eq!(out.n_waters.iter().sum::<u32>(), 4);
    assert_eq!(out.summary.max_nwat, 2);
}

#[test]
fn density_outputs_are_invariant_under_frame_duplication() {
    let top = water_topology(2);
    let mut frame = water_coords([0.5, 0.5, 0.5]);
    frame.extend(water_coords([1.5, 1.5, 0.5]));
    let once = run_gist(
        unit_grid_config(),
        &top,
        vec![frame.clone()],
        Box3::None,
    );
    let twice = run_gist(
        unit_grid_config(),
        &top,
        vec![frame.clone(), frame],
        Box3::None,
    );
    for v in 0..8 {
        assert!((once.esw_dens[v] - twice.esw_dens[v]).abs() < 1e-10);
        assert!((once.eww_dens[v] - twice.eww_dens[v]).abs() < 1e-10);
        assert!((once.neighbor_dens[v] - twice.neighbor_dens[v]).abs() < 1e-10);
        assert!((once.dipole_dens[v] - twice.dipole_dens[v]).abs() < 1e-10);
        for e in 0..once.g_element.len() {
            assert!((once.g_element[e][v] - twice.g_element[e][v]).abs() < 1e-10);
        }
    }
}

#[test]
fn molecule_in_margin_contributes_atom_density_without_population() {
    let top = water_topology(1);
    // Center is off-grid but inside the 1.5 A window; one hydrogen is on-grid.
    let out = run_gist(
        unit_grid_config(),
        &top,
        vec![water_coords([-0.3, 0.5, 0.5])],
        Box3::None,
    );
    assert_eq!(out.n_waters.iter().sum::<u32>(), 0);
    let g_h: f64 = out.g_element[1].iter().sum();
    assert!(g_h > 0.0);
}

#[test]
fn solute_atoms_on_grid_are_counted() {
    let top = solute_and_waters(1);
    let mut frame = vec![[0.5, 1.5, 0.5]]; // solute
    frame.extend(water_coords([0.5, 0.5, 0.5]));
    let out = run_gist(unit_grid_config(), &top, vec![frame], Box3::None);
    assert_eq!(out.n_solute.iter().sum::<u32>(), 1);
    assert_eq!(out.n_solute[2], 1); // voxel (0, 1, 0)
}

#[test]
fn missing_box_is_fatal_when_imaging_is_on() {
    let top = water_topology(1);
    let cfg = GistConfig::default().with_grid([1.0, 1.0, 1.0], [2, 2, 2], 1.0);
    let mut plan = GistPlan::new(cfg).unwrap();
    let mut traj = InMemoryTraj::new(vec![water_coords([0.5, 0.5, 0.5])], Box3::None);
    let mut exec = Executor::new(top);
    assert!(exec.run_plan(&mut plan, &mut traj).is_err());
}

#[test]
fn topology_without_solvent_is_rejected() {
    let top = TopologyBuilder::new()
        .add_molecule(false, vec![gist_core::system::AtomSpec::new("Na", 1.0, 22.99, 0)])
        .finish()
        .unwrap();
    let mut plan = GistPlan::new(unit_grid_config()).unwrap();
    let mut traj = InMemoryTraj::new(vec![vec![[0.5, 0.5, 0.5]]], Box3::None);
    let mut exec = Executor::new(top);
    assert!(exec.run_plan(&mut plan, &mut traj).is_err());
}

#[test]
fn atom_count_mismatch_is_rejected() {
    let top = water_topology(1);
    let mut plan = GistPlan::new(unit_grid_config()).unwrap();
    let mut traj = InMemoryTraj::new(vec![vec![[0.0, 0.0, 0.0]]], Box3::None);
    let mut exec = Executor::new(top);
    assert!(exec.run_plan(&mut plan, &mut traj).is_err());
}
