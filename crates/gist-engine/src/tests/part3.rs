use super::*;
use gist_core::frame::Box3;

fn rotate_z(p: [f64; 3], angle: f64) -> [f64; 3] {
    let (s, c) = angle.sin_cos();
    [c * p[0] - s * p[1], s * p[0] + c * p[1], p[2]]
}

fn three_cube_config() -> GistConfig {
    GistConfig::default()
        .with_grid([0.0, 0.0, 0.0], [3, 3, 3], 1.0)
        .with_use_com(false)
        .with_imaging(false)
}

#[test]
fn perfect_tetrahedron_scores_unit_order() {
    let top = water_topology(5);
    let mut frame = water_coords([0.0, 0.0, 0.0]);
    let scale = 2.0 / 3.0f64.sqrt();
    for dir in [
        [1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
    ] {
        frame.extend(water_coords([
            dir[0] * scale,
            dir[1] * scale,
            dir[2] * scale,
        ]));
    }
    let cfg = three_cube_config()
        .with_order(true)
        .with_skip_energy(true)
        .with_skip_entropy(true);
    let out = run_gist(cfg, &top, vec![frame], Box3::None);
    let central = 13; // voxel (1,1,1)
    assert_eq!(out.n_waters[central], 1);
    assert!((out.order_norm[central] - 1.0).abs() < 1e-6);
}

#[test]
fn order_is_disabled_below_five_solvent_molecules() {
    let top = water_topology(2);
    let mut frame = water_coords([0.1, 0.0, 0.0]);
    frame.extend(water_coords([-0.3, 0.2, 0.0]));
    let cfg = three_cube_config().with_order(true).with_skip_energy(true);
    let out = run_gist(cfg, &top, vec![frame], Box3::None);
    for v in 0..27 {
        assert_eq!(out.order_norm[v], 0.0);
    }
}

#[test]
fn boundary_voxels_are_skipped_for_translational_entropy() {
    let top = water_topology(2);
    let mut frame = water_coords([-1.2, -1.2, -1.2]);
    frame.extend(water_coords([-1.3, -1.1, -1.2]));
    let cfg = three_cube_config().with_skip_energy(true);
    let out = run_gist(cfg, &top, vec![frame], Box3::None);
    let corner = 0; // voxel (0,0,0)
    assert_eq!(out.n_waters[corner], 2);
    assert_eq!(out.dtstrans_dens[corner], 0.0);
    assert_eq!(out.dtssix_dens[corner], 0.0);
    // Orientational entropy is not boundary-filtered.
    assert!(out.dtsorient_dens[corner].abs() > 0.0);
}

#[test]
fn interior_voxel_gets_translational_and_six_dim_entropy() {
    let top = water_topology(2);
    let mut frame = water_coords([0.1, 0.0, 0.0]);
    frame.extend(water_coords([-0.15, 0.05, 0.0]));
    let cfg = three_cube_config().with_skip_energy(true);
    let out = run_gist(cfg, &top, vec![frame], Box3::None);
    let central = 13;
    assert_eq!(out.n_waters[central], 2);
    assert!(out.dtstrans_dens[central].abs() > 0.0);
    assert!(out.dtssix_dens[central].abs() > 0.0);
    assert_eq!(out.summary.nwtt, 2);
    assert_eq!(out.summary.nwts, 2);
}

#[test]
fn neighboring_voxel_samples_are_searched_within_layers() {
    let top = water_topology(2);
    // Central voxel and its +x neighbor, one water each.
    let mut frame = water_coords([0.2, 0.0, 0.0]);
    frame.extend(water_coords([0.8, 0.0, 0.0]));
    let cfg = three_cube_config().with_skip_energy(true);
    let out = run_gist(cfg, &top, vec![frame], Box3::None);
    let central = 13;
    assert_eq!(out.n_waters[central], 1);
    // The lone water still finds its neighbor one layer over.
    assert!(out.dtstrans_dens[central].abs() > 0.0);
}

#[test]
fn exact_and_legacy_nn_volume_formulas_differ() {
    let top = water_topology(2);
    let mut frame = water_coords([0.1, 0.0, 0.0]);
    let rotated: Vec<[f64; 3]> = water_coords([0.0, 0.0, 0.0])
        .iter()
        .map(|p| {
            let r = rotate_z([p[0], p[1], p[2]], std::f64::consts::FRAC_PI_2);
            [r[0] - 0.2, r[1], r[2]]
        })
        .collect();
    frame.extend(rotated);
    let exact = run_gist(
        three_cube_config().with_skip_energy(true),
        &top,
        vec![frame.clone()],
        Box3::None,
    );
    let legacy = run_gist(
        three_cube_config()
            .with_skip_energy(true)
            .with_exact_nn_volume(false),
        &top,
        vec![frame],
        Box3::None,
    );
    let central = 13;
    assert!(
        (exact.dtsorient_dens[central] - legacy.dtsorient_dens[central]).abs() > 1e-9,
        "exact and legacy orientational estimates should disagree"
    );
}

#[test]
fn uniform_rotation_preserves_grid_totals() {
    let top = water_topology(2);
    let mut frame = water_coords([0.4, 0.3, 0.2]);
    frame.extend(water_coords([-0.6, 0.5, -0.3]));
    let rotated: Vec<[f64; 3]> = frame
        .iter()
        .map(|&p| rotate_z(p, std::f64::consts::FRAC_PI_2))
        .collect();
    let cfg = GistConfig::default()
        .with_grid([0.0, 0.0, 0.0], [2, 2, 2], 2.0)
        .with_use_com(false)
        .with_imaging(false);
    let a = run_gist(cfg.clone(), &top, vec![frame], Box3::None);
    let b = run_gist(cfg, &top, vec![rotated], Box3::None);
    assert_eq!(
        a.n_waters.iter().sum::<u32>(),
        b.n_waters.iter().sum::<u32>()
    );
    assert!((a.summary.eww_total - b.summary.eww_total).abs() < 1e-9);
    let dip_a: f64 = a.dipole_dens.iter().sum();
    let dip_b: f64 = b.dipole_dens.iter().sum();
    assert!((dip_a - dip_b).abs() < 1e-9);
    let so_a: f64 = a.dtsorient_dens.iter().sum();
    let so_b: f64 = b.dtsorient_dens.iter().sum();
    assert!((so_a - so_b).abs() < 1e-9);
}

#[test]
fn report_has_header_and_one_row_per_voxel() {
    let top = water_topology(1);
    let out = run_gist(
        unit_grid_config(),
        &top,
        vec![water_coords([0.5, 0.5, 0.5])],
        Box3::None,
    );
    let mut buf = Vec::new();
    out.write_report(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2 + 8);
    assert!(lines[0].starts_with("GIST Output v4 spacing=1.0000"));
    assert!(lines[0].contains("dims=2,2,2"));
    assert!(lines[1].starts_with("voxel\txcoord"));
    assert!(lines[1].contains("g_O"));
    assert!(lines[1].contains("order-norm"));
    assert!(lines[2].starts_with("0\t"));
    let first_row: Vec<&str> = lines[2].split('\t').collect();
    // voxel, xyz, population, two element columns, 17 field columns.
    assert_eq!(first_row.len(), 5 + 2 + 17);
    assert_eq!(first_row[4], "1");
}
