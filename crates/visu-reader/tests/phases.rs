//! Discovery and execution phases against the scripted solver.

use std::path::PathBuf;

use visu_core::MeshDimension;
use visu_mesh::CellKind;
use visu_reader::{
    BlockKind, DataObject, ExecutionRequest, NoTimeAttribute, OutputInformation, PhaseError,
    Reader, ReaderConfig,
};
use visu_test_utils::fixtures::{quad_grid, values_for};
use visu_test_utils::{
    scratch_dir, state_files, CommEvent, MapTimeAttribute, MockSolver, RawBlock,
    ThreadCommunicator,
};

type TestReader<T = NoTimeAttribute> = Reader<MockSolver, ThreadCommunicator, T>;

fn config(tag: &str) -> ReaderConfig {
    ReaderConfig {
        scratch_dir: scratch_dir(tag),
        dimension: MeshDimension::Two,
        ..Default::default()
    }
}

/// DG: 2x1 quads with Density. FV: one quad with Density.
fn solver_with_quads(offered: &[&str]) -> MockSolver {
    let mut dg = quad_grid(2, 1);
    dg.values = values_for(dg.n_points(), &[1]);
    let mut fv = quad_grid(1, 1);
    fv.values = values_for(fv.n_points(), &[1]);
    MockSolver::offering(offered).with_output(dg, fv, &["Density"], &[1])
}

fn reader_with_files(tag: &str, solver: MockSolver, count: usize) -> (TestReader, Vec<PathBuf>) {
    let dir = scratch_dir(tag);
    let files = state_files(&dir, count);
    let mut reader = Reader::new(config(tag), solver, ThreadCommunicator::solo(), NoTimeAttribute);
    for f in &files {
        reader.add_file(f).unwrap();
    }
    (reader, files)
}

#[test]
fn discovery_publishes_times_and_default_selection() {
    let solver = MockSolver::offering(&["Density", "Pressure", "ElemData:FV_Elems"]);
    let (mut reader, files) = reader_with_files("discover", solver, 2);

    let mut info = OutputInformation::default();
    let added = reader.request_information(&mut info).unwrap();

    assert_eq!(added, 3);
    assert_eq!(info.time_steps, vec![0.0, 0.0]);
    assert_eq!(info.time_range, Some((0.0, 0.0)));
    assert!(info.can_handle_piece_request);
    let enabled: Vec<&str> = reader.catalog().enabled_names().collect();
    assert_eq!(enabled, vec!["Density", "ElemData:FV_Elems"]);
    assert_eq!(reader.solver().information_calls, vec![(91, files[0].clone())]);
}

#[test]
fn discovery_without_files_skips_the_solver() {
    let mut reader: TestReader = Reader::new(
        config("nofiles"),
        MockSolver::offering(&["Density"]),
        ThreadCommunicator::solo(),
        NoTimeAttribute,
    );
    let mut info = OutputInformation::default();
    let err = reader.request_information(&mut info).unwrap_err();
    assert!(matches!(err, PhaseError::NoFiles));
    assert!(err.is_setup());
    assert!(info.time_steps.is_empty());
    assert!(reader.solver().information_calls.is_empty());
}

#[test]
fn malformed_name_table_is_a_validation_error() {
    let solver = MockSolver::offering(&[]).with_offered_bytes(vec![b'x'; 300]);
    let (mut reader, _) = reader_with_files("badnames", solver, 1);
    let err = reader
        .request_information(&mut OutputInformation::default())
        .unwrap_err();
    assert!(err.is_validation());
    assert!(reader.catalog().is_empty());
}

#[test]
fn execution_writes_settings_in_enable_order() {
    let (mut reader, _) = reader_with_files("settings", solver_with_quads(&["Density", "Mach"]), 1);
    reader
        .request_information(&mut OutputInformation::default())
        .unwrap();
    reader.catalog_mut().set_enabled("Mach", true);
    reader.set_resolution(5);
    reader.set_dimension(MeshDimension::Three);

    let mut out = DataObject::multi_block();
    // The quad buffers do not fit hexahedra; only the settings matter here.
    let _ = reader.request_data(&ExecutionRequest::default(), &mut out);

    let settings = reader.solver().last_settings().unwrap();
    let lines: Vec<&str> = settings.lines().collect();
    assert!(lines.contains(&"NVisu = 5"));
    assert!(lines.contains(&"VisuDimension = 3"));
    let vars: Vec<&str> = lines
        .iter()
        .filter(|l| l.starts_with("VarName"))
        .copied()
        .collect();
    assert_eq!(vars, vec!["VarName = Density", "VarName = Mach"]);
}

#[test]
fn execution_fills_both_blocks_and_releases_once() {
    let (mut reader, files) = reader_with_files("fill", solver_with_quads(&["Density"]), 1);
    reader
        .request_information(&mut OutputInformation::default())
        .unwrap();

    let mut out = DataObject::multi_block();
    let summary = reader
        .request_data(&ExecutionRequest::default(), &mut out)
        .unwrap();

    assert_eq!(summary.timestep, 0);
    assert_eq!(summary.state_file, files[0]);
    assert_eq!((summary.dg.points, summary.dg.cells), (6, 2));
    assert_eq!((summary.fv.points, summary.fv.cells), (4, 1));

    let blocks = out.as_multi_block().unwrap();
    assert_eq!(blocks.n_blocks(), 2);
    let dg = blocks.get(BlockKind::Dg).unwrap();
    assert_eq!(dg.kind(), CellKind::Quad);
    assert_eq!(dg.cell(1), Some(&[1, 2, 5, 4][..]));
    assert_eq!(dg.field("Density").unwrap().tuple_count(), 6);

    let solver = reader.solver();
    assert_eq!(solver.produced.len(), 1);
    assert_eq!(solver.releases, 1);
    assert!(!solver.is_live());
    assert!(!solver.produced[0].settings_file.exists());
    assert_eq!(reader.loaded_file(), Some(files[0].as_path()));
}

#[test]
fn solver_failure_still_releases() {
    let solver = solver_with_quads(&["Density"]).failing_produce(3);
    let (mut reader, _) = reader_with_files("produce-fail", solver, 1);

    let mut out = DataObject::multi_block();
    let err = reader
        .request_data(&ExecutionRequest::default(), &mut out)
        .unwrap_err();
    assert!(matches!(err, PhaseError::Solver(_)));
    assert_eq!(reader.solver().releases, 1);
    assert!(reader.loaded_file().is_none());
}

#[test]
fn wrong_output_type_is_rejected_and_released() {
    let (mut reader, _) = reader_with_files("downcast", solver_with_quads(&["Density"]), 1);
    let mut out = DataObject::Empty;
    let err = reader
        .request_data(&ExecutionRequest::default(), &mut out)
        .unwrap_err();
    assert!(matches!(err, PhaseError::OutputType { found: "None" }));
    assert_eq!(reader.solver().releases, 1);
    assert_eq!(out, DataObject::Empty);
}

#[test]
fn one_bad_block_keeps_the_other() {
    let mut fv = quad_grid(1, 1);
    fv.nodeids.truncate(3);
    fv.values = values_for(fv.n_points(), &[1]);
    let solver = solver_with_quads(&["Density"]).with_fv(fv);
    let (mut reader, _) = reader_with_files("partial", solver, 1);

    let mut out = DataObject::multi_block();
    let err = reader
        .request_data(&ExecutionRequest::default(), &mut out)
        .unwrap_err();
    assert!(matches!(
        err,
        PhaseError::Validation {
            block: BlockKind::Fv,
            ..
        }
    ));
    let blocks = out.as_multi_block().unwrap();
    assert!(blocks.get(BlockKind::Dg).is_some());
    assert!(blocks.get(BlockKind::Fv).is_none());
    assert_eq!(reader.solver().releases, 1);
    assert!(reader.needs_execution(None));
}

#[test]
fn invalid_resolution_never_reaches_the_solver() {
    let (mut reader, _) = reader_with_files("resolution", solver_with_quads(&["Density"]), 1);
    reader.set_resolution(0);
    let err = reader
        .request_data(&ExecutionRequest::default(), &mut DataObject::multi_block())
        .unwrap_err();
    assert!(err.is_setup());
    assert!(reader.solver().produced.is_empty());
    assert_eq!(reader.solver().releases, 0);
}

#[test]
fn unwritable_scratch_dir_is_a_setup_error() {
    let (mut reader, _) = reader_with_files("scratch", solver_with_quads(&["Density"]), 1);
    let mut cfg = reader.config().clone();
    cfg.scratch_dir = cfg.scratch_dir.join("missing/nested");
    reader.set_config(cfg);
    let err = reader
        .request_data(&ExecutionRequest::default(), &mut DataObject::multi_block())
        .unwrap_err();
    assert!(matches!(err, PhaseError::Params(_)));
    assert!(err.is_setup());
}

#[test]
fn vanished_state_directory_fails_both_phases_locally() {
    let (mut reader, files) = reader_with_files("vanished", solver_with_quads(&["Density"]), 1);
    let parent = files[0].parent().unwrap().to_path_buf();
    std::fs::remove_dir_all(&parent).unwrap();

    let mut info = OutputInformation::default();
    let err = reader.request_information(&mut info).unwrap_err();
    assert!(matches!(&err, PhaseError::ChangeDirectory { dir, .. } if *dir == parent));
    assert!(err.is_setup());
    assert_eq!(info.time_steps, vec![0.0]);
    assert!(reader.solver().information_calls.is_empty());

    let err = reader
        .request_data(&ExecutionRequest::default(), &mut DataObject::multi_block())
        .unwrap_err();
    assert!(matches!(err, PhaseError::ChangeDirectory { .. }));
    assert!(reader.solver().produced.is_empty());
    assert_eq!(reader.solver().releases, 0);
    assert!(reader.loaded_file().is_none());

    let refused = CommEvent::AllOk {
        local: false,
        global: false,
    };
    assert_eq!(
        reader.communicator().events(),
        vec![refused, refused, CommEvent::Barrier]
    );
}

#[test]
fn nearest_timestep_is_loaded() {
    let dir = scratch_dir("nearest");
    let files = state_files(&dir, 3);
    let times = MapTimeAttribute::new()
        .with(&files[0], 0.0)
        .with(&files[1], 0.5)
        .with(&files[2], 1.0);
    let mut reader: TestReader<MapTimeAttribute> = Reader::new(
        config("nearest"),
        solver_with_quads(&["Density"]),
        ThreadCommunicator::solo(),
        times,
    );
    for f in &files {
        reader.add_file(f).unwrap();
    }

    let mut info = OutputInformation::default();
    reader.request_information(&mut info).unwrap();
    assert_eq!(info.time_steps, vec![0.0, 0.5, 1.0]);
    assert_eq!(info.time_range, Some((0.0, 1.0)));

    let summary = reader
        .request_data(&ExecutionRequest::at(0.7), &mut DataObject::multi_block())
        .unwrap();
    assert_eq!(summary.timestep, 1);
    assert_eq!(summary.time, 0.5);
    assert_eq!(reader.solver().produced[0].state_file, files[1]);

    assert!(!reader.needs_execution(Some(0.6)));
    assert!(reader.needs_execution(Some(0.9)));
    assert!(reader.needs_execution(None));
}

#[test]
fn modifications_request_execution() {
    let (mut reader, _) = reader_with_files("dirty", solver_with_quads(&["Density", "Mach"]), 1);
    reader
        .request_information(&mut OutputInformation::default())
        .unwrap();
    assert!(reader.needs_execution(None));
    reader
        .request_data(&ExecutionRequest::default(), &mut DataObject::multi_block())
        .unwrap();
    assert!(!reader.needs_execution(None));

    reader.set_resolution(1);
    assert!(!reader.needs_execution(None), "unchanged value");
    reader.set_node_type(visu_params::NodeType::Gauss);
    assert!(reader.needs_execution(None));

    reader
        .request_data(&ExecutionRequest::default(), &mut DataObject::multi_block())
        .unwrap();
    reader.catalog_mut().set_enabled("Mach", true);
    assert!(reader.needs_execution(None));
}

#[test]
fn overrides_reach_the_solver() {
    let (mut reader, _) = reader_with_files("overrides", solver_with_quads(&["Density"]), 1);
    reader.set_mesh_override(Some(PathBuf::from("../mesh/cube_mesh.h5")));
    reader.set_parameter_override(Some(PathBuf::from("parameter_posti.ini")));
    reader.set_dg_only(true);
    reader
        .request_data(&ExecutionRequest::default(), &mut DataObject::multi_block())
        .unwrap();

    let call = &reader.solver().produced[0];
    assert!(call.settings.contains("MeshFile = ../mesh/cube_mesh.h5\n"));
    assert!(call.settings.contains("DGonly = T\n"));
    assert_eq!(
        call.parameter_override.as_deref(),
        Some(std::path::Path::new("parameter_posti.ini"))
    );
}

#[test]
fn dg_only_run_accepts_an_empty_fv_block() {
    let solver = solver_with_quads(&["Density"]).with_fv(RawBlock::default());
    let (mut reader, _) = reader_with_files("dg-only-empty", solver, 1);
    reader.set_dg_only(true);

    let mut out = DataObject::multi_block();
    let summary = reader
        .request_data(&ExecutionRequest::default(), &mut out)
        .unwrap();
    assert_eq!((summary.dg.points, summary.dg.cells), (6, 2));
    assert_eq!(
        (summary.fv.points, summary.fv.cells, summary.fv.fields),
        (0, 0, 1)
    );

    let fv = out.as_multi_block().unwrap().get(BlockKind::Fv).unwrap();
    assert_eq!(fv.n_points(), 0);
    assert_eq!(fv.n_cells(), 0);
    let density = fv.field("Density").unwrap();
    assert_eq!((density.components(), density.tuple_count()), (1, 0));
    assert_eq!(reader.solver().releases, 1);
}

#[test]
fn reload_keeps_existing_statuses() {
    let (mut reader, _) = reader_with_files("reload", MockSolver::offering(&["Density", "Mach"]), 1);
    reader
        .request_information(&mut OutputInformation::default())
        .unwrap();
    reader.catalog_mut().set_enabled("Density", false);
    reader.catalog_mut().set_enabled("Mach", true);

    reader.remove_all_files();
    assert!(reader.timesteps().is_empty());
    assert!(reader.loaded_file().is_none());

    let dir = scratch_dir("reload-second");
    for f in state_files(&dir, 1) {
        reader.add_file(f).unwrap();
    }
    reader
        .request_information(&mut OutputInformation::default())
        .unwrap();

    let statuses: Vec<(&str, bool)> = reader.catalog().iter().collect();
    assert_eq!(statuses, vec![("Density", false), ("Mach", true)]);
}

#[test]
fn node_type_list_matches_solver_names() {
    let reader: TestReader = Reader::new(
        config("nodetypes"),
        MockSolver::default(),
        ThreadCommunicator::solo(),
        NoTimeAttribute,
    );
    let names: Vec<&str> = reader.node_type_list().iter().map(|t| t.as_str()).collect();
    assert_eq!(names, vec!["VISU", "GAUSS", "GAUSS-LOBATTO", "VISU_INNER"]);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn earliest_nearest(times: &[f64], query: f64) -> usize {
        let mut best = 0;
        for (i, t) in times.iter().enumerate() {
            if (t - query).abs() < (times[best] - query).abs() {
                best = i;
            }
        }
        best
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn loads_the_nearest_file(
            quarters in prop::collection::vec(0u8..40, 1..6),
            query in 0u8..40,
        ) {
            let times: Vec<f64> = quarters.iter().map(|&q| f64::from(q) / 4.0).collect();
            let query = f64::from(query) / 4.0;
            let files = state_files(&scratch_dir("prop-nearest"), times.len());
            let mut source = MapTimeAttribute::new();
            for (f, &t) in files.iter().zip(&times) {
                source.insert(f, t);
            }
            let mut reader: TestReader<MapTimeAttribute> = Reader::new(
                config("prop-nearest"),
                solver_with_quads(&["Density"]),
                ThreadCommunicator::solo(),
                source,
            );
            for f in &files {
                reader.add_file(f).unwrap();
            }

            let summary = reader
                .request_data(&ExecutionRequest::at(query), &mut DataObject::multi_block())
                .unwrap();
            let expected = earliest_nearest(&times, query);
            prop_assert_eq!(summary.timestep, expected);
            prop_assert_eq!(&summary.state_file, &files[expected]);
            prop_assert!(!reader.needs_execution(Some(query)));
        }
    }
}
