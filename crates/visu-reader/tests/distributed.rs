//! Every rank enters the same collectives, even when one rank fails.

use std::path::PathBuf;

use visu_core::MeshDimension;
use visu_reader::{
    Communicator, DataObject, ExecutionRequest, NoTimeAttribute, OutputInformation, PhaseError, Reader,
    ReaderConfig,
};
use visu_test_utils::fixtures::{quad_grid, values_for};
use visu_test_utils::{scratch_dir, state_files, CommEvent, MockSolver, ThreadCommunicator};

const RANKS: usize = 3;

fn solver() -> MockSolver {
    let mut block = quad_grid(1, 1);
    block.values = values_for(block.n_points(), &[1]);
    MockSolver::offering(&["Density", "Pressure"]).with_output(
        block.clone(),
        block,
        &["Density"],
        &[1],
    )
}

struct RankOutcome {
    information: Result<usize, PhaseError>,
    data: Result<usize, PhaseError>,
    events: Vec<CommEvent>,
    information_calls: usize,
    produced: usize,
    releases: usize,
}

/// Run discovery then execution on every rank; `resolution_of` picks each
/// rank's resolution so tests can break one rank's local setup.
///
/// `vanishing` registers its own state files and deletes their directory
/// before either phase runs.
fn run_group(
    tag: &str,
    resolution_of: impl Fn(usize) -> u32 + Sync,
    vanishing: Option<usize>,
) -> Vec<RankOutcome> {
    let dir = scratch_dir(tag);
    let files: Vec<PathBuf> = state_files(&dir, 2);
    let scratch = scratch_dir(&format!("{tag}-scratch"));

    std::thread::scope(|s| {
        let handles: Vec<_> = ThreadCommunicator::group(RANKS)
            .into_iter()
            .map(|comm| {
                let files = &files;
                let scratch = scratch.clone();
                let resolution_of = &resolution_of;
                s.spawn(move || {
                    let config = ReaderConfig {
                        resolution: resolution_of(comm.rank()),
                        dimension: MeshDimension::Two,
                        scratch_dir: scratch,
                        ..Default::default()
                    };
                    let rank = comm.rank();
                    let mut reader = Reader::new(config, solver(), comm, NoTimeAttribute);
                    if vanishing == Some(rank) {
                        let own = scratch_dir(&format!("{tag}-rank{rank}"));
                        for f in state_files(&own, 2) {
                            reader.add_file(f).unwrap();
                        }
                        std::fs::remove_dir_all(&own).unwrap();
                    } else {
                        for f in files {
                            reader.add_file(f).unwrap();
                        }
                    }
                    let information = reader.request_information(&mut OutputInformation::default());
                    let data = reader
                        .request_data(&ExecutionRequest::default(), &mut DataObject::multi_block())
                        .map(|summary| summary.dg.cells);
                    RankOutcome {
                        information,
                        data,
                        events: reader.communicator().events(),
                        information_calls: reader.solver().information_calls.len(),
                        produced: reader.solver().produced.len(),
                        releases: reader.solver().releases,
                    }
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

fn globals(events: &[CommEvent]) -> Vec<Option<bool>> {
    events
        .iter()
        .map(|e| match e {
            CommEvent::Barrier => None,
            CommEvent::AllOk { global, .. } => Some(*global),
        })
        .collect()
}

#[test]
fn all_ranks_follow_the_same_sequence() {
    let outcomes = run_group("dist-ok", |_| 2, None);
    let expected = vec![
        // information
        Some(true),
        None,
        None,
        // data
        Some(true),
        None,
        None,
        None,
    ];
    for o in &outcomes {
        assert_eq!(*o.information.as_ref().unwrap(), 2);
        assert_eq!(*o.data.as_ref().unwrap(), 1);
        assert_eq!(globals(&o.events), expected);
        assert_eq!((o.produced, o.releases), (1, 1));
    }
}

#[test]
fn one_failing_rank_stops_everyone_together() {
    let outcomes = run_group("dist-fail", |rank| if rank == 1 { 0 } else { 2 }, None);
    let reference = globals(&outcomes[0].events);
    assert_eq!(reference, vec![Some(true), None, None, Some(false), None]);

    for (rank, o) in outcomes.iter().enumerate() {
        assert!(o.information.is_ok());
        assert_eq!(globals(&o.events), reference, "rank {rank}");
        match (&o.data, rank) {
            (Err(PhaseError::Config(_)), 1) => {}
            (Err(PhaseError::PeerFailed), r) if r != 1 => {}
            (other, r) => panic!("rank {r}: unexpected {other:?}"),
        }
        assert_eq!((o.produced, o.releases), (0, 0));
    }
}

#[test]
fn missing_directory_on_one_rank_skips_both_solver_calls() {
    let outcomes = run_group("dist-vanish", |_| 2, Some(2));
    for (rank, o) in outcomes.iter().enumerate() {
        assert_eq!(
            globals(&o.events),
            vec![Some(false), Some(false), None],
            "rank {rank}"
        );
        for result in [&o.information, &o.data] {
            match (result, rank) {
                (Err(PhaseError::ChangeDirectory { .. }), 2) => {}
                (Err(PhaseError::PeerFailed), r) if r != 2 => {}
                (other, r) => panic!("rank {r}: unexpected {other:?}"),
            }
        }
        assert_eq!(o.information_calls, 0);
        assert_eq!((o.produced, o.releases), (0, 0));
    }
}
