//! Test helpers for solve requests on disk and stubbed solvers.

use crate::solve::{SolveConfig, SolveSolverBuilder};
use super::*;
use camino::{Utf8Path, Utf8PathBuf};
use roundsman_core::test_support::{THREE_CUSTOMER_DURATIONS, three_customer_request};
use roundsman_core::{Diagnostics, Solution, SolveError, SolveRequest, Solver};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Temporary directory with UTF-8 paths, removed on drop.
#[derive(Debug)]
pub(super) struct Workspace {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self { _tmp: tmp, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write file");
}

pub(super) fn write_request(path: &Utf8Path, request: &SolveRequest) {
    let payload = serde_json::to_string_pretty(request).expect("serialize request");
    write_utf8(path, payload.as_bytes());
}

/// Writes the three-customer scenario to `path`.
pub(super) fn write_scenario_request(path: &Utf8Path) {
    write_request(path, &three_customer_request());
}

pub(super) fn scenario_durations() -> Vec<Vec<f64>> {
    THREE_CUSTOMER_DURATIONS.iter().map(|row| row.to_vec()).collect()
}

/// Solver returning a fixed solution and recording the requests it saw.
#[derive(Debug, Clone)]
pub(super) struct RecordingSolver {
    solution: Solution,
    seen: Arc<Mutex<Vec<SolveRequest>>>,
}

impl RecordingSolver {
    pub(super) fn no_data() -> Self {
        Self {
            solution: Solution::no_data(Diagnostics::default()),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(super) fn requests(&self) -> Vec<SolveRequest> {
        self.seen.lock().expect("requests lock").clone()
    }
}

impl Solver for RecordingSolver {
    fn solve(&self, request: &SolveRequest) -> Result<Solution, SolveError> {
        self.seen.lock().expect("requests lock").push(request.clone());
        Ok(self.solution.clone())
    }
}

impl SolveSolverBuilder for RecordingSolver {
    fn build(&self, _config: &SolveConfig) -> Result<Box<dyn Solver>, CliError> {
        Ok(Box::new(self.clone()))
    }
}
