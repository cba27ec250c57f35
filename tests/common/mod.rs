//! Common test utilities
#![allow(dead_code)]

use std::collections::BTreeSet;

use spbla::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once; filter with `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Create an instance with the default configuration
pub fn create_instance() -> Instance {
    init_tracing();
    Instance::new(InstanceConfig::default()).unwrap()
}

/// Create a matrix and fill it with the given coordinates
pub fn matrix_from_pairs(
    instance: &Instance,
    shape: [Index; 2],
    pairs: &[(Index, Index)],
) -> MatrixHandle {
    let handle = instance.matrix_new(shape[0], shape[1]).unwrap();
    let rows: Vec<Index> = pairs.iter().map(|&(r, _)| r).collect();
    let cols: Vec<Index> = pairs.iter().map(|&(_, c)| c).collect();
    instance.build(handle, &rows, &cols, Hints::NONE).unwrap();
    handle
}

/// `n x n` identity matrix
pub fn identity(instance: &Instance, n: Index) -> MatrixHandle {
    let pairs: Vec<_> = (0..n).map(|i| (i, i)).collect();
    matrix_from_pairs(instance, [n, n], &pairs)
}

/// Read a matrix back as an ordered coordinate set
pub fn to_set(instance: &Instance, handle: MatrixHandle) -> BTreeSet<(Index, Index)> {
    let (rows, cols) = instance.extract_pairs(handle).unwrap();
    rows.into_iter().zip(cols).collect()
}

/// Dense reference model of a boolean matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseBool {
    pub nrows: usize,
    pub ncols: usize,
    pub cells: Vec<bool>,
}

impl DenseBool {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            cells: vec![false; nrows * ncols],
        }
    }

    pub fn from_pairs(nrows: usize, ncols: usize, pairs: &[(Index, Index)]) -> Self {
        let mut m = Self::new(nrows, ncols);
        for &(r, c) in pairs {
            m.set(r as usize, c as usize);
        }
        m
    }

    pub fn get(&self, r: usize, c: usize) -> bool {
        self.cells[r * self.ncols + c]
    }

    pub fn set(&mut self, r: usize, c: usize) {
        self.cells[r * self.ncols + c] = true;
    }

    pub fn matmul(&self, other: &DenseBool) -> DenseBool {
        assert_eq!(self.ncols, other.nrows);
        let mut out = DenseBool::new(self.nrows, other.ncols);
        for i in 0..self.nrows {
            for k in 0..self.ncols {
                if self.get(i, k) {
                    for j in 0..other.ncols {
                        if other.get(k, j) {
                            out.set(i, j);
                        }
                    }
                }
            }
        }
        out
    }

    pub fn pairs(&self) -> BTreeSet<(Index, Index)> {
        let mut set = BTreeSet::new();
        for r in 0..self.nrows {
            for c in 0..self.ncols {
                if self.get(r, c) {
                    set.insert((r as Index, c as Index));
                }
            }
        }
        set
    }
}
