#![allow(dead_code)]

use fluxbench::{Bencher, flux};
use std::hint::black_box;

use spbla::prelude::*;
use spbla::runtime::TrackingAllocator;
use spbla::runtime::cpu::{CpuClient, CpuDevice};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deterministic pseudo-random graph with about `degree` edges per vertex
fn random_graph(client: &CpuClient, n: usize, degree: usize) -> CsrMatrix {
    let mut rows = Vec::with_capacity(n * degree);
    let mut cols = Vec::with_capacity(n * degree);
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    for row in 0..n {
        for _ in 0..degree {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            rows.push(row as Index);
            cols.push((state % n as u64) as Index);
        }
    }
    client
        .build_csr(&rows, &cols, [n as Index, n as Index], false)
        .unwrap()
}

fn client_with_threshold(parallel_min_rows: usize) -> CpuClient {
    CpuClient::with_allocator(
        CpuDevice::new(),
        TrackingAllocator::default(),
        parallel_min_rows,
    )
}

// ---------------------------------------------------------------------------
// SpGEMM
// ---------------------------------------------------------------------------

#[flux::bench(group = "spgemm", args = [1024, 4096, 16384])]
fn spgemm_parallel(b: &mut Bencher, n: usize) {
    let client = client_with_threshold(1);
    let a = random_graph(&client, n, 8);
    b.iter(|| black_box(client.spgemm_csr(&a, &a).unwrap()));
}

#[flux::bench(group = "spgemm", args = [1024, 4096, 16384])]
fn spgemm_sequential(b: &mut Bencher, n: usize) {
    let client = client_with_threshold(usize::MAX);
    let a = random_graph(&client, n, 8);
    b.iter(|| black_box(client.spgemm_csr(&a, &a).unwrap()));
}

// ---------------------------------------------------------------------------
// Element-wise, Kronecker, build
// ---------------------------------------------------------------------------

#[flux::bench(group = "ewise", args = [4096, 65536])]
fn ewise_add(b: &mut Bencher, n: usize) {
    let client = CpuClient::new(CpuDevice::new());
    let a = random_graph(&client, n, 4);
    let c = random_graph(&client, n, 16);
    b.iter(|| black_box(client.ewise_add_csr(&a, &c).unwrap()));
}

#[flux::bench(group = "kron")]
fn kron_64x64(b: &mut Bencher) {
    let client = CpuClient::new(CpuDevice::new());
    let a = random_graph(&client, 64, 4);
    b.iter(|| black_box(client.kron_csr(&a, &a).unwrap()));
}

#[flux::bench(group = "build", args = [65536])]
fn build_unsorted(b: &mut Bencher, n: usize) {
    let client = CpuClient::new(CpuDevice::new());
    let (rows, cols) = random_graph(&client, n, 8).pairs();
    let mut rev_rows = rows.clone();
    let mut rev_cols = cols.clone();
    rev_rows.reverse();
    rev_cols.reverse();
    let shape = [n as Index, n as Index];
    b.iter(|| black_box(client.build_csr(&rev_rows, &rev_cols, shape, false).unwrap()));
}

#[flux::bench(group = "build", args = [65536])]
fn build_sorted_hint(b: &mut Bencher, n: usize) {
    let client = CpuClient::new(CpuDevice::new());
    let (rows, cols) = random_graph(&client, n, 8).pairs();
    let shape = [n as Index, n as Index];
    b.iter(|| black_box(client.build_csr(&rows, &cols, shape, true).unwrap()));
}

// ---------------------------------------------------------------------------
// Comparisons
// ---------------------------------------------------------------------------

#[flux::compare(
    id = "spgemm_threads",
    title = "SpGEMM 16384 (parallel vs sequential)",
    benchmarks = ["spgemm_parallel@16384", "spgemm_sequential@16384"],
    baseline = "spgemm_sequential@16384",
    metric = "mean"
)]
struct SpgemmThreads;

#[flux::synthetic(
    id = "sorted_hint_speedup",
    formula = "build_unsorted@65536 / build_sorted_hint@65536",
    unit = "x"
)]
struct SortedHintSpeedup;

fn main() {
    fluxbench::run().unwrap();
}
