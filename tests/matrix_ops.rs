//! Integration tests for matrix operations through an instance

mod common;

use std::collections::BTreeSet;

use common::{create_instance, identity, matrix_from_pairs, to_set};
use spbla::prelude::*;

// ============================================================================
// Identity scenario
// ============================================================================

#[test]
fn test_identity_mxm_add_kron() {
    let inst = create_instance();
    let a = identity(&inst, 2);
    let b = identity(&inst, 2);

    let product = inst.matrix_new(2, 2).unwrap();
    inst.mxm(product, a, b).unwrap();
    assert_eq!(inst.extract_pairs(product).unwrap(), (vec![0, 1], vec![0, 1]));

    let sum = inst.matrix_new(2, 2).unwrap();
    inst.ewise_add(sum, a, b).unwrap();
    assert_eq!(inst.nvals(sum).unwrap(), 2);
    assert_eq!(inst.extract_pairs(sum).unwrap(), (vec![0, 1], vec![0, 1]));

    let k = inst.matrix_new(4, 4).unwrap();
    inst.kron(k, a, b).unwrap();
    assert_eq!(
        inst.extract_pairs(k).unwrap(),
        (vec![0, 1, 2, 3], vec![0, 1, 2, 3])
    );
}

#[test]
fn test_mxm_reachability_two_steps() {
    let inst = create_instance();
    // Path graph 0 -> 1 -> 2 -> 3
    let g = matrix_from_pairs(&inst, [4, 4], &[(0, 1), (1, 2), (2, 3)]);
    let g2 = inst.matrix_new(4, 4).unwrap();
    inst.mxm(g2, g, g).unwrap();
    assert_eq!(to_set(&inst, g2), BTreeSet::from([(0, 2), (1, 3)]));
}

// ============================================================================
// Shape validation
// ============================================================================

#[test]
fn test_mxm_dimension_mismatch() {
    let inst = create_instance();
    let a = inst.matrix_new(2, 3).unwrap();
    let b = inst.matrix_new(4, 5).unwrap();
    let c = inst.matrix_new(2, 5).unwrap();

    let err = inst.mxm(c, a, b).unwrap_err();
    assert!(err.is_dimension_mismatch());
    assert_eq!(
        err,
        Error::InnerDimensionMismatch {
            op: "mxm",
            lhs: [2, 3],
            rhs: [4, 5]
        }
    );
    assert_eq!(err.status(), Status::InvalidArgument);
}

#[test]
fn test_ewise_requires_equal_shapes() {
    let inst = create_instance();
    let a = inst.matrix_new(3, 3).unwrap();
    let b = inst.matrix_new(3, 4).unwrap();
    let c = inst.matrix_new(3, 3).unwrap();
    assert!(matches!(
        inst.ewise_add(c, a, b),
        Err(Error::DimensionMismatch { .. })
    ));

    let wrong_result = inst.matrix_new(2, 2).unwrap();
    assert!(matches!(
        inst.ewise_mult(wrong_result, a, a),
        Err(Error::DimensionMismatch {
            op: "ewise_mult",
            ..
        })
    ));
}

#[test]
fn test_kron_result_shape_checked() {
    let inst = create_instance();
    let a = inst.matrix_new(2, 3).unwrap();
    let b = inst.matrix_new(4, 5).unwrap();
    let wrong = inst.matrix_new(8, 16).unwrap();
    assert!(matches!(
        inst.kron(wrong, a, b),
        Err(Error::DimensionMismatch { op: "kron", .. })
    ));
    let right = inst.matrix_new(8, 15).unwrap();
    inst.kron(right, a, b).unwrap();
    assert_eq!(inst.nvals(right).unwrap(), 0);
}

#[test]
fn test_kron_overflowing_shape_is_dimension_mismatch() {
    let inst = create_instance();
    let a = inst.matrix_new(1 << 20, 1).unwrap();
    let b = inst.matrix_new(1 << 20, 1).unwrap();
    let c = inst.matrix_new(Index::MAX, 1).unwrap();
    assert!(matches!(
        inst.kron(c, a, b),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn test_transpose_shape_and_alias() {
    let inst = create_instance();
    let a = matrix_from_pairs(&inst, [2, 3], &[(0, 2), (1, 0)]);
    let t = inst.matrix_new(3, 2).unwrap();
    inst.transpose(t, a).unwrap();
    assert_eq!(to_set(&inst, t), BTreeSet::from([(0, 1), (2, 0)]));

    let wrong = inst.matrix_new(2, 3).unwrap();
    assert!(inst.transpose(wrong, a).is_err());

    let sq = matrix_from_pairs(&inst, [3, 3], &[(0, 1), (2, 1)]);
    inst.transpose(sq, sq).unwrap();
    assert_eq!(to_set(&inst, sq), BTreeSet::from([(1, 0), (1, 2)]));
}

// ============================================================================
// Builder
// ============================================================================

#[test]
fn test_build_out_of_bounds_leaves_matrix_unchanged() {
    let inst = create_instance();
    let m = matrix_from_pairs(&inst, [3, 3], &[(1, 1)]);

    let err = inst.build(m, &[0, 5], &[0, 0], Hints::NONE).unwrap_err();
    assert_eq!(err.status(), Status::InvalidArgument);
    assert_eq!(to_set(&inst, m), BTreeSet::from([(1, 1)]));
}

#[test]
fn test_build_length_mismatch() {
    let inst = create_instance();
    let m = inst.matrix_new(3, 3).unwrap();
    let err = inst.build(m, &[0, 1], &[0], Hints::NONE).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn test_build_deduplicates_and_replaces() {
    let inst = create_instance();
    let m = inst.matrix_new(3, 3).unwrap();
    inst.build(m, &[2, 0, 2, 0], &[1, 0, 1, 0], Hints::NONE).unwrap();
    assert_eq!(inst.extract_pairs(m).unwrap(), (vec![0, 2], vec![0, 1]));

    // A second build replaces the previous contents
    inst.build(m, &[1], &[1], Hints::VALUES_SORTED).unwrap();
    assert_eq!(inst.extract_pairs(m).unwrap(), (vec![1], vec![1]));
}

#[test]
fn test_sorted_hint_with_unsorted_input() {
    let inst = create_instance();
    let m = inst.matrix_new(4, 4).unwrap();
    inst.build(m, &[3, 0, 3], &[0, 2, 0], Hints::VALUES_SORTED)
        .unwrap();
    assert_eq!(inst.extract_pairs(m).unwrap(), (vec![0, 3], vec![2, 0]));
}

// ============================================================================
// Element-wise and accumulation
// ============================================================================

#[test]
fn test_ewise_mult_inverted_mask() {
    let inst = create_instance();
    let matrix = matrix_from_pairs(&inst, [3, 3], &[(0, 0), (1, 1), (2, 2), (0, 2)]);
    let mask = matrix_from_pairs(&inst, [3, 3], &[(0, 1), (0, 2), (1, 1)]);
    let out = inst.matrix_new(3, 3).unwrap();

    inst.ewise_mult_inverted(out, matrix, mask).unwrap();
    assert_eq!(to_set(&inst, out), BTreeSet::from([(0, 0), (2, 2)]));
}

#[test]
fn test_ewise_result_aliases_operand() {
    let inst = create_instance();
    let a = matrix_from_pairs(&inst, [2, 2], &[(0, 0)]);
    let b = matrix_from_pairs(&inst, [2, 2], &[(1, 1)]);

    inst.ewise_add(a, a, b).unwrap();
    assert_eq!(to_set(&inst, a), BTreeSet::from([(0, 0), (1, 1)]));

    inst.ewise_mult(a, a, a).unwrap();
    assert_eq!(inst.nvals(a).unwrap(), 2);
}

#[test]
fn test_mxm_accumulate() {
    let inst = create_instance();
    let a = matrix_from_pairs(&inst, [2, 2], &[(0, 1)]);
    let b = matrix_from_pairs(&inst, [2, 2], &[(1, 0)]);
    let c = matrix_from_pairs(&inst, [2, 2], &[(1, 1)]);

    inst.mxm_accumulate(c, a, b).unwrap();
    assert_eq!(to_set(&inst, c), BTreeSet::from([(0, 0), (1, 1)]));

    // Without the hint the previous contents are replaced
    inst.mxm(c, a, b).unwrap();
    assert_eq!(to_set(&inst, c), BTreeSet::from([(0, 0)]));
}

#[test]
fn test_mxm_with_empty_operand() {
    let inst = create_instance();
    let a = matrix_from_pairs(&inst, [3, 4], &[(0, 0), (2, 3)]);
    let empty = inst.matrix_new(4, 6).unwrap();
    let c = matrix_from_pairs(&inst, [3, 6], &[(1, 1)]);

    inst.mxm(c, a, empty).unwrap();
    assert_eq!(inst.nvals(c).unwrap(), 0);
    assert_eq!(inst.nrows(c).unwrap(), 3);
    assert_eq!(inst.ncols(c).unwrap(), 6);
}

#[test]
fn test_duplicate_is_independent() {
    let inst = create_instance();
    let a = matrix_from_pairs(&inst, [2, 2], &[(0, 1)]);
    let dup = inst.duplicate(a).unwrap();

    inst.build(a, &[1], &[0], Hints::NONE).unwrap();
    assert_eq!(to_set(&inst, dup), BTreeSet::from([(0, 1)]));
    assert_eq!(to_set(&inst, a), BTreeSet::from([(1, 0)]));
}
