use memtier_runtime::topology::GroupDim;
use pretty_assertions::assert_eq;

use crate::{
    Strategy,
    base::launch_auto,
    components::MatrixHandle,
    kernels::{Selection, group_shared::GROUP_SHARED_CAPACITY, row_private::ROW_PRIVATE_CAPACITY},
    tests::test_utils::{MatmulTestCase, test_client},
};

/// Runs `Auto` on the case and returns the kernel it picked, after checking the result.
fn auto_choice(case: &MatmulTestCase) -> Strategy {
    let client = test_client();
    let lhs = case.random_lhs(7);
    let rhs = case.random_rhs(8);
    let expected = lhs.matmul_reference(&rhs).unwrap();

    let lhs = MatrixHandle::upload(&client, &lhs);
    let rhs = MatrixHandle::upload(&client, &rhs);
    let out = MatrixHandle::empty(&client, case.m, case.n);
    let chosen = launch_auto(&client, &lhs, &rhs, &out).unwrap();

    assert_eq!(out.read(&client).data(), expected.data());
    chosen
}

#[test_log::test]
fn auto_uses_group_shared_within_capacity() {
    let chosen = auto_choice(&MatmulTestCase::new(16, 64, 8));

    assert_eq!(chosen, Strategy::GroupShared(Selection::Inferred));
}

#[test_log::test]
fn auto_falls_back_to_naive_past_every_capacity() {
    let chosen = auto_choice(&MatmulTestCase::new(2, GROUP_SHARED_CAPACITY + 3, 2));

    assert_eq!(chosen, Strategy::Naive(Selection::Inferred));
}

#[test_log::test]
fn auto_result_matches_forced_kernels() {
    let client = test_client();
    let case = MatmulTestCase::new(8, ROW_PRIVATE_CAPACITY + 1, 4);

    let auto = case.test(&client, Strategy::Auto);
    let forced = case.test(
        &client,
        Strategy::GroupShared(Selection::Forced(GroupDim::new_1d(8))),
    );

    assert_eq!(auto.data(), forced.data());
}

#[test_log::test]
fn default_strategy_is_auto() {
    assert_eq!(Strategy::default(), Strategy::Auto);
}
