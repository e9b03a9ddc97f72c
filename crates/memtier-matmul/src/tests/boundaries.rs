use crate::{
    Strategy,
    components::MatmulSetupError,
    kernels::{Selection, group_shared::GROUP_SHARED_CAPACITY, row_private::ROW_PRIVATE_CAPACITY},
    matmul,
    tests::test_utils::{MatmulTestCase, test_client},
};

#[test_log::test]
fn shared_dim_of_one() {
    let client = test_client();

    for strategy in Strategy::all() {
        MatmulTestCase::new(8, 1, 8).test(&client, strategy);
    }
}

#[test_log::test]
fn single_row_and_single_column() {
    let client = test_client();

    for strategy in Strategy::all() {
        MatmulTestCase::new(1, 19, 6).test(&client, strategy);
        MatmulTestCase::new(6, 19, 1).test(&client, strategy);
        MatmulTestCase::new(1, 19, 1).test(&client, strategy);
    }
}

#[test_log::test]
fn row_private_accepts_its_capacity() {
    let client = test_client();

    MatmulTestCase::new(4, ROW_PRIVATE_CAPACITY, 3)
        .test(&client, Strategy::RowPrivate(Selection::Inferred));
}

#[test_log::test]
fn row_private_rejects_one_past_its_capacity() {
    let client = test_client();
    let case = MatmulTestCase::new(4, ROW_PRIVATE_CAPACITY + 1, 3);

    let err = matmul(
        &client,
        &Strategy::RowPrivate(Selection::Inferred),
        &case.random_lhs(1),
        &case.random_rhs(2),
    )
    .unwrap_err();

    assert_eq!(
        err,
        MatmulSetupError::CapacityExceeded {
            shared_size: 1025,
            capacity: 1024
        }
    );
}

#[test_log::test]
fn group_shared_accepts_its_capacity() {
    let client = test_client();

    MatmulTestCase::new(4, GROUP_SHARED_CAPACITY, 2)
        .test(&client, Strategy::GroupShared(Selection::Inferred));
}

#[test_log::test]
fn group_shared_rejects_one_past_its_capacity() {
    let client = test_client();
    let case = MatmulTestCase::new(4, GROUP_SHARED_CAPACITY + 1, 2);

    let err = matmul(
        &client,
        &Strategy::GroupShared(Selection::Inferred),
        &case.random_lhs(1),
        &case.random_rhs(2),
    )
    .unwrap_err();

    assert_eq!(
        err,
        MatmulSetupError::CapacityExceeded {
            shared_size: 4097,
            capacity: 4096
        }
    );
}

#[test_log::test]
fn kernels_without_private_cache_have_no_capacity_limit() {
    let client = test_client();
    let case = MatmulTestCase::new(2, GROUP_SHARED_CAPACITY + 1, 2);

    for strategy in [
        Strategy::Naive(Selection::Inferred),
        Strategy::RowGlobal(Selection::Inferred),
        Strategy::Tiled(Selection::Inferred),
    ] {
        case.test(&client, strategy);
    }
}
