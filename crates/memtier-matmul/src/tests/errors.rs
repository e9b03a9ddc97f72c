use memtier_runtime::{
    error::InvalidLaunchConfig,
    topology::{GridDim, GroupDim},
};

use crate::{
    Strategy,
    components::{DimensionMismatch, MatmulIdent, MatmulSetupError, Matrix, MatrixHandle},
    kernels::Selection,
    launch, matmul,
    tests::test_utils::{random_matrix, test_client},
};

#[test_log::test]
fn mismatched_shared_dim_is_rejected_by_every_strategy() {
    let client = test_client();
    let lhs = random_matrix(4, 3, 1);
    let rhs = random_matrix(5, 2, 2);

    for strategy in Strategy::all().into_iter().chain([Strategy::Auto]) {
        let err = matmul(&client, &strategy, &lhs, &rhs).unwrap_err();

        assert_eq!(
            err,
            MatmulSetupError::DimensionMismatch(DimensionMismatch::SharedDim {
                lhs_width: 3,
                rhs_height: 5
            }),
            "{strategy:?}"
        );
    }
}

#[test_log::test]
fn wrong_output_shape_is_rejected() {
    let client = test_client();
    let lhs = MatrixHandle::upload(&client, &random_matrix(4, 3, 1));
    let rhs = MatrixHandle::upload(&client, &random_matrix(3, 2, 2));
    let out = MatrixHandle::empty(&client, 2, 4);

    for strategy in Strategy::all() {
        let err = launch(&client, &strategy, &lhs, &rhs, &out).unwrap_err();

        assert_eq!(
            err,
            MatmulSetupError::DimensionMismatch(DimensionMismatch::OutputShape {
                expected: (4, 2),
                actual: (2, 4)
            })
        );
    }
}

#[test_log::test]
fn output_aliasing_an_input_is_rejected() {
    let client = test_client();
    let square = MatrixHandle::upload(&client, &random_matrix(3, 3, 1));
    let other = MatrixHandle::upload(&client, &random_matrix(3, 3, 2));

    let err = launch(&client, &Strategy::Auto, &square, &other, &square).unwrap_err();
    assert_eq!(err, MatmulSetupError::AliasedOutput(MatmulIdent::Lhs));

    let err = launch(&client, &Strategy::Auto, &other, &square, &square.clone()).unwrap_err();
    assert_eq!(err, MatmulSetupError::AliasedOutput(MatmulIdent::Rhs));
}

#[test_log::test]
fn handle_length_must_match_its_shape() {
    let client = test_client();
    let handle = client.empty(5);

    let err = MatrixHandle::new(handle, 2, 3, MatmulIdent::Rhs).unwrap_err();

    assert_eq!(
        err,
        MatmulSetupError::DimensionMismatch(DimensionMismatch::DataLength {
            ident: MatmulIdent::Rhs,
            shape: (2, 3),
            len: 5
        })
    );
}

#[test_log::test]
fn handle_with_overflowing_shape_is_rejected() {
    let client = test_client();
    let handle = client.empty(2);

    let err = MatrixHandle::new(handle, usize::MAX, 2, MatmulIdent::Lhs).unwrap_err();

    assert_eq!(
        err,
        MatmulSetupError::DimensionMismatch(DimensionMismatch::DataLength {
            ident: MatmulIdent::Lhs,
            shape: (usize::MAX, 2),
            len: 2
        })
    );
}

#[test_log::test]
fn empty_matrices_are_rejected() {
    let client = test_client();
    let lhs = Matrix::zeros(0, 3);
    let rhs = random_matrix(3, 2, 2);

    let err = matmul(&client, &Strategy::Naive(Selection::Inferred), &lhs, &rhs).unwrap_err();

    assert_eq!(
        err,
        MatmulSetupError::DimensionMismatch(DimensionMismatch::Empty {
            ident: MatmulIdent::Lhs,
            shape: (0, 3)
        })
    );
}

#[test_log::test]
fn group_not_dividing_the_rows_is_rejected() {
    let client = test_client();
    let lhs = random_matrix(10, 4, 1);
    let rhs = random_matrix(4, 3, 2);

    let err = matmul(
        &client,
        &Strategy::GroupShared(Selection::Forced(GroupDim::new_1d(4))),
        &lhs,
        &rhs,
    )
    .unwrap_err();

    assert_eq!(
        err,
        MatmulSetupError::InvalidLaunchConfiguration(InvalidLaunchConfig::GridNotMultiple {
            grid: GridDim::new_1d(10),
            group: GroupDim::new_1d(4)
        })
    );
}

#[test_log::test]
fn empty_group_is_rejected() {
    let client = test_client();
    let lhs = random_matrix(4, 4, 1);
    let rhs = random_matrix(4, 4, 2);

    for strategy in [
        Strategy::Naive(Selection::Forced(GroupDim::new_2d(0, 1))),
        Strategy::RowPrivate(Selection::Forced(GroupDim::new_1d(0))),
        Strategy::GroupShared(Selection::Forced(GroupDim::new_1d(0))),
        Strategy::Tiled(Selection::Forced(GroupDim::new_2d(0, 0))),
    ] {
        let err = matmul(&client, &strategy, &lhs, &rhs).unwrap_err();

        assert!(
            matches!(
                err,
                MatmulSetupError::InvalidLaunchConfiguration(InvalidLaunchConfig::EmptyGroup(_))
            ),
            "{strategy:?}: {err:?}"
        );
    }
}

#[test_log::test]
fn group_larger_than_the_device_is_rejected() {
    let client = test_client();
    let lhs = random_matrix(2048, 1, 1);
    let rhs = random_matrix(1, 1, 2);

    let err = matmul(
        &client,
        &Strategy::GroupShared(Selection::Forced(GroupDim::new_1d(2048))),
        &lhs,
        &rhs,
    )
    .unwrap_err();

    assert_eq!(
        err,
        MatmulSetupError::InvalidLaunchConfiguration(InvalidLaunchConfig::GroupTooLarge {
            requested: GroupDim::new_1d(2048),
            max: 1024
        })
    );
}

#[test_log::test]
fn tiles_must_be_square() {
    let client = test_client();
    let lhs = random_matrix(8, 4, 1);
    let rhs = random_matrix(4, 8, 2);

    let err = matmul(
        &client,
        &Strategy::Tiled(Selection::Forced(GroupDim::new_2d(4, 2))),
        &lhs,
        &rhs,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        MatmulSetupError::InvalidLaunchConfiguration(InvalidLaunchConfig::UnsupportedGroup { .. })
    ));
}
