mod kernel;

pub use kernel::*;

use std::sync::Arc;

use memtier_runtime::{
    ComputeClient,
    config::{GlobalConfig, execution::ExecutionConfig},
};

pub fn test_client() -> ComputeClient {
    let config = GlobalConfig {
        execution: ExecutionConfig {
            workers: Some(3),
            ..Default::default()
        },
        ..Default::default()
    };

    ComputeClient::new(Arc::new(config))
}
