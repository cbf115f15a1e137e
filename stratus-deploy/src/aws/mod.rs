//! SDK-backed implementations of the provider interfaces.

mod bucket;
mod function;
mod gateway;
mod role;

pub use bucket::AwsBucketApi;
pub use function::AwsFunctionApi;
pub use gateway::AwsGatewayApi;
pub use role::AwsRoleApi;

use stratus_aws::aws_sdk_lambda::error::{ProvideErrorMetadata, SdkError};

use crate::error::DeployError;

/// Map an SDK error onto the engine's taxonomy.
///
/// Not-found and conflict codes become the two signal variants that
/// idempotency logic branches on; everything else is a fatal provider
/// error. The metadata codes are shared across the service crates, so
/// one classifier covers Lambda, IAM, API Gateway, and S3.
pub(crate) fn classify<E, R>(err: SdkError<E, R>) -> DeployError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let code = err
        .as_service_error()
        .and_then(|service| service.code())
        .map(str::to_owned);
    let detail = match err.as_service_error() {
        Some(service) => service.to_string(),
        None => format!("{err:?}"),
    };

    match code.as_deref() {
        Some(
            "ResourceNotFoundException" | "NoSuchEntityException" | "NotFoundException"
            | "NoSuchBucket",
        ) => DeployError::NotFound(detail),
        Some(
            "ConflictException" | "ResourceConflictException" | "BucketAlreadyExists"
            | "BucketAlreadyOwnedByYou",
        ) => DeployError::Conflict(detail),
        _ => DeployError::Provider(detail),
    }
}
