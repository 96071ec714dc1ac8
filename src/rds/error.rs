//! Conversion from AWS SDK errors into [`ProviderError`].

use std::error::Error as StdError;
use std::fmt;

use aws_sdk_rds::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use crate::fault::ProviderError;

impl<E, R> From<SdkError<E, R>> for ProviderError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: fmt::Debug + 'static,
{
    fn from(err: SdkError<E, R>) -> Self {
        let message = err
            .message()
            .map_or_else(|| DisplayErrorContext(&err).to_string(), str::to_owned);
        match err.code() {
            Some(code) => Self::coded(code, message),
            None => Self::unclassified(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_rds::error::ErrorMetadata;
    use aws_sdk_rds::operation::describe_db_clusters::DescribeDBClustersError;

    use super::*;
    use crate::fault::ResourceKind;

    #[test]
    fn service_codes_survive_conversion() {
        let service = DescribeDBClustersError::generic(
            ErrorMetadata::builder()
                .code("DBClusterNotFoundFault")
                .message("DBCluster orders not found.")
                .build(),
        );
        let err: SdkError<DescribeDBClustersError, ()> = SdkError::service_error(service, ());
        let converted = ProviderError::from(err);

        assert_eq!(converted.code.as_deref(), Some("DBClusterNotFoundFault"));
        assert_eq!(converted.message, "DBCluster orders not found.");
        assert!(converted.classify(ResourceKind::Cluster).is_not_found());
    }

    #[test]
    fn transport_failures_have_no_code() {
        let err: SdkError<DescribeDBClustersError, ()> =
            SdkError::timeout_error(std::io::Error::other("deadline exceeded"));
        let converted = ProviderError::from(err);
        assert_eq!(converted.code, None);
        assert!(!converted.message.is_empty());
    }
}
