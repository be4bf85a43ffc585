//! Cooperative cancellation for repository operations

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ApplicationError;

/// Race `operation` against `token`
///
/// If the token fires first the operation future is dropped and
/// [`ApplicationError::Cancelled`] is returned. Dropping an in-flight
/// `save_changes` drops its transaction, so no staged change is applied.
pub async fn with_cancellation<F, R>(
    token: &CancellationToken,
    operation: F,
) -> Result<R, ApplicationError>
where
    F: Future<Output = Result<R, ApplicationError>>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => {
            debug!("Operation cancelled before completion");
            Err(ApplicationError::Cancelled)
        }
        result = operation => result,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let token = CancellationToken::new();
        let result = with_cancellation(&token, async { Ok::<_, ApplicationError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn already_cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        let result = with_cancellation(&token, async { Ok::<_, ApplicationError>(7) }).await;
        assert!(matches!(result, Err(ApplicationError::Cancelled)));
    }

    #[tokio::test]
    async fn cancelling_mid_flight_aborts_the_operation() {
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            child.cancel();
        });

        let result = with_cancellation(&token, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, ApplicationError>(())
        })
        .await;
        assert!(matches!(result, Err(ApplicationError::Cancelled)));
    }

    #[tokio::test]
    async fn operation_errors_pass_through() {
        let token = CancellationToken::new();
        let result: Result<(), _> =
            with_cancellation(&token, async { Err(ApplicationError::Storage("down".into())) }).await;
        assert!(matches!(result, Err(ApplicationError::Storage(_))));
    }
}
