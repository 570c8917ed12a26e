use super::*;

/// Tries `primary` first and `fallback` only when the primary fails.
///
/// A credentials rejection on the primary is returned as is; the same
/// credentials would be rejected again on the fallback transport. When both
/// fail, the error names both causes.
#[derive(Debug, Clone)]
pub struct FallbackReader<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackReader<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P, F> SessionReader for FallbackReader<P, F>
where
    P: SessionReader + Sync,
    F: SessionReader + Sync,
{
    fn transport(&self) -> &'static str {
        self.primary.transport()
    }

    async fn read_neighbors(&self) -> Result<String, ConnectError> {
        let primary_err = match self.primary.read_neighbors().await {
            Ok(output) => return Ok(output),
            Err(err) if err.is_auth_failure() => {
                warn!(
                    "{} authentication rejected: {}",
                    self.primary.transport(),
                    err
                );
                return Err(err);
            }
            Err(err) => err,
        };

        warn!(
            "{} failed: {}. Trying {}...",
            self.primary.transport(),
            primary_err,
            self.fallback.transport()
        );

        self.fallback
            .read_neighbors()
            .await
            .map_err(|fallback_err| ConnectError::AllTransportsFailed {
                primary: Box::new(primary_err),
                fallback: Box::new(fallback_err),
            })
    }
}
