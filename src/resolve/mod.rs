pub mod axis;
pub mod http;

use std::future::Future;

use crate::candidate::CandidateList;

/// Result of a single existence check. A transport failure or a non-2xx
/// status is a `Miss` like any other; "try the next candidate" is ordinary
/// control flow here, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Hit,
    Miss,
}

/// Transport seam for existence checks. Production wraps an HTTP client
/// issuing HEAD requests; tests script outcomes and delays.
pub trait ExistenceProbe: Send + Sync + 'static {
    fn check(&self, url: &str) -> impl Future<Output = ProbeOutcome> + Send;
}

/// How a walk over a candidate chain ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// First candidate that exists, in chain order.
    Found(String),
    /// Every candidate missed.
    Exhausted,
    /// A newer submission took over; the walk stopped without a verdict.
    Superseded,
}

/// Walk candidates strictly in order, stopping at the first hit.
///
/// `is_current` is consulted before every probe and again before the verdict
/// is returned, so a superseded walk performs no further network calls and
/// never reports a result. An in-flight check may still complete; its answer
/// is discarded.
pub async fn walk_chain<P, F>(probe: &P, list: &CandidateList, mut is_current: F) -> ChainOutcome
where
    P: ExistenceProbe,
    F: FnMut() -> bool,
{
    for candidate in list.iter() {
        if !is_current() {
            return ChainOutcome::Superseded;
        }
        match probe.check(&candidate.url).await {
            ProbeOutcome::Hit => {
                if !is_current() {
                    return ChainOutcome::Superseded;
                }
                log::debug!("candidate hit: {}", candidate.url);
                return ChainOutcome::Found(candidate.url.clone());
            }
            ProbeOutcome::Miss => {
                log::debug!("candidate miss: {}", candidate.url);
            }
        }
    }
    ChainOutcome::Exhausted
}
