//! Probe-and-short-circuit lookup for documents published at irregular,
//! date-stamped locations (weekends, holidays, publication lag).

use std::fmt::Debug;
use std::future::Future;

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use crate::error::FetchError;
use crate::fetch::{Endpoint, Fetcher, RawContent};

/// Try `candidates` in order and return the first that succeeds.
///
/// Every failure counts as one unsuccessful attempt. Fails with
/// `FetchError::NotFound` once the candidates are exhausted.
pub async fn probe_first<C, T, F, Fut>(
    candidates: impl IntoIterator<Item = C>,
    mut attempt: F,
) -> Result<(C, T), FetchError>
where
    C: Clone + Debug,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempts = 0u32;
    for candidate in candidates {
        attempts += 1;
        match attempt(candidate.clone()).await {
            Ok(value) => return Ok((candidate, value)),
            Err(e) => debug!(?candidate, attempt = attempts, error = %e, "Probe miss"),
        }
    }
    Err(FetchError::NotFound { attempts })
}

/// `days` dates counting back from `start`, `start` first.
pub fn candidate_dates(start: NaiveDate, days: u32) -> impl Iterator<Item = NaiveDate> {
    (0..days).map(move |offset| start - Duration::days(offset as i64))
}

/// Substitute `{date}` in `template` with `date` rendered by `format`.
pub fn dated_url(template: &str, date: NaiveDate, format: &str) -> String {
    template.replace("{date}", &date.format(format).to_string())
}

/// A document located by `probe_dated`.
#[derive(Debug, Clone)]
pub struct DatedDocument {
    pub date: NaiveDate,
    pub url: String,
    pub content: RawContent,
}

/// Fetch the most recent binary document published within `days` of `start`.
pub async fn probe_dated(
    fetcher: &dyn Fetcher,
    url_template: &str,
    date_format: &str,
    start: NaiveDate,
    days: u32,
) -> Result<DatedDocument, FetchError> {
    let (date, (url, content)) = probe_first(candidate_dates(start, days), |date| {
        let url = dated_url(url_template, date, date_format);
        async move {
            let content = fetcher.fetch(&Endpoint::binary(url.clone())).await?;
            Ok::<_, FetchError>((url, content))
        }
    })
    .await?;

    info!(%date, url = %url, bytes = content.len(), "Located dated document");
    Ok(DatedDocument { date, url, content })
}
