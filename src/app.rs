//! Form state plus the submission lifecycle, owned by the event loop.

use tracing::{error, info, warn};

use crate::error::FetchError;
use crate::normalize::normalize;
use crate::types::{RawEntry, RequestOutcome, Selection};

/// The one message users see for any failure past validation. Transport,
/// HTTP status, decode and normalization problems all collapse into it;
/// the specific cause goes to the log instead.
pub const FETCH_ERROR_MSG: &str = "An error occurred while fetching predictions.";

/// Work order produced by an accepted `submit`. The event loop runs the
/// fetch and reports back under the same sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    pub seq: u64,
    pub ticker: String,
    pub start: String,
}

pub struct App {
    companies: Vec<String>,
    selection: Selection,
    outcome: RequestOutcome,
    seq: u64,
}

impl App {
    pub fn new(companies: Vec<String>) -> Self {
        Self {
            companies,
            selection: Selection::default(),
            outcome: RequestOutcome::Idle,
            seq: 0,
        }
    }

    // ---------- Read side (rendering) ----------

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn outcome(&self) -> &RequestOutcome {
        &self.outcome
    }

    // ---------- Mutations ----------

    /// Replace the selected company. Only configured tickers or the empty
    /// placeholder are accepted; anything else is dropped. Never touches
    /// the request outcome.
    pub fn set_company(&mut self, value: &str) {
        if value.is_empty() || self.companies.iter().any(|c| c == value) {
            self.selection.company = value.to_string();
        } else {
            warn!(value, "ignoring company outside the configured set");
        }
    }

    /// Replace the date text exactly as supplied. No format checks here;
    /// the service is the judge of what it accepts.
    pub fn set_date(&mut self, value: &str) {
        self.selection.date = value.to_string();
    }

    /// Start a submission. A complete selection clears any previous
    /// result, enters `Pending` and returns the job to run; an incomplete
    /// one fails immediately and no request goes out.
    pub fn submit(&mut self) -> Option<FetchJob> {
        // Every attempt supersedes the previous submission, accepted or
        // not: a late completion from an abandoned fetch must not
        // overwrite the outcome of this attempt.
        self.seq += 1;
        if let Err(reason) = self.validate() {
            warn!(%reason, "submission rejected");
            self.outcome = RequestOutcome::Failure(reason.to_string());
            return None;
        }
        self.outcome = RequestOutcome::Pending;
        info!(
            seq = self.seq,
            ticker = %self.selection.company,
            start = %self.selection.date,
            "submitting prediction request"
        );
        Some(FetchJob {
            seq: self.seq,
            ticker: self.selection.company.clone(),
            start: self.selection.date.clone(),
        })
    }

    /// Feed a finished fetch back in. Results carrying a superseded
    /// sequence number are dropped; the current one settles into
    /// `Success` through the normalizer, or into `Failure`.
    pub fn complete_fetch(&mut self, seq: u64, result: Result<Vec<RawEntry>, FetchError>) {
        if seq != self.seq {
            info!(seq, current = self.seq, "dropping superseded fetch result");
            return;
        }
        match result.and_then(|raw| normalize(&raw)) {
            Ok(points) => {
                info!(seq, points = points.len(), "prediction fetch succeeded");
                self.outcome = RequestOutcome::Success(points);
            }
            Err(err) => {
                error!(seq, %err, "prediction fetch failed");
                self.outcome = RequestOutcome::Failure(FETCH_ERROR_MSG.to_string());
            }
        }
    }

    fn validate(&self) -> Result<(), FetchError> {
        if self.selection.company.is_empty() {
            return Err(FetchError::Validation("Select a company before submitting."));
        }
        if self.selection.date.is_empty() {
            return Err(FetchError::Validation("Select a start date before submitting."));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChartPoint;
    use serde_json::json;

    fn test_app() -> App {
        App::new(vec!["AAPL".into(), "MSFT".into(), "TSLA".into()])
    }

    fn ready_app() -> App {
        let mut app = test_app();
        app.set_company("AAPL");
        app.set_date("2019-01-01");
        app
    }

    fn entry(date: &str, price: f64) -> RawEntry {
        RawEntry {
            date: Some(date.to_string()),
            price: Some(json!(price)),
        }
    }

    fn failure_msg(app: &App) -> &str {
        match app.outcome() {
            RequestOutcome::Failure(msg) => msg,
            other => panic!("expected Failure, got {other:?}"),
        }
    }

    // ---------- Form edits ----------

    #[test]
    fn starts_idle_with_empty_selection() {
        let app = test_app();
        assert_eq!(app.outcome(), &RequestOutcome::Idle);
        assert_eq!(app.selection(), &Selection::default());
    }

    #[test]
    fn set_company_accepts_configured_tickers_and_placeholder() {
        let mut app = test_app();
        app.set_company("MSFT");
        assert_eq!(app.selection().company, "MSFT");
        app.set_company("");
        assert_eq!(app.selection().company, "");
    }

    #[test]
    fn set_company_ignores_unknown_ticker() {
        let mut app = test_app();
        app.set_company("MSFT");
        app.set_company("ENRN");
        assert_eq!(app.selection().company, "MSFT");
    }

    #[test]
    fn set_date_keeps_text_verbatim() {
        let mut app = test_app();
        app.set_date("2019-13-99");
        assert_eq!(app.selection().date, "2019-13-99");
    }

    #[test]
    fn edits_never_touch_the_outcome() {
        let mut app = ready_app();
        let job = app.submit().expect("accepted");
        app.complete_fetch(job.seq, Ok(vec![entry("2019-01-02", 100.0)]));
        app.set_company("TSLA");
        app.set_date("2020-01-01");
        assert!(matches!(app.outcome(), RequestOutcome::Success(_)));
    }

    // ---------- Submission ----------

    #[test]
    fn submit_without_company_fails_without_a_job() {
        let mut app = test_app();
        app.set_date("2019-01-01");
        assert!(app.submit().is_none());
        assert_eq!(failure_msg(&app), "Select a company before submitting.");
    }

    #[test]
    fn submit_without_date_fails_without_a_job() {
        let mut app = test_app();
        app.set_company("AAPL");
        assert!(app.submit().is_none());
        assert_eq!(failure_msg(&app), "Select a start date before submitting.");
    }

    #[test]
    fn accepted_submit_enters_pending_with_the_selection() {
        let mut app = ready_app();
        let job = app.submit().expect("accepted");
        assert_eq!(job.ticker, "AAPL");
        assert_eq!(job.start, "2019-01-01");
        assert!(app.outcome().is_pending());
    }

    #[test]
    fn resubmit_clears_previous_failure() {
        let mut app = test_app();
        app.set_company("AAPL");
        assert!(app.submit().is_none());
        app.set_date("2019-01-01");
        let _job = app.submit().expect("accepted");
        assert!(app.outcome().is_pending());
    }

    // ---------- Completion ----------

    #[test]
    fn successful_fetch_settles_into_normalized_points() {
        let mut app = ready_app();
        let job = app.submit().expect("accepted");
        app.complete_fetch(
            job.seq,
            Ok(vec![entry("2019-01-02", 157.92), entry("2019-01-03", 142.19)]),
        );
        assert_eq!(
            app.outcome(),
            &RequestOutcome::Success(vec![
                ChartPoint {
                    date: "1/2/2019".into(),
                    price: 158
                },
                ChartPoint {
                    date: "1/3/2019".into(),
                    price: 142
                },
            ])
        );
    }

    #[test]
    fn http_failure_shows_the_generic_message() {
        let mut app = ready_app();
        let job = app.submit().expect("accepted");
        app.complete_fetch(job.seq, Err(FetchError::Http { status: 500 }));
        assert_eq!(failure_msg(&app), FETCH_ERROR_MSG);
    }

    #[test]
    fn timeout_shows_the_generic_message() {
        let mut app = ready_app();
        let job = app.submit().expect("accepted");
        app.complete_fetch(job.seq, Err(FetchError::Timeout));
        assert_eq!(failure_msg(&app), FETCH_ERROR_MSG);
    }

    #[test]
    fn malformed_series_shows_the_generic_message() {
        let mut app = ready_app();
        let job = app.submit().expect("accepted");
        app.complete_fetch(
            job.seq,
            Ok(vec![RawEntry {
                date: Some("2019-01-02".into()),
                price: Some(json!("NaN")),
            }]),
        );
        assert_eq!(failure_msg(&app), FETCH_ERROR_MSG);
    }

    // ---------- Supersede ----------

    #[test]
    fn stale_result_is_dropped_while_newer_fetch_is_pending() {
        let mut app = ready_app();
        let first = app.submit().expect("accepted");
        let second = app.submit().expect("accepted");

        app.complete_fetch(first.seq, Ok(vec![entry("2019-01-02", 1.0)]));
        assert!(app.outcome().is_pending(), "stale result must not settle");

        app.complete_fetch(second.seq, Ok(vec![entry("2019-01-03", 2.0)]));
        match app.outcome() {
            RequestOutcome::Success(points) => assert_eq!(points[0].date, "1/3/2019"),
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[test]
    fn stale_result_does_not_overwrite_a_validation_failure() {
        let mut app = ready_app();
        let job = app.submit().expect("accepted");

        // The next attempt is rejected, which still supersedes the fetch.
        app.set_company("");
        assert!(app.submit().is_none());
        app.complete_fetch(job.seq, Ok(vec![entry("2019-01-02", 1.0)]));
        assert_eq!(failure_msg(&app), "Select a company before submitting.");
    }

    // ---------- Full pipeline against a live socket ----------

    #[tokio::test]
    async fn unreachable_service_ends_in_the_generic_failure() {
        use crate::config::ServiceCfg;
        use crate::predict::PredictClient;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let client = PredictClient::new(&ServiceCfg {
            endpoint: format!("http://{addr}/predict/"),
            timeout_sec: 5,
        })
        .expect("client should build");

        let mut app = ready_app();
        let job = app.submit().expect("accepted");
        let result = client.fetch(&job.ticker, &job.start).await;
        app.complete_fetch(job.seq, result);
        assert_eq!(failure_msg(&app), FETCH_ERROR_MSG);
    }
}
