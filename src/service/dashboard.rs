use crate::config::AdminConfig;
use crate::db::{DashboardStorage, SalesRecord};
use crate::error::DashboardError;
use crate::service::charts::Charts;
use crate::service::credentials::Authenticator;
use crate::service::filter::{self, FilterOptions, Selection, SelectionRequest};
use crate::service::ingest::{IngestReport, parse_sales_csv};
use crate::session::SessionState;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Immutable snapshot handed back after every dashboard action.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardView {
    pub records: Vec<SalesRecord>,
    pub options: FilterOptions,
    pub selection: Selection,
    pub charts: Charts,
}

impl DashboardView {
    fn build(all: Vec<SalesRecord>, request: SelectionRequest) -> Self {
        let options = FilterOptions::from_records(&all);
        let selection = request.resolve(&options);
        let records = filter::apply(&all, &selection);
        let charts = Charts::from_records(&records);
        Self {
            records,
            options,
            selection,
            charts,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginOutcome {
    pub username: String,
    /// The stored credential is still the bootstrap default and should be rotated.
    pub default_credential: bool,
}

/// Event handlers for the dashboard. Each action maps to one method.
#[derive(Clone)]
pub struct Dashboard {
    storage: DashboardStorage,
    auth: Authenticator,
}

impl Dashboard {
    /// Wire the dashboard to `storage` and make sure the admin credential exists.
    pub async fn bootstrap(
        storage: DashboardStorage,
        admin: &AdminConfig,
    ) -> Result<Self, DashboardError> {
        let auth = Authenticator::new(storage.clone(), admin);
        auth.ensure_admin_exists(admin).await?;
        Ok(Self { storage, auth })
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool, DashboardError> {
        self.auth.verify(username, password).await
    }

    /// Replace all sales rows with the contents of `bytes`. The store is left
    /// untouched when the file does not parse.
    pub async fn upload(&self, bytes: &[u8]) -> Result<IngestReport, DashboardError> {
        let parsed = parse_sales_csv(bytes)?;
        self.storage.replace_sales(&parsed.records).await?;
        let report = IngestReport {
            rows: parsed.records.len(),
            columns_ignored: parsed.columns_ignored,
            ingested_at: Utc::now(),
        };
        info!(rows = report.rows, "sales table replaced from upload");
        Ok(report)
    }

    pub async fn query(&self, request: SelectionRequest) -> Result<Vec<SalesRecord>, DashboardError> {
        let all = self.storage.fetch_all().await?;
        let options = FilterOptions::from_records(&all);
        Ok(filter::apply(&all, &request.resolve(&options)))
    }

    pub async fn on_login(
        &self,
        session: SessionState,
        username: &str,
        password: &str,
    ) -> Result<(SessionState, LoginOutcome), DashboardError> {
        let verified = match &session {
            SessionState::Authenticated { .. } => true,
            SessionState::Unauthenticated => self.authenticate(username, password).await?,
        };
        let next = session.on_login_result(username, verified);

        let Some(current) = next.username() else {
            warn!(username = %username, "login rejected");
            return Err(DashboardError::InvalidCredentials);
        };
        let outcome = LoginOutcome {
            username: current.to_string(),
            default_credential: self.auth.default_credential_in_use(current).await?,
        };
        info!(username = %outcome.username, "login succeeded");
        Ok((next, outcome))
    }

    pub async fn on_upload(
        &self,
        session: &SessionState,
        bytes: &[u8],
    ) -> Result<(IngestReport, DashboardView), DashboardError> {
        require_authenticated(session)?;
        let report = self.upload(bytes).await?;
        let view = self.view(SelectionRequest::default()).await?;
        Ok((report, view))
    }

    pub async fn on_filter_change(
        &self,
        session: &SessionState,
        request: SelectionRequest,
    ) -> Result<DashboardView, DashboardError> {
        require_authenticated(session)?;
        debug!(?request, "filter change");
        self.view(request).await
    }

    async fn view(&self, request: SelectionRequest) -> Result<DashboardView, DashboardError> {
        let all = self.storage.fetch_all().await?;
        Ok(DashboardView::build(all, request))
    }
}

fn require_authenticated(session: &SessionState) -> Result<(), DashboardError> {
    if session.is_authenticated() {
        Ok(())
    } else {
        Err(DashboardError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::charts::CostRange;

    const SCENARIO: &str = "sales_id,customer_id,country,cost\n1,C1,US,40\n2,C2,US,120\n";

    async fn dashboard() -> Dashboard {
        let storage = DashboardStorage::connect("sqlite::memory:").await.unwrap();
        Dashboard::bootstrap(storage, &AdminConfig::default())
            .await
            .unwrap()
    }

    fn admin() -> SessionState {
        SessionState::Authenticated {
            username: "admin".into(),
        }
    }

    #[tokio::test]
    async fn default_login_flow() {
        let d = dashboard().await;
        assert!(d.authenticate("admin", "admin").await.unwrap());
        assert!(!d.authenticate("admin", "wrong").await.unwrap());

        let err = d
            .on_login(SessionState::Unauthenticated, "admin", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidCredentials));

        let (session, outcome) = d
            .on_login(SessionState::Unauthenticated, "admin", "admin")
            .await
            .unwrap();
        assert_eq!(session, admin());
        assert!(outcome.default_credential);
    }

    #[tokio::test]
    async fn unknown_user_gets_the_same_rejection() {
        let d = dashboard().await;
        let err = d
            .on_login(SessionState::Unauthenticated, "mallory", "admin")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid username or password");
    }

    #[tokio::test]
    async fn authenticated_session_survives_a_bad_login() {
        let d = dashboard().await;
        let (session, outcome) = d.on_login(admin(), "admin", "nope").await.unwrap();
        assert_eq!(session, admin());
        assert_eq!(outcome.username, "admin");
    }

    #[tokio::test]
    async fn actions_require_a_session() {
        let d = dashboard().await;
        let anon = SessionState::Unauthenticated;
        assert!(matches!(
            d.on_upload(&anon, SCENARIO.as_bytes()).await,
            Err(DashboardError::Unauthenticated)
        ));
        assert!(matches!(
            d.on_filter_change(&anon, SelectionRequest::default()).await,
            Err(DashboardError::Unauthenticated)
        ));
        assert!(d.query(SelectionRequest::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scenario_upload_query_and_buckets() {
        let d = dashboard().await;
        let (report, view) = d.on_upload(&admin(), SCENARIO.as_bytes()).await.unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(view.records.len(), 2);
        assert_eq!(view.selection, Selection::all(&view.options));

        let us_only = SelectionRequest {
            countries: Some(vec!["US".into()]),
            ..Default::default()
        };
        assert_eq!(d.query(us_only).await.unwrap().len(), 2);

        let ranges: Vec<(CostRange, usize)> = view
            .charts
            .cost_ranges
            .iter()
            .map(|s| (s.range, s.count))
            .collect();
        assert_eq!(
            ranges,
            vec![(CostRange::UpTo50, 1), (CostRange::UpTo150, 1)]
        );
        assert_eq!(view.charts.country_distribution[0].count, 2);
    }

    #[tokio::test]
    async fn second_upload_replaces_the_first() {
        let d = dashboard().await;
        d.upload(SCENARIO.as_bytes()).await.unwrap();
        let report = d
            .upload(b"cost,country,customer_id,sales_id\n5,FR,C9,9\n")
            .await
            .unwrap();
        assert_eq!(report.rows, 1);

        let rows = d.query(SelectionRequest::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sales_id, 9);
        assert_eq!(rows[0].country, "FR");
    }

    #[tokio::test]
    async fn rejected_upload_keeps_previous_rows() {
        let d = dashboard().await;
        d.upload(SCENARIO.as_bytes()).await.unwrap();
        let err = d.upload(b"sales_id,country\n3,DE\n").await.unwrap_err();
        assert!(matches!(err, DashboardError::Ingest(_)));
        assert_eq!(d.query(SelectionRequest::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn nan_cost_upload_is_an_ingest_error() {
        let d = dashboard().await;
        d.upload(SCENARIO.as_bytes()).await.unwrap();
        let err = d
            .upload(b"sales_id,customer_id,country,cost\n1,C1,US,NaN\n2,C2,US,40\n")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Ingest(crate::error::IngestError::InvalidField { row: 1, column: "cost", .. })
        ));
        assert_eq!(d.query(SelectionRequest::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_selection_empties_the_view() {
        let d = dashboard().await;
        d.upload(SCENARIO.as_bytes()).await.unwrap();
        let view = d
            .on_filter_change(
                &admin(),
                SelectionRequest {
                    sales_ids: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(view.records.is_empty());
        assert_eq!(view.options.sales_ids, vec![1, 2]);
        assert_eq!(view.charts, Charts::default());
    }
}
