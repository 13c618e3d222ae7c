//! Screen flow controller: a six-state machine driven by user actions.
//!
//! ```text
//! Welcome -> Capital -> TradeSetup -> Analyzing -> Results -> Vault
//!               ^                                               |
//!               +------------------- new trade -----------------+
//! ```
//!
//! Results only advances to Vault when the journal save succeeds.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::view::{self, View};
use crate::identity::Identity;
use crate::journal::{self, JournalStore};
use crate::models::{JournalRow, Screen, Session, TradeSetup, Trend};
use crate::trading::{PositionSizer, PositionSizing, SizingError, WizardConfig};

/// Rejected wizard actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("cannot {action} from {screen}")]
    InvalidTransition { screen: Screen, action: &'static str },

    #[error("{0} has not been entered yet")]
    MissingInput(&'static str),

    #[error("cannot size this trade: {0}")]
    Sizing(#[from] SizingError),
}

/// Result of pressing "Save Entry".
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Row written to the journal and mirrored into the session
    Saved(JournalRow),
    /// Store error text; the wizard stays on the results screen
    Failed(String),
}

/// One wizard session bound to a journal store.
pub struct Wizard {
    session: Session,
    store: Arc<dyn JournalStore>,
    identity: Identity,
    config: WizardConfig,
}

impl Wizard {
    pub fn new(store: Arc<dyn JournalStore>, identity: Identity, config: WizardConfig) -> Self {
        Self {
            session: Session::new(),
            store,
            identity,
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn screen(&self) -> Screen {
        self.session.screen
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// Render the current screen.
    pub fn view(&self) -> View {
        view::render(&self.session, &self.config)
    }

    /// S1 -> S2 on "Start".
    pub fn start(&mut self) -> Result<(), FlowError> {
        self.ensure_on(Screen::Welcome, "start")?;
        self.move_to(Screen::Capital);
        Ok(())
    }

    /// S2 -> S3 on "Next", capturing the capital.
    pub fn submit_capital(&mut self, total_inv: Decimal) -> Result<(), FlowError> {
        self.ensure_on(Screen::Capital, "submit capital")?;
        self.session.total_inv = Some(total_inv);
        self.move_to(Screen::TradeSetup);
        Ok(())
    }

    /// S3 -> S4 on "Analyze", capturing the trade setup.
    ///
    /// Setups that cannot be sized are rejected and the wizard stays on S3.
    pub fn submit_setup(&mut self, setup: TradeSetup) -> Result<(), FlowError> {
        self.ensure_on(Screen::TradeSetup, "analyze")?;
        let total_inv = self.session.total_inv.ok_or(FlowError::MissingInput("capital"))?;
        PositionSizer::calculate(total_inv, setup.entry_price, setup.stop_loss_orig)?;

        info!(
            stock = %setup.stock,
            entry = %setup.entry_price,
            stop_loss = %setup.stop_loss_orig,
            checks = setup.checks(),
            "Trade setup captured"
        );
        self.session.setup = Some(setup);
        self.move_to(Screen::Analyzing);
        Ok(())
    }

    /// S4 -> S5 once the analysis delay has elapsed.
    pub fn finish_analysis(&mut self) -> Result<(), FlowError> {
        self.ensure_on(Screen::Analyzing, "finish analysis")?;
        self.session.last_error = None;
        self.move_to(Screen::Results);
        Ok(())
    }

    /// Journal row for the captured inputs, stamped with the current user.
    pub fn build_row(&self) -> Result<JournalRow, FlowError> {
        let sizing = sizing_for(&self.session)?;
        let total_inv = self.session.total_inv.ok_or(FlowError::MissingInput("capital"))?;
        let setup = self.session.setup.as_ref().ok_or(FlowError::MissingInput("trade setup"))?;

        Ok(JournalRow {
            email: self.identity.email().to_string(),
            date: setup.trade_date,
            total_capital: total_inv,
            stock: setup.stock.clone(),
            entry_price: setup.entry_price,
            stop_loss_orig: setup.stop_loss_orig,
            target: sizing.target,
            trailing_sl1: sizing.trailing_sl1,
            shares: sizing.shares,
            investment: sizing.investment,
            nifty_trend: Trend::from(setup.trends.nifty),
            sensex_trend: Trend::from(setup.trends.sensex),
            industry_trend: Trend::from(setup.trends.industry),
            stock_trend: Trend::from(setup.trends.stock),
        })
    }

    /// S5 -> S6 on "Save Entry" when the journal write succeeds.
    ///
    /// A store failure is not an `Err`: it is recorded on the session and
    /// returned as [`SaveOutcome::Failed`], leaving the wizard on S5 with the
    /// mirror untouched.
    pub async fn save_entry(&mut self) -> Result<SaveOutcome, FlowError> {
        self.ensure_on(Screen::Results, "save entry")?;
        let row = self.build_row()?;

        match journal::save_row(self.store.as_ref(), row.clone()).await {
            Ok(table) => {
                info!(
                    stock = %row.stock,
                    shares = row.shares,
                    rows = table.len(),
                    store = %self.store.describe(),
                    "Journal entry saved"
                );
                self.session.journal.push(row.clone());
                self.session.last_error = None;
                self.move_to(Screen::Vault);
                Ok(SaveOutcome::Saved(row))
            }
            Err(e) => {
                let message = format!("{:#}", e);
                warn!(error = %message, "Journal save failed");
                self.session.last_error = Some(message.clone());
                Ok(SaveOutcome::Failed(message))
            }
        }
    }

    /// S6 -> S2 on "New Trade". The session journal is kept.
    pub fn new_trade(&mut self) -> Result<(), FlowError> {
        self.ensure_on(Screen::Vault, "start a new trade")?;
        self.move_to(Screen::Capital);
        Ok(())
    }

    fn ensure_on(&self, screen: Screen, action: &'static str) -> Result<(), FlowError> {
        if self.session.screen == screen {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition {
                screen: self.session.screen,
                action,
            })
        }
    }

    fn move_to(&mut self, screen: Screen) {
        info!(from = %self.session.screen, to = %screen, "Screen changed");
        self.session.screen = screen;
    }
}

/// Sizing figures for a session's captured inputs.
pub(crate) fn sizing_for(session: &Session) -> Result<PositionSizing, FlowError> {
    let total_inv = session.total_inv.ok_or(FlowError::MissingInput("capital"))?;
    let setup = session.setup.as_ref().ok_or(FlowError::MissingInput("trade setup"))?;
    Ok(PositionSizer::calculate(total_inv, setup.entry_price, setup.stop_loss_orig)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::testing::MemoryStore;
    use crate::models::TrendChecks;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn setup(stock: &str, entry: Decimal, stop: Decimal) -> TradeSetup {
        TradeSetup::new(
            stock,
            entry,
            NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
            stop,
            TrendChecks {
                nifty: true,
                sensex: true,
                industry: false,
                stock: true,
            },
        )
    }

    fn wizard_with(store: Arc<MemoryStore>) -> Wizard {
        Wizard::new(
            store,
            Identity::resolve(Some("trader@example.com"), "Local Test User"),
            WizardConfig::default().without_delays(),
        )
    }

    /// Walk a fresh wizard up to the results screen.
    fn reach_results(wizard: &mut Wizard, stock: &str) {
        if wizard.screen() == Screen::Welcome {
            wizard.start().unwrap();
        }
        wizard.submit_capital(dec!(100000)).unwrap();
        wizard.submit_setup(setup(stock, dec!(2500.0), dec!(2450.0))).unwrap();
        wizard.finish_analysis().unwrap();
    }

    #[test]
    fn test_forward_flow_steps() {
        let mut wizard = wizard_with(Arc::new(MemoryStore::default()));
        assert_eq!(wizard.session().step(), 1);

        wizard.start().unwrap();
        assert_eq!(wizard.session().step(), 2);

        wizard.submit_capital(dec!(100000)).unwrap();
        assert_eq!(wizard.session().step(), 3);
        assert_eq!(wizard.session().total_inv, Some(dec!(100000)));

        wizard.submit_setup(setup("reliance", dec!(2500), dec!(2450))).unwrap();
        assert_eq!(wizard.session().step(), 4);

        wizard.finish_analysis().unwrap();
        assert_eq!(wizard.session().step(), 5);

        let sizing = sizing_for(wizard.session()).unwrap();
        assert_eq!(sizing.shares, 20);
        assert_eq!(sizing.target, dec!(2600));
    }

    #[test]
    fn test_out_of_order_actions_rejected() {
        let mut wizard = wizard_with(Arc::new(MemoryStore::default()));

        let err = wizard.submit_capital(dec!(5000)).unwrap_err();
        assert_eq!(
            err,
            FlowError::InvalidTransition {
                screen: Screen::Welcome,
                action: "submit capital",
            }
        );
        assert!(wizard.session().total_inv.is_none());
        assert!(wizard.new_trade().is_err());
        assert!(wizard.finish_analysis().is_err());
        assert_eq!(wizard.screen(), Screen::Welcome);
    }

    #[test]
    fn test_unsizeable_setup_stays_on_trade_setup() {
        let mut wizard = wizard_with(Arc::new(MemoryStore::default()));
        wizard.start().unwrap();
        wizard.submit_capital(Decimal::from_scientific("1e22").unwrap()).unwrap();

        let err = wizard.submit_setup(setup("tcs", dec!(100.001), dec!(100))).unwrap_err();

        assert_eq!(err, FlowError::Sizing(SizingError::OutOfRange("share count")));
        assert_eq!(wizard.screen(), Screen::TradeSetup);
        assert!(wizard.session().setup.is_none());

        wizard.submit_setup(setup("tcs", dec!(2500), dec!(2450))).unwrap();
        assert_eq!(wizard.screen(), Screen::Analyzing);
    }

    #[test]
    fn test_row_without_inputs_is_missing() {
        let wizard = wizard_with(Arc::new(MemoryStore::default()));
        assert_eq!(wizard.build_row().unwrap_err(), FlowError::MissingInput("capital"));
    }

    #[tokio::test]
    async fn test_save_moves_to_vault_and_mirrors_row() {
        let store = Arc::new(MemoryStore::default());
        let mut wizard = wizard_with(store.clone());
        reach_results(&mut wizard, "tcs");

        let outcome = wizard.save_entry().await.unwrap();

        let SaveOutcome::Saved(row) = outcome else {
            panic!("expected save to succeed");
        };
        assert_eq!(wizard.screen(), Screen::Vault);
        assert_eq!(row.email, "trader@example.com");
        assert_eq!(row.stock, "TCS");
        assert_eq!(row.shares, 20);
        assert_eq!(row.investment, dec!(50000));
        assert_eq!(row.trailing_sl1, dec!(2555.76));
        assert_eq!(row.trends(), [Trend::Up, Trend::Up, Trend::Down, Trend::Up]);
        assert_eq!(wizard.session().journal, vec![row.clone()]);
        assert_eq!(store.read().await.unwrap(), vec![row]);
    }

    #[tokio::test]
    async fn test_failed_save_stays_on_results() {
        let store = Arc::new(MemoryStore::failing("worksheet is read-only"));
        let mut wizard = wizard_with(store);
        reach_results(&mut wizard, "tcs");

        let outcome = wizard.save_entry().await.unwrap();

        let SaveOutcome::Failed(message) = outcome else {
            panic!("expected save to fail");
        };
        assert!(message.contains("worksheet is read-only"));
        assert_eq!(wizard.screen(), Screen::Results);
        assert!(wizard.session().journal.is_empty());
        assert_eq!(wizard.session().last_error.as_deref(), Some(message.as_str()));
        assert!(wizard.view().to_string().contains("Error: "));
    }

    #[tokio::test]
    async fn test_new_trade_keeps_journal() {
        let store = Arc::new(MemoryStore::default());
        let mut wizard = wizard_with(store.clone());

        reach_results(&mut wizard, "tcs");
        wizard.save_entry().await.unwrap();
        wizard.new_trade().unwrap();
        assert_eq!(wizard.screen(), Screen::Capital);
        assert_eq!(wizard.session().journal.len(), 1);

        reach_results(&mut wizard, "infy");
        wizard.save_entry().await.unwrap();
        wizard.new_trade().unwrap();

        let stocks: Vec<_> = wizard.session().journal.iter().map(|r| r.stock.as_str()).collect();
        assert_eq!(stocks, ["TCS", "INFY"]);
        assert_eq!(store.read().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mirror_only_holds_session_rows() {
        let store = Arc::new(MemoryStore::default());
        store.overwrite(&[crate::journal::testing::sample_row("OLD")]).await.unwrap();
        let mut wizard = wizard_with(store.clone());

        reach_results(&mut wizard, "tcs");
        wizard.save_entry().await.unwrap();

        assert_eq!(wizard.session().journal.len(), 1);
        let stored = store.read().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].stock, "OLD");
        assert_eq!(stored[1].stock, "TCS");
    }
}
