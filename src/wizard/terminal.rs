//! Line-oriented terminal driver for the wizard.
//!
//! Reads one answer per line. `q` or end of input at any prompt ends the
//! session; an empty answer takes the default shown in brackets.

use std::io::Write;
use std::str::FromStr;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use super::flow::{FlowError, SaveOutcome, Wizard};
use crate::models::{Screen, TradeSetup, TrendChecks};

/// Terminal session wrapping an input stream and an output sink.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Drive `wizard` until the user quits or input ends.
    pub async fn run(&mut self, wizard: &mut Wizard) -> Result<()> {
        loop {
            debug!(step = wizard.session().step(), "Rendering screen");
            write!(self.output, "{}", wizard.view())?;

            let keep_going = match wizard.screen() {
                Screen::Welcome => self.welcome(wizard).await?,
                Screen::Capital => self.capital(wizard).await?,
                Screen::TradeSetup => self.trade_setup(wizard).await?,
                Screen::Analyzing => {
                    self.analyze(wizard).await?;
                    true
                }
                Screen::Results => self.results(wizard).await?,
                Screen::Vault => self.vault(wizard).await?,
            };

            if !keep_going {
                break;
            }
        }

        info!(saved = wizard.session().journal.len(), "Session ended");
        writeln!(self.output, "\nGoodbye.")?;
        Ok(())
    }

    async fn welcome(&mut self, wizard: &mut Wizard) -> Result<bool> {
        if self.prompt("Press Enter to start a new analysis").await?.is_none() {
            return Ok(false);
        }
        wizard.start()?;
        Ok(true)
    }

    async fn capital(&mut self, wizard: &mut Wizard) -> Result<bool> {
        let default = wizard.config().default_capital;
        let Some(capital) = self.prompt_decimal("Capital", default).await? else {
            return Ok(false);
        };
        wizard.submit_capital(capital)?;
        Ok(true)
    }

    async fn trade_setup(&mut self, wizard: &mut Wizard) -> Result<bool> {
        let config = wizard.config().clone();

        let Some(stock) = self.prompt_text("Stock", &config.default_stock).await? else {
            return Ok(false);
        };
        let Some(entry) = self.prompt_decimal("Entry", config.default_entry_price).await? else {
            return Ok(false);
        };
        let Some(date) = self.prompt_date("Date", Local::now().date_naive()).await? else {
            return Ok(false);
        };
        let Some(stop_loss) = self.prompt_decimal("SL", config.default_stop_loss).await? else {
            return Ok(false);
        };

        let mut flags = [false; 4];
        let labels = ["Nifty 50 Trend", "Sensex Trend", "Industry Trend", "Stock Trend"];
        for (flag, label) in flags.iter_mut().zip(labels) {
            let Some(checked) = self.prompt_bool(label).await? else {
                return Ok(false);
            };
            *flag = checked;
        }
        let [nifty, sensex, industry, stock_trend] = flags;

        let trends = TrendChecks {
            nifty,
            sensex,
            industry,
            stock: stock_trend,
        };
        match wizard.submit_setup(TradeSetup::new(&stock, entry, date, stop_loss, trends)) {
            Ok(()) => {}
            Err(e @ FlowError::Sizing(_)) => writeln!(self.output, "{}", e)?,
            Err(e) => return Err(e.into()),
        }
        Ok(true)
    }

    async fn analyze(&mut self, wizard: &mut Wizard) -> Result<()> {
        let ticks = wizard.config().analysis_ticks.max(1);
        let tick = wizard.config().analysis_tick();

        for i in 1..=ticks {
            if !tick.is_zero() {
                tokio::time::sleep(tick).await;
            }
            let filled = (i * 40 / ticks) as usize;
            write!(
                self.output,
                "\r[{}{}] {:>3}%",
                "#".repeat(filled),
                ".".repeat(40 - filled),
                i * 100 / ticks
            )?;
            self.output.flush()?;
        }
        writeln!(self.output)?;

        wizard.finish_analysis()?;
        Ok(())
    }

    async fn results(&mut self, wizard: &mut Wizard) -> Result<bool> {
        let Some(choice) = self.prompt("[s] Save Entry & View Journal").await? else {
            return Ok(false);
        };

        match choice.to_lowercase().as_str() {
            "" | "s" | "save" => match wizard.save_entry().await? {
                SaveOutcome::Saved(_) => {
                    writeln!(self.output, "Saved to journal!")?;
                    let delay = wizard.config().confirm_delay();
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                SaveOutcome::Failed(message) => {
                    debug!(error = %message, "Staying on results after failed save");
                }
            },
            other => writeln!(self.output, "Unknown choice '{}'", other)?,
        }
        Ok(true)
    }

    async fn vault(&mut self, wizard: &mut Wizard) -> Result<bool> {
        let Some(choice) = self.prompt("[n] New Trade").await? else {
            return Ok(false);
        };

        match choice.to_lowercase().as_str() {
            "" | "n" | "new" => wizard.new_trade()?,
            other => writeln!(self.output, "Unknown choice '{}'", other)?,
        }
        Ok(true)
    }

    /// Print a prompt and read one trimmed line. `None` on quit or end of input.
    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{} (q to quit): ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }

        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        Ok(Some(answer.to_string()))
    }

    async fn prompt_text(&mut self, label: &str, default: &str) -> Result<Option<String>> {
        let answer = self.prompt(&format!("{} [{}]", label, default)).await?;
        Ok(answer.map(|a| if a.is_empty() { default.to_string() } else { a }))
    }

    async fn prompt_decimal(&mut self, label: &str, default: Decimal) -> Result<Option<Decimal>> {
        loop {
            let Some(answer) = self.prompt(&format!("{} [{}]", label, default)).await? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(default));
            }
            match Decimal::from_str(&answer.replace([',', '_'], "")) {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "'{}' is not a number", answer)?,
            }
        }
    }

    async fn prompt_date(&mut self, label: &str, default: NaiveDate) -> Result<Option<NaiveDate>> {
        loop {
            let Some(answer) = self.prompt(&format!("{} [{}]", label, default.format("%Y-%m-%d"))).await? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(default));
            }
            match NaiveDate::parse_from_str(&answer, "%Y-%m-%d") {
                Ok(date) => return Ok(Some(date)),
                Err(_) => writeln!(self.output, "'{}' is not a date (YYYY-MM-DD)", answer)?,
            }
        }
    }

    async fn prompt_bool(&mut self, label: &str) -> Result<Option<bool>> {
        loop {
            let Some(answer) = self.prompt(&format!("{} [y/N]", label)).await? else {
                return Ok(None);
            };
            match answer.to_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(true)),
                "" | "n" | "no" => return Ok(Some(false)),
                _ => writeln!(self.output, "Please answer y or n")?,
            }
        }
    }
}
