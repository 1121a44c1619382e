//! CLI definition and dispatch.
//!
//! Each invocation loads the named portfolio from the portfolio directory,
//! binds quotes from the CSV quote directory, runs one operation and writes
//! the portfolio back if the operation changed it. A held symbol with no
//! quote file is reported and valued at zero rather than failing the command.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_quote_adapter::CsvQuoteAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::portfolio_file::FilePortfolioStore;
use crate::domain::error::StockfolioError;
use crate::domain::price_series::SharedSeries;
use crate::domain::rebalance::parse_weights;
use crate::domain::registry::PortfolioRegistry;
use crate::domain::settings::Settings;
use crate::ports::portfolio_store_port::PortfolioStore;
use crate::ports::quote_port::QuoteSource;

#[derive(Parser, Debug)]
#[command(name = "stockfolio", about = "Stock portfolio valuation and rebalancing")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long)]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty portfolio
    Create { name: String },
    /// List saved portfolios
    List,
    /// Add shares of a symbol to a portfolio
    Buy {
        name: String,
        symbol: String,
        shares: f64,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Remove shares of a symbol from a portfolio
    Sell {
        name: String,
        symbol: String,
        shares: f64,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Set the share quantity of a symbol
    Set {
        name: String,
        symbol: String,
        shares: f64,
    },
    /// Show symbols and share quantities
    Composition { name: String },
    /// Portfolio value on a date
    Value {
        name: String,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Percentage of value held in each symbol on a date
    Distribution {
        name: String,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Daily portfolio value over a date range
    Performance {
        name: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
    /// Rebalance to target weights ("AAPL=0.5,GOOG=0.5" or "ALL")
    Rebalance {
        name: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        weights: String,
    },
    /// Price change of a symbol between two dates
    GainLoss {
        symbol: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
    /// Trailing moving average of a symbol
    MovingAverage {
        symbol: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        days: Option<usize>,
    },
    /// Dates where a symbol closed above its moving average
    Crossovers {
        symbol: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        days: Option<usize>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = load_config(&cli.config)
        .and_then(|config| Settings::from_config(&config))
        .and_then(|settings| Session::new(settings).execute(cli.command));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StockfolioError> {
    FileConfigAdapter::from_file(path).map_err(|e| StockfolioError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// One command's worth of state: a registry over on-disk portfolios and quotes.
pub struct Session {
    settings: Settings,
    registry: PortfolioRegistry,
    store: FilePortfolioStore,
    quotes: CsvQuoteAdapter,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Session {
            store: FilePortfolioStore::new(settings.portfolio_dir.clone()),
            quotes: CsvQuoteAdapter::new(settings.quotes_dir.clone()),
            registry: PortfolioRegistry::new(),
            settings,
        }
    }

    pub fn registry(&self) -> &PortfolioRegistry {
        &self.registry
    }

    pub fn execute(&mut self, command: Command) -> Result<(), StockfolioError> {
        match command {
            Command::Create { name } => self.create(&name),
            Command::List => {
                for name in self.store.list()? {
                    println!("{name}");
                }
                Ok(())
            }
            Command::Buy {
                name,
                symbol,
                shares,
                date,
            } => {
                let symbol = symbol.to_uppercase();
                self.open(&name)?;
                self.ensure_series(&symbol)?;
                self.registry.add_stock(&name, &symbol, shares, date)?;
                self.save(&name)?;
                eprintln!("Added {shares} shares of {symbol} to {name}");
                Ok(())
            }
            Command::Sell {
                name,
                symbol,
                shares,
                date,
            } => {
                let symbol = symbol.to_uppercase();
                self.open(&name)?;
                self.registry.remove_stock(&name, &symbol, shares, date)?;
                self.save(&name)?;
                eprintln!("Removed {shares} shares of {symbol} from {name}");
                Ok(())
            }
            Command::Set {
                name,
                symbol,
                shares,
            } => {
                let symbol = symbol.to_uppercase();
                self.open(&name)?;
                self.ensure_series(&symbol)?;
                self.registry.update_stock(&name, &symbol, shares)?;
                self.save(&name)?;
                eprintln!("Set {symbol} to {shares} shares in {name}");
                Ok(())
            }
            Command::Composition { name } => {
                self.load(&name)?;
                // any date: composition is the current state
                for (symbol, quantity) in self.registry.composition(&name, NaiveDate::MIN)? {
                    println!("{symbol}\t{quantity}");
                }
                Ok(())
            }
            Command::Value { name, date } => {
                self.open(&name)?;
                println!("{:.2}", self.registry.value(&name, date)?);
                Ok(())
            }
            Command::Distribution { name, date } => {
                self.open(&name)?;
                let distribution = self.registry.value_distribution(&name, date)?;
                if distribution.is_empty() {
                    eprintln!("{name} has no priced holdings on {date}");
                }
                for (symbol, pct) in distribution {
                    println!("{symbol}\t{pct:.2}%");
                }
                Ok(())
            }
            Command::Performance { name, start, end } => {
                self.open(&name)?;
                let values = self.registry.performance(&name, start, end)?;
                for (day, value) in start.iter_days().zip(values) {
                    println!("{day}\t{value:.2}");
                }
                Ok(())
            }
            Command::Rebalance {
                name,
                date,
                weights,
            } => {
                let target = parse_weights(&weights)
                    .map_err(|e| StockfolioError::invalid_input(e.to_string()))?;
                self.open(&name)?;
                self.registry.rebalance_to(&name, &target, date)?;
                self.save(&name)?;
                for (symbol, pct) in self.registry.value_distribution(&name, date)? {
                    println!("{symbol}\t{pct:.2}%");
                }
                Ok(())
            }
            Command::GainLoss { symbol, start, end } => {
                let series = self.quotes.fetch_series(&symbol.to_uppercase())?;
                println!("{:.2}", series.gain_loss(start, end)?);
                Ok(())
            }
            Command::MovingAverage { symbol, date, days } => {
                let days = days.unwrap_or(self.settings.moving_average_days);
                let series = self.quotes.fetch_series(&symbol.to_uppercase())?;
                println!("{:.2}", series.moving_average(date, days)?);
                Ok(())
            }
            Command::Crossovers {
                symbol,
                start,
                end,
                days,
            } => {
                let days = days.unwrap_or(self.settings.moving_average_days);
                let series = self.quotes.fetch_series(&symbol.to_uppercase())?;
                for date in series.crossovers(start, end, days)? {
                    println!("{date}");
                }
                Ok(())
            }
        }
    }

    fn create(&mut self, name: &str) -> Result<(), StockfolioError> {
        if self.store.path_for(name).exists() {
            return Err(StockfolioError::AlreadyExists {
                name: name.to_string(),
            });
        }
        self.registry.create(name)?;
        self.save(name)?;
        eprintln!("Created portfolio {name}");
        Ok(())
    }

    /// Loads `name` from disk and binds quotes to every holding that has a
    /// quote file. Holdings without one stay unpriced.
    fn open(&mut self, name: &str) -> Result<(), StockfolioError> {
        self.load(name)?;
        for symbol in self.registry.bind_available_quotes(name, &self.quotes)? {
            eprintln!("warning: no quotes for {symbol}; it is valued at 0");
        }
        Ok(())
    }

    fn load(&mut self, name: &str) -> Result<(), StockfolioError> {
        let loaded = self.registry.load(name, &self.store)?;
        if loaded != name {
            tracing::warn!(file = %name, recorded = %loaded, "portfolio file records a different name");
            return Err(StockfolioError::Parse {
                line: 1,
                reason: format!("file for {name} is headed {loaded:?}"),
            });
        }
        Ok(())
    }

    fn save(&self, name: &str) -> Result<(), StockfolioError> {
        self.registry.save(name, &self.store)
    }

    fn ensure_series(&mut self, symbol: &str) -> Result<SharedSeries, StockfolioError> {
        if let Some(series) = self.registry.series(symbol) {
            return Ok(series);
        }
        let series = self.quotes.fetch_series(symbol)?;
        Ok(self.registry.add_series(series))
    }
}
