//! CLI integration tests.
//!
//! Tests cover:
//! - Config loading and validation failures
//! - Portfolio lifecycle on disk (create, buy, sell, set, rebalance)
//! - Read-only queries leave portfolio files untouched
//! - Error exit codes for unknown portfolios and bad input

mod common;

use clap::Parser;
use common::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stockfolio::adapters::portfolio_file::load_from_file;
use stockfolio::cli::{self, Cli, Command, Session};
use stockfolio::domain::error::StockfolioError;
use stockfolio::domain::settings::Settings;
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    config: PathBuf,
    quotes: PathBuf,
    portfolios: PathBuf,
}

fn workspace() -> Workspace {
    let dir = TempDir::new().unwrap();
    let quotes = dir.path().join("quotes");
    let portfolios = dir.path().join("portfolios");
    fs::create_dir_all(&quotes).unwrap();

    fs::write(
        quotes.join("AAPL.csv"),
        quote_csv(&[
            ("2021-01-01", 100.0),
            ("2021-01-02", 105.0),
            ("2021-01-03", 110.0),
            ("2021-01-04", 115.0),
        ]),
    )
    .unwrap();
    fs::write(
        quotes.join("GOOG.csv"),
        quote_csv(&[("2021-01-01", 1400.0), ("2021-01-02", 1500.0)]),
    )
    .unwrap();

    let config = dir.path().join("stockfolio.ini");
    fs::write(
        &config,
        format!(
            "[quotes]\ndata_dir = {}\n\n[portfolios]\ndir = {}\n\n[analysis]\nmoving_average_days = 2\n",
            quotes.display(),
            portfolios.display()
        ),
    )
    .unwrap();

    Workspace {
        _dir: dir,
        config,
        quotes,
        portfolios,
    }
}

fn run(ws: &Workspace, args: &[&str]) -> ExitCode {
    let config = ws.config.display().to_string();
    let mut argv = vec!["stockfolio", "--config", config.as_str()];
    argv.extend_from_slice(args);
    cli::run(Cli::try_parse_from(argv).unwrap())
}

fn session(ws: &Workspace) -> Session {
    let config = cli::load_config(&ws.config).unwrap();
    Session::new(Settings::from_config(&config).unwrap())
}

fn saved(ws: &Workspace, name: &str) -> stockfolio::domain::portfolio::Portfolio {
    load_from_file(ws.portfolios.join(format!("{name}.csv"))).unwrap()
}

fn file_text(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

mod config_loading {
    use super::*;

    #[test]
    fn missing_config_file() {
        let result = cli::load_config(Path::new("/nonexistent/stockfolio.ini"));
        assert!(matches!(result, Err(StockfolioError::ConfigParse { .. })));
    }

    #[test]
    fn missing_required_key_fails_command() {
        let ws = workspace();
        fs::write(&ws.config, "[quotes]\ndata_dir = q\n").unwrap();
        assert_eq!(run(&ws, &["list"]), ExitCode::from(2));
    }

    #[test]
    fn settings_from_workspace() {
        let ws = workspace();
        let config = cli::load_config(&ws.config).unwrap();
        let settings = Settings::from_config(&config).unwrap();
        assert_eq!(settings.quotes_dir, ws.quotes);
        assert_eq!(settings.portfolio_dir, ws.portfolios);
        assert_eq!(settings.moving_average_days, 2);
    }
}

mod portfolio_lifecycle {
    use super::*;

    #[test]
    fn create_writes_name_only_file() {
        let ws = workspace();
        assert_eq!(run(&ws, &["create", "Growth"]), ExitCode::SUCCESS);
        assert_eq!(file_text(&ws.portfolios.join("Growth.csv")), "Growth\n");
    }

    #[test]
    fn create_twice_fails() {
        let ws = workspace();
        assert_eq!(run(&ws, &["create", "Growth"]), ExitCode::SUCCESS);
        assert_eq!(run(&ws, &["create", "Growth"]), ExitCode::from(4));
    }

    #[test]
    fn buy_sell_set_round_trip_through_disk() {
        let ws = workspace();
        run(&ws, &["create", "Growth"]);

        assert_eq!(
            run(&ws, &["buy", "Growth", "aapl", "10", "--date", "2021-01-01"]),
            ExitCode::SUCCESS
        );
        assert_eq!(
            run(&ws, &["buy", "Growth", "AAPL", "2.5", "--date", "2021-01-02"]),
            ExitCode::SUCCESS
        );
        assert_eq!(saved(&ws, "Growth").quantity("AAPL"), Some(12.5));

        assert_eq!(
            run(&ws, &["sell", "Growth", "AAPL", "0.5", "--date", "2021-01-03"]),
            ExitCode::SUCCESS
        );
        assert_eq!(saved(&ws, "Growth").quantity("AAPL"), Some(12.0));

        assert_eq!(run(&ws, &["set", "Growth", "GOOG", "2"]), ExitCode::SUCCESS);
        assert_eq!(
            file_text(&ws.portfolios.join("Growth.csv")),
            "Growth\nAAPL,12.0\nGOOG,2.0\n"
        );

        assert_eq!(
            run(&ws, &["sell", "Growth", "AAPL", "12", "--date", "2021-01-04"]),
            ExitCode::SUCCESS
        );
        assert!(!saved(&ws, "Growth").contains("AAPL"));
    }

    #[test]
    fn buy_unknown_symbol_is_data_error() {
        let ws = workspace();
        run(&ws, &["create", "Growth"]);
        assert_eq!(
            run(&ws, &["buy", "Growth", "ZZZZ", "1", "--date", "2021-01-01"]),
            ExitCode::from(5)
        );
    }

    #[test]
    fn buy_non_positive_is_invalid_input() {
        let ws = workspace();
        run(&ws, &["create", "Growth"]);
        assert_eq!(
            run(&ws, &["buy", "Growth", "AAPL", "0", "--date", "2021-01-01"]),
            ExitCode::from(3)
        );
        assert_eq!(file_text(&ws.portfolios.join("Growth.csv")), "Growth\n");
    }

    #[test]
    fn unknown_portfolio_is_not_found() {
        let ws = workspace();
        assert_eq!(
            run(&ws, &["value", "Ghost", "--date", "2021-01-01"]),
            ExitCode::from(4)
        );
    }

    #[test]
    fn rebalance_equal_weights_persists() {
        let ws = workspace();
        run(&ws, &["create", "Growth"]);
        run(&ws, &["buy", "Growth", "AAPL", "10", "--date", "2021-01-02"]);
        run(&ws, &["buy", "Growth", "GOOG", "2", "--date", "2021-01-02"]);

        assert_eq!(
            run(&ws, &["rebalance", "Growth", "--date", "2021-01-02", "--weights", "ALL"]),
            ExitCode::SUCCESS
        );

        let mut session = session(&ws);
        session
            .execute(Command::Composition {
                name: "Growth".into(),
            })
            .unwrap();
        let dist = session
            .registry()
            .value_distribution("Growth", date(2021, 1, 2))
            .unwrap();
        assert!((dist["AAPL"] - 50.0).abs() < 0.1);
        assert!((dist["GOOG"] - 50.0).abs() < 0.1);
    }

    #[test]
    fn rebalance_bad_weights() {
        let ws = workspace();
        run(&ws, &["create", "Growth"]);
        assert_eq!(
            run(&ws, &["rebalance", "Growth", "--date", "2021-01-02", "--weights", "AAPL"]),
            ExitCode::from(3)
        );
    }

    #[test]
    fn queries_do_not_modify_file() {
        let ws = workspace();
        run(&ws, &["create", "Growth"]);
        run(&ws, &["buy", "Growth", "AAPL", "10", "--date", "2021-01-01"]);
        let before = file_text(&ws.portfolios.join("Growth.csv"));

        assert_eq!(run(&ws, &["composition", "Growth"]), ExitCode::SUCCESS);
        assert_eq!(
            run(&ws, &["value", "Growth", "--date", "2021-01-01"]),
            ExitCode::SUCCESS
        );
        assert_eq!(
            run(&ws, &["distribution", "Growth", "--date", "2021-01-01"]),
            ExitCode::SUCCESS
        );
        assert_eq!(
            run(&ws, &[
                "performance", "Growth", "--start", "2021-01-01", "--end", "2021-01-04"
            ]),
            ExitCode::SUCCESS
        );

        assert_eq!(file_text(&ws.portfolios.join("Growth.csv")), before);
    }

    #[test]
    fn holding_without_quote_file_is_valued_at_zero() {
        let ws = workspace();
        fs::create_dir_all(&ws.portfolios).unwrap();
        fs::write(
            ws.portfolios.join("Growth.csv"),
            "Growth\nAAPL,10.0\nDELISTED,3.0\n",
        )
        .unwrap();

        assert_eq!(run(&ws, &["composition", "Growth"]), ExitCode::SUCCESS);
        assert_eq!(
            run(&ws, &["value", "Growth", "--date", "2021-01-01"]),
            ExitCode::SUCCESS
        );
        assert_eq!(
            run(&ws, &["sell", "Growth", "AAPL", "1", "--date", "2021-01-01"]),
            ExitCode::SUCCESS
        );
        assert_eq!(
            file_text(&ws.portfolios.join("Growth.csv")),
            "Growth\nAAPL,9.0\nDELISTED,3.0\n"
        );

        let mut session = session(&ws);
        session
            .execute(Command::Value {
                name: "Growth".into(),
                date: date(2021, 1, 1),
            })
            .unwrap();
        assert_eq!(
            session.registry().value("Growth", date(2021, 1, 1)).unwrap(),
            900.0
        );

        // buying a symbol with no quotes is still refused
        assert_eq!(
            run(&ws, &["buy", "Growth", "DELISTED", "1", "--date", "2021-01-01"]),
            ExitCode::from(5)
        );
    }

    #[test]
    fn performance_reversed_range_fails() {
        let ws = workspace();
        run(&ws, &["create", "Growth"]);
        assert_eq!(
            run(&ws, &[
                "performance", "Growth", "--start", "2021-01-04", "--end", "2021-01-01"
            ]),
            ExitCode::from(3)
        );
    }
}

mod symbol_queries {
    use super::*;

    #[test]
    fn gain_loss_recorded_dates() {
        let ws = workspace();
        assert_eq!(
            run(&ws, &["gain-loss", "AAPL", "--start", "2021-01-01", "--end", "2021-01-04"]),
            ExitCode::SUCCESS
        );
    }

    #[test]
    fn gain_loss_missing_date() {
        let ws = workspace();
        assert_eq!(
            run(&ws, &["gain-loss", "AAPL", "--start", "2021-01-01", "--end", "2021-01-05"]),
            ExitCode::from(5)
        );
    }

    #[test]
    fn moving_average_and_crossovers() {
        let ws = workspace();
        assert_eq!(
            run(&ws, &["moving-average", "AAPL", "--date", "2021-01-02"]),
            ExitCode::SUCCESS
        );
        assert_eq!(
            run(&ws, &["moving-average", "AAPL", "--date", "2021-01-02", "--days", "0"]),
            ExitCode::from(3)
        );
        assert_eq!(
            run(&ws, &[
                "crossovers", "AAPL", "--start", "2021-01-01", "--end", "2021-01-04"
            ]),
            ExitCode::SUCCESS
        );
    }

    #[test]
    fn list_saved_portfolios() {
        let ws = workspace();
        assert_eq!(run(&ws, &["list"]), ExitCode::SUCCESS);
        run(&ws, &["create", "Alpha"]);
        run(&ws, &["create", "Beta"]);
        assert_eq!(run(&ws, &["list"]), ExitCode::SUCCESS);
    }
}
