//! Plain-text portfolio files.
//!
//! ```text
//! <portfolio name>
//! <symbol>,<quantity>
//! <symbol>,<quantity>
//! ```
//!
//! Every line ends in `\n`. Quantities use the shortest decimal form that
//! round-trips exactly, so fractional shares survive a save/load cycle.
//! Prices are never written; a loaded portfolio has no series bound.

use crate::domain::error::StockfolioError;
use crate::domain::portfolio::Portfolio;
use crate::domain::registry::validate_name;
use crate::ports::portfolio_store_port::PortfolioStore;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const FILE_EXTENSION: &str = "csv";

pub fn write_portfolio<W: Write>(portfolio: &Portfolio, out: W) -> Result<(), StockfolioError> {
    let mut out = BufWriter::new(out);
    writeln!(out, "{}", portfolio.name())?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);
    // date is irrelevant: composition is the current state
    for (symbol, quantity) in portfolio.composition(chrono::NaiveDate::MIN) {
        let quantity = format!("{:?}", quantity);
        wtr.write_record([symbol.as_str(), quantity.as_str()])
            .map_err(|e| StockfolioError::Io(std::io::Error::other(e)))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_portfolio<R: Read>(input: R) -> Result<Portfolio, StockfolioError> {
    let mut reader = BufReader::new(input);

    let mut name = String::new();
    if reader.read_line(&mut name)? == 0 {
        return Err(StockfolioError::Parse {
            line: 1,
            reason: "missing portfolio name".to_string(),
        });
    }
    let name = name.trim_end_matches(['\n', '\r']).to_string();
    validate_name(&name).map_err(|e| StockfolioError::Parse {
        line: 1,
        reason: e.to_string(),
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut quantities = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| StockfolioError::Parse {
            line: e.position().map_or(0, |p| p.line() as usize + 1),
            reason: e.to_string(),
        })?;
        // csv counts lines from after the name line
        let line = record.position().map_or(0, |p| p.line() as usize + 1);
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() != 2 {
            return Err(StockfolioError::Parse {
                line,
                reason: format!("expected SYMBOL,QUANTITY, got {} fields", record.len()),
            });
        }
        let symbol = &record[0];
        if symbol.is_empty() {
            return Err(StockfolioError::Parse {
                line,
                reason: "empty symbol".to_string(),
            });
        }
        let quantity = record[1]
            .parse::<f64>()
            .ok()
            .filter(|q| q.is_finite() && *q > 0.0)
            .ok_or_else(|| StockfolioError::Parse {
                line,
                reason: format!("invalid quantity for {}: {:?}", symbol, &record[1]),
            })?;
        quantities.push((symbol.to_string(), quantity));
    }

    Ok(Portfolio::restore(name, quantities))
}

/// Overwrites `path` with the portfolio's holdings.
pub fn save_to_file<P: AsRef<Path>>(portfolio: &Portfolio, path: P) -> Result<(), StockfolioError> {
    let file = File::create(path.as_ref())?;
    write_portfolio(portfolio, file)
}

pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Portfolio, StockfolioError> {
    let file = File::open(path.as_ref())?;
    read_portfolio(file)
}

/// Stores each portfolio as `<dir>/<name>.csv`.
pub struct FilePortfolioStore {
    dir: PathBuf,
}

impl FilePortfolioStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, FILE_EXTENSION))
    }
}

impl PortfolioStore for FilePortfolioStore {
    fn save(&self, portfolio: &Portfolio) -> Result<(), StockfolioError> {
        fs::create_dir_all(&self.dir)?;
        save_to_file(portfolio, self.path_for(portfolio.name()))
    }

    fn load(&self, name: &str) -> Result<Portfolio, StockfolioError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(StockfolioError::not_found(
                crate::domain::error::LookupKind::Portfolio,
                name,
            ));
        }
        load_from_file(path)
    }

    fn list(&self) -> Result<Vec<String>, StockfolioError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == FILE_EXTENSION) {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
