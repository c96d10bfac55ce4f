//! Mutual fund and stock reference data
//!
//! These tables are populated out of band (a separate ingestion job); this
//! side only lists and searches them. Search result sizes are capped the
//! way the API consumers expect: 10 funds, 20 stocks.

use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::{MutualFund, StockCompany};

const FUND_SEARCH_LIMIT: u32 = 10;
const STOCK_SEARCH_LIMIT: u32 = 20;

const FUND_COLUMNS: &str = "scheme_code, name, full_name, current_nav, asset_class, \
     portfolio_role, is_etf, amc, scheme_type, scheme_subtype, option, plan, date";

impl Database {
    /// All mutual fund schemes, sorted by name.
    pub fn list_mutual_funds(&self) -> Result<Vec<MutualFund>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM mutual_fund_schemes ORDER BY name",
            FUND_COLUMNS
        ))?;
        let funds = stmt
            .query_map([], row_to_fund)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(funds)
    }

    /// Case-insensitive substring search on fund name or full name, with an
    /// optional ETF filter.
    pub fn search_mutual_funds(&self, query: &str, is_etf: Option<bool>) -> Result<Vec<MutualFund>> {
        let pattern = format!("%{}%", query.to_lowercase());

        let conn = self.conn()?;
        let mut sql = format!(
            "SELECT {} FROM mutual_fund_schemes
             WHERE (LOWER(name) LIKE ?1 OR LOWER(full_name) LIKE ?1)",
            FUND_COLUMNS
        );
        if is_etf.is_some() {
            sql.push_str(" AND is_etf = ?2");
        }
        sql.push_str(&format!(" ORDER BY name LIMIT {}", FUND_SEARCH_LIMIT));

        let mut stmt = conn.prepare(&sql)?;
        let funds = match is_etf {
            Some(etf) => stmt
                .query_map(params![pattern, etf as i64], row_to_fund)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => stmt
                .query_map(params![pattern], row_to_fund)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };
        Ok(funds)
    }

    pub fn upsert_mutual_fund(&self, fund: &MutualFund) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO mutual_fund_schemes ({})
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                FUND_COLUMNS
            ),
            params![
                fund.scheme_code,
                fund.name,
                fund.full_name,
                fund.current_nav,
                fund.asset_class,
                fund.portfolio_role,
                fund.is_etf,
                fund.amc,
                fund.scheme_type,
                fund.scheme_subtype,
                fund.option,
                fund.plan,
                fund.date,
            ],
        )?;
        Ok(())
    }

    /// All listed companies, sorted by name.
    pub fn list_stocks(&self) -> Result<Vec<StockCompany>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT symbol, company_name, listing_date, isin_number, exchange
             FROM stock_companies ORDER BY company_name",
        )?;
        let stocks = stmt
            .query_map([], row_to_stock)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(stocks)
    }

    /// Substring search on company name or symbol, with an optional
    /// exchange filter.
    pub fn search_stocks(&self, query: &str, exchange: Option<&str>) -> Result<Vec<StockCompany>> {
        let pattern = format!("%{}%", query.to_lowercase());

        let conn = self.conn()?;
        let mut sql = String::from(
            "SELECT symbol, company_name, listing_date, isin_number, exchange
             FROM stock_companies
             WHERE (LOWER(company_name) LIKE ?1 OR LOWER(symbol) LIKE ?1)",
        );
        if exchange.is_some() {
            sql.push_str(" AND exchange = ?2");
        }
        sql.push_str(&format!(" ORDER BY company_name LIMIT {}", STOCK_SEARCH_LIMIT));

        let mut stmt = conn.prepare(&sql)?;
        let stocks = match exchange {
            Some(ex) => stmt
                .query_map(params![pattern, ex], row_to_stock)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => stmt
                .query_map(params![pattern], row_to_stock)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };
        Ok(stocks)
    }

    pub fn upsert_stock(&self, stock: &StockCompany) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO stock_companies
                 (symbol, company_name, listing_date, isin_number, exchange)
             VALUES (?, ?, ?, ?, ?)",
            params![
                stock.symbol,
                stock.company_name,
                stock.listing_date,
                stock.isin_number,
                stock.exchange,
            ],
        )?;
        Ok(())
    }
}

fn row_to_fund(row: &rusqlite::Row<'_>) -> rusqlite::Result<MutualFund> {
    Ok(MutualFund {
        scheme_code: row.get(0)?,
        name: row.get(1)?,
        full_name: row.get(2)?,
        current_nav: row.get(3)?,
        asset_class: row.get(4)?,
        portfolio_role: row.get(5)?,
        is_etf: row.get(6)?,
        amc: row.get(7)?,
        scheme_type: row.get(8)?,
        scheme_subtype: row.get(9)?,
        option: row.get(10)?,
        plan: row.get(11)?,
        date: row.get(12)?,
    })
}

fn row_to_stock(row: &rusqlite::Row<'_>) -> rusqlite::Result<StockCompany> {
    Ok(StockCompany {
        symbol: row.get(0)?,
        company_name: row.get(1)?,
        listing_date: row.get(2)?,
        isin_number: row.get(3)?,
        exchange: row.get(4)?,
    })
}
