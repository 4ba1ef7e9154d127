//! Shared data pipeline used by both the CLI and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch/load (cached) -> merge/validate -> chart
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::chart::{Chart, ChartData, build_chart};
use crate::config::Config;
use crate::data::{TracClient, TtlCache, sw_border_encounters};
use crate::domain::{ChartSelection, DetentionRow, MonthlySeries};
use crate::error::AppError;

/// Owns the sources and their caches for one process.
pub struct Dashboard {
    config: Config,
    trac: TracClient,
    detentions: TtlCache<Vec<DetentionRow>>,
    encounters: TtlCache<MonthlySeries>,
}

impl Dashboard {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let trac = TracClient::new(&config)?;
        Ok(Self {
            detentions: TtlCache::new(config.detentions_ttl),
            encounters: TtlCache::new(config.encounters_ttl),
            trac,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn detentions_url(&self) -> &str {
        self.trac.url()
    }

    /// Raw detention table, refetched when older than the detentions TTL.
    pub fn detentions(&mut self) -> Result<&[DetentionRow], AppError> {
        let trac = &self.trac;
        self.detentions
            .get_or_refresh(|| trac.fetch_detentions())
            .map(Vec::as_slice)
    }

    /// Merged Southwest Land Border series, reloaded when older than its TTL.
    pub fn encounters(&mut self) -> Result<&MonthlySeries, AppError> {
        let config = &self.config;
        self.encounters.get_or_refresh(|| sw_border_encounters(config))
    }

    pub fn chart(&mut self, selection: ChartSelection) -> Result<Chart, AppError> {
        build_chart(selection, self)
    }

    /// Drop cached data so the next access goes back to the sources.
    pub fn invalidate(&mut self) {
        self.detentions.invalidate();
        self.encounters.invalidate();
    }
}

impl ChartData for Dashboard {
    fn detentions(&mut self) -> Result<&[DetentionRow], AppError> {
        Dashboard::detentions(self)
    }

    fn encounters(&mut self) -> Result<&MonthlySeries, AppError> {
        Dashboard::encounters(self)
    }
}
