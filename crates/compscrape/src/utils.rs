use crate::scraper::PageOutcome;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScrapeStats {
    pub attempted: usize,
    pub emitted: usize,
    pub failed: usize,
    pub unnamed: usize,
}

impl ScrapeStats {
    pub fn record(&mut self, outcome: &PageOutcome) {
        self.attempted += 1;
        match &outcome.result {
            Ok(record) => {
                self.emitted += 1;
                if !record.has_name() {
                    self.unnamed += 1;
                }
            }
            Err(_) => self.failed += 1,
        }
    }

    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a PageOutcome>) -> Self {
        let mut stats = Self::default();
        for outcome in outcomes {
            stats.record(outcome);
        }
        stats
    }
}

impl std::fmt::Display for ScrapeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        writeln!(f, "  Pages attempted:        {}", self.attempted)?;
        writeln!(f, "  Records emitted:        {}", self.emitted)?;
        writeln!(f, "  Failed pages:           {}", self.failed)?;
        writeln!(f, "  Records without a name: {}", self.unnamed)
    }
}
