//! Session statistics
//!
//! Accumulated across sessions, finalized at stop time, persisted through
//! a StatisticsStore. Counts only ever increase until the store is
//! externally cleared.

use std::collections::BTreeMap;

/// Key used for the favorite-frequency map: the carrier rendered as text
pub fn frequency_key(carrier_hz: f32) -> String {
    format!("{carrier_hz}")
}

/// Lifetime listening statistics
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStatistics {
    pub total_sessions: u64,
    pub total_minutes: u64,
    /// Play count per carrier frequency
    pub favorite_frequencies: BTreeMap<String, u32>,
}

impl SessionStatistics {
    /// Fold a just-ended session into the totals
    pub fn record_session(&mut self, carrier_hz: f32, elapsed_ms: u64) {
        self.total_sessions += 1;
        self.total_minutes += elapsed_ms / 60_000;
        *self
            .favorite_frequencies
            .entry(frequency_key(carrier_hz))
            .or_insert(0) += 1;
    }

    /// Most-played frequencies, highest count first
    pub fn top_frequencies(&self, limit: usize) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> = self
            .favorite_frequencies
            .iter()
            .map(|(k, &v)| (k.as_str(), v))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(limit);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_session_accumulates() {
        let mut stats = SessionStatistics::default();
        stats.record_session(528.0, 125_000);
        stats.record_session(528.0, 30_000);
        stats.record_session(440.0, 61_000);

        assert_eq!(stats.total_sessions, 3);
        // 2 + 0 + 1 minutes, floored per session
        assert_eq!(stats.total_minutes, 3);
        assert_eq!(stats.favorite_frequencies.get("528"), Some(&2));
        assert_eq!(stats.favorite_frequencies.get("440"), Some(&1));
    }

    #[test]
    fn test_frequency_key_formatting() {
        assert_eq!(frequency_key(528.0), "528");
        assert_eq!(frequency_key(432.5), "432.5");
    }

    #[test]
    fn test_top_frequencies_ordering() {
        let mut stats = SessionStatistics::default();
        for _ in 0..3 {
            stats.record_session(528.0, 0);
        }
        stats.record_session(440.0, 0);
        for _ in 0..2 {
            stats.record_session(963.0, 0);
        }

        let top = stats.top_frequencies(2);
        assert_eq!(top, vec![("528", 3), ("963", 2)]);
    }
}
