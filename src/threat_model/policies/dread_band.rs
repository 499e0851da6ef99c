use crate::threat_model::domain::DreadScores;

/// Severity band for DREAD scores: 1-3 low, 4-6 moderate, 7-10 high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DreadBand {
    Low,
    Moderate,
    High,
}

impl DreadBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            0..=3 => DreadBand::Low,
            4..=6 => DreadBand::Moderate,
            _ => DreadBand::High,
        }
    }

    /// Band for a whole score set, taken over the rounded mean.
    pub fn for_scores(scores: &DreadScores) -> Self {
        Self::for_score(scores.mean().round() as u8)
    }

    pub fn label(self) -> &'static str {
        match self {
            DreadBand::Low => "low",
            DreadBand::Moderate => "moderate",
            DreadBand::High => "high",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_thresholds() {
        assert_eq!(DreadBand::for_score(1), DreadBand::Low);
        assert_eq!(DreadBand::for_score(3), DreadBand::Low);
        assert_eq!(DreadBand::for_score(4), DreadBand::Moderate);
        assert_eq!(DreadBand::for_score(6), DreadBand::Moderate);
        assert_eq!(DreadBand::for_score(7), DreadBand::High);
        assert_eq!(DreadBand::for_score(10), DreadBand::High);
    }

    #[test]
    fn test_band_for_scores_uses_mean() {
        let scores = DreadScores::new(8, 8, 8, 8, 8).unwrap();
        assert_eq!(DreadBand::for_scores(&scores), DreadBand::High);
        let scores = DreadScores::new(2, 2, 2, 2, 2).unwrap();
        assert_eq!(DreadBand::for_scores(&scores), DreadBand::Low);
    }
}
