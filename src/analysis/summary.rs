//! analysis::summary — response counts per presented design.
//!
//! Groups a trial history by design value and reports how often each level
//! was judged clear. This is the empirical psychometric curve a host plots
//! next to the fitted one.
use crate::ado::history::TrialHistory;

/// Aggregated responses at one design value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DesignSummary {
    pub design: f64,
    pub n_trials: usize,
    pub n_clear: usize,
    pub proportion_clear: f64,
}

/// One [`DesignSummary`] per distinct design, ascending by design.
///
/// Designs are grouped by exact value; the engine only presents values from
/// its candidate set, so no tolerance is needed. An empty history yields an
/// empty vector.
pub fn summarize_by_design(history: &TrialHistory) -> Vec<DesignSummary> {
    let mut pairs: Vec<(f64, bool)> =
        history.iter().map(|r| (r.design, r.response.is_clear())).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut out: Vec<DesignSummary> = Vec::new();
    for (design, clear) in pairs {
        match out.last_mut() {
            Some(last) if last.design == design => {
                last.n_trials += 1;
                last.n_clear += usize::from(clear);
            }
            _ => out.push(DesignSummary {
                design,
                n_trials: 1,
                n_clear: usize::from(clear),
                proportion_clear: 0.0,
            }),
        }
    }
    for s in &mut out {
        s.proportion_clear = s.n_clear as f64 / s.n_trials as f64;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ado::response::Response::{Clear, NotClear};

    #[test]
    // Purpose
    // -------
    // Trials at the same design are pooled and the output is sorted.
    //
    // Given
    // -----
    // Designs 70, 40, 70, 55, 40 with mixed responses.
    //
    // Expect
    // ------
    // Three rows (40, 55, 70) with the right counts and proportions.
    fn groups_and_sorts_by_design() {
        let history = TrialHistory::from_pairs([
            (70.0, Clear),
            (40.0, NotClear),
            (70.0, NotClear),
            (55.0, Clear),
            (40.0, NotClear),
        ]);
        let rows = summarize_by_design(&history);
        let designs: Vec<f64> = rows.iter().map(|r| r.design).collect();
        assert_eq!(designs, vec![40.0, 55.0, 70.0]);
        assert_eq!((rows[0].n_trials, rows[0].n_clear), (2, 0));
        assert_eq!(rows[1].proportion_clear, 1.0);
        assert_eq!(rows[2].proportion_clear, 0.5);
    }

    #[test]
    fn empty_history_gives_no_rows() {
        assert!(summarize_by_design(&TrialHistory::new()).is_empty());
    }
}
