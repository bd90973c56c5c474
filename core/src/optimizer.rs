//! Black-box selection: snaps continuous coordinates to interpretation
//! indices, scores the rule ensemble, and normalizes into `[0,1]`.

use crate::parser::Interpretation;
use crate::rules::{RuleInfo, WordMatch};
use crate::weights::Weights;

/// The final scored result of a parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub score: f64,
    pub matched: Vec<WordMatch>,
}

/// Narrow interface over a derivative-free global optimizer, so the
/// reference algorithm can be swapped for another without touching
/// [`optimize`]. Mirrors the reference implementation's
/// `minimize(f, bounds) -> (success, x*, f*)` contract.
pub trait Minimizer: Send + Sync {
    fn minimize(&self, f: &dyn Fn(&[f64]) -> f64, bounds: &[(f64, f64)]) -> (bool, Vec<f64>, f64);
}

/// A deterministic derivative-free minimizer: integer-exact coordinate
/// descent over each interpretation's nomination indices, followed by a
/// shrinking-step local search for sub-integer tie-breaking.
///
/// Integer coordinates are exact here because `objective`'s fractional
/// penalty already makes every integer snap a local minimum candidate; a
/// full simplicial-homology search (as the reference implementation
/// uses) buys nothing extra for a score surface built this way.
pub struct PatternSearchMinimizer {
    pub max_sweeps: usize,
    pub min_step: f64,
}

impl Default for PatternSearchMinimizer {
    fn default() -> Self {
        PatternSearchMinimizer { max_sweeps: 8, min_step: 1e-3 }
    }
}

impl Minimizer for PatternSearchMinimizer {
    fn minimize(&self, f: &dyn Fn(&[f64]) -> f64, bounds: &[(f64, f64)]) -> (bool, Vec<f64>, f64) {
        if bounds.is_empty() {
            return (true, Vec::new(), f(&[]));
        }

        let mut x: Vec<f64> = bounds.iter().map(|(lo, _)| lo.max(0.0)).collect();
        let mut best = f(&x);

        for _ in 0..self.max_sweeps {
            let mut improved = false;

            for i in 0..x.len() {
                let (lo, hi) = bounds[i];
                let max_candidate = hi.floor().max(0.0) as i64;

                for candidate in 0..=max_candidate {
                    let candidate = candidate as f64;
                    if candidate < lo || candidate > hi {
                        continue;
                    }

                    let mut trial = x.clone();
                    trial[i] = candidate;
                    let score = f(&trial);

                    if score < best {
                        best = score;
                        x[i] = candidate;
                        improved = true;
                    }
                }
            }

            if !improved {
                break;
            }
        }

        let mut step = 0.5;
        while step > self.min_step {
            for i in 0..x.len() {
                let (lo, hi) = bounds[i];

                for delta in [-step, step] {
                    let candidate = (x[i] + delta).clamp(lo, hi);
                    let mut trial = x.clone();
                    trial[i] = candidate;
                    let score = f(&trial);

                    if score < best {
                        best = score;
                        x[i] = candidate;
                    }
                }
            }

            step /= 2.0;
        }

        (true, x, best)
    }
}

fn snap(x: &[f64], interpretations: &[Interpretation]) -> Vec<WordMatch> {
    let mut selection = Vec::new();

    for (xi, interpretation) in x.iter().zip(interpretations) {
        let xi = if *xi < 0.0 { 0.0 } else { *xi };
        let n = interpretation.nominations.len();
        let index = xi.floor() as usize;

        if index >= n {
            selection.push(WordMatch::NoMatch);
        } else {
            selection.extend(interpretation.nominations[index].iter().cloned());
        }
    }

    selection
}

fn rule_ensemble_score(selection: &[WordMatch], rules: &[RuleInfo], weights: &Weights) -> f64 {
    rules
        .iter()
        .map(|rule_info| {
            let s = rule_info.rule.evaluate(selection).unwrap_or(weights.rule_miss_penalty);
            (s * rule_info.weight).powi(2)
        })
        .sum::<f64>()
        .sqrt()
}

fn objective(x: &[f64], interpretations: &[Interpretation], rules: &[RuleInfo], weights: &Weights) -> f64 {
    let selection = snap(x, interpretations);
    let ensemble = rule_ensemble_score(&selection, rules, weights);

    let fractional_penalty = x
        .iter()
        .map(|xi| {
            let frac = xi - xi.floor();
            frac * frac
        })
        .sum::<f64>()
        .sqrt();

    ensemble + fractional_penalty
}

/// Selects, for each interpretation, one nomination index minimizing the
/// rule-ensemble objective, and assembles the final [`Match`].
pub fn optimize(
    interpretations: &[Interpretation],
    rules: &[RuleInfo],
    weights: &Weights,
    minimizer: &dyn Minimizer,
) -> Match {
    let bounds: Vec<(f64, f64)> = interpretations
        .iter()
        .map(|i| (-0.1, i.nominations.len() as f64 + 1.0))
        .collect();

    let objective_fn = |x: &[f64]| objective(x, interpretations, rules, weights);
    let (ok, x_star, f_star) = minimizer.minimize(&objective_fn, &bounds);

    if !ok {
        tracing::debug!("minimizer reported failure, falling back to zero-score match");
        return Match {
            score: 0.0,
            matched: vec![WordMatch::NoMatch; interpretations.len()],
        };
    }

    let max_score = rules.iter().map(|r| r.weight * r.weight).sum::<f64>().sqrt();
    let score = if max_score > 0.0 {
        ((max_score - f_star) / max_score).max(0.0)
    } else {
        0.0
    };

    tracing::debug!(f_star, score, "optimized selection");

    Match { score, matched: snap(&x_star, interpretations) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bounds_minimize_trivially() {
        let minimizer = PatternSearchMinimizer::default();
        let (ok, x, f) = minimizer.minimize(&|_| 0.0, &[]);
        assert!(ok);
        assert!(x.is_empty());
        assert_eq!(f, 0.0);
    }

    #[test]
    fn minimizer_finds_known_integer_optimum() {
        let minimizer = PatternSearchMinimizer::default();
        // f is minimized at x0=2 among {0,1,2,3}; fractional penalty keeps
        // integers as local minima.
        let f = |x: &[f64]| {
            let snapped = x[0].max(0.0).floor();
            (snapped - 2.0).abs() + (x[0] - x[0].floor()).abs()
        };
        let (ok, x, _) = minimizer.minimize(&f, &[(-0.1, 4.0)]);
        assert!(ok);
        assert_eq!(x[0].floor(), 2.0);
    }

    #[test]
    fn optimize_on_no_interpretations_yields_empty_match() {
        let weights = Weights::default();
        let rules: Vec<RuleInfo> = vec![];
        let minimizer = PatternSearchMinimizer::default();
        let result = optimize(&[], &rules, &weights, &minimizer);
        assert_eq!(result.matched.len(), 0);
    }

    #[test]
    fn optimize_produces_score_in_unit_range() {
        let interpretation = Interpretation { token: 0, nominations: vec![] };
        let weights = Weights::default();
        let rules = vec![RuleInfo::new("max_match", 1.0, Box::new(crate::rules::MaximizeMatch))];
        let minimizer = PatternSearchMinimizer::default();
        let result = optimize(&[interpretation], &rules, &weights, &minimizer);
        assert!((0.0..=1.0).contains(&result.score));
        assert_eq!(result.matched.len(), 1);
    }
}
