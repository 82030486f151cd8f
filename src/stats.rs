//! Statistical tests used by cuts

use crate::numeric::{reals, Float};

/// Relative tolerance used when comparing probabilities of outcomes, so that
/// outcomes which are exactly as likely as the observed one are not lost to
/// rounding errors
const RELATIVE_TOLERANCE: Float = 1. + 1e-7;

/// Largest number of trials [`binom_test`] accepts
///
/// The test tabulates the whole distribution, so its cost grows linearly with
/// the number of trials. S1 signals never get anywhere close to this.
///
pub const MAX_TRIALS: u64 = 1 << 24;

/// Exact two-sided binomial test
///
/// Computes the probability, under the hypothesis that each of `trials`
/// independent trials succeeds with probability `p`, of an outcome that is at
/// most as likely as observing `successes` successes.
///
/// Returns NaN if the inputs do not make sense (`successes > trials`, `p`
/// outside of [0, 1], or more than [`MAX_TRIALS`] trials), and 1 when there
/// were no trials.
///
pub fn binom_test(successes: u64, trials: u64, p: Float) -> Float {
    if successes > trials || trials > MAX_TRIALS || !(0.0..=1.0).contains(&p) {
        return reals::NAN;
    }
    let (Ok(x), Ok(n)) = (usize::try_from(successes), usize::try_from(trials)) else {
        return reals::NAN;
    };
    if n == 0 {
        return 1.;
    }

    let pmf = binomial_pmf(n, p);
    let d = pmf[x] * RELATIVE_TOLERANCE;
    let mean = p * (n as Float);

    // Sum of probabilities over an inclusive range of outcomes
    let sum = |lo: usize, hi: usize| -> Float {
        if lo > hi {
            0.
        } else {
            pmf[lo..=hi].iter().sum()
        }
    };

    if (x as Float) == mean {
        return 1.;
    }
    let pvalue = if (x as Float) < mean {
        // Count the outcomes on the other side that are at most as likely
        let first = mean.ceil() as usize;
        let y = pmf[first..].iter().filter(|&&q| q <= d).count();
        sum(0, x) + sum(n + 1 - y, n)
    } else {
        let last = mean.floor() as usize;
        let y = pmf[..=last].iter().filter(|&&q| q <= d).count();
        // Outcomes 0..y are the unlikely ones on the lower side
        (if y > 0 { sum(0, y - 1) } else { 0. }) + sum(x, n)
    };
    pvalue.min(1.)
}

/// Probability of each number of successes among `n` trials
///
/// Computed in log space, so that large trial counts do not underflow the
/// intermediate binomial coefficients.
///
fn binomial_pmf(n: usize, p: Float) -> Vec<Float> {
    // Degenerate distributions
    if p == 0. || p == 1. {
        let mut pmf = vec![0.; n + 1];
        pmf[if p == 0. { 0 } else { n }] = 1.;
        return pmf;
    }

    let log_odds = p.ln() - (1. - p).ln();
    let mut log_pmf = (n as Float) * (1. - p).ln();
    let mut pmf = Vec::with_capacity(n + 1);
    pmf.push(log_pmf.exp());
    for k in 0..n {
        log_pmf += ((n - k) as Float).ln() - ((k + 1) as Float).ln() + log_odds;
        pmf.push(log_pmf.exp());
    }
    pmf
}
