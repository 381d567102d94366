//! Fundamental evaluation engine

use equirank_core::{FundamentalAssessment, HealthStatus, StatementSnapshot};

/// Evaluate fundamentals from statement sequences
///
/// `quarterly` and `annual` are ordered descending by period end (latest
/// first). Returns `None` when no quarterly statement is available - a null
/// sub-score, not an error; downstream weighting renormalizes.
pub fn evaluate_fundamentals(
    quarterly: &[StatementSnapshot],
    annual: &[StatementSnapshot],
) -> Option<FundamentalAssessment> {
    let latest = quarterly.first()?;

    let quarterly_growth_yoy = yoy_growth(quarterly, 4);
    let annual_growth_yoy = yoy_growth(annual, 1);
    let profit_margin = latest.profit_margin();

    let equity = latest.net_worth();
    let net_worth_positive = equity > 0.0;
    let debt_to_equity = if net_worth_positive {
        Some(latest.total_liabilities / equity)
    } else {
        None
    };
    let is_profitable = latest.net_income > 0.0;

    let margin_declining = match (profit_margin, quarterly.get(1).and_then(|q| q.profit_margin()))
    {
        (Some(current), Some(prior)) => current < prior,
        _ => false,
    };

    let health_status = classify_health(
        net_worth_positive,
        debt_to_equity,
        margin_declining,
        latest.net_income,
    );

    let confidence = confidence_score(
        quarterly_growth_yoy,
        is_profitable,
        debt_to_equity,
        net_worth_positive,
        cash_return_signal(quarterly),
    );

    Some(FundamentalAssessment {
        quarterly_growth_yoy,
        annual_growth_yoy,
        profit_margin,
        debt_to_equity,
        is_profitable,
        net_worth_positive,
        health_status,
        confidence,
    })
}

/// Revenue growth vs the statement `lag` periods back, percent
///
/// `None` when the prior period is missing or reported zero revenue.
fn yoy_growth(statements: &[StatementSnapshot], lag: usize) -> Option<f64> {
    let current = statements.first()?;
    let prior = statements.get(lag)?;
    if prior.revenue == 0.0 {
        return None;
    }
    Some((current.revenue - prior.revenue) / prior.revenue.abs() * 100.0)
}

fn classify_health(
    net_worth_positive: bool,
    debt_to_equity: Option<f64>,
    margin_declining: bool,
    latest_net_income: f64,
) -> HealthStatus {
    if !net_worth_positive || debt_to_equity.is_some_and(|de| de > 2.5) {
        return HealthStatus::Distressed;
    }
    if debt_to_equity.is_some_and(|de| de > 2.0) || margin_declining || latest_net_income < 0.0 {
        return HealthStatus::Warning;
    }
    HealthStatus::Healthy
}

/// Positive operating income in each of the two most recent quarters
fn cash_return_signal(quarterly: &[StatementSnapshot]) -> bool {
    quarterly.len() >= 2 && quarterly[..2].iter().all(|q| q.operating_income > 0.0)
}

/// Bucketed confidence contributions, capped at 100
fn confidence_score(
    quarterly_growth_yoy: Option<f64>,
    is_profitable: bool,
    debt_to_equity: Option<f64>,
    net_worth_positive: bool,
    cash_return: bool,
) -> f64 {
    let mut score: f64 = 0.0;

    if let Some(growth) = quarterly_growth_yoy {
        if growth > 15.0 {
            score += 25.0;
        } else if growth > 5.0 {
            score += 15.0;
        } else if growth > 0.0 {
            score += 5.0;
        }
    }

    if is_profitable {
        score += 10.0;
    }

    if let Some(de) = debt_to_equity {
        if de < 0.5 {
            score += 15.0;
        } else if de < 1.0 {
            score += 8.0;
        }
    }

    if net_worth_positive {
        score += 5.0;
    }

    if cash_return {
        score += 10.0;
    }

    score.min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn statement(year: i32, month: u32, revenue: f64, net_income: f64) -> StatementSnapshot {
        StatementSnapshot {
            period_end: NaiveDate::from_ymd_opt(year, month, 28).unwrap(),
            revenue,
            net_income,
            total_assets: 1_000.0,
            total_liabilities: 400.0,
            operating_income: net_income * 1.2,
        }
    }

    fn five_quarters(latest_revenue: f64, prior_year_revenue: f64) -> Vec<StatementSnapshot> {
        vec![
            statement(2024, 3, latest_revenue, 50.0),
            statement(2023, 12, 110.0, 45.0),
            statement(2023, 9, 105.0, 40.0),
            statement(2023, 6, 102.0, 38.0),
            statement(2023, 3, prior_year_revenue, 35.0),
        ]
    }

    #[test]
    fn test_empty_quarterly_is_none() {
        assert!(evaluate_fundamentals(&[], &[]).is_none());
    }

    #[test]
    fn test_quarterly_yoy_growth() {
        let assessment = evaluate_fundamentals(&five_quarters(120.0, 100.0), &[]).unwrap();
        assert!((assessment.quarterly_growth_yoy.unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_prior_revenue_growth_is_none() {
        let assessment = evaluate_fundamentals(&five_quarters(120.0, 0.0), &[]).unwrap();
        assert!(assessment.quarterly_growth_yoy.is_none());
    }

    #[test]
    fn test_too_few_quarters_growth_is_none() {
        let quarters = vec![statement(2024, 3, 120.0, 50.0)];
        let assessment = evaluate_fundamentals(&quarters, &[]).unwrap();
        assert!(assessment.quarterly_growth_yoy.is_none());
    }

    #[test]
    fn test_distressed_on_negative_net_worth() {
        let mut quarters = five_quarters(120.0, 100.0);
        quarters[0].total_liabilities = 1_500.0;
        let assessment = evaluate_fundamentals(&quarters, &[]).unwrap();
        assert_eq!(assessment.health_status, HealthStatus::Distressed);
        assert!(!assessment.net_worth_positive);
        assert!(assessment.debt_to_equity.is_none());
    }

    #[test]
    fn test_distressed_on_high_leverage() {
        let mut quarters = five_quarters(120.0, 100.0);
        quarters[0].total_liabilities = 750.0; // equity 250, D/E 3.0
        let assessment = evaluate_fundamentals(&quarters, &[]).unwrap();
        assert_eq!(assessment.health_status, HealthStatus::Distressed);
    }

    #[test]
    fn test_warning_on_negative_quarter() {
        let mut quarters = five_quarters(120.0, 100.0);
        quarters[0].net_income = -10.0;
        let assessment = evaluate_fundamentals(&quarters, &[]).unwrap();
        assert_eq!(assessment.health_status, HealthStatus::Warning);
    }

    #[test]
    fn test_warning_on_declining_margin() {
        let mut quarters = five_quarters(120.0, 100.0);
        quarters[0].net_income = 10.0; // margin well below prior quarter
        quarters[0].operating_income = 12.0;
        let assessment = evaluate_fundamentals(&quarters, &[]).unwrap();
        assert_eq!(assessment.health_status, HealthStatus::Warning);
    }

    #[test]
    fn test_confidence_contributions() {
        // growth 20% (+25), profitable (+10), D/E 400/600 < 1.0 (+8),
        // positive net worth (+5), cash return (+10) = 58
        let assessment = evaluate_fundamentals(&five_quarters(120.0, 100.0), &[]).unwrap();
        assert!((assessment.confidence - 58.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_low_leverage_bucket() {
        let mut quarters = five_quarters(120.0, 100.0);
        for q in &mut quarters {
            q.total_liabilities = 100.0; // D/E 100/900 < 0.5
        }
        let assessment = evaluate_fundamentals(&quarters, &[]).unwrap();
        assert!((assessment.confidence - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_annual_growth() {
        let annual = vec![statement(2023, 12, 440.0, 160.0), statement(2022, 12, 400.0, 150.0)];
        let assessment = evaluate_fundamentals(&five_quarters(120.0, 100.0), &annual).unwrap();
        assert!((assessment.annual_growth_yoy.unwrap() - 10.0).abs() < 1e-9);
    }
}
