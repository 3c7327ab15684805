//! Basic usage example for the doe-sqc library.
//!
//! Runs a small factorial study, fits a response surface on a central
//! composite design, then monitors a production series with control charts,
//! run rules, capability indices and an EWMA chart.

use doe_sqc::doe::{
    all_effects, anova, find_stationary_point, fit_second_order, optimize_desirability,
    DesirabilityGoal, GridConfig, ResponseGoal,
};
use doe_sqc::sqc::{
    detect_violations, ewma, i_mr, process_capability, xbar_r, EwmaConfig, IMrConfig, SpecLimits,
};
use doe_sqc::{CcdType, DesignBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("doe-sqc - Basic Usage Example\n");

    // 2² factorial: yield against temperature and time
    let design = DesignBuilder::new()
        .names(&["Temp", "Time"])
        .build()?
        .with_response("Yield", vec![28.0, 36.0, 18.0, 31.0])?;

    println!("Effects:");
    for effect in all_effects(&design, &[], "Yield")? {
        println!(
            "  #{} {:<10} effect = {:>7.3}",
            effect.rank, effect.name, effect.effect
        );
    }

    let table = anova(&design, &[], "Yield")?;
    println!("ANOVA (saturated: {}):", table.is_saturated());
    for entry in &table.entries {
        println!(
            "  {:<10} SS = {:>8.3}  {:>5.1}%",
            entry.source, entry.sum_of_squares, entry.contribution_percent
        );
    }
    println!();

    // Rotatable CCD with a quadratic response
    let ccd = DesignBuilder::new()
        .names(&["Temp", "Time"])
        .central_composite(CcdType::Circumscribed)
        .center_points(5)
        .build_ccd()?;
    println!(
        "CCD: {} runs, alpha = {:.4}",
        ccd.design.runs(),
        ccd.alpha
    );

    let y: Vec<f64> = ccd
        .design
        .data()
        .rows()
        .into_iter()
        .map(|r| 80.0 + 4.0 * r[0] + 2.0 * r[1] - 3.0 * r[0] * r[0] - 2.0 * r[1] * r[1])
        .collect();
    let design = ccd.design.with_response("Yield", y)?;

    let model = fit_second_order(&design, &["Temp", "Time"], "Yield")?;
    println!("Model: {}", model.equation);
    println!("R² = {:.4}", model.r_squared);

    let point = find_stationary_point(&model.coefficients)?;
    println!(
        "Stationary point: ({:.4}, {:.4}) -> {:.3} [{}]",
        point.x1, point.x2, point.predicted, point.kind
    );

    let goals = vec![ResponseGoal {
        model,
        goal: DesirabilityGoal::Maximize {
            lower: 70.0,
            target: 85.0,
        },
    }];
    let optimum = optimize_desirability(&goals, &GridConfig::default())?;
    println!(
        "Desirability optimum: ({:.3}, {:.3}) D = {:.4}",
        optimum.x1, optimum.x2, optimum.overall
    );
    println!();

    // Process monitoring
    let subgroups = vec![
        vec![10.1, 9.9, 10.0, 10.2, 9.8],
        vec![10.0, 10.3, 9.9, 10.1, 10.0],
        vec![9.8, 10.0, 10.2, 9.9, 10.1],
        vec![10.2, 10.1, 9.9, 10.0, 10.3],
    ];
    let chart = xbar_r(&subgroups)?;
    println!("X-bar: {}", chart.xbar.limits);
    println!("R:     {}", chart.range.limits);

    let series: Vec<f64> = subgroups.iter().flatten().copied().collect();
    let imr = i_mr(&series, &IMrConfig::default())?;
    let violations = detect_violations(&imr.individuals.values, &imr.individuals.limits)?;
    if violations.is_empty() {
        println!("✓ No Western Electric rule violations");
    } else {
        for v in &violations {
            println!("✗ {} at {:?}", v.rule, v.points);
        }
    }

    let spec = SpecLimits::new(11.0, 9.0)?.with_target(10.0);
    let report = process_capability(&series, &spec)?;
    println!(
        "Cp = {:.3}, Cpk = {:.3}, Cpm = {:.3}, DPMO = {:.1}",
        report.cp, report.cpk, report.cpm, report.dpmo
    );

    let config = EwmaConfig {
        target: 10.0,
        sigma: Some(imr.sigma_hat),
        ..EwmaConfig::default()
    };
    let monitor = ewma(&series, &config)?;
    println!("EWMA signals: {}", monitor.signals.len());

    Ok(())
}
