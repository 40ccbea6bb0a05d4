//! Basic example of planning a collector's daily route.
//!
//! Run with: cargo run --example basic_route

use std::collections::HashSet;

use cobro_route::{
    format_duration, parse_start_point, plan_route, CostModel, Location, Region, RouteRequest,
    VisitKind, VisitRecord,
};

fn main() {
    let start = match parse_start_point("14.6349,-90.5069") {
        Ok(point) => point,
        Err(e) => {
            eprintln!("Invalid start point: {}", e);
            return;
        }
    };

    let guatemala = Region::new("GUATEMALA", "GUATEMALA");
    let mixco = Region::new("MIXCO", "GUATEMALA");

    // Zone 1 and Mixco clients, two of them never visited before
    let records = vec![
        VisitRecord::new("P-1001", "Ana", guatemala.clone(), Location::at(14.6420, -90.5130)),
        VisitRecord::new("P-1002", "Ana", guatemala.clone(), Location::at(14.6110, -90.5250)),
        VisitRecord::new("P-1003", "Ana", mixco.clone(), Location::at(14.6330, -90.6070))
            .with_visit_kind(VisitKind::Workplace),
        VisitRecord::new("P-1004", "Ana", mixco.clone(), Location::at(14.6290, -90.5900)),
        VisitRecord::new("P-1005", "Ana", guatemala, Location::NoPriorVisit),
        VisitRecord::new("P-1006", "Ana", mixco, Location::Unparseable),
        VisitRecord::new("P-1007", "Ana", Region::new("FLORES", "PETEN"), Location::NoPriorVisit),
    ];

    let request = RouteRequest::new("Ana", start).with_target_visits(8);
    let plan = plan_route(&request, &records, &HashSet::new(), CostModel::shared());

    println!("Route for {} from {:.4},{:.4}\n", plan.route.collector, start.latitude, start.longitude);
    println!("{:>3}  {:<8} {:<10} {:>8} {:>6} {:>10}", "#", "Loan", "Municipio", "km", "min", "Total km");

    for row in plan.route.rows() {
        println!(
            "{:>3}  {:<8} {:<10} {:>8.2} {:>6} {:>10.2}{}",
            row.position,
            row.loan_number,
            row.municipality.as_deref().unwrap_or("-"),
            row.distance_km,
            row.time_min,
            row.cumulative_distance_km,
            if row.located { "" } else { "  (no GPS)" }
        );
    }

    let summary = plan.route.summary();
    println!(
        "\n{} visits ({} located, {} without GPS), {:.2} km, {}",
        summary.visits,
        summary.located_visits,
        summary.unlocated_visits,
        summary.total_distance_km,
        format_duration(summary.total_time_min)
    );

    if plan.shortfall > 0 {
        println!("Warning: {} visits short of the requested {}", plan.shortfall, request.target_visits);
    }
}
