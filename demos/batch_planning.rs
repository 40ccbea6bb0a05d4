//! Example of planning routes for many collectors at once.
//!
//! Run with: cargo run --example batch_planning --features parallel

use std::collections::HashSet;
use std::time::Instant;

use cobro_route::{
    plan_routes_batch, plan_routes_parallel, summarize_collectors, CostModel, GpsPoint, Location,
    Region, RouteRequest, VisitRecord,
};

const MUNICIPALITIES: &[(&str, &str)] = &[
    ("GUATEMALA", "GUATEMALA"),
    ("MIXCO", "GUATEMALA"),
    ("VILLA NUEVA", "GUATEMALA"),
    ("SAN MIGUEL PETAPA", "GUATEMALA"),
    ("ANTIGUA GUATEMALA", "SACATEPEQUEZ"),
];

fn main() {
    println!("Batch Route Planning Example\n");

    let collectors = ["Ana", "Luis", "Marta", "Pedro", "Rosa", "Sergio"];
    let mut records = Vec::new();

    // Spread 150 records per collector around the metro area; every tenth has no GPS
    for (c, collector) in collectors.iter().enumerate() {
        for i in 0..150 {
            let (municipality, department) = MUNICIPALITIES[(i + c) % MUNICIPALITIES.len()];
            let location = if i % 10 == 0 {
                Location::NoPriorVisit
            } else {
                Location::at(
                    14.55 + pseudo_random(c * 1000 + i) * 0.15,
                    -90.65 + pseudo_random(c * 2000 + i + 7) * 0.20,
                )
            };
            records.push(VisitRecord::new(
                &format!("{}-{}", collector, i),
                collector,
                Region::new(municipality, department),
                location,
            ));
        }
    }

    println!("Collectors:");
    for summary in summarize_collectors(&records) {
        println!(
            "  {}: {} records (D:{} L:{}), {} pending",
            summary.collector, summary.total, summary.domiciliary, summary.workplace, summary.pending
        );
    }

    let start = GpsPoint::new(14.6349, -90.5069);
    let requests: Vec<RouteRequest> = collectors
        .iter()
        .map(|name| RouteRequest::new(name, start).with_target_visits(40))
        .collect();

    let model = CostModel::shared();
    let routed = HashSet::new();

    let t = Instant::now();
    let sequential = plan_routes_batch(&requests, &records, &routed, model);
    println!("\nSequential: {} routes in {:?}", sequential.len(), t.elapsed());

    let t = Instant::now();
    let parallel = plan_routes_parallel(&requests, &records, &routed, model);
    println!("Parallel:   {} routes in {:?}", parallel.len(), t.elapsed());

    assert_eq!(sequential, parallel);

    println!();
    for plan in &parallel {
        let summary = plan.route.summary();
        println!(
            "  {}: {} stops ({} without GPS), {:.1} km, {} min",
            plan.route.collector,
            summary.visits,
            summary.unlocated_visits,
            summary.total_distance_km,
            summary.total_time_min
        );
    }
}

/// Deterministic value in [0, 1) so runs are reproducible.
fn pseudo_random(seed: usize) -> f64 {
    let x = (seed as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (x >> 11) as f64 / (1u64 << 53) as f64
}
