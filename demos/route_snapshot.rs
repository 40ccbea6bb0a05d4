//! Example of persisting a route snapshot and recording a visit afterwards.
//!
//! Run with: cargo run --example route_snapshot --features serde

use std::collections::HashSet;

use cobro_route::{
    plan_route, record_visit, CostModel, GpsPoint, Location, Region, RouteRequest, VisitKind,
    VisitRecord, VisitReport,
};

fn main() {
    let region = Region::new("VILLA NUEVA", "GUATEMALA");
    let mut records = vec![
        VisitRecord::new("P-2001", "Rosa", region.clone(), Location::at(14.5260, -90.5880)),
        VisitRecord::new("P-2002", "Rosa", region.clone(), Location::at(14.5190, -90.5950)),
        VisitRecord::new("P-2003", "Rosa", region, Location::NoPriorVisit),
    ];

    let request = RouteRequest::new("Rosa", GpsPoint::new(14.5300, -90.5800))
        .with_target_visits(3)
        .with_created_at(1_760_000_000);
    let plan = plan_route(&request, &records, &HashSet::new(), CostModel::shared());

    let snapshot = plan.route.snapshot();
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("Snapshot to persist:\n{}\n", json),
        Err(e) => eprintln!("Failed to serialize snapshot: {}", e),
    }

    // The collector reaches the first stop a little off the stored location
    let report = VisitReport {
        timestamp: 1_760_003_600,
        located: true,
        visit_kind: VisitKind::Domiciliary,
        actual_location: Some(GpsPoint::new(14.5264, -90.5875)),
        collector: "Rosa".to_string(),
    };

    let first_stop = snapshot.stops.first().map(|stop| stop.record_id.clone());
    if let Some(record) = records.iter_mut().find(|r| Some(&r.id) == first_stop.as_ref()) {
        match record_visit(record, report, CostModel::shared()) {
            Some(deviation) => println!("{} visited, {:.3} km from plan", record.id, deviation),
            None => println!("{} visited, no deviation available", record.id),
        }
    }

    // Everything in the snapshot is excluded from the next route
    let routed: HashSet<String> = snapshot.record_ids().map(str::to_string).collect();
    let next = plan_route(&request, &records, &routed, CostModel::shared());
    println!("Next route has {} stops", next.route.legs.len());
}
