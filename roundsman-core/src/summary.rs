//! Human-readable solution summary.

use std::fmt;

use crate::{Solution, SolveStatus, format_clock};

/// Display adaptor printing fleet totals and one line per used vehicle.
///
/// # Examples
///
/// ```
/// use roundsman_core::{Diagnostics, Solution, SolutionSummary};
///
/// let solution = Solution::no_data(Diagnostics::default());
/// assert_eq!(SolutionSummary::new(&solution).to_string(), "Status: NO_DATA\n");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SolutionSummary<'a> {
    solution: &'a Solution,
}

impl<'a> SolutionSummary<'a> {
    /// Summarise `solution`.
    #[must_use]
    pub const fn new(solution: &'a Solution) -> Self {
        Self { solution }
    }
}

impl fmt::Display for SolutionSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let solution = self.solution;
        if solution.status != SolveStatus::Ok {
            return writeln!(f, "Status: {}", solution.status);
        }
        let served: usize = solution.routes.iter().map(crate::Route::customer_count).sum();
        writeln!(f, "=== VRPTW SUMMARY ===")?;
        writeln!(f, "Vehicles used: {}", solution.vehicles_used)?;
        writeln!(f, "Total clients served: {served}")?;
        writeln!(
            f,
            "Avg stops/vehicle: {:.1}",
            ratio(served, solution.vehicles_used)
        )?;
        writeln!(
            f,
            "Total travel distance (km): {:.1}",
            solution.total_distance_km
        )?;
        writeln!(
            f,
            "Total time (h): {:.2}",
            hours(solution.total_time_secs)
        )?;
        for route in &solution.routes {
            let mut customers = route.customers();
            let first = customers.next().map(|stop| stop.arrival_secs);
            let last = customers.last().map(|stop| stop.arrival_secs).or(first);
            writeln!(
                f,
                " V{:02}: {} stops, start {}, first {}, last {}, return {}",
                route.vehicle,
                route.customer_count(),
                clock(route.departure_secs()),
                clock(first),
                clock(last),
                clock(route.return_secs()),
            )?;
        }
        Ok(())
    }
}

fn clock(secs: Option<i64>) -> String {
    secs.map_or_else(|| "--:--".to_owned(), format_clock)
}

fn ratio(served: usize, vehicles: usize) -> f64 {
    if vehicles == 0 {
        0.0
    } else {
        served as f64 / vehicles as f64
    }
}

fn hours(secs: i64) -> f64 {
    secs as f64 / 3_600.0
}
