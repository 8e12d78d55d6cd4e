/////////////////////////////////////////////////////////////////////////////////////
//
// Contagion model
//
// stats module
//
// calculates statistics and writes them out
//
////////////////////////////////////////////////////////////////////////////////////
use super::error::ContagionError;
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::path::Path;

// raw counts pulled from the graph
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Counts {
    pub population: usize,
    pub cases: usize,
    pub sick_cases: usize,
    pub recoveries: usize,
    pub infected: usize,
    pub sick: usize,
    pub dead: usize,
}

// Point-in-time statistics for a population.
// Cumulative values (`cases`, `sick_cases`, `recoveries`) are running totals.
// Current values (`infected`, `sick`, `healthy`, `dead`) come from each person's state.
// Percentages run from 0 to 100. Cases and the current states are relative to the
// population, sick cases, recoveries and deaths to the number of cases.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub population: usize,
    pub cases: usize,
    pub sick_cases: usize,
    pub infected: usize,
    pub sick: usize,
    pub healthy: usize,
    pub recoveries: usize,
    pub dead: usize,
    pub cases_pct: f64,
    pub sick_cases_pct: f64,
    pub infected_pct: f64,
    pub sick_pct: f64,
    pub healthy_pct: f64,
    pub recoveries_pct: f64,
    pub dead_pct: f64,
}

impl StatisticsSnapshot {
    pub fn from_counts(counts: Counts) -> StatisticsSnapshot {
        let healthy = counts
            .population
            .saturating_sub(counts.infected + counts.sick + counts.dead);

        let mut snapshot = StatisticsSnapshot {
            population: counts.population,
            cases: counts.cases,
            sick_cases: counts.sick_cases,
            infected: counts.infected,
            sick: counts.sick,
            healthy,
            recoveries: counts.recoveries,
            dead: counts.dead,
            cases_pct: 0.0,
            sick_cases_pct: 0.0,
            infected_pct: 0.0,
            sick_pct: 0.0,
            healthy_pct: 100.0,
            recoveries_pct: 0.0,
            dead_pct: 0.0,
        };

        // nobody was ever infected - everyone is healthy
        if counts.cases == 0 || counts.population == 0 {
            return snapshot;
        }

        snapshot.cases_pct = percent(counts.cases, counts.population);
        snapshot.sick_cases_pct = percent(counts.sick_cases, counts.cases);
        snapshot.infected_pct = percent(counts.infected, counts.population);
        snapshot.sick_pct = percent(counts.sick, counts.population);
        snapshot.healthy_pct = percent(healthy, counts.population);
        snapshot.recoveries_pct = percent(counts.recoveries, counts.cases);
        snapshot.dead_pct = percent(counts.dead, counts.cases);
        snapshot
    }

    // label, count, percentage, base for each report line
    fn report_lines(&self) -> [(&'static str, usize, f64, &'static str); 7] {
        const POP: &str = "of the Population.";
        const CASES: &str = "of Total Number of Cases Recorded.";
        [
            ("Total number of cases recorded", self.cases, self.cases_pct, POP),
            ("Total sick cases recorded", self.sick_cases, self.sick_cases_pct, CASES),
            ("Current Number Infected but not Sick", self.infected, self.infected_pct, POP),
            ("Current Number Sick", self.sick, self.sick_pct, POP),
            ("Current Healthy Persons", self.healthy, self.healthy_pct, POP),
            ("Total number of Recoveries", self.recoveries, self.recoveries_pct, CASES),
            ("Number of Deaths", self.dead, self.dead_pct, CASES),
        ]
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    part as f64 / whole as f64 * 100.0
}

// the console report
impl fmt::Display for StatisticsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "*******************************Statistics for the spread of the disease in the population*******************************"
        )?;
        writeln!(
            f,
            "{:>58} {}",
            "Total number of Persons:", self.population
        )?;
        for (label, count, pct, base) in self.report_lines().iter() {
            writeln!(f, "{:>40} {:>10} {:10} {:6.4} % {}", label, count, "", pct, base)?;
        }
        Ok(())
    }
}

// one csv row per simulation step
#[derive(Debug, Serialize)]
struct StepRecord<'a> {
    scenario: &'a str,
    step: usize,
    population: usize,
    cases: usize,
    sick_cases: usize,
    infected: usize,
    sick: usize,
    healthy: usize,
    recoveries: usize,
    dead: usize,
    cases_pct: f64,
    sick_cases_pct: f64,
    infected_pct: f64,
    sick_pct: f64,
    healthy_pct: f64,
    recoveries_pct: f64,
    dead_pct: f64,
}

// Per-step statistics written to a csv file
pub struct StatsLog {
    scenario: String,
    writer: Writer<File>,
}

impl StatsLog {
    pub fn new(file_path: &Path, scenario: &str) -> Result<StatsLog, ContagionError> {
        let writer = WriterBuilder::new().has_headers(true).from_path(file_path)?;
        Ok(StatsLog {
            scenario: String::from(scenario),
            writer,
        })
    }

    pub fn append(&mut self, step: usize, s: &StatisticsSnapshot) -> Result<(), ContagionError> {
        self.writer.serialize(StepRecord {
            scenario: &self.scenario,
            step,
            population: s.population,
            cases: s.cases,
            sick_cases: s.sick_cases,
            infected: s.infected,
            sick: s.sick,
            healthy: s.healthy,
            recoveries: s.recoveries,
            dead: s.dead,
            cases_pct: s.cases_pct,
            sick_cases_pct: s.sick_cases_pct,
            infected_pct: s.infected_pct,
            sick_pct: s.sick_pct,
            healthy_pct: s.healthy_pct,
            recoveries_pct: s.recoveries_pct,
            dead_pct: s.dead_pct,
        })?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ContagionError> {
        self.writer.flush()?;
        Ok(())
    }
}
