use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{BenchmarkConfig, BidderKind, PlayerKind};
use crate::tournament::MatchOutcome;

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in tournament results")]
    MissingBaseline(String),
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

/// Accumulates per-agent statistics across matches. Comparisons are paired
/// per match: every permutation of a match index replays the same deals,
/// so point differences against the baseline isolate the agents.
pub struct AnalyticsCollector {
    baseline: String,
    agents: HashMap<String, AgentAccumulator>,
    comparisons: HashMap<String, ComparisonAccumulator>,
    agent_order: Vec<String>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .metrics
            .baseline
            .clone()
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.name.clone(), agent.bidder, agent.player),
            );
            order.push(agent.name.clone());
        }

        Ok(Self {
            baseline,
            agents,
            comparisons: HashMap::new(),
            agent_order: order,
        })
    }

    pub fn record_match(&mut self, outcome: &MatchOutcome) -> Result<(), AnalyticsError> {
        let baseline_points = outcome
            .seat_results
            .iter()
            .find(|seat| seat.agent_name == self.baseline)
            .map(|seat| f64::from(seat.team_points))
            .ok_or_else(|| AnalyticsError::MissingBaseline(self.baseline.clone()))?;

        for seat in &outcome.seat_results {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;
            acc.record_match(
                seat.team_points,
                seat.win,
                seat.lone_bids,
                seat.lone_made,
                &seat.metrics,
            );
        }

        for seat in &outcome.seat_results {
            if seat.agent_name == self.baseline {
                continue;
            }
            let diff = f64::from(seat.team_points) - baseline_points;
            self.comparisons
                .entry(seat.agent_name.clone())
                .or_insert_with(ComparisonAccumulator::new)
                .record(diff);
        }

        Ok(())
    }

    pub fn finalize(mut self) -> Result<AnalyticsSummary, AnalyticsError> {
        let mut reports = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                reports.push(acc.into_report());
            }
        }

        let mut comparisons = Vec::new();
        for report in &reports {
            if report.name == self.baseline {
                comparisons.push(ComparisonReport {
                    agent: report.name.clone(),
                    p_value: 1.0,
                    sample_size: report.matches,
                });
                continue;
            }
            if let Some(comp) = self.comparisons.remove(&report.name) {
                let (p_value, sample_size) = comp.wilcoxon_signed_rank();
                comparisons.push(ComparisonReport {
                    agent: report.name.clone(),
                    p_value,
                    sample_size,
                });
            } else {
                comparisons.push(ComparisonReport {
                    agent: report.name.clone(),
                    p_value: 1.0,
                    sample_size: 0,
                });
            }
        }

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            agents: reports,
            comparisons,
        }
        .enrich())
    }
}

struct AgentAccumulator {
    name: String,
    bidder: BidderKind,
    player: PlayerKind,
    total_points: f64,
    matches: u32,
    wins: u32,
    lone_bids: u64,
    lone_made: u64,
    per_match_points: Vec<f64>,
    total_latency_ms: f64,
    total_decisions: u64,
}

impl AgentAccumulator {
    fn new(name: String, bidder: BidderKind, player: PlayerKind) -> Self {
        Self {
            name,
            bidder,
            player,
            total_points: 0.0,
            matches: 0,
            wins: 0,
            lone_bids: 0,
            lone_made: 0,
            per_match_points: Vec::new(),
            total_latency_ms: 0.0,
            total_decisions: 0,
        }
    }

    fn record_match(
        &mut self,
        points: i32,
        win: bool,
        lone_bids: usize,
        lone_made: usize,
        metrics: &crate::tournament::DecisionSummary,
    ) {
        self.total_points += f64::from(points);
        self.matches += 1;
        self.per_match_points.push(f64::from(points));
        if win {
            self.wins += 1;
        }
        self.lone_bids += lone_bids as u64;
        self.lone_made += lone_made as u64;
        self.total_latency_ms += metrics.total_ms;
        self.total_decisions += u64::from(metrics.decisions);
    }

    fn into_report(self) -> AgentReport {
        let avg_points = if self.matches == 0 {
            0.0
        } else {
            self.total_points / f64::from(self.matches)
        };

        let (ci_low, ci_high) = confidence_interval(&self.per_match_points);

        let avg_latency = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };

        AgentReport {
            name: self.name,
            bidder: self.bidder,
            player: self.player,
            matches: self.matches as usize,
            avg_points,
            ci95: (ci_low, ci_high),
            wins: self.wins as usize,
            lone_bids: self.lone_bids,
            lone_made: self.lone_made,
            average_ms_per_decision: avg_latency,
            delta_vs_baseline: 0.0, // Filled once the baseline report is known
        }
    }
}

#[derive(Clone)]
struct ComparisonAccumulator {
    diffs: Vec<f64>,
}

impl ComparisonAccumulator {
    fn new() -> Self {
        Self { diffs: Vec::new() }
    }

    fn record(&mut self, diff: f64) {
        self.diffs.push(diff);
    }

    fn wilcoxon_signed_rank(self) -> (f64, usize) {
        let diffs: Vec<f64> = self
            .diffs
            .into_iter()
            .filter(|d| d.abs() > f64::EPSILON)
            .collect();
        let n = diffs.len();
        if n == 0 {
            return (1.0, 0);
        }

        let mut paired: Vec<(f64, f64)> =
            diffs.into_iter().map(|d| (d.abs(), d.signum())).collect();
        paired.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        // Rank handling with ties
        let mut ranks = Vec::with_capacity(n);
        let mut tie_sizes = Vec::new();
        let mut i = 0;
        while i < paired.len() {
            let mut j = i;
            while j + 1 < paired.len() && (paired[j + 1].0 - paired[i].0).abs() < 1e-12 {
                j += 1;
            }
            let rank = (i + j + 2) as f64 / 2.0;
            for k in i..=j {
                ranks.push((rank, paired[k].1));
            }
            if j > i {
                tie_sizes.push(j - i + 1);
            }
            i = j + 1;
        }

        let w_plus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign > 0.0)
            .map(|(rank, _)| *rank)
            .sum();
        let w_minus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign < 0.0)
            .map(|(rank, _)| *rank)
            .sum();

        let w = w_plus.min(w_minus);
        let n_f = n as f64;
        let mean_w = n_f * (n_f + 1.0) / 4.0;

        // Variance with tie correction
        let tie_adjustment: f64 = tie_sizes
            .into_iter()
            .map(|count| {
                let c = count as f64;
                (c.powi(3) - c) / 48.0
            })
            .sum();
        let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
        if variance_w <= 0.0 {
            return (1.0, n);
        }

        let z = ((w - mean_w).abs() - 0.5) / variance_w.sqrt();
        let p = match Normal::new(0.0, 1.0) {
            Ok(normal) => 2.0 * (1.0 - normal.cdf(z)),
            Err(_) => 1.0,
        };
        (p.clamp(0.0, 1.0), n)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub agents: Vec<AgentReport>,
    pub comparisons: Vec<ComparisonReport>,
}

impl AnalyticsSummary {
    pub fn enrich(mut self) -> Self {
        let baseline_avg = self
            .agents
            .iter()
            .find(|agent| agent.name == self.baseline)
            .map(|agent| agent.avg_points)
            .unwrap_or(0.0);

        for agent in &mut self.agents {
            agent.delta_vs_baseline = agent.avg_points - baseline_avg;
        }

        self
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Tournament Summary\n\n");
        rows.push_str(&format!("Baseline agent: {}\n\n", self.baseline));
        rows.push_str("| Agent | Bidder | Player | Matches | Avg Points | Δ vs baseline | 95% CI | Win % | Lone Made | Avg ms/decision | p-value |\n");
        rows.push_str("|-------|--------|--------|---------|------------|----------------|--------|-------|-----------|------------------|---------|\n");

        for agent in &self.agents {
            let comparison = self
                .comparisons
                .iter()
                .find(|c| c.agent == agent.name)
                .map(|c| c.p_value)
                .unwrap_or(1.0);
            let win_rate = if agent.matches == 0 {
                0.0
            } else {
                agent.wins as f64 / agent.matches as f64
            };
            let lone_rate = if agent.lone_bids == 0 {
                0.0
            } else {
                agent.lone_made as f64 / agent.lone_bids as f64
            };

            rows.push_str(&format!(
                "| {name} | {bidder:?} | {player:?} | {matches} | {avg:.3} | {delta:+.3} | [{ci_low:.3}, {ci_high:.3}] | {win:.1}% | {lone_made}/{lone_bids} ({lone:.1}%) | {latency:.2} | {pval:.3} |\n",
                name = agent.name,
                bidder = agent.bidder,
                player = agent.player,
                matches = agent.matches,
                avg = agent.avg_points,
                delta = agent.delta_vs_baseline,
                ci_low = agent.ci95.0,
                ci_high = agent.ci95.1,
                win = win_rate * 100.0,
                lone_made = agent.lone_made,
                lone_bids = agent.lone_bids,
                lone = lone_rate * 100.0,
                latency = agent.average_ms_per_decision,
                pval = comparison,
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("delta_points.png");
        let baseline = self.baseline.clone();
        let agents_snapshot = self.agents.clone();

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let mut agents = agents_snapshot;
            agents.sort_by(|a, b| {
                a.delta_vs_baseline
                    .partial_cmp(&b.delta_vs_baseline)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let y_range_min = agents
                .iter()
                .map(|a| a.delta_vs_baseline)
                .fold(0.0f64, |acc, v| acc.min(v));
            let y_range_max = agents
                .iter()
                .map(|a| a.delta_vs_baseline)
                .fold(0.0f64, |acc, v| acc.max(v));
            let margin = ((y_range_max - y_range_min).abs() * 0.1).max(0.2);

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption(
                    "Points delta vs baseline (higher is better)",
                    ("sans-serif", 22),
                )
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 60)
                .build_cartesian_2d(
                    0..agents.len(),
                    (y_range_min - margin)..(y_range_max + margin),
                )
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("Δ points vs baseline")
                .x_desc("Agent")
                .x_label_formatter(&|idx| {
                    agents
                        .get(*idx)
                        .map(|agent| agent.name.clone())
                        .unwrap_or_default()
                })
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .draw_series(agents.iter().enumerate().map(|(idx, agent)| {
                    let color = if agent.name == baseline {
                        &BLUE
                    } else if agent.delta_vs_baseline >= 0.0 {
                        &GREEN
                    } else {
                        &RED
                    };
                    Rectangle::new(
                        [(idx, 0.0), (idx + 1, agent.delta_vs_baseline)],
                        color.filled(),
                    )
                }))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(chart);

            root.present()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub bidder: BidderKind,
    pub player: PlayerKind,
    pub matches: usize,
    pub avg_points: f64,
    pub ci95: (f64, f64),
    pub wins: usize,
    pub lone_bids: u64,
    pub lone_made: u64,
    pub average_ms_per_decision: f64,
    #[serde(skip)]
    pub delta_vs_baseline: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub p_value: f64,
    pub sample_size: usize,
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().sum::<f64>() / points.len() as f64;
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::{DecisionSummary, SeatResult, SeatSnapshot};
    use euchre_core::model::seat::{Seat, Team};

    fn config() -> BenchmarkConfig {
        let yaml = r#"
run_id: "analytics"
matches:
  seed: 1
  matches: 4
agents:
  - name: "random"
    bidder: "random"
    player: "random"
  - name: "tally"
    bidder: "tally"
    player: "boss"
  - name: "boss"
    bidder: "heuristic"
    player: "boss"
  - name: "inference"
    bidder: "heuristic"
    player: "inference"
outputs:
  jsonl: "out/matches.jsonl"
  summary_md: "out/summary.md"
  plots_dir: "out/plots"
metrics:
  baseline: "random"
"#;
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(yaml).expect("parse");
        cfg.validate().expect("valid");
        cfg
    }

    /// Agents sit in config order around the table, so "random" and "boss"
    /// share North-South while "tally" and "inference" share East-West.
    fn outcome(ns_points: i32, ew_points: i32) -> MatchOutcome {
        let names = ["random", "tally", "boss", "inference"];
        let seat_results = Seat::LOOP
            .iter()
            .enumerate()
            .map(|(i, seat)| {
                let team = seat.team();
                let (own, opp) = if team == Team::NorthSouth {
                    (ns_points, ew_points)
                } else {
                    (ew_points, ns_points)
                };
                SeatResult {
                    agent_name: names[i].to_string(),
                    seat: *seat,
                    team,
                    team_points: own,
                    opp_points: opp,
                    win: own > opp,
                    lone_bids: 1,
                    lone_made: usize::from(own > opp),
                    metrics: DecisionSummary {
                        decisions: 10,
                        avg_ms_per_decision: 0.5,
                        total_ms: 5.0,
                    },
                }
            })
            .collect();

        MatchOutcome {
            seating: names
                .iter()
                .zip(["north", "east", "south", "west"])
                .map(|(bot, seat)| SeatSnapshot {
                    seat: seat.to_string(),
                    bot: bot.to_string(),
                })
                .collect(),
            seat_results,
            hands_played: 12,
            terminated_early: false,
        }
    }

    #[test]
    fn deltas_are_relative_to_the_baseline() {
        let cfg = config();
        let mut collector = AnalyticsCollector::new(&cfg).expect("collector");
        collector.record_match(&outcome(20, 30)).expect("record");
        collector.record_match(&outcome(10, 20)).expect("record");

        let summary = collector.finalize().expect("finalize");
        let random = summary
            .agents
            .iter()
            .find(|a| a.name == "random")
            .expect("baseline report");
        let tally = summary
            .agents
            .iter()
            .find(|a| a.name == "tally")
            .expect("tally report");

        assert_eq!(random.matches, 2);
        assert!(random.delta_vs_baseline.abs() < f64::EPSILON);
        assert!((tally.delta_vs_baseline - 10.0).abs() < 1e-9);
        assert_eq!(tally.wins, 2);
        assert_eq!(random.wins, 0);
    }

    #[test]
    fn identical_results_give_no_signal() {
        let cfg = config();
        let mut collector = AnalyticsCollector::new(&cfg).expect("collector");
        for _ in 0..5 {
            collector.record_match(&outcome(15, 15)).expect("record");
        }
        let summary = collector.finalize().expect("finalize");
        let comparison = summary
            .comparisons
            .iter()
            .find(|c| c.agent == "tally")
            .expect("comparison present");
        assert_eq!(comparison.sample_size, 0);
        assert!((comparison.p_value - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn confidence_interval_collapses_for_single_sample() {
        assert_eq!(confidence_interval(&[4.0]), (4.0, 4.0));
        let (low, high) = confidence_interval(&[2.0, 4.0, 6.0]);
        assert!(low < 4.0 && high > 4.0);
    }
}
