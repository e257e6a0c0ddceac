mod permutations;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use euchre_bot::{
    BossPlayer, HeuristicBidder, InferencePlayer, RandomBidder, RandomPlayer, TallyBidder,
};
use euchre_core::game::match_state::{EngineError, MatchState};
use euchre_core::model::bid::Bid;
use euchre_core::model::card::Card;
use euchre_core::model::hand::Hand;
use euchre_core::model::rules::Rules;
use euchre_core::model::seat::{Seat, Team};
use euchre_core::model::suit::Suit;
use euchre_core::model::trick::Trick;
use euchre_core::strategy::{BidContext, BidStrategy, HandStartView, PlayStrategy, Player};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, BidderKind, PlayerKind, ResolvedOutputs};

use permutations::SeatPermutations;

const MAX_SEAT_PERMUTATIONS: usize = 24;

/// Primary entry point for orchestrating tournaments.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    seat_permutations: SeatPermutations,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub matches_played: usize,
    pub permutations: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents: Vec<AgentBlueprint> = config
            .agents
            .iter()
            .map(|agent| AgentBlueprint {
                name: agent.name.clone(),
                bidder: agent.bidder,
                player: agent.player,
            })
            .collect();

        if agents.len() != 4 {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }

        if config.matches.permutations > MAX_SEAT_PERMUTATIONS {
            return Err(RunnerError::PermutationLimit {
                requested: config.matches.permutations,
                max: MAX_SEAT_PERMUTATIONS,
            });
        }

        let seat_permutations = SeatPermutations::new(config.matches.permutations);

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
            seat_permutations,
        })
    }

    /// Execute the tournament, streaming JSONL rows to disk. Every seat
    /// permutation of a given match index replays the same shuffle seed, so
    /// agent comparisons are paired on identical deals.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        if !self.outputs.plots_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.outputs.plots_dir)?;
        }

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let permutations = self.seat_permutations.as_slice();
        let mut rng = StdRng::seed_from_u64(self.config.matches.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;

        for match_index in 0..self.config.matches.matches {
            let base_seed = rng.next_u64();

            for (perm_index, perm) in permutations.iter().enumerate() {
                let outcome = self.play_match(match_index, perm_index, base_seed, perm)?;
                analytics.record_match(&outcome)?;
                rows_written += write_match_rows(
                    &mut writer,
                    &self.config,
                    match_index,
                    perm_index,
                    base_seed,
                    &outcome,
                )?;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match summary.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                eprintln!("WARN: {}", err);
                None
            }
        };

        Ok(RunSummary {
            matches_played: self.config.matches.matches,
            permutations: permutations.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
        })
    }

    fn play_match(
        &self,
        match_index: usize,
        permutation_index: usize,
        base_seed: u64,
        permutation: &[usize; 4],
    ) -> Result<MatchOutcome, RunnerError> {
        for (seat_idx, agent_idx) in permutation.iter().enumerate() {
            if *agent_idx >= self.agents.len() {
                return Err(RunnerError::InvalidPermutation {
                    index: seat_idx,
                    agent_index: *agent_idx,
                });
            }
        }

        let rules = Rules {
            hands_per_match: self.config.matches.hands_per_match,
            ..Rules::standard()
        };
        let mut state = MatchState::with_seed(rules, Seat::North, base_seed);

        let handles: [MetricsHandle; 4] =
            std::array::from_fn(|_| Arc::new(Mutex::new(DecisionMetrics::default())));
        let mut players: [Player; 4] = std::array::from_fn(|seat_idx| {
            let agent = &self.agents[permutation[seat_idx]];
            // Strategy RNGs derive from the shuffle seed per seat so a rerun
            // of the same config reproduces every decision.
            let strategy_seed = base_seed.wrapping_add(seat_idx as u64 + 1);
            Player::new(
                Box::new(TimedBidder {
                    inner: agent.spawn_bidder(strategy_seed),
                    metrics: handles[seat_idx].clone(),
                }),
                Box::new(TimedPlayer {
                    inner: agent.spawn_player(strategy_seed),
                    metrics: handles[seat_idx].clone(),
                }),
            )
        });

        let summary = state.play_match(&mut players)?;

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "euchre_bench::match",
                Level::INFO,
                run_id = %self.config.run_id,
                match_index = match_index as u32,
                permutation_index = permutation_index as u32,
                match_seed = base_seed,
                north_south = summary.scores[Team::NorthSouth.index()],
                east_west = summary.scores[Team::EastWest.index()],
                hands_played = summary.hands.len() as u32,
                terminated_early = summary.terminated_early
            );
        }

        let seating: Vec<SeatSnapshot> = Seat::LOOP
            .iter()
            .map(|seat| SeatSnapshot {
                seat: seat_label(*seat).to_string(),
                bot: self.agents[permutation[seat.index()]].name.clone(),
            })
            .collect();

        let mut seat_results = Vec::with_capacity(4);
        for seat in Seat::LOOP {
            let team = seat.team();
            let team_points = summary.scores[team.index()];
            let opp_points = summary.scores[team.opponent().index()];
            let metrics = match handles[seat.index()].lock() {
                Ok(guard) => guard.summary(),
                Err(poisoned) => poisoned.into_inner().summary(),
            };
            seat_results.push(SeatResult {
                agent_name: self.agents[permutation[seat.index()]].name.clone(),
                seat,
                team,
                team_points,
                opp_points,
                win: team_points > opp_points,
                lone_bids: summary.lone_bids[team.index()],
                lone_made: summary.lone_made[team.index()],
                metrics,
            });
        }

        Ok(MatchOutcome {
            seating,
            seat_results,
            hands_played: summary.hands.len(),
            terminated_early: summary.terminated_early,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_match_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    match_index: usize,
    permutation_index: usize,
    base_seed: u64,
    outcome: &MatchOutcome,
) -> Result<usize, RunnerError> {
    let match_id = format!("M{match_index:05}_P{permutation_index:02}");
    let seating = outcome.seating.clone();

    let mut rows_written = 0usize;
    for seat_result in &outcome.seat_results {
        let row = MatchLogRow {
            run_id: config.run_id.clone(),
            match_id: match_id.clone(),
            match_index,
            permutation_index,
            match_seed: base_seed,
            seat: seat_label(seat_result.seat).to_string(),
            bot: seat_result.agent_name.clone(),
            team: team_label(seat_result.team).to_string(),
            seating: seating.clone(),
            points: seat_result.team_points,
            opp_points: seat_result.opp_points,
            win: seat_result.win,
            hands_played: outcome.hands_played,
            lone_bids: seat_result.lone_bids,
            lone_made: seat_result.lone_made,
            early_termination: outcome.terminated_early,
            speed_ms_decision: seat_result.metrics.avg_ms_per_decision,
            decisions: seat_result.metrics.decisions,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

fn seat_label(seat: Seat) -> &'static str {
    match seat {
        Seat::North => "north",
        Seat::East => "east",
        Seat::South => "south",
        Seat::West => "west",
    }
}

fn team_label(team: Team) -> &'static str {
    match team {
        Team::NorthSouth => "north_south",
        Team::EastWest => "east_west",
    }
}

pub struct MatchOutcome {
    pub seating: Vec<SeatSnapshot>,
    pub seat_results: Vec<SeatResult>,
    pub hands_played: usize,
    pub terminated_early: bool,
}

#[derive(Clone, Serialize)]
pub struct SeatSnapshot {
    pub seat: String,
    pub bot: String,
}

pub struct SeatResult {
    pub agent_name: String,
    pub seat: Seat,
    pub team: Team,
    pub team_points: i32,
    pub opp_points: i32,
    pub win: bool,
    pub lone_bids: usize,
    pub lone_made: usize,
    pub metrics: DecisionSummary,
}

type MetricsHandle = Arc<Mutex<DecisionMetrics>>;

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) {
        self.total += duration;
        self.decisions += 1;
    }

    fn summary(&self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

fn record_elapsed(metrics: &MetricsHandle, elapsed: Duration) {
    match metrics.lock() {
        Ok(mut guard) => guard.record(elapsed),
        Err(poisoned) => poisoned.into_inner().record(elapsed),
    }
}

/// Wraps a bidding strategy to clock each decision.
struct TimedBidder {
    inner: Box<dyn BidStrategy>,
    metrics: MetricsHandle,
}

impl BidStrategy for TimedBidder {
    fn bid(&mut self, ctx: &BidContext<'_>) -> Option<Bid> {
        let start = Instant::now();
        let bid = self.inner.bid(ctx);
        record_elapsed(&self.metrics, start.elapsed());
        bid
    }
}

/// Wraps a playing strategy to clock each decision. Observation callbacks
/// are forwarded untimed since they carry no decision.
struct TimedPlayer {
    inner: Box<dyn PlayStrategy>,
    metrics: MetricsHandle,
}

impl PlayStrategy for TimedPlayer {
    fn begin_hand(&mut self, view: &HandStartView<'_>) {
        self.inner.begin_hand(view);
    }

    fn observe_trick(&mut self, trick: &Trick, unseen: &[Card]) {
        self.inner.observe_trick(trick, unseen);
    }

    fn take_kitty(&mut self, hand: &Hand, discard_count: usize) -> Vec<Card> {
        let start = Instant::now();
        let discards = self.inner.take_kitty(hand, discard_count);
        record_elapsed(&self.metrics, start.elapsed());
        discards
    }

    fn give_two_to_partner(&mut self, hand: &Hand, trump: Suit) -> [Card; 2] {
        let start = Instant::now();
        let gift = self.inner.give_two_to_partner(hand, trump);
        record_elapsed(&self.metrics, start.elapsed());
        gift
    }

    fn lead(&mut self, hand: &Hand, unseen: &[Card]) -> Card {
        let start = Instant::now();
        let card = self.inner.lead(hand, unseen);
        record_elapsed(&self.metrics, start.elapsed());
        card
    }

    fn follow(&mut self, hand: &Hand, unseen: &[Card], trick: &Trick) -> Card {
        let start = Instant::now();
        let card = self.inner.follow(hand, unseen, trick);
        record_elapsed(&self.metrics, start.elapsed());
        card
    }
}

#[derive(Serialize)]
struct MatchLogRow {
    run_id: String,
    match_id: String,
    match_index: usize,
    permutation_index: usize,
    match_seed: u64,
    seat: String,
    bot: String,
    team: String,
    seating: Vec<SeatSnapshot>,
    points: i32,
    opp_points: i32,
    win: bool,
    hands_played: usize,
    lone_bids: usize,
    lone_made: usize,
    early_termination: bool,
    speed_ms_decision: f64,
    decisions: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("match execution failed: {source}")]
    Engine {
        #[from]
        source: EngineError,
    },
    #[error("configuration requires exactly 4 agents but found {found}")]
    SeatCount { found: usize },
    #[error("requested {requested} seat permutations exceeds maximum of {max}")]
    PermutationLimit { requested: usize, max: usize },
    #[error("permutation index {index} references invalid agent index {agent_index}")]
    InvalidPermutation { index: usize, agent_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

/// Instantiation recipe for one tournament participant. Strategies are
/// rebuilt fresh for every match so no belief state leaks across matches.
struct AgentBlueprint {
    name: String,
    bidder: BidderKind,
    player: PlayerKind,
}

impl AgentBlueprint {
    fn spawn_bidder(&self, seed: u64) -> Box<dyn BidStrategy> {
        match self.bidder {
            BidderKind::Random => Box::new(RandomBidder::new(seed)),
            BidderKind::Tally => Box::new(TallyBidder::new()),
            BidderKind::Heuristic => Box::new(HeuristicBidder::new()),
        }
    }

    fn spawn_player(&self, seed: u64) -> Box<dyn PlayStrategy> {
        match self.player {
            PlayerKind::Random => Box::new(RandomPlayer::new(seed)),
            PlayerKind::Boss => Box::new(BossPlayer::new(seed)),
            PlayerKind::Inference => Box::new(InferencePlayer::new()),
        }
    }
}
