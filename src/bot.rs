// Welcome to
// __________         __    __  .__                               __
// \______   \_____ _/  |__/  |_|  |   ____   ______ ____ _____  |  | __ ____
//  |    |  _/\__  \\   __\   __\  | _/ __ \ /  ___//    \\__  \ |  |/ // __ \
//  |    |   \ / __ \|  |  |  | |  |_\  ___/ \___ \|   |  \/ __ \|    <\  ___/
//  |________/(______/__|  |__| |____/\_____>______>___|__(______/__|__\\_____>
//
// The bot is the boundary the HTTP layer talks to. It owns only static
// configuration and telemetry counters; each move is decided from the
// request payload alone.

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::{DebugLogger, DecisionRecord};
use crate::engine::{decide_turn, Decision, DecisionPath};
use crate::safety::RiskPolicy;
use crate::types::{Battlesnake, Board, Game};

/// Counts of how turns were decided since startup
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    pub turns: u64,
    pub single: u64,
    pub random: u64,
    pub risk_scored: u64,
    pub no_good_option: u64,
    pub malformed_input: u64,
}

/// Lock-free counters behind `EngineStats`
#[derive(Debug, Default)]
struct TurnCounters {
    turns: AtomicU64,
    single: AtomicU64,
    random: AtomicU64,
    risk_scored: AtomicU64,
    no_good_option: AtomicU64,
    malformed_input: AtomicU64,
}

impl TurnCounters {
    fn record(&self, path: &DecisionPath) {
        self.turns.fetch_add(1, Ordering::Relaxed);
        let counter = match path {
            DecisionPath::Single => &self.single,
            DecisionPath::Random { .. } => &self.random,
            DecisionPath::RiskScored { .. } => &self.risk_scored,
            DecisionPath::NoGoodOption => &self.no_good_option,
            DecisionPath::MalformedInput => &self.malformed_input,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> EngineStats {
        EngineStats {
            turns: self.turns.load(Ordering::Relaxed),
            single: self.single.load(Ordering::Relaxed),
            random: self.random.load(Ordering::Relaxed),
            risk_scored: self.risk_scored.load(Ordering::Relaxed),
            no_good_option: self.no_good_option.load(Ordering::Relaxed),
            malformed_input: self.malformed_input.load(Ordering::Relaxed),
        }
    }
}

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    policy: RiskPolicy,
    debug_logger: DebugLogger,
    counters: TurnCounters,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Bot {
            policy: config.risk.policy(),
            config,
            debug_logger: DebugLogger::disabled(),
            counters: TurnCounters::default(),
        }
    }

    /// Attaches a decision log
    pub fn with_debug_logger(mut self, debug_logger: DebugLogger) -> Self {
        self.debug_logger = debug_logger;
        self
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        let appearance = &self.config.appearance;
        json!({
            "apiversion": appearance.apiversion,
            "author": appearance.author,
            "color": appearance.color,
            "head": appearance.head,
            "tail": appearance.tail,
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &i32, board: &Board, _you: &Battlesnake) {
        info!(
            "GAME START {} ({}x{}, {} snakes)",
            game.id,
            board.width,
            board.height,
            board.snakes.len()
        );
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: &i32, _board: &Board, _you: &Battlesnake) {
        info!("GAME OVER {} after {} turns", game.id, turn);
    }

    /// Computes and returns the next move as `{"move": <token>}`
    /// Corresponds to POST /move endpoint
    pub fn get_move(&self, game: &Game, turn: &i32, board: &Board, you: &Battlesnake) -> Value {
        let decision = self.decide(game, turn, board, you);
        json!({ "move": decision.direction.as_str() })
    }

    /// Runs the decision pipeline for one turn, records telemetry and the
    /// optional debug log entry
    pub fn decide(&self, game: &Game, turn: &i32, board: &Board, you: &Battlesnake) -> Decision {
        let start_time = Instant::now();

        let decision = match self.config.selection.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(*turn as u64));
                decide_turn(board, you, *turn, &self.policy, &mut rng)
            }
            None => decide_turn(board, you, *turn, &self.policy, &mut rand::rng()),
        };

        self.counters.record(&decision.path);

        info!(
            "Turn {}: Chose {} ({:?}, time: {}us)",
            turn,
            decision.direction,
            decision.path,
            start_time.elapsed().as_micros()
        );

        if self.debug_logger.is_enabled() {
            self.debug_logger.log_decision(DecisionRecord {
                game_id: game.id.clone(),
                turn: *turn,
                you: you.clone(),
                board: board.clone(),
                chosen_move: decision.direction,
                path: decision.path,
                timestamp: chrono::Utc::now().to_rfc3339(),
            });
        }

        decision
    }

    /// Telemetry since startup
    pub fn stats(&self) -> EngineStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coord, Direction};

    fn me(body: &[(i32, i32)]) -> Battlesnake {
        let body: Vec<Coord> = body.iter().map(|&(x, y)| Coord::new(x, y)).collect();
        Battlesnake {
            id: "me".to_string(),
            name: "me".to_string(),
            health: 100,
            head: body.first().copied().unwrap_or_default(),
            length: body.len() as i32,
            body,
            latency: "0".to_string(),
            shout: None,
        }
    }

    fn board(you: &Battlesnake) -> Board {
        Board {
            height: 11,
            width: 11,
            food: vec![],
            snakes: vec![you.clone()],
            hazards: vec![],
        }
    }

    #[test]
    fn test_info_reports_configured_appearance() {
        let bot = Bot::new(Config::default_hardcoded());
        let info = bot.info();
        assert_eq!(info["apiversion"], "1");
        assert_eq!(info["author"], "BigMac27");
        assert_eq!(info["color"], "#105c1b");
        assert_eq!(info["head"], "caffeine");
        assert_eq!(info["tail"], "swoop");
    }

    #[test]
    fn test_get_move_returns_move_token() {
        let bot = Bot::new(Config::default_hardcoded());
        let you = me(&[(5, 5), (4, 5)]);
        let response = bot.get_move(&Game::default(), &1, &board(&you), &you);
        let token = response["move"].as_str().unwrap();
        assert!(["up", "down", "right"].contains(&token));
    }

    #[test]
    fn test_counters_track_paths() {
        let bot = Bot::new(Config::default_hardcoded());
        let good = me(&[(10, 0), (9, 0)]);
        let bad = me(&[(10, 0)]);

        bot.decide(&Game::default(), &1, &board(&good), &good);
        bot.decide(&Game::default(), &2, &board(&bad), &bad);

        let stats = bot.stats();
        assert_eq!(stats.turns, 2);
        assert_eq!(stats.single, 1);
        assert_eq!(stats.malformed_input, 1);
        assert_eq!(stats.no_good_option, 0);
    }

    #[test]
    fn test_seeded_config_reproduces_moves() {
        let mut config = Config::default_hardcoded();
        config.selection.seed = Some(99);
        let first = Bot::new(config.clone());
        let second = Bot::new(config);
        let you = me(&[(5, 5), (4, 5)]);

        for turn in 0..20 {
            let a = first.decide(&Game::default(), &turn, &board(&you), &you);
            let b = second.decide(&Game::default(), &turn, &board(&you), &you);
            assert_eq!(a, b);
            assert_ne!(a.direction, Direction::Left);
        }
    }

    #[test]
    fn test_lifecycle_hooks_do_not_panic() {
        let bot = Bot::new(Config::default_hardcoded());
        let you = me(&[(5, 5)]);
        bot.start(&Game::default(), &0, &board(&you), &you);
        bot.end(&Game::default(), &0, &board(&you), &you);
    }
}
