// Library exports for the Battlesnake bot
// The server binary and the replay tool both use the decision engine from here

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod engine;
pub mod lookahead;
pub mod replay;
pub mod risk;
pub mod safety;
pub mod selector;
pub mod snapshot;
pub mod types;
