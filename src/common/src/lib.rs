//! Common library for the FPL analysis tools.
//!
//! Provides shared functionality:
//! - Configuration loading from .env
//! - FPL API client with response cache and rate limiting
//! - Typed API payloads and denormalized player/fixture tables
//! - Player, fixture and transfer analysis

pub mod analysis;
pub mod cache;
pub mod client;
pub mod config;
pub mod models;
pub mod tables;

pub use analysis::{
    AnalysisError, ChipStrategy, ChipThresholds, FixtureAnalyzer, PlayerAnalyzer, PlayerFilter,
    TransferAdvisor, WildcardAdvice,
};
pub use client::{CacheInfo, FplClient, FplError, HttpTransport, Transport, TransportError};
pub use config::{Config, ConfigError};
pub use models::{Difficulty, PlayerStatus, Position};
pub use tables::{Fixture, Player, TableError, Team, TeamFixture, Venue};
