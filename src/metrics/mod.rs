//! # Módulo de Métricas
//! src/metrics/mod.rs
//!
//! Contadores agregados del servidor: conexiones, respuestas por código,
//! progreso de transferencias y errores de workers.

pub mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot};
