//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta y agrega métricas del servidor en tiempo real. El poller y los
//! workers comparten el mismo collector; todos los registros pasan por un
//! único Mutex de contadores.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
struct MetricsData {
    /// Conexiones aceptadas desde el arranque
    connections_accepted: u64,

    /// Conexiones cerradas (por el cliente, por inactividad o por apagado)
    connections_closed: u64,

    /// Respuestas emitidas por código de estado
    status_codes: HashMap<u16, u64>,

    /// Transferencias completadas hasta el último byte
    tasks_completed: u64,

    /// Reencolados de tareas con bytes pendientes
    tasks_requeued: u64,

    /// Bytes de cuerpo enviados
    bytes_sent: u64,

    /// Fallos fatales de workers (archivo perdido, socket cancelado)
    worker_errors: u64,
}

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData {
                connections_accepted: 0,
                connections_closed: 0,
                status_codes: HashMap::new(),
                tasks_completed: 0,
                tasks_requeued: 0,
                bytes_sent: 0,
                worker_errors: 0,
            })),
            start_time: Instant::now(),
        }
    }

    /// Registra una conexión aceptada
    pub fn record_accept(&self) {
        let mut data = self.inner.lock().unwrap();
        data.connections_accepted += 1;
    }

    /// Registra el cierre de una conexión
    pub fn record_close(&self) {
        let mut data = self.inner.lock().unwrap();
        data.connections_closed += 1;
    }

    /// Registra una cabecera de respuesta emitida con su código
    pub fn record_response(&self, status_code: u16) {
        let mut data = self.inner.lock().unwrap();
        *data.status_codes.entry(status_code).or_insert(0) += 1;
    }

    /// Registra una transferencia completada
    pub fn record_task_done(&self) {
        let mut data = self.inner.lock().unwrap();
        data.tasks_completed += 1;
    }

    /// Registra un reencolado de tarea con progreso pendiente
    pub fn record_requeue(&self) {
        let mut data = self.inner.lock().unwrap();
        data.tasks_requeued += 1;
    }

    /// Registra bytes de cuerpo enviados
    pub fn record_bytes(&self, n: u64) {
        let mut data = self.inner.lock().unwrap();
        data.bytes_sent += n;
    }

    /// Registra un fallo fatal de worker
    pub fn record_worker_error(&self) {
        let mut data = self.inner.lock().unwrap();
        data.worker_errors += 1;
    }

    /// Obtiene un snapshot de las métricas
    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.inner.lock().unwrap();

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            connections_accepted: data.connections_accepted,
            connections_closed: data.connections_closed,
            status_codes: data.status_codes.clone(),
            tasks_completed: data.tasks_completed,
            tasks_requeued: data.tasks_requeued,
            bytes_sent: data.bytes_sent,
            worker_errors: data.worker_errors,
        }
    }

    /// Obtiene las métricas actuales en formato JSON
    pub fn summary_json(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot())
            .unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot de métricas (para uso externo)
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub connections_accepted: u64,
    pub connections_closed: u64,
    pub status_codes: HashMap<u16, u64>,
    pub tasks_completed: u64,
    pub tasks_requeued: u64,
    pub bytes_sent: u64,
    pub worker_errors: u64,
}
