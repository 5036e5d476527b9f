//! # Pool de Workers de Transferencia
//! src/transfer/pool.rs
//!
//! Pool de tamaño fijo. Cada visita de worker atiende exactamente un chunk
//! de una transferencia: abre el archivo, hace seek al progreso actual, lee
//! y envía un chunk, y reencola la tarea si quedan bytes. Los errores de un
//! worker nunca tumban el pool; se registran y la tarea afectada termina con
//! un cierre explícito del socket para no dejar al cliente esperando.

use crate::http::HttpVersion;
use crate::metrics::MetricsCollector;
use crate::server::idle::IdleTable;
use crate::transfer::queue::TransferQueue;
use crate::transfer::task::TransferTask;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::net::Shutdown;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Espera máxima de un pop antes de volver a chequear el flag de apagado
const POP_WAIT: Duration = Duration::from_millis(200);

/// Pool de workers de tamaño fijo
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Lanza `count` workers que consumen de la cola hasta el apagado
    pub fn spawn(
        count: usize,
        chunk_size: usize,
        queue: Arc<TransferQueue>,
        idle: Arc<IdleTable>,
        metrics: MetricsCollector,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        let mut handles = Vec::with_capacity(count);

        for i in 0..count {
            let queue = Arc::clone(&queue);
            let idle = Arc::clone(&idle);
            let metrics = metrics.clone();
            let shutdown = Arc::clone(&shutdown);

            handles.push(thread::spawn(move || {
                worker_loop(
                    format!("Transfer-{}", i),
                    chunk_size,
                    queue,
                    idle,
                    metrics,
                    shutdown,
                )
            }));
        }

        Self { handles }
    }

    /// Cantidad de workers del pool
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Espera a que todos los workers terminen (fase de drenado del apagado)
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

/// Loop principal del worker: chequea el flag de apagado en cada vuelta
fn worker_loop(
    name: String,
    chunk_size: usize,
    queue: Arc<TransferQueue>,
    idle: Arc<IdleTable>,
    metrics: MetricsCollector,
    shutdown: Arc<AtomicBool>,
) {
    println!("🔧 Worker {} iniciado", name);

    while !shutdown.load(Ordering::SeqCst) {
        if let Some(task) = queue.pop_timeout(POP_WAIT) {
            service_visit(&name, task, chunk_size, &queue, &idle, &metrics);
        }
    }

    println!("🔧 Worker {} terminado", name);
}

/// Una visita: un chunk de una transferencia, y reencolar o finalizar
fn service_visit(
    name: &str,
    mut task: TransferTask,
    chunk_size: usize,
    queue: &TransferQueue,
    idle: &IdleTable,
    metrics: &MetricsCollector,
) {
    let mut file = match File::open(task.path()) {
        Ok(file) => file,
        Err(e) => {
            let detail = format!("no se pudo reabrir {}: {}", task.path().display(), e);
            return abort_task(name, &mut task, metrics, &detail);
        }
    };

    // Continuar desde el progreso actual
    if let Err(e) = file.seek(SeekFrom::Start(task.sent_bytes())) {
        let detail = format!("seek falló en {}: {}", task.path().display(), e);
        return abort_task(name, &mut task, metrics, &detail);
    }

    let want = chunk_size.min(task.remaining() as usize);
    let mut buffer = vec![0u8; want];
    let read = match file.read(&mut buffer) {
        Ok(n) => n,
        Err(e) => {
            let detail = format!("lectura falló en {}: {}", task.path().display(), e);
            return abort_task(name, &mut task, metrics, &detail);
        }
    };

    if read == 0 && !task.is_complete() {
        return abort_task(name, &mut task, metrics, "el archivo se truncó a mitad de transferencia");
    }

    match task.stream().write(&buffer[..read]) {
        Ok(written) => {
            task.advance(written as u64);
            metrics.record_bytes(written as u64);

            if task.is_complete() {
                finish_task(name, task, idle, metrics);
            } else {
                // Reencolar al final: round-robin contra el resto del trabajo
                metrics.record_requeue();
                queue.push(task);
            }
        }
        Err(e) => {
            // La conexión fue cerrada (p. ej. por el poller): la tarea se
            // descarta sin reencolar y no se intentan más chunks
            println!(
                "⚠️  Worker {}: envío cancelado para conexión #{}: {}",
                name,
                task.conn_id(),
                e
            );
            metrics.record_worker_error();
        }
    }
}

/// Cierre de una transferencia completa según la versión del protocolo
fn finish_task(name: &str, mut task: TransferTask, idle: &IdleTable, metrics: &MetricsCollector) {
    metrics.record_task_done();

    match task.version() {
        HttpVersion::V10 => {
            // En 1.0 la transferencia agota la conexión
            let _ = task.stream().shutdown(Shutdown::Both);
            println!(
                "✅ Worker {}: conexión #{} completa ({} bytes, HTTP/1.0, cerrada)",
                name,
                task.conn_id(),
                task.total_bytes()
            );
        }
        HttpVersion::V11 => {
            // En 1.1 la conexión queda abierta; arranca su presupuesto de
            // inactividad
            idle.mark_completed(task.conn_id());
            println!(
                "✅ Worker {}: conexión #{} completa ({} bytes, HTTP/1.1, keep-alive)",
                name,
                task.conn_id(),
                task.total_bytes()
            );
        }
    }
}

/// Fallo fatal para la tarea: diagnóstico y cierre explícito del socket
fn abort_task(name: &str, task: &mut TransferTask, metrics: &MetricsCollector, detail: &str) {
    eprintln!(
        "❌ Worker {}: transferencia abortada para conexión #{}: {}",
        name,
        task.conn_id(),
        detail
    );
    metrics.record_worker_error();
    let _ = task.stream().shutdown(Shutdown::Both);
}
