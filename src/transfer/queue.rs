//! # Cola FIFO de Transferencias
//! src/transfer/queue.rs
//!
//! Implementa la cola compartida entre el poller (productor) y los workers
//! (consumidores, y productores al reencolar). Orden FIFO estricto sobre
//! toda la cola: tareas de conexiones distintas se intercalan por orden de
//! llegada, y una tarea reencolada vuelve al final, así las transferencias
//! grandes se atienden round-robin contra el resto del trabajo.
//!
//! El consumo bloquea con condvar y timeout acotado en vez de busy-polling,
//! para que los workers puedan observar el flag de apagado.

use crate::transfer::task::TransferTask;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

struct QueueInner {
    tasks: VecDeque<TransferTask>,
    closed: bool,
}

/// Cola FIFO thread-safe de transferencias
pub struct TransferQueue {
    inner: Mutex<QueueInner>,
    condvar: Condvar,
}

impl TransferQueue {
    /// Crea una cola vacía
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                tasks: VecDeque::new(),
                closed: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Encola una tarea al final (push y reencolado usan el mismo camino)
    ///
    /// Tras el cierre de la cola las tareas se descartan: sus sockets se
    /// cierran al soltarlas.
    pub fn push(&self, task: TransferTask) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.tasks.push_back(task);
        self.condvar.notify_one();
    }

    /// Desencola la tarea más antigua, esperando hasta `timeout`
    ///
    /// Retorna None si venció el timeout o la cola se cerró vacía.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<TransferTask> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock().unwrap();

        loop {
            if let Some(task) = inner.tasks.pop_front() {
                return Some(task);
            }
            if inner.closed {
                return None;
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _timed_out) = self
                .condvar
                .wait_timeout(inner, deadline - now)
                .unwrap();
            inner = guard;
        }
    }

    /// Intenta desencolar sin bloquear
    pub fn try_pop(&self) -> Option<TransferTask> {
        let mut inner = self.inner.lock().unwrap();
        inner.tasks.pop_front()
    }

    /// Cierra la cola y despierta a todos los workers en espera
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.closed = true;
        self.condvar.notify_all();
    }

    /// Retorna el tamaño actual de la cola
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().tasks.len()
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TransferQueue {
    fn default() -> Self {
        Self::new()
    }
}
