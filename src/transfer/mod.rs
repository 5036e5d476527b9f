//! # Módulo de Transferencias
//! src/transfer/mod.rs
//!
//! Una transferencia es el envío de los bytes de un archivo a un cliente ya
//! admitido. Se modela como una `TransferTask` que viaja por una cola FIFO
//! compartida: el poller la produce, un worker la consume, envía un chunk y
//! la reencola si quedan bytes. Así una transferencia grande se atiende
//! round-robin contra el resto del trabajo pendiente, un chunk por visita.

pub mod pool;   // Pool acotado de workers
pub mod queue;  // Cola FIFO protegida por lock
pub mod task;   // Unidad de trabajo de transferencia

// Re-exportar para facilitar el uso
pub use pool::WorkerPool;
pub use queue::TransferQueue;
pub use task::TransferTask;
