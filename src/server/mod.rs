//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Este módulo implementa el lado síncrono-por-eventos del servidor:
//!
//! 1. El poller escucha en un puerto y multiplexa readiness con poll(2)
//! 2. Acepta conexiones mientras haya capacidad
//! 3. Lee el bloque de cabeceras y lo pasa por la admisión
//! 4. Encola transferencias y cierra conexiones vencidas por inactividad
//!
//! La tabla de conexiones es privada del poller; la cola y la tabla de
//! inactividad son lo único compartido con los workers.

pub mod admission;  // Validación de requests y creación de tareas
pub mod idle;       // Presupuesto de inactividad por conexión
pub mod poller;     // Loop de readiness y tabla de conexiones
pub mod signal;     // Apagado cooperativo por SIGINT/SIGTERM

// Re-exportar para facilitar el uso
pub use idle::IdleTable;
pub use poller::Server;
