//! # File Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 y HTTP/1.1 de archivos estáticos implementado desde cero
//! para demostrar conceptos de sistemas operativos: multiplexación por
//! readiness (poll), productor/consumidor con cola compartida, pool acotado
//! de workers y control de admisión por presupuesto de inactividad.
//!
//! ## Arquitectura
//!
//! Diseño half-sync/half-async: un único thread poller es dueño del socket de
//! escucha y de todas las conexiones activas; los workers sólo comparten la
//! cola de transferencias y la tabla de inactividad, ambas serializadas por
//! su propio lock.
//!
//! - `http`: Parsing de requests y construcción de responses HTTP
//! - `server`: Poller de readiness, admisión de requests, presupuesto de
//!   inactividad y manejo de señales
//! - `transfer`: Tareas de transferencia, cola FIFO y pool de workers
//! - `metrics`: Recolección de métricas y observabilidad
//! - `config`: Configuración por CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```ignore
//! use file_server::config::Config;
//! use file_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(config).expect("Error al iniciar servidor");
//! server.run().expect("Error en el loop principal");
//! ```

pub mod config;
pub mod http;
pub mod metrics;
pub mod server;
pub mod transfer;
