//! # Poller de Readiness
//! src/server/poller.rs
//!
//! El hilo principal del servidor: es dueño del listener no bloqueante y de
//! la tabla de conexiones cliente, y es el único productor de la cola de
//! transferencias. Cada tick hace una sola llamada a `poll` sobre el listener
//! más los sockets vivos, acepta si hay capacidad, acumula y despacha los
//! requests legibles, y al final cierra y compacta los slots marcados.
//!
//! Los workers nunca tocan la tabla de conexiones: la cancelación de una
//! transferencia en curso se hace con un shutdown del socket desde acá, que
//! hace fallar el próximo envío del worker.

use crate::config::Config;
use crate::http::{Response, StatusCode};
use crate::metrics::MetricsCollector;
use crate::server::admission;
use crate::server::idle::IdleTable;
use crate::server::signal;
use crate::transfer::{TransferQueue, WorkerPool};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use std::io::{self, ErrorKind, Read, Write};
use std::mem;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::os::fd::AsFd;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Bytes leídos del socket por evento de legibilidad
const READ_CHUNK: usize = 1024;

/// Tamaño máximo tolerado para el bloque de cabeceras de un request
const MAX_HEADER_BYTES: usize = 8192;

/// Una conexión cliente registrada en la tabla del poller
struct ClientSlot {
    /// Identificador estable, asignado monotónicamente al aceptar
    conn_id: u64,

    /// Socket del cliente; las tareas llevan un clon, el original vive acá
    stream: TcpStream,

    /// Acumulador del bloque de cabeceras hasta ver `\r\n\r\n`
    buffer: Vec<u8>,

    /// Marcado para cierre al final del tick
    close: bool,
}

/// Servidor de archivos: poller + pool de workers
pub struct Server {
    listener: TcpListener,
    config: Config,
    document_root: PathBuf,
    connections: Vec<ClientSlot>,
    next_conn_id: u64,
    queue: Arc<TransferQueue>,
    idle: Arc<IdleTable>,
    metrics: MetricsCollector,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Crea el servidor ligando el listener a la dirección configurada
    pub fn bind(config: Config) -> io::Result<Self> {
        let listener = TcpListener::bind(config.address())?;
        listener.set_nonblocking(true)?;

        let document_root = PathBuf::from(&config.document_root);
        let idle = Arc::new(IdleTable::new(config.keep_alive_base_secs));

        Ok(Self {
            listener,
            document_root,
            connections: Vec::with_capacity(config.max_connections),
            next_conn_id: 1,
            queue: Arc::new(TransferQueue::new()),
            idle,
            metrics: MetricsCollector::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    /// Dirección real del listener (útil con puerto efímero en tests)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Flag compartido para pedir el apagado desde otro hilo
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Collector de métricas del servidor
    pub fn metrics(&self) -> MetricsCollector {
        self.metrics.clone()
    }

    /// Loop principal: corre hasta que se pida el apagado
    ///
    /// Lanza el pool de workers, itera ticks de poll, y al salir drena: cierra
    /// la cola, espera a los workers, cierra las conexiones restantes y deja
    /// el resumen de métricas en el log.
    pub fn run(mut self) -> io::Result<()> {
        println!(
            "🚀 Servidor escuchando en {} (raíz: {})",
            self.config.address(),
            self.document_root.display()
        );

        let pool = WorkerPool::spawn(
            self.config.workers,
            self.config.chunk_size,
            Arc::clone(&self.queue),
            Arc::clone(&self.idle),
            self.metrics.clone(),
            Arc::clone(&self.shutdown),
        );

        while !self.shutdown.load(Ordering::SeqCst) && !signal::requested() {
            self.tick()?;
        }

        println!("🛑 Apagado solicitado, drenando...");
        self.shutdown.store(true, Ordering::SeqCst);
        self.queue.close();
        pool.join();

        for slot in &mut self.connections {
            slot.close = true;
        }
        self.close_marked();

        println!("📊 Métricas finales:\n{}", self.metrics.summary_json());
        println!("👋 Servidor detenido");
        Ok(())
    }

    /// Un tick: un poll, un accept como máximo, despacho y compactación
    fn tick(&mut self) -> io::Result<()> {
        // Los PollFd prestan los sockets; el bloque limita ese préstamo a la
        // llamada de poll y la copia de readiness
        let ready = {
            let mut fds = Vec::with_capacity(1 + self.connections.len());
            fds.push(PollFd::new(self.listener.as_fd(), PollFlags::POLLIN));
            for slot in &self.connections {
                fds.push(PollFd::new(slot.stream.as_fd(), PollFlags::POLLIN));
            }

            match poll(&mut fds, PollTimeout::from(self.config.poll_timeout_ms)) {
                Ok(_) => {}
                // Una señal interrumpió el poll; el loop decide si es apagado
                Err(nix::errno::Errno::EINTR) => return Ok(()),
                Err(e) => return Err(io::Error::from(e)),
            }

            fds.iter()
                .map(|fd| {
                    fd.revents()
                        .map(|r| {
                            r.intersects(
                                PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR,
                            )
                        })
                        .unwrap_or(false)
                })
                .collect::<Vec<bool>>()
        };

        if ready[0] && self.connections.len() < self.config.max_connections {
            self.accept_one();
        }

        // Índices relativos a la tabla previa al accept de este tick
        let established = ready.len() - 1;
        for index in 0..established {
            if ready[index + 1] {
                self.handle_readable(index);
            }
        }

        self.expire_idle();
        self.close_marked();
        Ok(())
    }

    /// Acepta una conexión y la registra con presupuesto "nunca completó"
    fn accept_one(&mut self) {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                let conn_id = self.next_conn_id;
                self.next_conn_id += 1;

                self.idle.register(conn_id);
                self.metrics.record_accept();
                println!("🔌 Conexión #{} aceptada desde {}", conn_id, peer);

                self.connections.push(ClientSlot {
                    conn_id,
                    stream,
                    buffer: Vec::new(),
                    close: false,
                });
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => println!("⚠️  Accept falló: {}", e),
        }
    }

    /// Lee lo disponible en un socket legible y despacha si el bloque de
    /// cabeceras está completo
    fn handle_readable(&mut self, index: usize) {
        let slot = &mut self.connections[index];
        if slot.close {
            return;
        }

        let mut chunk = [0u8; READ_CHUNK];
        match slot.stream.read(&mut chunk) {
            // EOF: el cliente cerró su extremo
            Ok(0) => slot.close = true,
            Ok(n) => {
                slot.buffer.extend_from_slice(&chunk[..n]);

                if header_complete(&slot.buffer) {
                    self.dispatch(index);
                } else if slot.buffer.len() > MAX_HEADER_BYTES {
                    // Cabeceras sin fin: se responde 400 y se corta
                    self.reject_oversized(index);
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                println!("⚠️  Error leyendo conexión #{}: {}", slot.conn_id, e);
                slot.close = true;
            }
        }
    }

    /// Pasa un request completo por la admisión: cabecera 200 + tarea, o
    /// cabecera de error y cierre
    fn dispatch(&mut self, index: usize) {
        let raw = mem::take(&mut self.connections[index].buffer);
        let active = self.connections.len();
        let keep_alive_secs = self.idle.budget(active).as_secs();

        let slot = &mut self.connections[index];
        let task_stream = match slot.stream.try_clone() {
            Ok(stream) => stream,
            Err(e) => {
                println!("⚠️  No se pudo clonar el socket #{}: {}", slot.conn_id, e);
                slot.close = true;
                return;
            }
        };

        match admission::admit(
            &raw,
            slot.conn_id,
            task_stream,
            &self.document_root,
            keep_alive_secs,
        ) {
            Ok(admitted) => {
                self.metrics
                    .record_response(admitted.response.status().as_u16());

                if let Err(e) = slot.stream.write_all(&admitted.response.to_bytes()) {
                    println!(
                        "⚠️  No se pudo enviar la cabecera a #{}: {}",
                        slot.conn_id, e
                    );
                    slot.close = true;
                    return;
                }

                println!(
                    "📨 Conexión #{}: 200, {} bytes encolados ({})",
                    slot.conn_id,
                    admitted.task.total_bytes(),
                    admitted.task.path().display()
                );
                self.queue.push(admitted.task);
            }
            Err(rejection) => {
                self.metrics.record_response(rejection.status.as_u16());
                println!(
                    "⚠️  Conexión #{} rechazada: {} ({})",
                    slot.conn_id, rejection.status, rejection.detail
                );

                let head = rejection.to_response(keep_alive_secs).to_bytes();
                let _ = slot.stream.write_all(&head);
                // Todo fallo de admisión es terminal para la conexión
                slot.close = true;
            }
        }
    }

    /// 400 para un bloque de cabeceras que excedió el tamaño tolerado
    fn reject_oversized(&mut self, index: usize) {
        let active = self.connections.len();
        let keep_alive_secs = self.idle.budget(active).as_secs();

        let slot = &mut self.connections[index];
        self.metrics
            .record_response(StatusCode::BadRequest.as_u16());
        println!(
            "⚠️  Conexión #{} rechazada: cabeceras de más de {} bytes",
            slot.conn_id, MAX_HEADER_BYTES
        );

        let head = Response::error_head(None, StatusCode::BadRequest, keep_alive_secs).to_bytes();
        let _ = slot.stream.write_all(&head);
        slot.close = true;
    }

    /// Marca para cierre toda conexión que agotó su presupuesto de inactividad
    fn expire_idle(&mut self) {
        let active = self.connections.len();
        for slot in &mut self.connections {
            if !slot.close && self.idle.is_expired(slot.conn_id, active) {
                println!(
                    "⏱️  Conexión #{} superó su presupuesto de inactividad",
                    slot.conn_id
                );
                slot.close = true;
            }
        }
    }

    /// Cierra y compacta los slots marcados
    ///
    /// El shutdown explícito alcanza también al clon que pueda llevar una
    /// tarea encolada: su próximo envío falla y la tarea se descarta.
    fn close_marked(&mut self) {
        let idle = &self.idle;
        let metrics = &self.metrics;

        self.connections.retain_mut(|slot| {
            if !slot.close {
                return true;
            }

            idle.remove(slot.conn_id);
            metrics.record_close();
            let _ = slot.stream.shutdown(Shutdown::Both);
            println!("🔌 Conexión #{} cerrada", slot.conn_id);
            false
        });
    }
}

/// Indica si el acumulador ya contiene el fin del bloque de cabeceras
fn header_complete(buffer: &[u8]) -> bool {
    buffer.windows(4).any(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.port = 0; // puerto efímero
        config.document_root = std::env::temp_dir().display().to_string();
        config
    }

    #[test]
    fn test_header_complete_detection() {
        assert!(!header_complete(b""));
        assert!(!header_complete(b"GET / HTTP/1.1\r\n"));
        assert!(!header_complete(b"GET / HTTP/1.1\r\nHost: x\r\n"));
        assert!(header_complete(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"));
        assert!(header_complete(b"GET / HTTP/1.1\r\n\r\nresto"));
    }

    #[test]
    fn test_bind_ephemeral_port() {
        let server = Server::bind(test_config()).expect("bind");
        let addr = server.local_addr().expect("local_addr");
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn test_shutdown_handle_is_shared() {
        let server = Server::bind(test_config()).expect("bind");
        let handle = server.shutdown_handle();

        handle.store(true, Ordering::SeqCst);
        assert!(server.shutdown.load(Ordering::SeqCst));
    }

    #[test]
    fn test_tick_without_traffic_is_quiet() {
        let mut config = test_config();
        config.poll_timeout_ms = 10;

        let mut server = Server::bind(config).expect("bind");
        server.tick().expect("tick");
        assert!(server.connections.is_empty());
    }

    #[test]
    fn test_accept_registers_idle_entry() {
        let mut config = test_config();
        config.poll_timeout_ms = 100;

        let mut server = Server::bind(config).expect("bind");
        let addr = server.local_addr().unwrap();
        let _client = TcpStream::connect(addr).expect("connect");

        server.tick().expect("tick");
        assert_eq!(server.connections.len(), 1);
        assert_eq!(server.idle.len(), 1);
        assert_eq!(server.metrics.snapshot().connections_accepted, 1);
    }

    #[test]
    fn test_client_eof_compacts_slot() {
        let mut config = test_config();
        config.poll_timeout_ms = 100;

        let mut server = Server::bind(config).expect("bind");
        let addr = server.local_addr().unwrap();
        let client = TcpStream::connect(addr).expect("connect");

        server.tick().expect("tick"); // acepta
        assert_eq!(server.connections.len(), 1);

        drop(client); // EOF
        server.tick().expect("tick"); // detecta y compacta
        assert!(server.connections.is_empty());
        assert!(server.idle.is_empty());
        assert_eq!(server.metrics.snapshot().connections_closed, 1);
    }

    #[test]
    fn test_accept_stops_at_connection_cap() {
        let mut config = test_config();
        config.poll_timeout_ms = 100;
        config.max_connections = 1;

        let mut server = Server::bind(config).expect("bind");
        let addr = server.local_addr().unwrap();

        let _first = TcpStream::connect(addr).expect("connect");
        let _second = TcpStream::connect(addr).expect("connect");

        server.tick().expect("tick");
        server.tick().expect("tick");
        assert_eq!(server.connections.len(), 1);
    }
}
