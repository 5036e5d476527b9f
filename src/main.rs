//! # File Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor de archivos estáticos.

use file_server::config::Config;
use file_server::server::{signal, Server};

fn main() {
    println!("=================================");
    println!("  RedUnix Static File Server");
    println!("  Principios de Sistemas Operativos");
    println!("=================================\n");

    // Crear configuración desde CLI args / variables de entorno
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        std::process::exit(1);
    }

    config.print_summary();

    // SIGINT/SIGTERM disparan el apagado cooperativo del poller
    if let Err(e) = signal::install() {
        eprintln!("💥 No se pudo instalar el manejador de señales: {}", e);
        std::process::exit(1);
    }

    // Bind del socket de escucha; un fallo acá es fatal
    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("💥 Error fatal al iniciar el servidor: {}", e);
            std::process::exit(1);
        }
    };

    // Loop principal (esto bloqueará el thread hasta el apagado)
    if let Err(e) = server.run() {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }
}
