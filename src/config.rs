//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor de archivos con soporte
//! completo para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./file_server --port 8080 \
//!   --document-root ./www \
//!   --workers 10 \
//!   --chunk-size 8192
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 DOCUMENT_ROOT=/srv/www ./file_server
//! ```

use clap::Parser;
use std::path::Path;

/// Configuración del servidor de archivos estáticos
#[derive(Debug, Clone, Parser)]
#[command(name = "file_server")]
#[command(about = "Servidor HTTP/1.0-1.1 de archivos estáticos para Principios de Sistemas Operativos")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (8000-9999)
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio raíz de documentos; "/" se traduce a "/index.html"
    #[arg(short = 'd', long = "document-root", default_value = "./www", env = "DOCUMENT_ROOT")]
    pub document_root: String,

    // === Capacidades ===

    /// Máximo de conexiones cliente simultáneas
    #[arg(long = "max-connections", default_value = "10", env = "MAX_CONNECTIONS")]
    pub max_connections: usize,

    /// Número de workers de transferencia
    #[arg(long, default_value = "10", env = "WORKERS")]
    pub workers: usize,

    /// Bytes de archivo enviados por visita de worker
    #[arg(long = "chunk-size", default_value = "8192", env = "CHUNK_SIZE")]
    pub chunk_size: usize,

    // === Timeouts ===

    /// Timeout del poll de readiness por tick, en milisegundos
    #[arg(long = "poll-timeout-ms", default_value = "1000", env = "POLL_TIMEOUT_MS")]
    pub poll_timeout_ms: u16,

    /// Base del presupuesto keep-alive en segundos; cada conexión dispone de
    /// base / conexiones_activas segundos de inactividad
    #[arg(long = "keep-alive-base", default_value = "30", env = "KEEP_ALIVE_BASE")]
    pub keep_alive_base_secs: u64,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        // Validar puerto
        if self.port < 8000 || self.port > 9999 {
            return Err(format!(
                "Invalid port number {}, please use between 8000 and 9999",
                self.port
            ));
        }

        // Validar raíz de documentos
        let root = Path::new(&self.document_root);
        if !root.is_dir() {
            return Err(format!(
                "Document root '{}' does not exist or is not a directory",
                self.document_root
            ));
        }

        // Validar capacidades
        if self.max_connections == 0 {
            return Err("Max connections must be >= 1".to_string());
        }
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        if self.chunk_size == 0 {
            return Err("Chunk size must be >= 1".to_string());
        }

        // Validar timeouts
        if self.poll_timeout_ms == 0 {
            return Err("Poll timeout must be > 0".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║          RedUnix Static File Server Configuration            ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:        {}", self.address());
        println!("   Document root:  {}", self.document_root);
        println!();
        println!("👷 Capacities:");
        println!("   Connections:    {}", self.max_connections);
        println!("   Workers:        {}", self.workers);
        println!("   Chunk size:     {} bytes", self.chunk_size);
        println!();
        println!("⏱️  Timeouts:");
        println!("   Poll tick:      {} ms", self.poll_timeout_ms);
        println!(
            "   Keep-alive:     {} s / conexiones activas",
            self.keep_alive_base_secs
        );
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            document_root: "./www".to_string(),
            max_connections: 10,
            workers: 10,
            chunk_size: 8192,
            poll_timeout_ms: 1000,
            keep_alive_base_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_existing_root() -> Config {
        let mut config = Config::default();
        // El directorio temporal del sistema siempre existe
        config.document_root = std::env::temp_dir().display().to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.workers, 10);
        assert_eq!(config.chunk_size, 8192);
        assert_eq!(config.keep_alive_base_secs, 30);
    }

    #[test]
    fn test_address() {
        let config = Config::default();
        assert_eq!(config.address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 9000;
        assert_eq!(config.address(), "0.0.0.0:9000");
    }

    #[test]
    fn test_validate_success() {
        let config = config_with_existing_root();
        assert!(config.validate().is_ok());
    }

    // ==================== Port Validation ====================

    #[test]
    fn test_validate_port_too_low() {
        let mut config = config_with_existing_root();
        config.port = 7999;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("port"));
    }

    #[test]
    fn test_validate_port_too_high() {
        let mut config = config_with_existing_root();
        config.port = 10000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_port_boundaries() {
        let mut config = config_with_existing_root();
        config.port = 8000;
        assert!(config.validate().is_ok());
        config.port = 9999;
        assert!(config.validate().is_ok());
    }

    // ==================== Document Root Validation ====================

    #[test]
    fn test_validate_missing_document_root() {
        let mut config = Config::default();
        config.document_root = "/ruta/que/no/existe".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Document root"));
    }

    // ==================== Capacity Validation ====================

    #[test]
    fn test_validate_invalid_max_connections() {
        let mut config = config_with_existing_root();
        config.max_connections = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Max connections"));
    }

    #[test]
    fn test_validate_invalid_workers() {
        let mut config = config_with_existing_root();
        config.workers = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Workers"));
    }

    #[test]
    fn test_validate_invalid_chunk_size() {
        let mut config = config_with_existing_root();
        config.chunk_size = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Chunk size"));
    }

    #[test]
    fn test_validate_invalid_poll_timeout() {
        let mut config = config_with_existing_root();
        config.poll_timeout_ms = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Poll timeout"));
    }

    // ==================== Custom Values ====================

    #[test]
    fn test_config_custom_values() {
        let mut config = config_with_existing_root();
        config.port = 9000;
        config.workers = 4;
        config.chunk_size = 1024;
        config.keep_alive_base_secs = 60;

        assert_eq!(config.port, 9000);
        assert_eq!(config.workers, 4);
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.keep_alive_base_secs, 60);
        assert!(config.validate().is_ok());
    }

    // ==================== Print Summary ====================

    #[test]
    fn test_config_print_summary() {
        let config = Config::default();
        // Should not panic
        config.print_summary();
    }
}
