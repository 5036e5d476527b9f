//! # Tarea de Transferencia
//! src/transfer/task.rs
//!
//! Representa los bytes pendientes de enviar de un archivo a una conexión.
//! La tarea vive o bien en la cola o bien en manos de exactamente un worker;
//! nunca en los dos lados a la vez.

use crate::http::HttpVersion;
use std::net::TcpStream;
use std::path::{Path, PathBuf};

/// Unidad de trabajo: una transferencia de archivo en curso
///
/// Invariantes: `total_bytes` es inmutable durante toda la vida de la tarea;
/// `sent_bytes` crece de forma monótona y nunca supera `total_bytes`.
#[derive(Debug)]
pub struct TransferTask {
    /// Identificador estable de la conexión (lo asigna el poller al aceptar)
    conn_id: u64,

    /// Handle propio del socket del cliente (clon del que retiene el poller)
    stream: TcpStream,

    /// Versión negociada; decide qué pasa al completar la transferencia
    version: HttpVersion,

    /// Bytes ya enviados
    sent_bytes: u64,

    /// Tamaño total del archivo al momento de la admisión
    total_bytes: u64,

    /// Ruta resuelta del archivo bajo la raíz de documentos
    path: PathBuf,
}

impl TransferTask {
    /// Crea una tarea nueva con cero bytes enviados
    pub fn new(
        conn_id: u64,
        stream: TcpStream,
        version: HttpVersion,
        total_bytes: u64,
        path: PathBuf,
    ) -> Self {
        Self {
            conn_id,
            stream,
            version,
            sent_bytes: 0,
            total_bytes,
            path,
        }
    }

    /// Identificador de la conexión dueña de esta transferencia
    pub fn conn_id(&self) -> u64 {
        self.conn_id
    }

    /// Versión del request que originó la transferencia
    pub fn version(&self) -> HttpVersion {
        self.version
    }

    /// Ruta del archivo en transferencia
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes enviados hasta ahora
    pub fn sent_bytes(&self) -> u64 {
        self.sent_bytes
    }

    /// Tamaño total a enviar
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Bytes que faltan por enviar
    pub fn remaining(&self) -> u64 {
        self.total_bytes - self.sent_bytes
    }

    /// Indica si ya no quedan bytes pendientes
    pub fn is_complete(&self) -> bool {
        self.sent_bytes >= self.total_bytes
    }

    /// Avanza el progreso tras un envío exitoso
    ///
    /// El avance queda acotado por el total: `sent_bytes` jamás lo supera.
    pub fn advance(&mut self, n: u64) {
        debug_assert!(n <= self.remaining(), "avance mayor que lo pendiente");
        self.sent_bytes = (self.sent_bytes + n).min(self.total_bytes);
    }

    /// Acceso mutable al socket para enviar el chunk o cerrarlo
    pub fn stream(&mut self) -> &mut TcpStream {
        &mut self.stream
    }
}
