//! # Códigos de Estado HTTP
//!
//! Este módulo define los códigos de estado que el servidor puede emitir.
//! Además de los estándar (RFC 1945), el servidor usa códigos de extensión
//! propios para diagnósticos de admisión:
//!
//! - **399**: la versión no es exactamente HTTP/1.0 ni HTTP/1.1
//! - **398**: falta el header Host
//! - **380**: el archivo pasó el stat pero no se pudo abrir (carrera)

/// Representa los códigos de estado que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 304 Not Modified - Reservado para validación condicional
    NotModified = 304,

    /// 380 - El archivo existía al hacer stat pero falló el open
    OpenRace = 380,

    /// 398 - El request no incluyó el header Host
    HostMissing = 398,

    /// 399 - Versión HTTP distinta de 1.0 y 1.1
    VersionUnsupported = 399,

    /// 400 Bad Request - Request malformado o método no soportado
    BadRequest = 400,

    /// 403 Forbidden - Ruta fuera de la raíz o archivo sin o-read
    Forbidden = 403,

    /// 404 Not Found - El archivo pedido no existe
    NotFound = 404,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::OpenRace.as_u16(), 380);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón asociado al código
    ///
    /// Los textos de los códigos de extensión describen el diagnóstico
    /// directamente en la status line.
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::HostMissing.reason_phrase(), "NO HOST");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotModified => "Not Modified",
            StatusCode::OpenRace => "ERROR READING FILE",
            StatusCode::HostMissing => "NO HOST",
            StatusCode::VersionUnsupported => "USE HTTP/1.0 or HTTP/1.1",
            StatusCode::BadRequest => "BAD REQUEST",
            StatusCode::Forbidden => "FORBIDDEN",
            StatusCode::NotFound => "NOT FOUND",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Ok)
    }

    /// Verifica si el código indica un fallo de admisión (el request no
    /// produce ninguna transferencia y la conexión se cierra)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StatusCode::Ok | StatusCode::NotModified)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formatea el código de estado para la status line
    ///
    /// Formato: "403 FORBIDDEN"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
