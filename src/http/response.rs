//! # Construcción de Respuestas HTTP
//!
//! Este módulo construye los bloques de cabeceras que el servidor envía:
//! uno de éxito (200, con los metadatos del archivo) o uno de error con
//! longitud cero. El cuerpo nunca se serializa acá; los bytes del archivo
//! los envían los workers en chunks directamente sobre el socket.
//!
//! Las cabeceras se emiten siempre en el mismo orden:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Date: Sun, 06 Nov 1994 08:49:37 GMT\r\n
//! Server: RedUnix/0.1\r\n
//! Last-Modified: Sun, 06 Nov 1994 08:49:37 GMT\r\n
//! Accept-Ranges: bytes\r\n
//! Content-Length: 500\r\n
//! Keep-Alive: timeout=3, max=100\r\n
//! Connection: Keep-Alive\r\n
//! Content-Type: text/html\r\n
//! \r\n
//! ```
//!
//! El par Keep-Alive/Connection sólo aparece en HTTP/1.1 y refleja el
//! presupuesto de inactividad vigente. Cuando la admisión falla antes de
//! conocer una versión válida, la status line usa el token "N/A".

use super::{HttpVersion, StatusCode};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Identidad del servidor para el header Server
pub const SERVER_NAME: &str = "RedUnix/0.1";

/// Bloque de cabeceras de una respuesta
#[derive(Debug, Clone)]
pub struct Response {
    /// Versión para la status line; None produce el token "N/A"
    version: Option<HttpVersion>,

    /// Código de estado
    status: StatusCode,

    /// Headers en orden de emisión
    headers: Vec<(String, String)>,
}

impl Response {
    /// Cabecera de éxito para servir un archivo
    ///
    /// `keep_alive_secs` es el presupuesto de inactividad vigente; sólo se
    /// refleja en la respuesta para clientes 1.1.
    pub fn file_head(
        version: HttpVersion,
        content_type: &str,
        content_length: u64,
        last_modified: SystemTime,
        keep_alive_secs: u64,
    ) -> Self {
        let mut response = Response {
            version: Some(version),
            status: StatusCode::Ok,
            headers: Vec::new(),
        };
        response.push_fixed_set(content_length, last_modified, content_type, keep_alive_secs);
        response
    }

    /// Cabecera de error con longitud cero
    pub fn error_head(
        version: Option<HttpVersion>,
        status: StatusCode,
        keep_alive_secs: u64,
    ) -> Self {
        let mut response = Response {
            version,
            status,
            headers: Vec::new(),
        };
        response.push_fixed_set(0, SystemTime::now(), "text/plain", keep_alive_secs);
        response
    }

    /// Emite el conjunto fijo de cabeceras, siempre en el mismo orden
    fn push_fixed_set(
        &mut self,
        content_length: u64,
        last_modified: SystemTime,
        content_type: &str,
        keep_alive_secs: u64,
    ) {
        self.push_header("Date", &http_date(SystemTime::now()));
        self.push_header("Server", SERVER_NAME);
        self.push_header("Last-Modified", &http_date(last_modified));
        self.push_header("Accept-Ranges", "bytes");
        self.push_header("Content-Length", &content_length.to_string());
        if self.version == Some(HttpVersion::V11) {
            self.push_header(
                "Keep-Alive",
                &format!("timeout={}, max=100", keep_alive_secs),
            );
            self.push_header("Connection", "Keep-Alive");
        }
        self.push_header("Content-Type", content_type);
    }

    fn push_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    pub fn to_bytes(&self) -> Vec<u8> {
        let version_token = match self.version {
            Some(version) => version.as_str(),
            None => "N/A",
        };

        let mut result = Vec::new();

        // 1. Status line: "HTTP/1.1 200 OK\r\n"
        result.extend_from_slice(format!("{} {}\r\n", version_token, self.status).as_bytes());

        // 2. Headers en orden
        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        // 3. Línea vacía que cierra la cabecera
        result.extend_from_slice(b"\r\n");

        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene los headers en orden de emisión
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// Content-Type según la extensión del archivo (tabla fija)
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html",
        Some("jpg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        _ => "text/plain",
    }
}

const WEEKDAYS: [&str; 7] = ["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Formatea un instante en formato RFC 1123: "Sun, 06 Nov 1994 08:49:37 GMT"
pub fn http_date(t: SystemTime) -> String {
    let secs = t
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    let days = secs.div_euclid(86_400);
    let rem = secs.rem_euclid(86_400);
    let (hour, minute, second) = (rem / 3600, (rem % 3600) / 60, rem % 60);

    // 1970-01-01 fue jueves
    let weekday = WEEKDAYS[days.rem_euclid(7) as usize];
    let (year, month, day) = civil_from_days(days);

    format!(
        "{}, {:02} {} {} {:02}:{:02}:{:02} GMT",
        weekday,
        day,
        MONTHS[month - 1],
        year,
        hour,
        minute,
        second
    )
}

/// Convierte días desde epoch a fecha civil (algoritmo de calendario
/// proléptico gregoriano)
fn civil_from_days(z: i64) -> (i64, usize, i64) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };
    (year, month as usize, day)
}
