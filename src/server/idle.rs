//! # Presupuesto de Inactividad
//! src/server/idle.rs
//!
//! Control de admisión para keep-alive: cada conexión dispone de
//! `base / conexiones_activas` segundos de inactividad desde su última
//! transferencia completada. Con más conexiones concurrentes, el presupuesto
//! de todas se achica y las conexiones ociosas se expulsan antes para
//! hacerle lugar a las nuevas.
//!
//! La tabla se indexa por el identificador estable que el poller asigna al
//! aceptar, nunca por aritmética de descriptores.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Tabla conexión → instante de la última transferencia completada
///
/// `None` significa "nunca completó una transferencia": esas conexiones no
/// expiran por inactividad (todavía no entraron al régimen keep-alive).
pub struct IdleTable {
    base_secs: u64,
    inner: Mutex<HashMap<u64, Option<Instant>>>,
}

impl IdleTable {
    /// Crea una tabla con el presupuesto base dado (en segundos)
    pub fn new(base_secs: u64) -> Self {
        Self {
            base_secs,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Registra una conexión recién aceptada, sin transferencias completadas
    pub fn register(&self, conn_id: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.insert(conn_id, None);
    }

    /// Elimina una conexión cerrada
    pub fn remove(&self, conn_id: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.remove(&conn_id);
    }

    /// Registra ahora como el fin de la última transferencia de la conexión
    ///
    /// Si la conexión ya no está registrada (el poller la cerró) no hace
    /// nada: una conexión muerta no se resucita.
    pub fn mark_completed(&self, conn_id: u64) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.get_mut(&conn_id) {
            *entry = Some(Instant::now());
        }
    }

    /// Presupuesto vigente para `active` conexiones concurrentes
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::server::IdleTable;
    /// use std::time::Duration;
    ///
    /// let idle = IdleTable::new(30);
    /// assert_eq!(idle.budget(1), Duration::from_secs(30));
    /// assert_eq!(idle.budget(3), Duration::from_secs(10));
    /// ```
    pub fn budget(&self, active: usize) -> Duration {
        Duration::from_secs(self.base_secs / active.max(1) as u64)
    }

    /// Indica si la conexión agotó su presupuesto de inactividad
    pub fn is_expired(&self, conn_id: u64, active: usize) -> bool {
        let inner = self.inner.lock().unwrap();
        match inner.get(&conn_id) {
            Some(Some(last_completed)) => last_completed.elapsed() > self.budget(active),
            // Sin transferencia completada (o desconocida): no expira
            _ => false,
        }
    }

    /// Cantidad de conexiones registradas
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Verifica si la tabla está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_budget_shrinks_with_load() {
        let idle = IdleTable::new(30);
        assert_eq!(idle.budget(1), Duration::from_secs(30));
        assert_eq!(idle.budget(2), Duration::from_secs(15));
        assert_eq!(idle.budget(3), Duration::from_secs(10));
        assert_eq!(idle.budget(30), Duration::from_secs(1));
        // División entera: con mucha carga el presupuesto llega a cero
        assert_eq!(idle.budget(31), Duration::from_secs(0));
    }

    #[test]
    fn test_budget_with_zero_connections() {
        let idle = IdleTable::new(30);
        assert_eq!(idle.budget(0), Duration::from_secs(30));
    }

    #[test]
    fn test_never_completed_does_not_expire() {
        let idle = IdleTable::new(0);
        idle.register(1);
        thread::sleep(Duration::from_millis(10));
        assert!(!idle.is_expired(1, 1));
    }

    #[test]
    fn test_expires_after_completion() {
        let idle = IdleTable::new(0); // presupuesto cero: expira de inmediato
        idle.register(1);
        idle.mark_completed(1);
        thread::sleep(Duration::from_millis(10));
        assert!(idle.is_expired(1, 1));
    }

    #[test]
    fn test_fresh_completion_within_budget() {
        let idle = IdleTable::new(30);
        idle.register(1);
        idle.mark_completed(1);
        assert!(!idle.is_expired(1, 1));
    }

    #[test]
    fn test_unknown_connection_does_not_expire() {
        let idle = IdleTable::new(0);
        assert!(!idle.is_expired(99, 1));
    }

    #[test]
    fn test_mark_completed_ignores_removed_connection() {
        let idle = IdleTable::new(0);
        idle.register(1);
        idle.remove(1);
        idle.mark_completed(1);
        assert!(idle.is_empty());
        assert!(!idle.is_expired(1, 1));
    }

    #[test]
    fn test_register_and_remove() {
        let idle = IdleTable::new(30);
        idle.register(1);
        idle.register(2);
        assert_eq!(idle.len(), 2);
        idle.remove(1);
        assert_eq!(idle.len(), 1);
    }
}
