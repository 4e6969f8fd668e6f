mod schema;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::*;

/// The flight manifest repository.
///
/// Each flight is stored as a single row; the seated and overbooked passenger
/// lists live in JSON text columns. Every operation acquires the connection
/// lock once and completes inside that critical section, so each call is
/// atomic and isolated on its own. There is no cross-operation transaction;
/// callers that need one must wrap it themselves.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "flightdeck")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("flightdeck.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Flight operations
    // ============================================================

    pub fn list_flights(
        &self,
        flight_code: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<FlightSummary>> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let mut sql = String::from("SELECT id, flight_code, capacity FROM flights");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(code) = flight_code {
            sql.push_str(" WHERE flight_code = ?");
            params.push(Box::new(code.to_string()));
        }
        sql.push_str(" ORDER BY rowid LIMIT ? OFFSET ?");
        params.push(Box::new(limit));
        params.push(Box::new(offset));

        let mut stmt = conn.prepare(&sql)?;
        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let flights = stmt
            .query_map(params_ref.as_slice(), |row| {
                Ok(FlightSummary {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    flight_code: row.get(1)?,
                    capacity: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(flights)
    }

    pub fn get_flight(&self, id: Uuid) -> Result<Option<Flight>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, flight_code, capacity, passengers, overbooked_passengers, created_at, updated_at
             FROM flights WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Flight {
                id: parse_uuid(row.get::<_, String>(0)?),
                flight_code: row.get(1)?,
                capacity: row.get(2)?,
                passengers: parse_passengers(row.get::<_, String>(3)?),
                overbooked_passengers: parse_passengers(row.get::<_, String>(4)?),
                created_at: parse_datetime(row.get::<_, String>(5)?),
                updated_at: parse_datetime(row.get::<_, String>(6)?),
            }))
        } else {
            Ok(None)
        }
    }

    pub fn insert_flight(
        &self,
        flight_code: &str,
        capacity: u32,
        passengers: Vec<Passenger>,
        overbooked_passengers: Vec<Passenger>,
    ) -> Result<Flight> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO flights (id, flight_code, capacity, passengers, overbooked_passengers, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                flight_code,
                capacity,
                serde_json::to_string(&passengers)?,
                serde_json::to_string(&overbooked_passengers)?,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Flight {
            id,
            flight_code: flight_code.to_string(),
            capacity,
            passengers,
            overbooked_passengers,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace a flight's attributes, and optionally its whole manifest.
    ///
    /// When `manifests` is `None` the passenger columns are left untouched;
    /// when `Some`, the already-allocated seated/overbooked pair replaces both
    /// lists in the same statement as the attribute changes.
    pub fn update_flight(
        &self,
        id: Uuid,
        flight_code: &str,
        capacity: u32,
        manifests: Option<(Vec<Passenger>, Vec<Passenger>)>,
    ) -> Result<Option<Flight>> {
        let Some(existing) = self.get_flight(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        let (passengers, overbooked_passengers) = match manifests {
            Some((seated, overbooked)) => {
                conn.execute(
                    "UPDATE flights SET flight_code = ?, capacity = ?, passengers = ?, overbooked_passengers = ?, updated_at = ? WHERE id = ?",
                    (
                        flight_code,
                        capacity,
                        serde_json::to_string(&seated)?,
                        serde_json::to_string(&overbooked)?,
                        now.to_rfc3339(),
                        id.to_string(),
                    ),
                )?;
                (seated, overbooked)
            }
            None => {
                conn.execute(
                    "UPDATE flights SET flight_code = ?, capacity = ?, updated_at = ? WHERE id = ?",
                    (flight_code, capacity, now.to_rfc3339(), id.to_string()),
                )?;
                (existing.passengers, existing.overbooked_passengers)
            }
        };

        Ok(Some(Flight {
            id,
            flight_code: flight_code.to_string(),
            capacity,
            passengers,
            overbooked_passengers,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_flight(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM flights WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Passenger operations (seated list)
    // ============================================================

    /// Append passengers to the seated list. Returns whether the flight
    /// existed. The capacity bound is not re-checked here; seats beyond
    /// capacity are a replacement-time concern.
    pub fn append_passengers(&self, id: Uuid, new_passengers: &[Passenger]) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let Some(mut passengers) = read_seated(&conn, id)? else {
            return Ok(false);
        };
        passengers.extend_from_slice(new_passengers);
        write_seated(&conn, id, &passengers)?;

        Ok(true)
    }

    /// Remove seated passengers by identifier. Returns `None` if the flight
    /// is missing, otherwise how many passengers were removed.
    pub fn remove_passengers(&self, id: Uuid, passenger_ids: &[i64]) -> Result<Option<usize>> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let Some(mut passengers) = read_seated(&conn, id)? else {
            return Ok(None);
        };
        let remove: HashSet<i64> = passenger_ids.iter().copied().collect();
        let before = passengers.len();
        passengers.retain(|p| !remove.contains(&p.id));
        let removed = before - passengers.len();
        if removed > 0 {
            write_seated(&conn, id, &passengers)?;
        }

        Ok(Some(removed))
    }

    /// Apply a partial update to one seated passenger, located by identifier.
    /// Returns the updated passenger, or `None` if the flight or the
    /// passenger is missing.
    pub fn patch_passenger(
        &self,
        id: Uuid,
        passenger_id: i64,
        input: &UpdatePassengerInput,
    ) -> Result<Option<Passenger>> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let Some(mut passengers) = read_seated(&conn, id)? else {
            return Ok(None);
        };
        let Some(passenger) = passengers.iter_mut().find(|p| p.id == passenger_id) else {
            return Ok(None);
        };
        input.apply(passenger);
        let updated = passenger.clone();
        write_seated(&conn, id, &passengers)?;

        Ok(Some(updated))
    }

    pub fn find_passenger(&self, id: Uuid, passenger_id: i64) -> Result<Option<Passenger>> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let Some(passengers) = read_seated(&conn, id)? else {
            return Ok(None);
        };
        Ok(passengers.into_iter().find(|p| p.id == passenger_id))
    }

    /// List seated passengers matching a conjunction of equality filters.
    /// Returns `None` if the flight is missing.
    pub fn list_passengers(
        &self,
        id: Uuid,
        filter: &PassengerFilter,
    ) -> Result<Option<Vec<Passenger>>> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let Some(passengers) = read_seated(&conn, id)? else {
            return Ok(None);
        };
        Ok(Some(
            passengers
                .into_iter()
                .filter(|p| filter.matches(p))
                .collect(),
        ))
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn read_seated(conn: &Connection, id: Uuid) -> Result<Option<Vec<Passenger>>> {
    let mut stmt = conn.prepare("SELECT passengers FROM flights WHERE id = ?")?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        Ok(Some(parse_passengers(row.get::<_, String>(0)?)))
    } else {
        Ok(None)
    }
}

fn write_seated(conn: &Connection, id: Uuid, passengers: &[Passenger]) -> Result<()> {
    conn.execute(
        "UPDATE flights SET passengers = ?, updated_at = ? WHERE id = ?",
        (
            serde_json::to_string(passengers)?,
            Utc::now().to_rfc3339(),
            id.to_string(),
        ),
    )?;
    Ok(())
}

fn parse_passengers(json: String) -> Vec<Passenger> {
    serde_json::from_str(&json).unwrap_or_default()
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
