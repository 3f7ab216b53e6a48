use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use lintas_core::booking::{Booking, BookingStatus, Gender, ReservedSeat};
use lintas_core::error::ReservationError;
use lintas_core::store::{NewHold, ReservationStore, ScanOutcome};

/// Postgres-backed reservation store.
///
/// Each trait method runs as one transaction. Seat exclusivity rests on
/// two layers: `FOR UPDATE` row locks on existing allocations, and the
/// unique index on (trip_id, seat_number) which rejects the insert race
/// that row locks cannot cover (both transactions inserting a seat that
/// has no row yet).
pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Release every expired hold inside the caller's transaction: flip
    /// the bookings to RELEASED and drop their allocation rows.
    async fn release_expired_in(
        tx: &mut Transaction<'_, Postgres>,
        now: DateTime<Utc>,
    ) -> Result<u64, ReservationError> {
        let released = sqlx::query(
            "UPDATE bookings
             SET status = 'RELEASED', updated_at = $1
             WHERE status = 'HELD' AND hold_expires_at <= $1
             RETURNING id",
        )
        .bind(now)
        .fetch_all(&mut **tx)
        .await
        .map_err(store_err)?;

        if released.is_empty() {
            return Ok(0);
        }

        let ids: Vec<Uuid> = released
            .iter()
            .map(|row| row.try_get("id"))
            .collect::<Result<_, _>>()
            .map_err(store_err)?;

        sqlx::query("DELETE FROM seat_allocations WHERE booking_id = ANY($1)")
            .bind(&ids)
            .execute(&mut **tx)
            .await
            .map_err(store_err)?;

        Ok(ids.len() as u64)
    }

    /// Fresh read of which requested seats are taken, used to build the
    /// conflict report after a unique-violation abort.
    async fn conflicting_seats(
        &self,
        trip_id: Uuid,
        seat_numbers: &[i32],
    ) -> Result<Vec<i32>, ReservationError> {
        let rows = sqlx::query(
            "SELECT seat_number FROM seat_allocations
             WHERE trip_id = $1 AND seat_number = ANY($2)
             ORDER BY seat_number",
        )
        .bind(trip_id)
        .bind(seat_numbers)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter()
            .map(|row| row.try_get("seat_number").map_err(store_err))
            .collect()
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn create_hold(&self, hold: NewHold, now: DateTime<Utc>) -> Result<(), ReservationError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // 1. Reclaim pass, so stale holds never block the conflict check
        Self::release_expired_in(&mut tx, now).await?;

        // 2. Conflict check, locking the surviving allocation rows
        let taken = sqlx::query(
            "SELECT seat_number FROM seat_allocations
             WHERE trip_id = $1 AND seat_number = ANY($2)
             ORDER BY seat_number
             FOR UPDATE",
        )
        .bind(hold.trip_id)
        .bind(&hold.seat_numbers)
        .fetch_all(&mut *tx)
        .await
        .map_err(store_err)?;

        if !taken.is_empty() {
            let seats: Vec<i32> = taken
                .iter()
                .map(|row| row.try_get("seat_number"))
                .collect::<Result<_, _>>()
                .map_err(store_err)?;
            return Err(ReservationError::SeatsUnavailable(seats));
        }

        // 3. Allocate: booking plus one row per seat
        sqlx::query(
            "INSERT INTO bookings
                 (id, user_id, trip_id, pickup, dropoff,
                  total_price_amount, total_price_currency,
                  ticket_token, status, hold_expires_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'HELD', $9, $10, $10)",
        )
        .bind(hold.booking_id)
        .bind(hold.user_id)
        .bind(hold.trip_id)
        .bind(&hold.pickup)
        .bind(&hold.dropoff)
        .bind(hold.total_price_amount)
        .bind(&hold.total_price_currency)
        .bind(&hold.ticket_token)
        .bind(hold.hold_expires_at)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        for seat_number in &hold.seat_numbers {
            let inserted = sqlx::query(
                "INSERT INTO seat_allocations (trip_id, seat_number, booking_id)
                 VALUES ($1, $2, $3)",
            )
            .bind(hold.trip_id)
            .bind(seat_number)
            .bind(hold.booking_id)
            .execute(&mut *tx)
            .await;

            if let Err(err) = inserted {
                // A rival hold committed this seat between our check and
                // our insert; the unique index catches it. Abort and
                // report the seats a fresh read now shows as taken.
                if is_unique_violation(&err) {
                    drop(tx);
                    let mut seats = self
                        .conflicting_seats(hold.trip_id, &hold.seat_numbers)
                        .await?;
                    if seats.is_empty() {
                        seats = vec![*seat_number];
                    }
                    return Err(ReservationError::SeatsUnavailable(seats));
                }
                return Err(store_err(err));
            }
        }

        tx.commit().await.map_err(store_err)
    }

    async fn release_expired(&self, now: DateTime<Utc>) -> Result<u64, ReservationError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;
        let released = Self::release_expired_in(&mut tx, now).await?;
        tx.commit().await.map_err(store_err)?;
        Ok(released)
    }

    async fn confirm(
        &self,
        booking_id: Uuid,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let row = sqlx::query(
            "SELECT user_id, status, hold_expires_at FROM bookings
             WHERE id = $1
             FOR UPDATE",
        )
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?;

        let row = row.ok_or_else(expired_or_missing)?;

        let user_id: Uuid = row.try_get("user_id").map_err(store_err)?;
        if user_id != owner_id {
            return Err(ReservationError::Unauthorized(
                "booking belongs to another user".to_string(),
            ));
        }

        let status: String = row.try_get("status").map_err(store_err)?;
        let hold_expires_at: Option<DateTime<Utc>> =
            row.try_get("hold_expires_at").map_err(store_err)?;

        // Liveness check against the same clock reading the reaper race
        // would use; an expired hold fails here even before any sweep.
        let live = status == "HELD" && hold_expires_at.map(|at| at > now).unwrap_or(false);
        if !live {
            return Err(expired_or_missing());
        }

        sqlx::query("UPDATE bookings SET status = 'CONFIRMED', updated_at = $2 WHERE id = $1")
            .bind(booking_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        tx.commit().await.map_err(store_err)
    }

    async fn consume_ticket(
        &self,
        ticket_token: &str,
        now: DateTime<Utc>,
    ) -> Result<ScanOutcome, ReservationError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let row = sqlx::query(
            "SELECT id, status FROM bookings
             WHERE ticket_token = $1
             FOR UPDATE",
        )
        .bind(ticket_token)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?;

        let row = row.ok_or(ReservationError::TokenNotFound)?;
        let booking_id: Uuid = row.try_get("id").map_err(store_err)?;
        let status: String = row.try_get("status").map_err(store_err)?;
        let status = BookingStatus::parse(&status)
            .ok_or_else(|| ReservationError::Store(format!("unknown booking status {status}")))?;

        if status != BookingStatus::Confirmed {
            // Never mutate a non-confirmed booking; the row lock drops
            // with the transaction.
            return Ok(ScanOutcome::Rejected { booking_id, status });
        }

        sqlx::query("UPDATE bookings SET status = 'USED', updated_at = $2 WHERE id = $1")
            .bind(booking_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        sqlx::query("INSERT INTO scan_records (booking_id, scanned_at) VALUES ($1, $2)")
            .bind(booking_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        Ok(ScanOutcome::Valid { booking_id })
    }

    async fn seat_status(
        &self,
        trip_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReservedSeat>, ReservationError> {
        let rows = sqlx::query(
            "SELECT sa.seat_number, u.gender
             FROM seat_allocations sa
             JOIN bookings b ON b.id = sa.booking_id
             LEFT JOIN users u ON u.id = b.user_id
             WHERE sa.trip_id = $1
               AND (b.status IN ('CONFIRMED', 'USED')
                    OR (b.status = 'HELD' AND b.hold_expires_at > $2))
             ORDER BY sa.seat_number",
        )
        .bind(trip_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter()
            .map(|row| {
                let seat_number: i32 = row.try_get("seat_number").map_err(store_err)?;
                let gender: Option<String> = row.try_get("gender").map_err(store_err)?;
                Ok(ReservedSeat {
                    seat_number,
                    gender: gender.as_deref().and_then(Gender::parse),
                })
            })
            .collect()
    }

    async fn find_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, ReservationError> {
        let row = sqlx::query(
            "SELECT id, user_id, trip_id, pickup, dropoff,
                    total_price_amount, total_price_currency,
                    ticket_token, status, hold_expires_at, created_at, updated_at
             FROM bookings WHERE id = $1",
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(|row| {
            let status: String = row.try_get("status").map_err(store_err)?;
            Ok(Booking {
                id: row.try_get("id").map_err(store_err)?,
                user_id: row.try_get("user_id").map_err(store_err)?,
                trip_id: row.try_get("trip_id").map_err(store_err)?,
                pickup: row.try_get("pickup").map_err(store_err)?,
                dropoff: row.try_get("dropoff").map_err(store_err)?,
                total_price_amount: row.try_get("total_price_amount").map_err(store_err)?,
                total_price_currency: row.try_get("total_price_currency").map_err(store_err)?,
                ticket_token: row.try_get("ticket_token").map_err(store_err)?,
                status: BookingStatus::parse(&status).ok_or_else(|| {
                    ReservationError::Store(format!("unknown booking status {status}"))
                })?,
                hold_expires_at: row.try_get("hold_expires_at").map_err(store_err)?,
                created_at: row.try_get("created_at").map_err(store_err)?,
                updated_at: row.try_get("updated_at").map_err(store_err)?,
            })
        })
        .transpose()
    }
}

fn store_err(err: impl std::fmt::Display) -> ReservationError {
    ReservationError::Store(err.to_string())
}

fn expired_or_missing() -> ReservationError {
    ReservationError::Conflict("hold expired or not found".to_string())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}
