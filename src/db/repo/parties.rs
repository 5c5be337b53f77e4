//! Investor and unit records.

use super::{now_rfc3339, parse_col};
use crate::domain::{Investor, InvestorId, Unit, UnitId, UnitStatus};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

pub async fn insert_investor(
    conn: &mut SqliteConnection,
    investor: &Investor,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO investors (id, name, phone, email, profit_share_percentage, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(investor.id.to_string())
    .bind(&investor.name)
    .bind(investor.phone.as_deref())
    .bind(investor.email.as_deref())
    .bind(investor.profit_share_percentage.to_canonical_string())
    .bind(now_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn fetch_investor(
    conn: &mut SqliteConnection,
    id: &InvestorId,
) -> Result<Option<Investor>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, name, phone, email, profit_share_percentage FROM investors WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(investor_from_row).transpose()
}

fn investor_from_row(row: &SqliteRow) -> Result<Investor, sqlx::Error> {
    Ok(Investor {
        id: parse_col(row, "id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        profit_share_percentage: parse_col(row, "profit_share_percentage")?,
    })
}

pub async fn insert_unit(conn: &mut SqliteConnection, unit: &Unit) -> Result<(), sqlx::Error> {
    let now = now_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO units (id, investor_id, name, plate_number, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(unit.id.to_string())
    .bind(unit.investor_id.to_string())
    .bind(&unit.name)
    .bind(unit.plate_number.as_deref())
    .bind(unit.status.as_str())
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn fetch_unit(
    conn: &mut SqliteConnection,
    id: &UnitId,
) -> Result<Option<Unit>, sqlx::Error> {
    let row = sqlx::query("SELECT id, investor_id, name, plate_number, status FROM units WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(unit_from_row).transpose()
}

fn unit_from_row(row: &SqliteRow) -> Result<Unit, sqlx::Error> {
    Ok(Unit {
        id: parse_col(row, "id")?,
        investor_id: parse_col(row, "investor_id")?,
        name: row.try_get("name")?,
        plate_number: row.try_get("plate_number")?,
        status: parse_col(row, "status")?,
    })
}

/// Returns false when no unit has the given id.
pub async fn update_unit_status(
    conn: &mut SqliteConnection,
    id: &UnitId,
    status: UnitStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE units SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(now_rfc3339())
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}
