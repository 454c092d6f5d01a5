//! SQL text for the remote table

use crate::remote::driver::Bind;
use crate::storage::filter::{LIKE_ESCAPE, SearchFilter};

/// Server-side cap applied to every remote search.
pub const ROW_LIMIT: usize = 100;

/// Projection of the remote search, in [`crate::remote::RemoteRow`] order.
const SELECT_COLUMNS: &str = "GID, MRLCODE, BARCODE, PRODUCT_NAME, \
     TO_CHAR(CREATE_DATE, 'YYYY-MM-DD HH24:MI:SS') AS CREATE_DATE_STR, REMARK";

pub fn select(table: &str, filter: &SearchFilter) -> (String, Vec<Bind>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(date) = filter.date_param() {
        conditions.push("TRUNC(CREATE_DATE) = TO_DATE(:search_date, 'YYYY-MM-DD')".to_string());
        binds.push(Bind::new("search_date", date));
    }
    if let Some(pattern) = filter.like_param() {
        conditions.push(format!("MRLCODE LIKE :search_id ESCAPE '{LIKE_ESCAPE}'"));
        binds.push(Bind::new("search_id", pattern));
    }
    conditions.push(format!("ROWNUM <= {ROW_LIMIT}"));

    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM {table} WHERE {}",
        conditions.join(" AND ")
    );
    (sql, binds)
}

pub fn insert(table: &str) -> String {
    format!(
        "INSERT INTO {table} (MRLCODE, CREATE_DATE, UDA1) \
         VALUES (:mrlcode, TO_DATE(:create_date, 'YYYY-MM-DD'), :uda1)"
    )
}

pub const PING: &str = "SELECT TO_CHAR(SYSDATE, 'YYYY-MM-DD HH24:MI:SS') AS NOW FROM DUAL";
