use rusqlite::Connection;

/// Hashes of every key flagged active
pub fn active_hashes(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare_cached("SELECT api_key FROM api_keys WHERE is_active = 1")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    rows.collect()
}
