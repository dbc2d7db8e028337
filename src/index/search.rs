use anyhow::Result;
use rusqlite::{params, Connection};

use super::types::ScoredChunk;

/// Convert an f32 embedding slice to raw bytes for sqlite-vec.
pub fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            std::mem::size_of_val(embedding),
        )
    }
}

/// K-nearest chunks to `embedding`, most similar first.
///
/// `chunks_vec` uses the cosine distance metric, so similarity is `1 - distance`.
pub fn nearest_chunks(conn: &Connection, embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "WITH knn AS ( \
             SELECT id, distance FROM chunks_vec \
             WHERE embedding MATCH ?1 AND k = ?2 \
         ) \
         SELECT knn.id, knn.distance, c.content \
         FROM knn JOIN chunks c ON c.id = knn.id \
         ORDER BY knn.distance",
    )?;
    let results = stmt
        .query_map(params![embedding_to_bytes(embedding), k as i64], |row| {
            let distance: f64 = row.get(1)?;
            Ok(ScoredChunk {
                id: row.get(0)?,
                score: 1.0 - distance,
                content: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(results)
}
