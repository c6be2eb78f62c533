pub(super) const UPSERT_TRIP: &str = r#"
    INSERT INTO trips (id, name, start_date, duration_days, cover_image_url, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        start_date = excluded.start_date,
        duration_days = excluded.duration_days,
        cover_image_url = excluded.cover_image_url,
        created_at = excluded.created_at,
        updated_at = excluded.updated_at
"#;

pub(super) const SELECT_TRIP_BY_ID: &str = r#"
    SELECT id, name, start_date, duration_days, cover_image_url, created_at, updated_at
    FROM trips
    WHERE id = ?1
"#;

pub(super) const SELECT_ALL_TRIPS: &str = r#"
    SELECT id, name, start_date, duration_days, cover_image_url, created_at, updated_at
    FROM trips
    ORDER BY start_date ASC, created_at ASC
"#;

pub(super) const DELETE_TRIP: &str = r#"
    DELETE FROM trips
    WHERE id = ?1
"#;

pub(super) const UPSERT_EVENT: &str = r#"
    INSERT INTO events (
        id, trip_id, category, title,
        start_time, end_time, rating, review_count, image_url,
        status_text, duration_text, travel_time, travel_distance, travel_mode,
        day, sort_order, latitude, longitude, place_id, address, opening_hours,
        is_day_start, is_day_end, created_at, updated_at
    ) VALUES (
        ?1, ?2, ?3, ?4,
        ?5, ?6, ?7, ?8, ?9,
        ?10, ?11, ?12, ?13, ?14,
        ?15, ?16, ?17, ?18, ?19, ?20, ?21,
        ?22, ?23, ?24, ?25
    )
    ON CONFLICT(id) DO UPDATE SET
        trip_id = excluded.trip_id,
        category = excluded.category,
        title = excluded.title,
        start_time = excluded.start_time,
        end_time = excluded.end_time,
        rating = excluded.rating,
        review_count = excluded.review_count,
        image_url = excluded.image_url,
        status_text = excluded.status_text,
        duration_text = excluded.duration_text,
        travel_time = excluded.travel_time,
        travel_distance = excluded.travel_distance,
        travel_mode = excluded.travel_mode,
        day = excluded.day,
        sort_order = excluded.sort_order,
        latitude = excluded.latitude,
        longitude = excluded.longitude,
        place_id = excluded.place_id,
        address = excluded.address,
        opening_hours = excluded.opening_hours,
        is_day_start = excluded.is_day_start,
        is_day_end = excluded.is_day_end,
        created_at = excluded.created_at,
        updated_at = excluded.updated_at
"#;

pub(super) const SELECT_EVENT_BY_ID: &str = r#"
    SELECT id, trip_id, category, title,
           start_time, end_time, rating, review_count, image_url,
           status_text, duration_text, travel_time, travel_distance, travel_mode,
           day, sort_order, latitude, longitude, place_id, address, opening_hours,
           is_day_start, is_day_end, created_at, updated_at
    FROM events
    WHERE id = ?1
"#;

pub(super) const SELECT_EVENTS_BY_TRIP: &str = r#"
    SELECT id, trip_id, category, title,
           start_time, end_time, rating, review_count, image_url,
           status_text, duration_text, travel_time, travel_distance, travel_mode,
           day, sort_order, latitude, longitude, place_id, address, opening_hours,
           is_day_start, is_day_end, created_at, updated_at
    FROM events
    WHERE trip_id = ?1
    ORDER BY day ASC, sort_order ASC, created_at ASC
"#;

pub(super) const DELETE_EVENT: &str = r#"
    DELETE FROM events
    WHERE id = ?1
"#;

pub(super) const DELETE_EVENTS_BY_TRIP: &str = r#"
    DELETE FROM events
    WHERE trip_id = ?1
"#;

pub(super) const UPSERT_DOCUMENT: &str = r#"
    INSERT INTO documents (
        id, trip_id, title, category, size_text, mime_type, file_url, metadata,
        created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    ON CONFLICT(id) DO UPDATE SET
        trip_id = excluded.trip_id,
        title = excluded.title,
        category = excluded.category,
        size_text = excluded.size_text,
        mime_type = excluded.mime_type,
        file_url = excluded.file_url,
        metadata = excluded.metadata,
        created_at = excluded.created_at,
        updated_at = excluded.updated_at
"#;

pub(super) const SELECT_DOCUMENT_BY_ID: &str = r#"
    SELECT id, trip_id, title, category, size_text, mime_type, file_url, metadata,
           created_at, updated_at
    FROM documents
    WHERE id = ?1
"#;

pub(super) const SELECT_DOCUMENTS_BY_TRIP: &str = r#"
    SELECT id, trip_id, title, category, size_text, mime_type, file_url, metadata,
           created_at, updated_at
    FROM documents
    WHERE trip_id = ?1
    ORDER BY created_at DESC
"#;

pub(super) const DELETE_DOCUMENT: &str = r#"
    DELETE FROM documents
    WHERE id = ?1
"#;

pub(super) const INSERT_MUTATION: &str = r#"
    INSERT INTO pending_mutations (kind, entity, entity_id, payload, queued_at, synced)
    VALUES (?1, ?2, ?3, ?4, ?5, 0)
"#;

pub(super) const SELECT_PENDING_MUTATIONS: &str = r#"
    SELECT id, kind, entity, entity_id, payload, queued_at, synced, synced_at
    FROM pending_mutations
    WHERE synced = 0
    ORDER BY id ASC
"#;

pub(super) const COUNT_PENDING_MUTATIONS: &str = r#"
    SELECT COUNT(*) AS count
    FROM pending_mutations
    WHERE synced = 0
"#;

pub(super) const MARK_MUTATION_SYNCED: &str = r#"
    UPDATE pending_mutations
    SET synced = 1, synced_at = ?2
    WHERE id = ?1
"#;

pub(super) const DELETE_SYNCED_MUTATIONS: &str = r#"
    DELETE FROM pending_mutations
    WHERE synced = 1
"#;

pub(super) const UPSERT_META: &str = r#"
    INSERT INTO meta (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

pub(super) const SELECT_META: &str = r#"
    SELECT value
    FROM meta
    WHERE key = ?1
"#;

pub(super) const DELETE_META: &str = r#"
    DELETE FROM meta
    WHERE key = ?1
"#;
