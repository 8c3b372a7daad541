//! Pure transformations over the entry collection.
//!
//! Nothing here touches storage or the screen; callers persist the returned
//! collection themselves.

use crate::entry::{Entry, EntryId};
use crate::error::{Field, FieldError, ValidationError};

/// Required fields of `entry` that are blank, in form order.
pub fn missing_fields(entry: &Entry) -> Vec<FieldError> {
    let checks = [
        (Field::Title, &entry.title, "Title is required"),
        (Field::Date, &entry.date, "Date is required"),
        (Field::Mood, &entry.mood, "Mood is required"),
        (Field::Content, &entry.content, "Content is required"),
    ];
    checks
        .into_iter()
        .filter(|(_, value, _)| value.trim().is_empty())
        .map(|(field, _, message)| FieldError::new(field, message))
        .collect()
}

/// Appends a new entry after checking it is complete and its id is unused.
pub fn insert(entries: &[Entry], new_entry: Entry) -> Result<Vec<Entry>, ValidationError> {
    let missing = missing_fields(&new_entry);
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }
    check_id_free(entries, &new_entry.id)?;
    let mut next = entries.to_vec();
    next.push(new_entry);
    Ok(next)
}

/// Removes the entry with `id`. An unknown id leaves the collection as it was.
pub fn delete_by_id(entries: &[Entry], id: &EntryId) -> (Vec<Entry>, Option<Entry>) {
    let mut remaining = Vec::with_capacity(entries.len());
    let mut removed = None;
    for entry in entries {
        if removed.is_none() && &entry.id == id {
            removed = Some(entry.clone());
        } else {
            remaining.push(entry.clone());
        }
    }
    (remaining, removed)
}

/// Puts a previously deleted entry back, keeping its original id.
pub fn restore(entries: &[Entry], removed: Entry) -> Result<Vec<Entry>, ValidationError> {
    check_id_free(entries, &removed.id)?;
    let mut next = entries.to_vec();
    next.push(removed);
    Ok(next)
}

fn check_id_free(entries: &[Entry], id: &EntryId) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if entries.iter().any(|e| &e.id == id) {
        return Err(ValidationError::DuplicateId(id.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::entry;
    use pretty_assertions::assert_eq;

    fn collection() -> Vec<Entry> {
        vec![
            entry("1", "Rain day", "2024-01-01", "sad", &[]),
            entry("2", "Sunny", "2024-06-01", "happy", &["beach"]),
        ]
    }

    fn sorted_ids(entries: &[Entry]) -> Vec<String> {
        let mut ids: Vec<String> = entries.iter().map(|e| e.id.to_string()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn insert_then_delete_gives_back_the_original() {
        let original = collection();
        let new_entry = entry("3", "Fog", "2024-03-03", "calm", &["walk"]);

        let grown = insert(&original, new_entry.clone()).unwrap();
        assert_eq!(grown.len(), 3);

        let (shrunk, removed) = delete_by_id(&grown, &new_entry.id);
        assert_eq!(removed, Some(new_entry));
        assert_eq!(sorted_ids(&shrunk), sorted_ids(&original));
        assert_eq!(shrunk, original);
    }

    #[test]
    fn insert_reports_every_missing_field() {
        let mut incomplete = entry("3", " ", "", "calm", &[]);
        incomplete.content.clear();

        let err = insert(&collection(), incomplete).unwrap_err();
        let ValidationError::MissingFields(fields) = err else {
            panic!("expected missing fields, got {err:?}");
        };
        let names: Vec<Field> = fields.iter().map(|f| f.field).collect();
        assert_eq!(names, vec![Field::Title, Field::Date, Field::Content]);
        assert_eq!(fields[0].message, "Title is required");
    }

    #[test]
    fn insert_rejects_id_collisions_and_empty_ids() {
        let clash = entry("2", "Other", "2024-02-02", "meh", &[]);
        assert_eq!(
            insert(&collection(), clash),
            Err(ValidationError::DuplicateId(EntryId::from("2")))
        );

        let no_id = entry("", "Other", "2024-02-02", "meh", &[]);
        assert_eq!(insert(&collection(), no_id), Err(ValidationError::EmptyId));
    }

    #[test]
    fn delete_then_restore_round_trips() {
        let original = collection();
        let (remaining, removed) = delete_by_id(&original, &EntryId::from("2"));
        assert_eq!(remaining, vec![original[0].clone()]);

        let removed = removed.unwrap();
        assert_eq!(removed.title, "Sunny");

        let restored = restore(&remaining, removed).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn deleting_an_absent_id_is_a_no_op() {
        let original = collection();
        let (after, removed) = delete_by_id(&original, &EntryId::from("999"));
        assert_eq!(after, original);
        assert_eq!(removed, None);
    }

    #[test]
    fn restoring_twice_is_a_conflict() {
        let (remaining, removed) = delete_by_id(&collection(), &EntryId::from("1"));
        let removed = removed.unwrap();
        let restored = restore(&remaining, removed.clone()).unwrap();
        assert_eq!(
            restore(&restored, removed),
            Err(ValidationError::DuplicateId(EntryId::from("1")))
        );
    }
}
