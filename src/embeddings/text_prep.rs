// text_prep.rs — Text preparation for embedding generation.
//
// Only Bio and Category feed the embedding; ID and Resume_html are carried
// through to the record artifact untouched.

use crate::records::SourceRecord;

/// Embedding input for a person: `"{bio} {category}"`.
///
/// The separator is always a single space, even when either side is empty,
/// so query-side text built the same way stays comparable.
pub fn prepare_person_text(bio: &str, category: &str) -> String {
    format!("{bio} {category}")
}

/// Compose the embedding input for every record, in order.
pub fn compose_texts(records: &[SourceRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| prepare_person_text(&r.bio, &r.category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_person_text_basic() {
        assert_eq!(prepare_person_text("Engineer", "Tech"), "Engineer Tech");
    }

    #[test]
    fn test_prepare_person_text_empty_fields() {
        assert_eq!(prepare_person_text("", "Tech"), " Tech");
        assert_eq!(prepare_person_text("Engineer", ""), "Engineer ");
        assert_eq!(prepare_person_text("", ""), " ");
    }

    #[test]
    fn test_compose_texts_ignores_other_fields() {
        let records = vec![
            SourceRecord {
                id: "1".into(),
                bio: "Hi".into(),
                category: "X".into(),
                resume_html: Some("<b>ignored</b>".into()),
            },
            SourceRecord {
                id: "2".into(),
                bio: "Chef".into(),
                category: "Food".into(),
                resume_html: None,
            },
        ];
        assert_eq!(compose_texts(&records), vec!["Hi X", "Chef Food"]);
    }
}
