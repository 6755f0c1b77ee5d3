//! ============================================================================
//! Answer Formatter - Matched triplets -> natural-language answer
//! ============================================================================

use crate::types::{AuthoredTriplet, Fact, Filter, ReturnShape};

/// Returned verbatim when nothing matched
pub const NO_INFORMATION_FOUND: &str = "No information found.";

fn render(triplet: &AuthoredTriplet, shape: ReturnShape) -> String {
    match shape {
        ReturnShape::Subject => format!(
            "{} related action performed by: {}",
            triplet.object(),
            triplet.subject()
        ),
        ReturnShape::Triplet | ReturnShape::Sentence => format!(
            "{} said: \"{} {} {}\"",
            triplet.author,
            triplet.subject(),
            triplet.predicate(),
            triplet.object()
        ),
    }
}

/// One line per triplet in input order, shaped by `filter`'s return tag
pub fn format_answer(triplets: &[AuthoredTriplet], filter: &Filter) -> String {
    if triplets.is_empty() {
        return NO_INFORMATION_FOUND.to_string();
    }
    let shape = filter.shape();
    triplets
        .iter()
        .map(|t| render(t, shape))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Triplet;

    fn authored(author: &str, s: &str, p: &str, o: &str) -> AuthoredTriplet {
        AuthoredTriplet::new(author, Triplet::new(s, p, o).into_record("t"))
    }

    #[test]
    fn test_empty_is_no_information() {
        let filter = Filter::default().returning(ReturnShape::Subject);
        assert_eq!(format_answer(&[], &filter), NO_INFORMATION_FOUND);
    }

    #[test]
    fn test_subject_shape() {
        let triplets = vec![authored("Ali", "Ali", "recommend", "FastAPI")];
        let filter = Filter::default().returning(ReturnShape::Subject);
        assert_eq!(
            format_answer(&triplets, &filter),
            "FastAPI related action performed by: Ali"
        );
    }

    #[test]
    fn test_triplet_and_default_shapes_match() {
        let triplets = vec![
            authored("Ayşe", "Ayşe", "like", "Rust"),
            authored("Erdem", "Erdem", "build", "system"),
        ];
        let expected = "Ayşe said: \"Ayşe like Rust\"\nErdem said: \"Erdem build system\"";

        let triplet = Filter::default().returning(ReturnShape::Triplet);
        assert_eq!(format_answer(&triplets, &triplet), expected);
        assert_eq!(format_answer(&triplets, &Filter::default()), expected);
    }
}
