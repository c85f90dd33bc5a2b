use cloudpick_core::{CapabilityRow, CapabilityTable, Factor, Service};

pub const NOTE_SCORING_MODEL_URI: &str = "cloudpick://notes/scoring-model";
pub const NOTE_COST_PERSPECTIVE_URI: &str = "cloudpick://notes/cost-perspective";
pub const NOTE_LIMITATIONS_URI: &str = "cloudpick://notes/limitations";

pub const NOTE_SCORING_MODEL_TEXT: &str = include_str!("../../../notes/scoring-model.md");
pub const NOTE_COST_PERSPECTIVE_TEXT: &str = include_str!("../../../notes/cost-perspective.md");
pub const NOTE_LIMITATIONS_TEXT: &str = include_str!("../../../notes/limitations.md");

#[derive(Debug, Clone, Copy)]
pub struct AdvisoryNote {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
    pub text: &'static str,
}

static ADVISORY_NOTES: [AdvisoryNote; 3] = [
    AdvisoryNote {
        uri: NOTE_SCORING_MODEL_URI,
        name: "notes/scoring-model.md",
        description: "How the weighted multi-criteria recommendation is computed.",
        mime_type: "text/markdown",
        text: NOTE_SCORING_MODEL_TEXT,
    },
    AdvisoryNote {
        uri: NOTE_COST_PERSPECTIVE_URI,
        name: "notes/cost-perspective.md",
        description: "How the cost factor reads for Lambda, ECS, and EC2.",
        mime_type: "text/markdown",
        text: NOTE_COST_PERSPECTIVE_TEXT,
    },
    AdvisoryNote {
        uri: NOTE_LIMITATIONS_URI,
        name: "notes/limitations.md",
        description: "What the rule-based model deliberately ignores.",
        mime_type: "text/markdown",
        text: NOTE_LIMITATIONS_TEXT,
    },
];

pub fn notes() -> &'static [AdvisoryNote] {
    &ADVISORY_NOTES
}

pub fn note_text(uri: &str) -> Option<&'static str> {
    ADVISORY_NOTES
        .iter()
        .find(|note| note.uri == uri)
        .map(|note| note.text)
}

#[must_use]
pub fn builtin_table() -> CapabilityTable {
    [
        (
            Service::Lambda,
            [
                (Factor::Traffic, 9.0),
                (Factor::Cost, 8.0),
                (Factor::Scalability, 9.0),
                (Factor::Ops, 9.0),
                (Factor::Control, 4.0),
                (Factor::Latency, 6.0),
            ],
        ),
        (
            Service::Ecs,
            [
                (Factor::Traffic, 7.0),
                (Factor::Cost, 6.0),
                (Factor::Scalability, 8.0),
                (Factor::Ops, 6.0),
                (Factor::Control, 7.0),
                (Factor::Latency, 8.0),
            ],
        ),
        (
            Service::Ec2,
            [
                (Factor::Traffic, 6.0),
                (Factor::Cost, 4.0),
                (Factor::Scalability, 6.0),
                (Factor::Ops, 3.0),
                (Factor::Control, 9.0),
                (Factor::Latency, 9.0),
            ],
        ),
    ]
    .into_iter()
    .map(|(service, entries)| (service, entries.into_iter().collect::<CapabilityRow>()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_complete_and_valid() {
        let table = builtin_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    fn builtin_table_matches_published_ratings() {
        let table = builtin_table();
        let rating = |service: Service, factor: Factor| {
            table.row(service).and_then(|row| row.score(factor))
        };
        assert_eq!(rating(Service::Lambda, Factor::Control), Some(4.0));
        assert_eq!(rating(Service::Lambda, Factor::Ops), Some(9.0));
        assert_eq!(rating(Service::Ecs, Factor::Latency), Some(8.0));
        assert_eq!(rating(Service::Ec2, Factor::Ops), Some(3.0));
        assert_eq!(rating(Service::Ec2, Factor::Control), Some(9.0));
    }

    #[test]
    fn every_note_resolves_through_its_uri() {
        for note in notes() {
            assert_eq!(note_text(note.uri), Some(note.text));
            assert_eq!(note.mime_type, "text/markdown");
            assert!(!note.text.is_empty());
        }
    }

    #[test]
    fn unknown_note_uri_resolves_to_none() {
        assert_eq!(note_text("cloudpick://notes/missing"), None);
    }
}
